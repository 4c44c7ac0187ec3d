//! Skill tiers for the computer opponent.
//!
//! | Tier         | Depth | Nominal rating |
//! |--------------|-------|----------------|
//! | Beginner     | 1     | 800            |
//! | Intermediate | 2     | 1200           |
//! | Advanced     | 3     | 1600           |
//! | Expert       | 4     | 2000           |
//! | Master       | 5     | 2400           |
//!
//! Depth is the only strength knob. The nominal rating is used as the opponent rating
//! when updating the human's Elo after a game.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Beginner,
    #[default]
    Intermediate,
    Advanced,
    Expert,
    Master,
}

impl Difficulty {
    pub const ALL: [Difficulty; 5] = [
        Difficulty::Beginner,
        Difficulty::Intermediate,
        Difficulty::Advanced,
        Difficulty::Expert,
        Difficulty::Master,
    ];

    /// Search depth in plies.
    pub const fn depth(self) -> u32 {
        match self {
            Difficulty::Beginner => 1,
            Difficulty::Intermediate => 2,
            Difficulty::Advanced => 3,
            Difficulty::Expert => 4,
            Difficulty::Master => 5,
        }
    }

    pub const fn nominal_rating(self) -> i32 {
        match self {
            Difficulty::Beginner => 800,
            Difficulty::Intermediate => 1200,
            Difficulty::Advanced => 1600,
            Difficulty::Expert => 2000,
            Difficulty::Master => 2400,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Difficulty::Beginner => "beginner",
            Difficulty::Intermediate => "intermediate",
            Difficulty::Advanced => "advanced",
            Difficulty::Expert => "expert",
            Difficulty::Master => "master",
        }
    }

    pub const fn description(self) -> &'static str {
        match self {
            Difficulty::Beginner => "Looks one ply ahead; grabs material greedily",
            Difficulty::Intermediate => "Sees the immediate reply to its move",
            Difficulty::Advanced => "Three-ply lookahead; spots simple tactics",
            Difficulty::Expert => "Four-ply lookahead; avoids most one-move blunders",
            Difficulty::Master => "Five-ply lookahead; slowest and strongest tier",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.name()) }
}

impl FromStr for Difficulty {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Difficulty::ALL.iter().copied()
            .find(|d| d.name() == wanted)
            .ok_or_else(|| ConfigError::UnknownDifficulty(s.to_string()))
    }
}
