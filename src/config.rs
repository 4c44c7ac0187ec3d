use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::difficulty::Difficulty;
use crate::error::ConfigError;
use crate::rating::{DEFAULT_K_FACTOR, STARTING_RATING};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub difficulty: Difficulty,
    pub k_factor: f64,
    pub initial_rating: i32,
    /// Store key the human's rating record lives under.
    pub player_key: String,
    pub search_threads: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::default(),
            k_factor: DEFAULT_K_FACTOR,
            initial_rating: STARTING_RATING,
            player_key: "player".to_string(),
            search_threads: 1,
        }
    }
}

impl SessionConfig {
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: path.display().to_string(), source })?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }
}
