pub mod store;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::{info, warn};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::types::Outcome;

pub use store::{JsonFileStore, MemoryStore, RatingStore};

pub const STARTING_RATING: i32 = 1200;
pub const DEFAULT_K_FACTOR: f64 = 32.0;

/// Probability-like expected score of `rating` against `opponent`.
pub fn expected_score(rating: i32, opponent: i32) -> f64 {
    1.0 / (1.0 + 10f64.powf((f64::from(opponent) - f64::from(rating)) / 400.0))
}

/// `rating + k * (actual - expected)`, rounded to the nearest point.
pub fn elo_update(rating: i32, opponent: i32, outcome: Outcome, k: f64) -> i32 {
    let delta = k * (outcome.actual_score() - expected_score(rating, opponent));
    (f64::from(rating) + delta).round() as i32
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub result: Outcome,
    pub opponent_rating: i32,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub rating_after: Option<i32>,
}

/// Persisted rating plus its append-only match history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerRatingRecord {
    pub rating: i32,
    #[serde(default)]
    pub peak_rating: i32,
    #[serde(default)]
    pub wins: u32,
    #[serde(default)]
    pub losses: u32,
    #[serde(default)]
    pub draws: u32,
    #[serde(default)]
    pub history: Vec<MatchResult>,
}

impl PlayerRatingRecord {
    pub fn new(rating: i32) -> Self {
        Self { rating, peak_rating: rating, wins: 0, losses: 0, draws: 0, history: Vec::new() }
    }

    pub fn total_games(&self) -> u32 { self.wins + self.losses + self.draws }

    fn record(&mut self, result: MatchResult, new_rating: i32) {
        match result.result {
            Outcome::Win => self.wins += 1,
            Outcome::Loss => self.losses += 1,
            Outcome::Draw => self.draws += 1,
        }
        self.rating = new_rating;
        self.peak_rating = self.peak_rating.max(new_rating);
        self.history.push(result);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RatingUpdate {
    pub player: String,
    pub outcome: Outcome,
    pub old_rating: i32,
    pub new_rating: i32,
}

/// Owns read-modify-write access to rating records in a store.
///
/// Updates are serialized through an internal lock, so one tracker shared between
/// sessions never loses a concurrent update for the same player.
pub struct RatingTracker {
    store: Arc<dyn RatingStore>,
    k_factor: f64,
    initial_rating: i32,
    write_lock: Mutex<()>,
}

impl RatingTracker {
    pub fn new(store: Arc<dyn RatingStore>) -> Self {
        Self::with_params(store, DEFAULT_K_FACTOR, STARTING_RATING)
    }

    pub fn with_params(store: Arc<dyn RatingStore>, k_factor: f64, initial_rating: i32) -> Self {
        Self { store, k_factor, initial_rating, write_lock: Mutex::new(()) }
    }

    pub fn key_for(player: &str) -> String { format!("duelcore.rating.{player}") }

    pub fn load(&self, player: &str) -> Result<Option<PlayerRatingRecord>, StoreError> {
        match self.store.get(&Self::key_for(player))? {
            Some(v) => Ok(Some(serde_json::from_value(v)?)),
            None => Ok(None),
        }
    }

    /// Apply one finished game: exactly one rating change and one appended history entry.
    pub fn update(&self, player: &str, outcome: Outcome, opponent_rating: i32) -> Result<RatingUpdate, StoreError> {
        let _guard = self.write_lock.lock();
        let mut rec = self.load(player)?.unwrap_or_else(|| PlayerRatingRecord::new(self.initial_rating));
        let old_rating = rec.rating;
        let new_rating = elo_update(old_rating, opponent_rating, outcome, self.k_factor);
        let entry = MatchResult { result: outcome, opponent_rating, timestamp: Utc::now(), rating_after: Some(new_rating) };
        rec.record(entry, new_rating);
        self.store.set(&Self::key_for(player), serde_json::to_value(&rec)?)?;
        info!("rating {}: {} -> {} after {} vs {}", player, old_rating, new_rating, outcome, opponent_rating);
        Ok(RatingUpdate { player: player.to_string(), outcome, old_rating, new_rating })
    }

    /// Like [`update`](Self::update) but retries once and then gives up with a warning.
    pub fn update_or_drop(&self, player: &str, outcome: Outcome, opponent_rating: i32) -> Option<RatingUpdate> {
        match self.update(player, outcome, opponent_rating) {
            Ok(u) => Some(u),
            Err(first) => {
                warn!("rating update for {} failed ({}), retrying", player, first);
                match self.update(player, outcome, opponent_rating) {
                    Ok(u) => Some(u),
                    Err(e) => { warn!("rating update for {} dropped: {}", player, e); None }
                }
            }
        }
    }
}
