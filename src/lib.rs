// Human-vs-computer chess core: fixed-depth alpha-beta, material eval, sessions, Elo.
pub mod board;
pub mod config;
pub mod difficulty;
pub mod error;
pub mod rating;
pub mod search;
pub mod session;
pub mod types;

pub use board::{CozyRules, Position, Rules};
pub use config::SessionConfig;
pub use difficulty::Difficulty;
pub use error::{ConfigError, EngineError, MoveRejected, StoreError};
pub use rating::{PlayerRatingRecord, RatingTracker};
pub use search::{evaluate, Searcher, MATE_SCORE};
pub use session::{GameSession, GameState, Phase, Polled};
pub use types::{Color, GameStatus, Move, Outcome, SearchResult};
