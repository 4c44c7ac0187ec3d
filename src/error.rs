use thiserror::Error;

/// Failures raised by a legality engine while applying, undoing or parsing positions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("illegal move: {0}")]
    IllegalMove(String),
    #[error("no move to undo")]
    NothingToUndo,
    #[error("FEN error: {0}")]
    InvalidFen(String),
    #[error("corrupt position: {0}")]
    Corrupt(String),
    #[error("search aborted")]
    Aborted,
}

/// Why a human move was refused. The session is left untouched in every case.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoveRejected {
    #[error("move is not legal in the current position")]
    Illegal,
    #[error("the game is over")]
    GameOver,
    #[error("the computer is still thinking")]
    ComputerThinking,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("rating record is malformed: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("store backend failed: {0}")]
    Backend(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Read { path: String, source: std::io::Error },
    #[error("malformed config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("unknown difficulty tier: {0}")]
    UnknownDifficulty(String),
}
