pub mod alphabeta;
pub mod eval;

pub use alphabeta::Searcher;
pub use eval::{evaluate, material, MATE_SCORE};
