pub mod cozy;

use crate::error::EngineError;
use crate::types::{Color, Move, Piece};

pub use cozy::{CozyRules, Position};

/// Move-legality capability consumed by search and sessions.
///
/// Positions are opaque; everything the core needs is asked through these methods.
/// `apply` and `undo` form a stack: every successful `apply` must be matched by an `undo`
/// that restores the exact prior state.
pub trait Rules: Send + Sync + 'static {
    type Position: Clone + Send + Sync + 'static;

    fn legal_moves(&self, pos: &Self::Position) -> Result<Vec<Move>, EngineError>;
    fn apply(&self, pos: &mut Self::Position, mv: &Move) -> Result<(), EngineError>;
    fn undo(&self, pos: &mut Self::Position) -> Result<(), EngineError>;
    fn is_check(&self, pos: &Self::Position) -> bool;
    fn is_checkmate(&self, pos: &Self::Position) -> bool;
    fn is_stalemate(&self, pos: &Self::Position) -> bool;
    fn is_draw(&self, pos: &Self::Position) -> bool;
    fn side_to_move(&self, pos: &Self::Position) -> Color;
    /// Number of `piece`s of `color` on the board.
    fn piece_count(&self, pos: &Self::Position, color: Color, piece: Piece) -> u32;

    fn is_terminal(&self, pos: &Self::Position) -> bool {
        self.is_checkmate(pos) || self.is_stalemate(pos) || self.is_draw(pos)
    }
}
