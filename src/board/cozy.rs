use cozy_chess::Board;

use crate::board::Rules;
use crate::error::EngineError;
use crate::types::{Color, File, Move, Piece, Square};

/// A cozy-chess board with an undo stack.
#[derive(Clone, Debug)]
pub struct Position {
    board: Board,
    stack: Vec<Board>,
}

impl Default for Position {
    fn default() -> Self { Self::startpos() }
}

impl Position {
    pub fn startpos() -> Self {
        Self { board: Board::default(), stack: Vec::with_capacity(128) }
    }

    pub fn from_fen(fen: &str) -> Result<Self, EngineError> {
        Board::from_fen(fen, false)
            .map(|b| Self { board: b, stack: Vec::with_capacity(128) })
            .map_err(|e| EngineError::InvalidFen(format!("{e:?}")))
    }

    /// Start position followed by coordinate moves, e.g. `["e2e4", "e7e5"]`.
    pub fn from_moves<S: AsRef<str>>(moves: &[S]) -> Result<Self, EngineError> {
        let mut pos = Self::startpos();
        for m in moves { pos.make_move_coord(m.as_ref())?; }
        Ok(pos)
    }

    pub fn board(&self) -> &Board { &self.board }

    /// Number of moves that can still be undone.
    pub fn ply(&self) -> usize { self.stack.len() }

    pub fn make_move_coord(&mut self, coord: &str) -> Result<(), EngineError> {
        let mv = Move::parse_coord(coord).ok_or_else(|| EngineError::IllegalMove(coord.to_string()))?;
        self.make(&mv)
    }

    pub fn make(&mut self, mv: &Move) -> Result<(), EngineError> {
        let raw = self.cozy_move(mv).ok_or_else(|| EngineError::IllegalMove(mv.to_string()))?;
        let prev = self.board.clone();
        self.board.try_play(raw).map_err(|_| EngineError::IllegalMove(mv.to_string()))?;
        self.stack.push(prev);
        Ok(())
    }

    pub fn unmake(&mut self) -> Result<(), EngineError> {
        let prev = self.stack.pop().ok_or(EngineError::NothingToUndo)?;
        self.board = prev;
        Ok(())
    }

    pub fn moves(&self) -> Vec<Move> {
        let mut out = Vec::with_capacity(64);
        self.board.generate_moves(|ml| {
            for m in ml { out.push(self.core_move(m)); }
            false
        });
        out
    }

    fn has_moves(&self) -> bool {
        let mut any = false;
        self.board.generate_moves(|ml| { if !ml.is_empty() { any = true; } any });
        any
    }

    pub fn in_check(&self) -> bool { !self.board.checkers().is_empty() }

    pub fn is_checkmate(&self) -> bool { self.in_check() && !self.has_moves() }

    pub fn is_stalemate(&self) -> bool { !self.in_check() && !self.has_moves() }

    /// Draw by rule: fifty-move rule, threefold repetition or insufficient material.
    pub fn is_draw(&self) -> bool {
        if self.board.halfmove_clock() >= 100 { return true; }
        self.is_repetition() || self.insufficient_material()
    }

    fn is_repetition(&self) -> bool {
        let h = self.board.hash();
        let window = self.board.halfmove_clock() as usize;
        let seen = self.stack.iter().rev().take(window).filter(|b| b.hash() == h).count();
        seen >= 2
    }

    fn insufficient_material(&self) -> bool {
        let b = &self.board;
        let heavy = b.pieces(Piece::Pawn) | b.pieces(Piece::Rook) | b.pieces(Piece::Queen);
        if !heavy.is_empty() { return false; }
        let minors = (b.pieces(Piece::Knight) | b.pieces(Piece::Bishop)).into_iter().count();
        minors <= 1
    }

    pub fn count(&self, color: Color, piece: Piece) -> u32 {
        self.board.colored_pieces(color, piece).into_iter().count() as u32
    }

    // cozy-chess encodes castling as king-takes-own-rook; the core speaks king-two-squares.
    fn core_move(&self, m: cozy_chess::Move) -> Move {
        let b = &self.board;
        let stm = b.side_to_move();
        let mut to = m.to;
        if b.piece_on(m.from) == Some(Piece::King) && b.color_on(m.to) == Some(stm) {
            let file = if m.to.file() as i32 > m.from.file() as i32 { File::G } else { File::C };
            to = Square::new(file, m.from.rank());
        }
        Move::new(m.from, to, m.promotion)
    }

    fn cozy_move(&self, mv: &Move) -> Option<cozy_chess::Move> {
        let b = &self.board;
        let mut to = mv.to;
        let file_gap = (mv.to.file() as i32 - mv.from.file() as i32).abs();
        if b.piece_on(mv.from) == Some(Piece::King) && mv.from.rank() == mv.to.rank() && file_gap == 2 {
            let rights = b.castle_rights(b.side_to_move());
            let rook_file = if mv.to.file() as i32 > mv.from.file() as i32 { rights.short } else { rights.long };
            to = Square::new(rook_file?, mv.from.rank());
        }
        Some(cozy_chess::Move { from: mv.from, to, promotion: mv.promotion })
    }
}

/// Legality engine backed by cozy-chess.
#[derive(Clone, Copy, Debug, Default)]
pub struct CozyRules;

impl Rules for CozyRules {
    type Position = Position;

    fn legal_moves(&self, pos: &Position) -> Result<Vec<Move>, EngineError> { Ok(pos.moves()) }

    fn apply(&self, pos: &mut Position, mv: &Move) -> Result<(), EngineError> { pos.make(mv) }

    fn undo(&self, pos: &mut Position) -> Result<(), EngineError> { pos.unmake() }

    fn is_check(&self, pos: &Position) -> bool { pos.in_check() }

    fn is_checkmate(&self, pos: &Position) -> bool { pos.is_checkmate() }

    fn is_stalemate(&self, pos: &Position) -> bool { pos.is_stalemate() }

    fn is_draw(&self, pos: &Position) -> bool { pos.is_draw() }

    fn side_to_move(&self, pos: &Position) -> Color { pos.board().side_to_move() }

    fn piece_count(&self, pos: &Position, color: Color, piece: Piece) -> u32 { pos.count(color, piece) }
}
