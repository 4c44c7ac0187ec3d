use crate::board::Rules;
use crate::types::{Color, Piece};

const PAWN: i32 = 100;
const KNIGHT: i32 = 320;
const BISHOP: i32 = 330;
const ROOK: i32 = 500;
const QUEEN: i32 = 900;
const KING: i32 = 20_000;

// Mate scoring is flat: a mate in one and a mate in five score the same.
pub const MATE_SCORE: i32 = 10_000;
pub const DRAW_SCORE: i32 = 0;

pub fn piece_value(piece: Piece) -> i32 {
    match piece {
        Piece::Pawn => PAWN,
        Piece::Knight => KNIGHT,
        Piece::Bishop => BISHOP,
        Piece::Rook => ROOK,
        Piece::Queen => QUEEN,
        Piece::King => KING,
    }
}

// Side-agnostic material in centipawns: positive means White has more material.
pub fn material<R: Rules>(rules: &R, pos: &R::Position) -> i32 {
    Piece::ALL.iter().map(|&p| {
        let w = rules.piece_count(pos, Color::White, p) as i32;
        let b = rules.piece_count(pos, Color::Black, p) as i32;
        (w - b) * piece_value(p)
    }).sum()
}

/// Static score from White's point of view. Mate and draws override material.
pub fn evaluate<R: Rules>(rules: &R, pos: &R::Position) -> i32 {
    if rules.is_checkmate(pos) {
        return if rules.side_to_move(pos) == Color::White { -MATE_SCORE } else { MATE_SCORE };
    }
    if rules.is_stalemate(pos) || rules.is_draw(pos) { return DRAW_SCORE; }
    material(rules, pos)
}
