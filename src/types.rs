use std::fmt;

pub use cozy_chess::{Color, File, Piece, Rank, Square};
use serde::{Deserialize, Serialize};

/// A move in standard coordinate form. Castling is expressed as the king's two-square step.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Move {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<Piece>,
    pub notation: Option<String>,
}

impl Move {
    pub fn new(from: Square, to: Square, promotion: Option<Piece>) -> Self {
        Self { from, to, promotion, notation: None }
    }

    pub fn with_notation(mut self, notation: impl Into<String>) -> Self {
        self.notation = Some(notation.into());
        self
    }

    /// Same from/to/promotion, notation ignored.
    pub fn same_as(&self, from: Square, to: Square, promotion: Option<Piece>) -> bool {
        self.from == from && self.to == to && self.promotion == promotion
    }

    /// Parse coordinate notation such as `e2e4` or `e7e8q`.
    pub fn parse_coord(s: &str) -> Option<Self> {
        let s = s.trim();
        if s.len() != 4 && s.len() != 5 { return None; }
        let from: Square = s.get(0..2)?.parse().ok()?;
        let to: Square = s.get(2..4)?.parse().ok()?;
        let promotion = match s.get(4..5) {
            None => None,
            Some(p) => Some(promotion_from_char(p.chars().next()?)?),
        };
        Some(Self::new(from, to, promotion))
    }
}

fn promotion_from_char(c: char) -> Option<Piece> {
    match c.to_ascii_lowercase() {
        'n' => Some(Piece::Knight),
        'b' => Some(Piece::Bishop),
        'r' => Some(Piece::Rook),
        'q' => Some(Piece::Queen),
        _ => None,
    }
}

fn promotion_char(p: Piece) -> char {
    match p {
        Piece::Knight => 'n',
        Piece::Bishop => 'b',
        Piece::Rook => 'r',
        Piece::Queen => 'q',
        Piece::Pawn => 'p',
        Piece::King => 'k',
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(n) = &self.notation { return write!(f, "{}", n); }
        write!(f, "{}{}", self.from, self.to)?;
        if let Some(p) = self.promotion { write!(f, "{}", promotion_char(p))?; }
        Ok(())
    }
}

/// Best move for the side to move plus its minimax score (positive favours White).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    pub best_move: Move,
    pub score: i32,
    pub nodes: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameStatus {
    InProgress,
    Checkmate,
    Stalemate,
    Draw,
}

impl GameStatus {
    pub fn is_terminal(self) -> bool { self != GameStatus::InProgress }
}

/// Game result from the human player's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Outcome {
    Win,
    Loss,
    Draw,
}

impl Outcome {
    /// Actual score fed into the Elo formula.
    pub fn actual_score(self) -> f64 {
        match self {
            Outcome::Win => 1.0,
            Outcome::Loss => 0.0,
            Outcome::Draw => 0.5,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self { Outcome::Win => "win", Outcome::Loss => "loss", Outcome::Draw => "draw" };
        f.write_str(s)
    }
}
