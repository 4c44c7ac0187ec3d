#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use duelcore::board::Rules;
use duelcore::error::EngineError;
use duelcore::types::{Color, Move, Piece, Square};
use duelcore::{evaluate, CozyRules, Position};
use parking_lot::{Condvar, Mutex};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Plain minimax without pruning, used as the oracle for alpha-beta.
pub fn minimax<R: Rules>(rules: &R, pos: &mut R::Position, depth: u32) -> i32 {
    if depth == 0 || rules.is_terminal(pos) { return evaluate(rules, pos); }
    let moves = rules.legal_moves(pos).unwrap();
    if moves.is_empty() { return evaluate(rules, pos); }
    let maximizing = rules.side_to_move(pos) == Color::White;
    let mut best = if maximizing { i32::MIN } else { i32::MAX };
    for m in &moves {
        rules.apply(pos, m).unwrap();
        let s = minimax(rules, pos, depth - 1);
        rules.undo(pos).unwrap();
        best = if maximizing { best.max(s) } else { best.min(s) };
    }
    best
}

// Synthetic game trees: node value v is encoded as v white pawns (or -v black pawns).

#[derive(Debug)]
pub struct Node {
    pub children: Vec<usize>,
    pub value: i32,
}

#[derive(Debug)]
pub struct Tree {
    pub nodes: Vec<Node>,
    pub root_side: Color,
}

#[derive(Clone, Debug)]
pub struct TreePos {
    pub tree: Arc<Tree>,
    pub path: Vec<usize>,
}

impl TreePos {
    pub fn root(tree: Arc<Tree>) -> Self { Self { tree, path: vec![0] } }
    fn node(&self) -> &Node { &self.tree.nodes[*self.path.last().unwrap()] }
}

pub fn random_tree(seed: u64, depth: u32, max_branch: usize, root_side: Color) -> Arc<Tree> {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut nodes = vec![Node { children: Vec::new(), value: rng.gen_range(-40..=40) }];
    let mut frontier = vec![(0usize, 0u32)];
    while let Some((id, d)) = frontier.pop() {
        if d == depth { continue; }
        let n = rng.gen_range(0..=max_branch);
        for _ in 0..n {
            let child = nodes.len();
            nodes.push(Node { children: Vec::new(), value: rng.gen_range(-40..=40) });
            nodes[id].children.push(child);
            frontier.push((child, d + 1));
        }
    }
    Arc::new(Tree { nodes, root_side })
}

#[derive(Clone, Copy, Debug, Default)]
pub struct TreeRules;

impl Rules for TreeRules {
    type Position = TreePos;

    fn legal_moves(&self, pos: &TreePos) -> Result<Vec<Move>, EngineError> {
        Ok((0..pos.node().children.len())
            .map(|i| Move::new(Square::index(i), Square::index(i), None))
            .collect())
    }

    fn apply(&self, pos: &mut TreePos, mv: &Move) -> Result<(), EngineError> {
        let child = *pos.node().children.get(mv.from as usize)
            .ok_or_else(|| EngineError::IllegalMove(mv.to_string()))?;
        pos.path.push(child);
        Ok(())
    }

    fn undo(&self, pos: &mut TreePos) -> Result<(), EngineError> {
        if pos.path.len() <= 1 { return Err(EngineError::NothingToUndo); }
        pos.path.pop();
        Ok(())
    }

    fn is_check(&self, _pos: &TreePos) -> bool { false }
    fn is_checkmate(&self, _pos: &TreePos) -> bool { false }
    fn is_stalemate(&self, _pos: &TreePos) -> bool { false }
    fn is_draw(&self, _pos: &TreePos) -> bool { false }

    fn side_to_move(&self, pos: &TreePos) -> Color {
        if pos.path.len() % 2 == 1 { pos.tree.root_side } else { !pos.tree.root_side }
    }

    fn piece_count(&self, pos: &TreePos, color: Color, piece: Piece) -> u32 {
        if piece != Piece::Pawn { return 0; }
        let v = pos.node().value;
        match color {
            Color::White => v.max(0) as u32,
            Color::Black => (-v).max(0) as u32,
        }
    }
}

/// Cozy rules whose `undo` blocks until the gate is opened. Only searches call `undo`.
#[derive(Default)]
pub struct Gate {
    open: Mutex<bool>,
    cv: Condvar,
    passes: AtomicUsize,
}

impl Gate {
    pub fn new() -> Arc<Self> { Arc::new(Self::default()) }

    pub fn open(&self) {
        *self.open.lock() = true;
        self.cv.notify_all();
    }

    /// How many `undo` calls have gone through.
    pub fn passes(&self) -> usize { self.passes.load(Ordering::SeqCst) }

    fn pass(&self) {
        let mut open = self.open.lock();
        while !*open { self.cv.wait(&mut open); }
        self.passes.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Clone)]
pub struct GatedRules {
    pub gate: Arc<Gate>,
}

impl Rules for GatedRules {
    type Position = Position;

    fn legal_moves(&self, pos: &Position) -> Result<Vec<Move>, EngineError> { CozyRules.legal_moves(pos) }
    fn apply(&self, pos: &mut Position, mv: &Move) -> Result<(), EngineError> { CozyRules.apply(pos, mv) }
    fn undo(&self, pos: &mut Position) -> Result<(), EngineError> {
        self.gate.pass();
        CozyRules.undo(pos)
    }
    fn is_check(&self, pos: &Position) -> bool { CozyRules.is_check(pos) }
    fn is_checkmate(&self, pos: &Position) -> bool { CozyRules.is_checkmate(pos) }
    fn is_stalemate(&self, pos: &Position) -> bool { CozyRules.is_stalemate(pos) }
    fn is_draw(&self, pos: &Position) -> bool { CozyRules.is_draw(pos) }
    fn side_to_move(&self, pos: &Position) -> Color { CozyRules.side_to_move(pos) }
    fn piece_count(&self, pos: &Position, color: Color, piece: Piece) -> u32 { CozyRules.piece_count(pos, color, piece) }
}

/// Cozy rules that report a corrupt position once `fail_at_ply` moves have been made.
#[derive(Clone, Copy)]
pub struct FailingRules {
    pub fail_at_ply: usize,
}

impl Rules for FailingRules {
    type Position = Position;

    fn legal_moves(&self, pos: &Position) -> Result<Vec<Move>, EngineError> {
        if pos.ply() >= self.fail_at_ply { return Err(EngineError::Corrupt("move list unavailable".into())); }
        CozyRules.legal_moves(pos)
    }
    fn apply(&self, pos: &mut Position, mv: &Move) -> Result<(), EngineError> { CozyRules.apply(pos, mv) }
    fn undo(&self, pos: &mut Position) -> Result<(), EngineError> { CozyRules.undo(pos) }
    fn is_check(&self, pos: &Position) -> bool { CozyRules.is_check(pos) }
    fn is_checkmate(&self, pos: &Position) -> bool { CozyRules.is_checkmate(pos) }
    fn is_stalemate(&self, pos: &Position) -> bool { CozyRules.is_stalemate(pos) }
    fn is_draw(&self, pos: &Position) -> bool { CozyRules.is_draw(pos) }
    fn side_to_move(&self, pos: &Position) -> Color { CozyRules.side_to_move(pos) }
    fn piece_count(&self, pos: &Position, color: Color, piece: Piece) -> u32 { CozyRules.piece_count(pos, color, piece) }
}

/// Cozy rules that never report the game as finished, so the search is the first to notice
/// a side without moves.
#[derive(Clone, Copy)]
pub struct BlindRules;

impl Rules for BlindRules {
    type Position = Position;

    fn legal_moves(&self, pos: &Position) -> Result<Vec<Move>, EngineError> { CozyRules.legal_moves(pos) }
    fn apply(&self, pos: &mut Position, mv: &Move) -> Result<(), EngineError> { CozyRules.apply(pos, mv) }
    fn undo(&self, pos: &mut Position) -> Result<(), EngineError> { CozyRules.undo(pos) }
    fn is_check(&self, pos: &Position) -> bool { CozyRules.is_check(pos) }
    fn is_checkmate(&self, _pos: &Position) -> bool { false }
    fn is_stalemate(&self, _pos: &Position) -> bool { false }
    fn is_draw(&self, _pos: &Position) -> bool { false }
    fn side_to_move(&self, pos: &Position) -> Color { CozyRules.side_to_move(pos) }
    fn piece_count(&self, pos: &Position, color: Color, piece: Piece) -> u32 { CozyRules.piece_count(pos, color, piece) }
}
