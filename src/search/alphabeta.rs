use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::debug;
use rayon::prelude::*;

use crate::board::Rules;
use crate::error::EngineError;
use crate::search::eval::evaluate;
use crate::types::{Color, Move, SearchResult};

// Wider than any reachable score so the root window never clips a material sum.
const INF: i32 = i32::MAX / 2;

/// Fixed-depth minimax with alpha-beta pruning. White maximizes, Black minimizes.
///
/// The searcher mutates the position it is handed through `apply`/`undo` and always
/// restores it before returning, including on pruning breaks and engine errors raised
/// below the root.
pub struct Searcher<'a, R: Rules> {
    rules: &'a R,
    nodes: u64,
    threads: usize,
    abort: Option<Arc<AtomicBool>>,
}

impl<'a, R: Rules> Searcher<'a, R> {
    pub fn new(rules: &'a R) -> Self {
        Self { rules, nodes: 0, threads: 1, abort: None }
    }

    /// Search root moves on `n` rayon workers, each on its own cloned position.
    pub fn with_threads(mut self, n: usize) -> Self {
        self.threads = n.max(1);
        self
    }

    /// Give up with [`EngineError::Aborted`] once `flag` is raised. Checked at every node.
    pub fn with_abort(mut self, flag: Arc<AtomicBool>) -> Self {
        self.abort = Some(flag);
        self
    }

    pub fn nodes(&self) -> u64 { self.nodes }

    pub fn threads(&self) -> usize { self.threads }

    /// Minimax value of `pos` at `depth`; depth 0 is the static evaluation.
    pub fn score(&mut self, pos: &mut R::Position, depth: u32) -> Result<i32, EngineError> {
        self.alphabeta(pos, depth, -INF, INF)
    }

    /// Best move for the side to move, or `None` when it has no legal moves.
    /// A requested depth of 0 is searched as depth 1.
    pub fn find_best_move(&mut self, pos: &mut R::Position, depth: u32) -> Result<Option<SearchResult>, EngineError> {
        let depth = depth.max(1);
        self.nodes = 0;
        let moves = self.rules.legal_moves(pos)?;
        if moves.is_empty() { return Ok(None); }
        let maximizing = self.rules.side_to_move(pos) == Color::White;

        let best = if self.threads > 1 && depth > 1 {
            self.root_parallel(pos, &moves, depth, maximizing)?
        } else {
            self.root_serial(pos, &moves, depth, maximizing)?
        };
        let Some((best_move, score)) = best else { return Ok(None); };
        debug!("depth {} best {} score {} nodes {}", depth, best_move, score, self.nodes);
        Ok(Some(SearchResult { best_move, score, nodes: self.nodes }))
    }

    fn root_serial(&mut self, pos: &mut R::Position, moves: &[Move], depth: u32, maximizing: bool) -> Result<Option<(Move, i32)>, EngineError> {
        let mut alpha = -INF;
        let mut beta = INF;
        let mut best: Option<(Move, i32)> = None;
        for mv in moves {
            let score = self.child(pos, mv, depth - 1, alpha, beta)?;
            if best.as_ref().map_or(true, |(_, bs)| better(score, *bs, maximizing)) {
                best = Some((mv.clone(), score));
            }
            if maximizing { alpha = alpha.max(score); } else { beta = beta.min(score); }
        }
        Ok(best)
    }

    fn root_parallel(&mut self, pos: &R::Position, moves: &[Move], depth: u32, maximizing: bool) -> Result<Option<(Move, i32)>, EngineError> {
        let rules = self.rules;
        let abort = &self.abort;
        let results: Vec<(i32, u64)> = moves.par_iter().map(|mv| -> Result<(i32, u64), EngineError> {
            let mut child = pos.clone();
            let mut w = Searcher::new(rules);
            w.abort = abort.clone();
            let score = w.child(&mut child, mv, depth - 1, -INF, INF)?;
            Ok((score, w.nodes))
        }).collect::<Result<Vec<_>, EngineError>>()?;

        // Reduce in enumeration order so ties resolve exactly like the serial search.
        let mut best: Option<(Move, i32)> = None;
        for (mv, (score, n)) in moves.iter().zip(results) {
            self.nodes += n;
            if best.as_ref().map_or(true, |(_, bs)| better(score, *bs, maximizing)) {
                best = Some((mv.clone(), score));
            }
        }
        Ok(best)
    }

    fn child(&mut self, pos: &mut R::Position, mv: &Move, depth: u32, alpha: i32, beta: i32) -> Result<i32, EngineError> {
        self.rules.apply(pos, mv)?;
        let score = self.alphabeta(pos, depth, alpha, beta);
        self.rules.undo(pos)?;
        score
    }

    fn alphabeta(&mut self, pos: &mut R::Position, depth: u32, mut alpha: i32, mut beta: i32) -> Result<i32, EngineError> {
        self.nodes += 1;
        if let Some(ref flag) = self.abort { if flag.load(Ordering::Relaxed) { return Err(EngineError::Aborted); } }
        if depth == 0 || self.rules.is_terminal(pos) { return Ok(evaluate(self.rules, pos)); }
        let moves = self.rules.legal_moves(pos)?;
        if moves.is_empty() { return Ok(evaluate(self.rules, pos)); }

        let maximizing = self.rules.side_to_move(pos) == Color::White;
        let mut best = if maximizing { -INF } else { INF };
        for mv in &moves {
            let score = self.child(pos, mv, depth - 1, alpha, beta)?;
            if maximizing {
                best = best.max(score);
                alpha = alpha.max(best);
            } else {
                best = best.min(score);
                beta = beta.min(best);
            }
            if beta <= alpha { break; }
        }
        Ok(best)
    }
}

fn better(score: i32, best: i32, maximizing: bool) -> bool {
    if maximizing { score > best } else { score < best }
}
