//! Turn-taking between a human and the search engine.
//!
//! A session is a small state machine:
//!
//! ```text
//! AwaitingHumanMove --human move--> ComputerThinking --search reply--> AwaitingHumanMove
//!         |                                |
//!         +------------terminal------------+----> GameOver
//! ```
//!
//! `new_game` is accepted in every phase. Searches run on the rayon pool and report back
//! over a channel tagged with the session generation; `new_game` raises the abandoned
//! search's abort flag and bumps the generation, so whatever that search still sends is
//! dropped instead of applied.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender, TryRecvError};
use log::{debug, error, info, warn};

use crate::board::Rules;
use crate::config::SessionConfig;
use crate::difficulty::Difficulty;
use crate::error::{EngineError, MoveRejected};
use crate::rating::{RatingTracker, RatingUpdate};
use crate::search::Searcher;
use crate::types::{Color, GameStatus, Move, Outcome, Piece, SearchResult, Square};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    AwaitingHumanMove,
    ComputerThinking,
    GameOver,
}

#[derive(Debug, Clone)]
pub struct GameState<P> {
    pub position: P,
    pub side_to_move: Color,
    pub move_history: Vec<Move>,
    pub status: GameStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameOverReport {
    pub outcome: Outcome,
    pub final_status: GameStatus,
    pub winner: Option<Color>,
    pub rating: Option<RatingUpdate>,
}

/// Notifications emitted by a session. All methods default to doing nothing.
pub trait SessionEvents: Send {
    fn on_computer_move_applied(&mut self, _mv: &Move) {}
    fn on_game_over(&mut self, _report: &GameOverReport) {}
    fn on_new_game(&mut self) {}
}

pub struct NoEvents;

impl SessionEvents for NoEvents {}

/// What happened when the session looked for a search reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Polled {
    /// No search in flight and nothing queued.
    Idle,
    /// The current search has not answered yet.
    Pending,
    Applied(Move),
    /// The search found no legal move; the game was closed with this status.
    GameEnded(GameStatus),
    /// A reply from before the last `new_game` was dropped.
    Discarded,
    Failed(EngineError),
}

struct Reply {
    generation: u64,
    result: Result<Option<SearchResult>, EngineError>,
}

pub struct GameSession<R: Rules> {
    rules: Arc<R>,
    initial: R::Position,
    state: GameState<R::Position>,
    phase: Phase,
    difficulty: Difficulty,
    human: Color,
    generation: u64,
    in_flight: bool,
    abort: Arc<AtomicBool>,
    rated: bool,
    threads: usize,
    tx: Sender<Reply>,
    rx: Receiver<Reply>,
    tracker: Option<Arc<RatingTracker>>,
    player_key: String,
    events: Box<dyn SessionEvents>,
    last_report: Option<GameOverReport>,
}

impl<R: Rules> GameSession<R> {
    /// The human plays whichever side is to move in `initial`.
    pub fn new(rules: R, initial: R::Position, difficulty: Difficulty) -> Self {
        let human = rules.side_to_move(&initial);
        let (tx, rx) = unbounded();
        let mut s = Self {
            rules: Arc::new(rules),
            state: fresh_state(human, initial.clone()),
            initial,
            phase: Phase::AwaitingHumanMove,
            difficulty,
            human,
            generation: 0,
            in_flight: false,
            abort: Arc::new(AtomicBool::new(false)),
            rated: false,
            threads: 1,
            tx,
            rx,
            tracker: None,
            player_key: "player".to_string(),
            events: Box::new(NoEvents),
            last_report: None,
        };
        s.settle_initial();
        s
    }

    pub fn from_config(rules: R, initial: R::Position, cfg: &SessionConfig, tracker: Option<Arc<RatingTracker>>) -> Self {
        let mut s = Self::new(rules, initial, cfg.difficulty).with_threads(cfg.search_threads);
        s.player_key = cfg.player_key.clone();
        s.tracker = tracker;
        s
    }

    pub fn with_tracker(mut self, tracker: Arc<RatingTracker>, player_key: impl Into<String>) -> Self {
        self.tracker = Some(tracker);
        self.player_key = player_key.into();
        self
    }

    pub fn with_events(mut self, events: Box<dyn SessionEvents>) -> Self {
        self.events = events;
        self
    }

    pub fn with_threads(mut self, n: usize) -> Self {
        self.threads = n.max(1);
        self
    }

    pub fn phase(&self) -> Phase { self.phase }
    pub fn state(&self) -> &GameState<R::Position> { &self.state }
    pub fn difficulty(&self) -> Difficulty { self.difficulty }
    pub fn human_color(&self) -> Color { self.human }
    pub fn generation(&self) -> u64 { self.generation }
    pub fn is_thinking(&self) -> bool { self.in_flight }
    /// True while a search is running that the caller can wait on. After a failed search the
    /// phase stays `ComputerThinking` but this turns false until `retry_search` or `new_game`.
    pub fn awaiting_computer(&self) -> bool { self.phase == Phase::ComputerThinking && self.in_flight }
    pub fn last_report(&self) -> Option<&GameOverReport> { self.last_report.as_ref() }
    pub fn rules(&self) -> &R { &self.rules }

    /// Try a human move. On rejection nothing about the session changes.
    pub fn human_move(&mut self, from: Square, to: Square, promotion: Option<Piece>) -> Result<Move, MoveRejected> {
        match self.phase {
            Phase::GameOver => return Err(MoveRejected::GameOver),
            Phase::ComputerThinking => return Err(MoveRejected::ComputerThinking),
            Phase::AwaitingHumanMove => {}
        }
        debug_assert_eq!(self.state.side_to_move, self.human);

        let legal = self.rules.legal_moves(&self.state.position).map_err(|e| {
            error!("legality engine failed listing moves: {}", e);
            MoveRejected::Illegal
        })?;
        let mv = legal.into_iter()
            .find(|m| m.same_as(from, to, promotion))
            .ok_or(MoveRejected::Illegal)?;
        if let Err(e) = self.rules.apply(&mut self.state.position, &mv) {
            warn!("legality engine refused listed move {}: {}", mv, e);
            return Err(MoveRejected::Illegal);
        }
        let mv = self.record(mv);
        debug!("human played {}", mv);

        let status = self.terminal_status();
        if status.is_terminal() {
            self.finish(status);
        } else {
            self.phase = Phase::ComputerThinking;
            self.dispatch_search();
        }
        Ok(mv)
    }

    /// Boolean form of [`human_move`](Self::human_move).
    pub fn on_human_move_attempt(&mut self, from: Square, to: Square, promotion: Option<Piece>) -> bool {
        self.human_move(from, to, promotion).is_ok()
    }

    /// Throw away the current game and any search still running for it.
    pub fn new_game(&mut self) {
        self.generation += 1;
        // Stop the abandoned search; the next one gets a fresh flag.
        self.abort.store(true, Ordering::Relaxed);
        self.abort = Arc::new(AtomicBool::new(false));
        self.in_flight = false;
        self.rated = false;
        self.last_report = None;
        self.state = fresh_state(self.human, self.initial.clone());
        self.phase = Phase::AwaitingHumanMove;
        self.settle_initial();
        debug!("new game, generation {}", self.generation);
        self.events.on_new_game();
    }

    /// Switching tier starts a new game.
    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        self.difficulty = difficulty;
        self.new_game();
    }

    /// Re-dispatch the computer's search after a failure. Returns false if there is nothing to retry.
    pub fn retry_search(&mut self) -> bool {
        if self.phase != Phase::ComputerThinking || self.in_flight { return false; }
        self.dispatch_search();
        true
    }

    /// Handle a search reply if one is ready, without blocking.
    pub fn poll(&mut self) -> Polled {
        match self.rx.try_recv() {
            Ok(reply) => self.handle_reply(reply),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => self.idle_or_pending(),
        }
    }

    /// Block up to `timeout` for a single search reply.
    pub fn wait(&mut self, timeout: Duration) -> Polled {
        match self.rx.recv_timeout(timeout) {
            Ok(reply) => self.handle_reply(reply),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => self.idle_or_pending(),
        }
    }

    /// Block until the current search is resolved, skipping stale replies.
    pub fn wait_for_computer(&mut self, timeout: Duration) -> Polled {
        let deadline = Instant::now() + timeout;
        loop {
            if !self.in_flight { return Polled::Idle; }
            let left = deadline.saturating_duration_since(Instant::now());
            match self.wait(left) {
                Polled::Discarded => continue,
                Polled::Pending if Instant::now() < deadline => continue,
                other => return other,
            }
        }
    }

    fn idle_or_pending(&self) -> Polled {
        if self.in_flight { Polled::Pending } else { Polled::Idle }
    }

    fn dispatch_search(&mut self) {
        let rules = Arc::clone(&self.rules);
        let mut pos = self.state.position.clone();
        let depth = self.difficulty.depth();
        let threads = self.threads;
        let generation = self.generation;
        let tx = self.tx.clone();
        let abort = Arc::clone(&self.abort);
        self.in_flight = true;
        debug!("dispatching depth {} search, generation {}", depth, generation);
        rayon::spawn(move || {
            let result = Searcher::new(&*rules).with_threads(threads).with_abort(abort).find_best_move(&mut pos, depth);
            // The session may be gone; nobody is left to tell.
            let _ = tx.send(Reply { generation, result });
        });
    }

    fn handle_reply(&mut self, reply: Reply) -> Polled {
        if reply.generation != self.generation || self.phase != Phase::ComputerThinking {
            warn!("discarding stale search reply from generation {} (now {})", reply.generation, self.generation);
            return Polled::Discarded;
        }
        self.in_flight = false;
        let res = match reply.result {
            Ok(Some(res)) => res,
            Ok(None) => {
                let status = if self.rules.is_check(&self.state.position) { GameStatus::Checkmate } else { GameStatus::Stalemate };
                warn!("search found no legal move; closing game as {:?}", status);
                self.finish(status);
                return Polled::GameEnded(status);
            }
            Err(e) => {
                error!("search failed: {}", e);
                return Polled::Failed(e);
            }
        };
        if let Err(e) = self.rules.apply(&mut self.state.position, &res.best_move) {
            error!("search returned unplayable move {}: {}", res.best_move, e);
            return Polled::Failed(e);
        }
        let mv = self.record(res.best_move);
        debug!("computer played {} (score {}, {} nodes)", mv, res.score, res.nodes);
        self.events.on_computer_move_applied(&mv);

        let status = self.terminal_status();
        if status.is_terminal() {
            self.finish(status);
        } else {
            self.phase = Phase::AwaitingHumanMove;
        }
        Polled::Applied(mv)
    }

    fn record(&mut self, mut mv: Move) -> Move {
        if mv.notation.is_none() { mv.notation = Some(mv.to_string()); }
        self.state.move_history.push(mv.clone());
        self.state.side_to_move = !self.state.side_to_move;
        debug_assert_eq!(self.state.side_to_move, self.rules.side_to_move(&self.state.position));
        mv
    }

    fn terminal_status(&self) -> GameStatus {
        let pos = &self.state.position;
        if self.rules.is_checkmate(pos) { GameStatus::Checkmate }
        else if self.rules.is_stalemate(pos) { GameStatus::Stalemate }
        else if self.rules.is_draw(pos) { GameStatus::Draw }
        else { GameStatus::InProgress }
    }

    // A starting position can already be finished; such a game is closed unrated.
    fn settle_initial(&mut self) {
        let status = self.terminal_status();
        if status.is_terminal() {
            self.state.status = status;
            self.phase = Phase::GameOver;
            self.rated = true;
        }
    }

    fn finish(&mut self, status: GameStatus) {
        self.state.status = status;
        self.phase = Phase::GameOver;
        let (outcome, winner) = match status {
            GameStatus::Checkmate => {
                let loser = self.state.side_to_move;
                let outcome = if loser == self.human { Outcome::Loss } else { Outcome::Win };
                (outcome, Some(!loser))
            }
            _ => (Outcome::Draw, None),
        };
        let mut rating = None;
        if !self.rated {
            self.rated = true;
            if let Some(t) = &self.tracker {
                rating = t.update_or_drop(&self.player_key, outcome, self.difficulty.nominal_rating());
            }
        }
        let report = GameOverReport { outcome, final_status: status, winner, rating };
        info!("game over: {:?}, human {} after {} plies", status, outcome, self.state.move_history.len());
        self.events.on_game_over(&report);
        self.last_report = Some(report);
    }
}

fn fresh_state<P>(side_to_move: Color, position: P) -> GameState<P> {
    GameState { position, side_to_move, move_history: Vec::new(), status: GameStatus::InProgress }
}
