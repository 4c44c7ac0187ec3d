mod common;

use std::time::Duration;

use common::{Gate, GatedRules};
use duelcore::types::{Color, Square};
use duelcore::{Difficulty, GameSession, Phase, Polled, Position};

const WAIT: Duration = Duration::from_secs(60);

#[test]
fn stale_search_is_discarded_after_new_game() {
    let gate = Gate::new();
    let mut s = GameSession::new(GatedRules { gate: gate.clone() }, Position::startpos(), Difficulty::Beginner);
    s.human_move(Square::E2, Square::E4, None).unwrap();
    assert_eq!(s.phase(), Phase::ComputerThinking);
    assert!(s.is_thinking());

    s.new_game();
    assert_eq!(s.phase(), Phase::AwaitingHumanMove);
    assert!(!s.is_thinking());

    gate.open();
    assert_eq!(s.wait(WAIT), Polled::Discarded);
    assert_eq!(s.phase(), Phase::AwaitingHumanMove);
    assert!(s.state().move_history.is_empty());
    assert_eq!(s.state().side_to_move, Color::White);
    assert_eq!(s.state().position.ply(), 0);
}

#[test]
fn only_the_current_generation_is_applied() {
    let gate = Gate::new();
    let mut s = GameSession::new(GatedRules { gate: gate.clone() }, Position::startpos(), Difficulty::Beginner);
    s.human_move(Square::E2, Square::E4, None).unwrap();
    s.new_game();
    s.human_move(Square::D2, Square::D4, None).unwrap();
    assert_eq!(s.generation(), 1);

    gate.open();
    let polled = s.wait_for_computer(WAIT);
    assert!(matches!(polled, Polled::Applied(_)), "{polled:?}");
    let history: Vec<String> = s.state().move_history.iter().map(|m| m.to_string()).collect();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0], "d2d4");
    assert_eq!(s.phase(), Phase::AwaitingHumanMove);
}

#[test]
fn new_game_is_accepted_while_thinking() {
    let gate = Gate::new();
    let mut s = GameSession::new(GatedRules { gate: gate.clone() }, Position::startpos(), Difficulty::Beginner);
    s.human_move(Square::G1, Square::F3, None).unwrap();
    // The search is parked on the gate; the session still answers immediately.
    assert_eq!(s.poll(), Polled::Pending);
    s.new_game();
    s.new_game();
    assert_eq!(s.phase(), Phase::AwaitingHumanMove);
    assert_eq!(s.poll(), Polled::Idle);
    gate.open();
}

#[test]
fn abandoned_search_stops_early() {
    let gate = Gate::new();
    let mut s = GameSession::new(GatedRules { gate: gate.clone() }, Position::startpos(), Difficulty::Master);
    s.human_move(Square::E2, Square::E4, None).unwrap();
    s.new_game();
    gate.open();
    assert_eq!(s.wait(WAIT), Polled::Discarded);
    // A finished depth-5 search undoes thousands of moves; an aborted one unwinds its stack.
    assert!(gate.passes() <= 2 * Difficulty::Master.depth() as usize + 2, "{} undos", gate.passes());
}
