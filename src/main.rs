use anyhow::Result;
use clap::Parser;
use duelcore::rating::{JsonFileStore, MemoryStore, RatingStore};
use duelcore::session::{GameOverReport, SessionEvents};
use duelcore::{CozyRules, Difficulty, GameSession, Move, Polled, Position, RatingTracker, SessionConfig};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Parser, Debug)]
#[command(author, version, about = "Play chess against the duelcore engine", long_about = None)]
struct Args {
    /// Skill tier: beginner, intermediate, advanced, expert or master
    #[arg(long)]
    difficulty: Option<Difficulty>,

    /// JSON session config; flags override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory for persisted ratings (in-memory if absent)
    #[arg(long)]
    store_dir: Option<PathBuf>,

    /// Player name the rating is stored under
    #[arg(long)]
    player: Option<String>,

    /// Starting FEN position; you play the side to move
    #[arg(long)]
    fen: Option<String>,

    /// Print search statistics
    #[arg(long)]
    verbose: bool,
}

struct Console {
    verbose: bool,
}

impl SessionEvents for Console {
    fn on_computer_move_applied(&mut self, mv: &Move) {
        println!("Computer plays: {}", mv);
    }

    fn on_game_over(&mut self, report: &GameOverReport) {
        match report.winner {
            Some(c) => println!("\nCheckmate! {:?} wins! You {}.", c, report.outcome),
            None => println!("\nGame drawn ({:?}).", report.final_status),
        }
        if let Some(r) = &report.rating {
            println!("Rating: {} -> {}", r.old_rating, r.new_rating);
        } else if self.verbose {
            println!("Rating unchanged.");
        }
    }

    fn on_new_game(&mut self) {
        println!("New game.");
    }
}

fn print_board(session: &GameSession<CozyRules>) {
    println!("\n{}", session.state().position.board());
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut cfg = match &args.config {
        Some(path) => SessionConfig::from_json_file(path)?,
        None => SessionConfig::default(),
    };
    if let Some(d) = args.difficulty { cfg.difficulty = d; }
    if let Some(p) = &args.player { cfg.player_key = p.clone(); }

    let store: Arc<dyn RatingStore> = match &args.store_dir {
        Some(dir) => Arc::new(JsonFileStore::open(dir)?),
        None => Arc::new(MemoryStore::new()),
    };
    let tracker = Arc::new(RatingTracker::with_params(store, cfg.k_factor, cfg.initial_rating));

    let initial = match &args.fen {
        Some(fen) => Position::from_fen(fen)?,
        None => Position::startpos(),
    };
    let mut session = GameSession::from_config(CozyRules, initial, &cfg, Some(tracker.clone()))
        .with_events(Box::new(Console { verbose: args.verbose }));

    println!("You play {:?} at {} ({}).", session.human_color(), cfg.difficulty, cfg.difficulty.description());
    println!("Commands: <move> (e2e4, e7e8q), new, retry, level <tier>, rating, quit");

    let stdin = io::stdin();
    print_board(&session);
    loop {
        if session.awaiting_computer() {
            if args.verbose { println!("Thinking..."); }
            let start = Instant::now();
            match session.wait_for_computer(Duration::from_secs(3600)) {
                Polled::Failed(e) => { println!("Engine failure: {e}. Type 'retry' or 'new'."); }
                Polled::Applied(_) if args.verbose => println!("({:.2}s)", start.elapsed().as_secs_f32()),
                _ => {}
            }
            print_board(&session);
            continue;
        }

        print!("> ");
        io::stdout().flush()?;
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 { break; }
        let input = line.trim();
        if input.is_empty() { continue; }

        match input.split_whitespace().collect::<Vec<_>>().as_slice() {
            ["quit"] | ["exit"] => break,
            ["new"] => { session.new_game(); print_board(&session); }
            ["retry"] => {
                if !session.retry_search() { println!("Nothing to retry."); }
            }
            ["level", tier] => match tier.parse::<Difficulty>() {
                Ok(d) => { session.set_difficulty(d); println!("Difficulty: {} ({})", d, d.description()); print_board(&session); }
                Err(e) => println!("{e}"),
            },
            ["rating"] => match tracker.load(&cfg.player_key) {
                Ok(Some(rec)) => println!("Rating {} (peak {}), {}W/{}L/{}D", rec.rating, rec.peak_rating, rec.wins, rec.losses, rec.draws),
                Ok(None) => println!("No rated games yet."),
                Err(e) => println!("Cannot read rating: {e}"),
            },
            [mv] => {
                let Some(m) = Move::parse_coord(mv) else {
                    println!("Invalid move format! Use format like 'e2e4'");
                    continue;
                };
                match session.human_move(m.from, m.to, m.promotion) {
                    Ok(_) => {}
                    Err(e) => println!("Rejected: {e}"),
                }
            }
            _ => println!("Unknown command"),
        }
    }

    Ok(())
}
