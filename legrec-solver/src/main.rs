//! Le Grec Solver
//!
//! Solves every position by retrograde analysis and saves the database.

use std::env;
use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use legrec_core::{Game, LeGrec};
use legrec_solver::checkpoint::Checkpoint;
use legrec_solver::config::SolveConfig;
use legrec_solver::solver::{Database, Solver, Value};

fn main() {
    let config = match SolveConfig::from_args(env::args().skip(1)) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e}");
            eprintln!("{}", SolveConfig::USAGE);
            process::exit(2);
        }
    };

    let game = LeGrec::new();

    println!("Le Grec Solver");
    println!("==============");
    println!("Positions: {}", game.num_positions());
    println!("Database: {:?}", config.db_path);
    println!();

    // Set up SIGINT handler for graceful shutdown
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        println!("\n\nInterrupt received, stopping...");
        r.store(false, Ordering::SeqCst);
    }) {
        eprintln!("Warning: failed to set Ctrl-C handler: {e}");
    }

    let database = match load_existing(&config, &game) {
        Some(database) => database,
        None => solve_and_save(&config, &game, &running),
    };

    report(&game, &database);
}

/// Load a previously saved database unless `--force` was given.
fn load_existing(config: &SolveConfig, game: &LeGrec) -> Option<Database> {
    if config.force || !config.db_path.exists() {
        return None;
    }

    println!("Loading database from {:?}...", config.db_path);
    let start = Instant::now();
    match Checkpoint::load(&config.db_path) {
        Ok(database) if database.len() as u64 == game.num_positions() => {
            println!(
                "Loaded {} positions in {:.2}s\n",
                database.len(),
                start.elapsed().as_secs_f64()
            );
            Some(database)
        }
        Ok(database) => {
            eprintln!(
                "Warning: database has {} entries, expected {}",
                database.len(),
                game.num_positions()
            );
            println!("Solving from scratch.\n");
            None
        }
        Err(e) => {
            eprintln!("Warning: Failed to load database: {e}");
            println!("Solving from scratch.\n");
            None
        }
    }
}

fn solve_and_save(config: &SolveConfig, game: &LeGrec, running: &AtomicBool) -> Database {
    println!("Starting retrograde solve...");
    println!("Log interval: {}s\n", config.log_interval_secs);

    let mut solver = Solver::new(config.log_interval_secs);
    let Some(database) = solver.solve(game, running) else {
        println!("\nSolve was interrupted before completion. Nothing saved.");
        process::exit(130);
    };

    println!("\n==============");
    println!("Solve complete!");
    println!("==============");
    solver.stats.print_summary();

    if let Some(parent) = config.db_path.parent() {
        if let Err(e) = std::fs::create_dir_all(parent) {
            eprintln!("Warning: cannot create {:?}: {e}", parent);
        }
    }

    println!("\nSaving database...");
    let start = Instant::now();
    match Checkpoint::save(&config.db_path, &database) {
        Ok(count) => println!(
            "Saved {} positions in {:.2}s",
            count,
            start.elapsed().as_secs_f64()
        ),
        Err(e) => eprintln!("Error saving database: {e}"),
    }

    database
}

/// Print the value of the initial position and of each opening move.
fn report(game: &LeGrec, database: &Database) {
    let initial = game.initial_position();
    let (board, to_move) = game.board(initial);

    println!();
    print!("{}", board.render());
    println!();

    let Some(outcome) = database.get(initial) else {
        println!("Initial position missing from database!");
        return;
    };

    match outcome.value {
        Value::Win => println!(
            "{to_move} (first player) wins in {} with optimal play.",
            outcome.remoteness
        ),
        Value::Lose => println!(
            "{to_move} (first player) loses in {} with optimal play.",
            outcome.remoteness
        ),
        Value::Tie => println!("The game is a draw with optimal play."),
        Value::Undecided => println!("Initial position is undecided."),
    }

    println!("\nOpening moves:");
    for mov in game.generate_moves(initial) {
        let child = game.canonical(game.do_move(initial, mov));
        match database.get(child) {
            Some(child_outcome) if child_outcome.value == Value::Tie => {
                println!("  {}  {:?}", game.move_to_text(mov), Value::Tie)
            }
            Some(child_outcome) => {
                let outcome = child_outcome.for_mover();
                println!(
                    "  {}  {:?} in {}",
                    game.move_to_text(mov),
                    outcome.value,
                    outcome.remoteness
                )
            }
            None => println!("  {}  unknown", game.move_to_text(mov)),
        }
    }

    let counts = database.counts();
    println!(
        "\nDatabase: win={} lose={} tie={} max remoteness={}",
        counts.wins,
        counts.loses,
        counts.ties,
        database.max_remoteness()
    );
}
