//! Le Grec position query
//!
//! Looks up a board in the solved database and reports its value, the
//! value of every legal move, and optionally the position after a move.

use std::env;
use std::process;

use serde::Serialize;

use legrec_core::{Board, Game, LeGrec, Player, Position, Primitive};
use legrec_solver::checkpoint::Checkpoint;
use legrec_solver::config::QueryConfig;
use legrec_solver::solver::{Database, Outcome, Value};

#[derive(Serialize)]
struct MoveReport {
    text: String,
    jump: bool,
    /// Value for the player making the move
    value: Option<Value>,
    remoteness: Option<u16>,
}

#[derive(Serialize)]
struct PositionReport {
    board: Board,
    to_move: Player,
    position: Position,
    primitive: Primitive,
    outcome: Option<Outcome>,
    moves: Vec<MoveReport>,
}

#[derive(Serialize)]
struct QueryOutput {
    position: PositionReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    after: Option<PositionReport>,
}

fn fail(msg: impl std::fmt::Display) -> ! {
    eprintln!("error: {msg}");
    process::exit(2);
}

fn parse_turn(text: &str) -> Option<Player> {
    let mut chars = text.chars();
    let c = chars.next()?;
    if chars.next().is_some() {
        return None;
    }
    match c.to_ascii_uppercase() {
        'A' => Some(Player::A),
        'B' => Some(Player::B),
        other => Player::from_symbol(other),
    }
}

fn report(game: &LeGrec, database: Option<&Database>, position: Position) -> PositionReport {
    let (board, to_move) = game.board(position);
    let lookup = |p: Position| database.and_then(|db| db.get(p));

    let moves = game
        .generate_moves(position)
        .into_iter()
        .map(|mov| {
            let child = game.canonical(game.do_move(position, mov));
            let outcome = lookup(child).map(Outcome::for_mover);
            MoveReport {
                text: game.move_to_text(mov),
                jump: mov.is_jump(),
                value: outcome.map(|o| o.value),
                remoteness: outcome.map(|o| o.remoteness),
            }
        })
        .collect();

    PositionReport {
        board,
        to_move,
        position,
        primitive: game.primitive(position),
        outcome: lookup(position),
        moves,
    }
}

fn print_report(report: &PositionReport) {
    print!("{}", report.board.render());
    println!();
    println!("To move: {}", report.to_move);
    println!("Position: {}", report.position.0);
    if report.primitive == Primitive::Lose {
        println!("Primitive: {} has lost", report.to_move);
    }
    match report.outcome {
        Some(outcome) if outcome.value == Value::Tie => println!("Value: Tie"),
        Some(outcome) => println!("Value: {:?} in {}", outcome.value, outcome.remoteness),
        None => println!("Value: unknown (no database)"),
    }

    if report.moves.is_empty() {
        println!("No legal moves.");
        return;
    }
    println!("Moves:");
    for mov in &report.moves {
        let kind = if mov.jump { "jump" } else { "step" };
        match (mov.value, mov.remoteness) {
            (Some(Value::Tie), _) => println!("  {}  {kind}  Tie", mov.text),
            (Some(value), Some(remoteness)) => {
                println!("  {}  {kind}  {:?} in {}", mov.text, value, remoteness)
            }
            _ => println!("  {}  {kind}", mov.text),
        }
    }
}

fn main() {
    let config = match QueryConfig::from_args(env::args().skip(1)) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e}");
            eprintln!("{}", QueryConfig::USAGE);
            process::exit(2);
        }
    };

    let game = LeGrec::new();

    let board: Board = config
        .board
        .parse()
        .unwrap_or_else(|e| fail(format!("bad board '{}': {e}", config.board)));
    let to_move = parse_turn(&config.turn)
        .unwrap_or_else(|| fail(format!("bad side to move '{}', expected X or O", config.turn)));
    let position = game
        .try_position(&board, to_move)
        .unwrap_or_else(|e| fail(format!("bad board '{}': {e}", config.board)));

    let database = if config.db_path.exists() {
        match Checkpoint::load(&config.db_path) {
            Ok(db) if db.len() as u64 == game.num_positions() => Some(db),
            Ok(db) => {
                eprintln!(
                    "Warning: database has {} entries, expected {}",
                    db.len(),
                    game.num_positions()
                );
                None
            }
            Err(e) => {
                eprintln!("Warning: Failed to load database: {e}");
                None
            }
        }
    } else {
        None
    };

    let after = config.mov.as_deref().map(|text| {
        if !game.is_valid_text(text) {
            fail(format!("'{text}' is not a move, expected two letters a-p like \"a e\""));
        }
        let mov = game.parse_move(text).unwrap_or_else(|e| fail(e));
        if game.primitive(position) == Primitive::Lose {
            fail("the game is already over");
        }
        if !board.is_legal(to_move, mov) {
            fail(format!("{mov} is not a legal move for {to_move}"));
        }
        report(&game, database.as_ref(), game.do_move(position, mov))
    });

    let output = QueryOutput {
        position: report(&game, database.as_ref(), position),
        after,
    };

    if config.json {
        match serde_json::to_string_pretty(&output) {
            Ok(json) => println!("{json}"),
            Err(e) => fail(e),
        }
        return;
    }

    print_report(&output.position);
    if let Some(after) = &output.after {
        println!();
        println!("After move:");
        print_report(after);
    }
}
