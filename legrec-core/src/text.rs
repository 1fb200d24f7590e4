//! Text input for moves.
//!
//! A move is typed as two cell letters `a`-`p`, source first, optionally
//! separated and surrounded by whitespace: `"af"`, `"a f"` and `" a  f "`
//! all mean a → f. Each token is exactly one letter.

use thiserror::Error;

use crate::{Move, Pos};

/// Why a piece of text is not a move.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoveParseError {
    #[error("missing source cell (expected a letter a-p)")]
    MissingStart,
    #[error("missing destination cell (expected a letter a-p)")]
    MissingEnd,
    #[error("'{0}' is not a cell letter (expected a-p)")]
    InvalidLetter(char),
    #[error("unexpected input after the move: '{0}'")]
    TrailingInput(String),
}

/// Take one cell letter after optional leading whitespace.
fn take_cell(input: &str, missing: MoveParseError) -> Result<(Pos, &str), MoveParseError> {
    let input = input.trim_start();
    let mut chars = input.chars();
    let c = chars.next().ok_or(missing)?;
    let pos = Pos::from_letter(c).ok_or(MoveParseError::InvalidLetter(c))?;
    Ok((pos, chars.as_str()))
}

/// Parse move text such as `"a f"`.
pub fn parse_move(input: &str) -> Result<Move, MoveParseError> {
    let (from, rest) = take_cell(input, MoveParseError::MissingStart)?;
    let (to, rest) = take_cell(rest, MoveParseError::MissingEnd)?;
    let rest = rest.trim();
    if !rest.is_empty() {
        return Err(MoveParseError::TrailingInput(rest.to_string()));
    }
    Ok(Move::new(from.0, to.0))
}

/// Check that `input` has the shape of a move. Says nothing about legality.
pub fn is_valid_text(input: &str) -> bool {
    parse_move(input).is_ok()
}
