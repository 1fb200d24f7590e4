//! The interface a solver drives: positions in, moves and successors out.

use std::fmt;

use crate::hash::{HashLayout, LayoutError, Position, PositionHasher};
use crate::text::{self, MoveParseError};
use crate::{Board, Move, Player, Primitive};

/// A two-player game over a dense position space `0..num_positions()`.
///
/// Every key in that range must be a valid position. Values are always
/// from the point of view of the player to move.
pub trait Game {
    type Move: Copy + Eq + fmt::Debug;

    fn name(&self) -> &'static str;

    fn num_positions(&self) -> u64;

    fn initial_position(&self) -> Position;

    /// Value of the position if it is known without search.
    fn primitive(&self, position: Position) -> Primitive;

    /// Every legal move for the player to move.
    fn generate_moves(&self, position: Position) -> Vec<Self::Move>;

    /// The successor position, with the other player to move.
    fn do_move(&self, position: Position, mov: Self::Move) -> Position;

    /// Representative of the position's symmetry class.
    fn canonical(&self, position: Position) -> Position {
        position
    }

    fn move_to_text(&self, mov: Self::Move) -> String;
}

/// Le Grec on top of the board rules and the position hasher.
#[derive(Clone, Debug)]
pub struct LeGrec {
    hasher: PositionHasher,
}

impl LeGrec {
    pub fn new() -> LeGrec {
        LeGrec {
            hasher: PositionHasher::new(HashLayout::LE_GREC),
        }
    }

    pub fn hasher(&self) -> &PositionHasher {
        &self.hasher
    }

    /// Materialize a position.
    pub fn board(&self, position: Position) -> (Board, Player) {
        self.hasher.unhash(position)
    }

    pub fn position(&self, board: &Board, to_move: Player) -> Position {
        self.hasher.hash(board, to_move)
    }

    /// Like [`LeGrec::position`], for boards that come from user input.
    pub fn try_position(&self, board: &Board, to_move: Player) -> Result<Position, LayoutError> {
        self.hasher.try_hash(board, to_move)
    }

    pub fn turn(&self, position: Position) -> Player {
        self.hasher.turn(position)
    }

    pub fn parse_move(&self, input: &str) -> Result<Move, MoveParseError> {
        text::parse_move(input)
    }

    pub fn is_valid_text(&self, input: &str) -> bool {
        text::is_valid_text(input)
    }

    /// Le Grec positions cannot be rewound: a move does not record enough to
    /// reverse it, so solvers must search forwards only.
    ///
    /// # Panics
    ///
    /// Always.
    pub fn undo_move(&self, _position: Position, mov: Move) -> Position {
        panic!("undo_move is not supported for Le Grec (move {mov:?})");
    }
}

impl Default for LeGrec {
    fn default() -> Self {
        Self::new()
    }
}

impl Game for LeGrec {
    type Move = Move;

    fn name(&self) -> &'static str {
        "Le Grec"
    }

    fn num_positions(&self) -> u64 {
        self.hasher.num_positions()
    }

    fn initial_position(&self) -> Position {
        self.hasher.hash(&Board::initial(), Player::A)
    }

    fn primitive(&self, position: Position) -> Primitive {
        let (board, to_move) = self.hasher.unhash(position);
        board.primitive(to_move)
    }

    fn generate_moves(&self, position: Position) -> Vec<Move> {
        let (board, to_move) = self.hasher.unhash(position);
        board.legal_moves(to_move).iter().collect()
    }

    fn do_move(&self, position: Position, mov: Move) -> Position {
        let (board, to_move) = self.hasher.unhash(position);
        self.hasher.hash(&board.with_move(mov), to_move.opponent())
    }

    fn move_to_text(&self, mov: Move) -> String {
        mov.to_text()
    }
}
