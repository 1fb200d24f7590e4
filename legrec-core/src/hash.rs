//! Dense position keys.
//!
//! Every reachable board holds the same multiset of cells (2 empty, 7 X,
//! 7 O), so boards can be numbered without gaps by ranking them among all
//! permutations of that multiset. The side to move is the low bit:
//!
//! ```text
//! Position = board_rank * 2 + side     (side: 0 = A, 1 = B)
//!
//! board_rank ∈ [0, 16! / (2! 7! 7!)) = [0, 411840)
//! ```
//!
//! Ranks follow lexicographic order of the cells with `empty < X < O`, so
//! rank 0 is `--XXXXXXXOOOOOOO` and the last rank is `OOOOOOOXXXXXXX--`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{Board, Player, Pos, NUM_CELLS};

/// Dense key for a (board, side to move) pair.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub struct Position(pub u64);

/// Piece counts every hashed board must have.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct HashLayout {
    pub empty: u8,
    pub a: u8,
    pub b: u8,
}

impl HashLayout {
    /// The only layout of the game: 2 empty cells, 7 pieces per side.
    pub const LE_GREC: HashLayout = HashLayout {
        empty: 2,
        a: 7,
        b: 7,
    };

    /// Counts indexed by cell bits: `[empty, A, B]`.
    #[inline]
    pub fn counts(&self) -> [u8; 3] {
        [self.empty, self.a, self.b]
    }
}

/// A board did not match the hash layout.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("board has {found:?} (empty, X, O) cells, expected {expected:?}")]
    PieceCount { expected: [u8; 3], found: [u8; 3] },
    #[error("cell {0} holds no valid symbol")]
    InvalidCell(Pos),
}

/// n! for n = 0..=16.
const FACTORIAL: [u64; NUM_CELLS + 1] = {
    let mut table = [1u64; NUM_CELLS + 1];
    let mut i = 1;
    while i <= NUM_CELLS {
        table[i] = table[i - 1] * i as u64;
        i += 1;
    }
    table
};

/// Number of distinct arrangements of `counts` pieces over their total
/// number of cells.
#[inline]
fn arrangements(counts: &[u8; 3]) -> u64 {
    let n = counts.iter().map(|&c| c as usize).sum::<usize>();
    counts
        .iter()
        .fold(FACTORIAL[n], |acc, &c| acc / FACTORIAL[c as usize])
}

/// Maps boards with a fixed piece multiset to and from dense positions.
#[derive(Clone, Debug)]
pub struct PositionHasher {
    layout: HashLayout,
    num_boards: u64,
}

impl PositionHasher {
    /// # Panics
    ///
    /// If the layout does not cover exactly 16 cells.
    pub fn new(layout: HashLayout) -> PositionHasher {
        let counts = layout.counts();
        let total: usize = counts.iter().map(|&c| c as usize).sum();
        assert_eq!(total, NUM_CELLS, "hash layout must cover all {NUM_CELLS} cells");
        PositionHasher {
            layout,
            num_boards: arrangements(&counts),
        }
    }

    pub fn layout(&self) -> HashLayout {
        self.layout
    }

    /// Number of distinct boards.
    pub fn num_boards(&self) -> u64 {
        self.num_boards
    }

    /// Number of distinct positions (boards × 2 sides).
    pub fn num_positions(&self) -> u64 {
        self.num_boards * 2
    }

    /// Hash a board and side to move, checking the piece counts.
    pub fn try_hash(&self, board: &Board, to_move: Player) -> Result<Position, LayoutError> {
        if let Some(pos) = board.invalid_cell() {
            return Err(LayoutError::InvalidCell(pos));
        }
        let expected = self.layout.counts();
        let found = board.counts();
        if found != expected {
            return Err(LayoutError::PieceCount { expected, found });
        }

        let mut remaining = expected;
        let mut rank = 0u64;
        for pos in Pos::all() {
            let symbol = board.cell(pos) as usize;
            // Count every arrangement that has a smaller symbol in this cell
            for smaller in 0..symbol {
                if remaining[smaller] > 0 {
                    remaining[smaller] -= 1;
                    rank += arrangements(&remaining);
                    remaining[smaller] += 1;
                }
            }
            remaining[symbol] -= 1;
        }

        let side = match to_move {
            Player::A => 0,
            Player::B => 1,
        };
        Ok(Position(rank * 2 + side))
    }

    /// Hash a board and side to move.
    ///
    /// # Panics
    ///
    /// If the board's piece counts do not match the layout.
    pub fn hash(&self, board: &Board, to_move: Player) -> Position {
        match self.try_hash(board, to_move) {
            Ok(position) => position,
            Err(err) => panic!("cannot hash {board}: {err}"),
        }
    }

    /// Side to move, without materializing the board.
    #[inline]
    pub fn turn(&self, position: Position) -> Player {
        if position.0 & 1 == 0 {
            Player::A
        } else {
            Player::B
        }
    }

    /// Materialize the board and side to move of a position.
    ///
    /// # Panics
    ///
    /// If the position is out of range.
    pub fn unhash(&self, position: Position) -> (Board, Player) {
        assert!(
            position.0 < self.num_positions(),
            "position {} out of range (0..{})",
            position.0,
            self.num_positions()
        );

        let mut rank = position.0 / 2;
        let mut remaining = self.layout.counts();
        let mut board = Board::new();
        for pos in Pos::all() {
            for symbol in 0..remaining.len() {
                if remaining[symbol] == 0 {
                    continue;
                }
                remaining[symbol] -= 1;
                let block = arrangements(&remaining);
                if rank < block {
                    board.set_cell(pos, symbol as u32);
                    break;
                }
                rank -= block;
                remaining[symbol] += 1;
            }
        }

        (board, self.turn(position))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hasher() -> PositionHasher {
        PositionHasher::new(HashLayout::LE_GREC)
    }

    #[test]
    fn test_position_count() {
        let hasher = hasher();
        assert_eq!(hasher.num_boards(), 411_840);
        assert_eq!(hasher.num_positions(), 823_680);
    }

    #[test]
    fn test_rank_extremes() {
        let hasher = hasher();
        let (first, turn) = hasher.unhash(Position(0));
        assert_eq!(first.to_string(), "--XXXXXXXOOOOOOO");
        assert_eq!(turn, Player::A);

        let (last, turn) = hasher.unhash(Position(hasher.num_positions() - 1));
        assert_eq!(last.to_string(), "OOOOOOOXXXXXXX--");
        assert_eq!(turn, Player::B);
    }

    #[test]
    fn test_roundtrip_initial() {
        let hasher = hasher();
        let board = Board::initial();
        for player in [Player::A, Player::B] {
            let position = hasher.hash(&board, player);
            assert_eq!(hasher.turn(position), player);
            assert_eq!(hasher.unhash(position), (board, player));
        }
    }

    #[test]
    fn test_roundtrip_stride() {
        // Every 997th position: unhash then hash gives the same key back.
        let hasher = hasher();
        let mut position = 0;
        while position < hasher.num_positions() {
            let (board, player) = hasher.unhash(Position(position));
            assert_eq!(board.counts(), [2, 7, 7]);
            assert_eq!(hasher.hash(&board, player), Position(position));
            position += 997;
        }
    }

    #[test]
    fn test_side_bit() {
        let hasher = hasher();
        let board = Board::initial();
        let a = hasher.hash(&board, Player::A);
        let b = hasher.hash(&board, Player::B);
        assert_eq!(a.0 + 1, b.0);
    }

    #[test]
    fn test_try_hash_rejects_wrong_counts() {
        let hasher = hasher();
        let board = Board::initial().with_move(crate::Move::new(0, 4));
        assert!(hasher.try_hash(&board, Player::B).is_ok());

        let mut short = Board::initial();
        short.set_piece(Pos(0), None);
        assert_eq!(
            hasher.try_hash(&short, Player::A),
            Err(LayoutError::PieceCount {
                expected: [2, 7, 7],
                found: [3, 6, 7],
            })
        );
    }

    #[test]
    fn test_try_hash_rejects_invalid_cell() {
        let hasher = hasher();
        // Cell f of the initial board holds an X; overwrite it with 0b11
        let board = Board::from_u32(Board::initial().to_u32() | 0b11 << 10);
        assert_eq!(board.invalid_cell(), Some(Pos(5)));
        assert_eq!(board.counts(), [2, 6, 7]);

        let err = hasher.try_hash(&board, Player::A).unwrap_err();
        assert_eq!(err, LayoutError::InvalidCell(Pos(5)));
        assert_eq!(err.to_string(), "cell f holds no valid symbol");
    }

    #[test]
    #[should_panic(expected = "cannot hash")]
    fn test_hash_panics_on_wrong_counts() {
        hasher().hash(&Board::new(), Player::A);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_unhash_out_of_range() {
        let hasher = hasher();
        hasher.unhash(Position(hasher.num_positions()));
    }
}
