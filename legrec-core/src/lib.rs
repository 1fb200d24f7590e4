//! Le Grec game logic with bit-packed board representation.
//!
//! # Board Encoding (32-bit)
//!
//! ```text
//! Bits 0-31: 16 cells × 2 bits per cell
//!
//! Each cell (2 bits):
//!   0 = empty, 1 = player A (X), 2 = player B (O)
//!
//! Cell indices (row-major order) and their move letters:
//!   a=0   b=1   c=2   d=3
//!   e=4   f=5   g=6   h=7
//!   i=8   j=9   k=10  l=11
//!   m=12  n=13  o=14  p=15
//! ```
//!
//! The side to move is not stored in the board. It is part of the
//! [`Position`] key produced by [`hash::PositionHasher`].
//!
//! # Move Encoding (32-bit)
//!
//! ```text
//! Bits 0-15:  destination cell (0-15)
//! Bits 16-31: source cell (0-15)
//! ```
//!
//! # Rules
//!
//! A moves "down" the board (towards rows 2-3), B moves "up" (towards rows
//! 0-1). A piece steps to an adjacent empty cell or jumps over one enemy piece
//! to an empty cell two away, in any of the 8 directions, as long as the move
//! is forwards or sideways. Jumped pieces stay on the board. The player who
//! gets all 7 pieces into the opponent's starting rows wins.

use std::fmt;
use std::ops::Range;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod game;
pub mod hash;
pub mod text;

pub use game::{Game, LeGrec};
pub use hash::{HashLayout, LayoutError, Position, PositionHasher};
pub use text::{is_valid_text, parse_move, MoveParseError};

/// Number of cells on the board.
pub const NUM_CELLS: usize = 16;

/// Width and height of the board.
pub const SIDE: u8 = 4;

/// Pieces each player owns for the whole game.
pub const PIECES_PER_SIDE: u8 = 7;

/// Player identifier.
///
/// A (`X`) always moves first.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Player {
    A = 1,
    B = 2,
}

impl Player {
    /// Get the opponent player.
    #[inline]
    pub fn opponent(self) -> Player {
        match self {
            Player::A => Player::B,
            Player::B => Player::A,
        }
    }

    /// Convert from cell bits (1 or 2) to Player.
    #[inline]
    pub fn from_bits(bits: u8) -> Option<Player> {
        match bits {
            1 => Some(Player::A),
            2 => Some(Player::B),
            _ => None,
        }
    }

    /// Board symbol for this player's pieces.
    pub fn symbol(self) -> char {
        match self {
            Player::A => 'X',
            Player::B => 'O',
        }
    }

    /// Parse a board symbol (case-insensitive).
    pub fn from_symbol(c: char) -> Option<Player> {
        match c.to_ascii_uppercase() {
            'X' => Some(Player::A),
            'O' => Some(Player::B),
            _ => None,
        }
    }

    /// Cells this player must fill to win (the opponent's starting rows).
    #[inline]
    pub fn goal_cells(self) -> Range<u8> {
        match self {
            Player::A => 8..16,
            Player::B => 0..8,
        }
    }

    /// Check that moving from `from` to `to` is forwards or sideways for
    /// this player.
    #[inline]
    pub fn is_forward(self, from: Pos, to: Pos) -> bool {
        match self {
            Player::A => to.row() >= from.row(),
            Player::B => to.row() <= from.row(),
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Position on the 4x4 board (0-15).
///
/// Layout:
/// ```text
///    0  1  2  3
///    4  5  6  7
///    8  9 10 11
///   12 13 14 15
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
pub struct Pos(pub u8);

impl Pos {
    /// Create a position from row and column (0-3 each).
    #[inline]
    pub fn from_row_col(row: u8, col: u8) -> Pos {
        debug_assert!(row < SIDE && col < SIDE);
        Pos(row * SIDE + col)
    }

    /// Get the row (0-3).
    #[inline]
    pub fn row(self) -> u8 {
        self.0 / SIDE
    }

    /// Get the column (0-3).
    #[inline]
    pub fn col(self) -> u8 {
        self.0 % SIDE
    }

    /// Check if this is a valid position (0-15).
    #[inline]
    pub fn is_valid(self) -> bool {
        (self.0 as usize) < NUM_CELLS
    }

    /// The cell `dr` rows and `dc` columns away, or None if off the board.
    #[inline]
    pub fn offset(self, dr: i8, dc: i8) -> Option<Pos> {
        let row = self.row() as i8 + dr;
        let col = self.col() as i8 + dc;
        let side = SIDE as i8;
        if (0..side).contains(&row) && (0..side).contains(&col) {
            Some(Pos::from_row_col(row as u8, col as u8))
        } else {
            None
        }
    }

    /// Move letter for this cell ('a'-'p').
    #[inline]
    pub fn letter(self) -> char {
        (b'a' + self.0) as char
    }

    /// Parse a move letter ('a'-'p').
    #[inline]
    pub fn from_letter(c: char) -> Option<Pos> {
        match c {
            'a'..='p' => Some(Pos(c as u8 - b'a')),
            _ => None,
        }
    }

    /// Iterate over all 16 positions.
    pub fn all() -> impl Iterator<Item = Pos> {
        (0..NUM_CELLS as u8).map(Pos)
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

// ============================================================================
// MOVES
// ============================================================================

/// Packed move representation (32 bits): `source << 16 | destination`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move(pub u32);

impl Move {
    const SHIFT: u32 = 16;
    const MASK: u32 = 0xFFFF;

    /// Create a move from source and destination cells (0-15 each).
    #[inline]
    pub const fn new(from: u8, to: u8) -> Move {
        debug_assert!((from as usize) < NUM_CELLS && (to as usize) < NUM_CELLS);
        Move(((from as u32) << Self::SHIFT) | to as u32)
    }

    /// Get the source cell (0-15).
    #[inline]
    pub const fn source(self) -> u8 {
        (self.0 >> Self::SHIFT) as u8
    }

    /// Get the destination cell (0-15).
    #[inline]
    pub const fn dest(self) -> u8 {
        (self.0 & Self::MASK) as u8
    }

    /// Split into `(source, destination)`.
    #[inline]
    pub const fn decode(self) -> (u8, u8) {
        (self.source(), self.dest())
    }

    #[inline]
    pub fn from(self) -> Pos {
        Pos(self.source())
    }

    #[inline]
    pub fn to(self) -> Pos {
        Pos(self.dest())
    }

    /// Check if this move passes over a cell (a jump) rather than stepping.
    pub fn is_jump(self) -> bool {
        let (from, to) = (self.from(), self.to());
        from.row().abs_diff(to.row()) == 2 || from.col().abs_diff(to.col()) == 2
    }

    /// Render as two letters, e.g. `"a f"`.
    pub fn to_text(self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.from(), self.to())
    }
}

impl fmt::Debug for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Move({} -> {})", self.from(), self.to())
    }
}

impl FromStr for Move {
    type Err = MoveParseError;

    fn from_str(s: &str) -> Result<Move, MoveParseError> {
        parse_move(s)
    }
}

/// Maximum number of legal moves in any position.
///
/// Every move ends on one of the 2 empty cells, and an empty cell can be
/// entered from at most 8 neighbours plus 8 jump origins.
pub const MAX_MOVES: usize = 32;

/// A fixed-size move list that avoids heap allocation.
#[derive(Clone, Copy)]
pub struct MoveList {
    moves: [Move; MAX_MOVES],
    len: u8,
}

impl MoveList {
    /// Create an empty move list.
    #[inline]
    pub const fn new() -> MoveList {
        MoveList {
            moves: [Move(0); MAX_MOVES],
            len: 0,
        }
    }

    /// Add a move to the list.
    #[inline]
    pub fn push(&mut self, mov: Move) {
        debug_assert!((self.len as usize) < MAX_MOVES);
        self.moves[self.len as usize] = mov;
        self.len += 1;
    }

    #[inline]
    pub const fn len(&self) -> usize {
        self.len as usize
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub const fn get(&self, idx: usize) -> Move {
        self.moves[idx]
    }

    pub fn contains(&self, mov: Move) -> bool {
        self.iter().any(|m| m == mov)
    }

    /// Iterate over moves in generation order.
    pub fn iter(&self) -> impl Iterator<Item = Move> + '_ {
        self.moves[..self.len as usize].iter().copied()
    }
}

impl Default for MoveList {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MoveList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

/// Result of the terminal test for the player facing a board.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
pub enum Primitive {
    /// The opponent completed its objective on the previous turn.
    Lose,
    Undecided,
}

// ============================================================================
// BOARD
// ============================================================================

/// Error parsing a board from its symbol string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoardParseError {
    #[error("expected 16 cells, found {0}")]
    WrongLength(usize),
    #[error("invalid board symbol '{0}' (expected X, O, '-', '.' or '_')")]
    InvalidSymbol(char),
}

/// Compact board state - fits in a single u32.
///
/// See module documentation for encoding details. Serializes as its
/// 16-symbol string, e.g. `"XXXX-XXXOOO-OOOO"`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Board(pub u32);

impl Board {
    /// Bits per cell.
    const CELL_BITS: u32 = 2;
    /// Mask for a single cell (0b11).
    const CELL_MASK: u32 = 0b11;

    /// Relative directions in row-major order of `(dr, dc)`.
    const DIRECTIONS: [(i8, i8); 8] = [
        (-1, -1),
        (-1, 0),
        (-1, 1),
        (0, -1),
        (0, 1),
        (1, -1),
        (1, 0),
        (1, 1),
    ];

    /// Create a board with every cell empty.
    #[inline]
    pub fn new() -> Board {
        Board(0)
    }

    /// The starting layout:
    ///
    /// ```text
    ///   X X X X
    ///   - X X X
    ///   O O O -
    ///   O O O O
    /// ```
    pub fn initial() -> Board {
        let mut board = Board::new();
        for pos in Pos::all() {
            let piece = match pos.0 {
                4 | 11 => None,
                0..=7 => Some(Player::A),
                _ => Some(Player::B),
            };
            board.set_piece(pos, piece);
        }
        board
    }

    /// Build a board from one entry per cell.
    pub fn from_cells(cells: [Option<Player>; NUM_CELLS]) -> Board {
        let mut board = Board::new();
        for (pos, piece) in Pos::all().zip(cells) {
            board.set_piece(pos, piece);
        }
        board
    }

    /// One entry per cell, row-major.
    pub fn cells(&self) -> [Option<Player>; NUM_CELLS] {
        let mut cells = [None; NUM_CELLS];
        for pos in Pos::all() {
            cells[pos.0 as usize] = self.piece(pos);
        }
        cells
    }

    #[inline]
    pub fn from_u32(bits: u32) -> Board {
        Board(bits)
    }

    #[inline]
    pub fn to_u32(self) -> u32 {
        self.0
    }

    /// Get the 2 bits for a cell at the given position.
    #[inline]
    pub fn cell(&self, pos: Pos) -> u32 {
        (self.0 >> (pos.0 as u32 * Self::CELL_BITS)) & Self::CELL_MASK
    }

    /// Set the 2 bits for a cell at the given position.
    #[inline]
    pub fn set_cell(&mut self, pos: Pos, value: u32) {
        let shift = pos.0 as u32 * Self::CELL_BITS;
        self.0 = (self.0 & !(Self::CELL_MASK << shift)) | ((value & Self::CELL_MASK) << shift);
    }

    /// Get the piece at a position, or None if the cell is empty.
    #[inline]
    pub fn piece(&self, pos: Pos) -> Option<Player> {
        Player::from_bits(self.cell(pos) as u8)
    }

    #[inline]
    pub fn set_piece(&mut self, pos: Pos, piece: Option<Player>) {
        self.set_cell(pos, piece.map_or(0, |p| p as u32));
    }

    #[inline]
    pub fn is_empty(&self, pos: Pos) -> bool {
        self.cell(pos) == 0
    }

    /// Count cells by content: `[empty, A, B]`.
    ///
    /// Cells holding the unused bit pattern `0b11` are not counted.
    pub fn counts(&self) -> [u8; 3] {
        let mut counts = [0u8; 3];
        for pos in Pos::all() {
            if let Some(count) = counts.get_mut(self.cell(pos) as usize) {
                *count += 1;
            }
        }
        counts
    }

    /// First cell holding the unused bit pattern `0b11`, if any.
    pub fn invalid_cell(&self) -> Option<Pos> {
        Pos::all().find(|&pos| self.cell(pos) == Self::CELL_MASK)
    }

    /// Number of `player`'s pieces already inside its goal rows.
    pub fn goal_count(&self, player: Player) -> u8 {
        player
            .goal_cells()
            .filter(|&i| self.piece(Pos(i)) == Some(player))
            .count() as u8
    }

    // ========== Move Generation ==========

    /// Generate all legal moves for `player`.
    ///
    /// Sources are scanned in cell order and directions in row-major order;
    /// for each direction the single step comes before the jump.
    pub fn legal_moves(&self, player: Player) -> MoveList {
        let opponent = player.opponent();
        let mut moves = MoveList::new();

        for from in Pos::all() {
            if self.piece(from) != Some(player) {
                continue;
            }

            for &(dr, dc) in &Self::DIRECTIONS {
                let Some(next) = from.offset(dr, dc) else {
                    continue;
                };

                // Step onto an adjacent empty cell
                if player.is_forward(from, next) && self.is_empty(next) {
                    moves.push(Move::new(from.0, next.0));
                }

                // Jump over exactly one enemy piece
                if let Some(land) = from.offset(2 * dr, 2 * dc) {
                    if player.is_forward(from, land)
                        && self.piece(next) == Some(opponent)
                        && self.is_empty(land)
                    {
                        moves.push(Move::new(from.0, land.0));
                    }
                }
            }
        }

        moves
    }

    /// Check whether `mov` is among the legal moves for `player`.
    pub fn is_legal(&self, player: Player, mov: Move) -> bool {
        mov.from().is_valid() && mov.to().is_valid() && self.legal_moves(player).contains(mov)
    }

    // ========== Terminal Detection ==========

    /// Classify the board from the point of view of the player to move.
    ///
    /// The mover has lost when the opponent has all of its pieces in its
    /// goal rows. Wins and ties are never primitive.
    pub fn primitive(&self, to_move: Player) -> Primitive {
        if self.goal_count(to_move.opponent()) == PIECES_PER_SIDE {
            Primitive::Lose
        } else {
            Primitive::Undecided
        }
    }

    // ========== Apply ==========

    /// Move the piece at the source cell to the destination cell.
    ///
    /// Jumped-over pieces are left in place.
    ///
    /// # Panics
    ///
    /// If the source is empty or the destination is occupied.
    pub fn apply(&mut self, mov: Move) {
        let (from, to) = (mov.from(), mov.to());
        let piece = self.piece(from);
        assert!(piece.is_some(), "no piece at source cell {from} for move {mov:?}");
        assert!(self.is_empty(to), "destination cell {to} is occupied for move {mov:?}");
        self.set_piece(to, piece);
        self.set_piece(from, None);
    }

    /// Copy of the board with `mov` applied. See [`Board::apply`].
    #[inline]
    pub fn with_move(mut self, mov: Move) -> Board {
        self.apply(mov);
        self
    }

    // ========== Text ==========

    fn cell_symbol(piece: Option<Player>) -> char {
        piece.map_or('-', Player::symbol)
    }

    /// Render the board next to the move-letter legend.
    ///
    /// ```text
    /// LEGEND: a b c d  |  BOARD: X X X X
    ///         e f g h  |         - X X X
    ///         i j k l  |         O O O -
    ///         m n o p  |         O O O O
    /// ```
    pub fn render(&self) -> String {
        let mut out = String::new();
        for row in 0..SIDE {
            let (legend_label, board_label) = if row == 0 {
                ("LEGEND: ", "BOARD: ")
            } else {
                ("        ", "       ")
            };
            let legend: Vec<String> = (0..SIDE)
                .map(|col| Pos::from_row_col(row, col).letter().to_string())
                .collect();
            let cells: Vec<String> = (0..SIDE)
                .map(|col| Self::cell_symbol(self.piece(Pos::from_row_col(row, col))).to_string())
                .collect();
            out.push_str(&format!(
                "{}{}  |  {}{}\n",
                legend_label,
                legend.join(" "),
                board_label,
                cells.join(" ")
            ));
        }
        out
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

/// 16 symbols, row-major: `X`, `O`, `-` for empty.
impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for pos in Pos::all() {
            write!(f, "{}", Self::cell_symbol(self.piece(pos)))?;
        }
        Ok(())
    }
}

/// Accepts `X`/`O` (any case) and `-`, `.` or `_` for empty cells.
/// Whitespace and `/` row separators are ignored.
impl FromStr for Board {
    type Err = BoardParseError;

    fn from_str(s: &str) -> Result<Board, BoardParseError> {
        let mut cells = Vec::with_capacity(NUM_CELLS);
        for c in s.chars().filter(|c| !c.is_whitespace() && *c != '/') {
            let piece = match c {
                '-' | '.' | '_' => None,
                _ => Some(Player::from_symbol(c).ok_or(BoardParseError::InvalidSymbol(c))?),
            };
            cells.push(piece);
        }
        let cells: [Option<Player>; NUM_CELLS] = cells
            .try_into()
            .map_err(|v: Vec<_>| BoardParseError::WrongLength(v.len()))?;
        Ok(Board::from_cells(cells))
    }
}

impl From<Board> for String {
    fn from(board: Board) -> String {
        board.to_string()
    }
}

impl TryFrom<String> for Board {
    type Error = BoardParseError;

    fn try_from(s: String) -> Result<Board, BoardParseError> {
        s.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(s: &str) -> Board {
        s.parse().unwrap()
    }

    fn mv(text: &str) -> Move {
        text.parse().unwrap()
    }

    #[test]
    fn test_player_opponent() {
        assert_eq!(Player::A.opponent(), Player::B);
        assert_eq!(Player::B.opponent(), Player::A);
    }

    #[test]
    fn test_player_forward() {
        let (top, mid, bottom) = (Pos(1), Pos(5), Pos(9));
        assert!(Player::A.is_forward(mid, bottom));
        assert!(Player::A.is_forward(mid, Pos(6)));
        assert!(!Player::A.is_forward(mid, top));
        assert!(Player::B.is_forward(mid, top));
        assert!(Player::B.is_forward(mid, Pos(4)));
        assert!(!Player::B.is_forward(mid, bottom));
    }

    #[test]
    fn test_pos_row_col() {
        for pos in Pos::all() {
            assert_eq!(Pos::from_row_col(pos.row(), pos.col()), pos);
        }
        assert_eq!(Pos::from_row_col(2, 3), Pos(11));
    }

    #[test]
    fn test_pos_offset() {
        assert_eq!(Pos(5).offset(-1, -1), Some(Pos(0)));
        assert_eq!(Pos(5).offset(2, 2), Some(Pos(15)));
        assert_eq!(Pos(0).offset(-1, 0), None);
        assert_eq!(Pos(3).offset(0, 1), None);
        assert_eq!(Pos(12).offset(1, 0), None);
        assert_eq!(Pos(6).offset(0, 2), None);
    }

    #[test]
    fn test_pos_letters() {
        assert_eq!(Pos(0).letter(), 'a');
        assert_eq!(Pos(15).letter(), 'p');
        assert_eq!(Pos::from_letter('f'), Some(Pos(5)));
        assert_eq!(Pos::from_letter('q'), None);
        assert_eq!(Pos::from_letter('A'), None);
    }

    #[test]
    fn test_move_roundtrip_all_pairs() {
        for from in 0..16u8 {
            for to in 0..16u8 {
                let mov = Move::new(from, to);
                assert_eq!(mov.decode(), (from, to));
                assert_eq!(mov.0, from as u32 * 65536 + to as u32);
            }
        }
    }

    #[test]
    fn test_move_display() {
        assert_eq!(Move::new(0, 5).to_text(), "a f");
        assert_eq!(Move::new(15, 10).to_string(), "p k");
        assert_eq!(format!("{:?}", Move::new(1, 4)), "Move(b -> e)");
    }

    #[test]
    fn test_move_is_jump() {
        assert!(!Move::new(5, 9).is_jump());
        assert!(!Move::new(5, 6).is_jump());
        assert!(Move::new(5, 13).is_jump());
        assert!(Move::new(0, 10).is_jump());
        assert!(Move::new(4, 6).is_jump());
    }

    #[test]
    fn test_board_cell_roundtrip() {
        let mut board = Board::new();
        board.set_piece(Pos(7), Some(Player::B));
        board.set_piece(Pos(8), Some(Player::A));
        assert_eq!(board.piece(Pos(7)), Some(Player::B));
        assert_eq!(board.piece(Pos(8)), Some(Player::A));
        for i in (0..16).filter(|&i| i != 7 && i != 8) {
            assert!(board.is_empty(Pos(i)));
        }
        board.set_piece(Pos(7), None);
        assert!(board.is_empty(Pos(7)));
    }

    #[test]
    fn test_initial_board() {
        let board = Board::initial();
        assert_eq!(board.to_string(), "XXXX-XXXOOO-OOOO");
        assert_eq!(board.counts(), [2, 7, 7]);
        assert_eq!(board.goal_count(Player::A), 0);
        assert_eq!(board.goal_count(Player::B), 0);
    }

    #[test]
    fn test_board_parse() {
        assert_eq!(board("XXXX/.XXX/OOO_/oooo"), Board::initial());
        assert_eq!(board("XXXX -XXX OOO- OOOO"), Board::initial());
        assert_eq!("XXXX".parse::<Board>(), Err(BoardParseError::WrongLength(4)));
        assert_eq!(
            "XXXX-XXXOOO-OOOZ".parse::<Board>(),
            Err(BoardParseError::InvalidSymbol('Z'))
        );
    }

    #[test]
    fn test_render() {
        let text = Board::initial().render();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "LEGEND: a b c d  |  BOARD: X X X X");
        assert_eq!(lines[3], "        m n o p  |         O O O O");
    }

    // ========== Move Generation ==========

    #[test]
    fn test_initial_moves() {
        let moves = Board::initial().legal_moves(Player::A);
        let expected = [mv("a e"), mv("b e"), mv("f e"), mv("g l"), mv("h l")];
        assert_eq!(moves.iter().collect::<Vec<_>>(), expected);
    }

    #[test]
    fn test_initial_moves_for_b() {
        // i and j step into e; k, o and p step into l.
        let moves = Board::initial().legal_moves(Player::B);
        let expected = [mv("i e"), mv("j e"), mv("k l"), mv("o l"), mv("p l")];
        assert_eq!(moves.iter().collect::<Vec<_>>(), expected);
    }

    #[test]
    fn test_no_backward_step() {
        // A on f with empty cells above and below: only the downward step is legal.
        let board = board("-O--/-X--/-O--/----");
        let moves = board.legal_moves(Player::A);
        for m in moves.iter() {
            assert!(m.to().row() >= m.from().row(), "{m:?} goes backwards");
        }
        assert!(!moves.contains(Move::new(5, 0)));
        assert!(!moves.contains(Move::new(5, 2)));
        assert!(moves.contains(Move::new(5, 4)));
        assert!(moves.contains(Move::new(5, 8)));
        // Jump down over the O on j lands on n. The O on b cannot be jumped.
        assert!(moves.contains(Move::new(5, 13)));
        assert_eq!(moves.iter().filter(|m| m.is_jump()).count(), 1);
    }

    #[test]
    fn test_jump_requires_enemy() {
        // X on a; b holds an enemy, e holds a friend, f is empty.
        let board = board("XO--/X---/----/----");
        let moves = board.legal_moves(Player::A);
        // Over the enemy on b to c.
        assert!(moves.contains(Move::new(0, 2)));
        // Not over the friend on e to i.
        assert!(!moves.contains(Move::new(0, 8)));
        // Not over the empty f to k.
        assert!(!moves.contains(Move::new(0, 10)));
    }

    #[test]
    fn test_jump_requires_empty_landing() {
        let board = board("XOX-/----/----/----");
        assert!(!board.legal_moves(Player::A).contains(Move::new(0, 2)));
    }

    #[test]
    fn test_sideways_jump_for_b() {
        let board = board("----/----/----/OX-X");
        let moves = board.legal_moves(Player::B);
        assert!(moves.contains(Move::new(12, 14)));
        // B may also step up or sideways, never down.
        assert!(moves.contains(Move::new(12, 8)));
        assert!(moves.contains(Move::new(12, 9)));
        assert_eq!(moves.len(), 3);
    }

    #[test]
    fn test_generation_order() {
        // (0,1) step, then (1,0) jump, then (1,1) step.
        let board = board("X---/O---/----/----");
        let moves = board.legal_moves(Player::A);
        assert_eq!(
            moves.iter().collect::<Vec<_>>(),
            [Move::new(0, 1), Move::new(0, 8), Move::new(0, 5)]
        );
    }

    #[test]
    fn test_is_legal() {
        let board = Board::initial();
        assert!(board.is_legal(Player::A, mv("a e")));
        assert!(!board.is_legal(Player::A, mv("a b")));
        assert!(!board.is_legal(Player::B, mv("a e")));
        assert!(!board.is_legal(Player::A, Move(20 << 16 | 4)));
    }

    // ========== Terminal Detection ==========

    #[test]
    fn test_primitive_initial() {
        let board = Board::initial();
        assert_eq!(board.primitive(Player::A), Primitive::Undecided);
        assert_eq!(board.primitive(Player::B), Primitive::Undecided);
    }

    #[test]
    fn test_primitive_a_arrived() {
        // A on 8,9,10,11,13,14,15; B on a-f and m.
        let board = board("OOOO/OO--/XXXX/OXXX");
        assert_eq!(board.goal_count(Player::A), 7);
        assert_eq!(board.primitive(Player::B), Primitive::Lose);
        assert_eq!(board.primitive(Player::A), Primitive::Undecided);
    }

    #[test]
    fn test_primitive_b_arrived() {
        let board = board("OOOO/XOOO/-XX-/XXXX");
        assert_eq!(board.goal_count(Player::B), 7);
        assert_eq!(board.primitive(Player::A), Primitive::Lose);
        assert_eq!(board.primitive(Player::B), Primitive::Undecided);
    }

    #[test]
    fn test_primitive_six_of_seven() {
        let board = board("OOOO/-OOX/XXX-/XXXO");
        assert_eq!(board.goal_count(Player::B), 6);
        assert_eq!(board.goal_count(Player::A), 6);
        assert_eq!(board.primitive(Player::A), Primitive::Undecided);
        assert_eq!(board.primitive(Player::B), Primitive::Undecided);
    }

    // ========== Apply ==========

    #[test]
    fn test_apply_step() {
        let after = Board::initial().with_move(mv("a e"));
        assert_eq!(after.to_string(), "-XXXXXXXOOO-OOOO");
    }

    #[test]
    fn test_apply_jump_leaves_jumped_piece() {
        let board = board("XO--/----/----/----");
        let after = board.with_move(Move::new(0, 2));
        assert_eq!(after.to_string(), "-OX-------------");
    }

    #[test]
    #[should_panic(expected = "occupied")]
    fn test_apply_to_occupied_panics() {
        Board::initial().apply(Move::new(0, 1));
    }

    #[test]
    #[should_panic(expected = "no piece")]
    fn test_apply_from_empty_panics() {
        Board::initial().apply(Move::new(4, 11));
    }
}
