//! Retrograde solver over a dense position space.
//!
//! Two passes:
//! 1. Expand every position once, recording its children. Primitive losses
//!    and positions without moves are resolved immediately.
//! 2. Walk resolved positions in FIFO order (non-decreasing remoteness) and
//!    push values to their parents: a losing child makes the parent a win,
//!    and a parent whose children are all wins is a loss.
//!
//! Whatever is still undecided afterwards can be played forever: a tie.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};

use legrec_core::{Game, Position, Primitive};
use serde::{Deserialize, Serialize};

use crate::stats::{Phase, SolverStats};

/// How many positions to process between interrupt and log checks.
const CHECK_INTERVAL: usize = 1 << 14;

/// Game-theoretic value for the player to move.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Value {
    Undecided = 0,
    Win = 1,
    Lose = 2,
    Tie = 3,
}

impl Value {
    /// Decode the on-disk byte.
    pub fn from_byte(byte: u8) -> Option<Value> {
        match byte {
            0 => Some(Value::Undecided),
            1 => Some(Value::Win),
            2 => Some(Value::Lose),
            3 => Some(Value::Tie),
            _ => None,
        }
    }

    /// The same result seen by the other player.
    pub fn flip(self) -> Value {
        match self {
            Value::Win => Value::Lose,
            Value::Lose => Value::Win,
            other => other,
        }
    }
}

/// Value plus remoteness (moves until the game ends under optimal play).
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Outcome {
    pub value: Value,
    pub remoteness: u16,
}

impl Outcome {
    pub const UNDECIDED: Outcome = Outcome {
        value: Value::Undecided,
        remoteness: 0,
    };

    pub const fn new(value: Value, remoteness: u16) -> Outcome {
        Outcome { value, remoteness }
    }

    /// This outcome seen from the player whose move led here.
    pub fn for_mover(self) -> Outcome {
        Outcome::new(self.value.flip(), self.remoteness.saturating_add(1))
    }
}

/// Number of positions per value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ValueCounts {
    pub wins: u64,
    pub loses: u64,
    pub ties: u64,
    pub undecided: u64,
}

/// Solved outcomes indexed by position.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Database {
    outcomes: Vec<Outcome>,
}

impl Database {
    pub fn from_outcomes(outcomes: Vec<Outcome>) -> Database {
        Database { outcomes }
    }

    pub fn get(&self, position: Position) -> Option<Outcome> {
        self.outcomes.get(position.0 as usize).copied()
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn outcomes(&self) -> &[Outcome] {
        &self.outcomes
    }

    pub fn counts(&self) -> ValueCounts {
        let mut counts = ValueCounts::default();
        for outcome in &self.outcomes {
            match outcome.value {
                Value::Win => counts.wins += 1,
                Value::Lose => counts.loses += 1,
                Value::Tie => counts.ties += 1,
                Value::Undecided => counts.undecided += 1,
            }
        }
        counts
    }

    /// Largest remoteness of any decided (win or lose) position.
    pub fn max_remoteness(&self) -> u16 {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.value, Value::Win | Value::Lose))
            .map(|o| o.remoteness)
            .max()
            .unwrap_or(0)
    }
}

/// Compressed adjacency lists: the neighbours of `i` are
/// `targets[offsets[i]..offsets[i + 1]]`.
struct Adjacency {
    offsets: Vec<u32>,
    targets: Vec<u32>,
}

impl Adjacency {
    #[inline]
    fn of(&self, i: usize) -> &[u32] {
        &self.targets[self.offsets[i] as usize..self.offsets[i + 1] as usize]
    }

    /// Reverse every edge.
    fn invert(&self) -> Adjacency {
        let n = self.offsets.len() - 1;
        let mut offsets = vec![0u32; n + 1];
        for &target in &self.targets {
            offsets[target as usize + 1] += 1;
        }
        for i in 0..n {
            offsets[i + 1] += offsets[i];
        }

        let mut fill = offsets.clone();
        let mut targets = vec![0u32; self.targets.len()];
        for source in 0..n {
            for &target in self.of(source) {
                let slot = &mut fill[target as usize];
                targets[*slot as usize] = source as u32;
                *slot += 1;
            }
        }
        Adjacency { offsets, targets }
    }
}

/// Retrograde solver with progress reporting.
pub struct Solver {
    /// Solver statistics
    pub stats: SolverStats,
    log_interval_secs: u64,
}

impl Solver {
    pub fn new(log_interval_secs: u64) -> Self {
        Self {
            stats: SolverStats::new(),
            log_interval_secs,
        }
    }

    /// Solve every position of `game`.
    ///
    /// Returns None if `running` is cleared before the solve completes.
    ///
    /// # Panics
    ///
    /// If the game has more than `u32::MAX` positions.
    pub fn solve<G: Game>(&mut self, game: &G, running: &AtomicBool) -> Option<Database> {
        let total = game.num_positions();
        assert!(
            total <= u32::MAX as u64,
            "{} has too many positions ({total}) for a dense solve",
            game.name()
        );
        let n = total as usize;
        self.stats.positions = total;

        let mut outcomes = vec![Outcome::UNDECIDED; n];
        let mut unresolved_children = vec![0u32; n];
        let mut queue: VecDeque<u32> = VecDeque::new();

        // Pass 1: expansion
        self.stats.begin_phase(Phase::Expand);
        let mut children = Adjacency {
            offsets: Vec::with_capacity(n + 1),
            targets: Vec::new(),
        };
        children.offsets.push(0);

        for index in 0..n {
            if index % CHECK_INTERVAL == 0 && !self.checkpoint(running, index, n) {
                return None;
            }

            let position = Position(index as u64);
            if game.primitive(position) == Primitive::Lose {
                outcomes[index] = Outcome::new(Value::Lose, 0);
                queue.push_back(index as u32);
                self.stats.primitive_losses += 1;
            } else {
                let start = children.targets.len();
                for mov in game.generate_moves(position) {
                    let child = game.canonical(game.do_move(position, mov)).0 as u32;
                    if !children.targets[start..].contains(&child) {
                        children.targets.push(child);
                    }
                }

                let count = children.targets.len() - start;
                if count == 0 {
                    // No legal move: the player to move is stuck and loses
                    outcomes[index] = Outcome::new(Value::Lose, 0);
                    queue.push_back(index as u32);
                    self.stats.stuck_losses += 1;
                }
                unresolved_children[index] = count as u32;
            }
            children.offsets.push(children.targets.len() as u32);
        }
        self.stats.edges = children.targets.len() as u64;

        let parents = children.invert();
        drop(children);

        // Pass 2: propagation
        self.stats.begin_phase(Phase::Propagate);
        let mut processed = 0usize;
        while let Some(child) = queue.pop_front() {
            if processed % CHECK_INTERVAL == 0 && !self.checkpoint(running, processed, n) {
                return None;
            }
            processed += 1;

            let child_outcome = outcomes[child as usize];
            let remoteness = child_outcome.remoteness.saturating_add(1);
            for &parent in parents.of(child as usize) {
                let p = parent as usize;
                if outcomes[p].value != Value::Undecided {
                    continue;
                }
                match child_outcome.value {
                    Value::Lose => {
                        outcomes[p] = Outcome::new(Value::Win, remoteness);
                        queue.push_back(parent);
                    }
                    Value::Win => {
                        unresolved_children[p] -= 1;
                        if unresolved_children[p] == 0 {
                            outcomes[p] = Outcome::new(Value::Lose, remoteness);
                            queue.push_back(parent);
                        }
                    }
                    Value::Tie | Value::Undecided => {
                        unreachable!("only wins and losses are queued")
                    }
                }
            }
        }

        // Everything left can avoid losing forever
        for outcome in outcomes.iter_mut() {
            if outcome.value == Value::Undecided {
                *outcome = Outcome::new(Value::Tie, 0);
            }
        }

        let database = Database::from_outcomes(outcomes);
        self.stats.finish(&database);
        Some(database)
    }

    /// Check for interrupt and log progress if due. Returns false to stop.
    fn checkpoint(&mut self, running: &AtomicBool, done: usize, total: usize) -> bool {
        if !running.load(Ordering::SeqCst) {
            return false;
        }
        if self.stats.should_log(self.log_interval_secs) {
            self.stats.log_progress(done as u64, total as u64);
        }
        true
    }
}
