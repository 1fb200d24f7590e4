//! Solver statistics tracking.

use std::fmt;
use std::time::Instant;

use crate::solver::Database;

/// Peak resident set size of this process in bytes.
/// Returns None if unable to determine.
#[cfg(unix)]
pub fn peak_memory_usage() -> Option<u64> {
    use std::mem::MaybeUninit;

    let mut usage = MaybeUninit::<libc::rusage>::zeroed();
    // SAFETY: getrusage only writes into the struct we pass.
    let result = unsafe { libc::getrusage(libc::RUSAGE_SELF, usage.as_mut_ptr()) };
    if result != 0 {
        return None;
    }
    // SAFETY: zero-initialized and filled in by a successful call.
    let usage = unsafe { usage.assume_init() };
    let max_rss = u64::try_from(usage.ru_maxrss).ok()?;

    // macOS reports bytes, everything else kilobytes
    if cfg!(target_os = "macos") {
        Some(max_rss)
    } else {
        Some(max_rss * 1024)
    }
}

#[cfg(not(unix))]
pub fn peak_memory_usage() -> Option<u64> {
    None
}

/// Format bytes as human-readable string.
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    match bytes {
        b if b >= GB => format!("{:.2} GB", b as f64 / GB as f64),
        b if b >= MB => format!("{:.1} MB", b as f64 / MB as f64),
        b if b >= KB => format!("{:.1} KB", b as f64 / KB as f64),
        b => format!("{b} B"),
    }
}

/// Solve phase, for progress lines.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Expand,
    Propagate,
    Done,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Expand => "expand",
            Phase::Propagate => "propagate",
            Phase::Done => "done",
        };
        f.write_str(name)
    }
}

/// Statistics collected during solving.
#[derive(Debug)]
pub struct SolverStats {
    /// Size of the position space
    pub positions: u64,

    /// Positions lost for the player to move before any search
    pub primitive_losses: u64,

    /// Non-primitive positions where the player to move has no move
    pub stuck_losses: u64,

    /// Parent -> child edges after expansion
    pub edges: u64,

    /// Final value breakdown
    pub wins: u64,
    pub loses: u64,
    pub ties: u64,
    pub max_remoteness: u16,

    phase: Phase,
    start_time: Instant,
    phase_start: Instant,
    last_log_time: Instant,
}

impl SolverStats {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            positions: 0,
            primitive_losses: 0,
            stuck_losses: 0,
            edges: 0,
            wins: 0,
            loses: 0,
            ties: 0,
            max_remoteness: 0,
            phase: Phase::Expand,
            start_time: now,
            phase_start: now,
            last_log_time: now,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Start timing a new phase and announce it.
    pub fn begin_phase(&mut self, phase: Phase) {
        if phase != self.phase {
            println!(
                "{} {} finished in {:.2}s",
                self.timestamp(),
                self.phase,
                self.phase_start.elapsed().as_secs_f64()
            );
        }
        self.phase = phase;
        self.phase_start = Instant::now();
        self.last_log_time = self.phase_start;
    }

    /// Record final values.
    pub fn finish(&mut self, database: &Database) {
        let counts = database.counts();
        self.wins = counts.wins;
        self.loses = counts.loses;
        self.ties = counts.ties;
        self.max_remoteness = database.max_remoteness();
        self.begin_phase(Phase::Done);
    }

    /// Check if we should log progress
    pub fn should_log(&self, interval_secs: u64) -> bool {
        self.last_log_time.elapsed().as_secs() >= interval_secs
    }

    fn timestamp(&self) -> String {
        let elapsed = self.start_time.elapsed().as_secs();
        format!(
            "[{:02}:{:02}:{:02}]",
            elapsed / 3600,
            (elapsed % 3600) / 60,
            elapsed % 60
        )
    }

    /// Log progress through the current phase and reset the log timer
    pub fn log_progress(&mut self, done: u64, total: u64) {
        let elapsed = self.phase_start.elapsed().as_secs_f64();
        let rate = if elapsed > 0.0 { done as f64 / elapsed } else { 0.0 };
        let pct = if total > 0 {
            100.0 * done as f64 / total as f64
        } else {
            0.0
        };
        let mem_str = peak_memory_usage()
            .map(|m| format!(" mem={}", format_bytes(m)))
            .unwrap_or_default();

        println!(
            "{} {} {}/{} ({:.1}%) rate={:.0}/s edges={}{}",
            self.timestamp(),
            self.phase,
            done,
            total,
            pct,
            rate,
            self.edges,
            mem_str,
        );
        println!(
            "           primitives: lose={} stuck={}",
            self.primitive_losses, self.stuck_losses
        );

        self.last_log_time = Instant::now();
    }

    /// Print final summary
    pub fn print_summary(&self) {
        println!("Positions: {}", self.positions);
        println!("Edges: {}", self.edges);
        println!("Primitive losses: {}", self.primitive_losses);
        println!("Stuck losses: {}", self.stuck_losses);
        println!("Values:");
        println!("  - Win: {}", self.wins);
        println!("  - Lose: {}", self.loses);
        println!("  - Tie: {}", self.ties);
        println!("Max remoteness: {}", self.max_remoteness);

        let elapsed = self.start_time.elapsed().as_secs_f64();
        println!("Total time: {:.2}s", elapsed);
        if elapsed > 0.0 {
            println!(
                "Average rate: {:.0} positions/sec",
                self.positions as f64 / elapsed
            );
        }
        if let Some(mem) = peak_memory_usage() {
            println!("Peak memory: {}", format_bytes(mem));
        }
    }
}

impl Default for SolverStats {
    fn default() -> Self {
        Self::new()
    }
}
