//! Per-phase "running since" clocks.
//!
//! # Responsibilities
//! - Name the supervised phases of a destination call
//! - Hold one lock-free start slot per phase
//! - Answer "how long has this phase been running" from a single snapshot
//!
//! # Design Decisions
//! - Each slot is one `AtomicU64` of nanoseconds past a per-set epoch, 0 = idle
//! - `start` overwrites (a new call restarts the clock), `reset` clears
//! - Readers load the slot exactly once per comparison

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::time::Instant;

/// A named stage of the destination protocol with its own timeout clock.
///
/// Declaration order is the order breaches are checked in.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Accept = 0,
    NotifyEndOfInput = 1,
}

impl Phase {
    /// All phases, in check order.
    pub const ALL: [Phase; 2] = [Phase::Accept, Phase::NotifyEndOfInput];

    /// Stable snake_case name used in logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Accept => "accept",
            Phase::NotifyEndOfInput => "notify_end_of_input",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const IDLE: u64 = 0;

/// Start slot for a single phase.
#[derive(Debug)]
pub struct PhaseTimer {
    epoch: Instant,
    /// Nanoseconds past `epoch` plus one, so that a start at the epoch itself
    /// is distinguishable from idle.
    started: AtomicU64,
}

impl PhaseTimer {
    fn new(epoch: Instant) -> Self {
        Self {
            epoch,
            started: AtomicU64::new(IDLE),
        }
    }

    /// Mark the phase as running from now, discarding any earlier start.
    pub fn start(&self) {
        self.start_at(Instant::now());
    }

    /// Mark the phase as running from `at`.
    pub fn start_at(&self, at: Instant) {
        let offset = at.saturating_duration_since(self.epoch).as_nanos();
        let encoded = u64::try_from(offset).unwrap_or(u64::MAX - 1).saturating_add(1);
        self.started.store(encoded, Ordering::Release);
    }

    /// Mark the phase as idle. A no-op when it is not running.
    pub fn reset(&self) {
        self.started.store(IDLE, Ordering::Release);
    }

    /// Whether a start is currently recorded.
    pub fn is_running(&self) -> bool {
        self.started.load(Ordering::Acquire) != IDLE
    }

    /// Time between the recorded start and `now`, or `None` when idle.
    ///
    /// A start recorded after `now` was captured yields zero rather than a
    /// negative duration.
    pub fn elapsed_since(&self, now: Instant) -> Option<Duration> {
        let snapshot = self.started.load(Ordering::Acquire);
        if snapshot == IDLE {
            return None;
        }
        let started_at = self.epoch + Duration::from_nanos(snapshot - 1);
        Some(now.saturating_duration_since(started_at))
    }
}

/// The timers for every [`Phase`], sharing one epoch.
#[derive(Debug)]
pub struct PhaseTimers {
    accept: PhaseTimer,
    notify_end_of_input: PhaseTimer,
}

impl PhaseTimers {
    pub fn new() -> Self {
        let epoch = Instant::now();
        Self {
            accept: PhaseTimer::new(epoch),
            notify_end_of_input: PhaseTimer::new(epoch),
        }
    }

    /// Timer for `phase`.
    pub fn get(&self, phase: Phase) -> &PhaseTimer {
        match phase {
            Phase::Accept => &self.accept,
            Phase::NotifyEndOfInput => &self.notify_end_of_input,
        }
    }
}

impl Default for PhaseTimers {
    fn default() -> Self {
        Self::new()
    }
}
