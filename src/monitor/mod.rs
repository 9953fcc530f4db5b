//! Destination timeout monitoring subsystem.
//!
//! # Data Flow
//! ```text
//! Caller (around each destination call):
//!     start_*_timer / reset_*_timer → phase.rs (atomic start slots)
//!
//! TimeoutMonitor::supervise (race.rs):
//!     primary future ─────────────────────────────┐
//!     worker.rs → scheduler.rs (sleep poll_interval) ├─ first to finish wins
//!         → detector.rs (Accept, then NotifyEndOfInput)
//!         → metrics sink (every breach)          ┘
//!     breach → policy.rs (fatal?) → error.rs (TimeoutError) or keep waiting
//! ```
//!
//! # Design Decisions
//! - Timers are lock-free; the watchdog reads a snapshot per comparison
//! - Detection is single-shot per supervised run
//! - The policy is asked at breach time, never cached
//! - One lazily spawned worker per monitor, released by `shutdown`

pub mod detector;
pub mod error;
pub mod humanize;
pub mod phase;
pub mod policy;
pub mod race;
pub mod scheduler;
pub mod types;
pub mod worker;

pub use error::{Completion, SupervisionError, TimeoutError};
pub use phase::{Phase, PhaseTimer, PhaseTimers};
pub use policy::{ConfigPolicy, FixedPolicy, TimeoutPolicy};
pub use race::TimeoutMonitor;
pub use scheduler::{SchedulerState, WatchdogOutcome};
pub use types::{BreachRecord, CorrelationIds, WatchdogConfig};
pub use worker::WorkerExit;
