//! Destination timeout watchdog library.
//!
//! Supervises a streaming destination call, timing its `accept` and
//! `notify_end_of_input` phases and failing (or just reporting) runs that
//! stall.

pub mod config;
pub mod destination;
pub mod heartbeat;
pub mod lifecycle;
pub mod monitor;
pub mod observability;

pub use config::WorkerConfig;
pub use lifecycle::Shutdown;
pub use monitor::{Completion, SupervisionError, TimeoutError, TimeoutMonitor};
