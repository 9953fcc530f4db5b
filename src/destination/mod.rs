//! Destination subsystem.
//!
//! # Data Flow
//! ```text
//! records
//!     → timed.rs (start timer → call → reset timer)
//!     → Destination impl (process.rs: child stdin)
//! ```
//!
//! # Design Decisions
//! - The monitor never talks to a destination; only the timed wrapper does
//! - Records are opaque bytes, one call per record

use std::future::Future;
use thiserror::Error;

pub mod process;
pub mod timed;

pub use process::ProcessDestination;
pub use timed::TimedDestination;

/// Errors raised by a destination.
#[derive(Debug, Error)]
pub enum DestinationError {
    #[error("failed to start destination '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("destination I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("destination input already closed")]
    InputClosed,

    #[error("destination exited with {0}")]
    Exited(std::process::ExitStatus),
}

/// A sink for records that must be told when input ends.
pub trait Destination: Send {
    /// Hand one record to the destination.
    fn accept(&mut self, record: &[u8]) -> impl Future<Output = Result<(), DestinationError>> + Send;

    /// Signal that no more records will follow and wait for the destination
    /// to finish.
    fn notify_end_of_input(&mut self) -> impl Future<Output = Result<(), DestinationError>> + Send;
}
