//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Shutdown::trigger
//!
//! Shutdown (shutdown.rs):
//!     trigger → every ShutdownListener resolves
//!     → heartbeat server drains, supervised run returns Interrupted
//!     → monitor worker released with a grace period
//! ```
//!
//! # Design Decisions
//! - Shutdown is a level, not an event: late listeners still observe it
//! - Shutdown has timeout: the monitor worker is aborted after its grace period

pub mod shutdown;
pub mod signals;

pub use shutdown::{Shutdown, ShutdownListener};
