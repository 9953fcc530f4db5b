//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Monitor and destination produce:
//!     → logging.rs (structured log events with workspace/connection ids)
//!     → metrics.rs (per-phase timeout counters)
//!
//! Consumers:
//!     → Log aggregation (stdout, JSON or pretty)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Structured logging (JSON) for machine parsing
//! - Correlation ids flow through every log line and metric label
//! - Metrics are cheap (atomic increments)

pub mod logging;
pub mod metrics;
