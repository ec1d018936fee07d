//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Front controller, comment pipeline, file handler:
//!     → logging.rs (structured log events, request id as a field)
//!     → metrics.rs (counters and histograms)
//!
//! Consumers:
//!     → stdout (plain or JSON lines)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - The request id set by the HTTP layer is logged by the front controller
//! - Metrics are cheap (atomic increments) and optional

pub mod logging;
pub mod metrics;
