//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured tracing events)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stdout (tracing-subscriber fmt layer)
//!     → Metrics endpoint (Prometheus scrape, opt-in)
//! ```
//!
//! # Design Decisions
//! - Request ID (`x-request-id`) is attached by the HTTP layer and shows up
//!   in tower-http's request spans
//! - Metrics are cheap no-ops when the exporter is not installed

pub mod logging;
pub mod metrics;
