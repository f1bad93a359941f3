//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Router, catalog watcher, admin API produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (resolve outcomes, resets, live generation)
//!
//! Consumers:
//!     → stdout (tracing-subscriber fmt layer)
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```
//!
//! # Design Decisions
//! - Log level from RUST_LOG, falling back to the configured level
//! - Metrics go through the `metrics` facade; without an exporter they are no-ops

pub mod logging;
pub mod metrics;
