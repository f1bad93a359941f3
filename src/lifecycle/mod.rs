//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → Build static forest → Load catalog → Start session → Serve
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Stop accepting → Drain admin requests → Exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//!     SIGHUP → Reload the route catalog
//! ```

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
pub use startup::{apply_catalog, load_superset, reload_catalog, start_session, StartupError};
