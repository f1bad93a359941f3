//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → AppConfig (validated, immutable)
//!
//! Catalog file named by [catalog].path:
//!     watcher.rs detects change
//!     → catalog::load_catalog parses and checks structure
//!     → Session::replace_catalog resets the router
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; only the route catalog hot-reloads
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{AdminConfig, AppConfig, CatalogConfig, ObservabilityConfig, RouterConfig};
pub use validation::{validate_config, ValidationError};
pub use watcher::CatalogWatcher;
