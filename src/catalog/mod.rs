//! Route catalogs.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     constant.rs  → build_static()          → RouteForest (always available)
//!     dynamic.rs   → default_catalog()       → RouteCatalog (superset)
//!     source.rs    → load_catalog(file)      → RouteCatalog (replaces the default)
//!
//! Permission change / catalog reload:
//!     build_dynamic(roles, superset)  → pruned RouteCatalog
//!     assemble(static, pruned)        → RouteForest
//!     → Router::reset
//! ```
//!
//! # Design Decisions
//! - Static routes never depend on the viewer
//! - Permission-scoped routes are always pruned from one superset catalog

pub mod constant;
pub mod dynamic;
pub mod source;

pub use constant::{build_static, StaticOptions, Widget};
pub use dynamic::{assemble, build_dynamic, default_catalog};
pub use source::{load_catalog, parse_catalog, CatalogError};
