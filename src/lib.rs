//! Declarative navigation route trees.
//!
//! Route definitions form a forest of named nodes. A static part is always present;
//! a permission-scoped part is pruned from a superset catalog per viewer. The
//! [`routing::Router`] compiles the assembled forest into an ordered matcher and
//! swaps it atomically whenever the viewer's permissions or the catalog change.

pub mod admin;
pub mod catalog;
pub mod config;
pub mod lifecycle;
pub mod observability;
pub mod routing;
pub mod tree;

pub use config::schema::AppConfig;
pub use lifecycle::Shutdown;
pub use routing::{MatchResult, Router, Session};
pub use tree::{RouteForest, RouteNode, StructureError};
