//! Route tree model.
//!
//! # Data Flow
//! ```text
//! RouteNode::builder(..).build()   (compiled-in catalogs, catalog files)
//!     → node.rs (immutable Arc<RouteNode> trees)
//!     → forest.rs (structural validation)
//!     → RouteCatalog (partial) / RouteForest (complete, has catch-all)
//!     → handed to the matcher and the router
//! ```
//!
//! # Design Decisions
//! - Trees are never edited; filtering and reloading build new trees
//! - Structure errors are fatal to the operation that found them

pub mod error;
pub mod forest;
pub mod node;

pub use error::StructureError;
pub use forest::{RouteCatalog, RouteForest};
pub use node::{
    roles, ContentRef, Meta, Redirect, Role, RoleSet, RouteNode, RouteNodeBuilder, Visibility,
    CATCH_ALL,
};
