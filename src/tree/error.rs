//! Structural error definitions.

use thiserror::Error;

/// A malformed route tree. Always fatal to the operation that detected it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StructureError {
    /// Two nodes share a logical name.
    #[error("duplicate route name '{name}'")]
    DuplicateName { name: String },

    /// A complete forest has no catch-all node.
    #[error("catch-all route '*' is missing")]
    MissingFallback,

    /// More than one catch-all node.
    #[error("catch-all route '*' is declared more than once")]
    DuplicateFallback,

    /// The catch-all is not the last root.
    #[error("catch-all route must be the last root, found at position {position} of {total}")]
    FallbackNotLast { position: usize, total: usize },

    /// The catch-all is nested below another node.
    #[error("catch-all route must be a root, found below '{parent}'")]
    NestedFallback { parent: String },

    /// A node appears as its own descendant.
    #[error("route '{path}' appears as its own descendant")]
    Cycle { path: String },

    /// A node with alternate children carries no name.
    #[error("route '{path}' has {children} children but no name")]
    UnnamedBranch { path: String, children: usize },

    /// A path pattern cannot be compiled.
    #[error("invalid route pattern '{path}': {reason}")]
    InvalidPattern { path: String, reason: String },

    /// A catalog file references a key that is not defined.
    #[error("route references unknown key '{key}'")]
    UnknownReference { key: String },

    /// A catalog file lists the same route under two parents.
    #[error("route '{key}' is referenced by more than one parent")]
    MultipleParents { key: String },

    /// A catalog file defines the same key twice.
    #[error("route key '{key}' is defined more than once")]
    DuplicateKey { key: String },
}
