//! Validated collections of route trees.
//!
//! # Responsibilities
//! - Check structure once, when roots are collected
//! - Distinguish partial catalogs from complete, matchable forests
//!
//! # Design Decisions
//! - Validation reports the first problem found, in declaration order
//! - A `RouteForest` always holds exactly one catch-all, as its last root

use serde::{Serialize, Serializer};
use std::collections::HashSet;
use std::sync::Arc;

use crate::tree::error::StructureError;
use crate::tree::node::{join_path, matches_everything, RouteNode};

/// Ordered root nodes with unique names and at most one trailing catch-all.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RouteCatalog {
    roots: Vec<Arc<RouteNode>>,
}

impl RouteCatalog {
    pub fn new(roots: Vec<Arc<RouteNode>>) -> Result<Self, StructureError> {
        check_structure(&roots)?;
        Ok(Self { roots })
    }

    /// Wrap roots derived from an already validated catalog by removing nodes.
    pub(crate) fn from_pruned(roots: Vec<Arc<RouteNode>>) -> Self {
        debug_assert!(check_structure(&roots).is_ok());
        Self { roots }
    }

    pub fn roots(&self) -> &[Arc<RouteNode>] {
        &self.roots
    }

    pub fn into_roots(self) -> Vec<Arc<RouteNode>> {
        self.roots
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// The trailing catch-all, if this catalog carries one.
    pub fn fallback(&self) -> Option<&Arc<RouteNode>> {
        self.roots.last().filter(|node| node.is_catch_all())
    }

    /// Total number of nodes across all trees.
    pub fn node_count(&self) -> usize {
        fn count(node: &RouteNode) -> usize {
            1 + node.children.iter().map(|c| count(c)).sum::<usize>()
        }
        self.roots.iter().map(|r| count(r)).sum()
    }

    /// Depth-first search for a node by logical name.
    pub fn find_by_name(&self, name: &str) -> Option<&Arc<RouteNode>> {
        fn find<'a>(nodes: &'a [Arc<RouteNode>], name: &str) -> Option<&'a Arc<RouteNode>> {
            nodes.iter().find_map(|node| {
                if node.name.as_deref() == Some(name) {
                    Some(node)
                } else {
                    find(&node.children, name)
                }
            })
        }
        find(&self.roots, name)
    }
}

/// A complete forest: a catalog whose last root is the catch-all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteForest {
    catalog: RouteCatalog,
    fallback: Arc<RouteNode>,
}

impl Serialize for RouteForest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.catalog.serialize(serializer)
    }
}

impl RouteForest {
    pub fn new(roots: Vec<Arc<RouteNode>>) -> Result<Self, StructureError> {
        Self::from_catalog(RouteCatalog::new(roots)?)
    }

    pub fn from_catalog(catalog: RouteCatalog) -> Result<Self, StructureError> {
        let fallback = catalog
            .fallback()
            .cloned()
            .ok_or(StructureError::MissingFallback)?;
        Ok(Self { catalog, fallback })
    }

    pub fn roots(&self) -> &[Arc<RouteNode>] {
        self.catalog.roots()
    }

    pub fn fallback(&self) -> &Arc<RouteNode> {
        &self.fallback
    }

    pub fn as_catalog(&self) -> &RouteCatalog {
        &self.catalog
    }

    pub fn into_roots(self) -> Vec<Arc<RouteNode>> {
        self.catalog.into_roots()
    }

    pub fn find_by_name(&self, name: &str) -> Option<&Arc<RouteNode>> {
        self.catalog.find_by_name(name)
    }
}

fn check_structure(roots: &[Arc<RouteNode>]) -> Result<(), StructureError> {
    let mut fallback_at = None;
    for (position, root) in roots.iter().enumerate() {
        if root.is_catch_all() {
            if fallback_at.is_some() {
                return Err(StructureError::DuplicateFallback);
            }
            fallback_at = Some(position);
        }
    }
    if let Some(position) = fallback_at {
        if position + 1 != roots.len() {
            return Err(StructureError::FallbackNotLast {
                position,
                total: roots.len(),
            });
        }
    }

    let mut names = HashSet::new();
    let mut ancestors = Vec::new();
    for root in roots {
        check_node(root, None, &mut ancestors, &mut names)?;
    }
    Ok(())
}

/// `parent` is the parent node with its effective path.
fn check_node<'a>(
    node: &'a Arc<RouteNode>,
    parent: Option<(&RouteNode, &str)>,
    ancestors: &mut Vec<*const RouteNode>,
    names: &mut HashSet<&'a str>,
) -> Result<(), StructureError> {
    let ptr = Arc::as_ptr(node);
    if ancestors.contains(&ptr) {
        return Err(StructureError::Cycle {
            path: node.path.clone(),
        });
    }
    let effective = join_path(parent.map(|(_, path)| path), &node.path);
    if let Some((parent, _)) = parent {
        // an empty child path below a wildcard parent matches everything too
        if matches_everything(&effective) {
            return Err(StructureError::NestedFallback {
                parent: parent.path.clone(),
            });
        }
    }
    if let Some(name) = node.name.as_deref() {
        if !names.insert(name) {
            return Err(StructureError::DuplicateName {
                name: name.to_string(),
            });
        }
    }
    if node.name.is_none() && node.children.len() > 1 {
        return Err(StructureError::UnnamedBranch {
            path: node.path.clone(),
            children: node.children.len(),
        });
    }

    ancestors.push(ptr);
    for child in &node.children {
        check_node(child, Some((node.as_ref(), &effective)), ancestors, names)?;
    }
    ancestors.pop();
    Ok(())
}
