//! Viewer session.
//!
//! # Responsibilities
//! - Keep the inputs the live router was built from: static forest, superset
//!   catalog and the viewer's roles
//! - Rebuild and reset the router when roles or the catalog change
//!
//! # Design Decisions
//! - Inputs are committed only after the router accepted the rebuilt forest
//! - One input lock spans read, rebuild and commit, so concurrent changes serialize

use parking_lot::Mutex;
use std::sync::Arc;

use crate::catalog::{assemble, build_dynamic};
use crate::routing::matcher::MatcherOptions;
use crate::routing::router::Router;
use crate::tree::{RoleSet, RouteCatalog, RouteForest, StructureError};

#[derive(Debug, Clone)]
struct Inputs {
    catalog: Arc<RouteCatalog>,
    roles: RoleSet,
}

/// Router plus the permission inputs it is derived from.
#[derive(Debug)]
pub struct Session {
    router: Arc<Router>,
    static_forest: RouteForest,
    inputs: Mutex<Inputs>,
}

impl Session {
    /// Build the initial router for `roles`. Failure aborts startup.
    pub fn start(
        static_forest: RouteForest,
        catalog: RouteCatalog,
        roles: RoleSet,
        options: MatcherOptions,
    ) -> Result<Self, StructureError> {
        let forest = assemble(&static_forest, &build_dynamic(&roles, &catalog))?;
        let router = Router::initialize(forest.into_roots(), options)?;
        Ok(Self {
            router: Arc::new(router),
            static_forest,
            inputs: Mutex::new(Inputs {
                catalog: Arc::new(catalog),
                roles,
            }),
        })
    }

    /// The long-lived router handle. Its identity never changes.
    pub fn router(&self) -> &Arc<Router> {
        &self.router
    }

    pub fn roles(&self) -> RoleSet {
        self.inputs.lock().roles.clone()
    }

    pub fn catalog(&self) -> Arc<RouteCatalog> {
        self.inputs.lock().catalog.clone()
    }

    /// Permission change: rebuild for `roles`. Returns the new generation.
    pub fn set_roles(&self, roles: RoleSet) -> Result<u64, StructureError> {
        let mut inputs = self.inputs.lock();
        let generation = self.rebuild(&inputs.catalog, &roles)?;
        tracing::info!(generation, roles = ?roles, "Viewer roles changed");
        inputs.roles = roles;
        Ok(generation)
    }

    /// Catalog change: rebuild with the current roles. Returns the new generation.
    pub fn replace_catalog(&self, catalog: RouteCatalog) -> Result<u64, StructureError> {
        let mut inputs = self.inputs.lock();
        let generation = self.rebuild(&catalog, &inputs.roles)?;
        tracing::info!(generation, roots = catalog.roots().len(), "Route catalog replaced");
        inputs.catalog = Arc::new(catalog);
        Ok(generation)
    }

    fn rebuild(&self, catalog: &RouteCatalog, roles: &RoleSet) -> Result<u64, StructureError> {
        self.router.reset_with(|| {
            let dynamic = build_dynamic(roles, catalog);
            assemble(&self.static_forest, &dynamic).map(RouteForest::into_roots)
        })
    }
}
