//! Startup orchestration.
//!
//! # Responsibilities
//! - Build the static forest and load the superset catalog
//! - Start the session for the configured default roles
//! - Re-read the catalog source on reload requests
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - A failed reload is logged and the live routes stay in place

use std::sync::Arc;
use thiserror::Error;

use crate::catalog::{build_static, default_catalog, load_catalog, CatalogError};
use crate::config::{AppConfig, CatalogConfig};
use crate::observability::metrics;
use crate::routing::Session;
use crate::tree::{RouteCatalog, StructureError};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("static routes: {0}")]
    Static(StructureError),

    #[error("route catalog: {0}")]
    Catalog(#[from] CatalogError),

    #[error("initial router: {0}")]
    Router(StructureError),
}

/// The superset catalog named by `config`, or the compiled-in one.
pub fn load_superset(config: &CatalogConfig) -> Result<RouteCatalog, CatalogError> {
    match &config.path {
        Some(path) => {
            let catalog = load_catalog(path)?;
            tracing::info!(path = ?path, roots = catalog.roots().len(), "Route catalog loaded");
            Ok(catalog)
        }
        None => Ok(default_catalog()?),
    }
}

/// Build the session the host serves.
pub fn start_session(config: &AppConfig) -> Result<Arc<Session>, StartupError> {
    let static_forest =
        build_static(&config.catalog.static_options()).map_err(StartupError::Static)?;
    let catalog = load_superset(&config.catalog)?;
    let roles = config.router.default_role_set();

    let session = Session::start(
        static_forest,
        catalog,
        roles,
        config.router.matcher_options(),
    )
    .map_err(StartupError::Router)?;
    Ok(Arc::new(session))
}

/// Apply a catalog that was already loaded, recording the outcome.
pub fn apply_catalog(session: &Session, catalog: RouteCatalog) -> Result<u64, StructureError> {
    let result = session.replace_catalog(catalog);
    metrics::record_catalog_reload(if result.is_ok() { "ok" } else { "rejected" });
    result
}

/// Re-read the configured catalog source and reset the router with it.
pub fn reload_catalog(session: &Session, config: &CatalogConfig) -> Result<u64, CatalogError> {
    let catalog = load_superset(config).inspect_err(|_| {
        metrics::record_catalog_reload("invalid");
    })?;
    Ok(apply_catalog(session, catalog)?)
}
