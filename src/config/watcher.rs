//! Catalog file watcher for hot reload.

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::mpsc;

use crate::catalog::load_catalog;
use crate::observability::metrics;
use crate::tree::RouteCatalog;

/// Monitors the catalog file and forwards every catalog that loads cleanly.
pub struct CatalogWatcher {
    path: PathBuf,
    update_tx: mpsc::UnboundedSender<RouteCatalog>,
}

impl CatalogWatcher {
    /// Returns the watcher and a receiver for reloaded catalogs.
    pub fn new(path: &Path) -> (Self, mpsc::UnboundedReceiver<RouteCatalog>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();
        (
            Self {
                path: path.to_path_buf(),
                update_tx,
            },
            update_rx,
        )
    }

    /// Start watching. Dropping the returned watcher stops it.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let tx = self.update_tx;
        let path = self.path.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) if event.kind.is_modify() || event.kind.is_create() => {
                    tracing::info!(path = ?path, "Catalog file change detected, reloading");
                    match load_catalog(&path) {
                        Ok(catalog) => {
                            if tx.send(catalog).is_err() {
                                tracing::debug!("Catalog receiver gone, dropping update");
                            }
                        }
                        Err(e) => {
                            metrics::record_catalog_reload("invalid");
                            tracing::error!(
                                error = %e,
                                "Failed to reload catalog, keeping current routes"
                            );
                        }
                    }
                }
                Ok(_) => {}
                Err(e) => tracing::error!(error = ?e, "Catalog watch error"),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&self.path, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?self.path, "Catalog watcher started");
        Ok(watcher)
    }
}
