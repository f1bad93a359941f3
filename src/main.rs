//! route-tree host binary.
//!
//! ```text
//!   config.toml ──▶ AppConfig ──▶ static forest + catalog + roles ──▶ Session
//!                                                                      │
//!   admin API (axum) ─── PUT /admin/roles, POST /admin/reload ────────▶│ reset
//!   catalog watcher (notify) ── reloaded RouteCatalog ────────────────▶│ reset
//!   SIGHUP ── reload request ─────────────────────────────────────────▶│ reset
//!                                                                      ▼
//!                                                          Router (ArcSwap state)
//! ```

use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use route_tree::admin::{handlers::ResolveResponse, setup_admin_router, AdminState};
use route_tree::config::{load_config, AppConfig, CatalogWatcher};
use route_tree::lifecycle::{apply_catalog, reload_catalog, signals, start_session, Shutdown};
use route_tree::observability::{logging, metrics};
use route_tree::routing::menu::{cached_views, menu};
use route_tree::routing::Session;
use route_tree::tree::{Role, RouteCatalog};

#[derive(Parser)]
#[command(name = "route-tree")]
#[command(about = "Navigation route tree host", long_about = None)]
struct Cli {
    /// Configuration file (TOML). Defaults apply when omitted.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the admin API and keep the router current
    Serve,
    /// Validate the configuration and route catalog, then exit
    Check,
    /// Resolve a path and print the match
    Resolve {
        path: String,
        /// Roles to resolve as, replacing the configured defaults
        #[arg(short, long = "role")]
        roles: Vec<String>,
    },
    /// Print the sidebar menu
    Menu {
        #[arg(short, long = "role")]
        roles: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => AppConfig::default(),
    };

    logging::init(&config.observability.log_level);

    match cli.command {
        Commands::Serve => serve(config).await,
        Commands::Check => check(&config),
        Commands::Resolve { path, roles } => {
            let session = session_for(&config, roles)?;
            let snapshot = session.router().snapshot();
            let result = snapshot.resolve(&path);
            let response = ResolveResponse::new(snapshot.generation(), result);
            println!("{}", serde_json::to_string_pretty(&response)?);
            Ok(())
        }
        Commands::Menu { roles } => {
            let session = session_for(&config, roles)?;
            let snapshot = session.router().snapshot();
            let output = serde_json::json!({
                "menu": menu(snapshot.forest()),
                "cached_views": cached_views(snapshot.forest()),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
            Ok(())
        }
    }
}

fn session_for(
    config: &AppConfig,
    roles: Vec<String>,
) -> Result<Arc<Session>, Box<dyn std::error::Error>> {
    let session = start_session(config)?;
    if !roles.is_empty() {
        session.set_roles(roles.into_iter().map(Role::new).collect())?;
    }
    Ok(session)
}

fn check(config: &AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let session = start_session(config)?;
    let snapshot = session.router().snapshot();
    let superset = session.catalog();
    println!(
        "ok: {} static+permitted roots, {} nodes live, {} nodes in catalog",
        snapshot.forest().roots().len(),
        snapshot.forest().as_catalog().node_count(),
        superset.node_count(),
    );
    Ok(())
}

async fn serve(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "route-tree starting");

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr);
    }

    let session = start_session(&config)?;
    tracing::info!(
        generation = session.router().generation(),
        roles = ?session.roles(),
        "Session started"
    );

    let shutdown = Shutdown::new();
    let (reload_tx, reload_rx) = mpsc::unbounded_channel();
    tokio::spawn(signals::listen(shutdown.clone(), reload_tx));

    // dropping the watcher stops it, so it lives as long as serve()
    let (_watcher, catalog_rx) = match (&config.catalog.path, config.catalog.watch) {
        (Some(path), true) => {
            let (watcher, rx) = CatalogWatcher::new(path);
            (Some(watcher.run()?), Some(rx))
        }
        _ => (None, None),
    };

    tokio::spawn(apply_updates(
        session.clone(),
        config.clone(),
        reload_rx,
        catalog_rx,
        shutdown.clone(),
    ));

    if config.admin.enabled {
        let state = AdminState::new(
            session.clone(),
            config.catalog.clone(),
            config.admin.api_key.clone(),
        );
        let app = setup_admin_router(state);
        let listener = TcpListener::bind(&config.admin.bind_address).await?;
        tracing::info!(address = %listener.local_addr()?, "Admin API listening");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown.wait())
            .await?;
    } else {
        shutdown.wait().await;
    }

    tracing::info!("Shutdown complete");
    Ok(())
}

/// Apply reload requests and watched catalog updates until shutdown.
async fn apply_updates(
    session: Arc<Session>,
    config: AppConfig,
    mut reload_rx: mpsc::UnboundedReceiver<()>,
    mut catalog_rx: Option<mpsc::UnboundedReceiver<RouteCatalog>>,
    shutdown: Shutdown,
) {
    let stopped = shutdown.wait();
    tokio::pin!(stopped);

    loop {
        tokio::select! {
            _ = &mut stopped => break,
            Some(()) = reload_rx.recv() => {
                let (session, catalog) = (session.clone(), config.catalog.clone());
                let reload =
                    tokio::task::spawn_blocking(move || reload_catalog(&session, &catalog));
                match reload.await {
                    Ok(Ok(_)) => {}
                    Ok(Err(e)) => {
                        tracing::error!(error = %e, "Catalog reload failed, keeping routes");
                    }
                    Err(e) => tracing::error!(error = %e, "Catalog reload task failed"),
                }
            }
            Some(catalog) = next_catalog(&mut catalog_rx) => {
                if let Err(e) = apply_catalog(&session, catalog) {
                    tracing::error!(error = %e, "Watched catalog rejected, keeping current routes");
                }
            }
            else => break,
        }
    }
    tracing::debug!("Update loop stopped");
}

async fn next_catalog(
    rx: &mut Option<mpsc::UnboundedReceiver<RouteCatalog>>,
) -> Option<RouteCatalog> {
    match rx {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}
