//! OS signal handling.
//!
//! # Responsibilities
//! - Register signal handlers (SIGTERM, SIGINT, SIGHUP)
//! - Translate signals to internal events
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)
//! - SIGHUP requests a catalog reload, not shutdown
//! - A second SIGINT/SIGTERM exits immediately

use tokio::sync::mpsc;

use crate::lifecycle::shutdown::Shutdown;

/// Listen for signals until shutdown. Reload requests go to `reload_tx`.
pub async fn listen(shutdown: Shutdown, reload_tx: mpsc::UnboundedSender<()>) {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let (mut term, mut hup) = match (
            signal(SignalKind::terminate()),
            signal(SignalKind::hangup()),
        ) {
            (Ok(term), Ok(hup)) => (term, hup),
            (Err(e), _) | (_, Err(e)) => {
                tracing::error!(error = %e, "Failed to install signal handlers");
                return;
            }
        };

        loop {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {}
                _ = term.recv() => {}
                _ = hup.recv() => {
                    tracing::info!("SIGHUP received, reloading route catalog");
                    if reload_tx.send(()).is_err() {
                        tracing::warn!("Reload requested but nothing is listening");
                    }
                    continue;
                }
            }
            if shutdown.is_triggered() {
                tracing::warn!("Second shutdown signal, exiting immediately");
                std::process::exit(130);
            }
            tracing::info!("Shutdown signal received");
            shutdown.trigger();
        }
    }

    #[cfg(not(unix))]
    {
        let _ = reload_tx;
        loop {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to install Ctrl+C handler");
                return;
            }
            if shutdown.is_triggered() {
                std::process::exit(130);
            }
            tracing::info!("Shutdown signal received");
            shutdown.trigger();
        }
    }
}
