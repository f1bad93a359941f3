//! Metrics collection and exposition.
//!
//! # Metrics
//! - `route_tree_resolve_total` (counter): resolutions by outcome
//!   (`matched`, `fallback`, `redirect_loop`)
//! - `route_tree_reset_total` (counter): resets by outcome (`ok`, `rejected`)
//! - `route_tree_catalog_reload_total` (counter): catalog file reloads by outcome
//! - `route_tree_generation` (gauge): generation of the live router state

use metrics::{counter, gauge};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Install the Prometheus exporter with its own HTTP listener.
/// Must be called from within a tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => {
            tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter")
        }
    }
}

pub fn record_resolve(outcome: &'static str) {
    counter!("route_tree_resolve_total", "outcome" => outcome).increment(1);
}

pub fn record_reset(outcome: &'static str) {
    counter!("route_tree_reset_total", "outcome" => outcome).increment(1);
}

pub fn record_catalog_reload(outcome: &'static str) {
    counter!("route_tree_catalog_reload_total", "outcome" => outcome).increment(1);
}

pub fn record_generation(generation: u64) {
    gauge!("route_tree_generation").set(generation as f64);
}
