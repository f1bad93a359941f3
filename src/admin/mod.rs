//! Admin HTTP API.
//!
//! Read-only views of the live router plus the two write paths the host exposes:
//! replacing the viewer's roles and reloading the route catalog. Both go through
//! `Session`, so a rejected change leaves the live routes untouched.

pub mod auth;
pub mod handlers;

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::config::CatalogConfig;
use crate::routing::Session;

use self::auth::admin_auth_middleware;
use self::handlers::*;

/// State shared by all admin handlers.
#[derive(Clone)]
pub struct AdminState {
    pub session: Arc<Session>,
    pub catalog: Arc<CatalogConfig>,
    pub api_key: Option<Arc<str>>,
}

impl AdminState {
    pub fn new(session: Arc<Session>, catalog: CatalogConfig, api_key: Option<String>) -> Self {
        Self {
            session,
            catalog: Arc::new(catalog),
            api_key: api_key.map(Arc::from),
        }
    }
}

pub fn setup_admin_router(state: AdminState) -> Router {
    Router::new()
        .route("/admin/status", get(get_status))
        .route("/admin/routes", get(get_routes))
        .route("/admin/resolve", get(get_resolve))
        .route("/admin/menu", get(get_menu))
        .route("/admin/roles", put(put_roles))
        .route("/admin/reload", post(post_reload))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            admin_auth_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
