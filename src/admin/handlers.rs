use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::admin::AdminState;
use crate::catalog::CatalogError;
use crate::lifecycle::reload_catalog;
use crate::routing::menu::{breadcrumbs, cached_views, menu, Crumb, MenuItem};
use crate::routing::{MatchResult, Params, RedirectLoopError};
use crate::tree::{Role, RouteForest, StructureError};

/// Failures surfaced by admin write paths.
#[derive(Debug, Error)]
pub enum AdminError {
    #[error(transparent)]
    Structure(#[from] StructureError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("{0}")]
    BadRequest(String),

    #[error("reload task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl AdminError {
    fn status(&self) -> StatusCode {
        match self {
            AdminError::Structure(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AdminError::Catalog(CatalogError::Io(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            AdminError::Catalog(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AdminError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AdminError::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AdminError {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

#[derive(Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub generation: u64,
    pub roles: Vec<String>,
    pub roots: usize,
    pub nodes: usize,
}

#[derive(Deserialize)]
pub struct ResolveQuery {
    pub path: String,
}

#[derive(Serialize)]
pub struct ResolveResponse {
    pub generation: u64,
    pub path: String,
    pub name: Option<String>,
    pub title: Option<String>,
    pub matched: Vec<String>,
    pub params: Params,
    pub redirected_from: Vec<String>,
    pub fallback: bool,
    pub redirect_error: Option<RedirectLoopError>,
    pub active_menu: String,
    pub breadcrumbs: Vec<Crumb>,
}

impl ResolveResponse {
    pub fn new(generation: u64, result: MatchResult) -> Self {
        let leaf = result.leaf();
        Self {
            generation,
            name: leaf.name.clone(),
            title: leaf.meta.title.clone(),
            active_menu: result.active_menu().to_string(),
            breadcrumbs: breadcrumbs(&result),
            path: result.path,
            matched: result.matched_paths,
            params: result.params,
            redirected_from: result.redirected_from,
            fallback: result.fallback,
            redirect_error: result.redirect_error,
        }
    }
}

#[derive(Serialize)]
pub struct MenuResponse {
    pub generation: u64,
    pub menu: Vec<MenuItem>,
    pub cached_views: Vec<String>,
}

#[derive(Deserialize)]
pub struct RolesRequest {
    pub roles: Vec<String>,
}

#[derive(Serialize)]
pub struct ResetResponse {
    pub generation: u64,
}

pub async fn get_status(State(state): State<AdminState>) -> Json<SystemStatus> {
    let snapshot = state.session.router().snapshot();
    let forest = snapshot.forest();
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        generation: snapshot.generation(),
        roles: state
            .session
            .roles()
            .iter()
            .map(|r| r.as_str().to_string())
            .collect(),
        roots: forest.roots().len(),
        nodes: forest.as_catalog().node_count(),
    })
}

pub async fn get_routes(State(state): State<AdminState>) -> Json<RouteForest> {
    Json(state.session.router().snapshot().forest().clone())
}

pub async fn get_resolve(
    State(state): State<AdminState>,
    Query(query): Query<ResolveQuery>,
) -> Json<ResolveResponse> {
    let snapshot = state.session.router().snapshot();
    let result = snapshot.resolve(&query.path);
    Json(ResolveResponse::new(snapshot.generation(), result))
}

pub async fn get_menu(State(state): State<AdminState>) -> Json<MenuResponse> {
    let snapshot = state.session.router().snapshot();
    Json(MenuResponse {
        generation: snapshot.generation(),
        menu: menu(snapshot.forest()),
        cached_views: cached_views(snapshot.forest()),
    })
}

pub async fn put_roles(
    State(state): State<AdminState>,
    Json(request): Json<RolesRequest>,
) -> Result<Json<ResetResponse>, AdminError> {
    if request.roles.iter().any(|r| r.trim().is_empty()) {
        return Err(AdminError::BadRequest("roles must not be empty".to_string()));
    }
    let roles = request.roles.into_iter().map(Role::new).collect();
    let generation = state.session.set_roles(roles)?;
    Ok(Json(ResetResponse { generation }))
}

pub async fn post_reload(
    State(state): State<AdminState>,
) -> Result<Json<ResetResponse>, AdminError> {
    // reading the catalog file blocks
    let generation = tokio::task::spawn_blocking(move || {
        reload_catalog(&state.session, &state.catalog)
    })
    .await??;
    Ok(Json(ResetResponse { generation }))
}
