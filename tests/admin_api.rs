//! Admin API driven in-process through tower.

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use std::io::Write;
use tower::ServiceExt;

use route_tree::admin::{setup_admin_router, AdminState};
use route_tree::config::CatalogConfig;

mod common;

const KEY: &str = "test-key";

fn app(catalog: CatalogConfig) -> (Router, AdminState) {
    let state = AdminState::new(common::session(&["viewer"]), catalog, Some(KEY.to_string()));
    (setup_admin_router(state.clone()), state)
}

fn request(method: Method, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {KEY}"));
    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send(app: Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    send(app, request(Method::GET, uri, None)).await
}

#[tokio::test]
async fn test_requires_api_key() {
    let (app, _) = app(CatalogConfig::default());
    let req = Request::builder()
        .uri("/admin/status")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(app.clone(), req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let req = Request::builder()
        .uri("/admin/status")
        .header(header::AUTHORIZATION, "Bearer wrong")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(app, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_status() {
    let (app, _) = app(CatalogConfig::default());
    let (status, body) = get(app, "/admin/status").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["generation"], 0);
    assert_eq!(body["roles"], serde_json::json!(["viewer"]));
}

#[tokio::test]
async fn test_resolve_with_params_and_redirect() {
    let (app, _) = app(CatalogConfig::default());

    let (status, body) = get(app.clone(), "/admin/resolve?path=/example/edit/7").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "ExampleEdit");
    assert_eq!(body["params"]["id"], "7");
    assert_eq!(body["active_menu"], "/example/table");

    let (_, body) = get(app, "/admin/resolve?path=/").await;
    assert_eq!(body["name"], "Dashboard");
    assert_eq!(body["path"], "/dashboard");
    assert_eq!(body["redirected_from"], serde_json::json!(["/"]));
}

#[tokio::test]
async fn test_role_change_resets_router() {
    let (app, state) = app(CatalogConfig::default());

    let (_, body) = get(app.clone(), "/admin/resolve?path=/admin/users").await;
    assert_eq!(body["fallback"], true);

    let (status, body) = send(
        app.clone(),
        request(
            Method::PUT,
            "/admin/roles",
            Some(serde_json::json!({ "roles": ["admin"] })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["generation"], 1);

    let (_, body) = get(app.clone(), "/admin/resolve?path=/admin/users").await;
    assert_eq!(body["name"], "AdminUsers");

    let (_, body) = get(app, "/admin/menu").await;
    let titles: Vec<_> = body["menu"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|item| item["title"].as_str())
        .collect();
    assert!(titles.contains(&"Admin"));
    assert_eq!(state.session.router().generation(), 1);
}

#[tokio::test]
async fn test_empty_role_is_bad_request() {
    let (app, _) = app(CatalogConfig::default());
    let (status, _) = send(
        app,
        request(Method::PUT, "/admin/roles", Some(serde_json::json!({ "roles": [""] }))),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_reload_from_catalog_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(common::NESTED_CATALOG.as_bytes()).unwrap();
    let catalog = CatalogConfig {
        path: Some(file.path().to_path_buf()),
        ..CatalogConfig::default()
    };
    let (app, _) = app(catalog);

    let (status, body) = send(app.clone(), request(Method::POST, "/admin/reload", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["generation"], 1);

    let (_, body) = get(app.clone(), "/admin/resolve?path=/docs").await;
    assert_eq!(body["name"], "DocsIntro");

    // viewer lacks the editor role
    let (_, body) = get(app, "/admin/resolve?path=/docs/guide/setup").await;
    assert_eq!(body["fallback"], true);
}

#[tokio::test]
async fn test_rejected_reload_answers_422() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    // collides with the static Dashboard route
    file.write_all(b"[[route]]\npath = \"/dup\"\nname = \"Dashboard\"\ncomponent = \"dup\"\n")
        .unwrap();
    let catalog = CatalogConfig {
        path: Some(file.path().to_path_buf()),
        ..CatalogConfig::default()
    };
    let (app, state) = app(catalog);

    let (status, body) = send(app, request(Method::POST, "/admin/reload", None)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].as_str().unwrap().contains("Dashboard"));
    assert_eq!(state.session.router().generation(), 0);
    assert_eq!(state.session.router().resolve("/form/index").name(), Some("Form"));
}

#[tokio::test]
async fn test_routes_dump() {
    let (app, _) = app(CatalogConfig::default());
    let (status, body) = get(app, "/admin/routes").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.to_string().contains("/nested"));
}
