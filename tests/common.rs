use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode};
use nodestatus_exporter::metrics::Metrics;
use nodestatus_exporter::routes::create_router;
use nodestatus_exporter::state::AppState;
use tower::ServiceExt;

pub const NODES_PATH: &str = "/api/grid/nodes";

pub fn build_app(metrics: Metrics) -> Router {
    create_router(AppState { metrics })
}

pub fn get(path: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(path)
        .body(Body::empty())
        .expect("failed to build request")
}

/// Sends one GET through the router and returns the status, content type and body.
pub async fn send(app: &Router, path: &str) -> (StatusCode, Option<String>, String) {
    let response = app
        .clone()
        .oneshot(get(path))
        .await
        .expect("request should complete");
    let status = response.status();
    let content_type = response
        .headers()
        .get("Content-Type")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should be readable");
    let body = String::from_utf8(body.to_vec()).expect("body should be UTF-8");
    (status, content_type, body)
}
