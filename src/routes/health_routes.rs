//! Health check endpoints.

use crate::state::AppState;
use axum::{
    Router,
    body::Body,
    response::{IntoResponse, Response},
    routing::get,
};

/// Registers health check routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}

/// Returns 200 OK while the server is up, whether or not the poller is still running.
async fn health_check() -> impl IntoResponse {
    Response::new(Body::from("OK"))
}
