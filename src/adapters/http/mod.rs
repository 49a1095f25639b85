//! HTTP adapters - REST API for hosts driving a form dialogue.

pub mod dialog;

use axum::{routing::get, Json, Router};
use serde_json::{json, Value};

pub use dialog::{dialog_routes, DialogHandlers, ErrorResponse};

/// GET /health - Liveness check
async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Full API surface: dialogue routes plus the health check.
pub fn api_router(handlers: DialogHandlers) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(dialog_routes(handlers))
}
