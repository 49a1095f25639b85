//! HTTP routes for dialogue endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{
    download_document, finalize_session, get_session, start_session, submit_input,
    DialogHandlers,
};

/// Creates the dialogue router with all endpoints.
pub fn dialog_routes(handlers: DialogHandlers) -> Router {
    let download_path = handlers.download_path();
    Router::new()
        .route("/sessions", post(start_session))
        .route("/sessions/:id", get(get_session))
        .route("/sessions/:id/input", post(submit_input))
        .route("/sessions/:id/finalize", post(finalize_session))
        .route(&download_path, get(download_document))
        .with_state(handlers)
}
