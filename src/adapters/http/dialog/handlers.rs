//! HTTP handlers for dialogue endpoints.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use tracing::error;

use crate::adapters::document::{DocumentError, FormDocumentWriter};
use crate::application::DialogService;
use crate::domain::dialog::DialogError;
use crate::domain::foundation::SessionId;

use super::dto::{
    ErrorResponse, FinalizeResponse, InputRequest, SessionResponse, StartSessionRequest,
    StartSessionResponse, TurnResponse,
};

// ════════════════════════════════════════════════════════════════════════════
// Handler state
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone)]
pub struct DialogHandlers {
    service: Arc<DialogService>,
    documents: Arc<FormDocumentWriter>,
}

impl DialogHandlers {
    pub fn new(service: Arc<DialogService>, documents: Arc<FormDocumentWriter>) -> Self {
        Self { service, documents }
    }

    pub(super) fn download_path(&self) -> String {
        format!("{}/:filename", self.documents.download_prefix())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HTTP handlers
// ════════════════════════════════════════════════════════════════════════════

/// POST /sessions - Open a session for a field list
pub async fn start_session(
    State(handlers): State<DialogHandlers>,
    Json(req): Json<StartSessionRequest>,
) -> Response {
    match handlers.service.start(req.fields).await {
        Ok(started) => {
            let response: StartSessionResponse = started.into();
            (StatusCode::CREATED, Json(response)).into_response()
        }
        Err(e) => handle_dialog_error(e),
    }
}

/// GET /sessions/:id - Current phase, answers and prompt
pub async fn get_session(
    State(handlers): State<DialogHandlers>,
    Path(session_id): Path<String>,
) -> Response {
    let session_id = match parse_session_id(&session_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match handlers.service.snapshot(&session_id).await {
        Ok(view) => {
            let response: SessionResponse = view.into();
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => handle_dialog_error(e),
    }
}

/// POST /sessions/:id/input - Submit one user turn
pub async fn submit_input(
    State(handlers): State<DialogHandlers>,
    Path(session_id): Path<String>,
    Json(req): Json<InputRequest>,
) -> Response {
    let session_id = match parse_session_id(&session_id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let input = match req.into_input() {
        Ok(input) => input,
        Err(message) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::bad_request(message)),
            )
                .into_response()
        }
    };

    match handlers.service.handle_input(&session_id, input).await {
        Ok(report) => {
            let response: TurnResponse = report.into();
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => handle_dialog_error(e),
    }
}

/// POST /sessions/:id/finalize - Submit the confirmed form
pub async fn finalize_session(
    State(handlers): State<DialogHandlers>,
    Path(session_id): Path<String>,
) -> Response {
    let session_id = match parse_session_id(&session_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match handlers.service.finalize(&session_id).await {
        Ok(form) => {
            let response: FinalizeResponse = form.into();
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => handle_dialog_error(e),
    }
}

/// GET {download_prefix}/:filename - Serve a finalized document
pub async fn download_document(
    State(handlers): State<DialogHandlers>,
    Path(filename): Path<String>,
) -> Response {
    match handlers.documents.read(&filename).await {
        Ok(bytes) => (
            StatusCode::OK,
            [
                (
                    header::CONTENT_TYPE,
                    FormDocumentWriter::content_type(&filename).to_string(),
                ),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", filename),
                ),
            ],
            bytes,
        )
            .into_response(),
        Err(DocumentError::InvalidName(_)) => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::bad_request("Invalid file name")),
        )
            .into_response(),
        Err(DocumentError::NotFound(name)) => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::not_found("File", &name)),
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Failed to read document");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::internal("Could not read file")),
            )
                .into_response()
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Error handling
// ════════════════════════════════════════════════════════════════════════════

fn parse_session_id(raw: &str) -> Result<SessionId, Response> {
    raw.parse::<SessionId>().map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::bad_request("Invalid session ID")),
        )
            .into_response()
    })
}

fn status_for(error: &DialogError) -> StatusCode {
    match error {
        DialogError::InvalidFieldList(_)
        | DialogError::UnresolvedFieldName { .. }
        | DialogError::ValidatorRejected(_)
        | DialogError::UnexpectedInput(_) => StatusCode::BAD_REQUEST,
        DialogError::SessionNotFound(_) => StatusCode::NOT_FOUND,
        DialogError::TurnInFlight(_)
        | DialogError::NotConfirmed
        | DialogError::SessionClosed(_)
        | DialogError::InvalidTransition(_) => StatusCode::CONFLICT,
        DialogError::TransportFailure(_) => StatusCode::BAD_GATEWAY,
        DialogError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn handle_dialog_error(error: DialogError) -> Response {
    let status = status_for(&error);
    if status.is_server_error() {
        error!(error = %error, "Dialogue request failed");
    }
    (status, Json(ErrorResponse::from(&error))).into_response()
}
