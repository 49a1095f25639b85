//! Request and response DTOs for the dialogue endpoints.

use serde::{Deserialize, Serialize};

use crate::application::{SessionView, StartedDialog, TurnReport};
use crate::domain::dialog::{
    DialogError, DialogInput, DialogPhase, Directive, ReviewEntry, SessionStatus,
};
use crate::domain::foundation::Timestamp;
use crate::ports::FinalizedForm;

// ════════════════════════════════════════════════════════════════════════════
// Requests
// ════════════════════════════════════════════════════════════════════════════

/// Request to open a session.
#[derive(Debug, Clone, Deserialize)]
pub struct StartSessionRequest {
    pub fields: Vec<String>,
}

/// Button-equivalent actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputAction {
    Confirm,
    Decline,
}

/// One user turn: either typed/spoken `text` or a structured `action`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InputRequest {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub action: Option<InputAction>,
}

impl InputRequest {
    /// Exactly one of `text` and `action` must be present.
    pub fn into_input(self) -> Result<DialogInput, String> {
        match (self.text, self.action) {
            (Some(text), None) => Ok(DialogInput::Text(text)),
            (None, Some(InputAction::Confirm)) => Ok(DialogInput::Confirm),
            (None, Some(InputAction::Decline)) => Ok(DialogInput::Decline),
            (None, None) => Err("Provide either \"text\" or \"action\"".to_string()),
            (Some(_), Some(_)) => Err("Provide only one of \"text\" and \"action\"".to_string()),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Responses
// ════════════════════════════════════════════════════════════════════════════

/// A directive plus the text a voice host would speak.
#[derive(Debug, Clone, Serialize)]
pub struct DirectiveResponse {
    #[serde(flatten)]
    pub directive: Directive,
    pub speech: String,
}

impl From<Directive> for DirectiveResponse {
    fn from(directive: Directive) -> Self {
        let speech = directive.speech();
        Self { directive, speech }
    }
}

fn directives(list: Vec<Directive>) -> Vec<DirectiveResponse> {
    list.into_iter().map(DirectiveResponse::from).collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct StartSessionResponse {
    pub session_id: String,
    pub fields: Vec<String>,
    pub directives: Vec<DirectiveResponse>,
}

impl From<StartedDialog> for StartSessionResponse {
    fn from(started: StartedDialog) -> Self {
        Self {
            session_id: started.session_id.to_string(),
            fields: started.fields,
            directives: directives(started.directives),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TurnResponse {
    pub session_id: String,
    pub phase: DialogPhase,
    pub status: SessionStatus,
    pub directives: Vec<DirectiveResponse>,
}

impl From<TurnReport> for TurnResponse {
    fn from(report: TurnReport) -> Self {
        Self {
            session_id: report.session_id.to_string(),
            phase: report.phase,
            status: report.status,
            directives: directives(report.directives),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionResponse {
    pub session_id: String,
    pub phase: DialogPhase,
    pub status: SessionStatus,
    pub fields: Vec<String>,
    pub current_index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pending_edit_field: Option<String>,
    pub confirmed: bool,
    pub entries: Vec<ReviewEntry>,
    pub prompt: Vec<DirectiveResponse>,
    pub started_at: Timestamp,
    pub last_turn_at: Timestamp,
}

impl From<SessionView> for SessionResponse {
    fn from(view: SessionView) -> Self {
        Self {
            session_id: view.session_id.to_string(),
            phase: view.phase,
            status: view.status,
            fields: view.fields,
            current_index: view.current_index,
            pending_edit_field: view.pending_edit_field,
            confirmed: view.confirmed,
            entries: view.entries,
            prompt: directives(view.prompt),
            started_at: view.started_at,
            last_turn_at: view.last_turn_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FinalizeResponse {
    pub document_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pdf_url: Option<String>,
    pub message: String,
}

impl From<FinalizedForm> for FinalizeResponse {
    fn from(form: FinalizedForm) -> Self {
        Self {
            document_url: form.document_url,
            pdf_url: form.pdf_url,
            message: "Form finalized and ready for download.".to_string(),
        }
    }
}

/// Standard error body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            code: "BAD_REQUEST".to_string(),
            message: message.into(),
        }
    }

    pub fn not_found(resource_type: &str, id: &str) -> Self {
        Self {
            code: "NOT_FOUND".to_string(),
            message: format!("{} not found: {}", resource_type, id),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            code: "INTERNAL_ERROR".to_string(),
            message: message.into(),
        }
    }
}

impl From<&DialogError> for ErrorResponse {
    fn from(error: &DialogError) -> Self {
        Self {
            code: error.code().to_string(),
            message: error.user_message(),
        }
    }
}
