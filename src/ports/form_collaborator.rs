//! Form collaborator port.
//!
//! The collaborator owns everything the dialogue core deliberately does not:
//! value validation, the authoritative copy of the answers, and producing the
//! filled document. The core only reacts to its verdicts.
//!
//! # Design
//!
//! - **Validator, not store**: every answer and correction is accepted or
//!   rejected here before the session records it
//! - **Authoritative snapshot**: `get_session_state` is the source of truth for
//!   what the review shows
//! - **Uncertain failures**: a `Transport` error says nothing about whether
//!   the request was applied; callers reconcile through `get_session_state`

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::dialog::FieldList;
use crate::domain::foundation::SessionId;

/// Port for the external validator and form finalizer.
#[async_trait]
pub trait FormCollaborator: Send + Sync {
    /// Opens a collaborator-side session for `fields`.
    ///
    /// # Errors
    ///
    /// - `Refused` if the collaborator rejects the field list
    /// - `Transport` if it cannot be reached
    async fn start_session(&self, fields: &FieldList) -> Result<StartedSession, CollaboratorError>;

    /// Validates a raw answer for the session's current field.
    async fn submit_answer(
        &self,
        session_id: &SessionId,
        answer: &str,
    ) -> Result<AnswerOutcome, CollaboratorError>;

    /// Returns the collaborator's copy of the accepted answers.
    async fn get_session_state(
        &self,
        session_id: &SessionId,
    ) -> Result<SessionSnapshot, CollaboratorError>;

    /// Validates a corrected value for a named field.
    async fn validate_field(
        &self,
        session_id: &SessionId,
        field: &str,
        value: &str,
    ) -> Result<FieldValidation, CollaboratorError>;

    /// Produces the filled form. Called only after the review was confirmed.
    async fn finalize(&self, session_id: &SessionId) -> Result<FinalizedForm, CollaboratorError>;

    /// Drops the collaborator-side state of an abandoned session.
    ///
    /// Collaborators that expire sessions on their own keep this default.
    async fn release_session(&self, _session_id: &SessionId) -> Result<(), CollaboratorError> {
        Ok(())
    }
}

/// A collaborator-side session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartedSession {
    pub session_id: SessionId,
    pub fields: Vec<String>,
}

/// The field the collaborator expects next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextStep {
    Field { name: String, index: usize },
    Completed,
}

/// Verdict on a collected answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerOutcome {
    /// Stored under its canonical form; `value` may be empty for a skipped field.
    Accepted {
        value: String,
        next: NextStep,
        message: Option<String>,
    },
    /// The user asked to hear the question again.
    Repeat { message: Option<String> },
    Rejected { message: String },
    /// The user ended the dialogue.
    Aborted { message: String },
}

/// Verdict on a correction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValidation {
    Accepted {
        field: String,
        value: String,
        /// Full answer set after the correction.
        responses: HashMap<String, String>,
    },
    Rejected { message: String },
    Aborted { message: String },
}

/// The collaborator's answers for a session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub responses: HashMap<String, String>,
    /// Index of the next field the collaborator expects, when it reports one.
    pub next_index: Option<usize>,
}

/// Where the filled form can be fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalizedForm {
    pub document_url: String,
    pub pdf_url: Option<String>,
}

/// Failures talking to the collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CollaboratorError {
    /// Unreachable, timed out, or answered with something unusable.
    #[error("collaborator unavailable: {0}")]
    Transport(String),

    /// Reachable, but refused the request outright.
    #[error("collaborator refused request: {0}")]
    Refused(String),
}
