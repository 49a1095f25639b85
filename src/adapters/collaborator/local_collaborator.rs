//! Local Form Collaborator - in-process implementation of FormCollaborator.
//!
//! Validates answers with [`FieldRules`], keeps the authoritative answers in
//! memory and writes the filled form with [`FormDocumentWriter`]. Used when no
//! remote form service is configured, and by the integration tests.
//!
//! # Example
//!
//! ```ignore
//! let writer = FormDocumentWriter::new("outputs", "/download");
//! let collaborator = LocalFormCollaborator::new(writer);
//! let controller = SessionController::new(Arc::new(collaborator));
//! ```

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use crate::adapters::document::FormDocumentWriter;
use crate::adapters::validation::{FieldRules, FieldVerdict, STOPPED_MESSAGE};
use crate::domain::dialog::{FieldList, ReviewEntry};
use crate::domain::foundation::SessionId;
use crate::ports::{
    AnswerOutcome, CollaboratorError, FieldValidation, FinalizedForm, FormCollaborator, NextStep,
    SessionSnapshot, StartedSession,
};

const INVALID_SESSION: &str = "Invalid session";

#[derive(Debug, Clone)]
struct LocalSession {
    fields: Vec<String>,
    index: usize,
    responses: HashMap<String, String>,
    reviewing: bool,
}

impl LocalSession {
    fn entries(&self) -> Vec<ReviewEntry> {
        self.fields
            .iter()
            .map(|field| ReviewEntry {
                field: field.clone(),
                value: self.responses.get(field).cloned(),
            })
            .collect()
    }
}

/// In-process form collaborator.
#[derive(Debug, Clone)]
pub struct LocalFormCollaborator {
    sessions: Arc<RwLock<HashMap<SessionId, LocalSession>>>,
    writer: FormDocumentWriter,
}

impl LocalFormCollaborator {
    pub fn new(writer: FormDocumentWriter) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            writer,
        }
    }

    /// Number of open collaborator-side sessions.
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

/// Case-insensitive exact lookup of a field name.
fn find_field<'a>(fields: &'a [String], name: &str) -> Option<&'a str> {
    let wanted = name.trim().to_lowercase();
    fields
        .iter()
        .find(|field| field.trim().to_lowercase() == wanted)
        .map(String::as_str)
}

#[async_trait]
impl FormCollaborator for LocalFormCollaborator {
    async fn start_session(&self, fields: &FieldList) -> Result<StartedSession, CollaboratorError> {
        let session_id = SessionId::generate();
        let session = LocalSession {
            fields: fields.to_vec(),
            index: 0,
            responses: HashMap::new(),
            reviewing: false,
        };

        self.sessions
            .write()
            .await
            .insert(session_id.clone(), session);
        debug!(session_id = %session_id, "Local form session opened");

        Ok(StartedSession {
            session_id,
            fields: fields.to_vec(),
        })
    }

    async fn submit_answer(
        &self,
        session_id: &SessionId,
        answer: &str,
    ) -> Result<AnswerOutcome, CollaboratorError> {
        let mut sessions = self.sessions.write().await;
        let session = sessions
            .get_mut(session_id)
            .ok_or_else(|| CollaboratorError::Refused(INVALID_SESSION.to_string()))?;

        let Some(field) = session.fields.get(session.index).cloned() else {
            return Err(CollaboratorError::Refused(
                "All initial filling complete. Use validate_field for corrections.".to_string(),
            ));
        };

        let value = match FieldRules::check(&field, answer) {
            FieldVerdict::Accepted(value) => value,
            FieldVerdict::Repeat => {
                return Ok(AnswerOutcome::Repeat {
                    message: Some("Repeating instructions.".to_string()),
                })
            }
            FieldVerdict::Invalid(message) => return Ok(AnswerOutcome::Rejected { message }),
            FieldVerdict::Abort => {
                sessions.remove(session_id);
                return Ok(AnswerOutcome::Aborted {
                    message: STOPPED_MESSAGE.to_string(),
                });
            }
        };

        session.responses.insert(field.clone(), value.clone());
        session.index += 1;

        let (next, message) = match session.fields.get(session.index) {
            Some(next_field) => (
                NextStep::Field {
                    name: next_field.clone(),
                    index: session.index,
                },
                format!("Recorded {}. Next: {}", field, next_field),
            ),
            None => {
                session.reviewing = true;
                (
                    NextStep::Completed,
                    "All fields filled. Please review and confirm the details.".to_string(),
                )
            }
        };

        Ok(AnswerOutcome::Accepted {
            value,
            next,
            message: Some(message),
        })
    }

    async fn get_session_state(
        &self,
        session_id: &SessionId,
    ) -> Result<SessionSnapshot, CollaboratorError> {
        let sessions = self.sessions.read().await;
        let session = sessions
            .get(session_id)
            .ok_or_else(|| CollaboratorError::Refused(INVALID_SESSION.to_string()))?;
        Ok(SessionSnapshot {
            responses: session.responses.clone(),
            next_index: Some(session.index),
        })
    }

    async fn validate_field(
        &self,
        session_id: &SessionId,
        field: &str,
        value: &str,
    ) -> Result<FieldValidation, CollaboratorError> {
        let mut sessions = self.sessions.write().await;
        let session = sessions
            .get_mut(session_id)
            .ok_or_else(|| CollaboratorError::Refused(INVALID_SESSION.to_string()))?;

        let Some(exact) = find_field(&session.fields, field).map(str::to_string) else {
            return Ok(FieldValidation::Rejected {
                message: format!(
                    "Field '{}' not found. Choose one of: {}",
                    field,
                    session.fields.join(", ")
                ),
            });
        };

        match FieldRules::check(&exact, value) {
            FieldVerdict::Accepted(value) => {
                session.responses.insert(exact.clone(), value.clone());
                session.reviewing = true;
                Ok(FieldValidation::Accepted {
                    field: exact,
                    value,
                    responses: session.responses.clone(),
                })
            }
            FieldVerdict::Repeat => Ok(FieldValidation::Rejected {
                message: "Repeat is not allowed during correction.".to_string(),
            }),
            FieldVerdict::Invalid(message) => Ok(FieldValidation::Rejected { message }),
            FieldVerdict::Abort => {
                sessions.remove(session_id);
                Ok(FieldValidation::Aborted {
                    message: STOPPED_MESSAGE.to_string(),
                })
            }
        }
    }

    async fn finalize(&self, session_id: &SessionId) -> Result<FinalizedForm, CollaboratorError> {
        let entries = {
            let sessions = self.sessions.read().await;
            let session = sessions
                .get(session_id)
                .ok_or_else(|| CollaboratorError::Refused(INVALID_SESSION.to_string()))?;
            if !session.reviewing {
                return Err(CollaboratorError::Refused(
                    "Cannot finalize: form is not yet complete or reviewed.".to_string(),
                ));
            }
            session.entries()
        };

        let written = self
            .writer
            .write(session_id, &entries)
            .await
            .map_err(|e| CollaboratorError::Transport(e.to_string()))?;

        self.sessions.write().await.remove(session_id);
        debug!(session_id = %session_id, path = %written.path.display(), "Form document written");

        Ok(FinalizedForm {
            document_url: written.url,
            pdf_url: None,
        })
    }

    async fn release_session(&self, session_id: &SessionId) -> Result<(), CollaboratorError> {
        if self.sessions.write().await.remove(session_id).is_some() {
            debug!(session_id = %session_id, "Local form session released");
        }
        Ok(())
    }
}
