//! HTTP Form Collaborator - FormCollaborator backed by a remote form service.
//!
//! Speaks the form service's JSON protocol: every call is a `POST` with a
//! JSON body, and every reply carries `success` plus either the payload or an
//! `error` message. `success: false` is a verdict (rejected answer, refused
//! request); only transport problems and non-2xx statuses are failures.
//!
//! # Configuration
//!
//! ```ignore
//! let config = HttpCollaboratorConfig::new("http://localhost:5000")
//!     .with_api_token("secret")
//!     .with_timeout(Duration::from_secs(10));
//!
//! let collaborator = HttpFormCollaborator::new(config)?;
//! ```

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

use crate::domain::dialog::FieldList;
use crate::domain::foundation::SessionId;
use crate::ports::{
    AnswerOutcome, CollaboratorError, FieldValidation, FinalizedForm, FormCollaborator, NextStep,
    SessionSnapshot, StartedSession,
};

/// Configuration for the HTTP collaborator.
#[derive(Debug)]
pub struct HttpCollaboratorConfig {
    /// Base URL of the form service, without trailing slash.
    pub base_url: String,
    api_token: Option<Secret<String>>,
    pub timeout: Duration,
}

impl HttpCollaboratorConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_token: None,
            timeout: Duration::from_secs(15),
        }
    }

    /// Sends `Authorization: Bearer <token>` with every request.
    pub fn with_api_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(Secret::new(token.into()));
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Remote form service client.
pub struct HttpFormCollaborator {
    config: HttpCollaboratorConfig,
    client: Client,
}

impl HttpFormCollaborator {
    /// # Errors
    ///
    /// - `Transport` if the HTTP client cannot be built
    pub fn new(config: HttpCollaboratorConfig) -> Result<Self, CollaboratorError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| CollaboratorError::Transport(format!("HTTP client: {}", e)))?;
        Ok(Self { config, client })
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.config.base_url, endpoint)
    }

    async fn post<B, R>(&self, endpoint: &str, body: &B) -> Result<R, CollaboratorError>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        let mut request = self.client.post(self.url(endpoint)).json(body);
        if let Some(token) = &self.config.api_token {
            request = request.bearer_auth(token.expose_secret());
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                CollaboratorError::Transport(format!(
                    "{} timed out after {}s",
                    endpoint,
                    self.config.timeout.as_secs()
                ))
            } else if e.is_connect() {
                CollaboratorError::Transport(format!("Connection failed: {}", e))
            } else {
                CollaboratorError::Transport(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CollaboratorError::Transport(format!(
                "{} returned {}: {}",
                endpoint,
                status,
                body.chars().take(200).collect::<String>()
            )));
        }

        let reply = response.json::<R>().await.map_err(|e| {
            CollaboratorError::Transport(format!("{} sent an unreadable reply: {}", endpoint, e))
        })?;
        debug!(endpoint, "Form service replied");
        Ok(reply)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Wire types
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct StartRequest<'a> {
    fields: &'a [String],
}

#[derive(Debug, Serialize)]
struct SessionRequest<'a> {
    session_id: &'a str,
}

#[derive(Debug, Serialize)]
struct AnswerRequest<'a> {
    session_id: &'a str,
    answer: &'a str,
}

#[derive(Debug, Serialize)]
struct FieldRequest<'a> {
    session_id: &'a str,
    field_name: &'a str,
    value: &'a str,
}

#[derive(Debug, Deserialize)]
struct StartReply {
    success: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    session_id: Option<String>,
    #[serde(default)]
    fields: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct AnswerReply {
    success: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    next_field: Option<String>,
    #[serde(default)]
    next_index: Option<usize>,
    #[serde(default)]
    completed: bool,
    #[serde(default)]
    validated_value: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct StateReply {
    success: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    responses: HashMap<String, Value>,
    #[serde(default)]
    index: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct FieldReply {
    success: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    completed: bool,
    #[serde(default)]
    field: Option<String>,
    #[serde(default)]
    validated_value: Option<Value>,
    #[serde(default)]
    responses: HashMap<String, Value>,
}

#[derive(Debug, Deserialize)]
struct FinalizeReply {
    success: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    docx_url: Option<String>,
    #[serde(default)]
    pdf_url: Option<String>,
}

/// Values arrive as strings, or as numbers for ages.
fn wire_text(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text),
        other => Some(other.to_string()),
    }
}

fn wire_map(values: HashMap<String, Value>) -> HashMap<String, String> {
    values
        .into_iter()
        .filter_map(|(field, value)| wire_text(value).map(|text| (field, text)))
        .collect()
}

fn refused(error: Option<String>) -> String {
    error.unwrap_or_else(|| "request refused".to_string())
}

#[async_trait]
impl FormCollaborator for HttpFormCollaborator {
    async fn start_session(&self, fields: &FieldList) -> Result<StartedSession, CollaboratorError> {
        let reply: StartReply = self
            .post(
                "start_session",
                &StartRequest {
                    fields: fields.as_slice(),
                },
            )
            .await?;

        if !reply.success {
            return Err(CollaboratorError::Refused(refused(reply.error)));
        }
        let session_id = reply
            .session_id
            .ok_or_else(|| CollaboratorError::Transport("start_session sent no session_id".into()))
            .and_then(|id| {
                SessionId::new(id).map_err(|e| CollaboratorError::Transport(e.to_string()))
            })?;

        Ok(StartedSession {
            session_id,
            fields: reply.fields.unwrap_or_else(|| fields.to_vec()),
        })
    }

    async fn submit_answer(
        &self,
        session_id: &SessionId,
        answer: &str,
    ) -> Result<AnswerOutcome, CollaboratorError> {
        let reply: AnswerReply = self
            .post(
                "process_input",
                &AnswerRequest {
                    session_id: session_id.as_str(),
                    answer,
                },
            )
            .await?;

        if !reply.success {
            return Ok(AnswerOutcome::Rejected {
                message: refused(reply.error),
            });
        }

        match reply.validated_value.and_then(wire_text) {
            Some(value) => {
                let next = match (reply.completed, reply.next_field, reply.next_index) {
                    (false, Some(name), Some(index)) => NextStep::Field { name, index },
                    _ => NextStep::Completed,
                };
                Ok(AnswerOutcome::Accepted {
                    value,
                    next,
                    message: reply.message,
                })
            }
            // Completed without a value is how the service reports a stop.
            None if reply.completed => Ok(AnswerOutcome::Aborted {
                message: reply.message.unwrap_or_else(|| "Session ended".to_string()),
            }),
            None => Ok(AnswerOutcome::Repeat {
                message: reply.message,
            }),
        }
    }

    async fn get_session_state(
        &self,
        session_id: &SessionId,
    ) -> Result<SessionSnapshot, CollaboratorError> {
        let reply: StateReply = self
            .post(
                "get_session_state",
                &SessionRequest {
                    session_id: session_id.as_str(),
                },
            )
            .await?;

        if !reply.success {
            return Err(CollaboratorError::Refused(refused(reply.error)));
        }
        Ok(SessionSnapshot {
            responses: wire_map(reply.responses),
            next_index: reply.index,
        })
    }

    async fn validate_field(
        &self,
        session_id: &SessionId,
        field: &str,
        value: &str,
    ) -> Result<FieldValidation, CollaboratorError> {
        let reply: FieldReply = self
            .post(
                "validate_field",
                &FieldRequest {
                    session_id: session_id.as_str(),
                    field_name: field,
                    value,
                },
            )
            .await?;

        if !reply.success {
            return Ok(FieldValidation::Rejected {
                message: refused(reply.error),
            });
        }

        match (reply.field, reply.validated_value.and_then(wire_text)) {
            (Some(field), Some(value)) => Ok(FieldValidation::Accepted {
                field,
                value,
                responses: wire_map(reply.responses),
            }),
            _ if reply.completed => Ok(FieldValidation::Aborted {
                message: reply.message.unwrap_or_else(|| "Session ended".to_string()),
            }),
            _ => Err(CollaboratorError::Transport(
                "validate_field reply had neither a value nor an error".to_string(),
            )),
        }
    }

    async fn finalize(&self, session_id: &SessionId) -> Result<FinalizedForm, CollaboratorError> {
        let reply: FinalizeReply = self
            .post(
                "finalize_form",
                &SessionRequest {
                    session_id: session_id.as_str(),
                },
            )
            .await?;

        if !reply.success {
            return Err(CollaboratorError::Refused(refused(reply.error)));
        }
        let document_url = reply
            .docx_url
            .filter(|url| !url.is_empty())
            .ok_or_else(|| CollaboratorError::Transport("finalize_form sent no document".into()))?;

        Ok(FinalizedForm {
            document_url,
            pdf_url: reply.pdf_url.filter(|url| !url.is_empty()),
        })
    }
}
