//! Dialogue error types.

use crate::domain::foundation::{ErrorCode, SessionId, ValidationError};

/// Generic retry text shown to users when the collaborator is unreachable.
pub const TRANSPORT_RETRY_MESSAGE: &str =
    "Could not reach the form service. Please try again.";

/// Errors raised while starting or driving a form dialogue.
///
/// Only `InvalidFieldList` is fatal, and only to starting a session. Every
/// other kind leaves the session resumable from its current phase.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DialogError {
    #[error("Invalid field list: {0}")]
    InvalidFieldList(String),

    #[error("Field \"{input}\" not found")]
    UnresolvedFieldName {
        input: String,
        valid_names: Vec<String>,
    },

    #[error("{0}")]
    ValidatorRejected(String),

    #[error("Transport failure: {0}")]
    TransportFailure(String),

    #[error("{0}")]
    UnexpectedInput(String),

    #[error("Session is closed: {0}")]
    SessionClosed(String),

    #[error("Session not found: {0}")]
    SessionNotFound(SessionId),

    #[error("A previous input for session {0} is still being processed")]
    TurnInFlight(SessionId),

    #[error("The form cannot be submitted before the review is confirmed")]
    NotConfirmed,

    #[error("Invalid state: {0}")]
    InvalidTransition(String),

    #[error("Session storage error: {0}")]
    Storage(String),
}

impl DialogError {
    pub fn invalid_field_list(reason: impl Into<String>) -> Self {
        DialogError::InvalidFieldList(reason.into())
    }

    pub fn transport(detail: impl Into<String>) -> Self {
        DialogError::TransportFailure(detail.into())
    }

    pub fn unexpected_input(message: impl Into<String>) -> Self {
        DialogError::UnexpectedInput(message.into())
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            DialogError::InvalidFieldList(_) => ErrorCode::InvalidFieldList,
            DialogError::UnresolvedFieldName { .. } => ErrorCode::UnresolvedFieldName,
            DialogError::ValidatorRejected(_) => ErrorCode::ValidatorRejected,
            DialogError::TransportFailure(_) => ErrorCode::TransportFailure,
            DialogError::UnexpectedInput(_) => ErrorCode::UnexpectedInput,
            DialogError::SessionClosed(_) => ErrorCode::SessionClosed,
            DialogError::SessionNotFound(_) => ErrorCode::SessionNotFound,
            DialogError::TurnInFlight(_) => ErrorCode::TurnInFlight,
            DialogError::NotConfirmed => ErrorCode::NotConfirmed,
            DialogError::InvalidTransition(_) => ErrorCode::InvalidStateTransition,
            DialogError::Storage(_) => ErrorCode::InternalError,
        }
    }

    /// Text meant for the person in the dialogue.
    ///
    /// Transport details stay in logs; the user only sees the retry hint.
    pub fn user_message(&self) -> String {
        match self {
            DialogError::UnresolvedFieldName { input, valid_names } => format!(
                "Field \"{}\" not found. Please type one of: {}",
                input,
                valid_names.join(", ")
            ),
            DialogError::ValidatorRejected(msg) => format!("Validation error: {}", msg),
            DialogError::TransportFailure(_) => TRANSPORT_RETRY_MESSAGE.to_string(),
            DialogError::UnexpectedInput(msg) | DialogError::SessionClosed(msg) => msg.clone(),
            other => other.to_string(),
        }
    }

    /// True for errors after which the session can keep going.
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            DialogError::InvalidFieldList(_)
                | DialogError::SessionClosed(_)
                | DialogError::SessionNotFound(_)
        )
    }
}

impl From<ValidationError> for DialogError {
    fn from(err: ValidationError) -> Self {
        DialogError::InvalidTransition(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unresolved_field_lists_valid_names() {
        let err = DialogError::UnresolvedFieldName {
            input: "xyz".to_string(),
            valid_names: vec!["Name".to_string(), "Age".to_string()],
        };
        assert_eq!(err.code(), ErrorCode::UnresolvedFieldName);
        assert_eq!(
            err.user_message(),
            "Field \"xyz\" not found. Please type one of: Name, Age"
        );
    }

    #[test]
    fn transport_failure_hides_detail_from_user() {
        let err = DialogError::transport("connection refused (os error 111)");
        assert!(err.to_string().contains("connection refused"));
        assert_eq!(err.user_message(), TRANSPORT_RETRY_MESSAGE);
        assert!(err.is_recoverable());
    }

    #[test]
    fn validator_rejection_surfaces_message() {
        let err = DialogError::ValidatorRejected("Enter valid age 1-150".to_string());
        assert_eq!(err.user_message(), "Validation error: Enter valid age 1-150");
        assert_eq!(err.code(), ErrorCode::ValidatorRejected);
    }

    #[test]
    fn invalid_field_list_is_not_recoverable() {
        assert!(!DialogError::invalid_field_list("empty").is_recoverable());
    }

    #[test]
    fn state_machine_errors_become_invalid_transitions() {
        let err: DialogError =
            ValidationError::invalid_format("state_transition", "Cannot transition").into();
        assert_eq!(err.code(), ErrorCode::InvalidStateTransition);
    }
}
