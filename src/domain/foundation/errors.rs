//! Error types for the domain layer.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors that occur during value object construction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Field '{field}' cannot be empty")]
    EmptyField { field: String },

    #[error("Field '{field}' has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    /// Creates an empty field validation error.
    pub fn empty_field(field: impl Into<String>) -> Self {
        ValidationError::EmptyField { field: field.into() }
    }

    /// Creates an invalid format validation error.
    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Error codes organized by category.
///
/// Serialized in the same SCREAMING_SNAKE_CASE form as `Display`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Validation errors
    ValidationFailed,
    InvalidFieldList,
    ValidatorRejected,
    UnresolvedFieldName,
    UnexpectedInput,

    // Not found errors
    SessionNotFound,

    // State errors
    InvalidStateTransition,
    SessionClosed,
    TurnInFlight,
    NotConfirmed,

    // Infrastructure errors
    TransportFailure,
    InternalError,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::ValidationFailed => "VALIDATION_FAILED",
            ErrorCode::InvalidFieldList => "INVALID_FIELD_LIST",
            ErrorCode::ValidatorRejected => "VALIDATOR_REJECTED",
            ErrorCode::UnresolvedFieldName => "UNRESOLVED_FIELD_NAME",
            ErrorCode::UnexpectedInput => "UNEXPECTED_INPUT",
            ErrorCode::SessionNotFound => "SESSION_NOT_FOUND",
            ErrorCode::InvalidStateTransition => "INVALID_STATE_TRANSITION",
            ErrorCode::SessionClosed => "SESSION_CLOSED",
            ErrorCode::TurnInFlight => "TURN_IN_FLIGHT",
            ErrorCode::NotConfirmed => "NOT_CONFIRMED",
            ErrorCode::TransportFailure => "TRANSPORT_FAILURE",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        };
        write!(f, "{}", s)
    }
}
