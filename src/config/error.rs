//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid socket address: {0}")]
    InvalidAddress(String),

    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid request timeout")]
    InvalidTimeout,

    #[error("Invalid collaborator timeout")]
    InvalidCollaboratorTimeout,

    #[error("Collaborator base URL must start with http:// or https://")]
    InvalidCollaboratorUrl,

    #[error("Collaborator timeout must be shorter than the request timeout")]
    CollaboratorTimeoutTooLong,

    #[error("Idle session timeout exceeds 7 days")]
    InvalidIdleTimeout,

    #[error("Session sweep interval must be at least 1 second")]
    InvalidSweepInterval,

    #[error("Invalid download prefix: {0}")]
    InvalidDownloadPrefix(&'static str),
}
