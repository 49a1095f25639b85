//! What the host should present next.

use serde::{Deserialize, Serialize};

use super::{DialogError, ReviewEntry};
use crate::domain::foundation::ErrorCode;

/// Instruction to the host UI.
///
/// A turn yields one or more directives, rendered in order. Hosts that speak
/// aloud can use [`Directive::speech`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Directive {
    /// Ask for the field at `index` (0-based) of `total`.
    PromptField {
        field: String,
        index: usize,
        total: usize,
    },
    ShowReview {
        entries: Vec<ReviewEntry>,
    },
    AskConfirm,
    AskFieldName {
        valid_names: Vec<String>,
    },
    AskNewValue {
        field: String,
    },
    Error {
        kind: ErrorCode,
        message: String,
    },
    /// Informational message from the collaborator.
    Notice {
        message: String,
    },
    /// The review was confirmed; the host may finalize.
    ReadyToSubmit,
    SessionClosed {
        message: String,
    },
}

impl Directive {
    pub fn error(err: &DialogError) -> Self {
        Directive::Error {
            kind: err.code(),
            message: err.user_message(),
        }
    }

    pub fn notice(message: impl Into<String>) -> Self {
        Directive::Notice {
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Directive::Error { .. })
    }

    /// Text suitable for text-to-speech.
    pub fn speech(&self) -> String {
        match self {
            Directive::PromptField { field, .. } => format!("Please enter {}.", field),
            Directive::ShowReview { entries } => entries
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(". "),
            Directive::AskConfirm => "Are these details correct? Say yes or no.".to_string(),
            Directive::AskFieldName { .. } => {
                "Which field is incorrect? Type the field name.".to_string()
            }
            Directive::AskNewValue { field } => format!("Enter new value for {}", field),
            Directive::Error { message, .. }
            | Directive::Notice { message }
            | Directive::SessionClosed { message } => message.clone(),
            Directive::ReadyToSubmit => "Great. You can submit the form now.".to_string(),
        }
    }
}
