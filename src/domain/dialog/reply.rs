//! User input as seen by the dialogue.

use serde::{Deserialize, Serialize};

/// One user turn.
///
/// Hosts with buttons send the structured `Confirm`/`Decline` actions; typed
/// or spoken input arrives as `Text`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "text", rename_all = "snake_case")]
pub enum DialogInput {
    Text(String),
    Confirm,
    Decline,
}

impl DialogInput {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Short description for logs; never includes the user's text.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Confirm => "confirm",
            Self::Decline => "decline",
        }
    }
}

const AFFIRMATIVE: &[&str] = &["yes", "y", "correct", "ok", "okay", "submit"];
const NEGATIVE: &[&str] = &["no", "n", "change", "edit", "wrong", "incorrect"];

/// Answer to "are these details correct?".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmationReply {
    Affirm,
    Decline,
}

impl ConfirmationReply {
    /// Interprets free text against the confirmation vocabulary.
    ///
    /// Whole-word match only, case-insensitive after trimming.
    pub fn parse(text: &str) -> Option<Self> {
        let token = text.trim().to_lowercase();
        if AFFIRMATIVE.contains(&token.as_str()) {
            Some(Self::Affirm)
        } else if NEGATIVE.contains(&token.as_str()) {
            Some(Self::Decline)
        } else {
            None
        }
    }

    /// Maps any input, structured or typed, to a reply.
    pub fn from_input(input: &DialogInput) -> Option<Self> {
        match input {
            DialogInput::Confirm => Some(Self::Affirm),
            DialogInput::Decline => Some(Self::Decline),
            DialogInput::Text(text) => Self::parse(text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_affirmative_token_affirms() {
        for token in ["yes", "y", "correct", "ok", "okay", "submit"] {
            assert_eq!(ConfirmationReply::parse(token), Some(ConfirmationReply::Affirm), "{token}");
        }
    }

    #[test]
    fn every_negative_token_declines() {
        for token in ["no", "n", "change", "edit", "wrong", "incorrect"] {
            assert_eq!(ConfirmationReply::parse(token), Some(ConfirmationReply::Decline), "{token}");
        }
    }

    #[test]
    fn matching_ignores_case_and_padding() {
        assert_eq!(ConfirmationReply::parse("  YES "), Some(ConfirmationReply::Affirm));
        assert_eq!(ConfirmationReply::parse("\tWrong\n"), Some(ConfirmationReply::Decline));
    }

    #[test]
    fn other_text_is_not_a_reply() {
        for token in ["", "maybe", "yes please", "nope", "age"] {
            assert_eq!(ConfirmationReply::parse(token), None, "{token}");
        }
    }

    #[test]
    fn structured_actions_map_directly() {
        assert_eq!(
            ConfirmationReply::from_input(&DialogInput::Confirm),
            Some(ConfirmationReply::Affirm)
        );
        assert_eq!(
            ConfirmationReply::from_input(&DialogInput::Decline),
            Some(ConfirmationReply::Decline)
        );
        assert_eq!(
            ConfirmationReply::from_input(&DialogInput::text("ok")),
            Some(ConfirmationReply::Affirm)
        );
    }

    #[test]
    fn input_serializes_with_kind_tag() {
        let json = serde_json::to_value(DialogInput::text("Alice")).unwrap();
        assert_eq!(json["kind"], "text");
        assert_eq!(json["text"], "Alice");

        let json = serde_json::to_value(DialogInput::Confirm).unwrap();
        assert_eq!(json["kind"], "confirm");
    }
}
