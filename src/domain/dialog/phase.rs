//! Dialogue phase state machine.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::StateMachine;

/// Where a form dialogue currently stands.
///
/// - `Collecting`: prompting fields in order
/// - `ReviewConfirm`: all fields asked, waiting for yes/no on the review
/// - `ReviewAwaitField`: user declined, waiting for the name of the field to fix
/// - `ReviewAwaitValue`: waiting for the corrected value of the pending field
///
/// There is no terminal phase; submitting is the host's move once the review
/// is confirmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DialogPhase {
    #[default]
    Collecting,
    ReviewConfirm,
    ReviewAwaitField,
    ReviewAwaitValue,
}

impl DialogPhase {
    /// Upper-case label used in logs and the HTTP API.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Collecting => "COLLECTING",
            Self::ReviewConfirm => "REVIEW_CONFIRM",
            Self::ReviewAwaitField => "REVIEW_AWAIT_FIELD",
            Self::ReviewAwaitValue => "REVIEW_AWAIT_VALUE",
        }
    }

    pub fn is_review(&self) -> bool {
        !matches!(self, Self::Collecting)
    }
}

impl std::fmt::Display for DialogPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl StateMachine for DialogPhase {
    fn can_transition_to(&self, target: &Self) -> bool {
        use DialogPhase::*;
        matches!(
            (self, target),
            // Next field, or list exhausted
            (Collecting, Collecting) |
            (Collecting, ReviewConfirm) |
            // User declined the review
            (ReviewConfirm, ReviewAwaitField) |
            // Field name resolved
            (ReviewAwaitField, ReviewAwaitValue) |
            // Corrected value accepted
            (ReviewAwaitValue, ReviewConfirm)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use DialogPhase::*;
        match self {
            Collecting => vec![Collecting, ReviewConfirm],
            ReviewConfirm => vec![ReviewAwaitField],
            ReviewAwaitField => vec![ReviewAwaitValue],
            ReviewAwaitValue => vec![ReviewConfirm],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod definition {
        use super::*;

        #[test]
        fn default_phase_is_collecting() {
            assert_eq!(DialogPhase::default(), DialogPhase::Collecting);
        }

        #[test]
        fn serializes_to_snake_case() {
            let json = serde_json::to_string(&DialogPhase::ReviewAwaitField).unwrap();
            assert_eq!(json, "\"review_await_field\"");
        }

        #[test]
        fn displays_upper_case_label() {
            assert_eq!(DialogPhase::ReviewAwaitValue.to_string(), "REVIEW_AWAIT_VALUE");
        }

        #[test]
        fn only_collecting_is_outside_review() {
            assert!(!DialogPhase::Collecting.is_review());
            assert!(DialogPhase::ReviewConfirm.is_review());
            assert!(DialogPhase::ReviewAwaitField.is_review());
            assert!(DialogPhase::ReviewAwaitValue.is_review());
        }
    }

    mod transitions {
        use super::*;
        use DialogPhase::*;

        #[test]
        fn review_cycle_is_allowed() {
            let phase = ReviewConfirm;
            let phase = phase.transition_to(ReviewAwaitField).unwrap();
            let phase = phase.transition_to(ReviewAwaitValue).unwrap();
            let phase = phase.transition_to(ReviewConfirm).unwrap();
            assert_eq!(phase, ReviewConfirm);
        }

        #[test]
        fn phases_cannot_be_skipped() {
            assert!(Collecting.transition_to(ReviewAwaitField).is_err());
            assert!(ReviewConfirm.transition_to(ReviewAwaitValue).is_err());
            assert!(ReviewAwaitField.transition_to(ReviewConfirm).is_err());
        }

        #[test]
        fn review_never_returns_to_collecting() {
            for phase in [ReviewConfirm, ReviewAwaitField, ReviewAwaitValue] {
                assert!(!phase.can_transition_to(&Collecting));
            }
        }

        #[test]
        fn no_phase_is_terminal() {
            for phase in [Collecting, ReviewConfirm, ReviewAwaitField, ReviewAwaitValue] {
                assert!(!phase.is_terminal());
            }
        }

        #[test]
        fn valid_transitions_agree_with_can_transition_to() {
            let all = [Collecting, ReviewConfirm, ReviewAwaitField, ReviewAwaitValue];
            for from in all {
                for to in all {
                    assert_eq!(
                        from.can_transition_to(&to),
                        from.valid_transitions().contains(&to),
                        "{from:?} -> {to:?}"
                    );
                }
            }
        }
    }
}
