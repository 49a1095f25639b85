//! The dialogue protocol.
//!
//! Decides what a turn means for the session's current phase. Turns that
//! need the collaborator come back as a [`TurnPlan`] describing the call;
//! the phase only moves once the caller reports the collaborator's verdict
//! through [`DialogStateMachine::record_answer`] or
//! [`DialogStateMachine::complete_correction`].

use std::collections::HashMap;

use super::{
    ConfirmationReply, DialogError, DialogInput, DialogPhase, Directive, FieldMatcher,
    FormSession, ReconcileReport,
};
use crate::domain::foundation::StateMachine;

const ANSWER_YES_OR_NO: &str = "Please answer yes or no.";
const ANSWER_THE_QUESTION: &str = "Please answer the current question.";
const NAME_A_FIELD: &str = "Please type the name of the field to change.";
const TYPE_NEW_VALUE: &str = "Please type the new value.";

/// What the caller must do to finish a turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnPlan {
    /// The turn is complete; present these directives.
    Respond(Vec<Directive>),
    /// Ask the collaborator to validate `answer` for the current field.
    SubmitAnswer { field: String, answer: String },
    /// Ask the collaborator to validate a corrected value for `field`.
    SubmitCorrection { field: String, value: String },
}

/// Where collection stands after an accepted answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Progress {
    /// Another field must be asked.
    Next { field: String, index: usize },
    /// Every field was asked; the session is now in review.
    Exhausted,
}

/// Transition logic over a [`FormSession`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DialogStateMachine;

impl DialogStateMachine {
    pub fn new() -> Self {
        Self
    }

    /// Interprets one user turn.
    ///
    /// Review-phase turns that need no collaborator are applied immediately.
    /// Everything else is returned as a plan and leaves the session untouched.
    pub fn plan(&self, session: &mut FormSession, input: DialogInput) -> TurnPlan {
        if !session.is_active() {
            let err = DialogError::SessionClosed(format!(
                "This session is {:?} and accepts no more input.",
                session.status
            ));
            return TurnPlan::Respond(vec![Directive::error(&err)]);
        }

        match session.phase {
            DialogPhase::Collecting => self.plan_collecting(session, input),
            DialogPhase::ReviewConfirm => self.plan_confirm(session, input),
            DialogPhase::ReviewAwaitField => self.plan_field_name(session, input),
            DialogPhase::ReviewAwaitValue => self.plan_new_value(session, input),
        }
    }

    fn plan_collecting(&self, session: &mut FormSession, input: DialogInput) -> TurnPlan {
        let Some(field) = session.current_field().map(str::to_string) else {
            return TurnPlan::Respond(self.prompt(session));
        };
        match input {
            DialogInput::Text(answer) => TurnPlan::SubmitAnswer { field, answer },
            DialogInput::Confirm | DialogInput::Decline => {
                self.reprompt(session, ANSWER_THE_QUESTION)
            }
        }
    }

    fn plan_confirm(&self, session: &mut FormSession, input: DialogInput) -> TurnPlan {
        match ConfirmationReply::from_input(&input) {
            Some(ConfirmationReply::Affirm) => {
                session.confirmed = true;
                session.touch();
                TurnPlan::Respond(vec![Directive::ReadyToSubmit])
            }
            Some(ConfirmationReply::Decline) => {
                match self.advance(session, DialogPhase::ReviewAwaitField) {
                    Ok(()) => {
                        session.confirmed = false;
                        TurnPlan::Respond(vec![self.ask_field_name(session)])
                    }
                    Err(err) => TurnPlan::Respond(vec![Directive::error(&err)]),
                }
            }
            None => self.reprompt(session, ANSWER_YES_OR_NO),
        }
    }

    fn plan_field_name(&self, session: &mut FormSession, input: DialogInput) -> TurnPlan {
        let DialogInput::Text(text) = input else {
            return self.reprompt(session, NAME_A_FIELD);
        };

        let Some(field) = FieldMatcher::resolve(&session.fields, &text).map(str::to_string)
        else {
            let err = DialogError::UnresolvedFieldName {
                input: text.trim().to_string(),
                valid_names: session.fields.to_vec(),
            };
            return TurnPlan::Respond(vec![
                Directive::error(&err),
                self.ask_field_name(session),
            ]);
        };

        if let Err(err) = self.advance(session, DialogPhase::ReviewAwaitValue) {
            return TurnPlan::Respond(vec![Directive::error(&err)]);
        }
        session.pending_edit_field = Some(field.clone());
        TurnPlan::Respond(vec![Directive::AskNewValue { field }])
    }

    fn plan_new_value(&self, session: &mut FormSession, input: DialogInput) -> TurnPlan {
        let Some(field) = session.pending_edit_field.clone() else {
            let err = DialogError::InvalidTransition(
                "awaiting a value with no field selected".to_string(),
            );
            return TurnPlan::Respond(vec![Directive::error(&err)]);
        };
        match input {
            DialogInput::Text(value) => TurnPlan::SubmitCorrection { field, value },
            DialogInput::Confirm | DialogInput::Decline => self.reprompt(session, TYPE_NEW_VALUE),
        }
    }

    /// Stores an accepted answer for the current field and moves on.
    ///
    /// # Errors
    ///
    /// - `InvalidTransition` if the session is not collecting
    pub fn record_answer(
        &self,
        session: &mut FormSession,
        value: impl Into<String>,
    ) -> Result<Progress, DialogError> {
        let field = session
            .current_field()
            .map(str::to_string)
            .ok_or_else(|| DialogError::InvalidTransition("no field is being collected".into()))?;

        let next_index = session.current_index + 1;
        let progress = match session.fields.get(next_index).map(str::to_string) {
            Some(next) => {
                self.advance(session, DialogPhase::Collecting)?;
                Progress::Next {
                    field: next,
                    index: next_index,
                }
            }
            None => {
                self.advance(session, DialogPhase::ReviewConfirm)?;
                Progress::Exhausted
            }
        };

        session.responses.set(field, value);
        session.current_index = next_index;
        session.out_of_sync = false;
        Ok(progress)
    }

    /// Flags that the outcome of a collection call is unknown.
    ///
    /// Has no effect outside `Collecting`: review calls are validated per
    /// field and a lost reply there cannot move the phase.
    pub fn mark_out_of_sync(&self, session: &mut FormSession) {
        if session.is_active() && session.phase == DialogPhase::Collecting {
            session.out_of_sync = true;
        }
    }

    /// Moves collection to the collaborator's position.
    ///
    /// `next_index` is where the collaborator will ask next; without it the
    /// first field with no answer is used. Load the collaborator's answers
    /// before calling this.
    ///
    /// # Errors
    ///
    /// - `InvalidTransition` if the session is not collecting
    pub fn resync(
        &self,
        session: &mut FormSession,
        next_index: Option<usize>,
    ) -> Result<Progress, DialogError> {
        if session.phase != DialogPhase::Collecting {
            return Err(DialogError::InvalidTransition(
                "only collection can be resynchronised".into(),
            ));
        }

        let total = session.fields.len();
        let index = next_index
            .unwrap_or_else(|| {
                session
                    .fields
                    .iter()
                    .position(|field| !session.responses.contains(field))
                    .unwrap_or(total)
            })
            .min(total);

        session.out_of_sync = false;
        session.current_index = index;
        match session.fields.get(index).map(str::to_string) {
            Some(field) => {
                session.touch();
                Ok(Progress::Next { field, index })
            }
            None => {
                self.advance(session, DialogPhase::ReviewConfirm)?;
                Ok(Progress::Exhausted)
            }
        }
    }

    /// Stores an accepted correction and returns to confirmation.
    ///
    /// # Errors
    ///
    /// - `InvalidTransition` if no correction is pending
    pub fn complete_correction(
        &self,
        session: &mut FormSession,
        value: impl Into<String>,
    ) -> Result<String, DialogError> {
        let field = session
            .pending_edit_field
            .clone()
            .ok_or_else(|| DialogError::InvalidTransition("no correction is pending".into()))?;

        self.advance(session, DialogPhase::ReviewConfirm)?;
        session.responses.set(field.clone(), value);
        session.pending_edit_field = None;
        session.confirmed = false;
        Ok(field)
    }

    /// Applies an authoritative snapshot of the session's answers.
    pub fn load_external_state(
        &self,
        session: &mut FormSession,
        responses: HashMap<String, String>,
    ) -> ReconcileReport {
        session.responses.reconcile(&session.fields, responses)
    }

    /// Review listing followed by the confirmation question.
    pub fn review(&self, session: &FormSession) -> Vec<Directive> {
        vec![
            Directive::ShowReview {
                entries: session.review_entries(),
            },
            Directive::AskConfirm,
        ]
    }

    /// What the session is waiting for right now.
    pub fn prompt(&self, session: &FormSession) -> Vec<Directive> {
        if !session.is_active() {
            return vec![Directive::SessionClosed {
                message: format!("This session is {:?}.", session.status),
            }];
        }

        match session.phase {
            DialogPhase::Collecting => match session.current_field() {
                Some(field) => vec![Directive::PromptField {
                    field: field.to_string(),
                    index: session.current_index,
                    total: session.fields.len(),
                }],
                None => self.review(session),
            },
            DialogPhase::ReviewConfirm => {
                let mut directives = self.review(session);
                if session.confirmed {
                    directives.push(Directive::ReadyToSubmit);
                }
                directives
            }
            DialogPhase::ReviewAwaitField => vec![self.ask_field_name(session)],
            DialogPhase::ReviewAwaitValue => match &session.pending_edit_field {
                Some(field) => vec![Directive::AskNewValue {
                    field: field.clone(),
                }],
                None => vec![self.ask_field_name(session)],
            },
        }
    }

    /// Checks that the session may be submitted.
    ///
    /// # Errors
    ///
    /// - `SessionClosed` if the session is no longer active
    /// - `NotConfirmed` unless the review was affirmed
    pub fn ensure_submittable(&self, session: &FormSession) -> Result<(), DialogError> {
        if !session.is_active() {
            return Err(DialogError::SessionClosed(format!(
                "This session is {:?}.",
                session.status
            )));
        }
        if session.phase != DialogPhase::ReviewConfirm || !session.confirmed {
            return Err(DialogError::NotConfirmed);
        }
        Ok(())
    }

    pub fn mark_finalized(&self, session: &mut FormSession) {
        session.mark_finalized();
    }

    /// Closes the session at the user's request.
    pub fn abort(&self, session: &mut FormSession, message: impl Into<String>) -> Vec<Directive> {
        session.mark_aborted();
        vec![Directive::SessionClosed {
            message: message.into(),
        }]
    }

    fn ask_field_name(&self, session: &FormSession) -> Directive {
        Directive::AskFieldName {
            valid_names: session.fields.to_vec(),
        }
    }

    fn reprompt(&self, session: &FormSession, message: &str) -> TurnPlan {
        let mut directives = vec![Directive::error(&DialogError::unexpected_input(message))];
        directives.extend(self.prompt(session));
        TurnPlan::Respond(directives)
    }

    fn advance(&self, session: &mut FormSession, target: DialogPhase) -> Result<(), DialogError> {
        session.phase = session.phase.transition_to(target)?;
        session.touch();
        Ok(())
    }
}
