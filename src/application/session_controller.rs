//! SessionController - turn-taking API over one form session.
//!
//! Every collaborator round trip completes before the session is touched, so
//! a failed, timed-out or dropped call never moves the phase. A call that
//! fails mid-collection may still have been committed by the collaborator;
//! the session is flagged and the next submission first adopts the
//! collaborator's progress.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::domain::dialog::{
    DialogError, DialogInput, DialogPhase, DialogStateMachine, Directive, FieldList, FormSession,
    Progress, TurnPlan,
};
use crate::domain::foundation::SessionId;
use crate::ports::{
    AnswerOutcome, CollaboratorError, FieldValidation, FinalizedForm, FormCollaborator, NextStep,
    SessionSnapshot,
};

/// Default bound on a single collaborator call.
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(15);

const ALREADY_RECORDED: &str = "Your previous answer was already recorded.";

/// Drives form sessions against a [`FormCollaborator`].
pub struct SessionController {
    collaborator: Arc<dyn FormCollaborator>,
    machine: DialogStateMachine,
    call_timeout: Duration,
}

impl SessionController {
    pub fn new(collaborator: Arc<dyn FormCollaborator>) -> Self {
        Self {
            collaborator,
            machine: DialogStateMachine::new(),
            call_timeout: DEFAULT_CALL_TIMEOUT,
        }
    }

    pub fn with_call_timeout(mut self, call_timeout: Duration) -> Self {
        self.call_timeout = call_timeout;
        self
    }

    /// Opens a session for `fields`.
    ///
    /// The list is validated locally before the collaborator is contacted;
    /// the session adopts the collaborator's id.
    ///
    /// # Errors
    ///
    /// - `InvalidFieldList` if the list is empty, has blank names or duplicates,
    ///   or the collaborator refuses it
    /// - `TransportFailure` if the collaborator cannot be reached
    pub async fn start(&self, fields: Vec<String>) -> Result<FormSession, DialogError> {
        let fields = FieldList::new(fields)?;

        let started = self
            .call(self.collaborator.start_session(&fields))
            .await
            .map_err(|err| match err {
                CollaboratorError::Refused(reason) => DialogError::InvalidFieldList(reason),
                CollaboratorError::Transport(detail) => DialogError::TransportFailure(detail),
            })?;

        if started.fields.as_slice() != fields.as_slice() {
            warn!(
                session_id = %started.session_id,
                "Collaborator echoed a different field list; keeping the requested one"
            );
        }

        let session = FormSession::start(started.session_id, fields);
        info!(
            session_id = %session.id(),
            fields = session.fields().len(),
            "Form session started"
        );
        Ok(session)
    }

    /// What the session is currently waiting for.
    pub fn prompt(&self, session: &FormSession) -> Vec<Directive> {
        self.machine.prompt(session)
    }

    /// Processes one user turn and returns what to present next.
    ///
    /// In-dialogue failures come back as `Error` directives, never as `Err`.
    pub async fn handle_input(&self, session: &mut FormSession, input: DialogInput) -> Vec<Directive> {
        let from = session.phase();
        let kind = input.kind();

        let directives = match self.machine.plan(session, input) {
            TurnPlan::Respond(directives) => directives,
            TurnPlan::SubmitAnswer { field, answer } => {
                self.submit_answer(session, field, answer).await
            }
            TurnPlan::SubmitCorrection { field, value } => {
                self.submit_correction(session, field, value).await
            }
        };

        debug!(
            session_id = %session.id(),
            input = kind,
            from = %from,
            to = %session.phase(),
            directives = directives.len(),
            "Turn handled"
        );
        directives
    }

    /// Flags the session so its next answer first adopts the collaborator's
    /// progress. Only applies while collecting.
    pub fn mark_out_of_sync(&self, session: &mut FormSession) {
        self.machine.mark_out_of_sync(session);
    }

    /// Reconciles the session with an authoritative snapshot.
    pub fn load_external_state(&self, session: &mut FormSession, responses: HashMap<String, String>) {
        let report = self.machine.load_external_state(session, responses);
        if !report.ignored.is_empty() {
            warn!(
                session_id = %session.id(),
                ignored = ?report.ignored,
                "Snapshot contained keys that are not session fields"
            );
        }
        debug!(session_id = %session.id(), applied = report.applied, "External state loaded");
    }

    /// Lets the collaborator drop an abandoned session.
    ///
    /// # Errors
    ///
    /// - `TransportFailure` if the collaborator cannot be reached
    pub async fn release(&self, session_id: &SessionId) -> Result<(), DialogError> {
        self.call(self.collaborator.release_session(session_id))
            .await
            .map_err(dialog_error)
    }

    /// Submits the confirmed form.
    ///
    /// # Errors
    ///
    /// - `NotConfirmed` unless the review was affirmed
    /// - `SessionClosed` if the session already ended
    /// - `TransportFailure` / `ValidatorRejected` from the collaborator
    pub async fn finalize(&self, session: &mut FormSession) -> Result<FinalizedForm, DialogError> {
        self.machine.ensure_submittable(session)?;

        let form = self
            .call(self.collaborator.finalize(session.id()))
            .await
            .map_err(dialog_error)?;

        self.machine.mark_finalized(session);
        info!(
            session_id = %session.id(),
            document_url = %form.document_url,
            elapsed_secs = session
                .last_turn_at()
                .duration_since(session.started_at())
                .num_seconds(),
            "Form finalized"
        );
        Ok(form)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Collaborator round trips
    // ─────────────────────────────────────────────────────────────────────────

    async fn submit_answer(
        &self,
        session: &mut FormSession,
        field: String,
        answer: String,
    ) -> Vec<Directive> {
        if session.needs_resync() {
            match self
                .call(self.collaborator.get_session_state(session.id()))
                .await
            {
                Ok(snapshot) => {
                    let before = session.current_index();
                    let directives = self.adopt_progress(session, snapshot, None);
                    let moved_on = session.current_index() != before
                        || session.phase() != DialogPhase::Collecting;
                    if moved_on {
                        let mut moved = vec![Directive::notice(ALREADY_RECORDED)];
                        moved.extend(directives);
                        return moved;
                    }
                }
                Err(err) => return self.failed_call(session, &field, err),
            }
        }

        let outcome = match self
            .call(self.collaborator.submit_answer(session.id(), &answer))
            .await
        {
            Ok(outcome) => outcome,
            Err(err) => return self.failed_call(session, &field, err),
        };

        match outcome {
            AnswerOutcome::Accepted {
                value,
                next,
                message,
            } => {
                let collaborator_next = match &next {
                    NextStep::Field { index, .. } => *index,
                    NextStep::Completed => session.fields().len(),
                };
                if collaborator_next != session.current_index() + 1 {
                    warn!(
                        session_id = %session.id(),
                        expected_index = session.current_index() + 1,
                        collaborator = ?next,
                        "Collaborator progress differs from the local field order; adopting it"
                    );
                    return self
                        .follow_collaborator(session, collaborator_next, message)
                        .await;
                }
                let exhausts = session.current_index() + 1 >= session.fields().len();
                let snapshot = if exhausts {
                    Some(self.call(self.collaborator.get_session_state(session.id())).await)
                } else {
                    None
                };
                self.accept_answer(session, value, message, snapshot)
            }
            AnswerOutcome::Repeat { message } => {
                let mut directives: Vec<Directive> =
                    message.map(Directive::notice).into_iter().collect();
                directives.extend(self.machine.prompt(session));
                directives
            }
            AnswerOutcome::Rejected { message } => {
                debug!(session_id = %session.id(), field = %field, "Answer rejected");
                self.rejected(session, message)
            }
            AnswerOutcome::Aborted { message } => self.abort(session, message),
        }
    }

    fn accept_answer(
        &self,
        session: &mut FormSession,
        value: String,
        message: Option<String>,
        snapshot: Option<Result<SessionSnapshot, CollaboratorError>>,
    ) -> Vec<Directive> {
        let progress = match self.machine.record_answer(session, value) {
            Ok(progress) => progress,
            Err(err) => return vec![Directive::error(&err)],
        };

        let mut directives: Vec<Directive> = message.map(Directive::notice).into_iter().collect();
        if progress == Progress::Exhausted {
            match snapshot {
                Some(Ok(snapshot)) => self.load_external_state(session, snapshot.responses),
                Some(Err(err)) => {
                    // The answer itself was accepted; review shows local values.
                    warn!(
                        session_id = %session.id(),
                        error = %err,
                        "Could not fetch session state for review"
                    );
                    directives.push(Directive::error(&dialog_error(err)));
                }
                None => {}
            }
        }
        directives.extend(self.progress_directives(session, progress));
        directives
    }

    /// Adopts the collaborator's position after it accepted an answer for a
    /// different field than the local one.
    async fn follow_collaborator(
        &self,
        session: &mut FormSession,
        next_index: usize,
        message: Option<String>,
    ) -> Vec<Directive> {
        let mut directives: Vec<Directive> = message.map(Directive::notice).into_iter().collect();
        let snapshot = match self
            .call(self.collaborator.get_session_state(session.id()))
            .await
        {
            Ok(snapshot) => snapshot,
            Err(err) => {
                directives.push(Directive::error(&dialog_error(err)));
                SessionSnapshot::default()
            }
        };
        directives.extend(self.adopt_progress(session, snapshot, Some(next_index)));
        directives
    }

    /// Applies the collaborator's answers and moves to its position.
    fn adopt_progress(
        &self,
        session: &mut FormSession,
        snapshot: SessionSnapshot,
        next_index: Option<usize>,
    ) -> Vec<Directive> {
        let from = session.current_index();
        self.load_external_state(session, snapshot.responses);
        let progress = match self
            .machine
            .resync(session, next_index.or(snapshot.next_index))
        {
            Ok(progress) => progress,
            Err(err) => return vec![Directive::error(&err)],
        };
        if session.current_index() != from {
            info!(
                session_id = %session.id(),
                from,
                to = session.current_index(),
                "Adopted collaborator progress"
            );
        }
        self.progress_directives(session, progress)
    }

    fn progress_directives(&self, session: &FormSession, progress: Progress) -> Vec<Directive> {
        match progress {
            Progress::Next { field, index } => vec![Directive::PromptField {
                field,
                index,
                total: session.fields().len(),
            }],
            Progress::Exhausted => {
                info!(session_id = %session.id(), "All fields collected, entering review");
                self.machine.review(session)
            }
        }
    }

    async fn submit_correction(
        &self,
        session: &mut FormSession,
        field: String,
        value: String,
    ) -> Vec<Directive> {
        let validation = match self
            .call(self.collaborator.validate_field(session.id(), &field, &value))
            .await
        {
            Ok(validation) => validation,
            Err(err) => return self.failed_call(session, &field, err),
        };

        match validation {
            FieldValidation::Accepted {
                field: validated_field,
                value,
                responses,
            } => {
                if validated_field != field {
                    warn!(
                        session_id = %session.id(),
                        expected = %field,
                        got = %validated_field,
                        "Collaborator validated a different field"
                    );
                }
                let field = match self.machine.complete_correction(session, value.clone()) {
                    Ok(field) => field,
                    Err(err) => return vec![Directive::error(&err)],
                };
                self.load_external_state(session, responses);

                let shown = session
                    .responses()
                    .get(&field)
                    .unwrap_or(value.as_str())
                    .to_string();
                let mut directives = vec![Directive::notice(format!(
                    "Updated \"{}\" to: {}",
                    field, shown
                ))];
                directives.extend(self.machine.review(session));
                directives
            }
            FieldValidation::Rejected { message } => self.rejected(session, message),
            FieldValidation::Aborted { message } => self.abort(session, message),
        }
    }

    fn rejected(&self, session: &FormSession, message: String) -> Vec<Directive> {
        let mut directives = vec![Directive::error(&DialogError::ValidatorRejected(message))];
        directives.extend(self.machine.prompt(session));
        directives
    }

    fn abort(&self, session: &mut FormSession, message: String) -> Vec<Directive> {
        info!(session_id = %session.id(), "Session stopped by user");
        self.machine.abort(session, message)
    }

    fn failed_call(
        &self,
        session: &mut FormSession,
        field: &str,
        err: CollaboratorError,
    ) -> Vec<Directive> {
        warn!(
            session_id = %session.id(),
            field = %field,
            phase = %session.phase(),
            error = %err,
            "Collaborator call failed; phase unchanged"
        );
        self.machine.mark_out_of_sync(session);
        let mut directives = vec![Directive::error(&dialog_error(err))];
        directives.extend(self.machine.prompt(session));
        directives
    }

    async fn call<T, F>(&self, request: F) -> Result<T, CollaboratorError>
    where
        F: Future<Output = Result<T, CollaboratorError>>,
    {
        tokio::time::timeout(self.call_timeout, request)
            .await
            .map_err(|_| {
                CollaboratorError::Transport(format!(
                    "no answer within {}s",
                    self.call_timeout.as_secs()
                ))
            })?
    }
}

fn dialog_error(err: CollaboratorError) -> DialogError {
    match err {
        CollaboratorError::Transport(detail) => DialogError::TransportFailure(detail),
        CollaboratorError::Refused(message) => DialogError::ValidatorRejected(message),
    }
}
