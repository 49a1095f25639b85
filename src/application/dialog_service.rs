//! DialogService - addresses sessions by id and serializes their turns.
//!
//! At most one turn per session is in flight. A second turn arriving before
//! the first completes is rejected with `TurnInFlight`. Each turn works on a
//! copy of the stored session that is written back only once the turn has
//! finished. While collecting, the stored copy is flagged for resync before
//! the turn starts, so a cancelled turn whose answer the collaborator did
//! commit is reconciled on the next one.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde::Serialize;
use tracing::{info, warn};

use super::SessionController;
use crate::domain::dialog::{
    DialogError, DialogInput, DialogPhase, Directive, FormSession, ReviewEntry, SessionStatus,
};
use crate::domain::foundation::{SessionId, Timestamp};
use crate::ports::{FinalizedForm, SessionStore, SessionStoreError};

/// A freshly opened session and its first prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StartedDialog {
    pub session_id: SessionId,
    pub fields: Vec<String>,
    pub directives: Vec<Directive>,
}

/// Result of one turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TurnReport {
    pub session_id: SessionId,
    pub phase: DialogPhase,
    pub status: SessionStatus,
    pub directives: Vec<Directive>,
}

/// Read-only view of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionView {
    pub session_id: SessionId,
    pub phase: DialogPhase,
    pub status: SessionStatus,
    pub fields: Vec<String>,
    pub current_index: usize,
    pub pending_edit_field: Option<String>,
    pub confirmed: bool,
    pub entries: Vec<ReviewEntry>,
    pub prompt: Vec<Directive>,
    pub started_at: Timestamp,
    pub last_turn_at: Timestamp,
}

/// Session registry in front of [`SessionController`].
pub struct DialogService {
    controller: SessionController,
    store: Arc<dyn SessionStore>,
    in_flight: Arc<Mutex<HashSet<SessionId>>>,
}

impl DialogService {
    pub fn new(controller: SessionController, store: Arc<dyn SessionStore>) -> Self {
        Self {
            controller,
            store,
            in_flight: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Opens a session and returns its first prompt.
    pub async fn start(&self, fields: Vec<String>) -> Result<StartedDialog, DialogError> {
        let session = self.controller.start(fields).await?;
        self.store.save(&session).await.map_err(store_error)?;

        Ok(StartedDialog {
            session_id: session.id().clone(),
            fields: session.fields().to_vec(),
            directives: self.controller.prompt(&session),
        })
    }

    /// Runs one turn for the session.
    ///
    /// # Errors
    ///
    /// - `SessionNotFound` for an unknown id
    /// - `TurnInFlight` if the previous turn has not finished
    pub async fn handle_input(
        &self,
        session_id: &SessionId,
        input: DialogInput,
    ) -> Result<TurnReport, DialogError> {
        let _turn = self.begin_turn(session_id)?;

        let mut session = self.store.load(session_id).await.map_err(store_error)?;
        if session.phase() == DialogPhase::Collecting && !session.needs_resync() {
            let mut unsettled = session.clone();
            self.controller.mark_out_of_sync(&mut unsettled);
            self.store.save(&unsettled).await.map_err(store_error)?;
        }
        let directives = self.controller.handle_input(&mut session, input).await;
        self.commit(&session).await?;

        Ok(TurnReport {
            session_id: session.id().clone(),
            phase: session.phase(),
            status: session.status(),
            directives,
        })
    }

    pub async fn snapshot(&self, session_id: &SessionId) -> Result<SessionView, DialogError> {
        let session = self.store.load(session_id).await.map_err(store_error)?;
        Ok(SessionView {
            session_id: session.id().clone(),
            phase: session.phase(),
            status: session.status(),
            fields: session.fields().to_vec(),
            current_index: session.current_index(),
            pending_edit_field: session.pending_edit_field().map(str::to_string),
            confirmed: session.is_confirmed(),
            entries: session.review_entries(),
            prompt: self.controller.prompt(&session),
            started_at: *session.started_at(),
            last_turn_at: *session.last_turn_at(),
        })
    }

    /// Submits a confirmed session; the session is dropped afterwards.
    ///
    /// # Errors
    ///
    /// - `SessionNotFound`, `TurnInFlight` as for [`Self::handle_input`]
    /// - `NotConfirmed` unless the review was affirmed
    pub async fn finalize(&self, session_id: &SessionId) -> Result<FinalizedForm, DialogError> {
        let _turn = self.begin_turn(session_id)?;

        let mut session = self.store.load(session_id).await.map_err(store_error)?;
        let form = self.controller.finalize(&mut session).await?;
        self.commit(&session).await?;
        Ok(form)
    }

    /// Drops sessions whose last turn is older than `max_idle` and releases
    /// their collaborator-side state. Sessions with a turn in flight are kept.
    ///
    /// # Errors
    ///
    /// - `Storage` if the session store fails
    pub async fn evict_idle(&self, max_idle: Duration) -> Result<usize, DialogError> {
        let cutoff = Timestamp::now().minus(max_idle);
        let idle = self.store.idle_since(&cutoff).await.map_err(store_error)?;

        let mut evicted = 0;
        for session_id in idle {
            let Ok(_turn) = self.begin_turn(&session_id) else {
                continue;
            };
            // A turn may have finished between listing and locking.
            match self.store.load(&session_id).await {
                Ok(session) if *session.last_turn_at() <= cutoff => {}
                Ok(_) | Err(SessionStoreError::NotFound(_)) => continue,
                Err(err) => return Err(store_error(err)),
            }

            self.store.delete(&session_id).await.map_err(store_error)?;
            if let Err(err) = self.controller.release(&session_id).await {
                warn!(
                    session_id = %session_id,
                    error = %err,
                    "Could not release collaborator session"
                );
            }
            evicted += 1;
        }

        if evicted > 0 {
            info!(evicted, idle_secs = max_idle.as_secs(), "Evicted idle sessions");
        }
        Ok(evicted)
    }

    /// Number of sessions with a turn in progress.
    pub fn turns_in_flight(&self) -> usize {
        self.in_flight.lock().map(|set| set.len()).unwrap_or(0)
    }

    async fn commit(&self, session: &FormSession) -> Result<(), DialogError> {
        if session.is_active() {
            self.store.save(session).await.map_err(store_error)
        } else {
            info!(
                session_id = %session.id(),
                status = ?session.status(),
                "Session closed, removing"
            );
            self.store.delete(session.id()).await.map_err(store_error)
        }
    }

    fn begin_turn(&self, session_id: &SessionId) -> Result<TurnGuard, DialogError> {
        let mut in_flight = self
            .in_flight
            .lock()
            .map_err(|_| DialogError::Storage("in-flight registry poisoned".to_string()))?;

        if !in_flight.insert(session_id.clone()) {
            warn!(session_id = %session_id, "Rejected turn while another is in flight");
            return Err(DialogError::TurnInFlight(session_id.clone()));
        }

        Ok(TurnGuard {
            in_flight: Arc::clone(&self.in_flight),
            session_id: session_id.clone(),
        })
    }
}

/// Marks a session busy until dropped.
struct TurnGuard {
    in_flight: Arc<Mutex<HashSet<SessionId>>>,
    session_id: SessionId,
}

impl Drop for TurnGuard {
    fn drop(&mut self) {
        if let Ok(mut in_flight) = self.in_flight.lock() {
            in_flight.remove(&self.session_id);
        }
    }
}

fn store_error(err: SessionStoreError) -> DialogError {
    match err {
        SessionStoreError::NotFound(id) => DialogError::SessionNotFound(id),
        SessionStoreError::Unavailable(detail) => DialogError::Storage(detail),
    }
}
