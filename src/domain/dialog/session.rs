//! Form session aggregate.
//!
//! All state of one dialogue lives here. Only [`DialogStateMachine`] and the
//! reconciliation entry point mutate it.
//!
//! [`DialogStateMachine`]: super::DialogStateMachine

use serde::{Deserialize, Serialize};

use super::{DialogPhase, FieldList, ResponseStore, ReviewEntry};
use crate::domain::foundation::{SessionId, Timestamp};

/// Whether a session still accepts input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    #[default]
    Active,
    /// The form was submitted.
    Finalized,
    /// The user stopped the dialogue.
    Aborted,
}

/// One form-filling dialogue.
///
/// # Invariants
///
/// - `current_index` is in `[0, fields.len()]` and equals `fields.len()` once
///   `phase` has left `Collecting`
/// - `pending_edit_field` is `Some` iff `phase == ReviewAwaitValue`, and is a field
///   of the session
/// - `responses` keys are a subset of `fields`; entries are never removed
/// - `confirmed` implies `phase == ReviewConfirm`
/// - `out_of_sync` is only set while `Collecting`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormSession {
    pub(super) id: SessionId,
    pub(super) fields: FieldList,
    pub(super) current_index: usize,
    pub(super) responses: ResponseStore,
    pub(super) phase: DialogPhase,
    pub(super) pending_edit_field: Option<String>,
    pub(super) confirmed: bool,
    pub(super) status: SessionStatus,
    pub(super) started_at: Timestamp,
    pub(super) last_turn_at: Timestamp,
    /// A collaborator call failed mid-collection; its outcome is unknown.
    #[serde(default)]
    pub(super) out_of_sync: bool,
}

impl FormSession {
    /// Creates a session at the first field with no answers.
    pub fn start(id: SessionId, fields: FieldList) -> Self {
        let now = Timestamp::now();
        Self {
            id,
            fields,
            current_index: 0,
            responses: ResponseStore::new(),
            phase: DialogPhase::Collecting,
            pending_edit_field: None,
            confirmed: false,
            status: SessionStatus::Active,
            started_at: now,
            last_turn_at: now,
            out_of_sync: false,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn fields(&self) -> &FieldList {
        &self.fields
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn responses(&self) -> &ResponseStore {
        &self.responses
    }

    pub fn phase(&self) -> DialogPhase {
        self.phase
    }

    pub fn pending_edit_field(&self) -> Option<&str> {
        self.pending_edit_field.as_deref()
    }

    /// True once the user affirmed the current review.
    pub fn is_confirmed(&self) -> bool {
        self.confirmed
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn is_active(&self) -> bool {
        self.status == SessionStatus::Active
    }

    pub fn started_at(&self) -> &Timestamp {
        &self.started_at
    }

    pub fn last_turn_at(&self) -> &Timestamp {
        &self.last_turn_at
    }

    /// True when the collaborator may have recorded an answer this session
    /// has not, so its progress must be fetched before the next submission.
    pub fn needs_resync(&self) -> bool {
        self.out_of_sync
    }

    /// The field being collected, or `None` once every field was asked.
    pub fn current_field(&self) -> Option<&str> {
        if self.phase == DialogPhase::Collecting {
            self.fields.get(self.current_index)
        } else {
            None
        }
    }

    /// Review listing in field order.
    pub fn review_entries(&self) -> Vec<ReviewEntry> {
        self.responses.all(&self.fields)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Lifecycle
    // ─────────────────────────────────────────────────────────────────────────

    pub(super) fn touch(&mut self) {
        self.last_turn_at = Timestamp::now();
    }

    pub(super) fn mark_aborted(&mut self) {
        self.status = SessionStatus::Aborted;
        self.confirmed = false;
        self.touch();
    }

    pub(super) fn mark_finalized(&mut self) {
        self.status = SessionStatus::Finalized;
        self.touch();
    }
}
