//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the dialogue core and the outside world. Adapters implement these ports.
//!
//! - `FormCollaborator` - Remote validator, answer store and form finalizer
//! - `SessionStore` - Ephemeral session addressing between turns

mod form_collaborator;
mod session_store;

pub use form_collaborator::{
    AnswerOutcome, CollaboratorError, FieldValidation, FinalizedForm, FormCollaborator, NextStep,
    SessionSnapshot, StartedSession,
};
pub use session_store::{SessionStore, SessionStoreError};
