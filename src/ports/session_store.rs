//! Session store port.
//!
//! Makes sessions addressable by id between turns. Sessions are ephemeral;
//! no implementation is expected to survive a restart.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::dialog::FormSession;
use crate::domain::foundation::{SessionId, Timestamp};

#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Inserts or replaces the session under its id.
    async fn save(&self, session: &FormSession) -> Result<(), SessionStoreError>;

    /// Returns a copy of the session.
    ///
    /// # Errors
    ///
    /// - `NotFound` if no session has this id
    async fn load(&self, id: &SessionId) -> Result<FormSession, SessionStoreError>;

    async fn exists(&self, id: &SessionId) -> Result<bool, SessionStoreError>;

    /// Removes the session. Removing an unknown id is not an error.
    async fn delete(&self, id: &SessionId) -> Result<(), SessionStoreError>;

    /// Ids of sessions whose last turn was at or before `cutoff`.
    async fn idle_since(&self, cutoff: &Timestamp) -> Result<Vec<SessionId>, SessionStoreError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionStoreError {
    #[error("session not found: {0}")]
    NotFound(SessionId),

    #[error("session store unavailable: {0}")]
    Unavailable(String),
}
