//! In-Memory Session Store Adapter
//!
//! Keeps form sessions in a map for the lifetime of the process.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::dialog::FormSession;
use crate::domain::foundation::{SessionId, Timestamp};
use crate::ports::{SessionStore, SessionStoreError};

/// In-memory storage for form sessions
#[derive(Debug, Clone, Default)]
pub struct InMemorySessionStore {
    sessions: Arc<RwLock<HashMap<SessionId, FormSession>>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored sessions
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    /// Clear all stored sessions (useful for tests)
    pub async fn clear(&self) {
        self.sessions.write().await.clear();
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn save(&self, session: &FormSession) -> Result<(), SessionStoreError> {
        let mut sessions = self.sessions.write().await;
        sessions.insert(session.id().clone(), session.clone());
        Ok(())
    }

    async fn load(&self, id: &SessionId) -> Result<FormSession, SessionStoreError> {
        let sessions = self.sessions.read().await;
        sessions
            .get(id)
            .cloned()
            .ok_or_else(|| SessionStoreError::NotFound(id.clone()))
    }

    async fn exists(&self, id: &SessionId) -> Result<bool, SessionStoreError> {
        Ok(self.sessions.read().await.contains_key(id))
    }

    async fn delete(&self, id: &SessionId) -> Result<(), SessionStoreError> {
        self.sessions.write().await.remove(id);
        Ok(())
    }

    async fn idle_since(&self, cutoff: &Timestamp) -> Result<Vec<SessionId>, SessionStoreError> {
        let sessions = self.sessions.read().await;
        Ok(sessions
            .values()
            .filter(|session| session.last_turn_at() <= cutoff)
            .map(|session| session.id().clone())
            .collect())
    }
}
