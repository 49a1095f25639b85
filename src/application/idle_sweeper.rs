//! IdleSweeper - background eviction of abandoned sessions.
//!
//! Sessions live only in memory, so a dialogue the user walks away from
//! would otherwise be held until restart, on both sides.
//!
//! ## Configuration
//!
//! | Setting | Default | Description |
//! |---------|---------|-------------|
//! | `max_idle` | 30min | Time since the last turn before a session is dropped |
//! | `interval` | 60s | How often sessions are checked |

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, warn};

use super::DialogService;

/// Configuration for the [`IdleSweeper`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweeperConfig {
    pub max_idle: Duration,
    pub interval: Duration,
}

impl Default for SweeperConfig {
    fn default() -> Self {
        Self {
            max_idle: Duration::from_secs(30 * 60),
            interval: Duration::from_secs(60),
        }
    }
}

impl SweeperConfig {
    pub fn with_max_idle(mut self, max_idle: Duration) -> Self {
        self.max_idle = max_idle;
        self
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }
}

/// Periodically evicts sessions with no recent turn.
pub struct IdleSweeper {
    service: Arc<DialogService>,
    config: SweeperConfig,
}

impl IdleSweeper {
    pub fn new(service: Arc<DialogService>, config: SweeperConfig) -> Self {
        Self { service, config }
    }

    /// Sweeps every `interval` until `shutdown` turns true.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        let mut interval = time::interval(self.config.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        debug!("Idle sweeper stopped");
                        return;
                    }
                }
                _ = interval.tick() => {
                    self.sweep_once().await;
                }
            }
        }
    }

    /// Runs one eviction pass. Store failures are logged and retried on the
    /// next tick.
    pub async fn sweep_once(&self) -> usize {
        match self.service.evict_idle(self.config.max_idle).await {
            Ok(evicted) => evicted,
            Err(err) => {
                warn!(error = %err, "Idle session sweep failed");
                0
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::collaborator::LocalFormCollaborator;
    use crate::adapters::document::FormDocumentWriter;
    use crate::adapters::storage::InMemorySessionStore;
    use crate::application::SessionController;
    use tempfile::TempDir;

    fn service(dir: &TempDir) -> (Arc<DialogService>, InMemorySessionStore) {
        let writer = FormDocumentWriter::new(dir.path(), "/download");
        let collaborator = Arc::new(LocalFormCollaborator::new(writer));
        let store = InMemorySessionStore::new();
        let service = DialogService::new(
            SessionController::new(collaborator),
            Arc::new(store.clone()),
        );
        (Arc::new(service), store)
    }

    #[tokio::test]
    async fn sweep_once_evicts_idle_sessions() {
        let dir = TempDir::new().unwrap();
        let (service, store) = service(&dir);
        service.start(vec!["Name".to_string()]).await.unwrap();

        let sweeper = IdleSweeper::new(
            Arc::clone(&service),
            SweeperConfig::default().with_max_idle(Duration::ZERO),
        );

        assert_eq!(sweeper.sweep_once().await, 1);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn run_sweeps_until_shutdown() {
        let dir = TempDir::new().unwrap();
        let (service, store) = service(&dir);
        service.start(vec!["Name".to_string()]).await.unwrap();

        let config = SweeperConfig::default()
            .with_max_idle(Duration::ZERO)
            .with_interval(Duration::from_millis(10));
        let sweeper = IdleSweeper::new(Arc::clone(&service), config);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = tokio::spawn(async move { sweeper.run(shutdown_rx).await });

        tokio::time::sleep(Duration::from_millis(50)).await;
        shutdown_tx.send(true).unwrap();
        handle.await.unwrap();

        assert!(store.is_empty().await);
    }

    #[test]
    fn config_defaults() {
        let config = SweeperConfig::default();
        assert_eq!(config.max_idle, Duration::from_secs(1800));
        assert_eq!(config.interval, Duration::from_secs(60));
    }
}
