//! Idle session eviction settings

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

const MAX_IDLE_SECS: u64 = 7 * 24 * 60 * 60;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Seconds without a turn before a session is dropped; 0 keeps sessions
    /// until they finish
    pub idle_timeout_secs: u64,

    /// Seconds between eviction passes
    pub sweep_interval_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            idle_timeout_secs: 30 * 60,
            sweep_interval_secs: 60,
        }
    }
}

impl SessionConfig {
    /// Idle time before eviction, or `None` when eviction is switched off.
    pub fn idle_timeout(&self) -> Option<Duration> {
        (self.idle_timeout_secs > 0).then(|| Duration::from_secs(self.idle_timeout_secs))
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.idle_timeout_secs > MAX_IDLE_SECS {
            return Err(ValidationError::InvalidIdleTimeout);
        }
        if self.idle_timeout_secs > 0 && self.sweep_interval_secs == 0 {
            return Err(ValidationError::InvalidSweepInterval);
        }
        Ok(())
    }
}
