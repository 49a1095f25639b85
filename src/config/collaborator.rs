//! Form collaborator configuration

use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Where answers are validated and the finished form is produced.
#[derive(Debug, Deserialize)]
pub struct CollaboratorConfig {
    /// `local` runs the field rules in-process; `remote` calls a form service
    #[serde(default)]
    pub mode: CollaboratorMode,

    /// Base URL of the remote form service
    pub base_url: Option<String>,

    /// Bearer token sent to the remote form service
    pub api_token: Option<Secret<String>>,

    /// Per-call timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum CollaboratorMode {
    #[default]
    Local,
    Remote,
}

impl CollaboratorConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn is_remote(&self) -> bool {
        self.mode == CollaboratorMode::Remote
    }

    /// Token value, if one is configured and non-empty.
    pub fn api_token(&self) -> Option<&str> {
        self.api_token
            .as_ref()
            .map(|t| t.expose_secret().as_str())
            .filter(|t| !t.is_empty())
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.timeout_secs == 0 || self.timeout_secs > 120 {
            return Err(ValidationError::InvalidCollaboratorTimeout);
        }
        if self.is_remote() {
            let url = self
                .base_url
                .as_deref()
                .filter(|u| !u.trim().is_empty())
                .ok_or(ValidationError::MissingRequired("COLLABORATOR__BASE_URL"))?;
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ValidationError::InvalidCollaboratorUrl);
            }
        }
        Ok(())
    }
}

impl Default for CollaboratorConfig {
    fn default() -> Self {
        Self {
            mode: CollaboratorMode::default(),
            base_url: None,
            api_token: None,
            timeout_secs: default_timeout(),
        }
    }
}

fn default_timeout() -> u64 {
    15
}
