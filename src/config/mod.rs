//! Application configuration module
//!
//! Type-safe configuration loaded from environment variables using the
//! `config` and `dotenvy` crates. Variables use the `FORMFILL` prefix and
//! nested values are separated by double underscores. Every section has
//! defaults, so the service starts in local mode with no environment at all.
//!
//! # Example
//!
//! ```no_run
//! use formfill::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Listening on {:?}", config.server.listen_addr());
//! ```

mod collaborator;
mod documents;
mod error;
mod server;
mod sessions;

pub use collaborator::{CollaboratorConfig, CollaboratorMode};
pub use documents::DocumentConfig;
pub use error::{ConfigError, ValidationError};
pub use server::{LogFormat, ServerConfig};
pub use sessions::SessionConfig;

use serde::Deserialize;

/// Root application configuration
#[derive(Debug, Default, Deserialize)]
pub struct AppConfig {
    /// Listener, logging and HTTP layers
    #[serde(default)]
    pub server: ServerConfig,

    /// Form collaborator (local rules or remote service)
    #[serde(default)]
    pub collaborator: CollaboratorConfig,

    /// Finalized document storage
    #[serde(default)]
    pub documents: DocumentConfig,

    /// Idle session eviction
    #[serde(default)]
    pub sessions: SessionConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `FORMFILL` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    ///
    /// # Environment Variable Format
    ///
    /// - `FORMFILL__SERVER__BIND=0.0.0.0:8080` -> `server.bind = "0.0.0.0:8080"`
    /// - `FORMFILL__COLLABORATOR__MODE=remote` -> `collaborator.mode = remote`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("FORMFILL")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.collaborator.validate()?;
        self.documents.validate()?;
        self.sessions.validate()?;
        // Otherwise the HTTP layer drops turns before a call can time out.
        if self.collaborator.timeout() >= self.server.request_timeout() {
            return Err(ValidationError::CollaboratorTimeoutTooLong);
        }
        Ok(())
    }
}
