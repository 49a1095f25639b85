//! Listener, logging and HTTP layer settings

use serde::Deserialize;
use std::net::SocketAddr;
use std::time::Duration;

use super::error::ValidationError;

/// Longest request the HTTP layer lets run, in seconds.
const MAX_REQUEST_TIMEOUT_SECS: u64 = 300;

/// How log lines are rendered.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines for a terminal
    #[default]
    Pretty,
    /// One JSON object per line for log collectors
    Json,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// `host:port` the dialogue API listens on
    pub bind: String,

    pub log_format: LogFormat,

    /// Filter directive used when `RUST_LOG` is unset
    pub log_filter: String,

    /// Upper bound on one HTTP request, collaborator calls included
    pub request_timeout_secs: u64,

    /// Comma-separated CORS origins; empty allows any origin
    pub allowed_origins: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:5000".to_string(),
            log_format: LogFormat::Pretty,
            log_filter: "info,formfill=debug,tower_http=info".to_string(),
            request_timeout_secs: 30,
            allowed_origins: String::new(),
        }
    }
}

impl ServerConfig {
    /// Parsed listen address.
    ///
    /// # Errors
    ///
    /// - `InvalidAddress` if `bind` is not `host:port`
    /// - `InvalidPort` for port 0
    pub fn listen_addr(&self) -> Result<SocketAddr, ValidationError> {
        let addr: SocketAddr = self
            .bind
            .trim()
            .parse()
            .map_err(|_| ValidationError::InvalidAddress(self.bind.clone()))?;
        if addr.port() == 0 {
            return Err(ValidationError::InvalidPort);
        }
        Ok(addr)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn json_logs(&self) -> bool {
        self.log_format == LogFormat::Json
    }

    /// Configured origins, blanks dropped.
    pub fn origins(&self) -> impl Iterator<Item = &str> {
        self.allowed_origins
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(1..=MAX_REQUEST_TIMEOUT_SECS).contains(&self.request_timeout_secs) {
            return Err(ValidationError::InvalidTimeout);
        }
        self.listen_addr().map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bound_to(bind: &str) -> ServerConfig {
        ServerConfig {
            bind: bind.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn defaults_listen_locally_with_pretty_logs() {
        let config = ServerConfig::default();
        assert_eq!(config.listen_addr().unwrap().to_string(), "127.0.0.1:5000");
        assert!(!config.json_logs());
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.origins().count(), 0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn bind_accepts_ipv6_and_surrounding_space() {
        let addr = bound_to(" [::1]:8443 ").listen_addr().unwrap();
        assert!(addr.is_ipv6());
        assert_eq!(addr.port(), 8443);
    }

    #[test]
    fn bind_must_be_host_and_port() {
        assert_eq!(
            bound_to("localhost").validate(),
            Err(ValidationError::InvalidAddress("localhost".to_string()))
        );
        assert_eq!(
            bound_to("0.0.0.0:0").validate(),
            Err(ValidationError::InvalidPort)
        );
    }

    #[test]
    fn request_timeout_is_bounded() {
        for secs in [0, MAX_REQUEST_TIMEOUT_SECS + 1] {
            let config = ServerConfig {
                request_timeout_secs: secs,
                ..Default::default()
            };
            assert_eq!(config.validate(), Err(ValidationError::InvalidTimeout), "{secs}");
        }
    }

    #[test]
    fn origins_skip_blank_entries() {
        let config = ServerConfig {
            allowed_origins: "https://forms.example, ,http://localhost:5173,".to_string(),
            ..Default::default()
        };
        let origins: Vec<&str> = config.origins().collect();
        assert_eq!(origins, vec!["https://forms.example", "http://localhost:5173"]);
    }

    #[test]
    fn log_format_reads_lowercase_names() {
        let format: LogFormat = serde_json::from_str("\"json\"").unwrap();
        assert_eq!(format, LogFormat::Json);
    }
}
