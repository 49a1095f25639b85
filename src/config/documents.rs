//! Finalized document configuration

use serde::Deserialize;
use std::path::PathBuf;

use super::error::ValidationError;

/// First path segments already taken by the API routes.
const RESERVED_SEGMENTS: &[&str] = &["sessions", "health"];

#[derive(Debug, Clone, Deserialize)]
pub struct DocumentConfig {
    /// Directory finalized forms are written to
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// URL path prefix the download route is mounted under
    #[serde(default = "default_download_prefix")]
    pub download_prefix: String,
}

impl DocumentConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.output_dir.as_os_str().is_empty() {
            return Err(ValidationError::MissingRequired("DOCUMENTS__OUTPUT_DIR"));
        }
        validate_prefix(&self.download_prefix)
    }
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            download_prefix: default_download_prefix(),
        }
    }
}

/// The prefix becomes part of a route pattern, so it must be plain static
/// segments. One trailing '/' is tolerated; the writer strips it.
fn validate_prefix(prefix: &str) -> Result<(), ValidationError> {
    let Some(path) = prefix.strip_prefix('/') else {
        return Err(ValidationError::InvalidDownloadPrefix("must start with '/'"));
    };
    let path = path.strip_suffix('/').unwrap_or(path);
    if path.is_empty() {
        return Err(ValidationError::InvalidDownloadPrefix(
            "must name at least one path segment",
        ));
    }

    let mut segments = path.split('/');
    if segments.clone().any(str::is_empty) {
        return Err(ValidationError::InvalidDownloadPrefix("contains an empty segment"));
    }
    let static_chars = |segment: &str| {
        segment
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '~'))
    };
    if !segments.clone().all(static_chars) {
        return Err(ValidationError::InvalidDownloadPrefix(
            "segments may only use letters, digits, '-', '_', '.' and '~'",
        ));
    }
    if segments
        .next()
        .is_some_and(|first| RESERVED_SEGMENTS.contains(&first))
    {
        return Err(ValidationError::InvalidDownloadPrefix(
            "collides with the session or health routes",
        ));
    }
    Ok(())
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("outputs")
}

fn default_download_prefix() -> String {
    "/download".to_string()
}
