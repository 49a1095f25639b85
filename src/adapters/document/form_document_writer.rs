//! Filled-form writer.
//!
//! Renders a session's answers as a markdown document and stores it in the
//! documents directory, where the download route serves it from.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::domain::dialog::ReviewEntry;
use crate::domain::foundation::SessionId;

/// Errors from writing or serving form documents.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentError {
    #[error("invalid document name: {0}")]
    InvalidName(String),

    #[error("document not found: {0}")]
    NotFound(String),

    #[error("document I/O failed: {0}")]
    Io(String),
}

impl DocumentError {
    fn io(message: impl Into<String>) -> Self {
        DocumentError::Io(message.into())
    }
}

/// A document that was written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenDocument {
    pub file_name: String,
    pub path: PathBuf,
    pub url: String,
}

/// Writes `{session_id}_filled.md` documents.
///
/// Each answer becomes one line, `Field: ___value___`, in field order. Writes
/// go to `{name}.tmp` first and are renamed into place.
#[derive(Debug, Clone)]
pub struct FormDocumentWriter {
    output_dir: PathBuf,
    download_prefix: String,
}

impl FormDocumentWriter {
    pub fn new(output_dir: impl Into<PathBuf>, download_prefix: impl Into<String>) -> Self {
        Self {
            output_dir: output_dir.into(),
            download_prefix: download_prefix.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// URL path the download route is mounted under.
    pub fn download_prefix(&self) -> &str {
        &self.download_prefix
    }

    /// Markdown body for the given entries.
    pub fn render(entries: &[ReviewEntry]) -> String {
        let mut body = String::new();
        for entry in entries {
            body.push_str(&format!(
                "{}: ___{}___\n\n",
                entry.field,
                entry.value.as_deref().unwrap_or("")
            ));
        }
        body
    }

    pub fn file_name(session_id: &SessionId) -> String {
        format!("{}_filled.md", session_id)
    }

    pub fn download_url(&self, file_name: &str) -> String {
        format!("{}/{}", self.download_prefix, file_name)
    }

    /// Renders and atomically stores the document for a session.
    pub async fn write(
        &self,
        session_id: &SessionId,
        entries: &[ReviewEntry],
    ) -> Result<WrittenDocument, DocumentError> {
        let file_name = Self::file_name(session_id);
        let final_path = self.resolve(&file_name)?;
        let temp_path = self.output_dir.join(format!("{}.tmp", file_name));

        fs::create_dir_all(&self.output_dir).await.map_err(|e| {
            DocumentError::io(format!(
                "Failed to create {}: {}",
                self.output_dir.display(),
                e
            ))
        })?;

        let mut file = fs::File::create(&temp_path).await.map_err(|e| {
            DocumentError::io(format!("Failed to create {}: {}", temp_path.display(), e))
        })?;
        file.write_all(Self::render(entries).as_bytes())
            .await
            .map_err(|e| {
                DocumentError::io(format!("Failed to write {}: {}", temp_path.display(), e))
            })?;
        file.sync_all().await.map_err(|e| {
            DocumentError::io(format!("Failed to sync {}: {}", temp_path.display(), e))
        })?;

        fs::rename(&temp_path, &final_path).await.map_err(|e| {
            DocumentError::io(format!(
                "Failed to rename {} to {}: {}",
                temp_path.display(),
                final_path.display(),
                e
            ))
        })?;

        Ok(WrittenDocument {
            url: self.download_url(&file_name),
            file_name,
            path: final_path,
        })
    }

    /// Reads a stored document by file name.
    ///
    /// # Errors
    ///
    /// - `InvalidName` for names that could leave the documents directory
    /// - `NotFound` if no such document exists
    pub async fn read(&self, file_name: &str) -> Result<Vec<u8>, DocumentError> {
        let path = self.resolve(file_name)?;
        match fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(DocumentError::NotFound(file_name.to_string()))
            }
            Err(e) => Err(DocumentError::io(format!(
                "Failed to read {}: {}",
                path.display(),
                e
            ))),
        }
    }

    /// Content type for a served document.
    pub fn content_type(file_name: &str) -> &'static str {
        match Path::new(file_name).extension().and_then(|ext| ext.to_str()) {
            Some("md") => "text/markdown; charset=utf-8",
            Some("pdf") => "application/pdf",
            _ => "application/octet-stream",
        }
    }

    fn resolve(&self, file_name: &str) -> Result<PathBuf, DocumentError> {
        let plain = !file_name.is_empty()
            && !file_name.starts_with('.')
            && !file_name.contains(['/', '\\'])
            && !file_name.contains("..");
        if !plain {
            return Err(DocumentError::InvalidName(file_name.to_string()));
        }
        Ok(self.output_dir.join(file_name))
    }
}
