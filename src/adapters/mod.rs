//! Adapters - Implementations of port interfaces.
//!
//! - `collaborator` - Form collaborators (in-process rules or remote HTTP)
//! - `document` - Finalized form documents on disk
//! - `http` - REST API for hosts
//! - `storage` - Session stores
//! - `validation` - Per-field answer rules

pub mod collaborator;
pub mod document;
pub mod http;
pub mod storage;
pub mod validation;

pub use collaborator::{HttpCollaboratorConfig, HttpFormCollaborator, LocalFormCollaborator};
pub use document::{DocumentError, FormDocumentWriter, WrittenDocument};
pub use storage::InMemorySessionStore;
pub use validation::{FieldRules, FieldVerdict};
