//! Form Collaborator Adapters.
//!
//! Implementations of the FormCollaborator port.
//!
//! ## Available Adapters
//!
//! - `HttpFormCollaborator` - Remote form service over JSON/HTTP
//! - `LocalFormCollaborator` - In-process rules, answers and document writer

mod http_collaborator;
mod local_collaborator;

pub use http_collaborator::{HttpCollaboratorConfig, HttpFormCollaborator};
pub use local_collaborator::LocalFormCollaborator;
