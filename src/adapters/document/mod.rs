//! Document adapters.
//!
//! - `FormDocumentWriter` - writes filled forms and serves them for download

mod form_document_writer;

pub use form_document_writer::{DocumentError, FormDocumentWriter, WrittenDocument};
