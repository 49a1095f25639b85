//! Formfill - conversational form filling
//!
//! Walks a user through an ordered list of form fields one answer at a time,
//! then reads the answers back for review, lets the user correct any field by
//! name, and submits the confirmed form to a collaborator that validates
//! answers and produces the finished document.
//!
//! - `domain` - field list, answers, matcher and the dialogue state machine
//! - `ports` - collaborator and session store interfaces
//! - `application` - session controller and the per-session turn service
//! - `adapters` - local/remote collaborators, storage, documents, HTTP API
//! - `config` - environment-driven configuration

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
