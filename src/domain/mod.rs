//! Domain layer containing the dialogue protocol and its value types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared primitives (ids, timestamps, error codes, state machine trait)
//! - `dialog` - Form sessions, field matching and the review/correction protocol

pub mod dialog;
pub mod foundation;
