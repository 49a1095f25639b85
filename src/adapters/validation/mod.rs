//! Validation Adapters - answer validation for the in-process collaborator.

mod field_rules;

pub use field_rules::{FieldRules, FieldVerdict, STOPPED_MESSAGE};
