//! Collected answers for one session.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::FieldList;

/// One line of the review listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewEntry {
    pub field: String,
    /// `None` when the field has no stored value.
    pub value: Option<String>,
}

impl fmt::Display for ReviewEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.value.as_deref().unwrap_or(""))
    }
}

/// Outcome of reconciling the store with an external snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub applied: usize,
    /// Snapshot keys that are not fields of the session.
    pub ignored: Vec<String>,
}

/// Mapping from field name to accepted value.
///
/// Values arrive already accepted by the collaborator; nothing is validated
/// here. Entries are overwritten, never removed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseStore {
    values: HashMap<String, String>,
}

impl ResponseStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or overwrites the value for `field`.
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.values.insert(field.into(), value.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.values.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.values.contains_key(field)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// All entries in `fields` order, unset fields included.
    pub fn all(&self, fields: &FieldList) -> Vec<ReviewEntry> {
        fields
            .iter()
            .map(|field| ReviewEntry {
                field: field.to_string(),
                value: self.values.get(field).cloned(),
            })
            .collect()
    }

    /// Raw view of the stored values.
    pub fn as_map(&self) -> &HashMap<String, String> {
        &self.values
    }

    /// Applies an authoritative snapshot.
    ///
    /// Every snapshot entry for a known field overwrites the local value.
    /// Unknown keys are skipped and reported; local entries missing from the
    /// snapshot are kept.
    pub fn reconcile(
        &mut self,
        fields: &FieldList,
        snapshot: HashMap<String, String>,
    ) -> ReconcileReport {
        let mut report = ReconcileReport::default();
        for (field, value) in snapshot {
            if fields.contains(&field) {
                self.values.insert(field, value);
                report.applied += 1;
            } else {
                report.ignored.push(field);
            }
        }
        report.ignored.sort();
        report
    }
}
