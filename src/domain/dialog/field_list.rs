//! Ordered, duplicate-free list of form fields.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::DialogError;

/// The fields a session asks for, in prompt order.
///
/// # Invariants
///
/// - At least one field
/// - No blank names
/// - No exact (case-sensitive) duplicates; `"Name"` and `"name"` may coexist
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct FieldList(Vec<String>);

impl FieldList {
    /// Validates and wraps a field list.
    ///
    /// # Errors
    ///
    /// - `InvalidFieldList` if the list is empty, has a blank name, or repeats a name
    pub fn new(names: Vec<String>) -> Result<Self, DialogError> {
        if names.is_empty() {
            return Err(DialogError::invalid_field_list("no fields were given"));
        }

        let mut seen = HashSet::with_capacity(names.len());
        for (position, name) in names.iter().enumerate() {
            if name.trim().is_empty() {
                return Err(DialogError::invalid_field_list(format!(
                    "field #{} has a blank name",
                    position + 1
                )));
            }
            if !seen.insert(name.as_str()) {
                return Err(DialogError::invalid_field_list(format!(
                    "duplicate field \"{}\"",
                    name
                )));
            }
        }

        Ok(Self(names))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false for a constructed list; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.0.get(index).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|f| f == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.0.clone()
    }
}

impl TryFrom<Vec<String>> for FieldList {
    type Error = DialogError;

    fn try_from(names: Vec<String>) -> Result<Self, Self::Error> {
        Self::new(names)
    }
}

impl From<FieldList> for Vec<String> {
    fn from(list: FieldList) -> Self {
        list.0
    }
}
