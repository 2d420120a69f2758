use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Old and new value of a single changed field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldChange {
    /// Value before the change (as last persisted)
    pub old: Value,
    /// Current, unsaved value
    pub new: Value,
}

impl FieldChange {
    pub fn new(old: impl Into<Value>, new: impl Into<Value>) -> Self {
        Self {
            old: old.into(),
            new: new.into(),
        }
    }
}

/// Field-level delta of one record, keyed by field name
///
/// Backed by a `BTreeMap` so iteration and serialization order are stable.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldChanges {
    changes: BTreeMap<String, FieldChange>,
}

impl FieldChanges {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the change recorded for a field
    pub fn get(&self, field: &str) -> Option<&FieldChange> {
        self.changes.get(field)
    }

    /// Record a change, replacing any previous entry for the field
    pub fn insert(&mut self, field: impl Into<String>, change: FieldChange) {
        self.changes.insert(field.into(), change);
    }

    pub fn remove(&mut self, field: &str) -> Option<FieldChange> {
        self.changes.remove(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.changes.contains_key(field)
    }

    /// Names of the changed fields, in field-name order
    pub fn field_names(&self) -> Vec<String> {
        self.changes.keys().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldChange)> {
        self.changes.iter()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub(crate) fn clear(&mut self) {
        self.changes.clear();
    }
}

impl<K: Into<String>> FromIterator<(K, FieldChange)> for FieldChanges {
    fn from_iter<I: IntoIterator<Item = (K, FieldChange)>>(iter: I) -> Self {
        Self {
            changes: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_field_names_are_sorted() {
        let changes: FieldChanges = [
            ("price", FieldChange::new(10, 12)),
            ("name", FieldChange::new("a", "b")),
        ]
        .into_iter()
        .collect();

        assert_eq!(changes.field_names(), vec!["name", "price"]);
        assert_eq!(changes.get("price").map(|c| &c.new), Some(&json!(12)));
    }

    #[test]
    fn test_serializes_as_plain_map() {
        let changes: FieldChanges = [("price", FieldChange::new(10, 12))].into_iter().collect();
        let value = serde_json::to_value(&changes).unwrap();
        assert_eq!(value, json!({"price": {"old": 10, "new": 12}}));
    }
}
