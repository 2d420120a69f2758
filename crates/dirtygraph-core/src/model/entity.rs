use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

use super::field_change::{FieldChange, FieldChanges};
use crate::errors::{Result, TrackError};

/// Name of a root or related entity type (e.g. `Order`, `LineItem`)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityType(String);

impl EntityType {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityType {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for EntityType {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// Record identity
///
/// Persisted records are identified by their key. Unsaved records have no key
/// yet and get a transient identity at construction, which clones share.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EntityId {
    Key(String),
    Transient(Uuid),
}

impl EntityId {
    /// Allocate a fresh transient identity (UUID v7, time ordered)
    pub fn transient() -> Self {
        EntityId::Transient(Uuid::now_v7())
    }

    pub fn is_transient(&self) -> bool {
        matches!(self, EntityId::Transient(_))
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityId::Key(key) => f.write_str(key),
            EntityId::Transient(uuid) => write!(f, "transient:{}", uuid),
        }
    }
}

impl From<&str> for EntityId {
    fn from(key: &str) -> Self {
        EntityId::Key(key.to_string())
    }
}

/// One record as seen by the change tracker
///
/// Holds identity, lifecycle flags, current attribute values and the
/// field-level delta since the record was loaded or last saved.
///
/// `new_record` and `deleted` are never both set. Once deleted the record is
/// frozen: its field changes stay exactly as they were at deletion and further
/// mutation fails with `RecordFrozen`.
///
/// `Clone` is a deep copy; mutating a clone never affects the original.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityRef {
    entity_type: EntityType,
    id: EntityId,
    new_record: bool,
    deleted: bool,
    attributes: BTreeMap<String, Value>,
    field_changes: FieldChanges,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    saved_from: Option<EntityId>,
}

impl EntityRef {
    /// A clean record loaded from storage under `key`
    pub fn persisted(entity_type: impl Into<EntityType>, key: impl Into<String>) -> Self {
        Self {
            entity_type: entity_type.into(),
            id: EntityId::Key(key.into()),
            new_record: false,
            deleted: false,
            attributes: BTreeMap::new(),
            field_changes: FieldChanges::new(),
            saved_from: None,
        }
    }

    /// A record that has never been saved
    pub fn unsaved(entity_type: impl Into<EntityType>) -> Self {
        Self {
            entity_type: entity_type.into(),
            id: EntityId::transient(),
            new_record: true,
            deleted: false,
            attributes: BTreeMap::new(),
            field_changes: FieldChanges::new(),
            saved_from: None,
        }
    }

    /// Set a loaded attribute value without recording a change
    pub fn with_attribute(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(field.into(), value.into());
        self
    }

    pub fn entity_type(&self) -> &EntityType {
        &self.entity_type
    }

    pub fn id(&self) -> &EntityId {
        &self.id
    }

    /// Transient identity the record carried before its first save
    pub fn saved_from(&self) -> Option<&EntityId> {
        self.saved_from.as_ref()
    }

    pub fn is_new_record(&self) -> bool {
        self.new_record
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    pub fn attribute(&self, field: &str) -> Option<&Value> {
        self.attributes.get(field)
    }

    pub fn attributes(&self) -> &BTreeMap<String, Value> {
        &self.attributes
    }

    pub fn field_changes(&self) -> &FieldChanges {
        &self.field_changes
    }

    pub fn has_field_changes(&self) -> bool {
        !self.field_changes.is_empty()
    }

    /// Assign a new value to a field, recording the change
    ///
    /// The `old` side of a change is always the value the field had when the
    /// record was loaded or last saved. Writing that value back removes the
    /// change entry.
    ///
    /// # Errors
    ///
    /// Returns `RecordFrozen` if the record has been deleted.
    pub fn set_field(&mut self, field: impl Into<String>, value: impl Into<Value>) -> Result<()> {
        self.ensure_not_frozen()?;

        let field = field.into();
        let value = value.into();
        let original = match self.field_changes.get(&field) {
            Some(change) => change.old.clone(),
            None => self.attributes.get(&field).cloned().unwrap_or(Value::Null),
        };

        if original == value {
            self.field_changes.remove(&field);
        } else {
            self.field_changes
                .insert(field.clone(), FieldChange::new(original, value.clone()));
        }
        self.attributes.insert(field, value);
        Ok(())
    }

    /// Mark the record as deleted, freezing it
    ///
    /// Idempotent. Clears the new-record flag so the two states stay exclusive.
    pub fn mark_deleted(&mut self) {
        self.deleted = true;
        self.new_record = false;
    }

    /// Mark the record as saved, clearing its field changes
    ///
    /// An unsaved record receives a persisted key at this point and keeps its
    /// transient identity as [`saved_from`](Self::saved_from).
    ///
    /// # Errors
    ///
    /// Returns `RecordFrozen` if the record has been deleted.
    pub fn mark_saved(&mut self) -> Result<()> {
        self.ensure_not_frozen()?;

        if self.new_record {
            let key = EntityId::Key(Uuid::now_v7().to_string());
            self.saved_from = Some(std::mem::replace(&mut self.id, key));
            self.new_record = false;
        }
        self.field_changes.clear();
        Ok(())
    }

    fn ensure_not_frozen(&self) -> Result<()> {
        if self.deleted {
            return Err(TrackError::RecordFrozen {
                entity_type: self.entity_type.to_string(),
                entity_id: self.id.to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_persisted_record_is_clean() {
        let record = EntityRef::persisted("LineItem", "li-1").with_attribute("price", 10);
        assert!(!record.is_new_record());
        assert!(!record.is_deleted());
        assert!(!record.has_field_changes());
        assert_eq!(record.id(), &EntityId::from("li-1"));
    }

    #[test]
    fn test_set_field_keeps_original_old_value() {
        let mut record = EntityRef::persisted("LineItem", "li-1").with_attribute("price", 10);
        record.set_field("price", 11).unwrap();
        record.set_field("price", 12).unwrap();

        let change = record.field_changes().get("price").unwrap();
        assert_eq!(change.old, json!(10));
        assert_eq!(change.new, json!(12));
        assert_eq!(record.attribute("price"), Some(&json!(12)));
    }

    #[test]
    fn test_writing_back_original_value_clears_change() {
        let mut record = EntityRef::persisted("LineItem", "li-1").with_attribute("price", 10);
        record.set_field("price", 12).unwrap();
        record.set_field("price", 10).unwrap();
        assert!(!record.has_field_changes());
    }

    #[test]
    fn test_unset_attribute_changes_from_null() {
        let mut record = EntityRef::unsaved("LineItem");
        record.set_field("sku", "A-1").unwrap();
        assert_eq!(record.field_changes().get("sku").unwrap().old, Value::Null);
    }

    #[test]
    fn test_deleted_record_is_frozen() {
        let mut record = EntityRef::persisted("LineItem", "li-1").with_attribute("price", 10);
        record.set_field("price", 12).unwrap();
        record.mark_deleted();

        let result = record.set_field("price", 13);
        assert!(matches!(result, Err(TrackError::RecordFrozen { .. })));
        assert!(matches!(
            record.mark_saved(),
            Err(TrackError::RecordFrozen { .. })
        ));
        assert_eq!(record.field_changes().get("price").unwrap().new, json!(12));
    }

    #[test]
    fn test_deleting_new_record_clears_new_flag() {
        let mut record = EntityRef::unsaved("LineItem");
        record.mark_deleted();
        assert!(record.is_deleted());
        assert!(!record.is_new_record());
    }

    #[test]
    fn test_mark_saved_assigns_key() {
        let mut record = EntityRef::unsaved("LineItem");
        assert!(record.id().is_transient());
        record.set_field("sku", "A-1").unwrap();
        record.mark_saved().unwrap();

        assert!(!record.id().is_transient());
        assert!(!record.is_new_record());
        assert!(!record.has_field_changes());
    }

    #[test]
    fn test_mark_saved_remembers_transient_identity() {
        let mut record = EntityRef::unsaved("LineItem");
        let transient = record.id().clone();
        record.mark_saved().unwrap();

        assert_eq!(record.saved_from(), Some(&transient));
        assert_ne!(record.id(), &transient);

        let mut persisted = EntityRef::persisted("LineItem", "li-1");
        persisted.mark_saved().unwrap();
        assert_eq!(persisted.saved_from(), None);
    }

    #[test]
    fn test_clone_shares_transient_identity() {
        let record = EntityRef::unsaved("LineItem");
        let copy = record.clone();
        assert_eq!(record.id(), copy.id());
        assert_ne!(record.id(), EntityRef::unsaved("LineItem").id());
    }
}
