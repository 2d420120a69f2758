//! Change report output types.
//!
//! Reports are built fresh on every request and never cached. Empty buckets are
//! skipped on serialization and associations without any change are left out
//! entirely, so an unchanged graph serializes as `{}`.

use serde::{Deserialize, Serialize};

use crate::model::{AssociationName, EntityRef, FieldChanges};

/// Change state of the root record itself
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelfChange {
    /// Root carries field changes
    Changed(FieldChanges),
    /// Root is deleted; nothing else is reported
    Deleted,
}

/// An edited related record together with its field changes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditedRecord {
    pub record: EntityRef,
    pub changes: FieldChanges,
}

/// Classified changes of one watched association
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssociationReport {
    pub association: AssociationName,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub new: Vec<EntityRef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub edited: Vec<EditedRecord>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub deleted: Vec<EntityRef>,
}

impl AssociationReport {
    pub fn new(association: impl Into<AssociationName>) -> Self {
        Self {
            association: association.into(),
            new: Vec::new(),
            edited: Vec::new(),
            deleted: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.new.is_empty() && self.edited.is_empty() && self.deleted.is_empty()
    }
}

/// Aggregated changes of a root and its watched associations
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ChangeReport {
    #[serde(rename = "self", default, skip_serializing_if = "Option::is_none")]
    pub self_change: Option<SelfChange>,
    /// Associations with at least one change, in watched order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub associations: Vec<AssociationReport>,
}

impl ChangeReport {
    /// Report for a deleted root
    pub fn deleted() -> Self {
        Self {
            self_change: Some(SelfChange::Deleted),
            associations: Vec::new(),
        }
    }

    pub fn association(&self, name: &str) -> Option<&AssociationReport> {
        self.associations
            .iter()
            .find(|report| report.association.as_str() == name)
    }

    pub fn is_empty(&self) -> bool {
        self.self_change.is_none() && self.associations.is_empty()
    }

    pub fn is_root_deleted(&self) -> bool {
        matches!(self.self_change, Some(SelfChange::Deleted))
    }
}
