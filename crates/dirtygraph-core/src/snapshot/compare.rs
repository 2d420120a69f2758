//! Comparison of a captured snapshot against the live association.
//!
//! Records are matched by [`EntityId`]. A live record saved after the capture
//! also matches the snapshot copy that carries its pre-save transient id (see
//! [`EntityRef::saved_from`]).
//!
//! The result is deterministic: `added` follows live order, `removed` lists
//! unmatched snapshot records (in snapshot order) followed by live records
//! deleted since the capture (in live order), and `modified` follows live
//! order. Records that were already deleted when captured are never reported
//! as removed again.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeSet, HashMap};

use crate::model::{EntityId, EntityRef, FieldChange, FieldChanges};
use crate::snapshot::cache::AssociationSnapshot;
use crate::tracker::AssociationTracker;

/// Attribute delta of one record present on both sides
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModifiedRecord {
    /// Current identity of the live record
    pub id: EntityId,
    /// Old values from the snapshot, new values from the live record
    pub changes: FieldChanges,
}

/// Difference between a snapshot and the current members of an association
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SnapshotDelta {
    pub added: Vec<EntityRef>,
    pub removed: Vec<EntityRef>,
    pub modified: Vec<ModifiedRecord>,
}

impl SnapshotDelta {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.modified.is_empty()
    }
}

/// Diff the live association against a previously captured snapshot
///
/// Live records whose digest equals the snapshot digest are unchanged by
/// definition and yield an empty delta without a per-record walk.
pub fn compare(snapshot: &AssociationSnapshot, current: &AssociationTracker) -> SnapshotDelta {
    if snapshot.is_current(current.records()) {
        tracing::debug!(
            association = current.association().as_str(),
            "snapshot digest unchanged"
        );
        return SnapshotDelta::default();
    }

    let before = snapshot.records();
    let by_id: HashMap<&EntityId, usize> = before
        .iter()
        .enumerate()
        .map(|(index, record)| (record.id(), index))
        .collect();
    let mut matched = vec![false; before.len()];

    let mut delta = SnapshotDelta::default();
    let mut deleted_since = Vec::new();

    for record in current.records() {
        let found = by_id
            .get(record.id())
            .or_else(|| record.saved_from().and_then(|id| by_id.get(id)))
            .copied();

        let Some(index) = found else {
            delta.added.push(record.clone());
            continue;
        };
        matched[index] = true;
        let old = &before[index];

        if record.is_deleted() {
            if !old.is_deleted() {
                deleted_since.push(record.clone());
            }
            continue;
        }

        let changes = attribute_changes(old, record);
        if !changes.is_empty() {
            delta.modified.push(ModifiedRecord {
                id: record.id().clone(),
                changes,
            });
        }
    }

    delta.removed = before
        .iter()
        .zip(&matched)
        .filter(|(record, seen)| !**seen && !record.is_deleted())
        .map(|(record, _)| record.clone())
        .chain(deleted_since)
        .collect();

    tracing::debug!(
        association = current.association().as_str(),
        added = delta.added.len(),
        removed = delta.removed.len(),
        modified = delta.modified.len(),
        "compared snapshot"
    );
    delta
}

fn attribute_changes(old: &EntityRef, new: &EntityRef) -> FieldChanges {
    let fields: BTreeSet<&String> = old
        .attributes()
        .keys()
        .chain(new.attributes().keys())
        .collect();

    fields
        .into_iter()
        .filter_map(|field| {
            let before = old.attribute(field).cloned().unwrap_or(Value::Null);
            let after = new.attribute(field).cloned().unwrap_or(Value::Null);
            (before != after).then(|| (field.clone(), FieldChange::new(before, after)))
        })
        .collect()
}
