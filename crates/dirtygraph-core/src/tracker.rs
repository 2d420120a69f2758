//! Per-association change queries
//!
//! An [`AssociationTracker`] is built for one watched association of one root
//! instance. It resolves the association's current members when it is built
//! and never caches them across builds, so every tracker reflects the graph as
//! it is at that moment.

use std::collections::BTreeMap;

use crate::classify::{classify, Classification};
use crate::collaborators::{ResolveError, TrackedEntity};
use crate::errors::{Result, TrackError};
use crate::model::{AssociationName, EntityId, EntityRef, FieldChanges};
use crate::registry::WatchedAssociationRegistry;

/// Change view over the current members of one association
#[derive(Debug, Clone)]
pub struct AssociationTracker {
    association: AssociationName,
    records: Vec<EntityRef>,
}

impl AssociationTracker {
    /// Build a tracker from an already-resolved collection
    pub fn new(association: impl Into<AssociationName>, records: Vec<EntityRef>) -> Self {
        Self {
            association: association.into(),
            records,
        }
    }

    /// Resolve a watched association of `root` and build a tracker for it
    ///
    /// # Errors
    ///
    /// - `TypeNotRegistered`: the root's type was never registered
    /// - `UnknownAssociation`: the association is not watched for the type, or
    ///   the root does not have it
    /// - `AssociationResolutionFailed`: the root failed to load the records
    pub fn resolve<E>(
        registry: &WatchedAssociationRegistry,
        root: &E,
        association: &AssociationName,
    ) -> Result<Self>
    where
        E: TrackedEntity + ?Sized,
    {
        let entity_type = root.record().entity_type();
        let watched = registry.watched_associations(entity_type)?;
        if !watched.contains(association) {
            return Err(TrackError::UnknownAssociation {
                entity_type: entity_type.to_string(),
                association: association.to_string(),
            });
        }
        Self::load(root, association)
    }

    /// Resolve without consulting the registry; the caller has already checked
    /// that the association is watched.
    pub(crate) fn load<E>(root: &E, association: &AssociationName) -> Result<Self>
    where
        E: TrackedEntity + ?Sized,
    {
        let entity_type = root.record().entity_type();
        let records = root
            .resolve_association(association)
            .map_err(|err| match err {
                ResolveError::NoSuchAssociation => TrackError::UnknownAssociation {
                    entity_type: entity_type.to_string(),
                    association: association.to_string(),
                },
                ResolveError::Failed { reason } => TrackError::AssociationResolutionFailed {
                    entity_type: entity_type.to_string(),
                    association: association.to_string(),
                    reason,
                },
            })?;

        tracing::debug!(
            entity_type = entity_type.as_str(),
            association = association.as_str(),
            record_count = records.len(),
            "resolved association"
        );
        Ok(Self::new(association.clone(), records))
    }

    pub fn association(&self) -> &AssociationName {
        &self.association
    }

    /// Current members, in association order
    pub fn records(&self) -> &[EntityRef] {
        &self.records
    }

    pub fn into_records(self) -> Vec<EntityRef> {
        self.records
    }

    /// Every member paired with its classification
    pub fn classified(&self) -> impl Iterator<Item = (&EntityRef, Classification)> {
        self.records.iter().map(|record| (record, classify(record)))
    }

    /// Field changes of every member that has any, whatever its classification
    ///
    /// Deleted records still report the changes they carried when frozen.
    pub fn changes(&self) -> BTreeMap<EntityId, FieldChanges> {
        self.records
            .iter()
            .filter(|record| record.has_field_changes())
            .map(|record| (record.id().clone(), record.field_changes().clone()))
            .collect()
    }

    /// Names of the changed fields of every member that has any
    pub fn changed_fields(&self) -> BTreeMap<EntityId, Vec<String>> {
        self.records
            .iter()
            .filter(|record| record.has_field_changes())
            .map(|record| (record.id().clone(), record.field_changes().field_names()))
            .collect()
    }

    pub fn any_changed(&self) -> bool {
        self.records.iter().any(EntityRef::has_field_changes)
    }

    pub fn new_records(&self) -> Vec<&EntityRef> {
        self.with_classification(Classification::New)
    }

    /// Records with field changes that are neither new nor deleted
    pub fn edited_records(&self) -> Vec<&EntityRef> {
        self.with_classification(Classification::Edited)
    }

    pub fn deleted_records(&self) -> Vec<&EntityRef> {
        self.with_classification(Classification::Deleted)
    }

    pub fn has_new_records(&self) -> bool {
        self.has_classification(Classification::New)
    }

    pub fn has_edited_records(&self) -> bool {
        self.has_classification(Classification::Edited)
    }

    pub fn has_deleted_records(&self) -> bool {
        self.has_classification(Classification::Deleted)
    }

    fn with_classification(&self, wanted: Classification) -> Vec<&EntityRef> {
        self.classified()
            .filter(|(_, classification)| *classification == wanted)
            .map(|(record, _)| record)
            .collect()
    }

    fn has_classification(&self, wanted: Classification) -> bool {
        self.records.iter().any(|record| classify(record) == wanted)
    }
}

/// Every record of every watched association of `root`, flattened in
/// watched-association order
///
/// # Errors
///
/// Same as [`AssociationTracker::resolve`]; the first failing association
/// aborts the whole call.
pub fn watched_records<E>(registry: &WatchedAssociationRegistry, root: &E) -> Result<Vec<EntityRef>>
where
    E: TrackedEntity + ?Sized,
{
    let watched = registry.watched_associations(root.record().entity_type())?;
    let mut records = Vec::new();
    for association in watched.iter() {
        records.extend(AssociationTracker::load(root, association)?.into_records());
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn item(key: &str, price: i64) -> EntityRef {
        EntityRef::persisted("LineItem", key).with_attribute("price", price)
    }

    fn mixed_tracker() -> AssociationTracker {
        let mut fresh = EntityRef::unsaved("LineItem");
        fresh.set_field("price", 5).unwrap();

        let mut edited = item("li-2", 10);
        edited.set_field("price", 12).unwrap();

        let mut edited_then_deleted = item("li-3", 20);
        edited_then_deleted.set_field("price", 25).unwrap();
        edited_then_deleted.mark_deleted();

        AssociationTracker::new(
            "items",
            vec![fresh, edited, edited_then_deleted, item("li-4", 40)],
        )
    }

    #[test]
    fn test_buckets_are_exclusive() {
        let tracker = mixed_tracker();
        assert_eq!(tracker.new_records().len(), 1);
        let edited: Vec<_> = tracker.edited_records().iter().map(|r| r.id().clone()).collect();
        assert_eq!(edited, vec![EntityId::from("li-2")]);
        let deleted: Vec<_> = tracker.deleted_records().iter().map(|r| r.id().clone()).collect();
        assert_eq!(deleted, vec![EntityId::from("li-3")]);
        assert!(tracker.has_new_records());
        assert!(tracker.has_edited_records());
        assert!(tracker.has_deleted_records());
    }

    #[test]
    fn test_changes_include_new_and_deleted_records() {
        let tracker = mixed_tracker();
        let changes = tracker.changes();
        // new (changed price), edited, deleted-with-stale-changes
        assert_eq!(changes.len(), 3);
        assert!(changes.contains_key(&EntityId::from("li-3")));
        assert!(!changes.contains_key(&EntityId::from("li-4")));
        assert!(tracker.any_changed());
    }

    #[test]
    fn test_changed_fields_lists_names() {
        let tracker = mixed_tracker();
        let fields = tracker.changed_fields();
        assert_eq!(fields.get(&EntityId::from("li-2")), Some(&vec!["price".to_string()]));
    }

    #[test]
    fn test_clean_association() {
        let tracker = AssociationTracker::new("items", vec![item("li-1", 1), item("li-2", 2)]);
        assert!(!tracker.any_changed());
        assert!(tracker.changes().is_empty());
        assert!(!tracker.has_new_records());
        assert!(!tracker.has_edited_records());
        assert!(!tracker.has_deleted_records());
    }

    fn arb_record() -> impl Strategy<Value = EntityRef> {
        (any::<bool>(), any::<bool>(), any::<bool>(), 0u32..1000).prop_map(
            |(new_record, changed, deleted, n)| {
                let mut record = if new_record {
                    EntityRef::unsaved("LineItem")
                } else {
                    item(&format!("li-{}", n), 1)
                };
                if changed {
                    record.set_field("price", 2).unwrap();
                }
                if deleted {
                    record.mark_deleted();
                }
                record
            },
        )
    }

    proptest! {
        #[test]
        fn prop_classification_partitions_records(records in prop::collection::vec(arb_record(), 0..20)) {
            let tracker = AssociationTracker::new("items", records);
            let total = tracker.records().len();
            let unchanged = tracker
                .classified()
                .filter(|(_, c)| *c == Classification::Unchanged)
                .count();

            prop_assert_eq!(
                tracker.new_records().len()
                    + tracker.edited_records().len()
                    + tracker.deleted_records().len()
                    + unchanged,
                total
            );
            for record in tracker.edited_records() {
                prop_assert!(!record.is_deleted());
                prop_assert!(!record.is_new_record());
            }
        }

        #[test]
        fn prop_any_changed_iff_changes_non_empty(records in prop::collection::vec(arb_record(), 0..20)) {
            let tracker = AssociationTracker::new("items", records);
            prop_assert_eq!(tracker.any_changed(), !tracker.changes().is_empty());
        }
    }
}
