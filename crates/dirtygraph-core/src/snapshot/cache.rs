//! Snapshot cache keyed by entity type and association.
//!
//! A slot is shared by every instance of the root type: capturing `items` for
//! one `Order` replaces whatever another `Order` captured before. Concurrent
//! captures for the same slot are unordered and the last one to finish wins.
//! Each capture swaps in a whole `Arc<AssociationSnapshot>`, so a concurrent
//! reader sees either the complete old snapshot or the complete new one.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::{Arc, OnceLock};

use crate::collaborators::TrackedEntity;
use crate::errors::Result;
use crate::model::{AssociationName, EntityId, EntityRef, EntityType};
use crate::registry::WatchedAssociationRegistry;
use crate::snapshot::digest::compute_records_digest;
use crate::tracker::AssociationTracker;
use crate::{log_op_end, log_op_error, log_op_start};

/// Records of one association, captured at a point in time
///
/// Owns independent clones; later mutation of the live records does not
/// reach it.
#[derive(Debug, Clone, PartialEq)]
pub struct AssociationSnapshot {
    entity_type: EntityType,
    association: AssociationName,
    captured_at: DateTime<Utc>,
    digest: String,
    records: Vec<EntityRef>,
}

impl AssociationSnapshot {
    pub fn entity_type(&self) -> &EntityType {
        &self.entity_type
    }

    pub fn association(&self) -> &AssociationName {
        &self.association
    }

    pub fn captured_at(&self) -> DateTime<Utc> {
        self.captured_at
    }

    /// SHA256 over the captured records (see [`compute_records_digest`])
    pub fn digest(&self) -> &str {
        &self.digest
    }

    /// Captured records, in the order they were captured
    pub fn records(&self) -> &[EntityRef] {
        &self.records
    }

    /// True if `records` digest to exactly this snapshot's digest
    ///
    /// Used by [`compare`](crate::snapshot::compare()) to skip the per-record
    /// walk. A record set that cannot be digested is never current.
    pub fn is_current(&self, records: &[EntityRef]) -> bool {
        matches!(compute_records_digest(records), Ok(digest) if digest == self.digest)
    }

    pub fn find(&self, id: &EntityId) -> Option<&EntityRef> {
        self.records.iter().find(|record| record.id() == id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

type SlotKey = (EntityType, AssociationName);

/// Process-wide store of association snapshots
#[derive(Debug, Default)]
pub struct SnapshotCache {
    slots: DashMap<SlotKey, Arc<AssociationSnapshot>>,
}

static GLOBAL_CACHE: OnceLock<SnapshotCache> = OnceLock::new();

impl SnapshotCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide cache
    pub fn global() -> &'static SnapshotCache {
        GLOBAL_CACHE.get_or_init(SnapshotCache::new)
    }

    /// Store a copy of `records` under (type, association), replacing any
    /// previous snapshot in that slot
    ///
    /// # Errors
    ///
    /// Returns `Serialization` if the records cannot be digested.
    pub fn capture(
        &self,
        entity_type: impl Into<EntityType>,
        association: impl Into<AssociationName>,
        records: &[EntityRef],
    ) -> Result<Arc<AssociationSnapshot>> {
        let records = records.to_vec();
        let snapshot = Arc::new(AssociationSnapshot {
            entity_type: entity_type.into(),
            association: association.into(),
            captured_at: Utc::now(),
            digest: compute_records_digest(&records)?,
            records,
        });

        let key = (
            snapshot.entity_type.clone(),
            snapshot.association.clone(),
        );
        if self.slots.insert(key, Arc::clone(&snapshot)).is_some() {
            tracing::debug!(
                entity_type = snapshot.entity_type.as_str(),
                association = snapshot.association.as_str(),
                "replaced cached snapshot"
            );
        }
        Ok(snapshot)
    }

    /// Resolve a watched association of `root` and capture it under the
    /// root's type
    ///
    /// # Errors
    ///
    /// Any error of [`AssociationTracker::resolve`], or `Serialization`.
    pub fn capture_association<E>(
        &self,
        registry: &WatchedAssociationRegistry,
        root: &E,
        association: &AssociationName,
    ) -> Result<Arc<AssociationSnapshot>>
    where
        E: TrackedEntity + ?Sized,
    {
        let entity_type = root.record().entity_type();
        log_op_start!(
            "capture_association",
            entity_type = entity_type.as_str(),
            association = association.as_str()
        );
        let start = std::time::Instant::now();

        let result = AssociationTracker::resolve(registry, root, association).and_then(|tracker| {
            self.capture(entity_type.clone(), association.clone(), tracker.records())
        });

        let elapsed = start.elapsed().as_millis() as u64;
        match &result {
            Ok(snapshot) => log_op_end!(
                "capture_association",
                duration_ms = elapsed,
                association = association.as_str(),
                record_count = snapshot.len()
            ),
            Err(e) => log_op_error!(
                "capture_association",
                e.clone(),
                duration_ms = elapsed,
                association = association.as_str()
            ),
        }
        result
    }

    /// Most recent snapshot for (type, association), if any
    pub fn retrieve(
        &self,
        entity_type: &EntityType,
        association: &AssociationName,
    ) -> Option<Arc<AssociationSnapshot>> {
        self.slots
            .get(&(entity_type.clone(), association.clone()))
            .map(|slot| Arc::clone(slot.value()))
    }

    /// Drop the snapshot for (type, association); true if one was present
    pub fn clear(&self, entity_type: &EntityType, association: &AssociationName) -> bool {
        self.slots
            .remove(&(entity_type.clone(), association.clone()))
            .is_some()
    }

    pub fn clear_all(&self) {
        self.slots.clear();
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
