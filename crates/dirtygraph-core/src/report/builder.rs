use crate::classify::Classification;
use crate::collaborators::TrackedEntity;
use crate::errors::Result;
use crate::registry::WatchedAssociationRegistry;
use crate::report::model::{AssociationReport, ChangeReport, EditedRecord, SelfChange};
use crate::tracker::AssociationTracker;
use crate::{log_op_end, log_op_error, log_op_start};

/// Builds [`ChangeReport`]s against one registry
pub struct ChangeReportBuilder<'a> {
    registry: &'a WatchedAssociationRegistry,
}

impl<'a> ChangeReportBuilder<'a> {
    pub fn new(registry: &'a WatchedAssociationRegistry) -> Self {
        Self { registry }
    }

    /// Aggregate the changes of `root` and its watched associations
    ///
    /// A deleted root yields exactly `{ self: Deleted }` without touching the
    /// registry or any association. Otherwise every watched association is
    /// resolved in watched order and the first failure aborts the build.
    ///
    /// # Errors
    ///
    /// - `TypeNotRegistered`: the root's type was never registered
    /// - `UnknownAssociation`: the root lacks a watched association
    /// - `AssociationResolutionFailed`: an association failed to load
    pub fn build<E>(&self, root: &E) -> Result<ChangeReport>
    where
        E: TrackedEntity + ?Sized,
    {
        let entity_type = root.record().entity_type();
        log_op_start!("build_report", entity_type = entity_type.as_str());
        let start = std::time::Instant::now();

        let result = self.build_impl(root);

        let elapsed = start.elapsed().as_millis() as u64;
        match &result {
            Ok(report) => log_op_end!(
                "build_report",
                duration_ms = elapsed,
                entity_type = entity_type.as_str(),
                association_count = report.associations.len()
            ),
            Err(e) => log_op_error!(
                "build_report",
                e.clone(),
                duration_ms = elapsed,
                entity_type = entity_type.as_str()
            ),
        }
        result
    }

    fn build_impl<E>(&self, root: &E) -> Result<ChangeReport>
    where
        E: TrackedEntity + ?Sized,
    {
        let record = root.record();
        if record.is_deleted() {
            return Ok(ChangeReport::deleted());
        }

        let watched = self.registry.watched_associations(record.entity_type())?;
        let mut report = ChangeReport {
            self_change: record
                .has_field_changes()
                .then(|| SelfChange::Changed(record.field_changes().clone())),
            associations: Vec::with_capacity(watched.len()),
        };

        for association in watched.iter() {
            let tracker = AssociationTracker::load(root, association)?;
            let section = association_report(&tracker);
            if !section.is_empty() {
                report.associations.push(section);
            }
        }
        Ok(report)
    }
}

fn association_report(tracker: &AssociationTracker) -> AssociationReport {
    let mut section = AssociationReport::new(tracker.association().clone());
    for (record, classification) in tracker.classified() {
        match classification {
            Classification::New => section.new.push(record.clone()),
            Classification::Edited => section.edited.push(EditedRecord {
                record: record.clone(),
                changes: record.field_changes().clone(),
            }),
            Classification::Deleted => section.deleted.push(record.clone()),
            Classification::Unchanged => {}
        }
    }
    section
}
