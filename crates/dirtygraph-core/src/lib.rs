//! Dirtygraph Core - change tracking across an entity's associations
//!
//! This crate answers "what changed?" for a root entity and the records
//! reachable through its watched associations, including:
//! - Per-record classification (new, edited, deleted, unchanged)
//! - Per-association change queries over the live records
//! - A process-wide registry of watched associations per entity type
//! - Baseline snapshots of associations, with comparison against live state
//! - Aggregated change reports for a whole root
//!
//! Persistence stays outside: callers supply records and relationship
//! metadata through the traits in [`collaborators`].

pub mod classify;
pub mod collaborators;
pub mod errors;
pub mod graph;
pub mod logging_facility;
pub mod model;
pub mod registry;
pub mod report;
pub mod snapshot;
pub mod tracker;

// Re-export commonly used types
pub use classify::{classify, Classification};
pub use collaborators::{RelationshipMetadata, ResolveError, TrackedEntity};
pub use errors::{ExError, ExErrorKind, Result, TrackError};
pub use model::{
    AssociationName, EntityId, EntityRef, EntityType, FieldChange, FieldChanges,
    RelationshipKind, WatchSpec, WatchedAssociationSet,
};
pub use registry::WatchedAssociationRegistry;
pub use report::{ChangeReport, ChangeReportBuilder};
pub use snapshot::{compare, AssociationSnapshot, SnapshotCache, SnapshotDelta};
pub use tracker::{watched_records, AssociationTracker};
