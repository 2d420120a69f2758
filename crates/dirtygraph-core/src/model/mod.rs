pub mod association;
pub mod entity;
pub mod field_change;

pub use association::{AssociationName, RelationshipKind, WatchSpec, WatchedAssociationSet};
pub use entity::{EntityId, EntityRef, EntityType};
pub use field_change::{FieldChange, FieldChanges};
