//! Seams to the persistence layer and the relationship metadata resolver
//!
//! The tracker never loads or stores records itself. A root entity hands out
//! its own record and resolves its associations on request; relationship
//! metadata tells the registry which associations a type declares.
//!
//! In-memory implementations of both traits live in [`crate::graph`].

use thiserror::Error;

use crate::model::{AssociationName, EntityRef, EntityType, RelationshipKind};

/// Failure reported by a root entity while resolving an association
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResolveError {
    /// The entity has no association with that name
    #[error("no such association")]
    NoSuchAssociation,

    /// Loading the related records failed
    #[error("{reason}")]
    Failed { reason: String },
}

/// A root entity instance whose related records can be tracked
pub trait TrackedEntity {
    /// The root's own record: type, identity, lifecycle flags, field changes
    fn record(&self) -> &EntityRef;

    /// Resolve the current members of an association, in association order
    ///
    /// Called afresh every time a tracker is built; implementations must not
    /// hand back a stale collection.
    ///
    /// # Errors
    ///
    /// `NoSuchAssociation` if the entity does not have the association,
    /// `Failed` if the records could not be loaded.
    fn resolve_association(
        &self,
        association: &AssociationName,
    ) -> std::result::Result<Vec<EntityRef>, ResolveError>;
}

/// Declared relationships of entity types
pub trait RelationshipMetadata {
    /// Relationships of `entity_type` in declaration order, or `None` if the
    /// type is unknown
    fn declared_relationships(
        &self,
        entity_type: &EntityType,
    ) -> Option<Vec<(AssociationName, RelationshipKind)>>;
}
