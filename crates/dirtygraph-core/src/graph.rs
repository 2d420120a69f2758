//! In-memory collaborators
//!
//! [`RelationshipCatalog`] is a hand-declared relationship metadata source and
//! [`InMemoryGraph`] is a root entity holding its related records directly.
//! Both are plain owned data for tests and for callers without a persistence
//! layer.

use std::collections::{BTreeMap, HashMap};

use crate::collaborators::{RelationshipMetadata, ResolveError, TrackedEntity};
use crate::errors::{Result, TrackError};
use crate::model::{AssociationName, EntityId, EntityRef, EntityType, RelationshipKind};

/// Relationship declarations per entity type
#[derive(Debug, Clone, Default)]
pub struct RelationshipCatalog {
    types: HashMap<EntityType, Vec<(AssociationName, RelationshipKind)>>,
}

impl RelationshipCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a relationship, keeping declaration order
    ///
    /// Re-declaring an existing name replaces its kind in place.
    pub fn declare(
        &mut self,
        entity_type: impl Into<EntityType>,
        association: impl Into<AssociationName>,
        kind: RelationshipKind,
    ) -> &mut Self {
        let association = association.into();
        let relationships = self.types.entry(entity_type.into()).or_default();
        match relationships.iter_mut().find(|(name, _)| *name == association) {
            Some(existing) => existing.1 = kind,
            None => relationships.push((association, kind)),
        }
        self
    }

    /// Builder form of [`declare`](Self::declare)
    pub fn with_relationship(
        mut self,
        entity_type: impl Into<EntityType>,
        association: impl Into<AssociationName>,
        kind: RelationshipKind,
    ) -> Self {
        self.declare(entity_type, association, kind);
        self
    }
}

impl RelationshipMetadata for RelationshipCatalog {
    fn declared_relationships(
        &self,
        entity_type: &EntityType,
    ) -> Option<Vec<(AssociationName, RelationshipKind)>> {
        self.types.get(entity_type).cloned()
    }
}

/// A root record together with its loaded associations
#[derive(Debug, Clone)]
pub struct InMemoryGraph {
    root: EntityRef,
    associations: BTreeMap<AssociationName, Vec<EntityRef>>,
    failing: HashMap<AssociationName, String>,
}

impl InMemoryGraph {
    pub fn new(root: EntityRef) -> Self {
        Self {
            root,
            associations: BTreeMap::new(),
            failing: HashMap::new(),
        }
    }

    /// Attach an association with its current members
    pub fn with_association(
        mut self,
        association: impl Into<AssociationName>,
        records: Vec<EntityRef>,
    ) -> Self {
        self.associations.insert(association.into(), records);
        self
    }

    pub fn root(&self) -> &EntityRef {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut EntityRef {
        &mut self.root
    }

    /// Append a record to an association, creating the association if needed
    pub fn push(&mut self, association: impl Into<AssociationName>, record: EntityRef) {
        self.associations
            .entry(association.into())
            .or_default()
            .push(record);
    }

    /// Mutable access to one record of an association
    ///
    /// # Errors
    ///
    /// Returns `UnknownAssociation` if the graph has no such association.
    /// Returns `Ok(None)` if the association has no record with that id.
    pub fn record_mut(
        &mut self,
        association: &AssociationName,
        id: &EntityId,
    ) -> Result<Option<&mut EntityRef>> {
        let entity_type = self.root.entity_type().to_string();
        let records = self.associations.get_mut(association).ok_or_else(|| {
            TrackError::UnknownAssociation {
                entity_type,
                association: association.to_string(),
            }
        })?;
        Ok(records.iter_mut().find(|record| record.id() == id))
    }

    /// Remove a record from an association entirely (as opposed to deleting it)
    pub fn detach(&mut self, association: &AssociationName, id: &EntityId) -> Option<EntityRef> {
        let records = self.associations.get_mut(association)?;
        let position = records.iter().position(|record| record.id() == id)?;
        Some(records.remove(position))
    }

    /// Make every later resolution of `association` fail with `reason`
    pub fn fail_association(
        &mut self,
        association: impl Into<AssociationName>,
        reason: impl Into<String>,
    ) {
        self.failing.insert(association.into(), reason.into());
    }
}

impl TrackedEntity for InMemoryGraph {
    fn record(&self) -> &EntityRef {
        &self.root
    }

    fn resolve_association(
        &self,
        association: &AssociationName,
    ) -> std::result::Result<Vec<EntityRef>, ResolveError> {
        if let Some(reason) = self.failing.get(association) {
            return Err(ResolveError::Failed {
                reason: reason.clone(),
            });
        }
        self.associations
            .get(association)
            .cloned()
            .ok_or(ResolveError::NoSuchAssociation)
    }
}
