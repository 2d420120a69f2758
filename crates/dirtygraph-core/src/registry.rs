//! Watched association registry
//!
//! Each entity type declares once which of its associations are watched. The
//! declaration is resolved against relationship metadata at registration time
//! and frozen; lookups afterwards hand out shared read-only sets.
//!
//! ## Resolution rules
//!
//! - `All`: every declared relationship, in declaration order
//! - `Children`: relationships that own their records (`OwnsMany`, `OwnsOne`,
//!   `ManyToMany`, `EmbeddedValue`)
//! - `Parents`: relationships owned by their record (`BelongsTo`, `ManyToMany`)
//! - `Explicit`: the given names verbatim, each of which must be declared

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::{Arc, OnceLock};

use crate::collaborators::RelationshipMetadata;
use crate::errors::{Result, TrackError};
use crate::model::{
    AssociationName, EntityType, RelationshipKind, WatchSpec, WatchedAssociationSet,
};
use crate::{log_op_end, log_op_error, log_op_start};

/// Resolve a watch spec against the declared relationships of a type
///
/// Pure function of its inputs. Explicit lists keep their order and drop
/// repeated names.
///
/// # Errors
///
/// Returns `UnknownAssociation` for the first explicit name that is not
/// declared on the type.
pub fn resolve_watch_spec(
    entity_type: &EntityType,
    spec: &WatchSpec,
    declared: &[(AssociationName, RelationshipKind)],
) -> Result<Vec<AssociationName>> {
    let select = |keep: fn(&RelationshipKind) -> bool| -> Vec<AssociationName> {
        declared
            .iter()
            .filter(|(_, kind)| keep(kind))
            .map(|(name, _)| name.clone())
            .collect()
    };

    match spec {
        WatchSpec::All => Ok(select(|_| true)),
        WatchSpec::Children => Ok(select(RelationshipKind::is_child)),
        WatchSpec::Parents => Ok(select(RelationshipKind::is_parent)),
        WatchSpec::Explicit(names) => {
            let mut resolved: Vec<AssociationName> = Vec::with_capacity(names.len());
            for name in names {
                if !declared.iter().any(|(declared_name, _)| declared_name == name) {
                    return Err(TrackError::UnknownAssociation {
                        entity_type: entity_type.to_string(),
                        association: name.to_string(),
                    });
                }
                if !resolved.contains(name) {
                    resolved.push(name.clone());
                }
            }
            Ok(resolved)
        }
    }
}

/// Per-type frozen watch sets
///
/// Reads never block each other. Registration of a type happens at most once;
/// repeating it with an identical outcome is a no-op.
#[derive(Debug, Default)]
pub struct WatchedAssociationRegistry {
    sets: DashMap<EntityType, Arc<WatchedAssociationSet>>,
}

static GLOBAL_REGISTRY: OnceLock<WatchedAssociationRegistry> = OnceLock::new();

impl WatchedAssociationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry
    pub fn global() -> &'static WatchedAssociationRegistry {
        GLOBAL_REGISTRY.get_or_init(WatchedAssociationRegistry::new)
    }

    /// Declare the watched associations of `entity_type`
    ///
    /// # Errors
    ///
    /// - `TypeNotDeclared`: metadata has no entry for the type
    /// - `UnknownAssociation`: an explicit name is not declared
    /// - `AlreadyRegistered`: the type is registered with a different set
    pub fn register<M>(
        &self,
        entity_type: impl Into<EntityType>,
        spec: &WatchSpec,
        metadata: &M,
    ) -> Result<Arc<WatchedAssociationSet>>
    where
        M: RelationshipMetadata + ?Sized,
    {
        let entity_type = entity_type.into();
        log_op_start!("register", entity_type = entity_type.as_str());
        let start = std::time::Instant::now();

        let result = self.register_impl(entity_type.clone(), spec, metadata);

        let elapsed = start.elapsed().as_millis() as u64;
        match &result {
            Ok(set) => log_op_end!(
                "register",
                duration_ms = elapsed,
                entity_type = entity_type.as_str(),
                association_count = set.len()
            ),
            Err(e) => log_op_error!(
                "register",
                e.clone(),
                duration_ms = elapsed,
                entity_type = entity_type.as_str()
            ),
        }
        result
    }

    fn register_impl<M>(
        &self,
        entity_type: EntityType,
        spec: &WatchSpec,
        metadata: &M,
    ) -> Result<Arc<WatchedAssociationSet>>
    where
        M: RelationshipMetadata + ?Sized,
    {
        let declared = metadata.declared_relationships(&entity_type).ok_or_else(|| {
            TrackError::TypeNotDeclared {
                entity_type: entity_type.to_string(),
            }
        })?;
        let resolved = resolve_watch_spec(&entity_type, spec, &declared)?;
        tracing::debug!(
            entity_type = entity_type.as_str(),
            watched = ?resolved,
            "resolved watch spec"
        );

        match self.sets.entry(entity_type.clone()) {
            Entry::Occupied(existing) => {
                if existing.get().as_slice() == resolved.as_slice() {
                    Ok(Arc::clone(existing.get()))
                } else {
                    Err(TrackError::AlreadyRegistered {
                        entity_type: entity_type.to_string(),
                        existing: existing.get().iter().map(ToString::to_string).collect(),
                    })
                }
            }
            Entry::Vacant(slot) => {
                let set = Arc::new(WatchedAssociationSet::new(entity_type, resolved));
                slot.insert(Arc::clone(&set));
                Ok(set)
            }
        }
    }

    /// Look up the watched associations of a registered type
    ///
    /// # Errors
    ///
    /// Returns `TypeNotRegistered` if `register` was never called for the type.
    pub fn watched_associations(
        &self,
        entity_type: &EntityType,
    ) -> Result<Arc<WatchedAssociationSet>> {
        self.sets
            .get(entity_type)
            .map(|set| Arc::clone(set.value()))
            .ok_or_else(|| TrackError::TypeNotRegistered {
                entity_type: entity_type.to_string(),
            })
    }

    pub fn is_registered(&self, entity_type: &EntityType) -> bool {
        self.sets.contains_key(entity_type)
    }

    /// All registered types, sorted by name
    pub fn registered_types(&self) -> Vec<EntityType> {
        let mut types: Vec<EntityType> = self.sets.iter().map(|e| e.key().clone()).collect();
        types.sort();
        types
    }
}
