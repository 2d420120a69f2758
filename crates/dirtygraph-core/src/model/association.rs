use serde::{Deserialize, Serialize};
use std::fmt;

use super::entity::EntityType;

/// Name of a declared relationship on a root entity type
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssociationName(String);

impl AssociationName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AssociationName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AssociationName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for AssociationName {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// Kind of a declared relationship, as reported by relationship metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelationshipKind {
    /// One-to-many, the root owns the related records
    OwnsMany,
    /// One-to-one, the root owns the related record
    OwnsOne,
    /// Many-to-one, the root is owned by the related record
    BelongsTo,
    /// Many-to-many join; counts as both child and parent
    ManyToMany,
    /// Value object embedded in the root
    EmbeddedValue,
}

impl RelationshipKind {
    /// True if the root owns the related records
    pub fn is_child(&self) -> bool {
        matches!(
            self,
            RelationshipKind::OwnsMany
                | RelationshipKind::OwnsOne
                | RelationshipKind::ManyToMany
                | RelationshipKind::EmbeddedValue
        )
    }

    /// True if the root is owned by the related record
    pub fn is_parent(&self) -> bool {
        matches!(
            self,
            RelationshipKind::BelongsTo | RelationshipKind::ManyToMany
        )
    }
}

/// Which associations of a type to watch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchSpec {
    /// Every declared relationship
    All,
    /// Relationships that own their related records
    Children,
    /// Relationships owned by their related record
    Parents,
    /// A verbatim list, validated against the declared relationships
    Explicit(Vec<AssociationName>),
}

impl WatchSpec {
    /// Interpret a list of names the way a declaration would
    ///
    /// `[]` and `["all"]` select everything, `["children"]` and `["parents"]`
    /// select by kind, anything else is an explicit list.
    ///
    /// # Example
    ///
    /// ```
    /// use dirtygraph_core::model::WatchSpec;
    ///
    /// assert_eq!(WatchSpec::from_names(Vec::<&str>::new()), WatchSpec::All);
    /// assert_eq!(WatchSpec::from_names(["children"]), WatchSpec::Children);
    /// assert!(matches!(WatchSpec::from_names(["items", "tags"]), WatchSpec::Explicit(_)));
    /// ```
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        match names.as_slice() {
            [] => WatchSpec::All,
            [only] if only == "all" => WatchSpec::All,
            [only] if only == "children" => WatchSpec::Children,
            [only] if only == "parents" => WatchSpec::Parents,
            _ => WatchSpec::Explicit(names.into_iter().map(AssociationName::from).collect()),
        }
    }
}

/// Frozen, ordered set of watched associations for one entity type
///
/// Order follows declaration order (or the explicit list order) and drives the
/// association order of change reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchedAssociationSet {
    entity_type: EntityType,
    associations: Vec<AssociationName>,
}

impl WatchedAssociationSet {
    pub(crate) fn new(entity_type: EntityType, associations: Vec<AssociationName>) -> Self {
        Self {
            entity_type,
            associations,
        }
    }

    pub fn entity_type(&self) -> &EntityType {
        &self.entity_type
    }

    pub fn contains(&self, association: &AssociationName) -> bool {
        self.associations.contains(association)
    }

    pub fn iter(&self) -> impl Iterator<Item = &AssociationName> {
        self.associations.iter()
    }

    pub fn as_slice(&self) -> &[AssociationName] {
        &self.associations
    }

    pub fn len(&self) -> usize {
        self.associations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.associations.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_many_to_many_is_child_and_parent() {
        assert!(RelationshipKind::ManyToMany.is_child());
        assert!(RelationshipKind::ManyToMany.is_parent());
        assert!(RelationshipKind::OwnsMany.is_child());
        assert!(!RelationshipKind::OwnsMany.is_parent());
        assert!(RelationshipKind::BelongsTo.is_parent());
        assert!(!RelationshipKind::BelongsTo.is_child());
        assert!(RelationshipKind::EmbeddedValue.is_child());
    }

    #[test]
    fn test_from_names_keywords() {
        assert_eq!(WatchSpec::from_names(["all"]), WatchSpec::All);
        assert_eq!(WatchSpec::from_names(["parents"]), WatchSpec::Parents);
        // A keyword mixed into a longer list is just a name
        assert_eq!(
            WatchSpec::from_names(["children", "items"]),
            WatchSpec::Explicit(vec!["children".into(), "items".into()])
        );
    }
}
