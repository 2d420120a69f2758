/// Scenario 2: Resolving watch specs against declared relationships
mod common;

use common::order_catalog;
use dirtygraph_core::errors::TrackError;
use dirtygraph_core::graph::RelationshipCatalog;
use dirtygraph_core::registry::resolve_watch_spec;
use dirtygraph_core::{
    AssociationName, EntityType, RelationshipKind, RelationshipMetadata, WatchSpec,
    WatchedAssociationRegistry,
};
use proptest::prelude::*;
use std::sync::Arc;

fn names(set: &dirtygraph_core::WatchedAssociationSet) -> Vec<String> {
    set.iter().map(ToString::to_string).collect()
}

#[test]
fn test_scenario_02_happy_children_of_order() {
    // GIVEN Order declares items (owns many), customer (belongs to), tags (many to many)
    let catalog = RelationshipCatalog::new()
        .with_relationship("Order", "items", RelationshipKind::OwnsMany)
        .with_relationship("Order", "customer", RelationshipKind::BelongsTo)
        .with_relationship("Order", "tags", RelationshipKind::ManyToMany);
    let registry = WatchedAssociationRegistry::new();

    // WHEN registering with [:children]
    let set = registry
        .register("Order", &WatchSpec::from_names(["children"]), &catalog)
        .expect("Should register");

    // THEN the watched set is exactly {items, tags}
    assert_eq!(names(&set), vec!["items", "tags"]);
    assert!(!set.contains(&"customer".into()));
}

#[test]
fn test_scenario_02_happy_empty_list_means_all() {
    let registry = WatchedAssociationRegistry::new();
    let set = registry
        .register("Order", &WatchSpec::from_names(Vec::<String>::new()), &order_catalog())
        .unwrap();
    assert_eq!(
        names(&set),
        vec!["items", "customer", "tags", "address", "invoice"]
    );
}

#[test]
fn test_scenario_02_happy_lookup_returns_registered_set() {
    let registry = WatchedAssociationRegistry::new();
    let registered = registry
        .register("Order", &WatchSpec::Parents, &order_catalog())
        .unwrap();

    let looked_up = registry
        .watched_associations(&EntityType::from("Order"))
        .unwrap();

    assert!(Arc::ptr_eq(&registered, &looked_up));
    assert_eq!(names(&looked_up), vec!["customer", "tags"]);
    assert_eq!(registry.registered_types(), vec![EntityType::from("Order")]);
}

#[test]
fn test_scenario_02_error_explicit_unknown_association() {
    let registry = WatchedAssociationRegistry::new();
    let result = registry.register(
        "Order",
        &WatchSpec::from_names(["items", "payments"]),
        &order_catalog(),
    );

    assert_eq!(
        result.unwrap_err(),
        TrackError::UnknownAssociation {
            entity_type: "Order".to_string(),
            association: "payments".to_string(),
        }
    );
}

#[test]
fn test_scenario_02_error_lookup_before_register() {
    let registry = WatchedAssociationRegistry::new();
    let result = registry.watched_associations(&EntityType::from("Order"));
    assert!(matches!(
        result,
        Err(TrackError::TypeNotRegistered { entity_type }) if entity_type == "Order"
    ));
}

#[test]
fn test_scenario_02_concurrent_readers_share_one_set() {
    let registry = WatchedAssociationRegistry::new();
    let registered = registry
        .register("Order", &WatchSpec::Children, &order_catalog())
        .unwrap();

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                scope.spawn(|| {
                    registry
                        .watched_associations(&EntityType::from("Order"))
                        .unwrap()
                })
            })
            .collect();
        for handle in handles {
            let set = handle.join().unwrap();
            assert!(Arc::ptr_eq(&registered, &set));
        }
    });
}

fn arb_kind() -> impl Strategy<Value = RelationshipKind> {
    prop_oneof![
        Just(RelationshipKind::OwnsMany),
        Just(RelationshipKind::OwnsOne),
        Just(RelationshipKind::BelongsTo),
        Just(RelationshipKind::ManyToMany),
        Just(RelationshipKind::EmbeddedValue),
    ]
}

proptest! {
    #[test]
    fn prop_children_and_parents_cover_all(kinds in prop::collection::vec(arb_kind(), 0..12)) {
        let entity_type = EntityType::from("Order");
        let declared: Vec<(AssociationName, RelationshipKind)> = kinds
            .into_iter()
            .enumerate()
            .map(|(i, kind)| (AssociationName::from(format!("assoc_{}", i)), kind))
            .collect();

        let all = resolve_watch_spec(&entity_type, &WatchSpec::All, &declared).unwrap();
        let children = resolve_watch_spec(&entity_type, &WatchSpec::Children, &declared).unwrap();
        let parents = resolve_watch_spec(&entity_type, &WatchSpec::Parents, &declared).unwrap();

        prop_assert_eq!(all.len(), declared.len());
        for name in &all {
            prop_assert!(children.contains(name) || parents.contains(name));
        }
        // resolution is a pure function of its inputs
        prop_assert_eq!(
            children,
            resolve_watch_spec(&entity_type, &WatchSpec::Children, &declared).unwrap()
        );
    }
}

#[test]
fn test_scenario_02_catalog_is_relationship_metadata() {
    let catalog = order_catalog();
    assert!(catalog
        .declared_relationships(&EntityType::from("Invoice"))
        .is_none());
}
