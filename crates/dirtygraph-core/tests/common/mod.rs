use dirtygraph_core::graph::{InMemoryGraph, RelationshipCatalog};
use dirtygraph_core::{EntityRef, RelationshipKind, WatchSpec, WatchedAssociationRegistry};

/// Relationship metadata for an `Order` aggregate
///
/// Declaration order: items, customer, tags, address, invoice.
#[allow(dead_code)]
pub fn order_catalog() -> RelationshipCatalog {
    RelationshipCatalog::new()
        .with_relationship("Order", "items", RelationshipKind::OwnsMany)
        .with_relationship("Order", "customer", RelationshipKind::BelongsTo)
        .with_relationship("Order", "tags", RelationshipKind::ManyToMany)
        .with_relationship("Order", "address", RelationshipKind::EmbeddedValue)
        .with_relationship("Order", "invoice", RelationshipKind::OwnsOne)
}

/// Create a fresh registry with `Order` registered under `spec`
#[allow(dead_code)]
pub fn registry_with(spec: WatchSpec) -> WatchedAssociationRegistry {
    let registry = WatchedAssociationRegistry::new();
    registry
        .register("Order", &spec, &order_catalog())
        .expect("Order should register");
    registry
}

/// A clean, persisted line item
#[allow(dead_code)]
pub fn line_item(key: &str, price: i64) -> EntityRef {
    EntityRef::persisted("LineItem", key).with_attribute("price", price)
}

/// A clean order `o-1` with two line items and one customer
///
/// Every declared association is present; the ones without records are empty.
#[allow(dead_code)]
pub fn order_graph() -> InMemoryGraph {
    InMemoryGraph::new(EntityRef::persisted("Order", "o-1").with_attribute("status", "open"))
        .with_association("items", vec![line_item("li-1", 10), line_item("li-2", 20)])
        .with_association(
            "customer",
            vec![EntityRef::persisted("Customer", "c-1").with_attribute("name", "Ada")],
        )
        .with_association("tags", Vec::new())
        .with_association("address", Vec::new())
        .with_association("invoice", Vec::new())
}
