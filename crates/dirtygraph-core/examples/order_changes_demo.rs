//! Change Tracking Demonstration
#![allow(clippy::unwrap_used, clippy::expect_used)]
//!
//! Walks an `Order` aggregate through a typical edit session:
//! 1. Registering watched associations
//! 2. Capturing a baseline of the line items
//! 3. Editing, adding and deleting related records
//! 4. Building a change report and diffing against the baseline
//!
//! Run with `RUST_LOG=dirtygraph_core=debug` to see the inner debug events.

use dirtygraph_core::graph::{InMemoryGraph, RelationshipCatalog};
use dirtygraph_core::logging_facility::{init, Profile};
use dirtygraph_core::{
    compare, AssociationName, AssociationTracker, ChangeReportBuilder, EntityId, EntityRef,
    RelationshipKind, SnapshotCache, WatchSpec, WatchedAssociationRegistry,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init(Profile::Development);
    println!("=== Dirtygraph Change Tracking Demo ===\n");

    // ===== Part 1: Registration =====
    println!("## Part 1: Registration\n");

    let catalog = RelationshipCatalog::new()
        .with_relationship("Order", "items", RelationshipKind::OwnsMany)
        .with_relationship("Order", "customer", RelationshipKind::BelongsTo)
        .with_relationship("Order", "tags", RelationshipKind::ManyToMany);

    let registry = WatchedAssociationRegistry::global();
    let watched = registry.register("Order", &WatchSpec::from_names(["children"]), &catalog)?;
    let names: Vec<&str> = watched.iter().map(AssociationName::as_str).collect();
    println!("✓ Order watches {:?}\n", names);

    // ===== Part 2: Baseline =====
    println!("## Part 2: Baseline\n");

    let root = EntityRef::persisted("Order", "o-1").with_attribute("status", "open");
    let mut order = InMemoryGraph::new(root)
        .with_association(
            "items",
            vec![
                EntityRef::persisted("LineItem", "li-1").with_attribute("price", 10),
                EntityRef::persisted("LineItem", "li-2").with_attribute("price", 20),
            ],
        )
        .with_association("customer", vec![EntityRef::persisted("Customer", "c-1")])
        .with_association("tags", Vec::new());

    let items = AssociationName::from("items");
    let cache = SnapshotCache::global();
    let baseline = cache.capture_association(registry, &order, &items)?;
    println!(
        "✓ Captured {} items (digest {})\n",
        baseline.len(),
        &baseline.digest()[..12]
    );

    // ===== Part 3: Edits =====
    println!("## Part 3: Edits\n");

    order.root_mut().set_field("status", "paid")?;
    if let Some(item) = order.record_mut(&items, &EntityId::from("li-1"))? {
        item.set_field("price", 12)?;
    }
    if let Some(item) = order.record_mut(&items, &EntityId::from("li-2"))? {
        item.mark_deleted();
    }
    let mut extra = EntityRef::unsaved("LineItem");
    extra.set_field("price", 5)?;
    order.push("items", extra);
    println!("✓ Repriced li-1, deleted li-2, added one item\n");

    // ===== Part 4: Reporting =====
    println!("## Part 4: Reporting\n");

    let report = ChangeReportBuilder::new(registry).build(&order)?;
    println!("{}\n", serde_json::to_string_pretty(&report)?);

    let tracker = AssociationTracker::resolve(registry, &order, &items)?;
    let delta = compare(&baseline, &tracker);
    println!(
        "✓ Since baseline: {} added, {} removed, {} modified",
        delta.added.len(),
        delta.removed.len(),
        delta.modified.len()
    );

    cache.clear(&"Order".into(), &items);
    println!("\n=== Demo Complete ===");
    Ok(())
}
