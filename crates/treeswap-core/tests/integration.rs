//! Integration tests for the Treeswap reconciliation engine.
//!
//! These tests exercise end-to-end tree switching across both catalog
//! backends, the baseline registry strategies, and the ledger.

use treeswap_core::baseline::OriginalTagRegistry;
use treeswap_core::document::DocumentFields;
use treeswap_core::id::{TagKind, TechId};
use treeswap_core::ledger::{LedgerEntry, TechLedger, TechState};
use treeswap_core::reconcile::{ReconcileOptions, Reconciler, Stores};
use treeswap_core::tags::{Part, PartCatalog, TagStore, UpgradeCatalog};
use treeswap_core::test_utils::*;

// ===========================================================================
// Test 1: Two-tree round trip
// ===========================================================================
//
// Tree1: n1 {cost 0, A}. Tree2: n2 {cost 0, A, B}.
// Apply 1, 2, 1 and check tags and ledger after each step.

#[test]
fn two_tree_round_trip() {
    let mut world = scenario_world();
    let reconciler = Reconciler::default();
    let tree1 = scenario_tree1();
    let tree2 = scenario_tree2();

    world.apply(&reconciler, &tree1).unwrap();
    assert_eq!(world.part_tag("A"), Some("n1"));
    assert_eq!(world.part_tag("B"), Some("root"));

    world.apply(&reconciler, &tree2).unwrap();
    assert_eq!(world.part_tag("A"), Some("n2"));
    assert_eq!(world.part_tag("B"), Some("n2"));
    let n2 = world.ledger.get(&TechId::from("n2")).unwrap();
    assert!(n2.contains("A"));
    assert!(n2.contains("B"));
    assert_eq!(n2.parts_purchased().len(), 2);

    world.apply(&reconciler, &tree1).unwrap();
    assert_eq!(world.part_tag("A"), Some("n1"));
    assert_eq!(world.part_tag("B"), Some("root"));
    let n2 = world.ledger.get(&TechId::from("n2")).unwrap();
    assert!(!n2.contains("A"));
    assert!(!n2.contains("B"));
}

// ===========================================================================
// Test 2: Idempotence
// ===========================================================================

#[test]
fn applying_twice_equals_applying_once() {
    let mut world = scenario_world();
    let reconciler = Reconciler::default();
    let tree = scenario_tree2();

    world.apply(&reconciler, &tree).unwrap();
    let tags_once = world.part_tags();
    let ledger_once = world.ledger.clone();

    let second = world.apply(&reconciler, &tree).unwrap();
    assert_eq!(world.part_tags(), tags_once);
    assert_eq!(world.ledger, ledger_once);
    assert_eq!(second.parts_granted, 0);
    assert_eq!(second.entries_created, 0);
    assert_eq!(second.purchases_removed, 0);
}

// ===========================================================================
// Test 3: Upgrades go through the remove/re-insert backend
// ===========================================================================

#[test]
fn upgrades_round_trip_through_reinsert_backend() {
    let mut world = TestWorld::new(
        part_catalog(&[("A", "root")]),
        upgrade_catalog(&[("engine.Upgrade1", "root"), ("tank.Upgrade", "root")]),
    );
    let reconciler = Reconciler::default();
    let t1 = tree_doc("t1", vec![rd_node("n1", 10, &[], &["engine_Upgrade1"])]);
    let t2 = tree_doc("t2", vec![rd_node("n2", 10, &[], &["tank_Upgrade"])]);

    world.apply(&reconciler, &t1).unwrap();
    assert_eq!(world.upgrade_tag("engine.Upgrade1"), Some("n1"));

    world.apply(&reconciler, &t2).unwrap();
    assert_eq!(world.upgrade_tag("engine.Upgrade1"), Some("root"));
    assert_eq!(world.upgrade_tag("tank.Upgrade"), Some("n2"));
    assert_eq!(world.upgrades.len(), 2);
}

// ===========================================================================
// Test 4: Eager baseline recovers declarations after external drift
// ===========================================================================
//
// A previous session left a part retagged before this process ever saw it.
// Lazy capture would record the drifted tag; eager capture records the
// declared one.

#[test]
fn eager_baseline_recovers_declared_tags() {
    let mut parts: PartCatalog = [Part::new("A", "root"), Part::new("B", "root")]
        .into_iter()
        .collect();
    parts.write("B", TechId::from("leftover"));

    let mut registry = OriginalTagRegistry::new();
    registry.capture_eager(TagKind::Part, &parts);

    let mut upgrades = UpgradeCatalog::new();
    let mut ledger = treeswap_core::ledger::ResearchLedger::new();
    Reconciler::default()
        .apply(
            &mut registry,
            Some(&scenario_tree1()),
            Stores {
                parts: &mut parts,
                upgrades: &mut upgrades,
                ledger: Some(&mut ledger),
            },
        )
        .unwrap();

    assert_eq!(parts.read("A"), Some(&TechId::from("n1")));
    assert_eq!(parts.read("B"), Some(&TechId::from("root")));
}

// ===========================================================================
// Test 5: Ledger consistency after a messy history
// ===========================================================================

#[test]
fn ledger_consistent_after_switches() {
    let mut world = TestWorld::new(
        part_catalog(&[("A", "root"), ("B", "root"), ("C", "root"), ("D", "root")]),
        UpgradeCatalog::new(),
    );
    let mut stale = LedgerEntry::new(TechId::from("n3"), TechState::Available);
    stale.purchase("C");
    stale.purchase("D");
    world.ledger.insert(stale);

    let reconciler = Reconciler::default();
    let trees = [
        tree_doc(
            "a",
            vec![rd_node("n1", 0, &["A", "B"], &[]), rd_node("n3", 40, &["C"], &[])],
        ),
        tree_doc(
            "b",
            vec![rd_node("n1", 0, &["A"], &[]), rd_node("n2", 0, &["B", "C"], &[])],
        ),
    ];

    for tree in trees.iter().chain(trees.iter().rev()) {
        world.apply(&reconciler, tree).unwrap();
        for id in world.ledger.tech_ids() {
            let entry = world.ledger.get(&id).unwrap();
            for part in entry.parts_purchased() {
                assert_eq!(world.part_tag(part), Some(id.as_str()), "{part} under {id}");
            }
        }
    }
}

// ===========================================================================
// Test 6: Custom field names
// ===========================================================================

#[test]
fn custom_field_names_drive_reconciliation() {
    use treeswap_core::document::{ConfigNode, TreeDocument};

    let fields = DocumentFields {
        tech_node: "Node".to_string(),
        unlocks_node: "Gives".to_string(),
        part: "item".to_string(),
        ..DocumentFields::default()
    };
    let root = ConfigNode::new("TechTree").with_node(
        ConfigNode::new("Node")
            .with_value("id", "custom")
            .with_node(ConfigNode::new("Gives").with_value("item", "A")),
    );
    let tree = TreeDocument::new("custom", root);

    let mut world = scenario_world();
    let reconciler = Reconciler::new(fields, ReconcileOptions::default());
    let report = world.apply(&reconciler, &tree).unwrap();
    assert_eq!(world.part_tag("A"), Some("custom"));
    assert_eq!(report.retagged_parts, 1);
}
