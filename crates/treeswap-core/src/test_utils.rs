//! Shared test helpers for integration tests and benchmarks.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]` so these helpers
//! are available in unit tests, integration tests, and benchmarks (via the
//! `test-utils` feature).

use crate::baseline::OriginalTagRegistry;
use crate::document::{ConfigNode, TreeDocument};
use crate::id::TechId;
use crate::ledger::ResearchLedger;
use crate::reconcile::{ReconcileError, ReconcileReport, Reconciler, Stores};
use crate::tags::{Part, PartCatalog, PartUpgrade, TagStore, UpgradeCatalog};

// ===========================================================================
// Document builders
// ===========================================================================

/// An `RDNode` declaration with the default field names.
pub fn rd_node(id: &str, cost: i32, parts: &[&str], upgrades: &[&str]) -> ConfigNode {
    let mut unlocks = ConfigNode::new("Unlocks");
    for p in parts {
        unlocks.add_value("part", *p);
    }
    for u in upgrades {
        unlocks.add_value("upgrade", *u);
    }
    ConfigNode::new("RDNode")
        .with_value("id", id)
        .with_value("cost", cost.to_string())
        .with_node(unlocks)
}

/// A tree with `unlockAllStartParts = True`.
pub fn tree_doc(url: &str, nodes: Vec<ConfigNode>) -> TreeDocument {
    let mut root = ConfigNode::new("TechTree")
        .with_value("title", url)
        .with_value("unlockAllStartParts", "True");
    for node in nodes {
        root.add_node(node);
    }
    TreeDocument::new(url, root)
}

// ===========================================================================
// Catalog builders
// ===========================================================================

pub fn part_catalog(parts: &[(&str, &str)]) -> PartCatalog {
    parts.iter().map(|(name, tag)| Part::new(*name, *tag)).collect()
}

pub fn upgrade_catalog(upgrades: &[(&str, &str)]) -> UpgradeCatalog {
    upgrades
        .iter()
        .map(|(name, tag)| PartUpgrade::new(*name, *tag))
        .collect()
}

// ===========================================================================
// World
// ===========================================================================

/// Every store a reconciliation touches, owned together.
#[derive(Debug, Clone, Default)]
pub struct TestWorld {
    pub parts: PartCatalog,
    pub upgrades: UpgradeCatalog,
    pub ledger: ResearchLedger,
    pub registry: OriginalTagRegistry,
}

impl TestWorld {
    pub fn new(parts: PartCatalog, upgrades: UpgradeCatalog) -> Self {
        Self {
            parts,
            upgrades,
            ..Self::default()
        }
    }

    pub fn apply(
        &mut self,
        reconciler: &Reconciler,
        tree: &TreeDocument,
    ) -> Result<ReconcileReport, ReconcileError> {
        reconciler.apply(
            &mut self.registry,
            Some(tree),
            Stores {
                parts: &mut self.parts,
                upgrades: &mut self.upgrades,
                ledger: Some(&mut self.ledger),
            },
        )
    }

    /// Current tag of a part, as a plain string.
    pub fn part_tag(&self, name: &str) -> Option<&str> {
        self.parts.read(name).map(TechId::as_str)
    }

    pub fn upgrade_tag(&self, name: &str) -> Option<&str> {
        self.upgrades.read(name).map(TechId::as_str)
    }

    /// Sorted `(part, tag)` pairs for comparing whole catalogs.
    pub fn part_tags(&self) -> Vec<(String, String)> {
        self.parts
            .names()
            .into_iter()
            .filter_map(|name| {
                let tag = self.parts.read(&name)?.to_string();
                Some((name, tag))
            })
            .collect()
    }
}

// ===========================================================================
// Canonical scenario
// ===========================================================================

/// Parts `A` and `B`, both tagged `root`.
pub fn scenario_world() -> TestWorld {
    TestWorld::new(
        part_catalog(&[("A", "root"), ("B", "root")]),
        UpgradeCatalog::new(),
    )
}

/// `n1 {cost 0, unlocks A}`.
pub fn scenario_tree1() -> TreeDocument {
    tree_doc("GameData/Tree1/tree.cfg", vec![rd_node("n1", 0, &["A"], &[])])
}

/// `n2 {cost 0, unlocks A, B}`.
pub fn scenario_tree2() -> TreeDocument {
    tree_doc("GameData/Tree2/tree.cfg", vec![rd_node("n2", 0, &["A", "B"], &[])])
}
