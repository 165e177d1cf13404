//! Tree reconciliation: switching the live catalog over to a new tree.
//!
//! [`Reconciler::apply`] runs one synchronous pass in a fixed order:
//!
//! 1. Reset every tag the registry holds a baseline for.
//! 2. Retag every part and upgrade each node declares to that node's id,
//!    registering the pre-overwrite tag as the baseline on first touch.
//! 3. For each declared node, drop purchased parts whose tag no longer
//!    points at the node, then grant the node's parts if it is a start node.
//! 4. Drop purchased parts from ledger entries the tree does not declare,
//!    since nothing can tag to those nodes any more.
//!
//! Step 3 depends on the tags written in step 2, so the two loops cannot be
//! merged. Per-name failures are reported as [`ReconcileWarning`]s and never
//! stop the pass; only a missing tree, a missing ledger, or a rejected tree
//! abort it, and they do so before anything is mutated.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::baseline::OriginalTagRegistry;
use crate::document::{DocumentFields, TreeDocument};
use crate::id::{TagKind, TechId};
use crate::ledger::TechLedger;
use crate::tags::TagStore;
use crate::unlocks::UnlockSet;
use crate::validation::{TreeIssue, ValidationMode, validate_tree};

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Which nodes have their parts granted for free.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum StartNodePolicy {
    /// No node is a start node.
    Disabled,
    /// Exactly the node with this id.
    ById(TechId),
    /// Every node with a declared cost of zero, provided the tree sets its
    /// `unlockAllStartParts` flag.
    #[default]
    ZeroCost,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileOptions {
    /// Master switch for granting start-node parts.
    pub auto_purchase: bool,
    pub start_nodes: StartNodePolicy,
    pub validation: ValidationMode,
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        Self {
            auto_purchase: true,
            start_nodes: StartNodePolicy::default(),
            validation: ValidationMode::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Inputs and outputs
// ---------------------------------------------------------------------------

/// The external stores one reconciliation mutates.
pub struct Stores<'a> {
    pub parts: &'a mut dyn TagStore,
    pub upgrades: &'a mut dyn TagStore,
    /// `None` when the session has no progress tracking to reconcile against.
    pub ledger: Option<&'a mut dyn TechLedger>,
}

/// A recoverable problem met during reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReconcileWarning {
    #[error("node {tech} unlocks unknown part {name}")]
    UnknownPart { tech: TechId, name: String },
    #[error("node {tech} unlocks unknown upgrade {name}")]
    UnknownUpgrade { tech: TechId, name: String },
    #[error("node declaration #{index} has no id")]
    MissingNodeId { index: usize },
    #[error(transparent)]
    Validation(TreeIssue),
}

/// What one reconciliation did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub url: String,
    pub reset_parts: usize,
    pub reset_upgrades: usize,
    pub retagged_parts: usize,
    pub retagged_upgrades: usize,
    pub purchases_removed: usize,
    pub parts_granted: usize,
    pub entries_created: usize,
    pub warnings: Vec<ReconcileWarning>,
}

impl ReconcileReport {
    fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
            ..Self::default()
        }
    }

    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// Conditions that abort a reconciliation before any mutation.
#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    #[error("no tree document to apply")]
    MissingTree,
    #[error("cannot apply {url}: progress ledger is unavailable")]
    LedgerUnavailable { url: String },
    #[error("tree {url} rejected with {} issue(s)", .issues.len())]
    InvalidTree { url: String, issues: Vec<TreeIssue> },
}

// ---------------------------------------------------------------------------
// Reconciler
// ---------------------------------------------------------------------------

/// A declared node as seen by the second loop.
struct PlannedNode {
    id: TechId,
    unlocks: UnlockSet,
    start: bool,
}

#[derive(Debug, Clone, Default)]
pub struct Reconciler {
    fields: DocumentFields,
    options: ReconcileOptions,
}

impl Reconciler {
    pub fn new(fields: DocumentFields, options: ReconcileOptions) -> Self {
        Self { fields, options }
    }

    pub fn fields(&self) -> &DocumentFields {
        &self.fields
    }

    pub fn options(&self) -> &ReconcileOptions {
        &self.options
    }

    /// Switch the stores over to `tree`.
    pub fn apply(
        &self,
        registry: &mut OriginalTagRegistry,
        tree: Option<&TreeDocument>,
        stores: Stores<'_>,
    ) -> Result<ReconcileReport, ReconcileError> {
        let Some(tree) = tree else {
            tracing::error!("no tree document to apply");
            return Err(ReconcileError::MissingTree);
        };
        let Stores {
            parts,
            upgrades,
            ledger,
        } = stores;
        let Some(ledger) = ledger else {
            tracing::error!(url = tree.url(), "progress ledger is unavailable, tree not applied");
            return Err(ReconcileError::LedgerUnavailable {
                url: tree.url().to_string(),
            });
        };

        let span = tracing::info_span!("reconcile", url = tree.url());
        let _enter = span.enter();
        let mut report = ReconcileReport::new(tree.url());

        let issues = validate_tree(tree, &self.fields);
        if !issues.is_empty() {
            match self.options.validation {
                ValidationMode::Reject => {
                    for issue in &issues {
                        tracing::error!(%issue, "invalid tree");
                    }
                    return Err(ReconcileError::InvalidTree {
                        url: tree.url().to_string(),
                        issues,
                    });
                }
                ValidationMode::Warn => {
                    for issue in issues {
                        tracing::warn!(%issue, "tree issue");
                        report.warnings.push(ReconcileWarning::Validation(issue));
                    }
                }
            }
        }

        // Reset.
        report.reset_parts = registry.reset_all(TagKind::Part, parts);
        report.reset_upgrades = registry.reset_all(TagKind::Upgrade, upgrades);
        tracing::debug!(
            parts = report.reset_parts,
            upgrades = report.reset_upgrades,
            "restored baseline tags"
        );

        // Reassignment.
        let zero_cost_grants = tree.unlock_all_start_parts(&self.fields);
        let mut plan = Vec::new();
        for (index, node) in tree.nodes(&self.fields).enumerate() {
            let Some(id) = node.id() else {
                tracing::warn!(index, "node declaration has no id, skipping it");
                report.warnings.push(ReconcileWarning::MissingNodeId { index });
                continue;
            };
            let unlocks = node.unlocks();
            tracing::trace!(node = %id, parts = unlocks.parts.len(), upgrades = unlocks.upgrades.len(), "retagging node");

            for name in &unlocks.parts {
                if retag(registry, TagKind::Part, parts, &id, name) {
                    report.retagged_parts += 1;
                } else {
                    tracing::warn!(node = %id, part = %name, "unknown part");
                    report.warnings.push(ReconcileWarning::UnknownPart {
                        tech: id.clone(),
                        name: name.clone(),
                    });
                }
            }
            for name in &unlocks.upgrades {
                if retag(registry, TagKind::Upgrade, upgrades, &id, name) {
                    report.retagged_upgrades += 1;
                } else {
                    tracing::warn!(node = %id, upgrade = %name, "unknown upgrade");
                    report.warnings.push(ReconcileWarning::UnknownUpgrade {
                        tech: id.clone(),
                        name: name.clone(),
                    });
                }
            }

            let start = self.is_start_node(&id, node.cost(), zero_cost_grants);
            plan.push(PlannedNode { id, unlocks, start });
        }

        // Ledger cleanup and start-node grants.
        for node in &plan {
            report.purchases_removed += clean_entry(ledger, parts, &node.id);

            if !(self.options.auto_purchase && node.start) {
                continue;
            }
            for name in &node.unlocks.parts {
                match parts.read(name) {
                    None => {
                        // Already reported by the reassignment loop.
                        tracing::debug!(node = %node.id, part = %name, "cannot grant unknown part");
                        continue;
                    }
                    Some(tag) if tag != &node.id => {
                        tracing::debug!(node = %node.id, part = %name, tag = %tag, "part tagged to another node, not granted");
                        continue;
                    }
                    Some(_) => {}
                }
                if ledger.get(&node.id).is_none() {
                    ledger.create_and_register(node.id.clone());
                    report.entries_created += 1;
                    tracing::debug!(node = %node.id, "created ledger entry");
                }
                let Some(entry) = ledger.get_mut(&node.id) else {
                    continue;
                };
                if entry.purchase(name) {
                    report.parts_granted += 1;
                    tracing::trace!(node = %node.id, part = %name, "granted start part");
                }
            }
        }

        // Entries for nodes this tree does not declare.
        let declared: HashSet<&TechId> = plan.iter().map(|n| &n.id).collect();
        for id in ledger.tech_ids() {
            if !declared.contains(&id) {
                report.purchases_removed += clean_entry(ledger, parts, &id);
            }
        }

        tracing::info!(
            retagged_parts = report.retagged_parts,
            retagged_upgrades = report.retagged_upgrades,
            purchases_removed = report.purchases_removed,
            parts_granted = report.parts_granted,
            warnings = report.warnings.len(),
            "tree applied"
        );
        Ok(report)
    }

    fn is_start_node(&self, id: &TechId, cost: Option<i32>, zero_cost_grants: bool) -> bool {
        match &self.options.start_nodes {
            StartNodePolicy::Disabled => false,
            StartNodePolicy::ById(start) => start == id,
            StartNodePolicy::ZeroCost => zero_cost_grants && cost == Some(0),
        }
    }
}

/// Point `name` at `id`, capturing its current tag as the baseline first.
/// Returns `false` if the store has no such record.
fn retag(
    registry: &mut OriginalTagRegistry,
    kind: TagKind,
    store: &mut dyn TagStore,
    id: &TechId,
    name: &str,
) -> bool {
    let Some(current) = store.read(name) else {
        return false;
    };
    registry.register_if_absent(kind, name, current);
    store.write(name, id.clone())
}

/// Remove purchases under `id` whose part no longer tags to `id`.
fn clean_entry(ledger: &mut dyn TechLedger, parts: &dyn TagStore, id: &TechId) -> usize {
    let Some(entry) = ledger.get_mut(id) else {
        return 0;
    };
    let removed = entry.retain(|part| parts.read(part) == Some(id));
    for part in &removed {
        tracing::debug!(node = %id, part = %part, "removed stale purchase");
    }
    removed.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::ConfigNode;
    use crate::ledger::{LedgerEntry, ResearchLedger, TechState};
    use crate::tags::{Part, PartCatalog, PartUpgrade, UpgradeCatalog};

    fn rd(id: &str, cost: &str, parts: &[&str], upgrades: &[&str]) -> ConfigNode {
        let mut unlocks = ConfigNode::new("Unlocks");
        for p in parts {
            unlocks.add_value("part", *p);
        }
        for u in upgrades {
            unlocks.add_value("upgrade", *u);
        }
        ConfigNode::new("RDNode")
            .with_value("id", id)
            .with_value("cost", cost)
            .with_node(unlocks)
    }

    fn tree(url: &str, nodes: Vec<ConfigNode>) -> TreeDocument {
        let mut root = ConfigNode::new("TechTree").with_value("unlockAllStartParts", "true");
        for n in nodes {
            root.add_node(n);
        }
        TreeDocument::new(url, root)
    }

    struct World {
        parts: PartCatalog,
        upgrades: UpgradeCatalog,
        ledger: ResearchLedger,
        registry: OriginalTagRegistry,
    }

    impl World {
        fn new() -> Self {
            Self {
                parts: [Part::new("A", "root"), Part::new("B", "root")].into_iter().collect(),
                upgrades: [PartUpgrade::new("U", "root")].into_iter().collect(),
                ledger: ResearchLedger::new(),
                registry: OriginalTagRegistry::new(),
            }
        }

        fn apply(&mut self, r: &Reconciler, t: &TreeDocument) -> Result<ReconcileReport, ReconcileError> {
            r.apply(
                &mut self.registry,
                Some(t),
                Stores {
                    parts: &mut self.parts,
                    upgrades: &mut self.upgrades,
                    ledger: Some(&mut self.ledger),
                },
            )
        }

        fn tag(&self, name: &str) -> &str {
            self.parts.read(name).map(|t| t.as_str()).unwrap_or("<missing>")
        }
    }

    // -----------------------------------------------------------------------
    // Preconditions
    // -----------------------------------------------------------------------

    #[test]
    fn missing_tree_aborts() {
        let mut w = World::new();
        let result = Reconciler::default().apply(
            &mut w.registry,
            None,
            Stores {
                parts: &mut w.parts,
                upgrades: &mut w.upgrades,
                ledger: Some(&mut w.ledger),
            },
        );
        assert!(matches!(result, Err(ReconcileError::MissingTree)));
    }

    #[test]
    fn missing_ledger_aborts_without_mutation() {
        let mut w = World::new();
        let t = tree("t1", vec![rd("n1", "0", &["A"], &[])]);
        let result = Reconciler::default().apply(
            &mut w.registry,
            Some(&t),
            Stores {
                parts: &mut w.parts,
                upgrades: &mut w.upgrades,
                ledger: None,
            },
        );
        assert!(matches!(result, Err(ReconcileError::LedgerUnavailable { .. })));
        assert_eq!(w.tag("A"), "root");
        assert!(w.registry.is_empty());
    }

    #[test]
    fn reject_mode_aborts_on_conflicting_claims() {
        let mut w = World::new();
        let t = tree("t1", vec![rd("n1", "5", &["A"], &[]), rd("n2", "5", &["A"], &[])]);
        let r = Reconciler::new(
            DocumentFields::default(),
            ReconcileOptions {
                validation: ValidationMode::Reject,
                ..ReconcileOptions::default()
            },
        );
        let err = w.apply(&r, &t).unwrap_err();
        match err {
            ReconcileError::InvalidTree { url, issues } => {
                assert_eq!(url, "t1");
                assert_eq!(issues.len(), 1);
            }
            other => panic!("unexpected error {other}"),
        }
        assert_eq!(w.tag("A"), "root");
    }

    #[test]
    fn warn_mode_applies_and_records_issue() {
        let mut w = World::new();
        let t = tree("t1", vec![rd("n1", "5", &["A"], &[]), rd("n2", "5", &["A"], &[])]);
        let report = w.apply(&Reconciler::default(), &t).unwrap();
        assert!(matches!(report.warnings[0], ReconcileWarning::Validation(_)));
        // The later claim wins.
        assert_eq!(w.tag("A"), "n2");
    }

    #[test]
    fn start_node_does_not_grant_part_claimed_later() {
        let mut w = World::new();
        let t = tree("t1", vec![rd("n1", "0", &["A", "B"], &[]), rd("n2", "5", &["A"], &[])]);
        let report = w.apply(&Reconciler::default(), &t).unwrap();
        assert!(matches!(
            report.warnings[0],
            ReconcileWarning::Validation(TreeIssue::ConflictingClaim { .. })
        ));
        assert_eq!(w.tag("A"), "n2");
        let entry = w.ledger.get(&TechId::from("n1")).unwrap();
        assert_eq!(entry.parts_purchased(), &["B".to_string()]);
        assert_eq!(report.parts_granted, 1);
        for id in w.ledger.tech_ids() {
            for part in w.ledger.get(&id).unwrap().parts_purchased() {
                assert_eq!(w.parts.read(part), Some(&id));
            }
        }
    }

    // -----------------------------------------------------------------------
    // Reassignment
    // -----------------------------------------------------------------------

    #[test]
    fn retags_parts_and_upgrades() {
        let mut w = World::new();
        let t = tree("t1", vec![rd("n1", "10", &["A"], &["U"])]);
        let report = w.apply(&Reconciler::default(), &t).unwrap();
        assert_eq!(w.tag("A"), "n1");
        assert_eq!(w.tag("B"), "root");
        assert_eq!(w.upgrades.read("U"), Some(&TechId::from("n1")));
        assert_eq!(report.retagged_parts, 1);
        assert_eq!(report.retagged_upgrades, 1);
        assert!(report.is_clean());
    }

    #[test]
    fn first_touch_captures_baseline() {
        let mut w = World::new();
        let t = tree("t1", vec![rd("n1", "10", &["A"], &["U"])]);
        w.apply(&Reconciler::default(), &t).unwrap();
        assert_eq!(w.registry.get_original(TagKind::Part, "A"), Some(&TechId::from("root")));
        assert_eq!(w.registry.get_original(TagKind::Upgrade, "U"), Some(&TechId::from("root")));
        assert!(w.registry.get_original(TagKind::Part, "B").is_none());
    }

    #[test]
    fn unknown_names_warn_and_continue() {
        let mut w = World::new();
        let t = tree("t1", vec![rd("n1", "10", &["ghost", "A"], &["nope"])]);
        let report = w.apply(&Reconciler::default(), &t).unwrap();
        assert_eq!(w.tag("A"), "n1");
        assert_eq!(
            report.warnings,
            vec![
                ReconcileWarning::UnknownPart {
                    tech: TechId::from("n1"),
                    name: "ghost".to_string()
                },
                ReconcileWarning::UnknownUpgrade {
                    tech: TechId::from("n1"),
                    name: "nope".to_string()
                },
            ]
        );
    }

    #[test]
    fn node_without_id_is_skipped() {
        let mut w = World::new();
        let mut t = tree("t1", vec![rd("n1", "10", &["A"], &[])]);
        t = TreeDocument::new(
            "t1",
            t.root().clone().with_node(ConfigNode::new("RDNode").with_value("cost", "1")),
        );
        let report = w.apply(&Reconciler::default(), &t).unwrap();
        assert_eq!(report.warnings, vec![ReconcileWarning::MissingNodeId { index: 1 }]);
        assert_eq!(w.tag("A"), "n1");
    }

    // -----------------------------------------------------------------------
    // Ledger
    // -----------------------------------------------------------------------

    #[test]
    fn zero_cost_nodes_are_granted() {
        let mut w = World::new();
        let t = tree("t1", vec![rd("n1", "0", &["A", "ghost"], &[]), rd("n2", "5", &["B"], &[])]);
        let report = w.apply(&Reconciler::default(), &t).unwrap();
        let entry = w.ledger.get(&TechId::from("n1")).unwrap();
        assert_eq!(entry.parts_purchased(), &["A".to_string()]);
        assert_eq!(entry.state, TechState::Available);
        assert!(w.ledger.get(&TechId::from("n2")).is_none());
        assert_eq!(report.entries_created, 1);
        assert_eq!(report.parts_granted, 1);
    }

    #[test]
    fn zero_cost_needs_tree_flag() {
        let mut w = World::new();
        let root = ConfigNode::new("TechTree").with_node(rd("n1", "0", &["A"], &[]));
        let t = TreeDocument::new("t1", root);
        w.apply(&Reconciler::default(), &t).unwrap();
        assert!(w.ledger.is_empty());
    }

    #[test]
    fn start_node_by_id() {
        let mut w = World::new();
        let t = tree("t1", vec![rd("n1", "0", &["A"], &[]), rd("first", "50", &["B"], &[])]);
        let r = Reconciler::new(
            DocumentFields::default(),
            ReconcileOptions {
                start_nodes: StartNodePolicy::ById(TechId::from("first")),
                ..ReconcileOptions::default()
            },
        );
        w.apply(&r, &t).unwrap();
        assert!(w.ledger.get(&TechId::from("n1")).is_none());
        assert!(w.ledger.get(&TechId::from("first")).unwrap().contains("B"));
    }

    #[test]
    fn auto_purchase_off_grants_nothing() {
        let mut w = World::new();
        let t = tree("t1", vec![rd("n1", "0", &["A"], &[])]);
        let r = Reconciler::new(
            DocumentFields::default(),
            ReconcileOptions {
                auto_purchase: false,
                ..ReconcileOptions::default()
            },
        );
        w.apply(&r, &t).unwrap();
        assert!(w.ledger.is_empty());
        assert_eq!(w.tag("A"), "n1");
    }

    #[test]
    fn stale_purchases_are_removed() {
        let mut w = World::new();
        let mut entry = LedgerEntry::new(TechId::from("n1"), TechState::Available);
        entry.purchase("A");
        entry.purchase("B");
        entry.purchase("removedPart");
        w.ledger.insert(entry);

        let t = tree("t1", vec![rd("n1", "10", &["A"], &[]), rd("n2", "10", &["B"], &[])]);
        let report = w.apply(&Reconciler::default(), &t).unwrap();
        let entry = w.ledger.get(&TechId::from("n1")).unwrap();
        assert_eq!(entry.parts_purchased(), &["A".to_string()]);
        assert_eq!(report.purchases_removed, 2);
    }

    #[test]
    fn undeclared_entries_are_cleaned() {
        let mut w = World::new();
        let mut entry = LedgerEntry::new(TechId::from("old"), TechState::Available);
        entry.purchase("A");
        w.ledger.insert(entry);

        let t = tree("t1", vec![rd("n1", "10", &["A"], &[])]);
        w.apply(&Reconciler::default(), &t).unwrap();
        assert!(w.ledger.get(&TechId::from("old")).unwrap().parts_purchased().is_empty());
    }

    #[test]
    fn switching_trees_restores_baseline() {
        let mut w = World::new();
        let r = Reconciler::default();
        let t1 = tree("t1", vec![rd("n1", "0", &["A"], &[])]);
        let t2 = tree("t2", vec![rd("n2", "0", &["A", "B"], &[])]);

        w.apply(&r, &t1).unwrap();
        assert_eq!((w.tag("A"), w.tag("B")), ("n1", "root"));

        w.apply(&r, &t2).unwrap();
        assert_eq!((w.tag("A"), w.tag("B")), ("n2", "n2"));
        let n2 = w.ledger.get(&TechId::from("n2")).unwrap();
        assert!(n2.contains("A") && n2.contains("B"));

        w.apply(&r, &t1).unwrap();
        assert_eq!((w.tag("A"), w.tag("B")), ("n1", "root"));
        assert!(w.ledger.get(&TechId::from("n2")).unwrap().parts_purchased().is_empty());
        assert!(w.ledger.get(&TechId::from("n1")).unwrap().contains("A"));
    }
}
