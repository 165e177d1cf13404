//! Structural checks on a tree before it is applied.
//!
//! Reassignment assumes each node id appears once and each part or upgrade
//! is claimed by at most one node. Neither holds automatically for authored
//! documents, so [`validate_tree`] reports every violation it finds.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::document::{DocumentFields, TreeDocument};
use crate::id::{TagKind, TechId};

// ---------------------------------------------------------------------------
// Issue types
// ---------------------------------------------------------------------------

/// A structural problem in one tree.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TreeIssue {
    /// Two node declarations share an id.
    #[error("node id {id} is declared more than once")]
    DuplicateNodeId { id: TechId },
    /// One name is unlocked by two different nodes. The later claim wins
    /// during reassignment.
    #[error("{kind} {name} is claimed by both {first} and {second}")]
    ConflictingClaim {
        kind: TagKind,
        name: String,
        first: TechId,
        second: TechId,
    },
}

/// What the engine does when a tree has issues.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationMode {
    /// Log and record the issues, then apply the tree anyway.
    #[default]
    Warn,
    /// Refuse to apply the tree.
    Reject,
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Every issue in `tree`, in declaration order. Nodes without an id are
/// ignored here; the engine reports them separately.
pub fn validate_tree(tree: &TreeDocument, fields: &DocumentFields) -> Vec<TreeIssue> {
    let mut issues = Vec::new();
    let mut seen_ids: HashSet<TechId> = HashSet::new();
    let mut part_owner: HashMap<String, TechId> = HashMap::new();
    let mut upgrade_owner: HashMap<String, TechId> = HashMap::new();

    for node in tree.nodes(fields) {
        let Some(id) = node.id() else { continue };

        if !seen_ids.insert(id.clone()) {
            issues.push(TreeIssue::DuplicateNodeId { id: id.clone() });
        }

        let unlocks = node.unlocks();
        claim(&mut issues, &mut part_owner, TagKind::Part, &id, &unlocks.parts);
        claim(&mut issues, &mut upgrade_owner, TagKind::Upgrade, &id, &unlocks.upgrades);
    }

    issues
}

fn claim(
    issues: &mut Vec<TreeIssue>,
    owners: &mut HashMap<String, TechId>,
    kind: TagKind,
    id: &TechId,
    names: &[String],
) {
    for name in names {
        match owners.get(name) {
            // Repeats inside the same node are harmless.
            Some(owner) if owner == id => {}
            Some(owner) => issues.push(TreeIssue::ConflictingClaim {
                kind,
                name: name.clone(),
                first: owner.clone(),
                second: id.clone(),
            }),
            None => {
                owners.insert(name.clone(), id.clone());
            }
        }
    }
}
