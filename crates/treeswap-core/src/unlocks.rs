//! Extraction of the part and upgrade names a node declaration unlocks.

use crate::document::ConfigNode;

/// Names unlocked by one node declaration, normalized and in declared order.
/// Duplicates within a node are kept as authored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnlockSet {
    pub parts: Vec<String>,
    pub upgrades: Vec<String>,
}

impl UnlockSet {
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty() && self.upgrades.is_empty()
    }

    pub fn len(&self) -> usize {
        self.parts.len() + self.upgrades.len()
    }
}

/// Rewrite a declared name into the catalog's key format. Names are declared
/// with underscores because dots are not safe in config syntax.
pub fn normalize_name(raw: &str) -> String {
    raw.replace('_', ".")
}

/// Collect what `node` unlocks from its `unlocks_node` child. A node without
/// that child unlocks nothing.
pub fn extract_unlocks(
    node: &ConfigNode,
    unlocks_node: &str,
    part_field: &str,
    upgrade_field: &str,
) -> UnlockSet {
    let Some(unlocks) = node.get_node(unlocks_node) else {
        return UnlockSet::default();
    };

    UnlockSet {
        parts: unlocks.get_values(part_field).map(normalize_name).collect(),
        upgrades: unlocks.get_values(upgrade_field).map(normalize_name).collect(),
    }
}
