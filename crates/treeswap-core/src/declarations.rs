//! Declared trees and their presentation statistics.
//!
//! [`TreeDeclarationCatalog`] is what a selection dialog lists. It is built
//! once from every tree document and never consulted by reconciliation.

use serde::{Deserialize, Serialize};

use crate::document::{DocumentFields, TreeDocument};
use crate::tags::TagStore;

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// Inclusive upper cost bounds of the first two tiers. Anything above
/// `level2_max` is tier three.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostTiers {
    pub level1_max: i32,
    pub level2_max: i32,
}

impl Default for CostTiers {
    fn default() -> Self {
        Self {
            level1_max: 100,
            level2_max: 500,
        }
    }
}

/// The game's own tree. It is listed first and described from settings
/// rather than from its document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StockTree {
    pub url: String,
    pub title: String,
    pub description: String,
}

impl Default for StockTree {
    fn default() -> Self {
        Self {
            url: "GameData/Squad/Resources/TechTree.ron".to_string(),
            title: "Stock Tech Tree".to_string(),
            description: "The tech tree that ships with the game.".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Declarations
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeStats {
    /// Visible nodes.
    pub num_nodes: u32,
    pub total_cost: i64,
    pub level1: u32,
    pub level2: u32,
    pub level3: u32,
}

/// One selectable tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeIdentity {
    pub title: String,
    /// Stable key used for persistence and equality.
    pub url: String,
    pub description: String,
    pub stats: TreeStats,
}

/// Every declared tree, stock tree first.
#[derive(Debug, Clone, Default)]
pub struct TreeDeclarationCatalog {
    trees: Vec<TreeIdentity>,
}

impl TreeDeclarationCatalog {
    /// Describe every document in `documents`. `parts` decides whether a
    /// `hideEmpty` node has anything to show.
    pub fn build<'a>(
        documents: impl IntoIterator<Item = &'a TreeDocument>,
        fields: &DocumentFields,
        stock: &StockTree,
        tiers: &CostTiers,
        parts: &dyn TagStore,
    ) -> Self {
        let mut trees = Vec::new();
        for doc in documents {
            let (title, description, is_stock) = if doc.url() == stock.url {
                (stock.title.clone(), stock.description.clone(), true)
            } else {
                let title = doc
                    .title(fields)
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("Unnamed Tree ({})", doc.url()));
                let description = doc
                    .description(fields)
                    .unwrap_or("No description available.")
                    .to_string();
                (title, description, false)
            };

            let identity = TreeIdentity {
                title,
                url: doc.url().to_string(),
                description,
                stats: tree_stats(doc, fields, tiers, parts),
            };
            tracing::debug!(url = %identity.url, nodes = identity.stats.num_nodes, "declared tree");

            if is_stock {
                trees.insert(0, identity);
            } else {
                trees.push(identity);
            }
        }
        Self { trees }
    }

    pub fn find(&self, url: &str) -> Option<&TreeIdentity> {
        self.trees.iter().find(|t| t.url == url)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TreeIdentity> {
        self.trees.iter()
    }

    pub fn as_slice(&self) -> &[TreeIdentity] {
        &self.trees
    }

    pub fn len(&self) -> usize {
        self.trees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trees.is_empty()
    }
}

/// Aggregate counts over the visible nodes of one tree.
pub fn tree_stats(
    doc: &TreeDocument,
    fields: &DocumentFields,
    tiers: &CostTiers,
    parts: &dyn TagStore,
) -> TreeStats {
    let mut stats = TreeStats::default();
    for node in doc.nodes(fields) {
        if node.hide_empty() && !node.unlocks().parts.iter().any(|p| parts.contains(p)) {
            continue;
        }
        stats.num_nodes += 1;

        let Some(cost) = node.cost() else { continue };
        stats.total_cost += i64::from(cost);
        if cost > tiers.level2_max {
            stats.level3 += 1;
        } else if cost > tiers.level1_max {
            stats.level2 += 1;
        } else {
            stats.level1 += 1;
        }
    }
    stats
}
