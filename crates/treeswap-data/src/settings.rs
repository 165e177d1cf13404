//! Settings file: `settings.{ron,toml,json}` in the game directory.
//!
//! Every field has a default, so a missing file or a partial one is fine.

use serde::{Deserialize, Serialize};
use std::path::Path;

use treeswap_core::baseline::BaselineStrategy;
use treeswap_core::declarations::{CostTiers, StockTree};
use treeswap_core::document::DocumentFields;
use treeswap_core::reconcile::{ReconcileOptions, Reconciler, StartNodePolicy};
use treeswap_core::validation::ValidationMode;

use crate::loader::{DataLoadError, deserialize_file, find_data_file};

/// Key names used to persist the tree selection in a save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioFields {
    pub tree_selected: String,
    pub tree_url: String,
}

impl Default for ScenarioFields {
    fn default() -> Self {
        Self {
            tree_selected: "treeSelected".to_string(),
            tree_url: "treeUrl".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeSwapSettings {
    /// When false the player is never asked; the career tree is applied.
    pub allow_tree_selection: bool,
    pub stock_tree: StockTree,
    pub cost_tiers: CostTiers,
    pub start_nodes: StartNodePolicy,
    /// Master switch for granting start-node parts.
    pub buy_start_parts: bool,
    pub baseline: BaselineStrategy,
    pub validation: ValidationMode,
    pub fields: DocumentFields,
    pub scenario: ScenarioFields,
}

impl Default for TreeSwapSettings {
    fn default() -> Self {
        Self {
            allow_tree_selection: true,
            stock_tree: StockTree::default(),
            cost_tiers: CostTiers::default(),
            start_nodes: StartNodePolicy::default(),
            buy_start_parts: true,
            baseline: BaselineStrategy::default(),
            validation: ValidationMode::default(),
            fields: DocumentFields::default(),
            scenario: ScenarioFields::default(),
        }
    }
}

impl TreeSwapSettings {
    pub fn reconcile_options(&self) -> ReconcileOptions {
        ReconcileOptions {
            auto_purchase: self.buy_start_parts,
            start_nodes: self.start_nodes.clone(),
            validation: self.validation,
        }
    }

    pub fn reconciler(&self) -> Reconciler {
        Reconciler::new(self.fields.clone(), self.reconcile_options())
    }
}

/// Load settings from `dir`, falling back to defaults when no file exists.
pub fn load_settings(dir: &Path) -> Result<TreeSwapSettings, DataLoadError> {
    match find_data_file(dir, "settings")? {
        Some(path) => {
            let settings: TreeSwapSettings = deserialize_file(&path)?;
            tracing::debug!(path = %path.display(), "loaded settings");
            Ok(settings)
        }
        None => {
            tracing::debug!(dir = %dir.display(), "no settings file, using defaults");
            Ok(TreeSwapSettings::default())
        }
    }
}
