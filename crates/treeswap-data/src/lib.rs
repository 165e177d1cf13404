//! Treeswap Data -- on-disk game content for the reconciliation engine.
//!
//! A game directory holds `settings.*`, `parts.*`, an optional
//! `upgrades.*`, and a `GameData/` tree of config documents. Every data file
//! may be RON, TOML, or JSON; the format is picked from the extension.

pub mod catalog;
pub mod documents;
pub mod loader;
pub mod schema;
pub mod settings;

use std::path::Path;

use treeswap_core::declarations::TreeDeclarationCatalog;
use treeswap_core::tags::{PartCatalog, UpgradeCatalog};

pub use documents::{DocumentDatabase, load_documents};
pub use loader::DataLoadError;
pub use settings::{ScenarioFields, TreeSwapSettings, load_settings};

/// Everything loaded from one game directory.
#[derive(Debug, Clone)]
pub struct GameData {
    pub settings: TreeSwapSettings,
    pub documents: DocumentDatabase,
    pub parts: PartCatalog,
    pub upgrades: UpgradeCatalog,
}

impl GameData {
    /// Describe every tree in the document database for a selection list.
    pub fn declarations(&self) -> TreeDeclarationCatalog {
        let trees = self.documents.trees(&self.settings.fields);
        TreeDeclarationCatalog::build(
            &trees,
            &self.settings.fields,
            &self.settings.stock_tree,
            &self.settings.cost_tiers,
            &self.parts,
        )
    }
}

/// Load settings, catalogs and documents from `dir`.
pub fn load_game_data(dir: &Path) -> Result<GameData, DataLoadError> {
    let settings = load_settings(dir)?;
    let parts = catalog::load_parts(dir)?;
    let upgrades = catalog::load_upgrades(dir)?;
    let documents = load_documents(dir)?;
    tracing::info!(
        dir = %dir.display(),
        parts = parts.len(),
        upgrades = upgrades.len(),
        documents = documents.len(),
        "loaded game data"
    );
    Ok(GameData {
        settings,
        documents,
        parts,
        upgrades,
    })
}
