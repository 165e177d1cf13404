//! A running game session: the stores a tree switch mutates.

use serde::{Deserialize, Serialize};

use treeswap_core::ledger::{ResearchLedger, TechLedger};
use treeswap_core::reconcile::Stores;
use treeswap_core::tags::{PartCatalog, UpgradeCatalog};

use crate::selection::ScenarioNode;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameMode {
    #[default]
    Career,
    Science,
    Sandbox,
}

impl GameMode {
    /// Whether the mode tracks unlock progress at all.
    pub fn has_tech_progression(self) -> bool {
        !matches!(self, GameMode::Sandbox)
    }
}

/// Session state. The catalogs come from game data each time the process
/// starts; the rest is persisted with the save.
#[derive(Debug, Clone)]
pub struct GameSession {
    pub mode: GameMode,
    pub parts: PartCatalog,
    pub upgrades: UpgradeCatalog,
    /// `None` when the mode has no progress tracking.
    pub ledger: Option<ResearchLedger>,
    pub scenario: ScenarioNode,
    /// The tree the game itself loads on startup.
    pub career_tree_url: String,
}

impl GameSession {
    /// A fresh save. Modes with progression start with an empty ledger.
    pub fn new(
        mode: GameMode,
        parts: PartCatalog,
        upgrades: UpgradeCatalog,
        career_tree_url: impl Into<String>,
    ) -> Self {
        Self {
            mode,
            parts,
            upgrades,
            ledger: mode.has_tech_progression().then(ResearchLedger::new),
            scenario: ScenarioNode::new(),
            career_tree_url: career_tree_url.into(),
        }
    }

    /// Borrow every store for one reconciliation.
    pub fn stores(&mut self) -> Stores<'_> {
        Stores {
            parts: &mut self.parts,
            upgrades: &mut self.upgrades,
            ledger: self.ledger.as_mut().map(|l| l as &mut dyn TechLedger),
        }
    }
}
