use std::path::Path;

use treeswap_core::baseline::{BaselineStrategy, OriginalTagRegistry};
use treeswap_core::declarations::TreeDeclarationCatalog;
use treeswap_core::id::TagKind;
use treeswap_core::reconcile::{ReconcileError, ReconcileReport, Reconciler};
use treeswap_core::tags::{PartCatalog, UpgradeCatalog};
use treeswap_data::{DocumentDatabase, GameData, TreeSwapSettings};

use crate::error::SessionError;
use crate::game::GameSession;

/// Process-lifetime services: settings, documents, the declaration list
/// and the baseline registry. Built once and passed to whoever needs them.
pub struct TreeSwapServices {
    settings: TreeSwapSettings,
    documents: DocumentDatabase,
    declarations: TreeDeclarationCatalog,
    registry: OriginalTagRegistry,
    reconciler: Reconciler,
}

impl TreeSwapServices {
    /// Build the services. The catalogs are only read: to decide which
    /// hidden nodes count in the declaration stats, and for eager baseline
    /// capture.
    pub fn new(
        settings: TreeSwapSettings,
        documents: DocumentDatabase,
        parts: &PartCatalog,
        upgrades: &UpgradeCatalog,
    ) -> Self {
        let trees = documents.trees(&settings.fields);
        let declarations = TreeDeclarationCatalog::build(
            &trees,
            &settings.fields,
            &settings.stock_tree,
            &settings.cost_tiers,
            parts,
        );

        let mut registry = OriginalTagRegistry::new();
        if settings.baseline == BaselineStrategy::Eager {
            let captured_parts = registry.capture_eager(TagKind::Part, parts);
            let captured_upgrades = registry.capture_eager(TagKind::Upgrade, upgrades);
            tracing::info!(
                parts = captured_parts,
                upgrades = captured_upgrades,
                "captured baseline tags"
            );
        }

        let reconciler = settings.reconciler();
        Self {
            settings,
            documents,
            declarations,
            registry,
            reconciler,
        }
    }

    /// Split loaded game data into services and the session catalogs.
    pub fn from_game_data(data: GameData) -> (Self, PartCatalog, UpgradeCatalog) {
        let GameData {
            settings,
            documents,
            parts,
            upgrades,
        } = data;
        let services = Self::new(settings, documents, &parts, &upgrades);
        (services, parts, upgrades)
    }

    /// Load a game directory and build services from it.
    pub fn load(dir: &Path) -> Result<(Self, PartCatalog, UpgradeCatalog), SessionError> {
        let data = treeswap_data::load_game_data(dir).map_err(|source| SessionError::DataLoad {
            dir: dir.to_path_buf(),
            source,
        })?;
        Ok(Self::from_game_data(data))
    }

    pub fn settings(&self) -> &TreeSwapSettings {
        &self.settings
    }

    pub fn documents(&self) -> &DocumentDatabase {
        &self.documents
    }

    pub fn declarations(&self) -> &TreeDeclarationCatalog {
        &self.declarations
    }

    pub fn registry(&self) -> &OriginalTagRegistry {
        &self.registry
    }

    /// Reconcile `session` against the tree at `url`.
    pub fn apply_tree(
        &mut self,
        url: &str,
        session: &mut GameSession,
    ) -> Result<ReconcileReport, SessionError> {
        let tree = self.documents.tree(url, &self.settings.fields);
        self.reconciler
            .apply(&mut self.registry, tree.as_ref(), session.stores())
            .map_err(|e| match e {
                ReconcileError::MissingTree => SessionError::UnknownTree {
                    url: url.to_string(),
                },
                other => other.into(),
            })
    }
}
