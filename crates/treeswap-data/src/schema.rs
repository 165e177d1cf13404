//! Serde data file structs for the part and upgrade catalogs.
//!
//! These structs define the on-disk format of `parts.*` and `upgrades.*`.
//! They are deserialized from RON, JSON, or TOML data files and then turned
//! into catalog records by [`crate::catalog`].

use serde::Deserialize;
use treeswap_core::tags::{Part, PartUpgrade};

// ===========================================================================
// Parts
// ===========================================================================

/// A part definition in a data file.
#[derive(Debug, Clone, Deserialize)]
pub struct PartData {
    pub name: String,
    #[serde(default)]
    pub title: Option<String>,
    pub tech_required: String,
    #[serde(default)]
    pub cost: Option<i32>,
    /// Parts generated at runtime rather than read from a definition. They
    /// have no declared tag to recover.
    #[serde(default)]
    pub synthetic: bool,
}

impl PartData {
    pub fn into_part(self) -> Part {
        let mut part = if self.synthetic {
            Part::synthetic(self.name, self.tech_required)
        } else {
            Part::new(self.name, self.tech_required)
        };
        if let Some(title) = self.title {
            part.title = title;
        }
        part.cost = self.cost;
        part
    }
}

// ===========================================================================
// Upgrades
// ===========================================================================

/// A part upgrade definition in a data file.
#[derive(Debug, Clone, Deserialize)]
pub struct UpgradeData {
    pub name: String,
    #[serde(default)]
    pub title: Option<String>,
    pub tech_required: String,
    #[serde(default)]
    pub synthetic: bool,
}

impl UpgradeData {
    pub fn into_upgrade(self) -> PartUpgrade {
        let mut upgrade = PartUpgrade::new(self.name, self.tech_required);
        if let Some(title) = self.title {
            upgrade = upgrade.with_title(title);
        }
        if self.synthetic {
            upgrade = upgrade.without_declaration();
        }
        upgrade
    }
}
