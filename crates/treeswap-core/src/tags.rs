//! Tag stores: the catalogs whose required-unlock tags the engine rewrites.
//!
//! The engine only ever needs to read and write a tag by name, so both
//! catalogs are reached through the [`TagStore`] capability. The two
//! backends differ in how a write lands:
//!
//! - [`PartCatalog`] holds mutable [`Part`] records and writes the
//!   `tech_required` field in place.
//! - [`UpgradeCatalog`] holds immutable [`PartUpgrade`] records; a write
//!   removes the record and inserts a rebuilt copy carrying the new tag.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::id::TechId;

// ---------------------------------------------------------------------------
// Capabilities
// ---------------------------------------------------------------------------

/// Read/write access to the required-unlock tag of named records.
pub trait TagStore {
    /// The current tag of `name`, or `None` if the store has no such record.
    fn read(&self, name: &str) -> Option<&TechId>;

    /// Replace the tag of `name`. Returns `false` if the record is unknown.
    fn write(&mut self, name: &str, tag: TechId) -> bool;

    fn contains(&self, name: &str) -> bool {
        self.read(name).is_some()
    }

    /// Every record name, sorted.
    fn names(&self) -> Vec<String>;
}

/// Access to the tag each record carries in its on-disk declaration, as
/// opposed to its current in-memory value.
pub trait BaselineSource {
    /// `(name, declared tag)` for every record. Records without an on-disk
    /// declaration report `None`.
    fn declared_tags(&self) -> Vec<(String, Option<TechId>)>;
}

// ---------------------------------------------------------------------------
// Parts (in-place backend)
// ---------------------------------------------------------------------------

/// A purchasable part.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Part {
    pub name: String,
    pub title: String,
    /// The node that must be reached before this part can be bought.
    pub tech_required: TechId,
    /// The tag from the part's definition file. `None` for synthetic parts
    /// that have no definition on disk.
    pub declared_tech_required: Option<TechId>,
    pub cost: Option<i32>,
}

impl Part {
    /// A part whose current tag equals its declared tag.
    pub fn new(name: impl Into<String>, tech_required: impl Into<TechId>) -> Self {
        let name = name.into();
        let tech_required = tech_required.into();
        Self {
            title: name.clone(),
            name,
            declared_tech_required: Some(tech_required.clone()),
            tech_required,
            cost: None,
        }
    }

    /// A part with no on-disk definition.
    pub fn synthetic(name: impl Into<String>, tech_required: impl Into<TechId>) -> Self {
        Self {
            declared_tech_required: None,
            ..Self::new(name, tech_required)
        }
    }
}

/// The loaded part catalog, keyed by part name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PartCatalog {
    parts: HashMap<String, Part>,
}

impl PartCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a part, returning any previous record with the same name.
    pub fn insert(&mut self, part: Part) -> Option<Part> {
        self.parts.insert(part.name.clone(), part)
    }

    pub fn get(&self, name: &str) -> Option<&Part> {
        self.parts.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Part> {
        self.parts.get_mut(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<Part> {
        self.parts.remove(name)
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Part> {
        self.parts.values()
    }
}

impl FromIterator<Part> for PartCatalog {
    fn from_iter<I: IntoIterator<Item = Part>>(iter: I) -> Self {
        let mut catalog = PartCatalog::new();
        for part in iter {
            catalog.insert(part);
        }
        catalog
    }
}

impl TagStore for PartCatalog {
    fn read(&self, name: &str) -> Option<&TechId> {
        self.parts.get(name).map(|p| &p.tech_required)
    }

    fn write(&mut self, name: &str, tag: TechId) -> bool {
        match self.parts.get_mut(name) {
            Some(part) => {
                part.tech_required = tag;
                true
            }
            None => false,
        }
    }

    fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.parts.keys().cloned().collect();
        names.sort();
        names
    }
}

impl BaselineSource for PartCatalog {
    fn declared_tags(&self) -> Vec<(String, Option<TechId>)> {
        let mut tags: Vec<_> = self
            .parts
            .values()
            .map(|p| (p.name.clone(), p.declared_tech_required.clone()))
            .collect();
        tags.sort_by(|a, b| a.0.cmp(&b.0));
        tags
    }
}

// ---------------------------------------------------------------------------
// Upgrades (remove/re-insert backend)
// ---------------------------------------------------------------------------

/// A part upgrade. Records are immutable once built; changing the tag
/// produces a new record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartUpgrade {
    name: String,
    title: String,
    tech_required: TechId,
    declared_tech_required: Option<TechId>,
}

impl PartUpgrade {
    pub fn new(name: impl Into<String>, tech_required: impl Into<TechId>) -> Self {
        let name = name.into();
        let tech_required = tech_required.into();
        Self {
            title: name.clone(),
            name,
            declared_tech_required: Some(tech_required.clone()),
            tech_required,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Drop the on-disk declaration, marking the upgrade as synthetic.
    pub fn without_declaration(mut self) -> Self {
        self.declared_tech_required = None;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn tech_required(&self) -> &TechId {
        &self.tech_required
    }

    pub fn declared_tech_required(&self) -> Option<&TechId> {
        self.declared_tech_required.as_ref()
    }

    /// A copy of this record carrying `tag`.
    fn retagged(self, tag: TechId) -> Self {
        Self {
            tech_required: tag,
            ..self
        }
    }
}

/// The loaded upgrade catalog, keyed by upgrade name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpgradeCatalog {
    upgrades: HashMap<String, PartUpgrade>,
}

impl UpgradeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, upgrade: PartUpgrade) -> Option<PartUpgrade> {
        self.upgrades.insert(upgrade.name.clone(), upgrade)
    }

    pub fn remove(&mut self, name: &str) -> Option<PartUpgrade> {
        self.upgrades.remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&PartUpgrade> {
        self.upgrades.get(name)
    }

    pub fn len(&self) -> usize {
        self.upgrades.len()
    }

    pub fn is_empty(&self) -> bool {
        self.upgrades.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PartUpgrade> {
        self.upgrades.values()
    }
}

impl FromIterator<PartUpgrade> for UpgradeCatalog {
    fn from_iter<I: IntoIterator<Item = PartUpgrade>>(iter: I) -> Self {
        let mut catalog = UpgradeCatalog::new();
        for upgrade in iter {
            catalog.insert(upgrade);
        }
        catalog
    }
}

impl TagStore for UpgradeCatalog {
    fn read(&self, name: &str) -> Option<&TechId> {
        self.upgrades.get(name).map(|u| &u.tech_required)
    }

    fn write(&mut self, name: &str, tag: TechId) -> bool {
        let Some(upgrade) = self.remove(name) else {
            return false;
        };
        self.insert(upgrade.retagged(tag));
        true
    }

    fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.upgrades.keys().cloned().collect();
        names.sort();
        names
    }
}

impl BaselineSource for UpgradeCatalog {
    fn declared_tags(&self) -> Vec<(String, Option<TechId>)> {
        let mut tags: Vec<_> = self
            .upgrades
            .values()
            .map(|u| (u.name.clone(), u.declared_tech_required.clone()))
            .collect();
        tags.sort_by(|a, b| a.0.cmp(&b.0));
        tags
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // -----------------------------------------------------------------------
    // PartCatalog
    // -----------------------------------------------------------------------

    #[test]
    fn part_write_is_in_place() {
        let mut catalog: PartCatalog = [Part::new("mk1pod", "start")].into_iter().collect();
        assert!(catalog.write("mk1pod", TechId::from("basicRocketry")));
        let part = catalog.get("mk1pod").unwrap();
        assert_eq!(part.tech_required, "basicRocketry");
        // The declaration is untouched by writes.
        assert_eq!(part.declared_tech_required, Some(TechId::from("start")));
    }

    #[test]
    fn part_write_unknown_returns_false() {
        let mut catalog = PartCatalog::new();
        assert!(!catalog.write("ghost", TechId::from("start")));
        assert!(!catalog.contains("ghost"));
    }

    #[test]
    fn part_names_are_sorted() {
        let catalog: PartCatalog = [Part::new("b", "x"), Part::new("a", "x"), Part::new("c", "x")]
            .into_iter()
            .collect();
        assert_eq!(catalog.names(), vec!["a", "b", "c"]);
    }

    #[test]
    fn part_declared_tags_skip_nothing_but_mark_synthetic() {
        let catalog: PartCatalog = [Part::new("a", "start"), Part::synthetic("kerbalEVA", "start")]
            .into_iter()
            .collect();
        let tags = catalog.declared_tags();
        assert_eq!(tags[0], ("a".to_string(), Some(TechId::from("start"))));
        assert_eq!(tags[1], ("kerbalEVA".to_string(), None));
    }

    // -----------------------------------------------------------------------
    // UpgradeCatalog
    // -----------------------------------------------------------------------

    #[test]
    fn upgrade_write_reinserts_record() {
        let mut catalog: UpgradeCatalog = [PartUpgrade::new("engine.Upgrade1", "start").with_title("Better Engines")]
            .into_iter()
            .collect();
        assert!(catalog.write("engine.Upgrade1", TechId::from("propulsion")));
        assert_eq!(catalog.len(), 1);
        let upgrade = catalog.get("engine.Upgrade1").unwrap();
        assert_eq!(upgrade.tech_required(), &TechId::from("propulsion"));
        assert_eq!(upgrade.title(), "Better Engines");
        assert_eq!(upgrade.declared_tech_required(), Some(&TechId::from("start")));
    }

    #[test]
    fn upgrade_write_unknown_returns_false() {
        let mut catalog = UpgradeCatalog::new();
        assert!(!catalog.write("ghost", TechId::from("start")));
        assert!(catalog.is_empty());
    }

    #[test]
    fn upgrade_without_declaration() {
        let upgrade = PartUpgrade::new("u", "start").without_declaration();
        assert_eq!(upgrade.declared_tech_required(), None);
        assert_eq!(upgrade.tech_required(), &TechId::from("start"));
    }
}
