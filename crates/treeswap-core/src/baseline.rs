//! Original-tag registry.
//!
//! Records the tag every part and upgrade carried before any tree was
//! applied, so a later reset can put the catalog back exactly. Each name is
//! registered at most once; later registrations are ignored.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::id::{TagKind, TechId};
use crate::tags::{BaselineSource, TagStore};

/// How the registry gets populated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BaselineStrategy {
    /// Capture a record's tag the first time the engine overwrites it.
    #[default]
    Lazy,
    /// Capture every record's declared tag once, up front.
    Eager,
}

/// Baseline tags, one table per tag kind.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OriginalTagRegistry {
    parts: HashMap<String, TechId>,
    upgrades: HashMap<String, TechId>,
}

impl OriginalTagRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn table(&self, kind: TagKind) -> &HashMap<String, TechId> {
        match kind {
            TagKind::Part => &self.parts,
            TagKind::Upgrade => &self.upgrades,
        }
    }

    fn table_mut(&mut self, kind: TagKind) -> &mut HashMap<String, TechId> {
        match kind {
            TagKind::Part => &mut self.parts,
            TagKind::Upgrade => &mut self.upgrades,
        }
    }

    /// Record `tag` as the baseline of `name` unless one is already held.
    /// Returns whether the tag was stored.
    pub fn register_if_absent(&mut self, kind: TagKind, name: &str, tag: &TechId) -> bool {
        let table = self.table_mut(kind);
        if table.contains_key(name) {
            return false;
        }
        table.insert(name.to_string(), tag.clone());
        true
    }

    pub fn get_original(&self, kind: TagKind, name: &str) -> Option<&TechId> {
        self.table(kind).get(name)
    }

    /// Write every held baseline of `kind` back into `store`. Names the store
    /// no longer has are skipped. Returns how many records were restored.
    pub fn reset_all(&self, kind: TagKind, store: &mut dyn TagStore) -> usize {
        let table = self.table(kind);
        let mut names: Vec<&String> = table.keys().collect();
        names.sort();

        let mut restored = 0;
        for name in names {
            let tag = &table[name];
            if store.write(name, tag.clone()) {
                tracing::trace!(%kind, name = %name, tag = %tag, "restored baseline tag");
                restored += 1;
            } else {
                tracing::debug!(%kind, name = %name, "baseline held for a record no longer in the catalog");
            }
        }
        restored
    }

    /// Populate the `kind` table from declared tags. Records without a
    /// declaration are skipped. Returns how many names were newly captured.
    pub fn capture_eager(&mut self, kind: TagKind, source: &dyn BaselineSource) -> usize {
        let mut captured = 0;
        for (name, declared) in source.declared_tags() {
            match declared {
                Some(tag) => {
                    if self.register_if_absent(kind, &name, &tag) {
                        captured += 1;
                    }
                }
                None => {
                    tracing::debug!(%kind, name = %name, "no declared tag, skipping baseline capture");
                }
            }
        }
        captured
    }

    pub fn len(&self, kind: TagKind) -> usize {
        self.table(kind).len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty() && self.upgrades.is_empty()
    }
}
