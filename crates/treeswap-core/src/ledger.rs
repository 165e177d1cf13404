//! The purchase ledger: which parts have been bought under each node.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::id::TechId;

/// Research state of a node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TechState {
    #[default]
    Unavailable,
    Available,
}

/// Purchase record for one node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub tech_id: TechId,
    pub state: TechState,
    /// Purchased part names. Unique, in purchase order.
    parts_purchased: Vec<String>,
}

impl LedgerEntry {
    pub fn new(tech_id: TechId, state: TechState) -> Self {
        Self {
            tech_id,
            state,
            parts_purchased: Vec::new(),
        }
    }

    pub fn contains(&self, part: &str) -> bool {
        self.parts_purchased.iter().any(|p| p == part)
    }

    /// Add `part` unless it is already purchased. Returns whether it was added.
    pub fn purchase(&mut self, part: &str) -> bool {
        if self.contains(part) {
            return false;
        }
        self.parts_purchased.push(part.to_string());
        true
    }

    /// Keep only the parts for which `keep` holds. Returns the removed names.
    pub fn retain<F>(&mut self, mut keep: F) -> Vec<String>
    where
        F: FnMut(&str) -> bool,
    {
        let mut removed = Vec::new();
        self.parts_purchased.retain(|p| {
            if keep(p) {
                true
            } else {
                removed.push(p.clone());
                false
            }
        });
        removed
    }

    pub fn parts_purchased(&self) -> &[String] {
        &self.parts_purchased
    }
}

// ---------------------------------------------------------------------------
// Ledger store
// ---------------------------------------------------------------------------

/// Progress store the engine reconciles against.
pub trait TechLedger {
    fn get(&self, id: &TechId) -> Option<&LedgerEntry>;

    fn get_mut(&mut self, id: &TechId) -> Option<&mut LedgerEntry>;

    /// Create an empty, available entry for `id` and register it. An entry
    /// that already exists is returned unchanged.
    fn create_and_register(&mut self, id: TechId) -> &mut LedgerEntry;

    /// Ids of every entry, sorted.
    fn tech_ids(&self) -> Vec<TechId>;
}

/// In-memory ledger, persisted as part of a session snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResearchLedger {
    entries: BTreeMap<TechId, LedgerEntry>,
}

impl ResearchLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an entry.
    pub fn insert(&mut self, entry: LedgerEntry) {
        self.entries.insert(entry.tech_id.clone(), entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LedgerEntry> {
        self.entries.values()
    }
}

impl TechLedger for ResearchLedger {
    fn get(&self, id: &TechId) -> Option<&LedgerEntry> {
        self.entries.get(id)
    }

    fn get_mut(&mut self, id: &TechId) -> Option<&mut LedgerEntry> {
        self.entries.get_mut(id)
    }

    fn create_and_register(&mut self, id: TechId) -> &mut LedgerEntry {
        self.entries
            .entry(id.clone())
            .or_insert_with(|| LedgerEntry::new(id, TechState::Available))
    }

    fn tech_ids(&self) -> Vec<TechId> {
        self.entries.keys().cloned().collect()
    }
}
