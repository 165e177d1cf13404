//! Tree documents: the raw config-node structure and typed views over it.
//!
//! Unlock trees are authored as nested config nodes. A [`ConfigNode`] is a
//! named record holding ordered `key = value` pairs and ordered child nodes;
//! the same key may appear many times (every unlocked part is its own
//! `part = ...` entry). [`TreeDocument`] wraps the `TechTree` node of one
//! document and yields a [`NodeDeclaration`] per `RDNode` child.
//!
//! Field names are not hard-coded: [`DocumentFields`] carries every key and
//! node name the engine reads, so trees authored against a different schema
//! can be consumed by changing settings alone.

use serde::{Deserialize, Serialize};

use crate::id::TechId;
use crate::unlocks::{UnlockSet, extract_unlocks};

// ---------------------------------------------------------------------------
// ConfigNode
// ---------------------------------------------------------------------------

/// A generic document node. Values and children keep their authored order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigNode {
    pub name: String,
    #[serde(default)]
    pub values: Vec<(String, String)>,
    #[serde(default)]
    pub nodes: Vec<ConfigNode>,
}

impl ConfigNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values: Vec::new(),
            nodes: Vec::new(),
        }
    }

    /// Builder form of [`ConfigNode::add_value`].
    pub fn with_value(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.add_value(key, value);
        self
    }

    /// Builder form of [`ConfigNode::add_node`].
    pub fn with_node(mut self, node: ConfigNode) -> Self {
        self.add_node(node);
        self
    }

    pub fn add_value(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.push((key.into(), value.into()));
    }

    pub fn add_node(&mut self, node: ConfigNode) {
        self.nodes.push(node);
    }

    pub fn has_value(&self, key: &str) -> bool {
        self.values.iter().any(|(k, _)| k == key)
    }

    /// The first value stored under `key`.
    pub fn get_value(&self, key: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Every value stored under `key`, in authored order.
    pub fn get_values<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.values
            .iter()
            .filter(move |(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn has_node(&self, name: &str) -> bool {
        self.nodes.iter().any(|n| n.name == name)
    }

    /// The first child named `name`.
    pub fn get_node(&self, name: &str) -> Option<&ConfigNode> {
        self.nodes.iter().find(|n| n.name == name)
    }

    /// Every child named `name`, in authored order.
    pub fn get_nodes<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a ConfigNode> + 'a {
        self.nodes.iter().filter(move |n| n.name == name)
    }

    /// Reads `key` as a boolean. Only a case-insensitive `"true"` is true;
    /// a missing key is `None`.
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get_value(key)
            .map(|v| v.trim().eq_ignore_ascii_case("true"))
    }

    /// Reads `key` as an integer. A missing key is `Ok(None)`; a present but
    /// unparsable value is returned as the error so callers can report it.
    pub fn get_int(&self, key: &str) -> Result<Option<i32>, String> {
        match self.get_value(key) {
            None => Ok(None),
            Some(raw) => raw.trim().parse::<i32>().map(Some).map_err(|_| raw.to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// Field names
// ---------------------------------------------------------------------------

/// Every node name and key the engine reads from a tree document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentFields {
    /// Name of the root node of a tree document.
    pub tree_node: String,
    /// Name of each node declaration inside a tree.
    pub tech_node: String,
    pub id: String,
    pub cost: String,
    pub hide_empty: String,
    pub title: String,
    pub description: String,
    /// Tree-level flag enabling auto-purchase of zero-cost nodes.
    pub unlock_all_start_parts: String,
    /// Child of a node declaration listing what it unlocks.
    pub unlocks_node: String,
    pub part: String,
    pub upgrade: String,
}

impl Default for DocumentFields {
    fn default() -> Self {
        Self {
            tree_node: "TechTree".to_string(),
            tech_node: "RDNode".to_string(),
            id: "id".to_string(),
            cost: "cost".to_string(),
            hide_empty: "hideEmpty".to_string(),
            title: "title".to_string(),
            description: "description".to_string(),
            unlock_all_start_parts: "unlockAllStartParts".to_string(),
            unlocks_node: "Unlocks".to_string(),
            part: "part".to_string(),
            upgrade: "upgrade".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// TreeDocument
// ---------------------------------------------------------------------------

/// One unlock tree, addressed by the url of the file it was loaded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeDocument {
    url: String,
    root: ConfigNode,
}

impl TreeDocument {
    /// Wrap an already-located tree node.
    pub fn new(url: impl Into<String>, root: ConfigNode) -> Self {
        Self {
            url: url.into(),
            root,
        }
    }

    /// Locate the tree node in a loaded document. The document may be the
    /// tree node itself or contain it as a direct child.
    pub fn from_config(url: &str, config: &ConfigNode, fields: &DocumentFields) -> Option<Self> {
        if config.name == fields.tree_node {
            return Some(Self::new(url, config.clone()));
        }
        config
            .get_node(&fields.tree_node)
            .map(|node| Self::new(url, node.clone()))
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn root(&self) -> &ConfigNode {
        &self.root
    }

    pub fn title<'a>(&'a self, fields: &DocumentFields) -> Option<&'a str> {
        self.root.get_value(&fields.title)
    }

    pub fn description<'a>(&'a self, fields: &DocumentFields) -> Option<&'a str> {
        self.root.get_value(&fields.description)
    }

    /// Whether the tree asks for every part in its zero-cost nodes to be
    /// granted for free.
    pub fn unlock_all_start_parts(&self, fields: &DocumentFields) -> bool {
        self.root
            .get_bool(&fields.unlock_all_start_parts)
            .unwrap_or(false)
    }

    /// Node declarations in document order.
    pub fn nodes<'a>(
        &'a self,
        fields: &'a DocumentFields,
    ) -> impl Iterator<Item = NodeDeclaration<'a>> + 'a {
        self.root
            .get_nodes(&fields.tech_node)
            .map(move |raw| NodeDeclaration { raw, fields })
    }
}

// ---------------------------------------------------------------------------
// NodeDeclaration
// ---------------------------------------------------------------------------

/// Typed view over one node declaration of a tree.
#[derive(Debug, Clone, Copy)]
pub struct NodeDeclaration<'a> {
    raw: &'a ConfigNode,
    fields: &'a DocumentFields,
}

impl<'a> NodeDeclaration<'a> {
    pub fn raw(&self) -> &'a ConfigNode {
        self.raw
    }

    pub fn id(&self) -> Option<TechId> {
        self.raw.get_value(&self.fields.id).map(TechId::from)
    }

    /// The declared cost. An unparsable cost is reported and treated as
    /// absent.
    pub fn cost(&self) -> Option<i32> {
        match self.raw.get_int(&self.fields.cost) {
            Ok(cost) => cost,
            Err(raw) => {
                tracing::warn!(
                    node = self.raw.get_value(&self.fields.id).unwrap_or("<no id>"),
                    value = %raw,
                    "node cost is not an integer, ignoring it"
                );
                None
            }
        }
    }

    pub fn hide_empty(&self) -> bool {
        self.raw.get_bool(&self.fields.hide_empty).unwrap_or(false)
    }

    /// Normalized part and upgrade names this node unlocks.
    pub fn unlocks(&self) -> UnlockSet {
        extract_unlocks(
            self.raw,
            &self.fields.unlocks_node,
            &self.fields.part,
            &self.fields.upgrade,
        )
    }
}

// ===========================================================================
// Tests
// ===========================================================================
