//! The persisted tree selection and the scenario node it is stored in.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use treeswap_data::ScenarioFields;

/// Flat key/value store persisted with a save.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioNode {
    values: BTreeMap<String, String>,
}

impl ScenarioNode {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_value(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn set_value(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn remove_value(&mut self, key: &str) -> Option<String> {
        self.values.remove(key)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Which tree the player picked for this save.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSelection {
    /// Absent in older saves and before a choice is made.
    pub chosen_tree_url: Option<String>,
    pub selection_confirmed: bool,
}

impl SessionSelection {
    /// A confirmed choice of `url`.
    pub fn confirmed(url: impl Into<String>) -> Self {
        Self {
            chosen_tree_url: Some(url.into()),
            selection_confirmed: true,
        }
    }

    /// Read the selection. A missing flag is unconfirmed and a missing url
    /// is `None`.
    pub fn load(node: &ScenarioNode, fields: &ScenarioFields) -> Self {
        let selection_confirmed = node
            .get_value(&fields.tree_selected)
            .is_some_and(|v| v.trim().eq_ignore_ascii_case("true"));
        let chosen_tree_url = node
            .get_value(&fields.tree_url)
            .filter(|url| !url.is_empty())
            .map(str::to_string);
        Self {
            chosen_tree_url,
            selection_confirmed,
        }
    }

    pub fn save(&self, node: &mut ScenarioNode, fields: &ScenarioFields) {
        let flag = if self.selection_confirmed { "True" } else { "False" };
        node.set_value(fields.tree_selected.clone(), flag);
        match &self.chosen_tree_url {
            Some(url) => node.set_value(fields.tree_url.clone(), url.clone()),
            None => {
                node.remove_value(&fields.tree_url);
            }
        }
    }
}
