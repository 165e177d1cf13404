use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Identifies a node in an unlock tree. The same string is stored on parts
/// and upgrades as their required-unlock tag.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TechId(pub String);

impl TechId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TechId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for TechId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TechId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for TechId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl PartialEq<str> for TechId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for TechId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Which tag table a name belongs to. Parts and upgrades live in separate
/// catalogs and may share names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TagKind {
    Part,
    Upgrade,
}

impl fmt::Display for TagKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagKind::Part => f.write_str("part"),
            TagKind::Upgrade => f.write_str("upgrade"),
        }
    }
}
