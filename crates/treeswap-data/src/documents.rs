//! The document database: every config document under `GameData/`.
//!
//! Each data file holds one root [`ConfigNode`] and is addressed by its url,
//! `"GameData/"` followed by its path relative to that directory (forward
//! slashes, extension kept). Files in other formats, such as textures, are
//! ignored.

use std::collections::BTreeMap;
use std::path::Path;

use treeswap_core::document::{ConfigNode, DocumentFields, TreeDocument};

use crate::loader::{DataLoadError, Format, deserialize_document};

/// Name of the document root inside a game directory.
pub const GAME_DATA_DIR: &str = "GameData";

/// Loaded documents keyed by url. Iteration is in url order.
#[derive(Debug, Clone, Default)]
pub struct DocumentDatabase {
    documents: BTreeMap<String, ConfigNode>,
}

impl DocumentDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the document at `url`.
    pub fn insert(&mut self, url: impl Into<String>, root: ConfigNode) {
        self.documents.insert(url.into(), root);
    }

    pub fn get(&self, url: &str) -> Option<&ConfigNode> {
        self.documents.get(url)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Every node named `name` that is either a document root or a direct
    /// child of one, with the url of its document.
    pub fn configs_of_type<'a>(
        &'a self,
        name: &'a str,
    ) -> impl Iterator<Item = (&'a str, &'a ConfigNode)> + 'a {
        self.documents.iter().flat_map(move |(url, root)| {
            let own = (root.name == name).then_some(root);
            own.into_iter()
                .chain(root.get_nodes(name))
                .map(move |node| (url.as_str(), node))
        })
    }

    /// Every tree document, in url order.
    pub fn trees(&self, fields: &DocumentFields) -> Vec<TreeDocument> {
        self.configs_of_type(&fields.tree_node)
            .map(|(url, node)| TreeDocument::new(url, node.clone()))
            .collect()
    }

    /// The tree stored at `url`, if that document holds one.
    pub fn tree(&self, url: &str, fields: &DocumentFields) -> Option<TreeDocument> {
        let root = self.documents.get(url)?;
        TreeDocument::from_config(url, root, fields)
    }
}

/// Load every data file under `<game_dir>/GameData`. A missing directory is
/// an empty database.
pub fn load_documents(game_dir: &Path) -> Result<DocumentDatabase, DataLoadError> {
    let root = game_dir.join(GAME_DATA_DIR);
    let mut db = DocumentDatabase::new();
    if !root.is_dir() {
        tracing::warn!(dir = %root.display(), "no GameData directory, no trees available");
        return Ok(db);
    }
    walk(&root, GAME_DATA_DIR, &mut db)?;
    tracing::debug!(documents = db.len(), "loaded document database");
    Ok(db)
}

fn walk(dir: &Path, url_prefix: &str, db: &mut DocumentDatabase) -> Result<(), DataLoadError> {
    let mut entries = std::fs::read_dir(dir)?.collect::<Result<Vec<_>, _>>()?;
    entries.sort_by_key(|e| e.file_name());

    for entry in entries {
        let path = entry.path();
        let name = entry.file_name().to_string_lossy().into_owned();
        let url = format!("{url_prefix}/{name}");

        if path.is_dir() {
            walk(&path, &url, db)?;
        } else if Format::of(&path).is_some() {
            if let Some(node) = deserialize_document::<ConfigNode>(&path)? {
                tracing::trace!(url = %url, node = %node.name, "loaded document");
                db.insert(url, node);
            }
        } else {
            tracing::trace!(path = %path.display(), "skipping non-data file");
        }
    }
    Ok(())
}
