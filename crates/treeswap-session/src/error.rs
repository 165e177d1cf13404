use std::path::PathBuf;

use treeswap_core::reconcile::ReconcileError;

use crate::snapshot::SnapshotError;

/// Errors that can occur while running a tree-swap session.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The requested tree url is not a known tree document.
    #[error("no tree document at '{url}'")]
    UnknownTree { url: String },

    /// Reconciliation refused to run.
    #[error(transparent)]
    Reconcile(#[from] ReconcileError),

    /// Failed to load game data from the game directory.
    #[error("data load error in {dir}: {source}")]
    DataLoad {
        dir: PathBuf,
        source: treeswap_data::DataLoadError,
    },

    /// The save snapshot could not be read or written.
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),

    /// An I/O error occurred.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
