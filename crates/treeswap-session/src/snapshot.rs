//! Save snapshots: the persisted half of a [`GameSession`].
//!
//! Binary serialization via `bitcode` behind a versioned header. The
//! catalogs are not saved; they are reloaded from game data and the chosen
//! tree is re-applied on load.

use serde::{Deserialize, Serialize};
use std::path::Path;

use treeswap_core::ledger::ResearchLedger;
use treeswap_core::tags::{PartCatalog, UpgradeCatalog};

use crate::game::{GameMode, GameSession};
use crate::selection::ScenarioNode;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Magic number identifying a session snapshot.
pub const SNAPSHOT_MAGIC: u32 = 0x7E55_0001;

/// Current format version. Increment when breaking the wire format.
pub const FORMAT_VERSION: u32 = 1;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("bitcode encoding failed: {0}")]
    Encode(String),
    #[error("bitcode decoding failed: {0}")]
    Decode(String),
    #[error("invalid magic number: expected 0x{:08X}, got 0x{:08X}", SNAPSHOT_MAGIC, .0)]
    InvalidMagic(u32),
    #[error("unsupported format version: expected {}, got {}", FORMAT_VERSION, .0)]
    UnsupportedVersion(u32),
    #[error("snapshot from future version {0} (this build supports up to {FORMAT_VERSION})")]
    FutureVersion(u32),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// Header
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotHeader {
    pub magic: u32,
    pub version: u32,
}

impl SnapshotHeader {
    pub fn new() -> Self {
        Self {
            magic: SNAPSHOT_MAGIC,
            version: FORMAT_VERSION,
        }
    }

    pub fn validate(&self) -> Result<(), SnapshotError> {
        if self.magic != SNAPSHOT_MAGIC {
            return Err(SnapshotError::InvalidMagic(self.magic));
        }
        if self.version > FORMAT_VERSION {
            return Err(SnapshotError::FutureVersion(self.version));
        }
        if self.version < FORMAT_VERSION {
            return Err(SnapshotError::UnsupportedVersion(self.version));
        }
        Ok(())
    }
}

impl Default for SnapshotHeader {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub header: SnapshotHeader,
    pub mode: GameMode,
    pub scenario: ScenarioNode,
    pub ledger: Option<ResearchLedger>,
    pub career_tree_url: String,
}

impl SessionSnapshot {
    pub fn capture(session: &GameSession) -> Self {
        Self {
            header: SnapshotHeader::new(),
            mode: session.mode,
            scenario: session.scenario.clone(),
            ledger: session.ledger.clone(),
            career_tree_url: session.career_tree_url.clone(),
        }
    }

    /// Rebuild a session around freshly loaded catalogs.
    pub fn into_session(self, parts: PartCatalog, upgrades: UpgradeCatalog) -> GameSession {
        GameSession {
            mode: self.mode,
            parts,
            upgrades,
            ledger: self.ledger,
            scenario: self.scenario,
            career_tree_url: self.career_tree_url,
        }
    }

    pub fn encode(&self) -> Result<Vec<u8>, SnapshotError> {
        bitcode::serialize(self).map_err(|e| SnapshotError::Encode(e.to_string()))
    }

    /// Decode and validate the header. Returns an error (not a panic) on
    /// version mismatch.
    pub fn decode(data: &[u8]) -> Result<Self, SnapshotError> {
        let snapshot: SessionSnapshot =
            bitcode::deserialize(data).map_err(|e| SnapshotError::Decode(e.to_string()))?;
        snapshot.header.validate()?;
        Ok(snapshot)
    }

    pub fn write_to(&self, path: &Path) -> Result<(), SnapshotError> {
        std::fs::write(path, self.encode()?)?;
        Ok(())
    }

    /// Read a snapshot file. A missing file is `Ok(None)`.
    pub fn read_from(path: &Path) -> Result<Option<Self>, SnapshotError> {
        if !path.exists() {
            return Ok(None);
        }
        let data = std::fs::read(path)?;
        Self::decode(&data).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use treeswap_core::id::TechId;
    use treeswap_core::ledger::TechLedger;
    use treeswap_core::test_utils::part_catalog;

    fn session() -> GameSession {
        let mut session = GameSession::new(
            GameMode::Science,
            part_catalog(&[("A", "root")]),
            UpgradeCatalog::new(),
            "GameData/t.ron",
        );
        session.scenario.set_value("treeSelected", "True");
        if let Some(ledger) = session.ledger.as_mut() {
            ledger.create_and_register(TechId::from("n1")).purchase("A");
        }
        session
    }

    #[test]
    fn encode_decode_preserves_persisted_state() {
        let snapshot = SessionSnapshot::capture(&session());
        let bytes = snapshot.encode().unwrap();
        let decoded = SessionSnapshot::decode(&bytes).unwrap();
        assert_eq!(decoded, snapshot);

        let restored = decoded.into_session(part_catalog(&[("A", "root")]), UpgradeCatalog::new());
        assert_eq!(restored.mode, GameMode::Science);
        assert!(
            restored
                .ledger
                .unwrap()
                .get(&TechId::from("n1"))
                .unwrap()
                .contains("A")
        );
    }

    #[test]
    fn bad_magic_rejected() {
        let mut snapshot = SessionSnapshot::capture(&session());
        snapshot.header.magic = 0xDEAD_BEEF;
        let bytes = snapshot.encode().unwrap();
        assert!(matches!(
            SessionSnapshot::decode(&bytes),
            Err(SnapshotError::InvalidMagic(0xDEAD_BEEF))
        ));
    }

    #[test]
    fn future_version_rejected() {
        let mut snapshot = SessionSnapshot::capture(&session());
        snapshot.header.version = FORMAT_VERSION + 1;
        let bytes = snapshot.encode().unwrap();
        assert!(matches!(
            SessionSnapshot::decode(&bytes),
            Err(SnapshotError::FutureVersion(_))
        ));
    }

    #[test]
    fn garbage_is_a_decode_error() {
        assert!(matches!(
            SessionSnapshot::decode(&[1, 2, 3]),
            Err(SnapshotError::Decode(_))
        ));
    }

    #[test]
    fn missing_file_reads_as_none() {
        let path = std::env::temp_dir().join(format!(
            "treeswap_snapshot_missing_{}.bin",
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);
        assert!(SessionSnapshot::read_from(&path).unwrap().is_none());

        SessionSnapshot::capture(&session()).write_to(&path).unwrap();
        assert!(SessionSnapshot::read_from(&path).unwrap().is_some());
        let _ = std::fs::remove_file(&path);
    }
}
