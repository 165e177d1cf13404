//! Treeswap Core -- the reconciliation engine for swapping unlock trees.
//!
//! A game catalog tags every part and upgrade with the node that unlocks
//! it. Several alternative trees may exist, each assigning parts to nodes
//! differently. This crate switches a live catalog from whatever tree is
//! active to a newly chosen one, rewriting tags and reconciling the
//! purchase ledger, and does so repeatably: applying tree A, then B, then A
//! again ends in exactly the state the first A left.
//!
//! # Reconciliation Pipeline
//!
//! Each call to [`reconcile::Reconciler::apply`] runs:
//!
//! 1. **Validate** -- Check for duplicate node ids and parts claimed twice.
//! 2. **Reset** -- Restore every tag held in the baseline registry.
//! 3. **Reassign** -- Retag each declared part/upgrade to its node id.
//! 4. **Clean and grant** -- Drop stale purchases; grant start-node parts.
//!
//! # Key Types
//!
//! - [`document::TreeDocument`] -- Typed view over one `TechTree` document.
//! - [`tags::TagStore`] -- Read/write capability over a catalog's tags, with
//!   an in-place backend ([`tags::PartCatalog`]) and a remove/re-insert
//!   backend ([`tags::UpgradeCatalog`]).
//! - [`baseline::OriginalTagRegistry`] -- First-write-wins baseline tags.
//! - [`ledger::TechLedger`] -- Purchased parts per node.
//! - [`declarations::TreeDeclarationCatalog`] -- Selectable trees with stats.

pub mod baseline;
pub mod declarations;
pub mod document;
pub mod id;
pub mod ledger;
pub mod reconcile;
pub mod tags;
pub mod unlocks;
pub mod validation;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
