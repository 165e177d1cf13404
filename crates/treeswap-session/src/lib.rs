//! Game-session integration for tree switching.
//!
//! Owns the process-lifetime services, the per-save selection state and the
//! controller that asks the player for a tree and applies it.
//!
//! # Usage
//!
//! ```rust,ignore
//! use treeswap_session::{GameSession, GameMode, TreeSelectionController, TreeSwapServices};
//!
//! let data = treeswap_data::load_game_data(dir)?;
//! let (mut services, parts, upgrades) = TreeSwapServices::from_game_data(data);
//! let mut session = GameSession::new(GameMode::Career, parts, upgrades, career_url);
//! let mut controller = TreeSelectionController::new();
//! controller.start(&mut services, &mut session, &mut host);
//! while controller.tick(&mut services, &mut session, &mut host) != ControllerState::TreeActive {}
//! ```

pub mod controller;
pub mod dialog;
pub mod error;
pub mod game;
pub mod selection;
pub mod services;
pub mod snapshot;

pub use controller::{ControllerState, TreeSelectionController};
pub use dialog::{DialogHost, PresetDialog, SelectionDialog, SelectionPresenter};
pub use error::SessionError;
pub use game::{GameMode, GameSession};
pub use selection::{ScenarioNode, SessionSelection};
pub use services::TreeSwapServices;
pub use snapshot::{SessionSnapshot, SnapshotError};
