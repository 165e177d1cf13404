//! Session-level tree selection.
//!
//! The controller decides whether the player must be asked for a tree,
//! polls the dialog once per tick while asking, and applies and persists
//! the result. On reload a confirmed selection is re-applied straight away
//! so that edits to the tree documents since the last session take effect.

use treeswap_core::reconcile::ReconcileReport;

use crate::dialog::{DialogHost, SelectionDialog};
use crate::error::SessionError;
use crate::game::GameSession;
use crate::selection::SessionSelection;
use crate::services::TreeSwapServices;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    AwaitingSelection,
    TreeActive,
}

pub struct TreeSelectionController {
    state: ControllerState,
    selection: SessionSelection,
    dialog: Option<Box<dyn SelectionDialog>>,
    last_report: Option<ReconcileReport>,
    last_error: Option<SessionError>,
}

impl Default for TreeSelectionController {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeSelectionController {
    pub fn new() -> Self {
        Self {
            state: ControllerState::AwaitingSelection,
            selection: SessionSelection::default(),
            dialog: None,
            last_report: None,
            last_error: None,
        }
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    pub fn selection(&self) -> &SessionSelection {
        &self.selection
    }

    /// Whether a dialog is currently open.
    pub fn is_prompting(&self) -> bool {
        self.dialog.is_some()
    }

    /// Report of the most recent successful reconciliation.
    pub fn last_report(&self) -> Option<&ReconcileReport> {
        self.last_report.as_ref()
    }

    /// Why the most recent apply failed. Cleared by the next success.
    pub fn last_error(&self) -> Option<&SessionError> {
        self.last_error.as_ref()
    }

    /// Run once when a session starts or a save is loaded.
    pub fn start(
        &mut self,
        services: &mut TreeSwapServices,
        session: &mut GameSession,
        host: &mut dyn DialogHost,
    ) -> ControllerState {
        self.selection = SessionSelection::load(&session.scenario, &services.settings().scenario);
        self.dialog = None;
        self.last_error = None;

        if !session.mode.has_tech_progression() {
            tracing::info!(mode = ?session.mode, "game mode has no unlock progression, nothing to reconcile");
            self.state = ControllerState::TreeActive;
            return self.state;
        }

        if !services.settings().allow_tree_selection {
            let url = session.career_tree_url.clone();
            tracing::info!(url = %url, "tree selection disabled, applying career tree");
            self.apply_recorded(services, session, &url);
            self.state = ControllerState::TreeActive;
            return self.state;
        }

        if self.selection.selection_confirmed {
            let url = self
                .selection
                .chosen_tree_url
                .clone()
                .unwrap_or_else(|| session.career_tree_url.clone());
            tracing::info!(url = %url, "re-applying saved tree selection");
            self.apply_recorded(services, session, &url);
            self.state = ControllerState::TreeActive;
            return self.state;
        }

        self.open_dialog(services, host);
        self.state = ControllerState::AwaitingSelection;
        self.state
    }

    /// Poll the open dialog once. When it reports a choice, apply it.
    pub fn tick(
        &mut self,
        services: &mut TreeSwapServices,
        session: &mut GameSession,
        host: &mut dyn DialogHost,
    ) -> ControllerState {
        if self.state != ControllerState::AwaitingSelection {
            return self.state;
        }
        let Some(dialog) = self.dialog.as_mut() else {
            self.open_dialog(services, host);
            return self.state;
        };

        dialog.poll();
        if !dialog.is_done() {
            return self.state;
        }
        let chosen = dialog.chosen_url().map(str::to_string);
        self.dialog = None;

        match chosen {
            Some(url) => {
                if self.apply_recorded(services, session, &url) {
                    self.state = ControllerState::TreeActive;
                } else {
                    self.open_dialog(services, host);
                }
            }
            None => {
                tracing::warn!("selection dialog finished without a choice, asking again");
                self.open_dialog(services, host);
            }
        }
        self.state
    }

    /// Apply the tree at `url` and, if that succeeds, record it as the
    /// confirmed selection and the career tree.
    pub fn change_tree(
        &mut self,
        services: &mut TreeSwapServices,
        session: &mut GameSession,
        url: &str,
    ) -> Result<ReconcileReport, SessionError> {
        match services.apply_tree(url, session) {
            Ok(report) => {
                self.selection = SessionSelection::confirmed(url);
                self.selection
                    .save(&mut session.scenario, &services.settings().scenario);
                session.career_tree_url = url.to_string();
                tracing::info!(url = %url, warnings = report.warnings.len(), "tree selection confirmed");
                self.last_report = Some(report.clone());
                self.last_error = None;
                Ok(report)
            }
            Err(e) => {
                tracing::error!(url = %url, error = %e, "failed to apply tree");
                Err(e)
            }
        }
    }

    /// `change_tree`, keeping a failure in `last_error`. Returns whether it
    /// succeeded.
    fn apply_recorded(
        &mut self,
        services: &mut TreeSwapServices,
        session: &mut GameSession,
        url: &str,
    ) -> bool {
        match self.change_tree(services, session, url) {
            Ok(_) => true,
            Err(e) => {
                self.last_error = Some(e);
                false
            }
        }
    }

    fn open_dialog(&mut self, services: &TreeSwapServices, host: &mut dyn DialogHost) {
        let choices = services.declarations().as_slice().to_vec();
        tracing::debug!(choices = choices.len(), "opening tree selection dialog");
        self.dialog = Some(host.open(choices));
    }
}
