//! Selection dialog contract and the headless presentation adapter.
//!
//! A dialog spans many frames; the controller polls it once per tick and
//! only reads the chosen url after [`SelectionDialog::is_done`] reports
//! true. There is no cancel: the only way out is a confirmed pick.

use treeswap_core::declarations::TreeIdentity;

pub trait SelectionDialog {
    fn is_done(&self) -> bool;

    /// The confirmed url. `None` until the dialog is done.
    fn chosen_url(&self) -> Option<&str>;

    /// Called once per controller tick while the dialog is open.
    fn poll(&mut self) {}
}

/// Opens a dialog over a list of choices.
pub trait DialogHost {
    fn open(&mut self, choices: Vec<TreeIdentity>) -> Box<dyn SelectionDialog>;
}

impl<F> DialogHost for F
where
    F: FnMut(Vec<TreeIdentity>) -> Box<dyn SelectionDialog>,
{
    fn open(&mut self, choices: Vec<TreeIdentity>) -> Box<dyn SelectionDialog> {
        self(choices)
    }
}

// ---------------------------------------------------------------------------
// SelectionPresenter
// ---------------------------------------------------------------------------

/// Holds the choice list and forwards a confirmed index. A renderer draws
/// [`SelectionPresenter::choices`] and calls [`SelectionPresenter::confirm`].
#[derive(Debug, Clone)]
pub struct SelectionPresenter {
    choices: Vec<TreeIdentity>,
    highlighted: usize,
    confirmed: Option<usize>,
}

impl SelectionPresenter {
    pub fn new(choices: Vec<TreeIdentity>) -> Self {
        Self {
            choices,
            highlighted: 0,
            confirmed: None,
        }
    }

    pub fn choices(&self) -> &[TreeIdentity] {
        &self.choices
    }

    pub fn highlighted(&self) -> Option<&TreeIdentity> {
        self.choices.get(self.highlighted)
    }

    /// Move the highlight. Out-of-range indices are ignored.
    pub fn highlight(&mut self, index: usize) {
        if index < self.choices.len() {
            self.highlighted = index;
        }
    }

    /// Confirm the choice at `index`. Returns false for an out-of-range
    /// index or a second confirmation.
    pub fn confirm(&mut self, index: usize) -> bool {
        if self.confirmed.is_some() || index >= self.choices.len() {
            return false;
        }
        self.confirmed = Some(index);
        true
    }

    /// Confirm the choice with `url`.
    pub fn confirm_url(&mut self, url: &str) -> bool {
        match self.choices.iter().position(|c| c.url == url) {
            Some(index) => self.confirm(index),
            None => false,
        }
    }
}

impl SelectionDialog for SelectionPresenter {
    fn is_done(&self) -> bool {
        self.confirmed.is_some()
    }

    fn chosen_url(&self) -> Option<&str> {
        self.confirmed
            .and_then(|i| self.choices.get(i))
            .map(|c| c.url.as_str())
    }
}

// ---------------------------------------------------------------------------
// PresetDialog
// ---------------------------------------------------------------------------

/// Headless dialog that confirms a fixed url after a number of polls.
#[derive(Debug, Clone)]
pub struct PresetDialog {
    url: String,
    remaining_polls: u32,
}

impl PresetDialog {
    /// Confirms `url` on the first poll.
    pub fn new(url: impl Into<String>) -> Self {
        Self::after_polls(url, 1)
    }

    pub fn after_polls(url: impl Into<String>, polls: u32) -> Self {
        Self {
            url: url.into(),
            remaining_polls: polls,
        }
    }
}

impl SelectionDialog for PresetDialog {
    fn is_done(&self) -> bool {
        self.remaining_polls == 0
    }

    fn chosen_url(&self) -> Option<&str> {
        self.is_done().then_some(self.url.as_str())
    }

    fn poll(&mut self) {
        self.remaining_polls = self.remaining_polls.saturating_sub(1);
    }
}
