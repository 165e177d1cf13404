//! Terminal selection dialog.

use std::io::{BufRead, Write};

use treeswap_core::declarations::TreeIdentity;
use treeswap_session::{SelectionDialog, SelectionPresenter};

/// Prints the choices and reads one numbered pick per poll. Stops reading
/// at end of input.
pub struct PromptDialog<R> {
    presenter: SelectionPresenter,
    input: R,
    exhausted: bool,
}

impl<R: BufRead> PromptDialog<R> {
    pub fn new(choices: Vec<TreeIdentity>, input: R) -> Self {
        Self {
            presenter: SelectionPresenter::new(choices),
            input,
            exhausted: false,
        }
    }

    fn print_choices(&self) {
        let mut out = std::io::stdout().lock();
        for (i, tree) in self.presenter.choices().iter().enumerate() {
            let s = &tree.stats;
            let _ = writeln!(
                out,
                "{:>3}) {} [{} nodes, {} science, tiers {}/{}/{}]\n     {}",
                i + 1,
                tree.title,
                s.num_nodes,
                s.total_cost,
                s.level1,
                s.level2,
                s.level3,
                tree.description
            );
        }
        let _ = write!(out, "choose a tree: ");
        let _ = out.flush();
    }
}

impl<R: BufRead> SelectionDialog for PromptDialog<R> {
    fn is_done(&self) -> bool {
        self.presenter.is_done()
    }

    fn chosen_url(&self) -> Option<&str> {
        self.presenter.chosen_url()
    }

    fn poll(&mut self) {
        if self.exhausted || self.presenter.is_done() {
            return;
        }
        self.print_choices();
        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) | Err(_) => {
                self.exhausted = true;
            }
            Ok(_) => match line.trim().parse::<usize>() {
                Ok(n) if n >= 1 && self.presenter.confirm(n - 1) => {}
                _ => tracing::warn!(input = line.trim(), "not a valid choice"),
            },
        }
    }
}
