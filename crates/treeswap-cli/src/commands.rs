use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use treeswap_core::declarations::TreeIdentity;
use treeswap_core::reconcile::ReconcileReport;
use treeswap_core::tags::{PartCatalog, UpgradeCatalog};
use treeswap_core::validation::validate_tree;
use treeswap_session::{
    ControllerState, GameSession, PresetDialog, SelectionDialog, SessionSnapshot,
    TreeSelectionController, TreeSwapServices,
};

use crate::args::{Cli, Commands, SaveArgs};
use crate::prompt::PromptDialog;

/// Upper bound on prompt rounds before `start` gives up.
const MAX_TICKS: usize = 32;

pub fn execute_command(cli: &Cli) -> Result<()> {
    match &cli.command {
        Commands::List => list(&cli.game),
        Commands::Validate { tree } => validate(&cli.game, tree.as_deref()),
        Commands::Apply { tree, no_buy, save } => apply(&cli.game, tree, *no_buy, save),
        Commands::Start { choose, save } => start(&cli.game, choose.clone(), save),
    }
}

fn load(game: &Path, no_buy: bool) -> Result<(TreeSwapServices, PartCatalog, UpgradeCatalog)> {
    let mut data = treeswap_data::load_game_data(game)
        .with_context(|| format!("loading game data from {}", game.display()))?;
    if no_buy {
        data.settings.buy_start_parts = false;
    }
    Ok(TreeSwapServices::from_game_data(data))
}

/// Read the save, or begin a new one on the stock tree.
fn open_session(
    game: &Path,
    args: &SaveArgs,
    services: &TreeSwapServices,
    parts: PartCatalog,
    upgrades: UpgradeCatalog,
) -> Result<(GameSession, PathBuf)> {
    let path = game.join(&args.save);
    let snapshot = SessionSnapshot::read_from(&path)
        .with_context(|| format!("reading save {}", path.display()))?;
    let session = match snapshot {
        Some(snapshot) => snapshot.into_session(parts, upgrades),
        None => {
            tracing::info!(path = %path.display(), "no save found, starting a new one");
            GameSession::new(
                args.mode.into(),
                parts,
                upgrades,
                services.settings().stock_tree.url.clone(),
            )
        }
    };
    Ok((session, path))
}

fn write_session(session: &GameSession, path: &Path) -> Result<()> {
    SessionSnapshot::capture(session)
        .write_to(path)
        .with_context(|| format!("writing save {}", path.display()))?;
    println!("saved {}", path.display());
    Ok(())
}

fn print_identity(index: usize, tree: &TreeIdentity) {
    let s = &tree.stats;
    println!("{:>3}) {}  <{}>", index + 1, tree.title, tree.url);
    println!(
        "     {} nodes, {} science total, tiers {}/{}/{}",
        s.num_nodes, s.total_cost, s.level1, s.level2, s.level3
    );
}

fn print_report(report: &ReconcileReport) {
    println!("applied {}", report.url);
    println!(
        "  reset: {} parts, {} upgrades",
        report.reset_parts, report.reset_upgrades
    );
    println!(
        "  retagged: {} parts, {} upgrades",
        report.retagged_parts, report.retagged_upgrades
    );
    println!(
        "  ledger: {} purchases removed, {} parts granted, {} entries created",
        report.purchases_removed, report.parts_granted, report.entries_created
    );
    for warning in &report.warnings {
        println!("  warning: {warning}");
    }
}

fn list(game: &Path) -> Result<()> {
    let (services, _, _) = load(game, false)?;
    if services.declarations().is_empty() {
        println!("no trees found under {}", game.display());
    }
    for (i, tree) in services.declarations().iter().enumerate() {
        print_identity(i, tree);
    }
    Ok(())
}

fn validate(game: &Path, only: Option<&str>) -> Result<()> {
    let (services, _, _) = load(game, false)?;
    let fields = &services.settings().fields;
    let trees: Vec<_> = services
        .documents()
        .trees(fields)
        .into_iter()
        .filter(|t| only.is_none_or(|url| t.url() == url))
        .collect();
    if let (Some(url), true) = (only, trees.is_empty()) {
        bail!("no tree document at '{url}'");
    }

    let mut total = 0;
    for tree in &trees {
        let issues = validate_tree(tree, fields);
        if issues.is_empty() {
            println!("ok    {}", tree.url());
            continue;
        }
        println!("FAIL  {}", tree.url());
        for issue in &issues {
            println!("      {issue}");
        }
        total += issues.len();
    }
    if total > 0 {
        bail!("{total} issue(s) found");
    }
    Ok(())
}

fn apply(game: &Path, url: &str, no_buy: bool, args: &SaveArgs) -> Result<()> {
    let (mut services, parts, upgrades) = load(game, no_buy)?;
    let (mut session, path) = open_session(game, args, &services, parts, upgrades)?;
    let mut controller = TreeSelectionController::new();
    let report = controller.change_tree(&mut services, &mut session, url)?;
    print_report(&report);
    write_session(&session, &path)
}

fn start(game: &Path, choose: Option<String>, args: &SaveArgs) -> Result<()> {
    let (mut services, parts, upgrades) = load(game, false)?;
    let (mut session, path) = open_session(game, args, &services, parts, upgrades)?;

    let mut host = move |choices: Vec<TreeIdentity>| -> Box<dyn SelectionDialog> {
        match &choose {
            Some(url) => Box::new(PresetDialog::new(url.clone())),
            None => Box::new(PromptDialog::new(choices, std::io::stdin().lock())),
        }
    };

    let mut controller = TreeSelectionController::new();
    let mut state = controller.start(&mut services, &mut session, &mut host);
    for _ in 0..MAX_TICKS {
        if state == ControllerState::TreeActive {
            break;
        }
        state = controller.tick(&mut services, &mut session, &mut host);
    }
    if let Some(e) = controller.last_error() {
        if state == ControllerState::TreeActive {
            bail!("saved tree selection could not be re-applied: {e}");
        }
        tracing::warn!(error = %e, "last choice could not be applied");
    }
    if state != ControllerState::TreeActive {
        bail!("no tree was chosen");
    }

    match controller.last_report() {
        Some(report) => print_report(report),
        None => println!("{:?} mode has no unlock progression", session.mode),
    }
    write_session(&session, &path)
}
