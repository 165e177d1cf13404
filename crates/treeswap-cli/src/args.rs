use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum, ValueHint};
use treeswap_session::GameMode;

/// Switch a game session between tech trees
#[derive(Parser, Debug)]
#[command(name = "treeswap")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug level: -d info, -dd debug, -ddd trace
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub debug: u8,

    /// Game directory holding parts, settings and GameData/
    #[arg(short, long, global = true, default_value = ".", value_hint = ValueHint::DirPath)]
    pub game: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the selectable trees, stock tree first
    List,

    /// Check tree documents for duplicate ids and conflicting unlock claims
    Validate {
        /// Only check this tree url
        #[arg(short, long)]
        tree: Option<String>,
    },

    /// Apply a tree to the save and write it back
    Apply {
        /// Url of the tree to apply
        #[arg(short, long)]
        tree: String,

        /// Do not grant start-node parts
        #[arg(long)]
        no_buy: bool,

        #[command(flatten)]
        save: SaveArgs,
    },

    /// Run the selection flow for a save, prompting on stdin if needed
    Start {
        /// Pick this url instead of prompting
        #[arg(short, long)]
        choose: Option<String>,

        #[command(flatten)]
        save: SaveArgs,
    },
}

#[derive(clap::Args, Debug)]
pub struct SaveArgs {
    /// Save file, relative to the game directory
    #[arg(long, default_value = "save.bin", value_hint = ValueHint::FilePath)]
    pub save: PathBuf,

    /// Mode for a new save; ignored when the save exists
    #[arg(long, value_enum, default_value_t = ModeArg::Career)]
    pub mode: ModeArg,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeArg {
    Career,
    Science,
    Sandbox,
}

impl From<ModeArg> for GameMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Career => GameMode::Career,
            ModeArg::Science => GameMode::Science,
            ModeArg::Sandbox => GameMode::Sandbox,
        }
    }
}
