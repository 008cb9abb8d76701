use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "release-watch",
    about = "Show the latest GitHub release of every watched repository",
    args_conflicts_with_subcommands = true
)]
pub(crate) struct Cli {
    #[command(flatten)]
    pub(crate) run: RunArgs,
    #[command(subcommand)]
    pub(crate) command: Option<Commands>,
}

#[derive(Debug, Clone, Default, Args)]
pub(crate) struct RunArgs {
    #[arg(long)]
    pub(crate) config: Option<PathBuf>,
    /// JSON watchlist to read instead of the configured one
    #[arg(long)]
    pub(crate) watchlist: Option<PathBuf>,
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Commands {
    /// Fetch and print the latest releases (default)
    #[command(alias = "list")]
    Releases(RunArgs),
    /// Validate config, watchlist and credentials without calling the API
    Check {
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long)]
        watchlist: Option<PathBuf>,
    },
    /// Write a sample watchlist
    Init {
        #[arg(long)]
        path: Option<PathBuf>,
        #[arg(long)]
        force: bool,
    },
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Debug, Subcommand)]
pub(crate) enum ConfigCommands {
    Path {
        #[arg(long)]
        config: Option<PathBuf>,
    },
}
