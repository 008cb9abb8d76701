mod args;
mod commands;

use anyhow::Result;
use clap::Parser;

use crate::{config::ConfigError, domain::failure::AuthError};

use args::{Cli, Commands};

pub const EXIT_FAILURE: u8 = 1;
pub const EXIT_CONFIG_ERROR: u8 = 2;
pub const EXIT_AUTH_ERROR: u8 = 3;

pub fn exit_code_for_error(err: &anyhow::Error) -> u8 {
    if err.downcast_ref::<ConfigError>().is_some() {
        EXIT_CONFIG_ERROR
    } else if err.downcast_ref::<AuthError>().is_some() {
        EXIT_AUTH_ERROR
    } else {
        EXIT_FAILURE
    }
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        None => commands::releases::run(cli.run).await,
        Some(Commands::Releases(args)) => commands::releases::run(args).await,
        Some(Commands::Check { config, watchlist }) => {
            commands::check::run(config.as_deref(), watchlist.as_deref())
        }
        Some(Commands::Init { path, force }) => commands::init::run(path, force),
        Some(Commands::Config { command }) => commands::config::run(command),
    }
}
