//! `ticketing` command line: serve the API, migrate the database, and
//! render or build the container image.

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;
use ticketing_core::launch::{LaunchContract, RunMode};
use ticketing_core::observability;

use cli::{Cli, Commands, ImageAction};

pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            host,
            port,
            database,
        } => {
            let contract = LaunchContract::from_env()?.with_overrides(host, port);
            observability::init_tracing(contract.run_mode);
            commands::serve::cmd_serve(&contract, database)?;
        }
        Commands::Migrate { database } => {
            observability::init_tracing(RunMode::default());
            commands::migrate::cmd_migrate(database)?;
        }
        Commands::Image { action } => {
            observability::init_tracing(RunMode::default());
            match action {
                ImageAction::Render { output } => commands::image::cmd_render(output.as_deref())?,
                ImageAction::Check { context } => commands::image::cmd_check(&context)?,
                ImageAction::Build { context, tag } => commands::image::cmd_build(&context, &tag)?,
            }
        }
    }
    Ok(())
}
