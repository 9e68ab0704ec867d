//! `recovery`: run recovery plans from the command line.

mod cli;
mod commands;
mod settings;

use anyhow::Result;
use clap::Parser;

use crate::cli::{Cli, Command};
use crate::settings::Settings;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(level) = cli.log_level {
        settings.log.level = level;
    }
    if let Some(format) = cli.log_format {
        settings.log.format = format;
    }
    if let Command::Run(run) = &cli.command {
        if let Some(resource) = &run.resource {
            settings.resource.clone_from(resource);
        }
        if run.no_recovery {
            settings.enable_recovery = false;
        }
        if run.metrics_file.is_some() {
            settings.metrics_file.clone_from(&run.metrics_file);
        }
    }

    let _guard = recovery_log::init_with(settings.log.clone())?;

    match cli.command {
        Command::Run(run) => commands::run(settings, run).await,
        Command::Validate(validate) => commands::validate(&validate),
        Command::Execs => {
            commands::execs();
            Ok(())
        }
    }
}
