use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "recovery",
    version,
    about = "Run declarative recovery plans against a lab resource"
)]
pub struct Cli {
    /// Settings file (TOML)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log filter directives, e.g. "info,recovery_engine=debug"
    #[arg(long, global = true, value_name = "FILTER")]
    pub log_level: Option<String>,

    /// Log output format: pretty, compact or json
    #[arg(long, global = true, value_name = "FORMAT")]
    pub log_format: Option<recovery_log::Format>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the plans of a configuration file
    Run(RunCommand),
    /// Validate a configuration file without running it
    Validate(ValidateCommand),
    /// List registered execs
    Execs,
}

#[derive(Debug, Args)]
pub struct RunCommand {
    /// Configuration file (JSON)
    #[arg(long, value_name = "FILE")]
    pub plans: PathBuf,

    /// Plans to run instead of the file's `plan_names`; repeatable
    #[arg(long = "plan", value_name = "NAME")]
    pub plan: Vec<String>,

    /// Do not attempt recovery actions
    #[arg(long)]
    pub no_recovery: bool,

    /// Resource under repair
    #[arg(long, value_name = "NAME")]
    pub resource: Option<String>,

    /// Write collected metric records to this file as JSON
    #[arg(long, value_name = "FILE")]
    pub metrics_file: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct ValidateCommand {
    /// Configuration file (JSON)
    #[arg(long, value_name = "FILE")]
    pub plans: PathBuf,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn run_flags() {
        let cli = Cli::parse_from([
            "recovery",
            "run",
            "--plans",
            "plans.json",
            "--plan",
            "repair",
            "--plan",
            "deploy",
            "--no-recovery",
            "--log-format",
            "json",
        ]);
        assert_eq!(cli.log_format, Some(recovery_log::Format::Json));
        let Command::Run(run) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(run.plan, vec!["repair", "deploy"]);
        assert!(run.no_recovery);
        assert_eq!(run.resource, None);
    }
}
