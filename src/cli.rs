//! CLI argument parsing and command dispatch

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};

use crate::commands;

/// Passenger Conf - Keep Apache's Passenger setup and application vhosts in order
#[derive(Parser, Debug)]
#[command(name = "passenger-conf")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    global: GlobalArgs,
}

/// Flags accepted by every subcommand.
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Colorize output (always, never, auto)
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    pub color: String,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL", default_value = "warn")]
    pub log_level: String,

    /// Settings file (defaults to ~/.config/passenger-conf/settings.yaml)
    #[arg(
        long,
        global = true,
        value_name = "FILE",
        env = "PASSENGER_CONF_SETTINGS"
    )]
    pub settings: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Walk the Apache config and report every Passenger directive found
    Check(commands::check::CheckArgs),

    /// Add any missing Passenger directives and set up the managed file
    Setup(commands::setup::SetupArgs),

    /// Serve an application under <APP><domain>
    Add(commands::add::AddArgs),

    /// Compare host aliases with configured virtual hosts
    Hosts(commands::hosts::HostsArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        init_logging(&self.global.log_level);

        match self.command {
            Commands::Check(args) => commands::check::execute(args, &self.global),
            Commands::Setup(args) => commands::setup::execute(args, &self.global),
            Commands::Add(args) => commands::add::execute(args, &self.global),
            Commands::Hosts(args) => commands::hosts::execute(args, &self.global),
        }
    }
}

/// `RUST_LOG` wins over `--log-level` when set.
fn init_logging(level: &str) {
    let env = env_logger::Env::default().default_filter_or(level);
    // A logger may already be installed when running under tests.
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .format_target(false)
        .try_init();
}
