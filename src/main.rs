//! # Passenger Conf CLI
//!
//! This is the binary entry point for the `passenger-conf` command-line tool.
//!
//! Its responsibilities are:
//! - Parsing command-line arguments using `clap`.
//! - Executing the selected subcommand.
//! - Returning errors to `main`, where `anyhow` prints them with their
//!   context chain and the process exits non-zero.
//!
//! The configuration logic lives in the `passenger_conf` library crate.

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli.execute()
}
