//! # Setup Command Implementation
//!
//! Adds whatever Passenger directives the configuration tree is missing and
//! settles on the managed file that `add` writes virtual hosts into. Safe to
//! run repeatedly: a complete tree with a managed file is left untouched.

use anyhow::{Context as _, Result};
use clap::Args;

use passenger_conf::output::Status;
use passenger_conf::server::ServerControl;
use passenger_conf::synthesize::{resolve_managed_file, Resolution};

use super::common::{ConfArgs, Context};
use crate::cli::GlobalArgs;

/// Add any missing Passenger directives and set up the managed file
#[derive(Args, Debug)]
pub struct SetupArgs {
    #[command(flatten)]
    pub conf: ConfArgs,
}

/// Execute the `setup` command.
pub fn execute(args: SetupArgs, global: &GlobalArgs) -> Result<()> {
    let context = Context::load(global, &args.conf)?;
    let resolution = resolve(&context)?;

    if !resolution.insertions.is_empty() || resolution.created {
        context.server.reload()?;
    }
    Ok(())
}

/// Resolve the managed file and report what was done. Shared with `add`.
pub fn resolve(context: &Context) -> Result<Resolution> {
    let out = &context.out;
    let reference = context.server.reference_version()?;
    let resolution = resolve_managed_file(
        &context.grammar,
        &context.apache,
        &context.synthesis_defaults(),
        reference.as_ref(),
    )
    .with_context(|| {
        format!(
            "Failed to prepare Passenger configuration in {}",
            context.apache.conf.display()
        )
    })?;

    for warning in &resolution.warnings {
        println!("{} {}", out.status(Status::Warn), warning);
    }
    for insertion in &resolution.insertions {
        println!(
            "{} {} at {}",
            out.status(Status::Added),
            out.value(&insertion.text),
            out.location(&insertion.location)
        );
    }
    if resolution.created {
        println!(
            "{} Created {} and included it from {}",
            out.status(Status::Added),
            resolution.managed.display(),
            context.apache.conf.display()
        );
    } else {
        println!(
            "{} Managed file: {}",
            out.status(Status::Ok),
            resolution.managed.display()
        );
    }

    Ok(resolution)
}
