//! # Hosts Command Implementation
//!
//! Compares the names under the configured domain in the host-alias file
//! with the `ServerName`s of the virtual hosts in the Apache configuration
//! tree. With `--apply`, virtual hosts lacking an alias get one; names only
//! present in the host-alias file are reported and never removed.

use std::collections::BTreeSet;
use std::fs;

use anyhow::{Context as _, Result};
use clap::Args;

use passenger_conf::hosts::{diff, host_names, merge, vhost_names};
use passenger_conf::output::Status;
use passenger_conf::walker;

use super::common::{ConfArgs, Context};
use crate::cli::GlobalArgs;

/// Compare host aliases with configured virtual hosts
#[derive(Args, Debug)]
pub struct HostsArgs {
    /// Append missing names to the host-alias file.
    #[arg(long)]
    pub apply: bool,

    #[command(flatten)]
    pub conf: ConfArgs,
}

/// Execute the `hosts` command.
pub fn execute(args: HostsArgs, global: &GlobalArgs) -> Result<()> {
    let context = Context::load(global, &args.conf)?;
    let out = &context.out;
    let settings = &context.settings;
    let apache = &context.apache;

    let walk = walker::walk(&context.grammar, &apache.conf, &apache.server_root)?;
    let mut vhosts = BTreeSet::new();
    let files: BTreeSet<_> = walk.visited().iter().collect();
    for file in files {
        let contents = fs::read_to_string(file)
            .with_context(|| format!("Failed to read {}", file.display()))?;
        vhosts.extend(vhost_names(&context.grammar, &contents, &settings.domain));
    }
    let vhosts: Vec<String> = vhosts.into_iter().collect();

    let hosts_contents = fs::read_to_string(&settings.hosts_file)
        .with_context(|| format!("Failed to read {}", settings.hosts_file.display()))?;
    let aliases = host_names(&hosts_contents, &settings.domain);

    let difference = diff(&aliases, &vhosts);
    if difference.is_empty() {
        println!(
            "{} {} and the virtual hosts agree on {} name(s) under {}",
            out.status(Status::Ok),
            settings.hosts_file.display(),
            vhosts.len(),
            settings.domain
        );
        return Ok(());
    }

    for name in &difference.missing_from_hosts {
        println!(
            "{} {} has no entry in {}",
            out.status(Status::Info),
            out.value(name),
            settings.hosts_file.display()
        );
    }
    for name in &difference.missing_from_vhosts {
        println!(
            "{} {} has no virtual host",
            out.status(Status::Info),
            out.value(name)
        );
    }

    if args.apply && !difference.missing_from_hosts.is_empty() {
        let added = merge(
            &settings.hosts_file,
            &settings.ip,
            &difference.missing_from_hosts,
        )
        .with_context(|| format!("Failed to update {}", settings.hosts_file.display()))?;
        println!(
            "{} Added {} name(s) to {}",
            out.status(Status::Added),
            added,
            settings.hosts_file.display()
        );
    }

    Ok(())
}
