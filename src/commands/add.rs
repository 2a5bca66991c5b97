//! # Add Command Implementation
//!
//! Serves an application under `<APP><domain>`:
//!
//! 1.  Prepares the Passenger configuration exactly as `setup` does.
//! 2.  Checks that the Apache run-as user can read `<root>/public`.
//! 3.  Adds a `<VirtualHost>` block for the application to the managed file.
//! 4.  Adds a host-alias line so the name resolves locally.
//!
//! The web server is reloaded once if anything in its configuration changed.

use std::env;
use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::Args;
use log::{debug, warn};

use passenger_conf::directive::DirectiveKind;
use passenger_conf::hosts;
use passenger_conf::output::Status;
use passenger_conf::server::{check_permissions, ServerControl};
use passenger_conf::vhost::{ensure_block, VirtualHostRecord};
use passenger_conf::walker::{self, absolutize};

use super::common::{ConfArgs, Context};
use super::setup;
use crate::cli::GlobalArgs;

/// Serve an application under <APP><domain>
#[derive(Args, Debug)]
pub struct AddArgs {
    /// Application name, used as the host name before the domain suffix
    pub app: String,

    /// Application directory; its `public` subdirectory is the document root.
    ///
    /// Defaults to the current directory.
    #[arg(long, value_name = "DIR")]
    pub root: Option<PathBuf>,

    #[command(flatten)]
    pub conf: ConfArgs,
}

/// Execute the `add` command.
pub fn execute(args: AddArgs, global: &GlobalArgs) -> Result<()> {
    let context = Context::load(global, &args.conf)?;
    let out = &context.out;
    let settings = &context.settings;

    let cwd = env::current_dir().context("Failed to determine the current directory")?;
    let root = match &args.root {
        Some(root) => absolutize(root, &cwd),
        None => cwd,
    };
    let document_root = root.join("public");

    let resolution = setup::resolve(&context)?;

    match &context.apache.user {
        Some(user) => check_permissions(&context.server, user, &document_root)?,
        None => warn!(
            "No User directive in {}; skipping the document root permission check",
            context.apache.conf.display()
        ),
    }

    let record = VirtualHostRecord::new(&args.app, &settings.domain, &document_root);
    let address = match &resolution.listen {
        Some(listen) => listen.clone(),
        None => configured_listen(&context).unwrap_or_else(|| settings.listen.clone()),
    };
    let changed = ensure_block(&resolution.managed, &record, &address, &context.server)
        .with_context(|| format!("Failed to update {}", resolution.managed.display()))?;
    if changed {
        println!(
            "{} Virtual host {} serving {}",
            out.status(Status::Added),
            out.value(&record.server_name),
            document_root.display()
        );
    } else {
        println!(
            "{} Virtual host {} already configured",
            out.status(Status::Ok),
            out.value(&record.server_name)
        );
        if resolution.created || !resolution.insertions.is_empty() {
            context.server.reload()?;
        }
    }

    let aliased = hosts::ensure_alias(&settings.hosts_file, &settings.ip, &record.server_name)
        .with_context(|| format!("Failed to update {}", settings.hosts_file.display()))?;
    if aliased {
        println!(
            "{} {} {} added to {}",
            out.status(Status::Added),
            settings.ip,
            record.server_name,
            settings.hosts_file.display()
        );
    }

    Ok(())
}

/// The `NameVirtualHost` address in the include tree, when it can be read.
fn configured_listen(context: &Context) -> Option<String> {
    let apache = &context.apache;
    match walker::walk(&context.grammar, &apache.conf, &apache.server_root) {
        Ok(walk) => walk
            .index
            .get(DirectiveKind::NameVirtualHost)
            .and_then(|occurrence| occurrence.capture("address"))
            .map(str::to_string),
        Err(e) => {
            debug!("Could not walk {}: {}", apache.conf.display(), e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Wrapper {
        #[command(flatten)]
        args: AddArgs,
    }

    #[test]
    fn test_root_defaults_to_none() {
        let wrapper = Wrapper::try_parse_from(["add", "blog"]).unwrap();
        assert_eq!(wrapper.args.app, "blog");
        assert!(wrapper.args.root.is_none());
        assert!(wrapper.args.conf.conf.is_none());
    }
}
