//! # Check Command Implementation
//!
//! This module implements the `check` subcommand, a read-only inspection of
//! the Apache configuration tree.
//!
//! ## Functionality
//!
//! - **Directive Report**: Walks the include tree from the root config and
//!   lists every Passenger directive with its `file:line`, discovery order,
//!   and the chain of `Include` lines that reached it.
//!
//! - **Validation**: Runs the ordering and path checks. A failed check is
//!   reported as an error; a Passenger install newer than the configured one
//!   is a warning.
//!
//! - **Include Tree**: Prints the include hierarchy with `ptree`.
//!
//! Nothing is written to disk.

use std::borrow::Cow;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Args;
use ptree::{print_tree, TreeItem};

use passenger_conf::directive::DirectiveKind;
use passenger_conf::error::Location;
use passenger_conf::output::Status;
use passenger_conf::server::ServerControl;
use passenger_conf::validate::validate;
use passenger_conf::walker::{self, Walk};

use super::common::{ConfArgs, Context};
use crate::cli::GlobalArgs;

/// Walk the Apache config and report every Passenger directive found
#[derive(Args, Debug)]
pub struct CheckArgs {
    #[command(flatten)]
    pub conf: ConfArgs,

    /// Skip printing the include tree.
    #[arg(long)]
    pub no_tree: bool,
}

/// Execute the `check` command.
pub fn execute(args: CheckArgs, global: &GlobalArgs) -> Result<()> {
    let context = Context::load(global, &args.conf)?;
    let out = &context.out;
    let apache = &context.apache;

    println!(
        "{} Walking {} (server root {})",
        out.status(Status::Scan),
        apache.conf.display(),
        apache.server_root.display()
    );
    if let Some(managed) = &apache.marker_include {
        println!(
            "{} Managed file: {}",
            out.status(Status::Info),
            managed.display()
        );
    }

    let walk = walker::walk(&context.grammar, &apache.conf, &apache.server_root)?;

    for occurrence in walk.index.in_discovery_order() {
        println!(
            "{:>3}. {} at {}",
            occurrence.order,
            occurrence.kind,
            out.location(&occurrence.location)
        );
        for include in walk.include_chain(occurrence.file()) {
            println!("       via {}", out.location(&include));
        }
    }

    let reference = context.server.reference_version()?;
    let warnings = validate(&walk.index, reference.as_ref())?;
    for warning in &warnings {
        println!("{} {}", out.status(Status::Warn), warning);
    }

    let missing: Vec<String> = DirectiveKind::DEPENDENTS
        .iter()
        .filter(|kind| !walk.index.contains(**kind))
        .map(|kind| kind.to_string())
        .collect();
    if missing.is_empty() {
        println!("{} All Passenger directives present", out.status(Status::Ok));
    } else {
        println!(
            "{} Missing: {} (run `passenger-conf setup` to add them)",
            out.status(Status::Info),
            missing.join(", ")
        );
    }

    if !args.no_tree {
        println!();
        print_tree(&include_tree(&walk))?;
    }

    Ok(())
}

/// The include hierarchy rooted at the walk's root config.
fn include_tree(walk: &Walk) -> TreeNode {
    let edges = walk.edges();
    build_tree_node(walk.root(), None, &edges)
}

fn build_tree_node(file: &Path, line: Option<usize>, edges: &[(Location, PathBuf)]) -> TreeNode {
    let label = match line {
        Some(line) => format!("{} (line {})", file.display(), line),
        None => file.display().to_string(),
    };
    let children = edges
        .iter()
        .filter(|(parent, _)| parent.file == file)
        .map(|(parent, child)| build_tree_node(child, Some(parent.line), edges))
        .collect();
    TreeNode { label, children }
}

/// Tree node structure for ptree visualization
#[derive(Clone)]
struct TreeNode {
    label: String,
    children: Vec<TreeNode>,
}

impl TreeItem for TreeNode {
    type Child = TreeNode;

    fn write_self<W: io::Write>(&self, f: &mut W, _style: &ptree::Style) -> io::Result<()> {
        write!(f, "{}", self.label)
    }

    fn children(&self) -> Cow<'_, [Self::Child]> {
        Cow::Borrowed(&self.children)
    }
}
