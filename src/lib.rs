//! # Passenger Apache Configuration Library
//!
//! This library finds, checks and extends the Phusion Passenger directives
//! spread across an Apache configuration tree, and keeps per-application
//! virtual hosts and host aliases in step with it. It backs the
//! `passenger-conf` command-line tool.
//!
//! ## Quick Example
//!
//! ```
//! use passenger_conf::directive::{DirectiveKind, Grammar};
//!
//! let grammar = Grammar::new().unwrap();
//! let found = grammar.match_directives("  RailsEnv production");
//!
//! assert_eq!(found.len(), 1);
//! assert_eq!(found[0].0, DirectiveKind::RailsEnvironment);
//! assert_eq!(found[0].1["env"], "production");
//! ```
//!
//! ## Core Concepts
//!
//! - **Directives (`directive`)**: The five directive kinds, their line
//!   patterns, and the `DirectiveIndex` holding at most one occurrence of each.
//! - **Include Walk (`walker`)**: Follows `Include` lines (globs and
//!   directories included) from the root config and fills the index.
//! - **Validation (`validate`)**: `LoadModule` must exist and come first,
//!   and the Passenger paths must agree with it.
//! - **Synthesis (`synthesize`)**: Adds missing directives after their
//!   anchors and picks the file virtual hosts are written into.
//! - **Locked Rewrites (`rewrite`)**: Every file change happens under an
//!   exclusive lock and lands through an atomic rename.
//! - **Hosts and Virtual Hosts (`hosts`, `vhost`)**: Idempotent upserts of
//!   `<VirtualHost>` blocks and host-alias lines.
//! - **Collaborators (`server`, `settings`)**: The web server binary, reload
//!   and permission commands, and the YAML settings naming them.
//!
//! ## Execution Flow
//!
//! 1.  **Root Config**: `apache::ApacheConf::read` reads `ServerRoot`,
//!     `User`, `Group` and any marker-owned include.
//! 2.  **Walk**: `walker::walk` builds the directive index.
//! 3.  **Validate**: `validate::validate` rejects a broken tree before any
//!     file is touched.
//! 4.  **Synthesize**: `synthesize::resolve_managed_file` fills gaps and
//!     returns the managed file.
//! 5.  **Upsert**: `vhost::ensure_block` and `hosts::ensure_alias` add the
//!     application, reloading the server when something changed.

pub mod apache;
pub mod directive;
pub mod error;
pub mod hosts;
pub mod output;
pub mod rewrite;
pub mod server;
pub mod settings;
pub mod source;
pub mod synthesize;
pub mod validate;
pub mod vhost;
pub mod walker;

#[cfg(test)]
mod hosts_proptest;
