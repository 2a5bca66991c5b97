//! # CLI Command Implementations
//!
//! One file per subcommand of `passenger-conf`. Each contains:
//! - An `Args` struct derived with `clap`, flattening the shared
//!   `common::ConfArgs` overrides.
//! - An `execute` function taking the parsed `Args` and the global flags.
//!
//! `common` builds the `Context` every command starts from: settings with
//! command-line overrides applied, the root Apache config, and the server
//! collaborator.

pub mod add;
pub mod check;
pub mod common;
pub mod hosts;
pub mod setup;
