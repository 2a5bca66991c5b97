//! # Error Handling
//!
//! This module defines the centralized error type for `passenger-conf`. It uses
//! `thiserror` to build a single `Error` enum covering every way a run can
//! fail, each variant carrying enough context (file, line, directive) for the
//! user to find and fix the offending configuration.
//!
//! ## Key Components
//!
//! - **`Location`**: A `file:line` pair pointing at a line of Apache
//!   configuration.
//!
//! - **`Error`**: The main enum. Every variant is fatal; the tool fails closed
//!   rather than guessing at ambiguous or missing configuration.
//!
//! - **`Result<T>`**: A type alias for `std::result::Result<T, Error>`.
//!
//! The configuration failures are:
//!
//! - The Passenger `LoadModule` line is missing.
//! - A directive was found at two locations in one include walk.
//! - A dependent directive appears before `LoadModule`.
//! - Install paths disagree between related directives.
//! - The marker line is not followed by an `Include`.
//! - Every candidate filename for a new managed file is taken.
//! - An `Include` leads back into a file already being walked.
//! - A file in the include tree cannot be read.
//! - The run-as user cannot read the document root.
//!
//! The remaining variants wrap failures from the process collaborator and
//! from the libraries used for I/O, settings and patterns.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::directive::DirectiveKind;

/// A position in a configuration file, displayed as `path:line`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Location {
    /// Absolute path of the file.
    pub file: PathBuf,
    /// 1-based line number.
    pub line: usize,
}

impl Location {
    pub fn new(file: impl Into<PathBuf>, line: usize) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file.display(), self.line)
    }
}

/// Main error type for passenger-conf operations
#[derive(Error, Debug)]
pub enum Error {
    /// The Passenger `LoadModule` line was not found anywhere in the include
    /// tree. Every other directive is positioned relative to it, so nothing
    /// can be synthesized.
    #[error("LoadModule passenger_module line missing{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    ModuleLoadMissing { hint: Option<String> },

    /// The same directive was found twice during one include walk.
    #[error("{kind} was already found at {first}, found again at {second}")]
    DuplicateDirective {
        kind: DirectiveKind,
        first: Location,
        second: Location,
    },

    /// A directive that depends on the Passenger module appears before it.
    #[error("Passenger module loaded too late: {module_load} needs to come before {kind} at {dependent}")]
    OrderingViolation {
        kind: DirectiveKind,
        module_load: Location,
        dependent: Location,
    },

    /// Path fragments captured from related directives disagree.
    #[error("Passenger module {what} {expected} and {found} at {location} should be the same")]
    InconsistentPath {
        what: String,
        expected: String,
        found: String,
        location: Location,
    },

    /// The marker line was followed by something other than an `Include`.
    #[error("Non-include following marker line at {0}")]
    NonIncludeAfterMarker(Location),

    /// All candidate filenames for a new managed config file exist already.
    #[error("Couldn't find a unique filename in {}", dir.display())]
    NoUniqueFilename { dir: PathBuf },

    /// An `Include` leads back into a file that is still being walked.
    #[error("Include cycle detected: {chain}")]
    IncludeCycle { chain: String },

    /// The root config of an include walk could not be read.
    #[error("Cannot read {}: {source}", file.display())]
    ConfigUnreadable {
        file: PathBuf,
        source: std::io::Error,
    },

    /// A file reached through an `Include` line could not be read.
    #[error("Cannot read {} (included at {included_at}): {source}", file.display())]
    IncludeUnreadable {
        file: PathBuf,
        included_at: Location,
        source: std::io::Error,
    },

    /// The configured run-as user cannot read the document root.
    #[error("Your Apache user \"{user}\" can't read your document root \"{}\"", dir.display())]
    PermissionCheckFailed { user: String, dir: PathBuf },

    /// An external command could not be run or reported failure.
    #[error("Command failed: {command} - {message}")]
    Command { command: String, message: String },

    /// A value was missing from the web server's compiled-in settings.
    #[error("Web server did not report {key}")]
    ServerQuery { key: String },

    /// The settings file could not be understood.
    #[error("Settings error: {message}")]
    ConfigParse { message: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A YAML parsing error, wrapped from `serde_yaml::Error`.
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A regular expression error, wrapped from `regex::Error`.
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    /// A glob pattern error, wrapped from `glob::PatternError`.
    #[error("Glob pattern error: {0}")]
    Glob(#[from] glob::PatternError),
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
