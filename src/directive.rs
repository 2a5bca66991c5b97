//! # Directive Kinds and the Directive Index
//!
//! The tool tracks exactly five Apache directives. Each one is a variant of
//! the closed `DirectiveKind` enum, and everything that differs between them
//! (the line pattern, the label shown to users, the anchor a synthesized copy
//! is placed after) is data on the variant rather than a per-kind branch.
//!
//! ## Key Components
//!
//! - **`DirectiveKind`**: The five kinds, with `pattern`, `label` and `anchor`.
//! - **`Grammar`**: All line patterns compiled once, including the helper
//!   patterns for `Include`, `User`, `Group`, `ServerRoot` and `ServerName`.
//! - **`DirectiveOccurrence`**: Where a kind was found and what it captured.
//! - **`DirectiveIndex`**: At most one occurrence per kind for one include
//!   walk, plus the discovery counter that orders them.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use regex::Regex;

use crate::error::{Error, Location, Result};

/// One of the directives the tool locates and, when missing, synthesizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DirectiveKind {
    /// `LoadModule passenger_module .../mod_passenger.so`
    ModuleLoad,
    /// `PassengerRoot ...`
    RootPath,
    /// `PassengerRuby .../bin/ruby`
    RubyInterpreter,
    /// `RailsEnv ...`
    RailsEnvironment,
    /// `NameVirtualHost ...`
    NameVirtualHost,
}

impl DirectiveKind {
    /// Every kind, in walk-matching order.
    pub const ALL: [DirectiveKind; 5] = [
        DirectiveKind::ModuleLoad,
        DirectiveKind::RootPath,
        DirectiveKind::RubyInterpreter,
        DirectiveKind::RailsEnvironment,
        DirectiveKind::NameVirtualHost,
    ];

    /// The kinds that can be synthesized, in dependency order. Each one's
    /// anchor is either `ModuleLoad` or the kind before it.
    pub const DEPENDENTS: [DirectiveKind; 4] = [
        DirectiveKind::RootPath,
        DirectiveKind::RubyInterpreter,
        DirectiveKind::RailsEnvironment,
        DirectiveKind::NameVirtualHost,
    ];

    /// The kinds that must be discovered after `ModuleLoad`.
    pub const ORDERED_AFTER_MODULE: [DirectiveKind; 3] = [
        DirectiveKind::RootPath,
        DirectiveKind::RubyInterpreter,
        DirectiveKind::RailsEnvironment,
    ];

    /// The name shown to users, matching the directive as written in Apache
    /// configuration.
    pub fn label(self) -> &'static str {
        match self {
            DirectiveKind::ModuleLoad => "LoadModule passenger_module",
            DirectiveKind::RootPath => "PassengerRoot",
            DirectiveKind::RubyInterpreter => "PassengerRuby",
            DirectiveKind::RailsEnvironment => "RailsEnv",
            DirectiveKind::NameVirtualHost => "NameVirtualHost",
        }
    }

    /// The line pattern. Case-insensitive and anchored at line start after
    /// optional whitespace, with named captures:
    ///
    /// - `ModuleLoad`: `install`, `prefix`, `version`
    /// - `RootPath`: `path`, `version`
    /// - `RubyInterpreter`: `prefix`
    /// - `RailsEnvironment`: `env`
    /// - `NameVirtualHost`: `address`
    pub fn pattern(self) -> &'static str {
        match self {
            DirectiveKind::ModuleLoad => {
                r#"(?i)^\s*LoadModule\s+passenger_module\s+["']?(?P<install>(?P<prefix>/\S+)/lib/ruby/gems/\S+/passenger-(?P<version>\d[\d.]*))/ext/apache2/mod_passenger\.so"#
            }
            DirectiveKind::RootPath => {
                r#"(?i)^\s*PassengerRoot\s+["']?(?P<path>/\S+/lib/ruby/gems/\S+/passenger-(?P<version>\d[\d.]*))["']?(?:\s|$)"#
            }
            DirectiveKind::RubyInterpreter => {
                r#"(?i)^\s*PassengerRuby\s+["']?(?P<prefix>/\S+)/bin/ruby["']?(?:\s|$)"#
            }
            DirectiveKind::RailsEnvironment => r#"(?i)^\s*RailsEnv\s+["']?(?P<env>[^\s"']+)"#,
            DirectiveKind::NameVirtualHost => r#"(?i)^\s*NameVirtualHost\s+(?P<address>\S+)"#,
        }
    }

    /// The kind a synthesized copy of this directive is inserted after.
    pub fn anchor(self) -> Option<DirectiveKind> {
        match self {
            DirectiveKind::ModuleLoad => None,
            DirectiveKind::RootPath => Some(DirectiveKind::ModuleLoad),
            DirectiveKind::RubyInterpreter => Some(DirectiveKind::RootPath),
            DirectiveKind::RailsEnvironment => Some(DirectiveKind::RubyInterpreter),
            DirectiveKind::NameVirtualHost => Some(DirectiveKind::RailsEnvironment),
        }
    }
}

impl fmt::Display for DirectiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Named capture groups from a directive match.
pub type Captures = BTreeMap<String, String>;

/// Compiled line patterns for every directive the tool reads.
#[derive(Debug, Clone)]
pub struct Grammar {
    directives: Vec<(DirectiveKind, Regex)>,
    include: Regex,
    user: Regex,
    group: Regex,
    server_root: Regex,
    server_name: Regex,
}

impl Grammar {
    pub fn new() -> Result<Self> {
        let directives = DirectiveKind::ALL
            .iter()
            .map(|kind| Ok((*kind, Regex::new(kind.pattern())?)))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            directives,
            include: Regex::new(
                r#"(?i)^\s*Include(?:Optional)?\s+(?:"(?P<dq>[^"]+)"|'(?P<sq>[^']+)'|(?P<bare>\S+))"#,
            )?,
            user: Regex::new(r"(?i)^\s*User\s+(\S+)")?,
            group: Regex::new(r"(?i)^\s*Group\s+(\S+)")?,
            server_root: Regex::new(r#"(?i)^\s*ServerRoot\s+["']?([^"'\s]+)["']?"#)?,
            server_name: Regex::new(r"(?i)^\s*ServerName\s+(\S+)")?,
        })
    }

    /// Every directive kind `line` matches, with its named captures.
    pub fn match_directives(&self, line: &str) -> Vec<(DirectiveKind, Captures)> {
        self.directives
            .iter()
            .filter_map(|(kind, regex)| {
                regex.captures(line).map(|caps| {
                    let captures = regex
                        .capture_names()
                        .flatten()
                        .filter_map(|name| {
                            caps.name(name)
                                .map(|m| (name.to_string(), m.as_str().to_string()))
                        })
                        .collect();
                    (*kind, captures)
                })
            })
            .collect()
    }

    /// The path or glob named by an `Include` or `IncludeOptional` line,
    /// without surrounding quotes.
    pub fn include_target<'a>(&self, line: &'a str) -> Option<&'a str> {
        let caps = self.include.captures(line)?;
        caps.name("dq")
            .or_else(|| caps.name("sq"))
            .or_else(|| caps.name("bare"))
            .map(|m| m.as_str())
    }

    pub fn user(&self, line: &str) -> Option<String> {
        first_group(&self.user, line)
    }

    pub fn group(&self, line: &str) -> Option<String> {
        first_group(&self.group, line)
    }

    pub fn server_root(&self, line: &str) -> Option<String> {
        first_group(&self.server_root, line)
    }

    pub fn server_name(&self, line: &str) -> Option<String> {
        first_group(&self.server_name, line)
    }
}

fn first_group(regex: &Regex, line: &str) -> Option<String> {
    regex
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Where a directive was found during one include walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectiveOccurrence {
    pub kind: DirectiveKind,
    pub location: Location,
    pub captures: Captures,
    /// Position in discovery order across the whole walk, starting at 1.
    pub order: usize,
}

impl DirectiveOccurrence {
    pub fn file(&self) -> &Path {
        &self.location.file
    }

    pub fn line(&self) -> usize {
        self.location.line
    }

    pub fn capture(&self, name: &str) -> Option<&str> {
        self.captures.get(name).map(String::as_str)
    }
}

/// The directives found by one include walk, at most one per kind.
#[derive(Debug, Clone, Default)]
pub struct DirectiveIndex {
    occurrences: BTreeMap<DirectiveKind, DirectiveOccurrence>,
    last_order: usize,
}

impl DirectiveIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a sighting. A second sighting of the same kind is an error;
    /// the first one is kept.
    pub fn record(
        &mut self,
        kind: DirectiveKind,
        location: Location,
        captures: Captures,
    ) -> Result<&DirectiveOccurrence> {
        if let Some(existing) = self.occurrences.get(&kind) {
            return Err(Error::DuplicateDirective {
                kind,
                first: existing.location.clone(),
                second: location,
            });
        }

        self.last_order += 1;
        let occurrence = DirectiveOccurrence {
            kind,
            location,
            captures,
            order: self.last_order,
        };
        Ok(self.occurrences.entry(kind).or_insert(occurrence))
    }

    pub fn get(&self, kind: DirectiveKind) -> Option<&DirectiveOccurrence> {
        self.occurrences.get(&kind)
    }

    pub fn contains(&self, kind: DirectiveKind) -> bool {
        self.occurrences.contains_key(&kind)
    }

    pub fn len(&self) -> usize {
        self.occurrences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.occurrences.is_empty()
    }

    /// Occurrences sorted by discovery order.
    pub fn in_discovery_order(&self) -> Vec<&DirectiveOccurrence> {
        let mut occurrences: Vec<_> = self.occurrences.values().collect();
        occurrences.sort_by_key(|occurrence| occurrence.order);
        occurrences
    }

    /// Account for `count` lines inserted into `file` after line `after`:
    /// every occurrence below that point moves down.
    pub fn shift_lines(&mut self, file: &Path, after: usize, count: usize) {
        for occurrence in self.occurrences.values_mut() {
            if occurrence.location.file == file && occurrence.location.line > after {
                occurrence.location.line += count;
            }
        }
    }
}
