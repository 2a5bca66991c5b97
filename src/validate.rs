//! # Ordering and Consistency Checks
//!
//! Validates a populated `DirectiveIndex`:
//!
//! - The Passenger `LoadModule` line must exist.
//! - `PassengerRoot`, `PassengerRuby` and `RailsEnv` must be discovered after
//!   it, since Apache rejects Passenger directives before the module loads.
//! - The install path in `LoadModule` must match `PassengerRoot`, and its
//!   prefix must match `PassengerRuby`.
//!
//! A `PassengerRoot` version older than the installed Passenger is reported as
//! a `Warning`, not an error.

use std::fmt;

use log::warn;
use semver::Version;

use crate::directive::{DirectiveIndex, DirectiveKind, DirectiveOccurrence};
use crate::error::{Error, Location, Result};

/// A non-fatal finding from validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// `PassengerRoot` names an older Passenger than the one installed.
    StaleVersion {
        location: Location,
        configured: Version,
        installed: Version,
    },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::StaleVersion {
                location,
                configured,
                installed,
            } => write!(
                f,
                "Passenger {configured} configured at {location} is older than installed {installed}; \
                 rerun passenger-install-apache2-module and update the Passenger lines by hand"
            ),
        }
    }
}

/// Check ordering and path consistency. `reference` is the installed
/// Passenger version, when known.
pub fn validate(index: &DirectiveIndex, reference: Option<&Version>) -> Result<Vec<Warning>> {
    let load = index
        .get(DirectiveKind::ModuleLoad)
        .ok_or_else(|| Error::ModuleLoadMissing {
            hint: Some("maybe you forgot to run: passenger-install-apache2-module".to_string()),
        })?;

    for kind in DirectiveKind::ORDERED_AFTER_MODULE {
        if let Some(dependent) = index.get(kind) {
            if dependent.order < load.order {
                return Err(Error::OrderingViolation {
                    kind,
                    module_load: load.location.clone(),
                    dependent: dependent.location.clone(),
                });
            }
        }
    }

    if let Some(root) = index.get(DirectiveKind::RootPath) {
        check_same(load, "install", root, "path", "location")?;
    }
    if let Some(ruby) = index.get(DirectiveKind::RubyInterpreter) {
        check_same(load, "prefix", ruby, "prefix", "prefix")?;
    }

    let mut warnings = Vec::new();
    if let (Some(root), Some(installed)) = (index.get(DirectiveKind::RootPath), reference) {
        if let Some(configured) = root.capture("version").and_then(lenient_version) {
            if configured < *installed {
                let warning = Warning::StaleVersion {
                    location: root.location.clone(),
                    configured,
                    installed: installed.clone(),
                };
                warn!("{}", warning);
                warnings.push(warning);
            }
        }
    }

    Ok(warnings)
}

fn check_same(
    load: &DirectiveOccurrence,
    load_group: &str,
    other: &DirectiveOccurrence,
    other_group: &str,
    what: &str,
) -> Result<()> {
    let expected = load.capture(load_group).unwrap_or_default();
    let found = other.capture(other_group).unwrap_or_default();
    if expected != found {
        return Err(Error::InconsistentPath {
            what: what.to_string(),
            expected: expected.to_string(),
            found: format!("{} {}", other.kind, found),
            location: other.location.clone(),
        });
    }
    Ok(())
}

/// Parse a dotted version, padding missing components with zero so that
/// Passenger's `2.2` compares as `2.2.0`.
pub fn lenient_version(text: &str) -> Option<Version> {
    let text = text.trim().trim_start_matches('v').trim_end_matches('.');
    let mut parts: Vec<u64> = Vec::new();
    for part in text.split('.') {
        parts.push(part.parse().ok()?);
    }
    if parts.is_empty() {
        return None;
    }
    parts.resize(parts.len().max(3), 0);
    Some(Version::new(parts[0], parts[1], parts[2]))
}
