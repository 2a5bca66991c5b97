//! # Directive Synthesis and the Managed File
//!
//! Fills in whatever Passenger directives the include tree is missing and
//! decides which file this tool writes virtual hosts into.
//!
//! ## Process
//!
//! 1.  **Marker Short-Circuit**: If the root config already carries the
//!     marker block, the file it includes is the managed file and nothing
//!     else is examined.
//!
//! 2.  **Walk and Validate**: Otherwise the include tree is walked and
//!     validated. A missing `LoadModule` stops everything here.
//!
//! 3.  **Synthesis**: `PassengerRoot`, `PassengerRuby`, `RailsEnv` and
//!     `NameVirtualHost` are added in that order, each on the line after
//!     its anchor, with text derived from what is already configured. The
//!     index is then validated again.
//!
//! 4.  **Managed File**: The file holding `RailsEnv` is reused when it comes
//!     after `NameVirtualHost` and is not the root config. Otherwise a new
//!     file is created under `extra/` and wired in with the marker block.

use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use log::info;
use semver::Version;

use crate::apache::{ApacheConf, MARKER};
use crate::directive::{DirectiveIndex, DirectiveKind, Grammar};
use crate::error::{Error, Location, Result};
use crate::rewrite;
use crate::validate::{validate, Warning};
use crate::walker;

/// Directory, next to the root config, that holds a newly created managed file.
pub const EXTRA_DIR: &str = "extra";

/// Names tried, in order, for a newly created managed file.
pub const CANDIDATE_NAMES: [&str; 5] = [
    "passenger.conf",
    "mod_rails.conf",
    "httpd-passenger.conf",
    "httpd-mod_rails.conf",
    "j20qmcjidhe93knd.conf",
];

/// Values used for synthesized directives that nothing else determines.
#[derive(Debug, Clone)]
pub struct SynthesisDefaults {
    pub rails_env: String,
    pub listen: String,
}

/// A directive line added by `ensure_all`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Insertion {
    pub kind: DirectiveKind,
    pub location: Location,
    pub text: String,
}

/// The text for a synthesized `kind`, derived from the `LoadModule` line.
pub fn directive_text(
    kind: DirectiveKind,
    index: &DirectiveIndex,
    defaults: &SynthesisDefaults,
) -> Result<String> {
    let load = index
        .get(DirectiveKind::ModuleLoad)
        .ok_or(Error::ModuleLoadMissing { hint: None })?;
    let load_capture = |name: &str| load.capture(name).unwrap_or_default().to_string();

    Ok(match kind {
        DirectiveKind::ModuleLoad => return Err(Error::ModuleLoadMissing { hint: None }),
        DirectiveKind::RootPath => format!("PassengerRoot {}", load_capture("install")),
        DirectiveKind::RubyInterpreter => {
            format!("PassengerRuby {}/bin/ruby", load_capture("prefix"))
        }
        DirectiveKind::RailsEnvironment => format!("RailsEnv {}", defaults.rails_env),
        DirectiveKind::NameVirtualHost => format!("NameVirtualHost {}", defaults.listen),
    })
}

/// Add every missing dependent directive after its anchor, then validate.
///
/// Running this on an index that already has all five kinds changes nothing.
pub fn ensure_all(
    grammar: &Grammar,
    index: &mut DirectiveIndex,
    defaults: &SynthesisDefaults,
) -> Result<Vec<Insertion>> {
    validate(index, None)?;

    let mut insertions = Vec::new();
    for kind in DirectiveKind::DEPENDENTS {
        if index.contains(kind) {
            continue;
        }

        let text = directive_text(kind, index, defaults)?;
        let anchor_kind = kind.anchor().unwrap_or(DirectiveKind::ModuleLoad);
        let anchor = index
            .get(anchor_kind)
            .map(|occurrence| occurrence.location.clone())
            .ok_or(Error::ModuleLoadMissing { hint: None })?;

        rewrite::insert_after_line(&anchor.file, anchor.line, &text)?;
        index.shift_lines(&anchor.file, anchor.line, 1);

        let location = Location::new(&anchor.file, anchor.line + 1);
        let captures = grammar
            .match_directives(&text)
            .into_iter()
            .find(|(matched, _)| *matched == kind)
            .map(|(_, captures)| captures)
            .unwrap_or_default();
        index.record(kind, location.clone(), captures)?;

        info!("Added {} at {}", kind, location);
        insertions.push(Insertion {
            kind,
            location,
            text,
        });
    }

    validate(index, None)?;
    Ok(insertions)
}

/// How the managed file was found.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub managed: PathBuf,
    /// Set when the file was created by this run.
    pub created: bool,
    pub insertions: Vec<Insertion>,
    pub warnings: Vec<Warning>,
    /// The `NameVirtualHost` address, when the include tree was walked.
    pub listen: Option<String>,
}

/// Find (or create) the file virtual hosts are written into, synthesizing
/// missing directives along the way.
pub fn resolve_managed_file(
    grammar: &Grammar,
    apache: &ApacheConf,
    defaults: &SynthesisDefaults,
    reference: Option<&Version>,
) -> Result<Resolution> {
    if let Some(managed) = &apache.marker_include {
        return Ok(Resolution {
            managed: managed.clone(),
            created: false,
            insertions: Vec::new(),
            warnings: Vec::new(),
            listen: None,
        });
    }

    let mut walk = walker::walk(grammar, &apache.conf, &apache.server_root)?;
    let warnings = validate(&walk.index, reference)?;
    let insertions = ensure_all(grammar, &mut walk.index, defaults)?;

    let rails_env = walk.index.get(DirectiveKind::RailsEnvironment);
    let name_vhost = walk.index.get(DirectiveKind::NameVirtualHost);
    let listen = name_vhost
        .and_then(|occurrence| occurrence.capture("address"))
        .map(str::to_string);

    if let (Some(rails_env), Some(name_vhost)) = (rails_env, name_vhost) {
        if rails_env.order > name_vhost.order && rails_env.file() != apache.conf {
            return Ok(Resolution {
                managed: rails_env.file().to_path_buf(),
                created: false,
                insertions,
                warnings,
                listen,
            });
        }
    }

    Ok(Resolution {
        managed: create_marker_file(&apache.conf)?,
        created: true,
        insertions,
        warnings,
        listen,
    })
}

/// Create a new managed file under `extra/` next to `conf` and append the
/// marker block including it to `conf`.
pub fn create_marker_file(conf: &Path) -> Result<PathBuf> {
    let dir = conf
        .parent()
        .map(|parent| parent.join(EXTRA_DIR))
        .unwrap_or_else(|| PathBuf::from(EXTRA_DIR));
    ensure_dir(&dir)?;

    for name in CANDIDATE_NAMES {
        let candidate = dir.join(name);
        match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&candidate)
        {
            Ok(_) => {
                rewrite::append(conf, &marker_block(&candidate))?;
                info!("Created {}", candidate.display());
                return Ok(candidate);
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(e.into()),
        }
    }

    Err(Error::NoUniqueFilename { dir })
}

/// The marker line and the `Include` line for `file`.
pub fn marker_block(file: &Path) -> String {
    let path = file.display().to_string();
    if path.chars().any(char::is_whitespace) {
        format!("{MARKER}\nInclude \"{path}\"")
    } else {
        format!("{MARKER}\nInclude {path}")
    }
}

fn ensure_dir(dir: &Path) -> Result<()> {
    if dir.is_dir() {
        return Ok(());
    }
    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o755);
    }
    builder.create(dir)?;
    Ok(())
}
