//! Facts read from the root Apache config file.

use std::path::{Path, PathBuf};

use crate::directive::Grammar;
use crate::error::{Error, Location, Result};
use crate::source::LineSource;
use crate::walker::absolutize;

/// The comment line marking an `Include` owned by this tool. Must be written
/// and matched byte for byte.
pub const MARKER: &str = "#----- passenger-conf marker line -- DO NOT DELETE -----#";

/// The root config and the values read from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApacheConf {
    /// Absolute path of the root config.
    pub conf: PathBuf,
    /// Base for relative paths: the `ServerRoot` directive, else the
    /// compiled-in default.
    pub server_root: PathBuf,
    pub user: Option<String>,
    pub group: Option<String>,
    /// The file included under the marker line, if this tool already owns one.
    pub marker_include: Option<PathBuf>,
}

impl ApacheConf {
    /// Read `conf`, falling back to `default_root` when it has no `ServerRoot`.
    pub fn read(grammar: &Grammar, conf: &Path, default_root: &Path) -> Result<Self> {
        let conf = absolutize(conf, default_root);
        let source = LineSource::open(&conf)?;

        let mut server_root = None;
        let mut user = None;
        let mut group = None;
        for (_, line) in source.numbered() {
            if server_root.is_none() {
                server_root = grammar.server_root(line).map(PathBuf::from);
            }
            if user.is_none() {
                user = grammar.user(line);
            }
            if group.is_none() {
                group = grammar.group(line);
            }
        }

        let server_root = server_root.unwrap_or_else(|| default_root.to_path_buf());
        let marker_include = marker_include(grammar, &source)?
            .map(|target| absolutize(Path::new(&target), &server_root));

        Ok(Self {
            conf,
            server_root,
            user,
            group,
            marker_include,
        })
    }
}

/// The include target following the marker line. Blank and comment lines
/// may sit in between; anything else is an error.
fn marker_include(grammar: &Grammar, source: &LineSource) -> Result<Option<String>> {
    let Some((marker_line, _)) = source
        .numbered()
        .find(|(_, line)| line.trim_end() == MARKER)
    else {
        return Ok(None);
    };

    for (number, line) in source.numbered().skip(marker_line) {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        return match grammar.include_target(line) {
            Some(target) => Ok(Some(target.to_string())),
            None => Err(Error::NonIncludeAfterMarker(Location::new(source.path(), number))),
        };
    }

    Err(Error::NonIncludeAfterMarker(Location::new(
        source.path(),
        marker_line,
    )))
}
