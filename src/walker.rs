//! # Include Graph Walker
//!
//! Starting from the root Apache config, the walker reads every file reachable
//! through `Include` / `IncludeOptional` lines and records each directive it
//! finds into a `DirectiveIndex`.
//!
//! ## Process
//!
//! 1.  **Line Matching**: Each line is tested against all directive patterns.
//!     A kind seen a second time is a `DuplicateDirective` error.
//!
//! 2.  **Include Expansion**: An `Include` target is resolved against the
//!     server root (never the process working directory) and expanded as a
//!     glob. Directories expand to the files inside them. The matches are
//!     walked in sorted order before the next line of the including file,
//!     exactly as Apache splices them in.
//!
//! 3.  **Cycle Detection**: Traversal uses an explicit stack of open files.
//!     Reaching a file that is already on the stack is an `IncludeCycle`
//!     error naming the whole chain. The same file included from two
//!     separate branches is walked each time.
//!
//! 4.  **Parent Map**: Every include edge is recorded, so the chain of
//!     `Include` lines leading from the root to any file can be reported.

use std::collections::{BTreeMap, VecDeque};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::directive::{DirectiveIndex, Grammar};
use crate::error::{Error, Location, Result};
use crate::source::LineSource;

/// The outcome of walking one include graph.
#[derive(Debug, Clone)]
pub struct Walk {
    pub index: DirectiveIndex,
    root: PathBuf,
    visited: Vec<PathBuf>,
    parents: BTreeMap<PathBuf, Vec<Location>>,
}

impl Walk {
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Files in the order they were opened. A file included from two
    /// branches appears twice.
    pub fn visited(&self) -> &[PathBuf] {
        &self.visited
    }

    /// The `Include` lines that pulled `file` in.
    pub fn includers(&self, file: &Path) -> &[Location] {
        self.parents.get(file).map(Vec::as_slice).unwrap_or_default()
    }

    /// The `Include` lines leading from the root config down to `file`,
    /// following the first includer at each step. Empty for the root itself
    /// and for files the walk never reached.
    pub fn include_chain(&self, file: &Path) -> Vec<Location> {
        let mut chain = Vec::new();
        let mut current = file.to_path_buf();

        while current != self.root {
            let Some(parent) = self.includers(&current).first() else {
                return Vec::new();
            };
            if chain.contains(parent) {
                break;
            }
            chain.push(parent.clone());
            current = parent.file.clone();
        }

        chain.reverse();
        chain
    }

    /// Include edges as `(parent, child)` pairs, sorted by parent file and line.
    pub fn edges(&self) -> Vec<(Location, PathBuf)> {
        let mut edges: Vec<(Location, PathBuf)> = self
            .parents
            .iter()
            .flat_map(|(child, parents)| {
                parents
                    .iter()
                    .map(move |parent| (parent.clone(), child.clone()))
            })
            .collect();
        edges.sort_by(|a, b| (&a.0.file, a.0.line, &a.1).cmp(&(&b.0.file, b.0.line, &b.1)));
        edges
    }
}

/// An open file on the traversal stack.
struct Frame {
    source: LineSource,
    /// Canonical path, used to recognise the same file under two spellings.
    key: PathBuf,
    next: usize,
    pending: VecDeque<PathBuf>,
    include_line: usize,
}

enum Step {
    Include(PathBuf, Location),
    Line(Location, String),
    Done,
}

impl Frame {
    /// Open `path`, reached through the `Include` at `included_at` (`None`
    /// for the root config).
    fn open(path: &Path, included_at: Option<&Location>) -> Result<Self> {
        debug!("Walking {}", path.display());
        let unreadable = |source: io::Error| match included_at {
            Some(at) => Error::IncludeUnreadable {
                file: path.to_path_buf(),
                included_at: at.clone(),
                source,
            },
            None => Error::ConfigUnreadable {
                file: path.to_path_buf(),
                source,
            },
        };
        let contents = fs::read_to_string(path).map_err(unreadable)?;
        let key = fs::canonicalize(path).map_err(unreadable)?;
        Ok(Self {
            source: LineSource::from_contents(path, &contents),
            key,
            next: 1,
            pending: VecDeque::new(),
            include_line: 0,
        })
    }

    fn advance(&mut self) -> Step {
        if let Some(child) = self.pending.pop_front() {
            let at = Location::new(self.source.path(), self.include_line);
            return Step::Include(child, at);
        }

        match self.source.line(self.next) {
            Some(text) => {
                let step = Step::Line(Location::new(self.source.path(), self.next), text.to_string());
                self.next += 1;
                step
            }
            None => Step::Done,
        }
    }
}

/// Walk the include graph rooted at `root`.
///
/// Relative paths, both `root` itself and every `Include` target, are
/// resolved against `server_root`.
pub fn walk(grammar: &Grammar, root: &Path, server_root: &Path) -> Result<Walk> {
    let root = absolutize(root, server_root);
    let mut walk = Walk {
        index: DirectiveIndex::new(),
        root: root.clone(),
        visited: vec![root.clone()],
        parents: BTreeMap::new(),
    };
    let mut stack = vec![Frame::open(&root, None)?];

    while let Some(frame) = stack.last_mut() {
        match frame.advance() {
            Step::Done => {
                stack.pop();
            }
            Step::Line(location, text) => {
                for (kind, captures) in grammar.match_directives(&text) {
                    debug!("Found {} at {}", kind, location);
                    walk.index.record(kind, location.clone(), captures)?;
                }

                if let Some(target) = grammar.include_target(&text) {
                    let files = expand_include(target, server_root, &location)?;
                    if files.is_empty() {
                        warn!("Include at {} matched no files: {}", location, target);
                    }
                    frame.pending = files.into();
                    frame.include_line = location.line;
                }
            }
            Step::Include(child, at) => {
                let child_frame = Frame::open(&child, Some(&at))?;
                if stack.iter().any(|open| open.key == child_frame.key) {
                    let mut chain: Vec<String> = stack
                        .iter()
                        .map(|open| open.source.path().display().to_string())
                        .collect();
                    chain.push(child.display().to_string());
                    return Err(Error::IncludeCycle {
                        chain: chain.join(" -> "),
                    });
                }

                walk.parents.entry(child.clone()).or_default().push(at);
                walk.visited.push(child);
                stack.push(child_frame);
            }
        }
    }

    Ok(walk)
}

/// Resolve `path` against `base` unless it is already absolute.
pub fn absolutize(path: &Path, base: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

/// Expand an `Include` target into the files it names, in sorted order.
fn expand_include(target: &str, server_root: &Path, at: &Location) -> Result<Vec<PathBuf>> {
    let pattern = absolutize(Path::new(target), server_root);
    let mut files = Vec::new();

    for entry in glob::glob(&pattern.to_string_lossy())? {
        let path = entry.map_err(|e| Error::IncludeUnreadable {
            file: e.path().to_path_buf(),
            included_at: at.clone(),
            source: e.into(),
        })?;
        collect_files(&path, &mut files).map_err(|(file, source)| Error::IncludeUnreadable {
            file,
            included_at: at.clone(),
            source,
        })?;
    }

    Ok(files)
}

/// Push `path`, or every file below it when it is a directory. A failure
/// names the directory that could not be listed.
fn collect_files(
    path: &Path,
    files: &mut Vec<PathBuf>,
) -> std::result::Result<(), (PathBuf, io::Error)> {
    if path.is_dir() {
        let mut entries = fs::read_dir(path)
            .and_then(|dir| {
                dir.map(|entry| entry.map(|e| e.path()))
                    .collect::<io::Result<Vec<_>>>()
            })
            .map_err(|e| (path.to_path_buf(), e))?;
        entries.sort();
        for entry in entries {
            collect_files(&entry, files)?;
        }
    } else {
        files.push(path.to_path_buf());
    }
    Ok(())
}
