//! Line-numbered access to configuration files

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// The lines of one text file, addressed by 1-based line number.
#[derive(Debug, Clone)]
pub struct LineSource {
    path: PathBuf,
    lines: Vec<String>,
}

impl LineSource {
    /// Read `path` from disk.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| Error::ConfigUnreadable {
            file: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_contents(path, &contents))
    }

    /// Build a source from text already in memory.
    pub fn from_contents(path: impl Into<PathBuf>, contents: &str) -> Self {
        Self {
            path: path.into(),
            lines: contents.lines().map(str::to_string).collect(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// The text of line `number`, or `None` past the end.
    pub fn line(&self, number: usize) -> Option<&str> {
        number
            .checked_sub(1)
            .and_then(|idx| self.lines.get(idx))
            .map(String::as_str)
    }

    /// Iterate `(line_number, text)` pairs in file order.
    pub fn numbered(&self) -> impl Iterator<Item = (usize, &str)> {
        self.lines
            .iter()
            .enumerate()
            .map(|(idx, line)| (idx + 1, line.as_str()))
    }
}
