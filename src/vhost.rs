//! Virtual-host blocks in the managed file.
//!
//! A block is identified by its exact rendered text. Blocks are separated
//! from their neighbours by a blank line, so the file is compared paragraph
//! by paragraph.

use std::path::{Path, PathBuf};

use log::info;

use crate::error::Result;
use crate::rewrite;
use crate::server::ServerControl;

/// One served application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualHostRecord {
    pub server_name: String,
    pub document_root: PathBuf,
}

impl VirtualHostRecord {
    /// The record for `app` served from `document_root`, named `<app><domain>`.
    pub fn new(app: &str, domain: &str, document_root: impl Into<PathBuf>) -> Self {
        Self {
            server_name: format!("{app}{domain}"),
            document_root: document_root.into(),
        }
    }

    /// The block text, without a trailing newline.
    pub fn render(&self, address: &str) -> String {
        format!(
            "<VirtualHost {}>\n  ServerName {}\n  DocumentRoot \"{}\"\n</VirtualHost>",
            address,
            self.server_name,
            self.document_root.display()
        )
    }
}

/// Split text into blank-line separated paragraphs, each with its lines
/// joined by `\n` and trailing whitespace removed.
pub fn paragraphs(contents: &str) -> Vec<String> {
    let mut result = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    for line in contents.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                result.push(current.join("\n"));
                current.clear();
            }
        } else {
            current.push(line.trim_end());
        }
    }
    if !current.is_empty() {
        result.push(current.join("\n"));
    }
    result
}

/// Append the block for `record` to `target` unless an identical block is
/// already there. Reloads the server after a change and returns whether one
/// was made.
pub fn ensure_block(
    target: &Path,
    record: &VirtualHostRecord,
    address: &str,
    server: &dyn ServerControl,
) -> Result<bool> {
    let block = record.render(address);

    let changed = rewrite::with_locked_contents(target, |contents| {
        if paragraphs(contents).iter().any(|paragraph| *paragraph == block) {
            return Ok(None);
        }
        let mut updated = contents.to_string();
        if !updated.is_empty() {
            if !updated.ends_with('\n') {
                updated.push('\n');
            }
            if !updated.ends_with("\n\n") {
                updated.push('\n');
            }
        }
        Ok(Some(rewrite::appended(&updated, &block)))
    })?;

    if changed {
        info!("Added virtual host {} to {}", record.server_name, target.display());
        server.reload()?;
    } else {
        info!("Virtual host {} already present in {}", record.server_name, target.display());
    }
    Ok(changed)
}
