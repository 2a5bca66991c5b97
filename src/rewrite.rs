//! # Locked File Rewrites
//!
//! Every change this tool makes to a shared file (the managed Apache config,
//! the root config's marker block, the hosts file) goes through
//! `with_locked_contents`:
//!
//! 1.  **Lock**: Open the file and take an exclusive advisory lock, blocking
//!     until any other holder releases it.
//!
//! 2.  **Read and Edit**: Read the current contents and hand them to the
//!     caller, which returns the new contents or `None` for no change.
//!
//! 3.  **Replace**: Write the new contents to a temporary file in the same
//!     directory, then rename it over the original. A failure before the
//!     rename leaves the original untouched.
//!
//! If another process replaced the file while this one waited for the lock,
//! the lock is on a stale file, so the file is opened and locked again. The
//! lock is released when the handle drops, on every exit path.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use log::{debug, info};
use tempfile::NamedTempFile;

use crate::error::{Error, Result};

/// Run `edit` over the contents of `path` while holding an exclusive lock.
///
/// `edit` returns `Some(new_contents)` to rewrite the file or `None` to leave
/// it as it is. Returns whether the file was rewritten.
pub fn with_locked_contents<F>(path: &Path, mut edit: F) -> Result<bool>
where
    F: FnMut(&str) -> Result<Option<String>>,
{
    let path = fs::canonicalize(path)?;

    loop {
        let mut file = OpenOptions::new().read(true).write(true).open(&path)?;
        file.lock()?;

        if !is_current(&file, &path)? {
            debug!("{} was replaced while waiting for the lock", path.display());
            continue;
        }

        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        return match edit(&contents)? {
            Some(updated) => {
                replace(&path, &file, &updated)?;
                Ok(true)
            }
            None => Ok(false),
        };
    }
}

/// Insert `text` as a new line (or lines) directly after line `line` of
/// `path`. Line 0 inserts before the first line.
pub fn insert_after_line(path: &Path, line: usize, text: &str) -> Result<()> {
    with_locked_contents(path, |contents| {
        let mut buffer = String::with_capacity(contents.len() + text.len() + 2);
        let mut inserted = false;

        if line == 0 {
            push_line(&mut buffer, text);
            inserted = true;
        }
        for (idx, original) in contents.split_inclusive('\n').enumerate() {
            buffer.push_str(original);
            if idx + 1 == line {
                if !original.ends_with('\n') {
                    buffer.push('\n');
                }
                push_line(&mut buffer, text);
                inserted = true;
            }
        }

        if !inserted {
            return Err(Error::Io(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} has no line {}", path.display(), line),
            )));
        }
        Ok(Some(buffer))
    })?;

    info!("Inserted after {}:{}: {}", path.display(), line, text.trim_end());
    Ok(())
}

/// Append `text` as a new line (or lines) at the end of `path`.
pub fn append(path: &Path, text: &str) -> Result<()> {
    with_locked_contents(path, |contents| Ok(Some(appended(contents, text))))?;
    info!("Appended to {}: {}", path.display(), text.trim_end());
    Ok(())
}

/// `contents` with `text` added as new line(s), keeping line breaks intact.
pub fn appended(contents: &str, text: &str) -> String {
    let mut buffer = String::with_capacity(contents.len() + text.len() + 2);
    buffer.push_str(contents);
    if !buffer.is_empty() && !buffer.ends_with('\n') {
        buffer.push('\n');
    }
    push_line(&mut buffer, text);
    buffer
}

fn push_line(buffer: &mut String, text: &str) {
    buffer.push_str(text);
    if !text.ends_with('\n') {
        buffer.push('\n');
    }
}

/// Whether the locked handle still refers to the file at `path`.
#[cfg(unix)]
fn is_current(file: &File, path: &Path) -> Result<bool> {
    use std::os::unix::fs::MetadataExt;

    let held = file.metadata()?;
    let live = fs::metadata(path)?;
    Ok(held.dev() == live.dev() && held.ino() == live.ino())
}

#[cfg(not(unix))]
fn is_current(_file: &File, _path: &Path) -> Result<bool> {
    Ok(true)
}

fn replace(path: &Path, original: &File, contents: &str) -> Result<()> {
    let dir: PathBuf = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };

    let mut temp = NamedTempFile::new_in(&dir)?;
    temp.write_all(contents.as_bytes())?;
    temp.as_file().sync_all()?;

    let metadata = original.metadata()?;
    fs::set_permissions(temp.path(), metadata.permissions())?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::MetadataExt;
        if let Err(e) =
            std::os::unix::fs::chown(temp.path(), Some(metadata.uid()), Some(metadata.gid()))
        {
            debug!("Could not keep ownership of {}: {}", path.display(), e);
        }
    }

    temp.persist(path).map_err(|e| Error::Io(e.error))?;
    Ok(())
}
