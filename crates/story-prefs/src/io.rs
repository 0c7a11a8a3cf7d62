//! Atomic I/O operations with file locking

use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use tracing::trace;

use crate::{Error, Result};

/// Advisory exclusive lock on a `<file>.lock` sidecar next to a target file.
///
/// The lock is released when the guard is dropped. It only excludes other
/// holders of the same sidecar, so every read-modify-write of the target
/// must take it.
#[derive(Debug)]
pub struct FileLock {
    file: File,
    path: PathBuf,
}

impl FileLock {
    /// Path of the sidecar lock file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.file) {
            trace!(path = %self.path.display(), error = %e, "Failed to release lock");
        }
    }
}

/// Block until the sidecar lock for `target` is held exclusively.
pub fn lock_exclusive(target: &Path) -> Result<FileLock> {
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }

    let lock_name = format!(
        "{}.lock",
        target
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default()
    );
    let path = target.with_file_name(lock_name);

    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(&path)
        .map_err(|e| Error::io(&path, e))?;

    file.lock_exclusive().map_err(|_| Error::LockFailed {
        path: target.to_path_buf(),
    })?;
    trace!(path = %path.display(), "Acquired lock");

    Ok(FileLock { file, path })
}

/// Write content atomically to a file.
///
/// Writes to a temp file in the same directory, then renames it over the
/// target so readers never see a partial file. Concurrent writers of the
/// same target must hold its [`lock_exclusive`] guard.
pub fn write_atomic(path: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }

    let temp_name = format!(
        ".{}.{}.tmp",
        path.file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default(),
        std::process::id()
    );
    let temp_path = path.with_file_name(&temp_name);

    let mut temp_file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&temp_path)
        .map_err(|e| Error::io(&temp_path, e))?;

    temp_file
        .write_all(content)
        .map_err(|e| Error::io(&temp_path, e))?;
    temp_file.sync_all().map_err(|e| Error::io(&temp_path, e))?;
    drop(temp_file);

    fs::rename(&temp_path, path).map_err(|e| Error::io(path, e))?;
    trace!(path = %path.display(), bytes = content.len(), "Wrote file atomically");

    Ok(())
}

/// Read text content from a file.
pub fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| Error::io(path, e))
}

/// Read text content, treating a missing file as absent.
pub fn read_text_if_exists(path: &Path) -> Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(Error::io(path, e)),
    }
}

/// Write text content to a file atomically.
pub fn write_text(path: &Path, content: &str) -> Result<()> {
    write_atomic(path, content.as_bytes())
}
