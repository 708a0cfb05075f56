//! Sentinel lock files marking the hourly CSV that is currently being written.
//!
//! A lock file is an empty `<bucket>.lck` next to `<bucket>.csv`. Its
//! existence is the whole signal. Nothing here is load-bearing for the CSV
//! data, so every operation is best-effort and callers only log failures.

use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

/// File extension used for lock files.
pub const LOCK_EXTENSION: &str = "lck";

/// Creates, removes and purges lock files inside one output directory.
#[derive(Debug, Clone)]
pub struct LockFileManager {
    output_dir: PathBuf,
}

impl LockFileManager {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// The directory lock files live in.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Lock file path for a bucket identifier.
    pub fn path_for(&self, bucket: &str) -> PathBuf {
        self.output_dir.join(format!("{bucket}.{LOCK_EXTENSION}"))
    }

    /// Create an empty lock file. Succeeds if it already exists.
    pub fn create(&self, path: &Path) -> io::Result<()> {
        OpenOptions::new()
            .create(true)
            .truncate(true)
            .write(true)
            .open(path)
            .map(drop)
    }

    /// Remove a lock file. An already-absent file is not an error.
    pub fn delete(&self, path: &Path) -> io::Result<()> {
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Remove every `*.lck` file in the output directory.
    ///
    /// Run once at startup, before this process creates its own lock; any
    /// lock found then was left by a run that did not shut down cleanly.
    /// Files that cannot be removed are logged and skipped. Returns the
    /// paths that were removed.
    pub fn purge_stale(&self) -> io::Result<Vec<PathBuf>> {
        let mut removed = Vec::new();

        for entry in fs::read_dir(&self.output_dir)? {
            let path = match entry {
                Ok(entry) => entry.path(),
                Err(e) => {
                    tracing::warn!(error = %e, "skipping unreadable directory entry");
                    continue;
                }
            };
            if !is_lock_file(&path) {
                continue;
            }
            match self.delete(&path) {
                Ok(()) => removed.push(path),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "could not remove stale lock file");
                }
            }
        }

        removed.sort();
        Ok(removed)
    }

    /// List the lock files currently present, sorted by name.
    pub fn list(&self) -> io::Result<Vec<PathBuf>> {
        let mut locks: Vec<PathBuf> = fs::read_dir(&self.output_dir)?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| is_lock_file(p))
            .collect();
        locks.sort();
        Ok(locks)
    }
}

fn is_lock_file(path: &Path) -> bool {
    path.extension().map(|e| e == LOCK_EXTENSION).unwrap_or(false) && path.is_file()
}
