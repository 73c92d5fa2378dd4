// src/lock.rs

//! Advisory lock files used by `prunex` to run a command exclusively.
//!
//! A lock is held by taking an exclusive `flock`-style lock (via `fs2`) on a
//! file, and released by removing the file and then unlocking it. Because
//! the file can be removed while another process is blocked on it, a
//! freshly acquired lock is only kept if the path still names the locked
//! file; otherwise acquisition starts over on the new file.

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use tracing::{debug, warn};

use crate::errors::{PrunError, Result};

/// A held lock file. Dropping it releases the lock and removes the file.
#[derive(Debug)]
pub struct LockFile {
    file: File,
    path: PathBuf,
}

impl LockFile {
    /// Block until the lock at `path` is held by this process.
    ///
    /// The wait happens on a blocking thread so the runtime stays free.
    pub async fn acquire(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        tokio::task::spawn_blocking(move || Self::acquire_blocking(path))
            .await
            .map_err(|e| PrunError::Other(e.into()))?
    }

    /// Blocking variant of [`LockFile::acquire`].
    pub fn acquire_blocking(path: PathBuf) -> Result<Self> {
        loop {
            let file = open_lock_file(&path)?;
            file.lock_exclusive().map_err(|e| lock_error(&path, e))?;

            if still_linked(&file, &path) {
                debug!(path = ?path, "lock acquired");
                return Ok(Self { file, path });
            }
            debug!(path = ?path, "lock file replaced while waiting; retrying");
        }
    }

    /// Take the lock only if nobody else holds it.
    pub fn try_acquire(path: impl Into<PathBuf>) -> Result<Option<Self>> {
        let path = path.into();
        let file = open_lock_file(&path)?;
        match file.try_lock_exclusive() {
            Ok(()) if still_linked(&file, &path) => Ok(Some(Self { file, path })),
            Ok(()) => Ok(None),
            Err(e) if e.kind() == fs2::lock_contended_error().kind() => Ok(None),
            Err(e) => Err(lock_error(&path, e)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for LockFile {
    fn drop(&mut self) {
        // Remove before unlocking so no waiter can keep a lock on a file
        // that the next newcomer will not see.
        if let Err(e) = fs::remove_file(&self.path) {
            warn!(path = ?self.path, error = %e, "failed to remove lock file");
        }
        if let Err(e) = FileExt::unlock(&self.file) {
            warn!(path = ?self.path, error = %e, "failed to unlock lock file");
        }
        debug!(path = ?self.path, "lock released");
    }
}

fn open_lock_file(path: &Path) -> Result<File> {
    OpenOptions::new()
        .create(true)
        .read(true)
        .write(true)
        .truncate(false)
        .open(path)
        .map_err(|e| lock_error(path, e))
}

fn lock_error(path: &Path, source: std::io::Error) -> PrunError {
    PrunError::Lock {
        path: path.to_path_buf(),
        source,
    }
}

#[cfg(unix)]
fn still_linked(file: &File, path: &Path) -> bool {
    use std::os::unix::fs::MetadataExt;

    match (file.metadata(), fs::metadata(path)) {
        (Ok(held), Ok(current)) => held.dev() == current.dev() && held.ino() == current.ino(),
        _ => false,
    }
}

#[cfg(not(unix))]
fn still_linked(_file: &File, path: &Path) -> bool {
    path.exists()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_holder_is_refused_until_release() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prunex_local_test");

        let first = LockFile::try_acquire(&path).unwrap().expect("first lock");
        assert!(path.exists());
        assert!(LockFile::try_acquire(&path).unwrap().is_none());

        drop(first);
        assert!(!path.exists());

        let again = LockFile::try_acquire(&path).unwrap();
        assert!(again.is_some());
    }

    #[test]
    fn missing_directory_is_a_lock_error() {
        let err = LockFile::try_acquire("/nonexistent-prun-dir/lock").unwrap_err();
        assert!(matches!(err, PrunError::Lock { .. }));
    }
}
