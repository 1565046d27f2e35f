//! Single-instance run lock.
//!
//! A run owns a marker file holding its PID for as long as it is active.
//! The marker is created with `create_new`, so two processes racing on the
//! same local filesystem cannot both acquire it. On network filesystems
//! without atomic exclusive create the check is best-effort.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::error_handling::LockError;

/// Guard for the run lock file.
///
/// Dropping the guard removes the file, so the lock is released on every
/// exit path of the owning run, including unwinding and cancellation of the
/// future that holds it.
#[derive(Debug)]
pub struct RunLock {
    path: PathBuf,
    released: bool,
}

impl RunLock {
    /// Creates the lock file and writes the current PID into it.
    ///
    /// # Errors
    ///
    /// Returns `LockError::AlreadyHeld` if the file already exists (the
    /// existing file is left untouched), or `LockError::Create` if it cannot
    /// be written.
    pub fn acquire(path: impl Into<PathBuf>) -> Result<Self, LockError> {
        let path = path.into();
        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                let pid = Self::holder_pid(&path);
                return Err(LockError::AlreadyHeld { path, pid });
            }
            Err(source) => return Err(LockError::Create { path, source }),
        };

        // From here on the guard owns the file and removes it on failure.
        let lock = RunLock {
            path,
            released: false,
        };
        let pid = std::process::id();
        write!(file, "{}", pid)
            .and_then(|_| file.sync_all())
            .map_err(|source| LockError::Create {
                path: lock.path.clone(),
                source,
            })?;

        info!("Acquired run lock {} (PID {})", lock.path.display(), pid);
        Ok(lock)
    }

    /// PID recorded in an existing lock file, if it can be read.
    pub fn holder_pid(path: &Path) -> Option<u32> {
        fs::read_to_string(path).ok()?.trim().parse().ok()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Removes the lock file, reporting failure instead of only logging it.
    pub fn release(mut self) -> Result<(), LockError> {
        self.released = true;
        match fs::remove_file(&self.path) {
            Ok(()) => {
                info!("Released run lock {}", self.path.display());
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!("Run lock {} was already removed", self.path.display());
                Ok(())
            }
            Err(source) => Err(LockError::Remove {
                path: self.path.clone(),
                source,
            }),
        }
    }
}

impl Drop for RunLock {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        match fs::remove_file(&self.path) {
            Ok(()) => debug!("Released run lock {} on drop", self.path.display()),
            Err(e) => warn!(
                "Failed to remove run lock {}: {}. Remove it manually before the next run",
                self.path.display(),
                e
            ),
        }
    }
}
