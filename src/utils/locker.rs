//! Advisory lock on a target directory to prevent concurrent runs

use crate::utils::error::LockError;
use fd_lock::{RwLock, RwLockWriteGuard};
use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Name of the lock file created in every locked target directory
pub const LOCK_FILE_NAME: &str = ".backup-scheduler.lock";

/// Lock file of one target directory
///
/// The file itself is left in place; only the advisory lock on it matters.
pub struct TargetLock {
    lock: RwLock<File>,
    path: PathBuf,
}

impl TargetLock {
    /// Open (or create) the lock file inside `target_dir`
    pub fn open(target_dir: &Path) -> Result<Self, LockError> {
        let path = target_dir.join(LOCK_FILE_NAME);

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .map_err(|source| LockError::Io {
                path: path.clone(),
                source,
            })?;

        Ok(Self {
            lock: RwLock::new(file),
            path,
        })
    }

    /// Take the exclusive lock without blocking
    ///
    /// The lock is released when the returned guard is dropped.
    pub fn try_acquire(&mut self) -> Result<RwLockWriteGuard<'_, File>, LockError> {
        debug!("Attempting to acquire lock: {:?}", self.path);

        match self.lock.try_write() {
            Ok(guard) => {
                debug!("Acquired lock: {:?}", self.path);
                Ok(guard)
            }
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                Err(LockError::Held(self.path.clone()))
            }
            Err(source) => Err(LockError::Io {
                path: self.path.clone(),
                source,
            }),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
