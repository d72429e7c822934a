//! Advisory file lock
//!
//! RAII guard over a whole-file lock; dropping the guard unlocks.

use std::fs::File;

use fs2::FileExt;

use crate::error::{Result, StoreError};

/// Lock intent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockMode {
    /// Many holders at once; no exclusive holder meanwhile
    Shared,

    /// Sole holder
    Exclusive,
}

/// Held advisory lock on a file
///
/// Acquisition blocks until the lock is granted. There is no timeout.
#[derive(Debug)]
pub struct LockGuard<'a> {
    file: &'a File,
    mode: LockMode,
}

impl<'a> LockGuard<'a> {
    /// Block until `file` is locked in `mode`.
    pub fn acquire(file: &'a File, mode: LockMode) -> Result<Self> {
        // Fully qualified: std's File grew inherent lock methods with
        // different signatures.
        match mode {
            LockMode::Shared => FileExt::lock_shared(file),
            LockMode::Exclusive => FileExt::lock_exclusive(file),
        }
        .map_err(StoreError::Lock)?;

        tracing::trace!(?mode, "Acquired file lock");
        Ok(Self { file, mode })
    }

    /// Block until `file` is locked shared.
    pub fn shared(file: &'a File) -> Result<Self> {
        Self::acquire(file, LockMode::Shared)
    }

    /// Block until `file` is locked exclusively.
    pub fn exclusive(file: &'a File) -> Result<Self> {
        Self::acquire(file, LockMode::Exclusive)
    }

    /// Mode this guard holds
    pub fn mode(&self) -> LockMode {
        self.mode
    }
}

impl Drop for LockGuard<'_> {
    fn drop(&mut self) {
        match FileExt::unlock(self.file) {
            Ok(()) => tracing::trace!(mode = ?self.mode, "Released file lock"),
            Err(e) => tracing::warn!("Failed to release {:?} file lock: {}", self.mode, e),
        }
    }
}
