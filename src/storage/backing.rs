//! Backing file
//!
//! Owns the file descriptor, the mapped length and the mapping itself.

use std::fs::{File, OpenOptions};
use std::io::{Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use memmap2::{MmapMut, MmapOptions};

use crate::error::{Result, StoreError};

/// A read/write file mapped in full
///
/// ## Invariants:
/// - `mmap` is `None` exactly when `len == 0`
/// - `mmap` covers exactly `len` bytes
/// - Slices handed out by `region()`/`region_mut()` borrow `self`, so they
///   cannot outlive a `grow()` or `refresh()` (both take `&mut self`)
#[derive(Debug)]
pub struct BackingFile {
    path: PathBuf,
    file: File,
    len: usize,
    mmap: Option<MmapMut>,
}

impl BackingFile {
    /// Open the file for read/write and map its current contents.
    pub fn open(path: &Path, create_if_missing: bool) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(create_if_missing)
            .open(path)
            .map_err(|source| StoreError::FileOpen {
                path: path.to_path_buf(),
                source,
            })?;

        let mut backing = Self {
            path: path.to_path_buf(),
            file,
            len: 0,
            mmap: None,
        };

        let len = backing.on_disk_len()?;
        backing.map(len)?;

        tracing::debug!("Opened {} ({} bytes)", path.display(), len);
        Ok(backing)
    }

    /// Current file length as reported by the OS
    pub fn on_disk_len(&self) -> Result<usize> {
        let len = self.file.metadata()?.len();
        usize::try_from(len).map_err(|_| {
            StoreError::Map(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("file length {} does not fit the address space", len),
            ))
        })
    }

    /// Replace the mapping if the file length changed since it was mapped.
    ///
    /// Returns `true` when the mapping was replaced; callers must rebuild
    /// anything derived from the old region.
    pub fn refresh(&mut self) -> Result<bool> {
        let disk_len = self.on_disk_len()?;
        if disk_len == self.len {
            return Ok(false);
        }

        tracing::debug!(
            "{} changed size: {} -> {} bytes, remapping",
            self.path.display(),
            self.len,
            disk_len
        );

        self.unmap()?;
        self.map(disk_len)?;
        Ok(true)
    }

    /// Append `data` to the file tail and map the new length.
    ///
    /// The caller must hold the exclusive lock and must have refreshed the
    /// mapping under it, so the mapped length is the true tail.
    pub fn grow(&mut self, data: &[u8]) -> Result<()> {
        let old_len = self.len;
        self.unmap()?;

        let mut file = &self.file;
        let tail = file.seek(SeekFrom::End(0))?;
        if tail != old_len as u64 {
            return Err(StoreError::Corrupt(format!(
                "file tail moved from {} to {} without the lock",
                old_len, tail
            )));
        }
        file.write_all(data)?;

        self.map(old_len + data.len())?;

        tracing::trace!(
            "Grew {} by {} bytes to {}",
            self.path.display(),
            data.len(),
            self.len
        );
        Ok(())
    }

    /// The mapped bytes (empty when the file is empty)
    pub fn region(&self) -> &[u8] {
        self.mmap.as_deref().unwrap_or(&[])
    }

    /// The mapped bytes, writable
    pub fn region_mut(&mut self) -> &mut [u8] {
        match self.mmap.as_mut() {
            Some(mmap) => &mut mmap[..],
            None => &mut [],
        }
    }

    /// Flush dirty pages of the mapping to disk.
    pub fn sync(&self) -> Result<()> {
        if let Some(mmap) = &self.mmap {
            mmap.flush()?;
        }
        Ok(())
    }

    /// A second handle on the same open file description.
    ///
    /// Advisory locks belong to the description, so locking through this
    /// handle excludes other openers exactly like locking `self` would.
    pub fn lock_handle(&self) -> Result<File> {
        Ok(self.file.try_clone()?)
    }

    /// Release the mapping and the descriptor.
    pub fn close(mut self) -> Result<()> {
        self.unmap()?;
        tracing::debug!("Closed {}", self.path.display());
        Ok(())
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Mapped length in bytes
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the mapped length is zero
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Whether a mapping currently exists
    pub fn is_mapped(&self) -> bool {
        self.mmap.is_some()
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    fn map(&mut self, len: usize) -> Result<()> {
        debug_assert!(self.mmap.is_none());

        // Mapping zero bytes is not allowed; an empty file stays unmapped.
        if len == 0 {
            self.len = 0;
            return Ok(());
        }

        // SAFETY: MmapOptions::map_mut is unsafe because the file may be
        // modified outside this process. Every cooperating process only
        // touches the file while holding the advisory lock, the file never
        // shrinks, and the mapping length equals the length read under the
        // lock, so no access goes past the end of the file.
        let mmap = unsafe {
            MmapOptions::new()
                .len(len)
                .map_mut(&self.file)
                .map_err(StoreError::Map)?
        };

        self.mmap = Some(mmap);
        self.len = len;
        Ok(())
    }

    fn unmap(&mut self) -> Result<()> {
        if let Some(mmap) = self.mmap.take() {
            // Schedule writeback so a failing msync surfaces here instead of
            // being swallowed by munmap in Drop.
            mmap.flush_async().map_err(StoreError::Unmap)?;
        }
        self.len = 0;
        Ok(())
    }
}
