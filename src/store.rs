//! Store Module
//!
//! The key-value store over one memory-mapped backing file.
//!
//! ## Responsibilities
//! - Compose BackingFile, LockGuard and a Layout into get/set/close
//! - Hold the advisory lock across every access to the mapping, including
//!   the whole unmap → append → remap sequence of an insert
//! - Pick up changes made by other processes at the start of each operation

use std::fs::File;
use std::path::Path;

use crate::config::{Config, Encoding};
use crate::error::Result;
use crate::layout::{self, Layout};
use crate::record::{validate_key, Record};
use crate::storage::{BackingFile, LockGuard, LockMode};

/// What `set` did to the file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    /// Existing key, value rewritten in place; file length unchanged
    Updated,

    /// New key, file grew by one encoded record
    Inserted,
}

/// A persistent key-value store backed by a memory-mapped file
///
/// ## Concurrency Model: Cooperating Processes
///
/// - Inside one instance everything is single-threaded (`&mut self`).
/// - Between instances sharing a file, the whole-file advisory lock is the
///   only coordination:
///   - **Lookups** take the layout's read mode (shared for binary,
///     exclusive for text)
///   - **Mutations** always take the exclusive lock
/// - After acquiring the lock, every operation re-reads the file length and
///   remaps + rebuilds when another instance has appended since.
pub struct Store {
    /// Store configuration
    config: Config,

    /// Second descriptor on the backing file's description; carries the lock
    lock_file: File,

    /// Mapping and the layout derived from it
    mapped: Mapped,
}

/// Everything that must only be touched while `Store::lock_file` is locked
struct Mapped {
    backing: BackingFile,
    layout: Box<dyn Layout>,

    /// An insert failed after touching the file; rebuild before the next use
    stale: bool,
}

impl Store {
    /// Open or create a store with the given config
    ///
    /// On startup:
    /// 1. Open the backing file and map it (an empty file stays unmapped)
    /// 2. Under the exclusive lock, re-read the length and build the index
    /// 3. Sort a legacy unsorted binary file in place
    pub fn open(config: Config) -> Result<Self> {
        let backing = BackingFile::open(&config.path, config.create_if_missing)?;
        let lock_file = backing.lock_handle()?;

        let mut store = Self {
            lock_file,
            mapped: Mapped {
                backing,
                layout: layout::for_encoding(config.encoding),
                stale: false,
            },
            config,
        };

        {
            let _guard = LockGuard::exclusive(&store.lock_file)?;
            store.mapped.sync_with_file(LockMode::Exclusive, true)?;
        }

        tracing::info!(
            "Opened {} store at {} ({} records, {} bytes)",
            store.config.encoding,
            store.config.path.display(),
            store.mapped.layout.len(),
            store.mapped.backing.len()
        );

        Ok(store)
    }

    /// Open with a path and encoding (convenience method)
    ///
    /// Uses default config otherwise
    pub fn open_path(path: &Path, encoding: Encoding) -> Result<Self> {
        let config = Config::builder().path(path).encoding(encoding).build();
        Self::open(config)
    }

    /// Get the value stored for `key`
    ///
    /// Returns `Ok(None)` when the key was never set.
    pub fn get(&mut self, key: u32) -> Result<Option<u32>> {
        let key = validate_key(key)?;
        let mode = self.mapped.layout.read_mode();

        let _guard = LockGuard::acquire(&self.lock_file, mode)?;
        self.mapped.sync_with_file(mode, false)?;

        let value = self
            .mapped
            .layout
            .get(self.mapped.backing.region(), key)?;

        tracing::trace!(key, ?value, "get");
        Ok(value)
    }

    /// Set `key` to `value`, inserting the key if it is new
    ///
    /// Steps:
    /// 1. Validate the key and encode the record (nothing touched on failure)
    /// 2. Acquire the exclusive lock and catch up with the file
    /// 3. Existing key: rewrite the fixed-width value in place
    /// 4. New key: grow the file by one record, remap, place the record,
    ///    rebuild the index, all before the lock is released
    pub fn set(&mut self, key: u32, value: u32) -> Result<Upsert> {
        let record = Record::new(key, value)?;
        let encoded = self.mapped.layout.encode(&record)?;

        let _guard = LockGuard::exclusive(&self.lock_file)?;
        self.mapped.sync_with_file(LockMode::Exclusive, false)?;

        let outcome = self.mapped.upsert(&record, &encoded)?;
        if self.config.sync_on_write {
            self.mapped.backing.sync()?;
        }

        tracing::trace!(key, value, ?outcome, "set");
        Ok(outcome)
    }

    /// Every record currently in the file, in on-disk order
    pub fn entries(&mut self) -> Result<Vec<Record>> {
        let mode = self.mapped.layout.read_mode();

        let _guard = LockGuard::acquire(&self.lock_file, mode)?;
        self.mapped.sync_with_file(mode, false)?;

        self.mapped.layout.entries(self.mapped.backing.region())
    }

    /// Flush dirty pages of the mapping to disk
    pub fn sync(&self) -> Result<()> {
        self.mapped.backing.sync()
    }

    /// Close the store gracefully
    ///
    /// Flushes the mapping, then releases it and the descriptors
    pub fn close(self) -> Result<()> {
        self.mapped.backing.sync()?;
        self.mapped.backing.close()?;

        tracing::info!("Closed store at {}", self.config.path.display());
        Ok(())
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// Number of records as of the last operation
    pub fn len(&self) -> usize {
        self.mapped.layout.len()
    }

    /// Whether the store held no records as of the last operation
    pub fn is_empty(&self) -> bool {
        self.mapped.layout.is_empty()
    }

    /// Mapped file length as of the last operation
    pub fn file_len(&self) -> usize {
        self.mapped.backing.len()
    }

    /// Record encoding of the backing file
    pub fn encoding(&self) -> Encoding {
        self.mapped.layout.encoding()
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        self.mapped.backing.path()
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }
}

impl Mapped {
    /// Catch up with the file after the lock was acquired in `mode`.
    ///
    /// Remaps and rebuilds when the length changed (or when `force` is set),
    /// and repairs the layout when holding the exclusive lock.
    fn sync_with_file(&mut self, mode: LockMode, force: bool) -> Result<()> {
        let remapped = self.backing.refresh()?;
        if remapped || force || self.stale {
            self.layout.rebuild(self.backing.region())?;
            self.stale = false;
        }

        if mode == LockMode::Exclusive && self.layout.needs_repair() {
            self.layout.repair(self.backing.region_mut())?;
            self.backing.sync()?;
        }
        Ok(())
    }

    /// Overwrite or append `record`. Exclusive lock only.
    fn upsert(&mut self, record: &Record, encoded: &[u8]) -> Result<Upsert> {
        if self.layout.overwrite(self.backing.region_mut(), record)? {
            return Ok(Upsert::Updated);
        }

        // Cleared only once the layout matches the grown region
        self.stale = true;
        self.backing.grow(encoded)?;
        self.layout.place_appended(self.backing.region_mut(), record)?;
        self.layout.rebuild(self.backing.region())?;
        self.stale = false;
        Ok(Upsert::Inserted)
    }
}
