//! Binary layout: fixed 8-byte records kept in ascending key order
//!
//! New keys are appended by the store and then shifted into their sorted
//! slot, so the region is sorted between any two locked operations. A file
//! written by an older appender may still be unsorted; lookups fall back to
//! a scan until a writer repairs it.

use crate::config::Encoding;
use crate::error::{Result, StoreError};
use crate::index::{record_range, value_range, SortedIndex};
use crate::record::binary::{self, RECORD_SIZE};
use crate::record::{Record, MAX_KEY};
use crate::storage::LockMode;

use super::Layout;

/// Binary records searched through a `SortedIndex`
#[derive(Debug)]
pub struct SortedLayout {
    len: usize,
    sorted: bool,
}

impl SortedLayout {
    pub fn new() -> Self {
        Self {
            len: 0,
            sorted: true,
        }
    }

    /// Record index holding `key`
    fn position(&self, view: &SortedIndex<'_>, key: u16) -> Result<Option<usize>> {
        if self.sorted {
            return Ok(view.search(key).ok());
        }

        for index in 0..view.len() {
            if view.record(index)?.key == key {
                return Ok(Some(index));
            }
        }
        Ok(None)
    }
}

impl Default for SortedLayout {
    fn default() -> Self {
        Self::new()
    }
}

impl Layout for SortedLayout {
    fn encoding(&self) -> Encoding {
        Encoding::Binary
    }

    fn read_mode(&self) -> LockMode {
        LockMode::Shared
    }

    fn rebuild(&mut self, region: &[u8]) -> Result<()> {
        let view = SortedIndex::new(region)?;

        self.len = view.len();
        self.sorted = match view.first_unordered() {
            None => true,
            Some(index) => {
                tracing::warn!(
                    "Binary records out of order at record {} of {}; lookups scan until repaired",
                    index,
                    view.len()
                );
                false
            }
        };

        // Sorted means the last key is the largest one.
        if self.sorted && !view.is_empty() {
            let last = view.len() - 1;
            let key = binary::decode_key(&region[record_range(last)])?;
            if key > MAX_KEY {
                return Err(StoreError::Corrupt(format!(
                    "key {} at record {} exceeds {}",
                    key, last, MAX_KEY
                )));
            }
        }

        tracing::debug!(records = self.len, sorted = self.sorted, "Rebuilt sorted view");
        Ok(())
    }

    fn needs_repair(&self) -> bool {
        !self.sorted
    }

    fn repair(&mut self, region: &mut [u8]) -> Result<()> {
        if self.sorted {
            return Ok(());
        }

        let mut records = SortedIndex::new(region)?.records()?;
        records.sort_unstable_by_key(|r| r.key);

        if let Some(pair) = records.windows(2).find(|w| w[0].key == w[1].key) {
            return Err(StoreError::Corrupt(format!(
                "duplicate key {} in binary file",
                pair[0].key
            )));
        }

        for (chunk, record) in region.chunks_exact_mut(RECORD_SIZE).zip(&records) {
            chunk.copy_from_slice(&binary::encode(record));
        }

        tracing::warn!("Sorted {} binary records in place", records.len());
        self.sorted = true;
        Ok(())
    }

    fn get(&self, region: &[u8], key: u16) -> Result<Option<u32>> {
        let view = SortedIndex::new(region)?;
        match self.position(&view, key)? {
            Some(index) => view.record(index).map(|r| Some(r.value)),
            None => Ok(None),
        }
    }

    fn overwrite(&self, region: &mut [u8], record: &Record) -> Result<bool> {
        let view = SortedIndex::new(region)?;
        let Some(index) = self.position(&view, record.key)? else {
            return Ok(false);
        };

        region[value_range(index)].copy_from_slice(&binary::encode_value(record.value));
        Ok(true)
    }

    fn encode(&self, record: &Record) -> Result<Vec<u8>> {
        Ok(binary::encode(record).to_vec())
    }

    fn place_appended(&self, region: &mut [u8], record: &Record) -> Result<()> {
        if !self.sorted {
            return Err(StoreError::Corrupt(
                "cannot place a record into an unsorted binary region".to_string(),
            ));
        }

        let old_len = region.len().checked_sub(RECORD_SIZE).ok_or_else(|| {
            StoreError::Corrupt("region shorter than the appended record".to_string())
        })?;

        let slot = match SortedIndex::new(&region[..old_len])?.search(record.key) {
            Err(slot) => slot,
            Ok(index) => {
                return Err(StoreError::Corrupt(format!(
                    "key {} appended but already present at record {}",
                    record.key, index
                )))
            }
        };

        // Shift the tail up by one record and drop the new one into the gap.
        let start = slot * RECORD_SIZE;
        region.copy_within(start..old_len, start + RECORD_SIZE);
        region[record_range(slot)].copy_from_slice(&binary::encode(record));
        Ok(())
    }

    fn entries(&self, region: &[u8]) -> Result<Vec<Record>> {
        SortedIndex::new(region)?.records()
    }

    fn len(&self) -> usize {
        self.len
    }
}
