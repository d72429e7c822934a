//! Sorted index over a binary region
//!
//! The region itself is the index: N packed records in ascending key order.
//! Positions are record indices; byte ranges are derived from them at the
//! point of use.

use std::cmp::Ordering;
use std::ops::Range;

use crate::error::{Result, StoreError};
use crate::record::binary::{self, RECORD_SIZE, VALUE_OFFSET};
use crate::record::Record;

/// Read-only view of a binary region as a sorted record array
#[derive(Debug, Clone, Copy)]
pub struct SortedIndex<'a> {
    region: &'a [u8],
}

impl<'a> SortedIndex<'a> {
    /// Wrap a region, checking that it holds a whole number of records.
    pub fn new(region: &'a [u8]) -> Result<Self> {
        if region.len() % RECORD_SIZE != 0 {
            return Err(StoreError::Corrupt(format!(
                "binary region of {} bytes is not a multiple of {}",
                region.len(),
                RECORD_SIZE
            )));
        }
        Ok(Self { region })
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.region.len() / RECORD_SIZE
    }

    /// Whether the region holds no records
    pub fn is_empty(&self) -> bool {
        self.region.is_empty()
    }

    /// Key of the record at `index`. Caller guarantees `index < len()`.
    fn key_at(&self, index: usize) -> u32 {
        let start = index * RECORD_SIZE;
        let bytes = &self.region[start..start + VALUE_OFFSET];
        u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
    }

    /// Decode the record at `index`.
    pub fn record(&self, index: usize) -> Result<Record> {
        let range = record_range(index);
        let bytes = self.region.get(range).ok_or_else(|| {
            StoreError::Corrupt(format!("record {} out of {}", index, self.len()))
        })?;
        binary::decode(bytes)
    }

    /// Binary search for `key`.
    ///
    /// `Ok(index)` when found, `Err(index)` with the position where the key
    /// would have to be inserted to keep the array sorted.
    pub fn search(&self, key: u16) -> std::result::Result<usize, usize> {
        let key = key as u32;
        let mut lo = 0;
        let mut hi = self.len();

        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            match key.cmp(&self.key_at(mid)) {
                Ordering::Equal => return Ok(mid),
                Ordering::Less => hi = mid,
                Ordering::Greater => lo = mid + 1,
            }
        }

        Err(lo)
    }

    /// Look up the value stored for `key`.
    pub fn get(&self, key: u16) -> Result<Option<u32>> {
        match self.search(key) {
            Ok(index) => self.record(index).map(|r| Some(r.value)),
            Err(_) => Ok(None),
        }
    }

    /// Index of the first record whose key is not strictly greater than its
    /// predecessor's, or `None` when the array is strictly ascending.
    pub fn first_unordered(&self) -> Option<usize> {
        (1..self.len()).find(|&i| self.key_at(i - 1) >= self.key_at(i))
    }

    /// Decode every record, in array order.
    pub fn records(&self) -> Result<Vec<Record>> {
        self.region
            .chunks_exact(RECORD_SIZE)
            .map(binary::decode)
            .collect()
    }
}

/// Byte range of the record at `index`
pub fn record_range(index: usize) -> Range<usize> {
    let start = index * RECORD_SIZE;
    start..start + RECORD_SIZE
}

/// Byte range of the value half of the record at `index`
pub fn value_range(index: usize) -> Range<usize> {
    let start = index * RECORD_SIZE + VALUE_OFFSET;
    start..start + 4
}
