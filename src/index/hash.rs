//! Hash index over a text region
//!
//! HashMap-based key → value-field offset table. Never persisted.

use std::collections::HashMap;

use crate::error::{Result, StoreError};
use crate::record::text;

/// In-memory index of a text region
#[derive(Debug, Default)]
pub struct HashIndex {
    /// key → byte offset of the value field, relative to the mapping base
    offsets: HashMap<u16, usize>,

    /// Length of the region the offsets were derived from
    region_len: usize,
}

impl HashIndex {
    /// Create an empty index (matches an empty or unmapped file)
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an index with one linear scan of `region`.
    ///
    /// A key that appears twice means another writer appended it without
    /// seeing the first copy; the file is reported as corrupt rather than
    /// silently preferring either value.
    pub fn build(region: &[u8]) -> Result<Self> {
        let mut offsets = HashMap::new();

        for entry in text::entries(region) {
            let entry = entry?;
            if offsets.insert(entry.record.key, entry.value_offset).is_some() {
                return Err(StoreError::Corrupt(format!(
                    "duplicate key {} at offset {}",
                    entry.record.key, entry.value_offset
                )));
            }
        }

        tracing::debug!(
            records = offsets.len(),
            bytes = region.len(),
            "Built hash index"
        );

        Ok(Self {
            offsets,
            region_len: region.len(),
        })
    }

    /// Offset of the value field for `key`, if present
    pub fn value_offset(&self, key: u16) -> Option<usize> {
        self.offsets.get(&key).copied()
    }

    /// Look up `key` and decode its value from `region`.
    ///
    /// `region` must be the mapping this index was built from.
    pub fn get(&self, region: &[u8], key: u16) -> Result<Option<u32>> {
        let Some(offset) = self.value_offset(key) else {
            return Ok(None);
        };

        let field = self.field(region, offset)?;
        text::decode_value(field).map(Some)
    }

    /// Overwrite the value of an existing key in place.
    ///
    /// Returns `false` (and writes nothing) when the key is absent.
    pub fn overwrite(&self, region: &mut [u8], key: u16, value: u32) -> Result<bool> {
        let Some(offset) = self.value_offset(key) else {
            return Ok(false);
        };

        let encoded = text::encode_value(value)?;
        self.check_region(region)?;
        region[offset..offset + text::VALUE_WIDTH].copy_from_slice(&encoded);
        Ok(true)
    }

    /// Number of indexed keys
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    /// Whether the index is empty
    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    fn field<'r>(&self, region: &'r [u8], offset: usize) -> Result<&'r [u8]> {
        self.check_region(region)?;
        Ok(&region[offset..offset + text::VALUE_WIDTH])
    }

    /// Every stored offset was validated against a region of `region_len`
    /// bytes, so matching lengths keep the slicing in bounds.
    fn check_region(&self, region: &[u8]) -> Result<()> {
        if region.len() != self.region_len {
            return Err(StoreError::Corrupt(format!(
                "index built for {} bytes used against a {} byte mapping",
                self.region_len,
                region.len()
            )));
        }
        Ok(())
    }
}
