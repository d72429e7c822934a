//! Text layout: newline-terminated records behind a hash index

use crate::config::Encoding;
use crate::error::Result;
use crate::index::HashIndex;
use crate::record::{text, Record};
use crate::storage::LockMode;

use super::Layout;

/// Text records, appended in arrival order, found through a `HashIndex`
#[derive(Debug, Default)]
pub struct TextLayout {
    index: HashIndex,

    /// Region starts with `text::LEGACY_PREFIX`
    legacy_prefix: bool,
}

impl TextLayout {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Layout for TextLayout {
    fn encoding(&self) -> Encoding {
        Encoding::Text
    }

    fn read_mode(&self) -> LockMode {
        // Lookups share the writers' lock so a reader never sees a value
        // field halfway through an overwrite.
        LockMode::Exclusive
    }

    fn rebuild(&mut self, region: &[u8]) -> Result<()> {
        self.index = HashIndex::build(region)?;

        let legacy_prefix = text::body_start(region) > 0;
        if legacy_prefix && !self.legacy_prefix {
            tracing::warn!(
                "Text file starts with {} NUL bytes from an older writer; skipping them",
                text::LEGACY_PREFIX.len()
            );
        }
        self.legacy_prefix = legacy_prefix;
        Ok(())
    }

    fn get(&self, region: &[u8], key: u16) -> Result<Option<u32>> {
        self.index.get(region, key)
    }

    fn overwrite(&self, region: &mut [u8], record: &Record) -> Result<bool> {
        self.index.overwrite(region, record.key, record.value)
    }

    fn encode(&self, record: &Record) -> Result<Vec<u8>> {
        text::encode(record)
    }

    fn entries(&self, region: &[u8]) -> Result<Vec<Record>> {
        text::entries(region).map(|e| e.map(|e| e.record)).collect()
    }

    fn len(&self) -> usize {
        self.index.len()
    }
}
