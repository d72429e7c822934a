//! Layout Module
//!
//! Pluggable encoding strategies. A layout knows how records are encoded in
//! the mapped region and how they are found again; the `Store` owns the file,
//! the lock and the growth path, and calls into the layout for everything
//! encoding-specific.
//!
//! | Layout         | Encoding | Lookup           | Read lock |
//! |----------------|----------|------------------|-----------|
//! | `TextLayout`   | text     | `HashIndex`      | exclusive |
//! | `SortedLayout` | binary   | `SortedIndex`    | shared    |

mod binary;
mod text;

use std::fmt;

pub use binary::SortedLayout;
pub use text::TextLayout;

use crate::config::Encoding;
use crate::error::Result;
use crate::record::Record;
use crate::storage::LockMode;

/// Encoding strategy over a mapped region
///
/// Every method that takes a region must be given the current mapping, and
/// `rebuild` must run after any remap before the other methods are used.
pub trait Layout: fmt::Debug + Send {
    /// Encoding this layout reads and writes
    fn encoding(&self) -> Encoding;

    /// Lock intent for lookups
    fn read_mode(&self) -> LockMode;

    /// Re-derive all in-memory state from a freshly mapped region.
    fn rebuild(&mut self, region: &[u8]) -> Result<()>;

    /// Whether the region needs `repair` before it may be mutated
    fn needs_repair(&self) -> bool {
        false
    }

    /// Restore the layout's on-disk invariant in place. Exclusive lock only.
    fn repair(&mut self, _region: &mut [u8]) -> Result<()> {
        Ok(())
    }

    /// Value stored for `key`, if any
    fn get(&self, region: &[u8], key: u16) -> Result<Option<u32>>;

    /// Overwrite the fixed-width value of an existing key.
    ///
    /// Returns `false` without writing when the key is absent.
    fn overwrite(&self, region: &mut [u8], record: &Record) -> Result<bool>;

    /// Encode a new record for appending to the file tail.
    fn encode(&self, record: &Record) -> Result<Vec<u8>>;

    /// Move a record that was just appended to its final position.
    ///
    /// Called on the grown region, before `rebuild`.
    fn place_appended(&self, _region: &mut [u8], _record: &Record) -> Result<()> {
        Ok(())
    }

    /// Every record in on-disk order
    fn entries(&self, region: &[u8]) -> Result<Vec<Record>>;

    /// Number of records seen by the last `rebuild`
    fn len(&self) -> usize;

    /// Whether the last `rebuild` saw no records
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Layout for an encoding
pub fn for_encoding(encoding: Encoding) -> Box<dyn Layout> {
    match encoding {
        Encoding::Text => Box::new(TextLayout::new()),
        Encoding::Binary => Box::new(SortedLayout::new()),
    }
}
