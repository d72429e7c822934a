//! Record Module
//!
//! One key-value pair and its two on-disk encodings.
//!
//! ## Text Encoding
//! ```text
//! ┌──────────────┬────┬──────────────────────────┬────┐
//! │ key (1-5 B)  │ SP │ value, space padded (10) │ LF │
//! └──────────────┴────┴──────────────────────────┴────┘
//! ```
//!
//! ## Binary Encoding
//! ```text
//! ┌──────────────────┬──────────────────┐
//! │ key: u32 LE (4)  │ value: u32 LE (4)│
//! └──────────────────┴──────────────────┘
//! ```
//!
//! Both encodings keep the value field fixed-width, so overwriting the value
//! of an existing key never changes the file length.

pub mod binary;
pub mod text;

use crate::error::{Result, StoreError};

/// Largest key accepted by the store
pub const MAX_KEY: u32 = u16::MAX as u32;

/// A single key-value pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Record {
    pub key: u16,
    pub value: u32,
}

impl Record {
    /// Build a record, rejecting keys outside `[0, 65535]`.
    pub fn new(key: u32, value: u32) -> Result<Self> {
        Ok(Self {
            key: validate_key(key)?,
            value,
        })
    }
}

/// Check a key against the store's key domain.
pub fn validate_key(key: u32) -> Result<u16> {
    u16::try_from(key).map_err(|_| StoreError::Range {
        field: "key",
        value: key as u64,
        max: MAX_KEY as u64,
    })
}
