//! Binary record codec
//!
//! Exactly 8 bytes per record: key then value, each a little-endian u32.

use crate::error::{Result, StoreError};

use super::{Record, MAX_KEY};

/// Size of one encoded record
pub const RECORD_SIZE: usize = 8;

/// Offset of the value within a record
pub const VALUE_OFFSET: usize = 4;

/// Encode a record.
pub fn encode(record: &Record) -> [u8; RECORD_SIZE] {
    let mut bytes = [0u8; RECORD_SIZE];
    bytes[..VALUE_OFFSET].copy_from_slice(&(record.key as u32).to_le_bytes());
    bytes[VALUE_OFFSET..].copy_from_slice(&encode_value(record.value));
    bytes
}

/// Encode just the value half of a record.
pub fn encode_value(value: u32) -> [u8; 4] {
    value.to_le_bytes()
}

/// Read the key of a record without decoding the value.
pub fn decode_key(bytes: &[u8]) -> Result<u32> {
    let raw: [u8; 4] = bytes
        .get(..VALUE_OFFSET)
        .and_then(|b| b.try_into().ok())
        .ok_or_else(|| StoreError::Corrupt(format!("short record: {} bytes", bytes.len())))?;
    Ok(u32::from_le_bytes(raw))
}

/// Decode a record from exactly [`RECORD_SIZE`] bytes.
pub fn decode(bytes: &[u8]) -> Result<Record> {
    let bytes: &[u8; RECORD_SIZE] = bytes.try_into().map_err(|_| {
        StoreError::Corrupt(format!(
            "record is {} bytes, expected {}",
            bytes.len(),
            RECORD_SIZE
        ))
    })?;

    let key = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
    let value = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);

    let key = u16::try_from(key)
        .map_err(|_| StoreError::Corrupt(format!("key {} exceeds {}", key, MAX_KEY)))?;

    Ok(Record { key, value })
}
