//! Text record codec
//!
//! `"<key> <value padded to 10>\n"`, all ASCII.

use crate::error::{Result, StoreError};

use super::{Record, MAX_KEY};

/// Width of the space-padded value field
pub const VALUE_WIDTH: usize = 10;

/// Two NUL bytes that older writers put in front of the first record
pub const LEGACY_PREFIX: &[u8] = b"\0\0";

/// A record decoded from the mapped region, with the positions the index needs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextEntry {
    pub record: Record,
    /// Offset of the first byte of the value field
    pub value_offset: usize,
    /// Offset where the next record starts
    pub next: usize,
}

/// Encoded length of a record with the given key
pub fn record_len(key: u16) -> usize {
    decimal_len(key as u64) + 1 + VALUE_WIDTH + 1
}

/// Encode a full record line.
pub fn encode(record: &Record) -> Result<Vec<u8>> {
    let field = encode_value(record.value)?;
    let mut line = Vec::with_capacity(record_len(record.key));
    line.extend_from_slice(record.key.to_string().as_bytes());
    line.push(b' ');
    line.extend_from_slice(&field);
    line.push(b'\n');
    Ok(line)
}

/// Encode just the value field: digits left-aligned, padded with spaces.
pub fn encode_value(value: u32) -> Result<[u8; VALUE_WIDTH]> {
    let digits = value.to_string();
    if digits.len() > VALUE_WIDTH {
        return Err(StoreError::Encode(format!(
            "value {} needs {} characters, field holds {}",
            value,
            digits.len(),
            VALUE_WIDTH
        )));
    }

    let mut field = [b' '; VALUE_WIDTH];
    field[..digits.len()].copy_from_slice(digits.as_bytes());
    Ok(field)
}

/// Decode the value field.
pub fn decode_value(field: &[u8]) -> Result<u32> {
    if field.len() != VALUE_WIDTH {
        return Err(StoreError::Corrupt(format!(
            "value field is {} bytes, expected {}",
            field.len(),
            VALUE_WIDTH
        )));
    }

    let digits = field.iter().take_while(|b| b.is_ascii_digit()).count();
    if digits == 0 || field[digits..].iter().any(|&b| b != b' ') {
        return Err(StoreError::Corrupt(format!(
            "malformed value field {:?}",
            String::from_utf8_lossy(field)
        )));
    }

    let value = parse_digits(&field[..digits]);
    u32::try_from(value)
        .map_err(|_| StoreError::Corrupt(format!("value {} exceeds u32", value)))
}

/// Decode the record that starts at `offset`.
pub fn decode_at(region: &[u8], offset: usize) -> Result<TextEntry> {
    let rest = region.get(offset..).unwrap_or(&[]);

    let digits = rest.iter().take_while(|b| b.is_ascii_digit()).count();
    if digits == 0 {
        return Err(StoreError::Corrupt(format!(
            "expected key digits at offset {}",
            offset
        )));
    }
    // Six digits already exceed the key domain; stop before parse_digits can overflow.
    if digits > 5 {
        return Err(StoreError::Corrupt(format!(
            "key at offset {} has {} digits",
            offset, digits
        )));
    }

    let key = parse_digits(&rest[..digits]);
    if key > MAX_KEY as u64 {
        return Err(StoreError::Corrupt(format!(
            "key {} at offset {} exceeds {}",
            key, offset, MAX_KEY
        )));
    }

    // key + SP + value field + LF
    let len = digits + 1 + VALUE_WIDTH + 1;
    if rest.len() < len {
        return Err(StoreError::Corrupt(format!(
            "truncated record at offset {}",
            offset
        )));
    }
    if rest[digits] != b' ' {
        return Err(StoreError::Corrupt(format!(
            "missing separator at offset {}",
            offset + digits
        )));
    }
    if rest[len - 1] != b'\n' {
        return Err(StoreError::Corrupt(format!(
            "missing newline at offset {}",
            offset + len - 1
        )));
    }

    let value_offset = offset + digits + 1;
    let value = decode_value(&region[value_offset..value_offset + VALUE_WIDTH])?;

    Ok(TextEntry {
        record: Record {
            key: key as u16,
            value,
        },
        value_offset,
        next: offset + len,
    })
}

/// Offset of the first record: past the legacy prefix when there is one.
///
/// New files are never given the prefix.
pub fn body_start(region: &[u8]) -> usize {
    if region.starts_with(LEGACY_PREFIX) {
        LEGACY_PREFIX.len()
    } else {
        0
    }
}

/// Iterate over every record in a text region, in file order.
pub fn entries(region: &[u8]) -> TextEntries<'_> {
    TextEntries {
        region,
        pos: body_start(region),
    }
}

/// Iterator returned by [`entries`]; stops after the first decode error
pub struct TextEntries<'a> {
    region: &'a [u8],
    pos: usize,
}

impl Iterator for TextEntries<'_> {
    type Item = Result<TextEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos >= self.region.len() {
            return None;
        }

        match decode_at(self.region, self.pos) {
            Ok(entry) => {
                self.pos = entry.next;
                Some(Ok(entry))
            }
            Err(e) => {
                self.pos = self.region.len();
                Some(Err(e))
            }
        }
    }
}

fn parse_digits(digits: &[u8]) -> u64 {
    digits
        .iter()
        .fold(0u64, |acc, &d| acc * 10 + (d - b'0') as u64)
}

fn decimal_len(mut n: u64) -> usize {
    let mut len = 1;
    while n >= 10 {
        n /= 10;
        len += 1;
    }
    len
}
