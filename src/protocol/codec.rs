//! Protocol codec
//!
//! Parsing input lines into commands and rendering responses.

use std::num::IntErrorKind;

use crate::error::{Result, StoreError};
use crate::record::MAX_KEY;

use super::{Command, Response};

/// Literal that ends the session
pub const EXIT: &str = "exit";

// =============================================================================
// Command Decoding
// =============================================================================

/// Decode one input line (with or without its line terminator).
pub fn decode_command(line: &str) -> Result<Command> {
    let line = line.trim_end_matches(['\n', '\r']);

    if line == EXIT {
        return Ok(Command::Exit);
    }

    if line.starts_with(char::is_whitespace) {
        return Err(StoreError::Parse(
            "input: do not include spaces before the first number".to_string(),
        ));
    }

    let mut tokens = line.split_whitespace();
    match (tokens.next(), tokens.next(), tokens.next()) {
        (Some(key), None, None) => Ok(Command::Get {
            key: decode_number("key", key, MAX_KEY)?,
        }),
        (Some(key), Some(value), None) => Ok(Command::Set {
            key: decode_number("key", key, MAX_KEY)?,
            value: decode_number("value", value, u32::MAX)?,
        }),
        (None, _, _) => Err(StoreError::Parse("input: empty line".to_string())),
        _ => Err(StoreError::Parse(
            "input: expected \"<key>\" or \"<key> <value>\"".to_string(),
        )),
    }
}

/// Decode an unsigned decimal and check it against `max`.
fn decode_number(field: &'static str, text: &str, max: u32) -> Result<u32> {
    let n = text.parse::<u64>().map_err(|e| match e.kind() {
        // Too wide for u64: report what was typed
        IntErrorKind::PosOverflow => {
            StoreError::Parse(format!("{} '{}': out of range, max {}", field, text, max))
        }
        _ => StoreError::Parse(format!("{} '{}'", field, text)),
    })?;

    // u64 parsing accepts a leading '+'; the prompt only takes plain digits.
    if !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(StoreError::Parse(format!("{} '{}'", field, text)));
    }

    if n > max as u64 {
        return Err(StoreError::Range {
            field,
            value: n,
            max: max as u64,
        });
    }

    Ok(n as u32)
}

// =============================================================================
// Response Encoding
// =============================================================================

/// Render a response as one output line (without the newline).
pub fn encode_response(response: &Response) -> String {
    match response {
        Response::Value(value) => format!("result: {}", value),
        Response::NotFound => "result: null".to_string(),
        Response::Stored => "ok".to_string(),
        Response::Error(message) => format!("error: {}", message),
    }
}
