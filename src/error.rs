//! Error types for mapkv
//!
//! Provides a unified error type for all store operations.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using StoreError
pub type Result<T> = std::result::Result<T, StoreError>;

/// Unified error type for mapkv operations
///
/// Lookup misses are not errors: `Store::get` returns `Ok(None)`.
#[derive(Debug, Error)]
pub enum StoreError {
    // -------------------------------------------------------------------------
    // Backing File Errors (fatal)
    // -------------------------------------------------------------------------
    #[error("could not open backing file {}: {source}", .path.display())]
    FileOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not memory map file: {0}")]
    Map(#[source] std::io::Error),

    #[error("could not unmap memory: {0}")]
    Unmap(#[source] std::io::Error),

    #[error("could not lock backing file: {0}")]
    Lock(#[source] std::io::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("backing file is corrupt: {0}")]
    Corrupt(String),

    // -------------------------------------------------------------------------
    // Input Errors (recoverable)
    // -------------------------------------------------------------------------
    #[error("could not parse {0}")]
    Parse(String),

    #[error("{field} is out of range: {value} > {max}")]
    Range {
        field: &'static str,
        value: u64,
        max: u64,
    },

    #[error("cannot encode record: {0}")]
    Encode(String),
}

impl StoreError {
    /// Whether the error leaves the store unusable.
    ///
    /// Fatal errors terminate the interactive session with a non-zero status;
    /// everything else is reported and the session continues.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            StoreError::Parse(_) | StoreError::Range { .. } | StoreError::Encode(_)
        )
    }
}
