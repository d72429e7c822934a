//! Configuration for mapkv
//!
//! Centralized configuration with sensible defaults.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::StoreError;

/// Main configuration for a Store instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Backing File Configuration
    // -------------------------------------------------------------------------
    /// Path of the single backing file shared by all cooperating instances
    pub path: PathBuf,

    /// Create the backing file (empty) when it does not exist yet
    pub create_if_missing: bool,

    // -------------------------------------------------------------------------
    // Record Configuration
    // -------------------------------------------------------------------------
    /// On-disk record encoding and the index strategy that goes with it
    pub encoding: Encoding,

    // -------------------------------------------------------------------------
    // Durability Configuration
    // -------------------------------------------------------------------------
    /// msync the mapping after every mutation instead of leaving writeback
    /// to the kernel
    pub sync_on_write: bool,
}

/// Record encoding of the backing file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// `"<key> <value padded to 10>\n"` lines, looked up through a hash index
    Text,

    /// Packed 8-byte records kept in ascending key order, binary searched
    Binary,
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Encoding::Text => f.write_str("text"),
            Encoding::Binary => f.write_str("binary"),
        }
    }
}

impl FromStr for Encoding {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(Encoding::Text),
            "binary" => Ok(Encoding::Binary),
            other => Err(StoreError::Parse(format!("encoding '{}'", other))),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./mapkv.db"),
            create_if_missing: true,
            encoding: Encoding::Text,
            sync_on_write: false,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the backing file path
    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.path = path.into();
        self
    }

    /// Set the record encoding
    pub fn encoding(mut self, encoding: Encoding) -> Self {
        self.config.encoding = encoding;
        self
    }

    /// Create the backing file when missing
    pub fn create_if_missing(mut self, create: bool) -> Self {
        self.config.create_if_missing = create;
        self
    }

    /// Flush the mapping after every mutation
    pub fn sync_on_write(mut self, sync: bool) -> Self {
        self.config.sync_on_write = sync;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
