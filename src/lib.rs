//! # mapkv
//!
//! A persistent key-value store backed directly by a memory-mapped file:
//! - Two record encodings: space-padded text lines behind a hash index, and
//!   packed 8-byte binary records kept sorted for binary search
//! - In-place, fixed-width updates; appends grow the file and remap it
//! - Whole-file advisory locking so several processes can share one file
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   Session (stdin / stdout)                   │
//! │               "<key>" | "<key> <value>" | "exit"             │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                         Store                                │
//! │        lock ─► catch up with file ─► get / set ─► unlock     │
//! └──────────┬──────────────────┬───────────────────┬───────────┘
//!            │                  │                   │
//!            ▼                  ▼                   ▼
//!   ┌─────────────┐     ┌──────────────┐    ┌──────────────┐
//!   │  LockGuard  │     │ BackingFile  │    │    Layout    │
//!   │   (flock)   │     │ (mmap, grow) │    │ text | binary│
//!   └─────────────┘     └──────────────┘    └──────┬───────┘
//!                                                  │
//!                                    ┌─────────────┴─────────────┐
//!                                    ▼                           ▼
//!                             ┌─────────────┐            ┌─────────────┐
//!                             │  HashIndex  │            │ SortedIndex │
//!                             └─────────────┘            └─────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;

pub mod index;
pub mod layout;
pub mod protocol;
pub mod record;
pub mod session;
pub mod storage;
pub mod store;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use config::{Config, Encoding};
pub use error::{Result, StoreError};
pub use record::Record;
pub use store::{Store, Upsert};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of mapkv
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
