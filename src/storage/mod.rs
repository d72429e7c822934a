//! Storage Module
//!
//! The backing file, its memory mapping, and the advisory lock around them.
//!
//! ## Responsibilities
//! - Open the backing file and map its current length
//! - Grow the file by appending bytes, replacing the mapping
//! - Re-derive the on-disk length so changes made by other instances are seen
//! - Whole-file shared/exclusive locking between cooperating processes
//!
//! ## Mapping Lifecycle
//! ```text
//!   open ──► map(len) ──► ... ──► grow: unmap ─► append ─► map(len + n)
//!                                   │
//!                                   └─ every borrowed region is gone here
//! ```
//! An empty file has no mapping at all; `region()` is then an empty slice.

mod backing;
mod lock;

pub use backing::BackingFile;
pub use lock::{LockGuard, LockMode};
