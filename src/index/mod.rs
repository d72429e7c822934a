//! Index Module
//!
//! Lookup structures over the mapped region.
//!
//! ## Responsibilities
//! - `HashIndex`: key → offset of the value field, built by one scan of a
//!   text region. Offsets are relative to the mapping base, so the only fixup
//!   after a remap is a full rebuild.
//! - `SortedIndex`: a borrowed view of a binary region as an ascending array
//!   of fixed-size records, searched by record index.

mod hash;
mod sorted;

pub use hash::HashIndex;
pub use sorted::{record_range, value_range, SortedIndex};
