//! Range Module
//!
//! Immutable sorted key/value files ("ranges") — the on-disk unit of a
//! commit's key space — plus the lazy iterator the merge engine drives.
//!
//! ## File Format
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ Header (14 bytes)                                       │
//! │   Magic: "SRNG" (4) | Version: u16 (2) | Count: u64 (8) │
//! ├─────────────────────────────────────────────────────────┤
//! │ Data Block (variable)                                   │
//! │   [KeyLen: u32][ValLen: u32][Key][Value]                │
//! │   ... repeated for each entry, strictly increasing keys │
//! ├─────────────────────────────────────────────────────────┤
//! │ Index Block (variable)                                  │
//! │   [KeyLen: u32][Offset: u64][Key]                       │
//! │   ... repeated for each entry ...                       │
//! ├─────────────────────────────────────────────────────────┤
//! │ Footer (16 bytes)                                       │
//! │   IndexOffset: u64 (8) | DataCRC: u32 (4) | Padding (4) │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! Ranges are written once and never modified; readers need no locking.

mod builder;
mod cursor;
mod iterator;
mod reader;

use std::path::PathBuf;

pub use builder::RangeBuilder;
pub use cursor::{FileCursor, RangeCursor};
pub use iterator::{RangeIterator, Releaser};
pub use reader::RangeReader;

// =============================================================================
// Shared Constants (used by builder, reader, cursor)
// =============================================================================

/// Magic bytes identifying a Strata range file
pub(crate) const MAGIC: &[u8; 4] = b"SRNG";

/// Current range file format version
pub(crate) const VERSION: u16 = 1;

/// Header size: Magic (4) + Version (2) + EntryCount (8) = 14 bytes
pub(crate) const HEADER_SIZE: u64 = 14;

/// Footer size: IndexOffset (8) + DataCRC (4) + Padding (4) = 16 bytes
pub(crate) const FOOTER_SIZE: u64 = 16;

// =============================================================================
// Range Metadata
// =============================================================================

/// Range metadata — lightweight handle for a finished range file.
///
/// Returned by `RangeBuilder::finish()` and used by the committed-store
/// layer above to record which slice of the key space a file covers.
#[derive(Debug, Clone)]
pub struct RangeMeta {
    /// Path to the range file
    pub path: PathBuf,
    /// Number of entries in this range
    pub entry_count: u64,
    /// Smallest key (for range filtering)
    pub min_key: Vec<u8>,
    /// Largest key (for range filtering)
    pub max_key: Vec<u8>,
    /// File size in bytes
    pub file_size: u64,
}

impl RangeMeta {
    /// Get the number of entries
    pub fn entry_count(&self) -> u64 {
        self.entry_count
    }

    /// Quick check if a key might be in this range (range check)
    /// Returns false if key is definitely outside [min_key, max_key]
    pub fn might_contain(&self, key: &[u8]) -> bool {
        key >= self.min_key.as_slice() && key <= self.max_key.as_slice()
    }
}
