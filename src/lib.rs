//! # Strata
//!
//! Committed-storage core for a versioned, object-store-backed data lake:
//! - Immutable sorted range files (the on-disk unit of a commit's key space)
//! - Lazy, seekable range iterators with a single-release resource contract
//! - A transactional dedup registry mapping content fingerprints to
//!   physical storage addresses
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   Merge / Diff Engine                        │
//! │              (external, drives N iterators)                  │
//! └───────────┬─────────────────────────────────┬───────────────┘
//!             │                                 │
//! ┌───────────▼───────────┐         ┌───────────▼───────────────┐
//! │     RangeIterator     │         │      DedupRegistry        │
//! │ (lazy, seekable, one  │         │ (transactional get-or-    │
//! │  release per handle)  │         │  create per fingerprint)  │
//! └───────────┬───────────┘         └───────────┬───────────────┘
//!             │                                 │
//! ┌───────────▼───────────┐         ┌───────────▼───────────────┐
//! │ RangeReader / Cursor  │         │    TransactionalStore     │
//! │  (immutable sorted    │         │  (staged writes, commit   │
//! │   key/value files)    │         │   on success only)        │
//! └───────────────────────┘         └───────────────────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod value;
pub mod range;
pub mod dedup;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{Result, StrataError};
pub use config::Config;
pub use value::{BincodeDeserializer, KeyValue, Value, ValueDeserializer};
pub use range::{RangeBuilder, RangeCursor, RangeIterator, RangeReader};
pub use dedup::{DedupId, DedupRegistry, MemStore};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of Strata
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
