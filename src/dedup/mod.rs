//! Dedup Module
//!
//! Content-address registry: maps a content fingerprint to exactly one
//! physical storage address per repository, under concurrent writers.
//!
//! The ingestion path computes a fingerprint for new data, asks the
//! registry for the canonical physical address (possibly reusing a prior
//! upload), and records that address in a new range entry. Identical
//! content uploaded concurrently by independent writers converges on a
//! single stored object.
//!
//! ## Responsibilities
//! - Transactional get-or-create per `(repository, fingerprint)`
//! - Retry the read path when an insert loses the unique-key race
//! - Surface repository NotFound; never surface a row-lookup miss

mod registry;
mod store;

pub use registry::DedupRegistry;
pub use store::{MemStore, RepositoryResolver, Transaction, TransactionalStore, TxOptions};

use std::fmt;

use crate::error::Result;
use crate::StrataError;

// =============================================================================
// Identifiers
// =============================================================================

/// Internal repository id, assigned by the catalog
pub type RepositoryId = u64;

/// Fingerprint width in bytes (SHA-256)
pub const DEDUP_ID_SIZE: usize = 32;

/// Fixed-width content fingerprint
///
/// Constructed from its hex form (the wire/display representation) and
/// stored as raw bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DedupId([u8; DEDUP_ID_SIZE]);

impl DedupId {
    /// Parse a fingerprint from its 64-char hex representation
    pub fn from_hex(s: &str) -> Result<Self> {
        let raw = hex::decode(s)
            .map_err(|e| StrataError::Validation(format!("Invalid dedup id: {}", e)))?;
        let bytes: [u8; DEDUP_ID_SIZE] = raw.try_into().map_err(|_| {
            StrataError::Validation(format!(
                "Invalid dedup id: expected {} hex chars",
                DEDUP_ID_SIZE * 2
            ))
        })?;
        Ok(Self(bytes))
    }

    /// Raw fingerprint bytes
    pub fn as_bytes(&self) -> &[u8; DEDUP_ID_SIZE] {
        &self.0
    }
}

impl fmt::Display for DedupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

// =============================================================================
// Persisted Row
// =============================================================================

/// One registry row: immutable once created, never deleted by this layer
///
/// At most one row ever exists per `(repository_id, dedup_id)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DedupEntry {
    pub repository_id: RepositoryId,
    pub dedup_id: DedupId,
    pub physical_address: String,
}
