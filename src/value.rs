//! Value records
//!
//! The deserialized form of a stored range-file payload, and the pluggable
//! deserializer contract the range iterator uses to decode raw entries.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::StrataError;

/// A stored value record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Value {
    /// Content fingerprint, used for deduplication and integrity checks
    pub identity: Vec<u8>,

    /// Opaque payload
    pub data: Vec<u8>,
}

/// A key paired with its decoded value — the unit produced by an iterator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyValue {
    /// Opaque ordered byte sequence; byte-lexicographic total order
    pub key: Vec<u8>,

    /// Decoded value record
    pub value: Value,
}

/// Decodes a raw stored payload into a value record
///
/// Range files store values as opaque bytes; the iterator decodes them
/// lazily, one entry per `next()`. Implementations may fail — a failure is
/// fatal to the owning iterator.
pub trait ValueDeserializer {
    fn deserialize(&self, raw: &[u8]) -> Result<Value>;
}

/// Deserializer for bincode-encoded value records
#[derive(Debug, Default, Clone, Copy)]
pub struct BincodeDeserializer;

impl ValueDeserializer for BincodeDeserializer {
    fn deserialize(&self, raw: &[u8]) -> Result<Value> {
        bincode::deserialize(raw)
            .map_err(|e| StrataError::Deserialization(format!("Invalid value record: {}", e)))
    }
}

/// Encode a value record for storage in a range file
pub fn serialize_value(value: &Value) -> Result<Vec<u8>> {
    bincode::serialize(value)
        .map_err(|e| StrataError::Serialization(format!("Failed to encode value record: {}", e)))
}
