//! Range Iterator
//!
//! The lazy, seekable key/value iterator the merge engine drives — one per
//! range file participating in a commit read, diff, or merge.
//!
//! ## Resource contract
//!
//! The iterator is handed a release callback that frees the underlying
//! file resource (e.g. decrements a handle-cache refcount). The callback
//! fires exactly once per iterator lifetime, on whichever terminal
//! transition happens first:
//! - natural exhaustion (`next()` runs off the end of the range)
//! - a fatal error (cursor I/O failure or value deserialization failure)
//! - an explicit `close()`
//!
//! Releasing on logical completion lets a merge holding many open ranges
//! drop file handles as each leg finishes, without the merge loop having
//! to track closing on every code path.
//!
//! ## Error contract
//!
//! Failures during `next()` are stored and re-exposed by `err()` rather
//! than returned, so a caller driving several iterators in key lock-step
//! can check each one independently after a batch of advances. The first
//! recorded error is sticky: the iterator is permanently unusable after it.

use crate::error::Result;
use crate::value::{KeyValue, ValueDeserializer};
use crate::StrataError;

use super::cursor::RangeCursor;

/// Release callback type: frees the resource backing an iterator
pub type Releaser = Box<dyn FnMut() -> Result<()>>;

/// Lazy iterator over one range file's decoded key/value entries
///
/// Not safe for concurrent use; each instance is owned by exactly one
/// logical reader.
pub struct RangeIterator<C: RangeCursor, D: ValueDeserializer> {
    cursor: C,
    deserializer: D,
    /// Taken (set to None) when the release callback fires; doubles as the
    /// "already released" flag
    release: Option<Releaser>,
    /// Stop before any key >= this bound
    upper_bound: Option<Vec<u8>>,
    /// Current entry; None before the first next(), after exhaustion, and
    /// after an error
    current: Option<KeyValue>,
    /// First recorded error; sticky
    err: Option<StrataError>,
    exhausted: bool,
    /// Set by close(); unlike exhaustion, a seek cannot undo it
    closed: bool,
}

impl<C: RangeCursor, D: ValueDeserializer> RangeIterator<C, D> {
    /// Create an iterator over `cursor`, decoding values with
    /// `deserializer`, releasing the underlying resource via `release`.
    ///
    /// Performs no I/O; the cursor stays positioned before the first
    /// entry until `next()` is called. If `upper_bound` is set, iteration
    /// stops before the first key at or above it.
    pub fn new(
        cursor: C,
        deserializer: D,
        release: Releaser,
        upper_bound: Option<Vec<u8>>,
    ) -> Self {
        Self {
            cursor,
            deserializer,
            release: Some(release),
            upper_bound,
            current: None,
            err: None,
            exhausted: false,
            closed: false,
        }
    }

    /// Advance to the next entry
    ///
    /// Returns true and positions on the entry if one was read and
    /// decoded; returns false on exhaustion, on the upper bound, or on a
    /// fatal error (check `err()`). Any terminal transition fires the
    /// release callback.
    pub fn next(&mut self) -> bool {
        if self.err.is_some() || self.exhausted {
            return false;
        }

        let (key, raw) = match self.cursor.next() {
            None => {
                self.exhausted = true;
                self.current = None;
                self.release_once();
                return false;
            }
            Some(Err(e)) => {
                self.fail(e);
                return false;
            }
            Some(Ok(entry)) => entry,
        };

        if let Some(bound) = &self.upper_bound {
            if key.as_slice() >= bound.as_slice() {
                self.exhausted = true;
                self.current = None;
                self.release_once();
                return false;
            }
        }

        match self.deserializer.deserialize(&raw) {
            Ok(value) => {
                self.current = Some(KeyValue { key, value });
                true
            }
            Err(e) => {
                self.fail(e);
                false
            }
        }
    }

    /// Current entry, if positioned on one
    pub fn value(&self) -> Option<&KeyValue> {
        self.current.as_ref()
    }

    /// First recorded error, if any; never clears once set
    pub fn err(&self) -> Option<&StrataError> {
        self.err.as_ref()
    }

    /// Reposition to the first entry with key >= `key`
    ///
    /// Clears the current value; a `next()` is required to observe an
    /// entry at the new position. No-op on an errored or closed iterator.
    /// Seeking after natural exhaustion repositions the cursor but never
    /// re-fires the release callback.
    pub fn seek_ge(&mut self, key: &[u8]) {
        if self.err.is_some() || self.closed {
            return;
        }
        self.current = None;
        self.exhausted = false;
        if let Err(e) = self.cursor.seek_ge(key) {
            self.fail(e);
        }
    }

    /// Release the underlying resource if it has not been released yet
    ///
    /// Idempotent; safe after exhaustion or error (no double-release).
    /// A closed iterator yields no further entries.
    pub fn close(&mut self) {
        self.closed = true;
        self.exhausted = true;
        self.current = None;
        self.release_once();
    }

    /// Record a fatal error and release. The iterator is unusable after.
    fn fail(&mut self, e: StrataError) {
        tracing::debug!("Range iterator failed: {}", e);
        self.current = None;
        self.err = Some(e);
        self.release_once();
    }

    fn release_once(&mut self) {
        if let Some(mut release) = self.release.take() {
            if let Err(e) = release() {
                if self.err.is_none() {
                    self.err = Some(e);
                }
            }
        }
    }
}

impl<C: RangeCursor, D: ValueDeserializer> Drop for RangeIterator<C, D> {
    fn drop(&mut self) {
        // Same flag as close(); a released iterator releases nothing here
        self.release_once();
    }
}
