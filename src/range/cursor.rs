//! Range Cursors
//!
//! Positional access to the raw entries of an open range file: forward
//! advance plus seek to the first key at or above a lookup key. Cursors
//! deal in raw value bytes; decoding is the iterator's job.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::ops::Bound;

use crate::error::Result;
use crate::StrataError;

/// Positional cursor over the sorted entries of a range file
///
/// `next` yields `(key, raw_value)` pairs in strictly increasing key order.
/// `seek_ge` repositions so the following `next` yields the first entry
/// with key >= the lookup key.
pub trait RangeCursor {
    fn next(&mut self) -> Option<Result<(Vec<u8>, Vec<u8>)>>;
    fn seek_ge(&mut self, key: &[u8]) -> Result<()>;
}

/// File-backed cursor created by `RangeReader::into_cursor()`
///
/// Owns the file handle; seeks resolve through the in-memory index loaded
/// at open time, advances are sequential reads.
pub struct FileCursor {
    pub(super) file: BufReader<File>,
    /// In-memory index: key → file offset of its entry
    pub(super) index: BTreeMap<Vec<u8>, u64>,
    /// Offset of the next entry to read
    pub(super) current_offset: u64,
    /// Data block ends here (start of index block)
    pub(super) data_end: u64,
}

impl RangeCursor for FileCursor {
    fn next(&mut self) -> Option<Result<(Vec<u8>, Vec<u8>)>> {
        // Stop at the index block
        if self.current_offset >= self.data_end {
            return None;
        }

        // Read entry header: [key_len(4)][val_len(4)]
        let mut header = [0u8; 8];
        if let Err(e) = self.file.read_exact(&mut header) {
            return Some(Err(StrataError::Io(e)));
        }

        let key_len = u32::from_le_bytes(header[0..4].try_into().unwrap()) as usize;
        let val_len = u32::from_le_bytes(header[4..8].try_into().unwrap()) as usize;

        let mut key = vec![0u8; key_len];
        if let Err(e) = self.file.read_exact(&mut key) {
            return Some(Err(StrataError::Io(e)));
        }

        let mut value = vec![0u8; val_len];
        if let Err(e) = self.file.read_exact(&mut value) {
            return Some(Err(StrataError::Io(e)));
        }

        self.current_offset += 8 + key_len as u64 + val_len as u64;

        Some(Ok((key, value)))
    }

    fn seek_ge(&mut self, key: &[u8]) -> Result<()> {
        // First indexed key >= lookup key; past-the-end if none exists
        let target = self
            .index
            .range::<[u8], _>((Bound::Included(key), Bound::Unbounded))
            .next()
            .map(|(_, &offset)| offset)
            .unwrap_or(self.data_end);

        self.file.seek(SeekFrom::Start(target))?;
        self.current_offset = target;
        Ok(())
    }
}
