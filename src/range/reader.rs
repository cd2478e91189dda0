//! Range Reader
//!
//! Opens range files, validates the format, and provides O(log n) point
//! lookups via an in-memory index.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use crate::error::Result;
use crate::StrataError;

use super::cursor::FileCursor;
use super::{FOOTER_SIZE, HEADER_SIZE, MAGIC, VERSION};

/// Reader for immutable range files
#[derive(Debug)]
pub struct RangeReader {
    /// File handle for reading entries
    file: BufReader<File>,
    /// In-memory index: key → file offset
    index: BTreeMap<Vec<u8>, u64>,
    /// Metadata
    entry_count: u64,
    /// Index block starting offset (end of data block)
    index_offset: u64,
}

impl RangeReader {
    /// Open a range file for reading
    ///
    /// Validates magic and version, then loads the entire index into
    /// memory for fast lookups and seeks.
    pub fn open(path: &Path) -> Result<Self> {
        let mut file = File::open(path)?;
        let file_size = file.metadata()?.len();

        // Read and validate header
        let mut header = [0u8; HEADER_SIZE as usize];
        file.read_exact(&mut header)?;

        if &header[0..4] != MAGIC {
            return Err(StrataError::Storage(format!(
                "Invalid range file magic: expected SRNG, got {:?}",
                &header[0..4]
            )));
        }

        let version = u16::from_le_bytes(header[4..6].try_into().unwrap());
        if version != VERSION {
            return Err(StrataError::Storage(format!(
                "Unsupported range file version: {}",
                version
            )));
        }

        let entry_count = u64::from_le_bytes(header[6..14].try_into().unwrap());

        // Read footer to get index offset
        file.seek(SeekFrom::End(-(FOOTER_SIZE as i64)))?;
        let mut footer = [0u8; FOOTER_SIZE as usize];
        file.read_exact(&mut footer)?;

        let index_offset = u64::from_le_bytes(footer[0..8].try_into().unwrap());
        let _data_crc = u32::from_le_bytes(footer[8..12].try_into().unwrap());

        // A corrupt footer must not send the index scan outside the file
        if index_offset < HEADER_SIZE || index_offset > file_size - FOOTER_SIZE {
            return Err(StrataError::Storage(format!(
                "Invalid index offset {} for range file of {} bytes",
                index_offset, file_size
            )));
        }

        // Load index into memory
        file.seek(SeekFrom::Start(index_offset))?;

        let index_block_size = file_size - FOOTER_SIZE - index_offset;
        let mut index_data = vec![0u8; index_block_size as usize];
        file.read_exact(&mut index_data)?;

        let index = Self::parse_index(&index_data)?;

        if index.len() as u64 != entry_count {
            return Err(StrataError::Storage(format!(
                "Index entry count mismatch: header says {}, index has {}",
                entry_count,
                index.len()
            )));
        }

        // Position at the first data entry
        file.seek(SeekFrom::Start(HEADER_SIZE))?;

        tracing::trace!("Opened range file {:?}: {} entries", path, entry_count);

        Ok(Self {
            file: BufReader::new(file),
            index,
            entry_count,
            index_offset,
        })
    }

    /// Parse index entries: [key_len(4)][offset(8)][key]
    fn parse_index(index_data: &[u8]) -> Result<BTreeMap<Vec<u8>, u64>> {
        let mut index = BTreeMap::new();
        let mut pos = 0;
        while pos < index_data.len() {
            if pos + 12 > index_data.len() {
                return Err(StrataError::Storage(
                    "Truncated index block".to_string(),
                ));
            }
            let key_len =
                u32::from_le_bytes(index_data[pos..pos + 4].try_into().unwrap()) as usize;
            pos += 4;

            let offset = u64::from_le_bytes(index_data[pos..pos + 8].try_into().unwrap());
            pos += 8;

            if pos + key_len > index_data.len() {
                return Err(StrataError::Storage(
                    "Truncated index block".to_string(),
                ));
            }
            let key = index_data[pos..pos + key_len].to_vec();
            pos += key_len;

            index.insert(key, offset);
        }
        Ok(index)
    }

    /// Get a value's raw bytes by key — O(log n) lookup via in-memory index
    ///
    /// Returns `Ok(None)` if the key is not in this range.
    pub fn get(&mut self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        let offset = match self.index.get(key) {
            Some(&off) => off,
            None => return Ok(None),
        };

        // Seek directly to the entry
        self.file.seek(SeekFrom::Start(offset))?;

        let mut header = [0u8; 8];
        self.file.read_exact(&mut header)?;

        let key_len = u32::from_le_bytes(header[0..4].try_into().unwrap()) as usize;
        let val_len = u32::from_le_bytes(header[4..8].try_into().unwrap()) as usize;

        // Skip the key (we already know it matches)
        self.file.seek(SeekFrom::Current(key_len as i64))?;

        let mut value = vec![0u8; val_len];
        self.file.read_exact(&mut value)?;

        Ok(Some(value))
    }

    /// Get entry count
    pub fn entry_count(&self) -> u64 {
        self.entry_count
    }

    /// Get the minimum key in this range (for range filtering)
    pub fn min_key(&self) -> Option<&[u8]> {
        self.index.keys().next().map(|k| k.as_slice())
    }

    /// Get the maximum key in this range (for range filtering)
    pub fn max_key(&self) -> Option<&[u8]> {
        self.index.keys().next_back().map(|k| k.as_slice())
    }

    /// Quick check if a key might be in this range (range check)
    /// Returns false only if the key is definitely outside [min_key, max_key]
    pub fn might_contain(&self, key: &[u8]) -> bool {
        match (self.min_key(), self.max_key()) {
            (Some(min), Some(max)) => key >= min && key <= max,
            _ => false, // Empty range
        }
    }

    /// Convert into a cursor positioned before the first entry
    ///
    /// The cursor takes ownership of the file handle and index; the reader
    /// is consumed.
    pub fn into_cursor(mut self) -> Result<FileCursor> {
        self.file.seek(SeekFrom::Start(HEADER_SIZE))?;
        Ok(FileCursor {
            file: self.file,
            index: self.index,
            current_offset: HEADER_SIZE,
            data_end: self.index_offset,
        })
    }
}
