//! Range Builder
//!
//! Writes sorted key-value entries to a new immutable range file.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Seek, SeekFrom, Write};
use std::path::Path;

use crate::error::Result;
use crate::StrataError;

use super::{RangeMeta, HEADER_SIZE, MAGIC, VERSION};

/// Builder for creating new range files from sorted entries
///
/// Keys must be added in strictly increasing byte order; a range never
/// contains duplicate keys.
pub struct RangeBuilder {
    /// Output file path
    path: std::path::PathBuf,
    /// Buffered writer for performance
    writer: BufWriter<File>,
    /// Number of entries written
    entry_count: u64,
    /// Current write position (for index)
    current_offset: u64,
    /// Index: key → file offset of entry
    index: Vec<(Vec<u8>, u64)>,
    /// Track min/max keys for metadata
    min_key: Option<Vec<u8>>,
    max_key: Option<Vec<u8>>,
    /// Running CRC hasher for data section
    data_hasher: crc32fast::Hasher,
}

impl RangeBuilder {
    /// Create a new range builder
    ///
    /// Writes the header immediately; call `add()` in strictly increasing
    /// key order, then `finish()` to write the index and footer.
    pub fn new(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;

        let mut writer = BufWriter::new(file);

        // Write header (entry_count placeholder, updated in finish)
        writer.write_all(MAGIC)?;
        writer.write_all(&VERSION.to_le_bytes())?;
        writer.write_all(&0u64.to_le_bytes())?;

        Ok(Self {
            path: path.to_path_buf(),
            writer,
            entry_count: 0,
            current_offset: HEADER_SIZE,
            index: Vec::new(),
            min_key: None,
            max_key: None,
            data_hasher: crc32fast::Hasher::new(),
        })
    }

    /// Add a key-value pair
    ///
    /// The key must be strictly greater than every key added so far.
    pub fn add(&mut self, key: &[u8], value: &[u8]) -> Result<()> {
        if let Some(last) = &self.max_key {
            if key <= last.as_slice() {
                return Err(StrataError::Validation(format!(
                    "Keys must be strictly increasing: {:?} after {:?}",
                    key, last
                )));
            }
        }

        // Record offset for index
        self.index.push((key.to_vec(), self.current_offset));

        // Track min/max keys
        if self.min_key.is_none() {
            self.min_key = Some(key.to_vec());
        }
        self.max_key = Some(key.to_vec());

        // Entry layout: [key_len(4)][val_len(4)][key][value]
        let key_len_bytes = (key.len() as u32).to_le_bytes();
        let val_len_bytes = (value.len() as u32).to_le_bytes();

        self.writer.write_all(&key_len_bytes)?;
        self.writer.write_all(&val_len_bytes)?;
        self.writer.write_all(key)?;
        self.writer.write_all(value)?;

        self.data_hasher.update(&key_len_bytes);
        self.data_hasher.update(&val_len_bytes);
        self.data_hasher.update(key);
        self.data_hasher.update(value);

        self.current_offset += 8 + key.len() as u64 + value.len() as u64;
        self.entry_count += 1;

        Ok(())
    }

    /// Finish building: write index block, footer, and return metadata
    pub fn finish(mut self) -> Result<RangeMeta> {
        // Record where index block starts
        let index_offset = self.current_offset;

        // Write index block: [key_len(4)][offset(8)][key] for each entry
        for (key, offset) in &self.index {
            let key_len = key.len() as u32;
            self.writer.write_all(&key_len.to_le_bytes())?;
            self.writer.write_all(&offset.to_le_bytes())?;
            self.writer.write_all(key)?;
        }

        // Finalize CRC
        let data_crc = self.data_hasher.finalize();

        // Write footer: index_offset (8) + data_crc (4) + padding (4)
        self.writer.write_all(&index_offset.to_le_bytes())?;
        self.writer.write_all(&data_crc.to_le_bytes())?;
        self.writer.write_all(&[0u8; 4])?;

        // Flush everything
        self.writer.flush()?;

        // Seek back and update entry count in header
        let mut file = self
            .writer
            .into_inner()
            .map_err(|e| StrataError::Storage(format!("Failed to flush range file: {}", e)))?;
        file.seek(SeekFrom::Start(6))?; // After magic + version
        file.write_all(&self.entry_count.to_le_bytes())?;
        file.sync_all()?;

        let file_size = file.metadata()?.len();

        tracing::debug!(
            "Finished range file {:?}: {} entries, {} bytes",
            self.path,
            self.entry_count,
            file_size
        );

        Ok(RangeMeta {
            path: self.path,
            entry_count: self.entry_count,
            min_key: self.min_key.unwrap_or_default(),
            max_key: self.max_key.unwrap_or_default(),
            file_size,
        })
    }
}
