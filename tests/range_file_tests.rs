//! Tests for range file building and reading
//!
//! These tests verify:
//! - Range file creation and the strictly-increasing-key contract
//! - O(log n) point lookups via the in-memory index
//! - Min/max key range filtering
//! - File format validation on open
//! - Raw cursor advance and seek

use std::fs;
use std::path::{Path, PathBuf};

use strata::range::{RangeBuilder, RangeCursor, RangeReader};
use strata::StrataError;
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_temp_range() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("test.range");
    (temp_dir, path)
}

/// Create a range file with numbered entries
fn create_range_with_entries(path: &Path, count: usize) -> strata::range::RangeMeta {
    let mut builder = RangeBuilder::new(path).unwrap();
    // Zero-padded keys keep lexicographic order
    for i in 0..count {
        let key = format!("key{:05}", i);
        let value = format!("value{}", i);
        builder.add(key.as_bytes(), value.as_bytes()).unwrap();
    }
    builder.finish().unwrap()
}

// =============================================================================
// RangeBuilder Tests
// =============================================================================

#[test]
fn test_builder_creates_file() {
    let (_temp, path) = setup_temp_range();

    let meta = create_range_with_entries(&path, 5);

    assert!(path.exists());
    assert_eq!(meta.entry_count(), 5);
    assert!(meta.file_size > 0);
}

#[test]
fn test_builder_writes_under_configured_ranges_dir() {
    let temp_dir = TempDir::new().unwrap();
    let config = strata::Config::builder().data_dir(temp_dir.path()).build();

    fs::create_dir_all(config.ranges_dir()).unwrap();
    let path = config.ranges_dir().join("0001.range");
    create_range_with_entries(&path, 3);

    let reader = RangeReader::open(&path).unwrap();
    assert_eq!(reader.entry_count(), 3);
}

#[test]
fn test_builder_empty_range() {
    let (_temp, path) = setup_temp_range();

    let builder = RangeBuilder::new(&path).unwrap();
    let meta = builder.finish().unwrap();

    assert_eq!(meta.entry_count(), 0);
    assert!(path.exists());
}

#[test]
fn test_builder_tracks_min_max_keys() {
    let (_temp, path) = setup_temp_range();

    let mut builder = RangeBuilder::new(&path).unwrap();
    builder.add(b"apple", b"1").unwrap();
    builder.add(b"banana", b"2").unwrap();
    builder.add(b"cherry", b"3").unwrap();
    let meta = builder.finish().unwrap();

    assert_eq!(meta.min_key, b"apple");
    assert_eq!(meta.max_key, b"cherry");
    assert!(meta.might_contain(b"banana"));
    assert!(meta.might_contain(b"blueberry"));
    assert!(!meta.might_contain(b"zucchini"));
}

#[test]
fn test_builder_rejects_out_of_order_keys() {
    let (_temp, path) = setup_temp_range();

    let mut builder = RangeBuilder::new(&path).unwrap();
    builder.add(b"banana", b"2").unwrap();
    let err = builder.add(b"apple", b"1").unwrap_err();

    assert!(matches!(err, StrataError::Validation(_)));
}

#[test]
fn test_builder_rejects_duplicate_keys() {
    let (_temp, path) = setup_temp_range();

    let mut builder = RangeBuilder::new(&path).unwrap();
    builder.add(b"apple", b"1").unwrap();
    let err = builder.add(b"apple", b"other").unwrap_err();

    assert!(matches!(err, StrataError::Validation(_)));
}

// =============================================================================
// RangeReader Tests
// =============================================================================

#[test]
fn test_reader_opens_valid_range() {
    let (_temp, path) = setup_temp_range();
    create_range_with_entries(&path, 10);

    let reader = RangeReader::open(&path).unwrap();
    assert_eq!(reader.entry_count(), 10);
    assert_eq!(reader.min_key().unwrap(), b"key00000");
    assert_eq!(reader.max_key().unwrap(), b"key00009");
}

#[test]
fn test_reader_get_existing_key() {
    let (_temp, path) = setup_temp_range();
    create_range_with_entries(&path, 10);

    let mut reader = RangeReader::open(&path).unwrap();
    let value = reader.get(b"key00003").unwrap();
    assert_eq!(value, Some(b"value3".to_vec()));
}

#[test]
fn test_reader_get_absent_key() {
    let (_temp, path) = setup_temp_range();
    create_range_with_entries(&path, 10);

    let mut reader = RangeReader::open(&path).unwrap();
    assert_eq!(reader.get(b"missing").unwrap(), None);
}

#[test]
fn test_reader_might_contain() {
    let (_temp, path) = setup_temp_range();
    create_range_with_entries(&path, 10);

    let reader = RangeReader::open(&path).unwrap();
    assert!(reader.might_contain(b"key00005"));
    assert!(!reader.might_contain(b"aaa"));
    assert!(!reader.might_contain(b"zzz"));
}

#[test]
fn test_reader_rejects_bad_magic() {
    let (_temp, path) = setup_temp_range();
    fs::write(&path, vec![0u8; 64]).unwrap();

    let err = RangeReader::open(&path).unwrap_err();
    assert!(matches!(err, StrataError::Storage(_)));
}

#[test]
fn test_reader_rejects_out_of_range_index_offset() {
    let (_temp, path) = setup_temp_range();

    // valid header, empty data block, footer pointing past the file end
    let mut bytes = Vec::new();
    bytes.extend_from_slice(b"SRNG");
    bytes.extend_from_slice(&1u16.to_le_bytes());
    bytes.extend_from_slice(&0u64.to_le_bytes());
    bytes.extend_from_slice(&u64::MAX.to_le_bytes());
    bytes.extend_from_slice(&0u32.to_le_bytes());
    bytes.extend_from_slice(&[0u8; 4]);
    fs::write(&path, bytes).unwrap();

    let err = RangeReader::open(&path).unwrap_err();
    assert!(matches!(err, StrataError::Storage(_)));
}

// =============================================================================
// Cursor Tests
// =============================================================================

#[test]
fn test_cursor_full_scan_in_order() {
    let (_temp, path) = setup_temp_range();
    create_range_with_entries(&path, 25);

    let mut cursor = RangeReader::open(&path).unwrap().into_cursor().unwrap();

    let mut seen = 0;
    while let Some(entry) = cursor.next() {
        let (key, value) = entry.unwrap();
        assert_eq!(key, format!("key{:05}", seen).as_bytes());
        assert_eq!(value, format!("value{}", seen).as_bytes());
        seen += 1;
    }
    assert_eq!(seen, 25);
}

#[test]
fn test_cursor_seek_ge() {
    let (_temp, path) = setup_temp_range();
    create_range_with_entries(&path, 25);

    let mut cursor = RangeReader::open(&path).unwrap().into_cursor().unwrap();

    cursor.seek_ge(b"key00010").unwrap();
    let (key, _) = cursor.next().unwrap().unwrap();
    assert_eq!(key, b"key00010");

    // seeking between keys lands on the next one
    cursor.seek_ge(b"key00010x").unwrap();
    let (key, _) = cursor.next().unwrap().unwrap();
    assert_eq!(key, b"key00011");

    // seeking past the last key exhausts
    cursor.seek_ge(b"zzz").unwrap();
    assert!(cursor.next().is_none());
}
