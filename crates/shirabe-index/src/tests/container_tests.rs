//! Container file format tests

use std::fs;
use std::path::{Path, PathBuf};

use byteorder::{BigEndian, ByteOrder};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

use crate::container::{ContainerMode, EXTENSION, FileIndexContainer, MAGIC, VERSION};
use crate::data::IndexByteOrder;
use crate::error::IndexError;

const TEST_INDEX_TYPE: i32 = 0xabc;
const TEST_INDEX_DATA: &[u8] = b"foo";

fn index_path(dir: &TempDir) -> PathBuf {
    dir.path().join(format!("dictionary{EXTENSION}"))
}

fn header_fields(path: &Path) -> [i32; 4] {
    let bytes = fs::read(path).unwrap();
    [
        BigEndian::read_i32(&bytes[0..4]),
        BigEndian::read_i32(&bytes[4..8]),
        BigEndian::read_i32(&bytes[8..12]),
        BigEndian::read_i32(&bytes[12..16]),
    ]
}

fn create_with(path: &Path, records: &[(i32, &[u8])]) {
    let mut container = FileIndexContainer::edit(path).unwrap();
    for (index_type, data) in records {
        container.create_index(*index_type, data).unwrap();
    }
    container.close();
}

#[test]
fn test_create_new_index_file_writes_header() {
    let dir = tempfile::tempdir().unwrap();
    let path = index_path(&dir);

    let mut container = FileIndexContainer::edit(&path).unwrap();
    container.close();

    assert_eq!(fs::metadata(&path).unwrap().len(), 16);
    assert_eq!(
        header_fields(&path),
        [MAGIC, VERSION, 16, IndexByteOrder::native().marker()]
    );
}

#[test]
fn test_mode_flags() {
    let dir = tempfile::tempdir().unwrap();
    let path = index_path(&dir);
    create_with(&path, &[]);

    let mut edit = FileIndexContainer::edit(&path).unwrap();
    assert!(edit.can_edit());
    assert!(!edit.can_access());
    assert_eq!(edit.byte_order(), IndexByteOrder::native());
    edit.close();

    let access = FileIndexContainer::access(&path).unwrap();
    assert!(access.can_access());
    assert!(!access.can_edit());
}

#[test]
fn test_create_index_writes_record() {
    let dir = tempfile::tempdir().unwrap();
    let path = index_path(&dir);

    let mut container = FileIndexContainer::edit(&path).unwrap();
    container.create_index(TEST_INDEX_TYPE, TEST_INDEX_DATA).unwrap();
    assert!(container.has_index(TEST_INDEX_TYPE));
    assert!(!container.has_index(TEST_INDEX_TYPE + 1));
    container.close();

    let bytes = fs::read(&path).unwrap();
    assert_eq!(bytes.len(), 16 + 12 + TEST_INDEX_DATA.len());
    assert_eq!(BigEndian::read_i32(&bytes[16..20]), TEST_INDEX_TYPE);
    assert_eq!(BigEndian::read_i32(&bytes[20..24]), 3);
    assert_eq!(BigEndian::read_i32(&bytes[24..28]), 12);
    assert_eq!(&bytes[28..], TEST_INDEX_DATA);
}

#[test]
fn test_create_duplicate_index_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = index_path(&dir);

    let mut container = FileIndexContainer::edit(&path).unwrap();
    container.create_index(TEST_INDEX_TYPE, TEST_INDEX_DATA).unwrap();
    let err = container.create_index(TEST_INDEX_TYPE, b"bar").unwrap_err();
    assert!(matches!(err, IndexError::IndexExists(TEST_INDEX_TYPE)));
    assert_eq!(container.index_types(), vec![TEST_INDEX_TYPE]);
}

#[test]
fn test_end_editing_allows_reads() {
    let dir = tempfile::tempdir().unwrap();
    let path = index_path(&dir);

    let mut container = FileIndexContainer::edit(&path).unwrap();
    container.create_index(TEST_INDEX_TYPE, TEST_INDEX_DATA).unwrap();
    assert!(matches!(
        container.get_index_data(TEST_INDEX_TYPE),
        Err(IndexError::IllegalMode {
            mode: ContainerMode::Edit,
            ..
        })
    ));

    container.end_editing().unwrap();
    assert!(container.can_access());
    assert!(!container.can_edit());
    assert_eq!(container.get_index_data(TEST_INDEX_TYPE).unwrap().as_bytes(), TEST_INDEX_DATA);

    // one-way transition
    assert!(matches!(
        container.end_editing(),
        Err(IndexError::IllegalMode { .. })
    ));
    assert!(matches!(
        container.create_index(1, b"x"),
        Err(IndexError::IllegalMode {
            mode: ContainerMode::Access,
            ..
        })
    ));
    container.close();
}

#[test]
fn test_round_trip_two_records() {
    let dir = tempfile::tempdir().unwrap();
    let path = index_path(&dir);
    let first: &[u8] = &[1, 2, 3, 4, 5];
    let second: &[u8] = b"second payload";
    create_with(&path, &[(1, first), (2, second)]);
    let header_before = header_fields(&path);

    let mut container = FileIndexContainer::access(&path).unwrap();
    assert!(container.has_index(1));
    assert!(container.has_index(2));
    assert_eq!(container.index_types(), vec![1, 2]);
    assert_eq!(container.get_index_data(1).unwrap().as_bytes(), first);
    assert_eq!(container.get_index_data(2).unwrap().as_bytes(), second);
    container.close();

    assert_eq!(header_fields(&path), header_before);
}

#[test]
fn test_single_record_scenario() {
    let dir = tempfile::tempdir().unwrap();
    let path = index_path(&dir);
    create_with(&path, &[(7, &[0x01, 0x02, 0x03, 0x04])]);

    let container = FileIndexContainer::access(&path).unwrap();
    let data = container.get_index_data(7).unwrap();
    assert_eq!(&data[..], &[0x01, 0x02, 0x03, 0x04]);
    assert!(!container.has_index(99));
    assert!(matches!(
        container.get_index_data(99),
        Err(IndexError::IndexMissing(99))
    ));
}

#[test]
fn test_repeated_reads_share_cached_view() {
    let dir = tempfile::tempdir().unwrap();
    let path = index_path(&dir);
    create_with(&path, &[(7, &[0x01, 0x02, 0x03, 0x04])]);

    let container = FileIndexContainer::access(&path).unwrap();
    let first = container.get_index_data(7).unwrap();
    let second = container.get_index_data(7).unwrap();
    assert!(first.shares_mapping(&second));

    // cursors are independent
    let mut a = first.cursor();
    let mut b = second.cursor();
    let mut byte = [0u8; 1];
    std::io::Read::read_exact(&mut a, &mut byte).unwrap();
    assert_eq!(a.position(), 1);
    assert_eq!(b.position(), 0);
    std::io::Read::read_exact(&mut b, &mut byte).unwrap();
    assert_eq!(byte, [0x01]);
}

#[test]
fn test_payload_numbers_follow_byte_order() {
    let dir = tempfile::tempdir().unwrap();
    let path = index_path(&dir);
    let value: i32 = 0x0102_0304;
    let payload = match IndexByteOrder::native() {
        IndexByteOrder::BigEndian => value.to_be_bytes(),
        IndexByteOrder::LittleEndian => value.to_le_bytes(),
    };
    create_with(&path, &[(3, &payload)]);

    let container = FileIndexContainer::access(&path).unwrap();
    let data = container.get_index_data(3).unwrap();
    assert_eq!(data.read_i32_at(0), Some(value));
    assert_eq!(data.read_i32_at(1), None);
}

#[test]
fn test_delete_first_index_compacts_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = index_path(&dir);
    let second: &[u8] = b"kept payload";
    create_with(&path, &[(1, b"deleted"), (2, second)]);

    let mut container = FileIndexContainer::edit(&path).unwrap();
    container.delete_index(1).unwrap();
    assert!(!container.has_index(1));
    assert!(container.has_index(2));
    container.end_editing().unwrap();
    assert_eq!(container.get_index_data(2).unwrap().as_bytes(), second);
    container.close();

    assert_eq!(
        fs::metadata(&path).unwrap().len(),
        16 + 12 + second.len() as u64
    );

    let container = FileIndexContainer::access(&path).unwrap();
    assert_eq!(container.index_types(), vec![2]);
    assert_eq!(container.get_index_data(2).unwrap().as_bytes(), second);
}

#[test]
fn test_delete_middle_and_last_index() {
    let dir = tempfile::tempdir().unwrap();
    let path = index_path(&dir);
    create_with(&path, &[(1, b"one"), (2, b"two!"), (3, b"three")]);

    let mut container = FileIndexContainer::edit(&path).unwrap();
    container.delete_index(2).unwrap();
    assert_eq!(container.index_types(), vec![1, 3]);
    container.delete_index(3).unwrap();
    assert_eq!(container.index_types(), vec![1]);
    container.close();

    assert_eq!(fs::metadata(&path).unwrap().len(), 16 + 12 + 3);
    let container = FileIndexContainer::access(&path).unwrap();
    assert_eq!(container.get_index_data(1).unwrap().as_bytes(), b"one");
}

#[test]
fn test_delete_missing_index_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = index_path(&dir);
    create_with(&path, &[(1, b"one")]);
    let before = fs::read(&path).unwrap();

    let mut container = FileIndexContainer::edit(&path).unwrap();
    assert!(matches!(
        container.delete_index(5),
        Err(IndexError::IndexMissing(5))
    ));
    container.close();
    assert_eq!(fs::read(&path).unwrap(), before);
}

#[test]
fn test_delete_in_access_mode_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = index_path(&dir);
    create_with(&path, &[(1, b"one")]);

    let mut container = FileIndexContainer::access(&path).unwrap();
    assert!(matches!(
        container.delete_index(1),
        Err(IndexError::IllegalMode { .. })
    ));
    assert!(container.has_index(1));
}

#[test]
fn test_close_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = index_path(&dir);
    create_with(&path, &[(1, b"one")]);
    let before = fs::read(&path).unwrap();

    let mut container = FileIndexContainer::access(&path).unwrap();
    let view = container.get_index_data(1).unwrap();
    container.close();
    container.close();
    assert!(container.is_closed());
    assert!(matches!(container.get_index_data(1), Err(IndexError::Closed)));

    assert_eq!(view.as_bytes(), b"one");
    assert_eq!(fs::read(&path).unwrap(), before);
}

#[test]
fn test_access_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = FileIndexContainer::access(index_path(&dir));
    assert!(matches!(result, Err(IndexError::Io(_))));
}

#[test]
fn test_bad_magic_is_corruption() {
    let dir = tempfile::tempdir().unwrap();
    let path = index_path(&dir);
    let mut bytes = vec![0u8; 16];
    BigEndian::write_i32(&mut bytes[0..4], 0x1234_5678);
    fs::write(&path, &bytes).unwrap();

    assert!(matches!(
        FileIndexContainer::access(&path),
        Err(IndexError::Corruption(_))
    ));
}

#[test]
fn test_unsupported_version_is_corruption() {
    let dir = tempfile::tempdir().unwrap();
    let path = index_path(&dir);
    create_with(&path, &[]);
    let mut bytes = fs::read(&path).unwrap();
    BigEndian::write_i32(&mut bytes[4..8], 2000);
    fs::write(&path, &bytes).unwrap();

    match FileIndexContainer::access(&path) {
        Err(IndexError::Corruption(message)) => assert!(message.contains("2000")),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn test_truncated_header_is_corruption() {
    let dir = tempfile::tempdir().unwrap();
    let path = index_path(&dir);
    let mut bytes = vec![0u8; 6];
    BigEndian::write_i32(&mut bytes[0..4], MAGIC);
    fs::write(&path, &bytes).unwrap();

    assert!(matches!(
        FileIndexContainer::access(&path),
        Err(IndexError::Corruption(_))
    ));
}

#[test]
fn test_truncated_record_is_corruption() {
    let dir = tempfile::tempdir().unwrap();
    let path = index_path(&dir);
    create_with(&path, &[(1, b"payload")]);
    let bytes = fs::read(&path).unwrap();
    fs::write(&path, &bytes[..bytes.len() - 2]).unwrap();

    assert!(matches!(
        FileIndexContainer::access(&path),
        Err(IndexError::Corruption(_))
    ));
}

#[test]
fn test_repeated_index_type_is_corruption() {
    let dir = tempfile::tempdir().unwrap();
    let path = index_path(&dir);
    create_with(&path, &[(1, b"ab")]);
    let mut bytes = fs::read(&path).unwrap();
    let record = bytes[16..].to_vec();
    bytes.extend_from_slice(&record);
    fs::write(&path, &bytes).unwrap();

    assert!(matches!(
        FileIndexContainer::access(&path),
        Err(IndexError::Corruption(_))
    ));
    assert!(matches!(
        FileIndexContainer::edit(&path),
        Err(IndexError::Corruption(_))
    ));
}

#[test]
fn test_reopen_for_append() {
    let dir = tempfile::tempdir().unwrap();
    let path = index_path(&dir);
    create_with(&path, &[(1, b"one")]);
    create_with(&path, &[(2, b"two")]);

    let container = FileIndexContainer::access(&path).unwrap();
    assert_eq!(container.index_types(), vec![1, 2]);
    assert_eq!(container.get_index_data(2).unwrap().as_bytes(), b"two");
}
