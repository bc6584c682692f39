//! Readers backed by real files

mod common;

use common::{chunk, riff, sample_wave};
use pretty_assertions::assert_eq;
use riffwalk_core::{Error, ReaderConfig, RiffReader};
use std::fs::File;
use std::io::{Seek, SeekFrom, Write};
use tempfile::NamedTempFile;

fn write_temp(bytes: &[u8]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(bytes).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn open_file_walks_the_tree() {
    let file = write_temp(&sample_wave());
    let mut reader = RiffReader::open_file(file.path(), ReaderConfig::default()).unwrap();
    assert_eq!(reader.config().expected_size, Some(100));

    let mut listing = Vec::new();
    reader
        .walk(|visit| {
            listing.push(format!(
                "{}{} {} @{}",
                "  ".repeat(visit.depth),
                visit.chunk.id,
                visit.chunk.size,
                visit.chunk.position()
            ))
        })
        .unwrap();

    assert_eq!(
        listing,
        vec![
            "fmt  16 @12",
            "LIST 32 @36",
            "  INAM 5 @48",
            "  IART 5 @62",
            "data 6 @76",
            "cue  1 @90",
        ]
    );
}

#[test]
fn open_file_reads_payload() {
    let file = write_temp(&sample_wave());
    let mut reader = RiffReader::open_file(file.path(), ReaderConfig::default()).unwrap();

    reader.next_chunk().unwrap();
    let inam = reader.descend().unwrap().unwrap();
    assert_eq!(inam.id, *b"INAM");
    assert_eq!(reader.read_chunk_data().unwrap(), b"song\0".to_vec());

    reader.ascend_next().unwrap();
    assert_eq!(reader.read_chunk_data().unwrap(), vec![0x10, 0x20, 0x30, 0x40, 0x50, 0x60]);
}

#[test]
fn trailing_bytes_are_a_size_mismatch() {
    let mut bytes = sample_wave();
    bytes.extend_from_slice(&[0u8; 4]);
    let file = write_temp(&bytes);

    let err = RiffReader::open_file(file.path(), ReaderConfig::default()).unwrap_err();
    assert!(matches!(err, Error::SizeMismatch { declared: 100, expected: 104 }));

    let config = ReaderConfig::default().tolerate_size_mismatch();
    let mut reader = RiffReader::open_file(file.path(), config).unwrap();
    assert!(reader.size_mismatch().is_some());
    reader.validate_file().unwrap();
}

#[test]
fn truncated_file_is_unexpected_eof() {
    let mut bytes = sample_wave();
    bytes.truncate(80);
    let file = write_temp(&bytes);

    let err = RiffReader::open_file(file.path(), ReaderConfig::default()).unwrap_err();
    assert!(matches!(err, Error::UnexpectedEof { .. }));

    let mut reader = RiffReader::open_file(
        file.path(),
        ReaderConfig::default().with_expected_size(100),
    )
    .unwrap();
    reader.next_chunk().unwrap();
    let err = reader.next_chunk().unwrap_err();
    assert!(matches!(err, Error::UnexpectedEof { position: 76, .. }));
}

#[test]
fn stream_opened_mid_file() {
    let mut bytes = vec![0xEE; 7];
    bytes.extend_from_slice(&riff(b"WAVE", &[chunk(b"data", &[1, 2, 3])]));
    let file = write_temp(&bytes);

    let mut handle = File::open(file.path()).unwrap();
    handle.seek(SeekFrom::Start(7)).unwrap();
    let mut reader = RiffReader::from_stream(handle, ReaderConfig::default()).unwrap();

    assert_eq!(reader.start_offset(), 7);
    let data = *reader.current_chunk().unwrap();
    assert_eq!(data.data_start, 7 + 20);
    assert_eq!(reader.read_chunk_data().unwrap(), vec![1, 2, 3]);
    assert_eq!(reader.next_chunk().unwrap(), None);

    let mut handle = reader.close().into_inner();
    assert_eq!(handle.stream_position().unwrap(), 7 + 23);
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = RiffReader::open_file(dir.path().join("absent.wav"), ReaderConfig::default())
        .unwrap_err();
    assert!(matches!(err, Error::Io(_)));
}
