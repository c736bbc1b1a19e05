//! Error handling integration tests

use super::{create_dirs, quiet_demultiplexer, read_output, write_raw_file};
use crate::config::ProcessingConfig;
use crate::encoding::encode_latin1;
use crate::error::ScintError;
use crate::processor::Demultiplexer;
use crate::test_support::{synthetic_file, synthetic_records};
use std::fs;
use tempfile::TempDir;

#[tokio::test]
async fn test_nonexistent_source_dir() {
    let temp_dir = TempDir::new().unwrap();
    let missing = temp_dir.path().join("nonexistent");
    let dest = temp_dir.path().join("out");

    let result = quiet_demultiplexer(ProcessingConfig::new(&missing, &dest))
        .process()
        .await;

    match result.unwrap_err() {
        ScintError::SourceDirNotFound { path } => assert_eq!(path, missing),
        other => panic!("Expected SourceDirNotFound error, got {other:?}"),
    }
}

#[test]
fn test_invalid_config_is_rejected() {
    let result = Demultiplexer::new(ProcessingConfig::new("raw", "out").with_chunk_count(0));
    assert!(matches!(result, Err(ScintError::Configuration { .. })));
}

#[tokio::test]
async fn test_missing_header_fails_file_but_not_batch() {
    let temp_dir = TempDir::new().unwrap();
    let (source, dest) = create_dirs(&temp_dir);

    let bad = write_raw_file(&source, "160601_000000", &synthetic_records(2));
    write_raw_file(&source, "160601_010000", &synthetic_file(2, &synthetic_records(2)));

    let stats = quiet_demultiplexer(ProcessingConfig::new(&source, &dest))
        .process()
        .await
        .unwrap();

    assert_eq!(stats.files_processed, 1);
    assert_eq!(stats.files_failed, 1);
    assert_eq!(stats.failures[0].source, bad);
    assert!(stats.failures[0].reason.contains("number of samples"));

    // The failed file leaves no outputs behind
    assert!(!dest.join("Met").join("Met_160601_000000.dat").exists());
    assert_eq!(read_output(&dest, "Met", "160601_010000").lines().count(), 2);
}

#[tokio::test]
async fn test_missing_date_stamp() {
    let temp_dir = TempDir::new().unwrap();
    let (source, dest) = create_dirs(&temp_dir);
    let raw = source.join("unstamped.RAW.ASC");
    fs::write(&raw, synthetic_file(1, &synthetic_records(1))).unwrap();

    let processor = quiet_demultiplexer(ProcessingConfig::new(&source, &dest));
    let stats = processor.process().await.unwrap();
    assert_eq!(stats.files_failed, 1);

    assert!(matches!(
        processor.process_file(&raw).await,
        Err(ScintError::MissingDateStamp { .. })
    ));
}

#[tokio::test]
async fn test_empty_file() {
    let temp_dir = TempDir::new().unwrap();
    let (source, dest) = create_dirs(&temp_dir);
    let raw = write_raw_file(&source, "160601_000000", "");

    let processor = quiet_demultiplexer(ProcessingConfig::new(&source, &dest));
    assert!(matches!(
        processor.process_file(&raw).await,
        Err(ScintError::MalformedHeader { .. })
    ));
}

#[tokio::test]
async fn test_header_without_records_writes_empty_streams() {
    let temp_dir = TempDir::new().unwrap();
    let (source, dest) = create_dirs(&temp_dir);
    write_raw_file(&source, "160601_000000", &synthetic_file(3, ""));

    let stats = quiet_demultiplexer(ProcessingConfig::new(&source, &dest))
        .process()
        .await
        .unwrap();

    assert_eq!(stats.files_processed, 1);
    assert_eq!(stats.reports[0].records_extracted, 0);
    assert_eq!(stats.reports[0].missing_records(), 3);
    for stream in ["Met", "LAS1", "LAS2", "MWS"] {
        assert!(read_output(&dest, stream, "160601_000000").is_empty());
    }
}

#[tokio::test]
async fn test_latin1_and_crlf_input() {
    let temp_dir = TempDir::new().unwrap();
    let (source, dest) = create_dirs(&temp_dir);

    // Degree sign in the free-form header and CRLF line endings throughout
    let text = synthetic_file(2, &synthetic_records(2))
        .replace("# Site: test", "# T in \u{b0}C")
        .replace('\n', "\r\n");
    let bytes = encode_latin1(&text);
    assert!(bytes.contains(&0xB0));
    fs::write(source.join("MWSC_160601_000000.RAW.ASC"), bytes).unwrap();

    let stats = quiet_demultiplexer(ProcessingConfig::new(&source, &dest))
        .process()
        .await
        .unwrap();

    assert_eq!(stats.extracted_records, 2);
    let met = read_output(&dest, "Met", "160601_000000");
    assert!(!met.contains('\r'));
    assert_eq!(met.lines().count(), 2);
}

#[tokio::test]
async fn test_shared_date_stamp_fails_second_file() {
    let temp_dir = TempDir::new().unwrap();
    let (source, dest) = create_dirs(&temp_dir);

    let first = source.join("A_160601_000000.RAW.ASC");
    fs::write(&first, synthetic_file(2, &synthetic_records(2))).unwrap();
    let second = write_raw_file(
        &source,
        "160601_000000",
        &synthetic_file(1, &synthetic_records(1)),
    );

    for config in [
        ProcessingConfig::new(&source, &dest).with_chunk_count(1),
        ProcessingConfig::new(&source, &dest)
            .with_chunk_count(1)
            .with_overwrite(),
    ] {
        let stats = quiet_demultiplexer(config).process().await.unwrap();

        assert_eq!(stats.files_failed, 1);
        assert_eq!(stats.failures[0].source, second);
        assert!(stats.failures[0].reason.contains("already used"));
        assert_eq!(stats.files_skipped + stats.files_processed, 1);

        // The first file's outputs are never replaced by the second
        assert_eq!(read_output(&dest, "Met", "160601_000000").lines().count(), 2);
    }
}
