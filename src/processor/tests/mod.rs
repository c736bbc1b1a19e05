//! Integration tests for the processor module
//!
//! Runs the complete demultiplexing pipeline over synthetic RAW dumps
//! written into temporary source directories.

pub mod error_handling;

use crate::config::ProcessingConfig;
use crate::processor::Demultiplexer;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Source and destination directories inside a temp dir
pub fn create_dirs(temp_dir: &TempDir) -> (PathBuf, PathBuf) {
    let source = temp_dir.path().join("RAW");
    let dest = temp_dir.path().join("RAW_Convert");
    fs::create_dir_all(&source).unwrap();
    (source, dest)
}

/// Write a RAW file named after `stamp` into `source`
pub fn write_raw_file(source: &Path, stamp: &str, content: &str) -> PathBuf {
    let path = source.join(format!("MWSC_{}.RAW.ASC", stamp));
    fs::write(&path, content).unwrap();
    path
}

/// Demultiplexer with the progress output switched off
pub fn quiet_demultiplexer(config: ProcessingConfig) -> Demultiplexer {
    Demultiplexer::new(config).unwrap().without_progress()
}

/// Read one stream file for `stamp`
pub fn read_output(dest: &Path, stream: &str, stamp: &str) -> String {
    fs::read_to_string(dest.join(stream).join(format!("{}_{}.dat", stream, stamp))).unwrap()
}
