//! Error handling for RAW telemetry processing.
//!
//! Run-level errors (bad configuration, missing source directory) stop a
//! batch before it starts; every other variant is scoped to one source file
//! and is recorded by the driver while the batch carries on.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScintError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Source directory not found: {path}")]
    SourceDirNotFound { path: PathBuf },

    #[error("Invalid file pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("Failed to read RAW file: {path} - {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write output file: {path} - {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No '<count> # number of samples' header in file: {path}")]
    MalformedHeader { path: PathBuf },

    #[error("Sample count '{value}' is not a valid record count in file: {path}")]
    InvalidSampleCount { path: PathBuf, value: String },

    #[error("No YYMMDD_hhmmss date stamp in file name: {path}")]
    MissingDateStamp { path: PathBuf },

    #[error("Date stamp {stamp} of {path} was already used by {first} in this run")]
    DuplicateDateStamp {
        path: PathBuf,
        stamp: String,
        first: PathBuf,
    },

    #[error("Extraction worker failed for file: {path} - {reason}")]
    WorkerFailed { path: PathBuf, reason: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

pub type Result<T> = std::result::Result<T, ScintError>;
