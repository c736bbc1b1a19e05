//! Configuration management and validation.
//!
//! Replaces the fixed paths and tuning constants of a batch run with an
//! explicit structure handed to the driver.

use crate::constants::{
    DEFAULT_CHUNK_COUNT, DEFAULT_EXTRACTION_WORKERS, DEFAULT_FILE_GLOB, MAX_CHUNK_COUNT,
};
use crate::error::{Result, ScintError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::debug;

/// Configuration for one demultiplexing run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingConfig {
    /// Directory containing the hourly RAW files
    pub source_dir: PathBuf,

    /// Root directory receiving the LAS1, LAS2, MWS and Met subdirectories
    pub dest_dir: PathBuf,

    /// Glob matched against file names inside `source_dir`
    pub file_glob: String,

    /// Number of chunks each file is split into before extraction
    pub chunk_count: usize,

    /// Replace existing output files instead of skipping the source file
    pub overwrite: bool,

    /// Worker tasks used to extract chunks (1 = in-line, 0 = one per CPU)
    pub extraction_workers: usize,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from("."),
            dest_dir: PathBuf::from("RAW_Convert"),
            file_glob: DEFAULT_FILE_GLOB.to_string(),
            chunk_count: DEFAULT_CHUNK_COUNT,
            overwrite: false,
            extraction_workers: DEFAULT_EXTRACTION_WORKERS,
        }
    }
}

impl ProcessingConfig {
    /// Create a configuration for the given source and destination directories
    pub fn new(source_dir: impl Into<PathBuf>, dest_dir: impl Into<PathBuf>) -> Self {
        Self {
            source_dir: source_dir.into(),
            dest_dir: dest_dir.into(),
            ..Self::default()
        }
    }

    /// Set the source file glob
    pub fn with_file_glob(mut self, file_glob: impl Into<String>) -> Self {
        self.file_glob = file_glob.into();
        self
    }

    /// Set the number of chunks per file
    pub fn with_chunk_count(mut self, chunk_count: usize) -> Self {
        self.chunk_count = chunk_count;
        self
    }

    /// Allow existing outputs to be replaced
    pub fn with_overwrite(mut self) -> Self {
        self.overwrite = true;
        self
    }

    /// Set the number of extraction workers
    pub fn with_extraction_workers(mut self, workers: usize) -> Self {
        self.extraction_workers = workers;
        self
    }

    /// Worker count with the auto setting resolved against the host
    pub fn effective_workers(&self) -> usize {
        match self.extraction_workers {
            0 => num_cpus::get().max(1),
            n => n,
        }
    }

    /// Check the configuration before any file is touched
    pub fn validate(&self) -> Result<()> {
        if self.chunk_count == 0 {
            return Err(ScintError::Configuration {
                message: "chunk count must be at least 1".to_string(),
            });
        }

        if self.chunk_count > MAX_CHUNK_COUNT {
            return Err(ScintError::Configuration {
                message: format!(
                    "chunk count {} exceeds the maximum of {}",
                    self.chunk_count, MAX_CHUNK_COUNT
                ),
            });
        }

        if self.file_glob.trim().is_empty() {
            return Err(ScintError::Configuration {
                message: "file glob must not be empty".to_string(),
            });
        }

        if self.file_glob.contains('/') || self.file_glob.contains('\\') {
            return Err(ScintError::Configuration {
                message: format!(
                    "file glob '{}' must match file names, not paths",
                    self.file_glob
                ),
            });
        }

        if self.source_dir == self.dest_dir {
            return Err(ScintError::Configuration {
                message: "destination directory must differ from the source directory"
                    .to_string(),
            });
        }

        debug!(
            "Configuration valid: chunks={}, workers={}, glob={}",
            self.chunk_count,
            self.effective_workers(),
            self.file_glob
        );

        Ok(())
    }
}
