//! File discovery module for RAW telemetry dumps
//!
//! Enumerates the hourly RAW files in the source directory and extracts the
//! `YYMMDD_hhmmss` date stamp each file name carries.

use crate::constants::FILE_DATE_STAMP_PATTERN;
use crate::error::{Result, ScintError};
use crate::models::DateStamp;
use glob::{MatchOptions, Pattern};
use regex::Regex;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// File discovery component for RAW dumps
#[derive(Debug)]
pub struct FileDiscovery {
    source_dir: PathBuf,
    file_glob: String,
    date_stamp: Regex,
}

impl FileDiscovery {
    /// Create a new file discovery instance
    pub fn new(source_dir: PathBuf, file_glob: impl Into<String>) -> Result<Self> {
        let date_stamp =
            Regex::new(FILE_DATE_STAMP_PATTERN).map_err(|e| ScintError::InvalidPattern {
                pattern: FILE_DATE_STAMP_PATTERN.to_string(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            source_dir,
            file_glob: file_glob.into(),
            date_stamp,
        })
    }

    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }

    /// Discover all RAW files in the source directory, sorted by name
    ///
    /// Only the top level of the source directory is searched. File names
    /// sort chronologically because they embed the date stamp.
    pub fn discover_raw_files(&self) -> Result<Vec<PathBuf>> {
        if !self.source_dir.is_dir() {
            return Err(ScintError::SourceDirNotFound {
                path: self.source_dir.clone(),
            });
        }

        // Escape the directory so only the file glob is interpreted
        let escaped_dir = Pattern::escape(&self.source_dir.to_string_lossy());
        let pattern = Path::new(&escaped_dir).join(&self.file_glob);
        let pattern_str = pattern.to_string_lossy();

        debug!("Searching for RAW files with pattern: {}", pattern_str);

        let options = MatchOptions {
            case_sensitive: true,
            require_literal_separator: true,
            require_literal_leading_dot: false,
        };
        let entries =
            glob::glob_with(&pattern_str, options).map_err(|e| ScintError::InvalidPattern {
                pattern: self.file_glob.clone(),
                reason: e.to_string(),
            })?;

        let mut files = Vec::new();
        for entry in entries {
            match entry {
                Ok(path) if path.is_file() => files.push(path),
                Ok(path) => debug!("Ignoring non-file match: {}", path.display()),
                Err(e) => warn!("Unreadable entry while searching {}: {}", pattern_str, e),
            }
        }

        files.sort();
        debug!("Found {} RAW files", files.len());

        Ok(files)
    }

    /// Extract the date stamp from a RAW file name
    pub fn date_stamp(&self, path: &Path) -> Result<DateStamp> {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default();

        let stamp = self
            .date_stamp
            .find(&file_name)
            .map(|m| DateStamp::new(m.as_str()))
            .ok_or_else(|| ScintError::MissingDateStamp {
                path: path.to_path_buf(),
            })?;

        if stamp.datetime().is_none() {
            warn!(
                "Date stamp {} in {} is not a valid calendar time",
                stamp,
                path.display()
            );
        }

        Ok(stamp)
    }
}
