//! Core data structures for RAW telemetry demultiplexing.
//!
//! Defines the four output streams, the date stamp carried by each source
//! file, the per-stream accumulators and the per-file and batch reports.

use crate::constants::{FILE_DATE_STAMP_FORMAT, OUTPUT_EXTENSION};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// The four per-instrument output streams
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OutputStream {
    Met,
    Las1,
    Las2,
    Mws,
}

impl OutputStream {
    /// All streams in the order their files are written
    pub const ALL: [OutputStream; 4] = [
        OutputStream::Met,
        OutputStream::Las1,
        OutputStream::Las2,
        OutputStream::Mws,
    ];

    /// Name used for both the output subdirectory and the file name prefix
    pub fn name(&self) -> &'static str {
        match self {
            OutputStream::Met => "Met",
            OutputStream::Las1 => "LAS1",
            OutputStream::Las2 => "LAS2",
            OutputStream::Mws => "MWS",
        }
    }

    /// Output subdirectory for this stream under the destination root
    pub fn directory(&self, dest_root: &Path) -> PathBuf {
        dest_root.join(self.name())
    }

    /// Full output path: `<dest>/<Stream>/<Stream>_<stamp>.dat`
    pub fn output_path(&self, dest_root: &Path, stamp: &DateStamp) -> PathBuf {
        self.directory(dest_root).join(format!(
            "{}_{}.{}",
            self.name(),
            stamp.as_str(),
            OUTPUT_EXTENSION
        ))
    }
}

impl fmt::Display for OutputStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// `YYMMDD_hhmmss` date stamp taken verbatim from a RAW file name
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateStamp(String);

impl DateStamp {
    pub fn new(stamp: impl Into<String>) -> Self {
        Self(stamp.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Calendar interpretation of the stamp, if it names a real date and time
    pub fn datetime(&self) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(&self.0, FILE_DATE_STAMP_FORMAT).ok()
    }
}

impl fmt::Display for DateStamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Accumulated, newline-terminated lines for each of the four streams
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamBuffers {
    pub met: String,
    pub las1: String,
    pub las2: String,
    pub mws: String,
}

impl StreamBuffers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Borrow the accumulated text of one stream
    pub fn get(&self, stream: OutputStream) -> &str {
        match stream {
            OutputStream::Met => &self.met,
            OutputStream::Las1 => &self.las1,
            OutputStream::Las2 => &self.las2,
            OutputStream::Mws => &self.mws,
        }
    }

    /// Append another set of buffers, preserving order
    pub fn append(&mut self, other: &StreamBuffers) {
        self.met.push_str(&other.met);
        self.las1.push_str(&other.las1);
        self.las2.push_str(&other.las2);
        self.mws.push_str(&other.mws);
    }

    /// Number of lines held for one stream
    pub fn line_count(&self, stream: OutputStream) -> usize {
        self.get(stream).lines().count()
    }

    pub fn is_empty(&self) -> bool {
        OutputStream::ALL.iter().all(|s| self.get(*s).is_empty())
    }
}

/// Outcome of demultiplexing one source file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileReport {
    pub source: PathBuf,
    pub date_stamp: DateStamp,
    pub declared_samples: usize,
    pub chunks_planned: usize,
    pub chunks_located: usize,
    pub records_extracted: usize,
    pub outputs: Vec<PathBuf>,
    pub processing_time_ms: u128,
}

impl FileReport {
    /// Declared records that never made it into the output
    pub fn missing_records(&self) -> usize {
        self.declared_samples.saturating_sub(self.records_extracted)
    }

    /// Whether every declared record was extracted
    pub fn is_complete(&self) -> bool {
        self.records_extracted == self.declared_samples
    }
}

/// A source file that could not be processed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailedFile {
    pub source: PathBuf,
    pub reason: String,
}

/// Batch processing statistics
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ProcessingStats {
    pub files_processed: usize,
    pub files_skipped: usize,
    pub files_failed: usize,
    pub declared_records: usize,
    pub extracted_records: usize,
    pub reports: Vec<FileReport>,
    pub failures: Vec<FailedFile>,
    pub dest_path: PathBuf,
    pub processing_time_ms: u128,
}

impl ProcessingStats {
    pub fn record_success(&mut self, report: FileReport) {
        self.files_processed += 1;
        self.declared_records += report.declared_samples;
        self.extracted_records += report.records_extracted;
        self.reports.push(report);
    }

    pub fn record_failure(&mut self, source: PathBuf, reason: impl Into<String>) {
        self.files_failed += 1;
        self.failures.push(FailedFile {
            source,
            reason: reason.into(),
        });
    }

    pub fn record_skip(&mut self) {
        self.files_skipped += 1;
    }

    /// Files whose extracted count fell short of the declared count
    pub fn incomplete_files(&self) -> impl Iterator<Item = &FileReport> {
        self.reports.iter().filter(|r| !r.is_complete())
    }
}
