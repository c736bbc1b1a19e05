//! Scintillometer RAW Parser Library
//!
//! Demultiplexes the hourly ASCII dumps written by a two-wavelength
//! scintillometer system into per-instrument time series.
//!
//! Each dump holds one composite record per second: a weather station line
//! plus 20-line sample blocks from LAS aperture 1, LAS aperture 2 and the
//! MWS. This library provides tools for:
//! - Recognising composite records with a line-cursor grammar
//! - Splitting large dumps into bounded chunks of records
//! - Extracting and timestamp-tagging the four streams of each record
//! - Writing one file per stream and source dump, atomically
//! - Reporting declared versus extracted record counts per file

pub mod cli;
pub mod config;
pub mod constants;
pub mod encoding;
pub mod error;
pub mod extractor;
pub mod grammar;
pub mod header;
pub mod models;
pub mod processor;
pub mod splitter;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export commonly used types
pub use config::ProcessingConfig;
pub use error::{Result, ScintError};
pub use extractor::{BlockExtractor, Extraction};
pub use grammar::RecordGrammar;
pub use models::{DateStamp, FileReport, OutputStream, ProcessingStats, StreamBuffers};
pub use processor::{Demultiplexer, FileOutcome};
pub use splitter::{ChunkPlan, ChunkSplitter};
