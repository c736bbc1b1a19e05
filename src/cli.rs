//! Command-line interface components.

use crate::config::ProcessingConfig;
use crate::constants::{DEFAULT_CHUNK_COUNT, DEFAULT_EXTRACTION_WORKERS, DEFAULT_FILE_GLOB};
use clap::Parser;
use std::path::PathBuf;
use tracing::Level;

#[derive(Parser, Debug)]
#[command(name = "scint-rawparse")]
#[command(about = "Split scintillometer RAW ASCII dumps into LAS1, LAS2, MWS and Met files")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Args {
    /// Directory containing the hourly RAW files
    #[arg(value_name = "SOURCE_DIR")]
    pub source_dir: PathBuf,

    /// Root directory for the LAS1, LAS2, MWS and Met output folders
    #[arg(value_name = "DEST_DIR")]
    pub dest_dir: PathBuf,

    /// Glob selecting RAW files inside the source directory
    #[arg(short, long, default_value = DEFAULT_FILE_GLOB)]
    pub glob: String,

    /// Number of chunks each file is split into
    #[arg(short, long, default_value_t = DEFAULT_CHUNK_COUNT)]
    pub chunks: usize,

    /// Worker tasks for chunk extraction (0 = one per CPU)
    #[arg(short, long, default_value_t = DEFAULT_EXTRACTION_WORKERS)]
    pub workers: usize,

    /// Replace output files that already exist
    #[arg(short, long)]
    pub force: bool,

    /// Print the run statistics as JSON instead of a summary
    #[arg(long)]
    pub json: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Build the processing configuration from the parsed arguments
    pub fn to_config(&self) -> ProcessingConfig {
        let config = ProcessingConfig::new(&self.source_dir, &self.dest_dir)
            .with_file_glob(self.glob.clone())
            .with_chunk_count(self.chunks)
            .with_extraction_workers(self.workers);

        if self.force {
            config.with_overwrite()
        } else {
            config
        }
    }

    /// Log level implied by the flags
    pub fn log_level(&self) -> Level {
        if self.verbose {
            Level::DEBUG
        } else {
            Level::WARN
        }
    }
}
