//! Main processing engine.
//!
//! Orchestrates a demultiplexing run: file discovery, header parsing, chunk
//! splitting, block extraction and writing the four stream files for every
//! RAW dump in the source directory.

pub mod discovery;
pub mod writer;

#[cfg(test)]
pub mod tests;

use self::{discovery::FileDiscovery, writer::StreamWriter};

use crate::config::ProcessingConfig;
use crate::encoding::decode_latin1;
use crate::error::{Result, ScintError};
use crate::extractor::{BlockExtractor, Extraction};
use crate::grammar::RecordGrammar;
use crate::header::HeaderParser;
use crate::models::{DateStamp, FileReport, ProcessingStats, StreamBuffers};
use crate::splitter::{ChunkPlan, ChunkSpan, ChunkSplitter};

use colored::*;
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::fs;
use tokio::task;
use tracing::{debug, error, info, warn};

/// What happened to one source file
#[derive(Debug)]
pub enum FileOutcome {
    Processed(FileReport),
    Skipped { existing: Vec<PathBuf> },
}

/// Main processor for RAW dump demultiplexing
#[derive(Debug)]
pub struct Demultiplexer {
    config: ProcessingConfig,
    file_discovery: FileDiscovery,
    header_parser: HeaderParser,
    extractor: BlockExtractor,
    stream_writer: StreamWriter,
    show_progress: bool,
}

impl Demultiplexer {
    /// Create a new demultiplexer for a validated configuration
    pub fn new(config: ProcessingConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            file_discovery: FileDiscovery::new(
                config.source_dir.clone(),
                config.file_glob.clone(),
            )?,
            header_parser: HeaderParser::new()?,
            extractor: BlockExtractor::new(RecordGrammar::new()?)?,
            stream_writer: StreamWriter::new(config.dest_dir.clone(), config.overwrite),
            show_progress: true,
            config,
        })
    }

    /// Suppress the banner, progress bar and summary
    pub fn without_progress(mut self) -> Self {
        self.show_progress = false;
        self
    }

    pub fn config(&self) -> &ProcessingConfig {
        &self.config
    }

    /// Main processing entry point
    ///
    /// Files are processed one after another. A failing file is recorded in
    /// the returned stats and the batch carries on.
    pub async fn process(&self) -> Result<ProcessingStats> {
        let start_time = Instant::now();
        if self.show_progress {
            println!("{}", "Starting RAW file demultiplexing".bright_green().bold());
            println!(
                "  {} {}",
                "Source:".bright_cyan(),
                self.config.source_dir.display()
            );
            println!(
                "  {} {}",
                "Output:".bright_cyan(),
                self.config.dest_dir.display()
            );
        }

        // Step 1: Discover RAW files
        let raw_files = self.file_discovery.discover_raw_files()?;
        if self.show_progress {
            println!(
                "  {} {} files matching {}",
                "Found".bright_green(),
                raw_files.len().to_string().bright_white().bold(),
                self.config.file_glob
            );
        }

        let mut stats = ProcessingStats {
            dest_path: self.config.dest_dir.clone(),
            ..ProcessingStats::default()
        };

        if raw_files.is_empty() {
            warn!(
                "No files matching {} in {}",
                self.config.file_glob,
                self.config.source_dir.display()
            );
            stats.processing_time_ms = start_time.elapsed().as_millis();
            return Ok(stats);
        }

        // Step 2: Create output directories
        self.stream_writer.ensure_layout().await?;

        // Step 3: Demultiplex each file in order
        let pb = self.progress_bar(raw_files.len());
        let mut claimed_stamps: HashMap<DateStamp, PathBuf> = HashMap::new();
        for path in &raw_files {
            if let Some(file_name) = path.file_name() {
                pb.set_message(format!("Processing: {}", file_name.to_string_lossy()));
            }

            let outcome = match self.file_discovery.date_stamp(path) {
                Ok(stamp) => match claimed_stamps.get(&stamp) {
                    Some(first) => Err(ScintError::DuplicateDateStamp {
                        path: path.clone(),
                        stamp: stamp.to_string(),
                        first: first.clone(),
                    }),
                    None => {
                        claimed_stamps.insert(stamp.clone(), path.clone());
                        self.process_stamped(path, stamp).await
                    }
                },
                Err(e) => Err(e),
            };

            match outcome {
                Ok(FileOutcome::Processed(report)) => stats.record_success(report),
                Ok(FileOutcome::Skipped { existing }) => {
                    warn!(
                        "Skipped {}: {} output files already exist (use --force to replace)",
                        path.display(),
                        existing.len()
                    );
                    stats.record_skip();
                }
                Err(e) => {
                    error!("Failed to process {}: {:#}", path.display(), e);
                    stats.record_failure(path.clone(), e.to_string());
                }
            }
            pb.inc(1);
        }
        pb.finish_with_message("All RAW files processed");

        stats.processing_time_ms = start_time.elapsed().as_millis();
        if self.show_progress {
            print_summary(&stats);
        }

        Ok(stats)
    }

    /// Demultiplex one RAW file into its four stream files
    pub async fn process_file(&self, path: &Path) -> Result<FileOutcome> {
        let date_stamp = self.file_discovery.date_stamp(path)?;
        self.process_stamped(path, date_stamp).await
    }

    async fn process_stamped(&self, path: &Path, date_stamp: DateStamp) -> Result<FileOutcome> {
        let start_time = Instant::now();
        info!("Working on file {}", path.display());

        if !self.config.overwrite {
            let existing = self.stream_writer.existing_outputs(&date_stamp);
            if !existing.is_empty() {
                return Ok(FileOutcome::Skipped { existing });
            }
        }

        let bytes = fs::read(path).await.map_err(|source| ScintError::ReadFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let content = decode_latin1(&bytes);
        drop(bytes);

        let header = self.header_parser.locate(&content, path)?;
        let data = &content[header.data_offset..];

        let plan = ChunkPlan::new(header.declared_samples, self.config.chunk_count);
        let spans = ChunkSplitter::new(self.extractor.grammar()).split(data, &plan);
        debug!(
            "{}: {} records planned in {} chunks, {} chunks located",
            path.display(),
            header.declared_samples,
            plan.non_empty_chunks(),
            spans.len()
        );

        let (streams, records_extracted) = self.extract_chunks(path, data, &spans).await?;

        let outputs = self.write_outputs(path, &date_stamp, streams).await?;

        let report = FileReport {
            source: path.to_path_buf(),
            date_stamp,
            declared_samples: header.declared_samples,
            chunks_planned: plan.non_empty_chunks(),
            chunks_located: spans.len(),
            records_extracted,
            outputs,
            processing_time_ms: start_time.elapsed().as_millis(),
        };

        if !report.is_complete() {
            warn!(
                "{}: extracted {} of {} declared records ({} chunks of {} located)",
                path.display(),
                report.records_extracted,
                report.declared_samples,
                report.chunks_located,
                report.chunks_planned
            );
        }
        info!(
            "Finished {} with {} records in {}ms",
            path.display(),
            report.records_extracted,
            report.processing_time_ms
        );

        Ok(FileOutcome::Processed(report))
    }

    /// Write the four streams on a blocking task
    async fn write_outputs(
        &self,
        path: &Path,
        date_stamp: &DateStamp,
        streams: StreamBuffers,
    ) -> Result<Vec<PathBuf>> {
        let writer = self.stream_writer.clone();
        let stamp = date_stamp.clone();

        task::spawn_blocking(move || writer.write_streams(&stamp, &streams))
            .await
            .map_err(|e| ScintError::WorkerFailed {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?
    }

    /// Extract every chunk and merge the results in chunk order
    async fn extract_chunks(
        &self,
        path: &Path,
        data: &str,
        spans: &[ChunkSpan],
    ) -> Result<(StreamBuffers, usize)> {
        let workers = self.config.effective_workers();

        let extractions = if workers <= 1 || spans.len() <= 1 {
            spans
                .iter()
                .map(|span| self.extractor.extract(span.text(data)))
                .collect::<Vec<_>>()
        } else {
            self.extract_chunks_parallel(path, data, spans, workers)
                .await?
        };

        let mut streams = StreamBuffers::new();
        let mut records = 0;
        for (span, extraction) in spans.iter().zip(&extractions) {
            if extraction.records != span.records {
                debug!(
                    "Chunk {} yielded {} of {} records",
                    span.index + 1,
                    extraction.records,
                    span.records
                );
            }
            streams.append(&extraction.streams);
            records += extraction.records;
        }

        Ok((streams, records))
    }

    /// Extract chunks on blocking worker tasks, preserving chunk order
    async fn extract_chunks_parallel(
        &self,
        path: &Path,
        data: &str,
        spans: &[ChunkSpan],
        workers: usize,
    ) -> Result<Vec<Extraction>> {
        debug!(
            "Extracting {} chunks with {} workers",
            spans.len(),
            workers
        );

        let shared: Arc<str> = Arc::from(data);
        let results = stream::iter(spans.iter().copied())
            .map(|span| {
                let shared = Arc::clone(&shared);
                let extractor = self.extractor.clone();
                task::spawn_blocking(move || extractor.extract(span.text(&shared)))
            })
            .buffered(workers)
            .collect::<Vec<_>>()
            .await;

        results
            .into_iter()
            .map(|result| {
                result.map_err(|e| ScintError::WorkerFailed {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                })
            })
            .collect()
    }

    fn progress_bar(&self, len: usize) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new(len as u64);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")
            .map(|style| style.progress_chars("#>-"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        pb.set_style(style);
        pb
    }
}

/// Print the end-of-run summary
fn print_summary(stats: &ProcessingStats) {
    println!("\n{}", "Processing Summary".bright_green().bold());
    println!(
        "  {} {}ms",
        "Time elapsed:".bright_cyan(),
        stats.processing_time_ms.to_string().bright_white()
    );
    println!(
        "  {} {}",
        "Files processed:".bright_cyan(),
        stats.files_processed.to_string().bright_white()
    );
    if stats.files_skipped > 0 {
        println!(
            "  {} {}",
            "Files skipped:".bright_yellow(),
            stats.files_skipped.to_string().bright_yellow()
        );
    }
    if stats.files_failed > 0 {
        println!(
            "  {} {}",
            "Files failed:".bright_red(),
            stats.files_failed.to_string().bright_red().bold()
        );
        for failure in &stats.failures {
            println!("    {} {}", failure.source.display(), failure.reason.bright_black());
        }
    }
    println!(
        "  {} {} of {} declared",
        "Records extracted:".bright_cyan(),
        stats.extracted_records.to_string().bright_white().bold(),
        stats.declared_records
    );
    for report in stats.incomplete_files() {
        println!(
            "    {} {} missing ({} of {} chunks located)",
            report.source.display(),
            report.missing_records().to_string().bright_yellow(),
            report.chunks_located,
            report.chunks_planned
        );
    }
}
