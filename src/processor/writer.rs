//! Output writing module for demultiplexed streams
//!
//! Each of the four stream files is written to a temporary file next to its
//! destination and only persisted once all four have been written. A failure
//! part way through drops the temporaries, which removes them, so no
//! truncated output is left behind.

use crate::encoding::encode_latin1;
use crate::error::{Result, ScintError};
use crate::models::{DateStamp, OutputStream, StreamBuffers};

use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tokio::fs;
use tracing::{debug, warn};

/// A stream file written but not yet persisted
struct PendingOutput {
    file: NamedTempFile,
    final_path: PathBuf,
}

/// Writer for the LAS1, LAS2, MWS and Met output tree
#[derive(Debug, Clone)]
pub struct StreamWriter {
    dest_dir: PathBuf,
    overwrite: bool,
}

impl StreamWriter {
    /// Create a new stream writer rooted at `dest_dir`
    pub fn new(dest_dir: PathBuf, overwrite: bool) -> Self {
        Self {
            dest_dir,
            overwrite,
        }
    }

    pub fn dest_dir(&self) -> &Path {
        &self.dest_dir
    }

    /// Create the destination root and one subdirectory per stream
    pub async fn ensure_layout(&self) -> Result<()> {
        for stream in OutputStream::ALL {
            let dir = stream.directory(&self.dest_dir);
            fs::create_dir_all(&dir).await?;
            debug!("Output directory ready: {}", dir.display());
        }
        Ok(())
    }

    /// Output paths for one source file, in [`OutputStream::ALL`] order
    pub fn output_paths(&self, stamp: &DateStamp) -> Vec<PathBuf> {
        OutputStream::ALL
            .iter()
            .map(|stream| stream.output_path(&self.dest_dir, stamp))
            .collect()
    }

    /// Outputs for `stamp` that already exist on disk
    pub fn existing_outputs(&self, stamp: &DateStamp) -> Vec<PathBuf> {
        self.output_paths(stamp)
            .into_iter()
            .filter(|path| path.exists())
            .collect()
    }

    /// Write all four streams for one source file
    ///
    /// Returns the persisted paths in [`OutputStream::ALL`] order.
    pub fn write_streams(
        &self,
        stamp: &DateStamp,
        streams: &StreamBuffers,
    ) -> Result<Vec<PathBuf>> {
        let mut pending = Vec::with_capacity(OutputStream::ALL.len());

        for stream in OutputStream::ALL {
            let final_path = stream.output_path(&self.dest_dir, stamp);
            let output = Self::write_pending(final_path, streams.get(stream))?;
            pending.push(output);
        }

        let mut written: Vec<PathBuf> = Vec::with_capacity(pending.len());
        for output in pending {
            match self.persist(output) {
                Ok(path) => written.push(path),
                Err(e) => {
                    if !written.is_empty() {
                        let persisted: Vec<_> =
                            written.iter().map(|p| p.display().to_string()).collect();
                        warn!(
                            "Output set for {} is incomplete, already persisted: {}",
                            stamp,
                            persisted.join(", ")
                        );
                    }
                    return Err(e);
                }
            }
        }

        debug!("Wrote {} stream files for {}", written.len(), stamp);
        Ok(written)
    }

    /// Write `content` to a temporary file beside `final_path`
    fn write_pending(final_path: PathBuf, content: &str) -> Result<PendingOutput> {
        let write_failed = |source: std::io::Error| ScintError::WriteFailed {
            path: final_path.clone(),
            source,
        };

        let parent = final_path.parent().unwrap_or_else(|| Path::new("."));
        let temp = NamedTempFile::new_in(parent).map_err(write_failed)?;

        let mut writer = BufWriter::new(temp);
        writer
            .write_all(&encode_latin1(content))
            .map_err(write_failed)?;
        let file = writer
            .into_inner()
            .map_err(|e| write_failed(e.into_error()))?;
        file.as_file().sync_all().map_err(write_failed)?;

        Ok(PendingOutput { file, final_path })
    }

    /// Move a pending file into place
    fn persist(&self, output: PendingOutput) -> Result<PathBuf> {
        let PendingOutput { file, final_path } = output;

        let persisted = if self.overwrite {
            file.persist(&final_path)
        } else {
            file.persist_noclobber(&final_path)
        };

        persisted.map_err(|e| ScintError::WriteFailed {
            path: final_path.clone(),
            source: e.error,
        })?;

        Ok(final_path)
    }
}
