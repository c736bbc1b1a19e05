//! Sample-count header parsing.
//!
//! RAW dumps open with a free-form header section that ends with a
//! `<count> # number of samples` line; the composite records follow it.

use crate::constants::SAMPLE_COUNT_PATTERN;
use crate::error::{Result, ScintError};
use regex::Regex;
use std::path::Path;
use tracing::debug;

/// Location of the sample-count header within a decoded file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleCountHeader {
    /// Record count declared by the file
    pub declared_samples: usize,
    /// Byte offset of the first character after the header line
    pub data_offset: usize,
}

/// Finds the sample-count header line
#[derive(Debug, Clone)]
pub struct HeaderParser {
    sample_count: Regex,
}

impl HeaderParser {
    pub fn new() -> Result<Self> {
        let sample_count =
            Regex::new(SAMPLE_COUNT_PATTERN).map_err(|e| ScintError::InvalidPattern {
                pattern: SAMPLE_COUNT_PATTERN.to_string(),
                reason: e.to_string(),
            })?;
        Ok(Self { sample_count })
    }

    /// Locate the first sample-count header in `content`.
    ///
    /// The data section starts one character past the end of the match,
    /// which drops the newline terminating the header line.
    pub fn locate(&self, content: &str, path: &Path) -> Result<SampleCountHeader> {
        let captures =
            self.sample_count
                .captures(content)
                .ok_or_else(|| ScintError::MalformedHeader {
                    path: path.to_path_buf(),
                })?;

        // Both are guaranteed by a successful match of the pattern
        let (Some(whole), Some(count)) = (captures.get(0), captures.name("count")) else {
            return Err(ScintError::MalformedHeader {
                path: path.to_path_buf(),
            });
        };

        let declared_samples =
            count
                .as_str()
                .parse::<usize>()
                .map_err(|_| ScintError::InvalidSampleCount {
                    path: path.to_path_buf(),
                    value: count.as_str().to_string(),
                })?;

        let end = whole.end();
        let data_offset = content[end..]
            .chars()
            .next()
            .map_or(end, |c| end + c.len_utf8());

        debug!(
            "Sample-count header in {}: {} records, data at byte {}",
            path.display(),
            declared_samples,
            data_offset
        );

        Ok(SampleCountHeader {
            declared_samples,
            data_offset,
        })
    }
}
