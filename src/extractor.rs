//! Block extraction: composite records to four tagged line streams.
//!
//! Each record contributes one line to every stream. The met line is
//! compacted by removing all whitespace; its first 18 characters become the
//! timestamp that prefixes the three instrument lines, whose whitespace runs
//! are collapsed into commas.

use crate::constants::{FIELD_SEPARATOR, TIMESTAMP_WIDTH};
use crate::error::{Result, ScintError};
use crate::grammar::{LineIndex, RecordGrammar, RecordMatch};
use crate::models::StreamBuffers;
use regex::Regex;
use std::borrow::Cow;
use tracing::debug;

/// Result of extracting one buffer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    pub streams: StreamBuffers,
    pub records: usize,
}

/// Extracts composite records from chunk buffers
#[derive(Debug, Clone)]
pub struct BlockExtractor {
    grammar: RecordGrammar,
    whitespace: Regex,
}

impl BlockExtractor {
    pub fn new(grammar: RecordGrammar) -> Result<Self> {
        let whitespace = Regex::new(r"\s+").map_err(|e| ScintError::InvalidPattern {
            pattern: r"\s+".to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            grammar,
            whitespace,
        })
    }

    pub fn grammar(&self) -> &RecordGrammar {
        &self.grammar
    }

    /// Extract consecutive records from the start of `buffer`.
    ///
    /// Stops at the first position that does not hold a complete record;
    /// whatever follows is dropped. This never fails.
    pub fn extract(&self, buffer: &str) -> Extraction {
        let index = LineIndex::new(buffer);
        let mut extraction = Extraction::default();
        let mut line = 0;

        while let Some(record) = self.grammar.match_record(&index, line) {
            self.push_record(&record, &mut extraction.streams);
            extraction.records += 1;
            line = record.next_line;
        }

        debug!(
            "Finished with {} records ({} of {} lines consumed)",
            extraction.records,
            line,
            index.len()
        );

        extraction
    }

    fn push_record(&self, record: &RecordMatch<'_>, streams: &mut StreamBuffers) {
        let met = compact_met_line(record.met_data);
        let timestamp = timestamp_prefix(&met);

        for (block, out) in [
            (record.las1, &mut streams.las1),
            (record.las2, &mut streams.las2),
            (record.mws, &mut streams.mws),
        ] {
            out.push_str(timestamp);
            out.push_str(&self.collapse_whitespace(block));
            out.push('\n');
        }

        streams.met.push_str(&met);
        streams.met.push('\n');
    }

    /// Replace every whitespace run, line breaks included, with one comma
    pub fn collapse_whitespace<'a>(&self, block: &'a str) -> Cow<'a, str> {
        self.whitespace.replace_all(block, FIELD_SEPARATOR)
    }
}

/// Remove all whitespace from a met data line
pub fn compact_met_line(line: &str) -> String {
    line.chars().filter(|c| !c.is_whitespace()).collect()
}

/// First 18 characters of a compacted met line (all of it when shorter)
pub fn timestamp_prefix(met: &str) -> &str {
    match met.char_indices().nth(TIMESTAMP_WIDTH) {
        Some((offset, _)) => &met[..offset],
        None => met,
    }
}
