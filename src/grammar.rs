//! Composite record grammar.
//!
//! A composite record is 65 lines:
//!
//! ```text
//! # Year ...                              met header
//! 2016-06-01 00:00:00  21.3 ...           met data
//! # 1000 ... Aperture 1 ...               LAS aperture 1 marker
//! <20 data lines>
//! # 1000 ... Aperture 2 ...               LAS aperture 2 marker
//! <20 data lines>
//! # 1000 MWS ...                          MWS marker
//! <20 data lines>
//! ```
//!
//! Records are recognised with a line cursor over a [`LineIndex`]. Marker
//! lines are checked with anchored single-line patterns, and the 20-line
//! sub-block length is a loop bound, so recognition never backtracks.

use crate::constants::{
    LAS1_MARKER_PATTERN, LAS2_MARKER_PATTERN, MET_HEADER_PATTERN, MWS_MARKER_PATTERN,
    RECORD_BODY_LINES, RECORD_LINES, SUB_BLOCK_LINES,
};
use crate::error::{Result, ScintError};
use regex::Regex;

/// Byte span of one line, excluding its `\n`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineSpan {
    pub start: usize,
    pub end: usize,
    /// Whether the line is followed by `\n`
    pub terminated: bool,
}

impl LineSpan {
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Offset just past the line and its terminator
    pub fn next_start(&self) -> usize {
        if self.terminated { self.end + 1 } else { self.end }
    }
}

/// Line-indexed view of a text buffer
#[derive(Debug, Clone)]
pub struct LineIndex<'a> {
    text: &'a str,
    lines: Vec<LineSpan>,
}

impl<'a> LineIndex<'a> {
    /// Index every line of `text`. A trailing `\n` does not start a new line.
    pub fn new(text: &'a str) -> Self {
        let mut lines = Vec::new();
        let mut start = 0;

        while start < text.len() {
            match text[start..].find('\n') {
                Some(pos) => {
                    lines.push(LineSpan {
                        start,
                        end: start + pos,
                        terminated: true,
                    });
                    start += pos + 1;
                }
                None => {
                    lines.push(LineSpan {
                        start,
                        end: text.len(),
                        terminated: false,
                    });
                    start = text.len();
                }
            }
        }

        Self { text, lines }
    }

    pub fn text(&self) -> &'a str {
        self.text
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn span(&self, line: usize) -> LineSpan {
        self.lines[line]
    }

    pub fn line(&self, line: usize) -> &'a str {
        let span = self.lines[line];
        &self.text[span.start..span.end]
    }

    /// Text covering lines `first..=last`, inner newlines included
    pub fn block(&self, first: usize, last: usize) -> &'a str {
        &self.text[self.lines[first].start..self.lines[last].end]
    }
}

/// One recognised composite record, borrowed from the buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordMatch<'a> {
    pub met_data: &'a str,
    pub las1: &'a str,
    pub las2: &'a str,
    pub mws: &'a str,
    /// Line index where the following record would start
    pub next_line: usize,
}

/// Line predicates describing a composite record
#[derive(Debug, Clone)]
pub struct RecordGrammar {
    met_header: Regex,
    las1_marker: Regex,
    las2_marker: Regex,
    mws_marker: Regex,
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| ScintError::InvalidPattern {
        pattern: pattern.to_string(),
        reason: e.to_string(),
    })
}

impl RecordGrammar {
    pub fn new() -> Result<Self> {
        Ok(Self {
            met_header: compile(MET_HEADER_PATTERN)?,
            las1_marker: compile(LAS1_MARKER_PATTERN)?,
            las2_marker: compile(LAS2_MARKER_PATTERN)?,
            mws_marker: compile(MWS_MARKER_PATTERN)?,
        })
    }

    pub fn is_met_header(&self, line: &str) -> bool {
        self.met_header.is_match(line)
    }

    /// Match one full record starting exactly at line `at`.
    ///
    /// Every line but the last MWS data line must be newline-terminated, and
    /// every data line must be non-empty. Returns `None` for anything else,
    /// including a record cut short by the end of the buffer.
    pub fn match_record<'a>(&self, index: &LineIndex<'a>, at: usize) -> Option<RecordMatch<'a>> {
        if at + RECORD_LINES > index.len() {
            return None;
        }
        let last = at + RECORD_LINES - 1;

        let line_ok = |line: usize| {
            let span = index.span(line);
            !span.is_empty() && (span.terminated || line == last)
        };

        if !self.is_met_header(index.line(at)) || !line_ok(at) || !line_ok(at + 1) {
            return None;
        }

        let las1 = self.match_sub_block(index, at + 2, &self.las1_marker, &line_ok)?;
        let las2 = self.match_sub_block(
            index,
            at + 3 + SUB_BLOCK_LINES,
            &self.las2_marker,
            &line_ok,
        )?;
        let mws = self.match_sub_block(
            index,
            at + 4 + 2 * SUB_BLOCK_LINES,
            &self.mws_marker,
            &line_ok,
        )?;

        Some(RecordMatch {
            met_data: index.line(at + 1),
            las1,
            las2,
            mws,
            next_line: at + RECORD_LINES,
        })
    }

    /// Marker line at `marker` followed by exactly 20 data lines
    fn match_sub_block<'a>(
        &self,
        index: &LineIndex<'a>,
        marker: usize,
        pattern: &Regex,
        line_ok: &impl Fn(usize) -> bool,
    ) -> Option<&'a str> {
        if !pattern.is_match(index.line(marker)) || !line_ok(marker) {
            return None;
        }

        let first = marker + 1;
        let last = marker + SUB_BLOCK_LINES;
        for line in first..=last {
            if !line_ok(line) {
                return None;
            }
        }

        Some(index.block(first, last))
    }

    /// Whether line `at` starts a record of the looser shape used to plan
    /// chunks: a met header plus 64 non-empty lines, all newline-terminated.
    ///
    /// Marker lines are not inspected; the extractor does that per record.
    pub fn is_chunk_record(&self, index: &LineIndex<'_>, at: usize) -> bool {
        if at + RECORD_LINES > index.len() || !self.is_met_header(index.line(at)) {
            return false;
        }

        (at..=at + RECORD_BODY_LINES).all(|line| {
            let span = index.span(line);
            !span.is_empty() && span.terminated
        })
    }
}
