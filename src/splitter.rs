//! Chunk planning and splitting.
//!
//! A file declaring `S` records is split into `N` chunks of `S / N` records,
//! plus one final chunk of `S % N` records when the division is not exact.
//! Each chunk is located by scanning forward from a cursor for that many
//! consecutive records; extraction then works on one bounded span at a time.

use crate::constants::RECORD_LINES;
use crate::grammar::{LineIndex, RecordGrammar};
use std::ops::Range;
use tracing::debug;

/// Record counts for each chunk of one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkPlan {
    pub chunk_size: usize,
    pub last_chunk_size: Option<usize>,
    pub chunk_count: usize,
}

impl ChunkPlan {
    /// Plan `chunk_count` chunks (at least one) for `declared_samples` records
    pub fn new(declared_samples: usize, chunk_count: usize) -> Self {
        let chunk_count = chunk_count.max(1);
        let remainder = declared_samples % chunk_count;

        Self {
            chunk_size: declared_samples / chunk_count,
            last_chunk_size: (remainder != 0).then_some(remainder),
            chunk_count,
        }
    }

    /// Total number of chunks, including the final short one
    pub fn len(&self) -> usize {
        self.chunk_count
            .saturating_add(usize::from(self.last_chunk_size.is_some()))
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Position and record count of every chunk holding at least one record
    ///
    /// Zero-size chunks are never produced, so the cost follows the record
    /// count rather than the requested chunk count.
    pub fn chunks(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (0..self.full_chunks())
            .map(|index| (index, self.chunk_size))
            .chain(self.last_chunk_size.map(|size| (self.chunk_count, size)))
    }

    /// Record count of every non-empty chunk, in order
    pub fn sizes(&self) -> Vec<usize> {
        self.chunks().map(|(_, size)| size).collect()
    }

    /// Chunks that hold at least one record
    pub fn non_empty_chunks(&self) -> usize {
        self.full_chunks() + usize::from(self.last_chunk_size.is_some())
    }

    /// Chunks of `chunk_size` records, none when that size is zero
    fn full_chunks(&self) -> usize {
        if self.chunk_size == 0 {
            0
        } else {
            self.chunk_count
        }
    }
}

/// Line position of the next unscanned part of a buffer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LineCursor {
    line: usize,
}

impl LineCursor {
    pub fn line(&self) -> usize {
        self.line
    }

    pub fn advance_to(&mut self, line: usize) {
        self.line = self.line.max(line);
    }

    /// The part of the indexed text not yet consumed
    pub fn remaining<'a>(&self, index: &LineIndex<'a>) -> &'a str {
        if self.line >= index.len() {
            return "";
        }
        &index.text()[index.span(self.line).start..]
    }
}

/// A located chunk of consecutive records
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkSpan {
    /// Position of the chunk within the plan
    pub index: usize,
    /// Records the chunk was planned (and found) to hold
    pub records: usize,
    pub start: usize,
    pub end: usize,
}

impl ChunkSpan {
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    pub fn text<'a>(&self, buffer: &'a str) -> &'a str {
        &buffer[self.range()]
    }
}

/// Locates planned chunks in a data buffer
#[derive(Debug, Clone)]
pub struct ChunkSplitter<'g> {
    grammar: &'g RecordGrammar,
}

impl<'g> ChunkSplitter<'g> {
    pub fn new(grammar: &'g RecordGrammar) -> Self {
        Self { grammar }
    }

    /// Locate every chunk of `plan` in `buffer`, in order.
    ///
    /// Each search starts at the cursor and may skip lines that do not
    /// start a run of records; a chunk that cannot be found is left out
    /// and the cursor stays put.
    pub fn split(&self, buffer: &str, plan: &ChunkPlan) -> Vec<ChunkSpan> {
        let index = LineIndex::new(buffer);
        let runs = self.record_runs(&index);
        let mut cursor = LineCursor::default();
        let mut spans = Vec::with_capacity(plan.non_empty_chunks());

        for (chunk, records) in plan.chunks() {
            let found = (cursor.line()..index.len()).find(|&line| runs[line] >= records);
            let Some(first) = found else {
                debug!(
                    "Chunk {} of {} records not found after line {}",
                    chunk + 1,
                    records,
                    cursor.line()
                );
                continue;
            };

            let last = first + records * RECORD_LINES - 1;
            let span = ChunkSpan {
                index: chunk,
                records,
                start: index.span(first).start,
                end: index.span(last).next_start(),
            };

            if first > cursor.line() {
                debug!(
                    "Skipped {} lines before chunk {}",
                    first - cursor.line(),
                    chunk + 1
                );
            }

            cursor.advance_to(last + 1);
            spans.push(span);
        }

        debug!(
            "Located {} of {} planned chunks, {} bytes left",
            spans.len(),
            plan.non_empty_chunks(),
            cursor.remaining(&index).len()
        );

        spans
    }

    /// For each line, how many chunk-shaped records follow back to back
    fn record_runs(&self, index: &LineIndex<'_>) -> Vec<usize> {
        let mut runs = vec![0; index.len()];

        for line in (0..index.len()).rev() {
            if self.grammar.is_chunk_record(index, line) {
                let following = runs.get(line + RECORD_LINES).copied().unwrap_or(0);
                runs[line] = 1 + following;
            }
        }

        runs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{synthetic_record, synthetic_records};

    #[test]
    fn test_even_plan() {
        let plan = ChunkPlan::new(1000, 20);
        assert_eq!(plan.len(), 20);
        assert_eq!(plan.sizes(), vec![50; 20]);
        assert_eq!(plan.last_chunk_size, None);
    }

    #[test]
    fn test_uneven_plan_adds_short_chunk() {
        let plan = ChunkPlan::new(1005, 20);
        assert_eq!(plan.len(), 21);

        let sizes = plan.sizes();
        assert_eq!(&sizes[..20], &[50; 20]);
        assert_eq!(sizes[20], 5);
        assert_eq!(sizes.iter().sum::<usize>(), 1005);
    }

    #[test]
    fn test_plan_smaller_than_chunk_count() {
        let plan = ChunkPlan::new(3, 20);
        assert_eq!(plan.chunk_size, 0);
        assert_eq!(plan.last_chunk_size, Some(3));
        assert_eq!(plan.non_empty_chunks(), 1);

        assert_eq!(plan.sizes(), vec![3]);
        assert_eq!(plan.chunks().next(), Some((20, 3)));

        let empty = ChunkPlan::new(0, 20);
        assert_eq!(empty.non_empty_chunks(), 0);
        assert_eq!(empty.len(), 20);
        assert_eq!(empty.chunks().count(), 0);
    }

    #[test]
    fn test_huge_chunk_count_plans_only_real_chunks() {
        let chunk_count = usize::MAX / 4;
        let plan = ChunkPlan::new(5, chunk_count);

        assert_eq!(plan.non_empty_chunks(), 1);
        assert_eq!(plan.sizes(), vec![5]);

        let grammar = RecordGrammar::new().unwrap();
        let buffer = synthetic_records(5);
        let spans = ChunkSplitter::new(&grammar).split(&buffer, &plan);
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].records, 5);
        assert_eq!(spans[0].index, chunk_count);

        assert!(ChunkSplitter::new(&grammar).split("", &plan).is_empty());
    }

    #[test]
    fn test_zero_chunk_count_is_one_chunk() {
        let plan = ChunkPlan::new(7, 0);
        assert_eq!(plan.sizes(), vec![7]);
    }

    #[test]
    fn test_split_covers_all_records() {
        let grammar = RecordGrammar::new().unwrap();
        let buffer = synthetic_records(7);

        let spans = ChunkSplitter::new(&grammar).split(&buffer, &ChunkPlan::new(7, 3));
        assert_eq!(spans.len(), 4);
        assert_eq!(
            spans.iter().map(|s| s.records).collect::<Vec<_>>(),
            vec![2, 2, 2, 1]
        );

        // Spans are contiguous and cover the whole buffer
        assert_eq!(spans[0].start, 0);
        for pair in spans.windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
        }
        assert_eq!(spans[3].end, buffer.len());

        for span in &spans {
            assert_eq!(span.text(&buffer).lines().count(), span.records * RECORD_LINES);
        }
    }

    #[test]
    fn test_split_skips_leading_noise() {
        let grammar = RecordGrammar::new().unwrap();
        let buffer = format!("stray header text\n\n{}", synthetic_records(2));

        let spans = ChunkSplitter::new(&grammar).split(&buffer, &ChunkPlan::new(2, 1));
        assert_eq!(spans.len(), 1);
        assert!(spans[0].text(&buffer).starts_with("# Year"));
    }

    #[test]
    fn test_missing_chunk_is_skipped() {
        let grammar = RecordGrammar::new().unwrap();
        // Header declares 4 records but only 3 are present
        let buffer = synthetic_records(3);

        let spans = ChunkSplitter::new(&grammar).split(&buffer, &ChunkPlan::new(4, 2));
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].index, 0);
        assert_eq!(spans[0].records, 2);
    }

    #[test]
    fn test_unterminated_final_record_is_not_a_chunk() {
        let grammar = RecordGrammar::new().unwrap();
        let buffer = synthetic_record("2016-06-01 00:00:00", 0);
        let trimmed = buffer.trim_end_matches('\n');

        let spans = ChunkSplitter::new(&grammar).split(trimmed, &ChunkPlan::new(1, 1));
        assert!(spans.is_empty());
    }

    #[test]
    fn test_cursor_remaining() {
        let text = "a\nb\nc\n";
        let index = LineIndex::new(text);
        let mut cursor = LineCursor::default();
        assert_eq!(cursor.remaining(&index), text);

        cursor.advance_to(2);
        assert_eq!(cursor.remaining(&index), "c\n");

        cursor.advance_to(1);
        assert_eq!(cursor.line(), 2);

        cursor.advance_to(3);
        assert_eq!(cursor.remaining(&index), "");
    }
}
