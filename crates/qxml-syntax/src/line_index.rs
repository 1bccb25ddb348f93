//! Line lookups for byte offsets.

use std::ops::Range;

use serde::Serialize;

/// A position as (row, column), both zero-based; the column counts bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Location {
    pub offset: usize,
    pub row: usize,
    pub column: usize,
}

/// Index of line breaks in a text.
///
/// Stores the offsets of every `\n` so byte offsets convert to (row, column)
/// in O(log n), and each line's byte range can be handed to a per-line
/// consumer such as the highlighter. A `\r` before the `\n` is part of the
/// line break, not of the line's content range.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LineIndex {
    line_breaks: Vec<usize>,
    /// Content end of each terminated line.
    line_ends: Vec<usize>,
    total_length: usize,
}

impl LineIndex {
    pub fn new(content: &str) -> Self {
        let line_breaks: Vec<usize> = content.match_indices('\n').map(|(idx, _)| idx).collect();
        let line_ends = line_breaks
            .iter()
            .map(|&idx| {
                if content[..idx].ends_with('\r') {
                    idx - 1
                } else {
                    idx
                }
            })
            .collect();
        LineIndex {
            line_breaks,
            line_ends,
            total_length: content.len(),
        }
    }

    /// Convert a byte offset to a location, or `None` past the end.
    ///
    /// A `\n` belongs to the line it terminates.
    pub fn location(&self, offset: usize) -> Option<Location> {
        if offset > self.total_length {
            return None;
        }
        let row = match self.line_breaks.binary_search(&offset) {
            Ok(idx) | Err(idx) => idx,
        };
        let column = offset - self.line_start(row);
        Some(Location {
            offset,
            row,
            column,
        })
    }

    /// Convert a (row, column) pair back to a byte offset.
    pub fn offset(&self, row: usize, column: usize) -> Option<usize> {
        let range = self.line_range(row)?;
        let offset = range.start + column;
        (offset <= range.end).then_some(offset)
    }

    /// Byte range of a line, without its terminating `\n` or `\r\n`.
    pub fn line_range(&self, row: usize) -> Option<Range<usize>> {
        if row >= self.line_count() {
            return None;
        }
        let start = self.line_start(row);
        let end = self
            .line_ends
            .get(row)
            .copied()
            .unwrap_or(self.total_length);
        Some(start..end)
    }

    pub fn line_count(&self) -> usize {
        self.line_breaks.len() + 1
    }

    pub fn total_length(&self) -> usize {
        self.total_length
    }

    fn line_start(&self, row: usize) -> usize {
        if row == 0 {
            0
        } else {
            self.line_breaks[row - 1] + 1
        }
    }
}
