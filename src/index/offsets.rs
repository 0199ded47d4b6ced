//! Offset table construction

use crate::error::{ArrayFileError, Result};
use crate::index::terminator::LineTerminator;
use std::ops::Range;

/// Ordered byte offsets delimiting logical lines
///
/// - `offsets[0]` is where the first logical line starts (0 unless leading
///   lines were skipped)
/// - `offsets[i + 1]` is the byte after line `i`'s terminator, or the end of
///   the region for a final line without one
/// - `offsets.len() - 1` is the number of logical lines
///
/// An empty region has the table `[0]` and no lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OffsetTable {
    offsets: Vec<u64>,
}

impl OffsetTable {
    /// Scan `data` for every `terminator` occurrence
    ///
    /// The final segment is always represented: when `data` does not end with
    /// a terminator, the end of the region closes the last line.
    pub fn build(data: &[u8], terminator: &LineTerminator) -> Self {
        let mut offsets = Vec::with_capacity(1 + data.len() / 64);
        offsets.push(0);
        offsets.extend(terminator.scan(data));

        let end = data.len() as u64;
        if offsets.last().copied() != Some(end) {
            offsets.push(end);
        }

        Self { offsets }
    }

    /// Rehydrate a table from stored offsets
    ///
    /// # Errors
    /// * `InvalidArgument` if `offsets` is empty or decreasing
    pub fn from_offsets(offsets: Vec<u64>) -> Result<Self> {
        if offsets.is_empty() {
            return Err(ArrayFileError::invalid_argument(
                "offset table needs at least one entry",
            ));
        }
        if offsets.windows(2).any(|pair| pair[0] > pair[1]) {
            return Err(ArrayFileError::invalid_argument(
                "offset table must be non-decreasing",
            ));
        }
        Ok(Self { offsets })
    }

    /// Drop the first `count` lines, e.g. a header row
    pub fn skip_leading(mut self, count: usize) -> Self {
        let count = count.min(self.len());
        self.offsets.drain(..count);
        self
    }

    /// Number of logical lines
    pub fn len(&self) -> usize {
        self.offsets.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Byte range of line `line`, terminator included
    pub fn line_range(&self, line: usize) -> Option<Range<usize>> {
        let start = *self.offsets.get(line)?;
        let end = *self.offsets.get(line + 1)?;
        Some(start as usize..end as usize)
    }

    /// Byte position where line `line` starts; `line == len()` gives the end
    pub fn boundary(&self, line: usize) -> Option<u64> {
        self.offsets.get(line).copied()
    }

    /// Byte position just past the last line
    pub fn end(&self) -> u64 {
        self.offsets[self.offsets.len() - 1]
    }

    pub fn offsets(&self) -> &[u64] {
        &self.offsets
    }

    pub fn into_offsets(self) -> Vec<u64> {
        self.offsets
    }
}
