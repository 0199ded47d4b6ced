//! Python-style slices over a known length

use crate::error::{ArrayFileError, Result};
use std::ops::{Range, RangeFrom, RangeFull, RangeInclusive, RangeTo};

/// A `start:stop:step` slice; `None` bounds take the step-dependent default
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slice {
    pub start: Option<isize>,
    pub stop: Option<isize>,
    pub step: isize,
}

impl Slice {
    pub fn new(start: Option<isize>, stop: Option<isize>, step: isize) -> Self {
        Self { start, stop, step }
    }

    /// `::`
    pub fn full() -> Self {
        Self::new(None, None, 1)
    }

    pub fn with_step(mut self, step: isize) -> Self {
        self.step = step;
        self
    }

    /// Resolve against `len`, clamping out-of-range bounds
    ///
    /// # Errors
    /// * `InvalidArgument` if the step is zero
    pub fn indices(&self, len: usize) -> Result<SliceIndices> {
        let step = self.step;
        if step == 0 {
            return Err(ArrayFileError::invalid_argument("slice step cannot be zero"));
        }

        let len = len as isize;
        let (lower, upper) = if step > 0 { (0, len) } else { (-1, len - 1) };

        let clamp = |bound: isize| {
            if bound < 0 {
                (bound + len).max(lower)
            } else {
                bound.min(upper)
            }
        };

        let start = match self.start {
            Some(bound) => clamp(bound),
            None if step < 0 => upper,
            None => lower,
        };
        let stop = match self.stop {
            Some(bound) => clamp(bound),
            None if step < 0 => lower,
            None => upper,
        };

        // Bounds lie in -1..=len, so the spans cannot overflow
        let stride = step.unsigned_abs();
        let count = if step > 0 && start < stop {
            (stop - start - 1) as usize / stride + 1
        } else if step < 0 && stop < start {
            (start - stop - 1) as usize / stride + 1
        } else {
            0
        };

        Ok(SliceIndices {
            start,
            step,
            count,
            taken: 0,
        })
    }
}

impl Default for Slice {
    fn default() -> Self {
        Self::full()
    }
}

impl From<Range<isize>> for Slice {
    fn from(range: Range<isize>) -> Self {
        Self::new(Some(range.start), Some(range.end), 1)
    }
}

impl From<RangeFrom<isize>> for Slice {
    fn from(range: RangeFrom<isize>) -> Self {
        Self::new(Some(range.start), None, 1)
    }
}

impl From<RangeTo<isize>> for Slice {
    fn from(range: RangeTo<isize>) -> Self {
        Self::new(None, Some(range.end), 1)
    }
}

impl From<RangeInclusive<isize>> for Slice {
    fn from(range: RangeInclusive<isize>) -> Self {
        let (start, end) = range.into_inner();
        // `..=-1` and `..=isize::MAX` both mean through the last element
        let stop = if end == -1 { None } else { end.checked_add(1) };
        Self::new(Some(start), stop, 1)
    }
}

impl From<RangeFull> for Slice {
    fn from(_: RangeFull) -> Self {
        Self::full()
    }
}

/// Concrete positions selected by a [`Slice`], in slice order
#[derive(Debug, Clone)]
pub struct SliceIndices {
    start: isize,
    step: isize,
    count: usize,
    taken: usize,
}

impl Iterator for SliceIndices {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.taken == self.count {
            return None;
        }
        let position = self.start + self.taken as isize * self.step;
        self.taken += 1;
        Some(position as usize)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.count - self.taken;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for SliceIndices {}
