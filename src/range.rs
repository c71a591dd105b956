//! Closed-open integer intervals used for row, column and pixel range math.

use serde::Serialize;

use crate::error::{EscalatorError, Result};

/// A half-open interval `[start, end)` of integers.
///
/// Starts may be negative: the spacer attached "before row 0" lives at
/// index `-1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Range {
    start: i64,
    end: i64,
}

impl Range {
    /// `[start, end)`. An `end` before `start` collapses to an empty range at `start`.
    pub fn between(start: i64, end: i64) -> Self {
        Self {
            start,
            end: end.max(start),
        }
    }

    /// `[start, start + length)`. Negative lengths give an empty range.
    pub fn with_length(start: i64, length: i64) -> Self {
        Self::between(start, start.saturating_add(length.max(0)))
    }

    /// A range containing exactly `index`.
    pub fn with_only(index: i64) -> Self {
        Self::with_length(index, 1)
    }

    /// Unsigned convenience for `with_length`.
    pub fn of_rows(start: usize, length: usize) -> Self {
        Self::with_length(crate::px::signed(start), crate::px::signed(length))
    }

    pub fn start(&self) -> i64 {
        self.start
    }

    pub fn end(&self) -> i64 {
        self.end
    }

    pub fn length(&self) -> i64 {
        self.end - self.start
    }

    /// Length as an unsigned count.
    pub fn len(&self) -> usize {
        crate::px::unsigned(self.length())
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    pub fn contains(&self, index: i64) -> bool {
        self.start <= index && index < self.end
    }

    /// Whether the two ranges share at least one integer.
    pub fn intersects(&self, other: &Range) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn is_subset_of(&self, other: &Range) -> bool {
        self.start >= other.start && self.end <= other.end
    }

    /// Split at `index` into `[start, index)` and `[index, end)`.
    pub fn split_at(&self, index: i64) -> (Range, Range) {
        if index < self.start {
            (Range::with_length(self.start, 0), *self)
        } else if index >= self.end {
            (*self, Range::with_length(self.end, 0))
        } else {
            (
                Range::between(self.start, index),
                Range::between(index, self.end),
            )
        }
    }

    /// Partition into the parts before, inside and after `other`.
    pub fn partition_with(&self, other: &Range) -> [Range; 3] {
        let (before, rest) = self.split_at(other.start);
        let (inside, after) = rest.split_at(other.end);
        [before, inside, after]
    }

    /// Smallest range covering both. The ranges must overlap or touch.
    pub fn combine_with(&self, other: &Range) -> Result<Range> {
        let touching = self.end == other.start || other.end == self.start;
        if !self.intersects(other) && !touching && !self.is_empty() && !other.is_empty() {
            return Err(EscalatorError::IllegalArgument(format!(
                "cannot combine {self} and {other}: they neither overlap nor touch"
            )));
        }
        if self.is_empty() {
            return Ok(*other);
        }
        if other.is_empty() {
            return Ok(*self);
        }
        Ok(Range::between(
            self.start.min(other.start),
            self.end.max(other.end),
        ))
    }

    pub fn offset_by(&self, offset: i64) -> Range {
        Range::between(self.start + offset, self.end + offset)
    }

    /// The part of this range that lies within `bounds`, or an empty range.
    pub fn restrict_to(&self, bounds: &Range) -> Range {
        if self.intersects(bounds) {
            Range::between(self.start.max(bounds.start), self.end.min(bounds.end))
        } else {
            Range::with_length(self.start, 0)
        }
    }

    /// Iterate the integers in the range.
    pub fn iter(&self) -> std::ops::Range<i64> {
        self.start..self.end
    }
}

impl std::fmt::Display for Range {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}..{})", self.start, self.end)
    }
}
