//! Column widths and the frozen column count.
//!
//! Only the numbers live here. Applying widths and frozen state to the
//! cells of rendered rows is done by the row containers.

use serde::Serialize;

use crate::error::{EscalatorError, Result};
use crate::range::Range;

/// Marker for a column whose width is measured from its content.
pub const AUTO_WIDTH: f64 = -1.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Column {
    /// Width requested by the host, or [`AUTO_WIDTH`].
    pub defined_width: f64,
    /// Width in effect.
    pub calculated_width: f64,
    /// An auto width is waiting for rows to measure.
    pub measure_pending: bool,
}

impl Column {
    fn new(width: f64) -> Self {
        Self {
            defined_width: AUTO_WIDTH,
            calculated_width: width,
            measure_pending: false,
        }
    }

    pub fn is_auto(&self) -> bool {
        self.defined_width < 0.0
    }
}

#[derive(Debug, Clone)]
pub struct ColumnConfiguration {
    columns: Vec<Column>,
    frozen_column_count: usize,
    default_width: f64,
}

impl ColumnConfiguration {
    pub fn new(default_width: f64) -> Self {
        Self {
            columns: Vec::new(),
            frozen_column_count: 0,
            default_width,
        }
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn frozen_column_count(&self) -> usize {
        self.frozen_column_count
    }

    pub fn column(&self, index: usize) -> Option<&Column> {
        self.columns.get(index)
    }

    pub fn width(&self, index: usize) -> f64 {
        self.columns.get(index).map_or(0.0, |c| c.calculated_width)
    }

    pub fn widths(&self) -> Vec<f64> {
        self.columns.iter().map(|c| c.calculated_width).collect()
    }

    pub fn is_frozen(&self, index: usize) -> bool {
        index < self.frozen_column_count
    }

    pub fn validate_insert(&self, index: usize, count: usize) -> Result<()> {
        if index > self.columns.len() {
            return Err(EscalatorError::out_of_bounds(
                "Column",
                index,
                0,
                self.columns.len() + 1,
            ));
        }
        if count < 1 {
            return Err(EscalatorError::IllegalArgument(format!(
                "Number of columns must be 1 or greater (was {count})"
            )));
        }
        Ok(())
    }

    pub fn validate_remove(&self, index: usize, count: usize) -> Result<()> {
        if count < 1 {
            return Err(EscalatorError::IllegalArgument(format!(
                "Number of columns must be 1 or greater (was {count})"
            )));
        }
        if index + count > self.columns.len() {
            return Err(EscalatorError::out_of_bounds(
                "Column",
                index + count,
                0,
                self.columns.len() + 1,
            ));
        }
        Ok(())
    }

    /// Insert `count` default-width columns at `index`. Frozen columns after
    /// the insertion point stay frozen.
    pub fn insert(&mut self, index: usize, count: usize) -> Result<()> {
        self.validate_insert(index, count)?;
        let at = index.min(self.columns.len());
        let new_columns = std::iter::repeat(Column::new(self.default_width)).take(count);
        self.columns.splice(at..at, new_columns);
        if index < self.frozen_column_count {
            self.frozen_column_count += count;
        }
        Ok(())
    }

    /// Remove `count` columns at `index`, returning their total width.
    pub fn remove(&mut self, index: usize, count: usize) -> Result<f64> {
        self.validate_remove(index, count)?;
        let removed: f64 = self
            .columns
            .drain(index..index + count)
            .map(|c| c.calculated_width)
            .sum();
        if index < self.frozen_column_count {
            if index + count < self.frozen_column_count {
                self.frozen_column_count -= count;
            } else {
                self.frozen_column_count = index;
            }
        }
        Ok(removed)
    }

    /// Change the frozen count and return the columns whose frozen state flipped.
    pub fn set_frozen_column_count(&mut self, count: usize) -> Result<Range> {
        if count > self.columns.len() {
            return Err(EscalatorError::IllegalArgument(format!(
                "count must be between 0 and the current number of columns ({})",
                self.columns.len()
            )));
        }
        let old = self.frozen_column_count;
        self.frozen_column_count = count;
        Ok(Range::of_rows(old.min(count), old.max(count) - old.min(count)))
    }

    /// Set the host-requested width. Negative means auto. A non-negative
    /// width is floored so fractional pixels never overflow into the next column.
    pub fn set_defined_width(&mut self, index: usize, px: f64) -> Result<()> {
        let len = self.columns.len();
        let column = self.columns.get_mut(index).ok_or_else(|| {
            EscalatorError::IllegalArgument(format!(
                "Column index {index} is not a valid index (column count {len})"
            ))
        })?;
        if !px.is_finite() {
            return Err(EscalatorError::IllegalArgument(format!(
                "Column width must be finite, got {px}"
            )));
        }
        if px < 0.0 {
            column.defined_width = AUTO_WIDTH;
            column.measure_pending = true;
        } else {
            column.defined_width = px.floor();
            column.calculated_width = px.floor();
            column.measure_pending = false;
        }
        Ok(())
    }

    /// Store a measured width for an auto column.
    pub fn set_measured_width(&mut self, index: usize, px: f64) {
        if let Some(column) = self.columns.get_mut(index) {
            column.calculated_width = px.max(0.0).floor();
            column.measure_pending = false;
        }
    }

    pub fn columns_pending_measurement(&self) -> Vec<usize> {
        self.columns
            .iter()
            .enumerate()
            .filter(|(_, c)| c.measure_pending)
            .map(|(i, _)| i)
            .collect()
    }

    /// Sum of the widths of the columns in `range`.
    pub fn calculated_columns_width(&self, range: Range) -> f64 {
        let bounds = Range::of_rows(0, self.columns.len());
        range
            .restrict_to(&bounds)
            .iter()
            .map(|i| self.width(crate::px::unsigned(i)))
            .sum()
    }

    /// Distance from the left edge to column `index`.
    pub fn left_of(&self, index: usize) -> f64 {
        self.columns.iter().take(index).map(|c| c.calculated_width).sum()
    }

    pub fn total_width(&self) -> f64 {
        self.columns.iter().map(|c| c.calculated_width).sum()
    }

    pub fn frozen_width(&self) -> f64 {
        self.left_of(self.frozen_column_count)
    }
}
