//! Callbacks the engine invokes at row, cell and spacer lifecycle points.
//!
//! The engine never renders content itself. A host plugs in an
//! [`EscalatorUpdater`] per section to populate cells, a [`SpacerUpdater`]
//! for detail rows, and a [`Measurer`] that answers size questions the
//! engine cannot answer without a layout engine.

use serde::Serialize;

use crate::container::{ElementId, Section};

/// Read-only view of a rendered row handed to an [`EscalatorUpdater`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FlyweightRow {
    pub element: ElementId,
    pub section: Section,
    pub logical_index: usize,
    pub height: f64,
}

/// A cell of a [`FlyweightRow`]. The updater may change the colspan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlyweightCell {
    pub row: usize,
    pub column: usize,
    pub width: f64,
    pub frozen: bool,
    colspan: usize,
}

impl FlyweightCell {
    pub(crate) fn new(row: usize, column: usize, width: f64, frozen: bool, colspan: usize) -> Self {
        Self {
            row,
            column,
            width,
            frozen,
            colspan: colspan.max(1),
        }
    }

    pub fn colspan(&self) -> usize {
        self.colspan
    }

    /// Span this cell over `colspan` columns (minimum 1).
    pub fn set_colspan(&mut self, colspan: usize) {
        self.colspan = colspan.max(1);
    }
}

/// Populates cell content for one row container.
///
/// Hooks are invoked in the order `pre_attach`, `post_attach`, `update` when a
/// row element is created, `update` whenever a row is recycled or refreshed,
/// and `pre_detach`, `post_detach` when it is destroyed.
pub trait EscalatorUpdater {
    fn pre_attach(&mut self, _row: &FlyweightRow, _cells: &mut [FlyweightCell]) {}

    fn post_attach(&mut self, _row: &FlyweightRow, _cells: &mut [FlyweightCell]) {}

    fn update(&mut self, row: &FlyweightRow, cells: &mut [FlyweightCell]);

    fn pre_detach(&mut self, _row: &FlyweightRow, _cells: &[FlyweightCell]) {}

    fn post_detach(&mut self, _row: &FlyweightRow, _cells: &[FlyweightCell]) {}
}

/// Updater that leaves every cell empty.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullUpdater;

impl EscalatorUpdater for NullUpdater {
    fn update(&mut self, _row: &FlyweightRow, _cells: &mut [FlyweightCell]) {}
}

/// Read-only view of a spacer handed to a [`SpacerUpdater`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SpacerView {
    pub element: ElementId,
    pub row: i64,
    pub height: f64,
    pub top: f64,
}

/// Populates spacer (detail row) content.
pub trait SpacerUpdater {
    fn init(&mut self, spacer: &SpacerView);

    /// Called after the spacer's row index or height changed.
    fn update(&mut self, _spacer: &SpacerView) {}

    fn destroy(&mut self, spacer: &SpacerView);
}

/// Spacer updater that does nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSpacerUpdater;

impl SpacerUpdater for NullSpacerUpdater {
    fn init(&mut self, _spacer: &SpacerView) {}

    fn destroy(&mut self, _spacer: &SpacerView) {}
}

/// Answers layout questions that need a rendering engine.
pub trait Measurer {
    /// Height of a freshly rendered single-row probe in `section`.
    fn probe_row_height(&mut self, section: Section) -> f64;

    /// Minimal width of a cell. With `with_content` false only padding and
    /// borders count.
    fn min_cell_width(&mut self, row: &FlyweightRow, column: usize, with_content: bool) -> f64;
}

/// Measurer returning constant sizes.
#[derive(Debug, Clone, Copy)]
pub struct FixedMeasurer {
    pub row_height: f64,
    pub cell_width: f64,
}

impl Default for FixedMeasurer {
    fn default() -> Self {
        Self {
            row_height: crate::config::INITIAL_DEFAULT_ROW_HEIGHT,
            cell_width: crate::config::DEFAULT_COLUMN_WIDTH,
        }
    }
}

impl Measurer for FixedMeasurer {
    fn probe_row_height(&mut self, _section: Section) -> f64 {
        self.row_height
    }

    fn min_cell_width(&mut self, _row: &FlyweightRow, _column: usize, with_content: bool) -> f64 {
        if with_content {
            self.cell_width
        } else {
            0.0
        }
    }
}
