//! Serializable view of the engine state, for hosts and the CLI.

use serde::Serialize;

use super::Escalator;
use crate::container::{ElementId, RowContainer, Section};
use crate::layout::Viewport;
use crate::range::Range;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowSnapshot {
    pub element: ElementId,
    pub logical_index: usize,
    pub top: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpacerSnapshot {
    pub row: i64,
    pub height: f64,
    pub top: f64,
    pub in_viewport: bool,
    pub displayed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub viewport: Viewport,
    pub header_rows: usize,
    pub body_rows: usize,
    pub footer_rows: usize,
    pub column_widths: Vec<f64>,
    pub frozen_columns: usize,
    pub scroll_top: f64,
    pub scroll_left: f64,
    pub scroll_height: f64,
    pub scroll_width: f64,
    pub vertical_scrollbar_visible: bool,
    pub horizontal_scrollbar_visible: bool,
    pub visible_row_range: Range,
    pub max_visible_row_count: usize,
    /// Rendered body rows in visual order.
    pub rows: Vec<RowSnapshot>,
    /// Body elements in DOM order.
    pub physical_order: Vec<ElementId>,
    pub spacers: Vec<SpacerSnapshot>,
    pub work_pending: bool,
}

impl Escalator {
    pub fn snapshot(&self) -> Snapshot {
        let body = &self.body;
        let row_height = body.default_row_height();
        let top = body.top_row_logical_index();
        let rows = body
            .visual_row_order()
            .iter()
            .enumerate()
            .map(|(visual, element)| RowSnapshot {
                element: *element,
                logical_index: top + visual,
                top: self.positions.top(*element),
            })
            .collect();
        let spacers = body
            .spacers()
            .iter()
            .map(|spacer| SpacerSnapshot {
                row: spacer.row(),
                height: spacer.height(),
                top: body
                    .spacers()
                    .spacer_top(spacer.row(), row_height)
                    .unwrap_or_default(),
                in_viewport: spacer.is_in_viewport(),
                displayed: spacer.is_displayed(),
            })
            .collect();

        Snapshot {
            viewport: self.viewport,
            header_rows: self.row_count(Section::Header),
            body_rows: self.row_count(Section::Body),
            footer_rows: self.row_count(Section::Footer),
            column_widths: self.columns.widths(),
            frozen_columns: self.columns.frozen_column_count(),
            scroll_top: self.scroll_top(),
            scroll_left: self.scroll_left(),
            scroll_height: self.scroll_height(),
            scroll_width: self.scroll_width(),
            vertical_scrollbar_visible: self.vertical.shows_scroll_handle(),
            horizontal_scrollbar_visible: self.horizontal.shows_scroll_handle(),
            visible_row_range: self.visible_row_range(),
            max_visible_row_count: self.max_visible_row_count(),
            rows,
            physical_order: body.physical_order().to_vec(),
            spacers,
            work_pending: self.is_work_pending(),
        }
    }
}
