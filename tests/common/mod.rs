//! Common test utilities and assertion helpers.
//!
//! Builders for attached escalators with a hand-driven clock, a recording
//! cell updater, and checks for the rendered-window invariants.
#![allow(
    dead_code,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use escalator::clock::ManualClock;
use escalator::updater::{EscalatorUpdater, FixedMeasurer, FlyweightCell, FlyweightRow};
use escalator::{ElementId, Escalator, EscalatorConfig, EscalatorEvent, RowContainer, RowHeights, Section};

// ============================================================================
// Builders
// ============================================================================

pub const ROW_HEIGHT: f64 = 20.0;

/// Configuration with explicit 20px rows in every section.
pub fn config(width: f64, height: f64) -> EscalatorConfig {
    EscalatorConfig {
        width,
        height,
        default_row_height: RowHeights {
            header: Some(ROW_HEIGHT),
            body: Some(ROW_HEIGHT),
            footer: Some(ROW_HEIGHT),
        },
        ..EscalatorConfig::default()
    }
}

/// An attached escalator, `columns` wide with `rows` body rows, with no
/// scrollbar eating into the body height when `columns` fit the width.
pub fn grid_with(config: EscalatorConfig, columns: usize, rows: usize) -> (Escalator, ManualClock) {
    let clock = ManualClock::new();
    let mut grid = Escalator::with_environment(
        config,
        Box::new(FixedMeasurer::default()),
        Box::new(clock.clone()),
    )
    .unwrap();
    if columns > 0 {
        grid.insert_columns(0, columns).unwrap();
    }
    if rows > 0 {
        grid.insert_rows(Section::Body, 0, rows).unwrap();
    }
    grid.attach();
    grid.flush_deferred();
    grid.drain_events();
    (grid, clock)
}

/// 500x200 escalator with two columns: a 200px body, 12 rendered rows.
pub fn grid(rows: usize) -> (Escalator, ManualClock) {
    grid_with(config(500.0, 200.0), 2, rows)
}

// ============================================================================
// Recording updater
// ============================================================================

pub type UpdateLog = Rc<RefCell<Vec<(FlyweightRow, Vec<FlyweightCell>)>>>;

/// Records every `update` call.
#[derive(Default)]
pub struct RecordingUpdater {
    pub log: UpdateLog,
}

impl RecordingUpdater {
    pub fn new() -> (Self, UpdateLog) {
        let log = UpdateLog::default();
        (Self { log: Rc::clone(&log) }, log)
    }
}

impl EscalatorUpdater for RecordingUpdater {
    fn update(&mut self, row: &FlyweightRow, cells: &mut [FlyweightCell]) {
        self.log.borrow_mut().push((*row, cells.to_vec()));
    }
}

/// Gives the first cell of every `n`th row a colspan of 2.
pub struct SpanningUpdater {
    pub every: usize,
}

impl EscalatorUpdater for SpanningUpdater {
    fn update(&mut self, row: &FlyweightRow, cells: &mut [FlyweightCell]) {
        if row.logical_index % self.every == 0 {
            if let Some(cell) = cells.first_mut() {
                cell.set_colspan(2);
            }
        }
    }
}

// ============================================================================
// Inspection helpers
// ============================================================================

/// Logical indices of the rendered body rows in visual order.
pub fn logical_indices(grid: &Escalator) -> Vec<usize> {
    grid.body()
        .visual_row_order()
        .iter()
        .map(|e| grid.body().logical_index_of(*e).unwrap())
        .collect()
}

pub fn rendered_set(grid: &Escalator) -> HashSet<ElementId> {
    grid.body().visual_row_order().iter().copied().collect()
}

pub fn rendered_tops(grid: &Escalator) -> Vec<f64> {
    grid.body()
        .visual_row_order()
        .iter()
        .map(|e| grid.positions().top(*e))
        .collect()
}

pub fn visibility_events(events: &[EscalatorEvent]) -> usize {
    events
        .iter()
        .filter(|e| matches!(e, EscalatorEvent::RowVisibilityChanged { .. }))
        .count()
}

/// The rendered window stays inside the data and within capacity, and
/// visual order matches consecutive logical indices.
pub fn assert_window_invariants(grid: &Escalator) {
    let body = grid.body();
    let top = body.top_row_logical_index();
    let len = body.visual_row_order().len();
    assert!(
        top + len <= body.row_count(),
        "window {}..{} exceeds {} rows",
        top,
        top + len,
        body.row_count()
    );
    assert!(
        len <= body.max_visible_row_count(),
        "{len} rendered rows exceed capacity {}",
        body.max_visible_row_count()
    );
    let expected: Vec<usize> = (top..top + len).collect();
    assert_eq!(logical_indices(grid), expected);
}
