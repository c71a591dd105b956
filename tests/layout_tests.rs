//! Columns, colspans, frozen columns and height modes.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

mod common;

use common::*;
use escalator::clock::ManualClock;
use escalator::updater::{FlyweightRow, Measurer};
use escalator::{
    Direction, Escalator, EscalatorConfig, EscalatorError, EscalatorEvent, HeightMode,
    RowContainer, Section,
};

/// Header cells want 90px, body cells 60px, with no content 12px.
struct SectionMeasurer;

impl Measurer for SectionMeasurer {
    fn probe_row_height(&mut self, _section: Section) -> f64 {
        ROW_HEIGHT
    }

    fn min_cell_width(&mut self, row: &FlyweightRow, _column: usize, with_content: bool) -> f64 {
        match (with_content, row.section) {
            (false, _) => 12.0,
            (true, Section::Header) => 90.0,
            (true, _) => 60.0,
        }
    }
}

fn measured_grid() -> Escalator {
    let mut grid = Escalator::with_environment(
        config(500.0, 200.0),
        Box::new(SectionMeasurer),
        Box::new(ManualClock::new()),
    )
    .unwrap();
    grid.insert_columns(0, 3).unwrap();
    grid.insert_rows(Section::Header, 0, 1).unwrap();
    grid.insert_rows(Section::Body, 0, 50).unwrap();
    grid.attach();
    grid.flush_deferred();
    grid
}

fn cell_widths(grid: &Escalator, logical: usize) -> Vec<f64> {
    let row = grid.body().row_element_for(logical).unwrap();
    grid.body()
        .row_element(row)
        .unwrap()
        .cells
        .iter()
        .map(|c| c.width)
        .collect()
}

// ===== COLUMN WIDTHS =====

#[test]
fn test_auto_width_takes_widest_section() {
    let mut grid = measured_grid();
    grid.set_column_width(1, -1.0).unwrap();
    assert_eq!(grid.column_width(1).unwrap(), 90.0);
    assert_eq!(grid.column_width(0).unwrap(), 100.0);
    assert_eq!(cell_widths(&grid, 0), vec![100.0, 90.0, 100.0]);
    assert_eq!(grid.min_cell_width(1), 12.0);
}

#[test]
fn test_auto_width_before_attach_is_measured_on_flush() {
    let mut grid = Escalator::with_environment(
        config(500.0, 200.0),
        Box::new(SectionMeasurer),
        Box::new(ManualClock::new()),
    )
    .unwrap();
    grid.insert_columns(0, 2).unwrap();
    grid.insert_rows(Section::Body, 0, 10).unwrap();
    grid.set_column_width(0, -1.0).unwrap();
    assert!(!grid.is_work_pending());
    assert_eq!(grid.column_width(0).unwrap(), 100.0);

    grid.attach();
    assert!(grid.is_work_pending());
    grid.flush_deferred();
    assert_eq!(grid.column_width(0).unwrap(), 60.0);
    assert!(grid.columns().columns_pending_measurement().is_empty());
}

#[test]
fn test_set_column_widths_applies_together() {
    let (mut grid, _) = grid_with(config(500.0, 200.0), 3, 50);
    grid.set_column_widths(&[(0, 50.5), (2, 250.0)]).unwrap();
    assert_eq!(cell_widths(&grid, 3), vec![50.0, 100.0, 250.0]);
    assert_eq!(grid.columns().total_width(), 400.0);

    assert!(matches!(
        grid.set_column_widths(&[(1, 10.0), (3, 10.0)]),
        Err(EscalatorError::IndexOutOfBounds { .. })
    ));
    assert_eq!(grid.column_width(1).unwrap(), 100.0);
    assert!(grid.set_column_widths(&[(1, f64::NAN)]).is_err());
}

#[test]
fn test_wide_columns_show_horizontal_scrollbar() {
    let (mut grid, _) = grid(1000);
    assert!(!grid.horizontal_scrollbar().shows_scroll_handle());
    grid.insert_columns(2, 4).unwrap();
    assert!(grid.horizontal_scrollbar().shows_scroll_handle());
    assert_eq!(grid.scroll_width(), 600.0);
    // the horizontal scrollbar takes 15px from the body area
    assert_eq!(grid.vertical_scrollbar().offset_size(), 185.0);
    assert!(grid
        .drain_events()
        .contains(&EscalatorEvent::ScrollbarVisibilityChanged {
            direction: Direction::Horizontal,
            visible: true
        }));
}

#[test]
fn test_remove_columns_shrinks_rows() {
    let (mut grid, _) = grid_with(config(500.0, 200.0), 4, 20);
    grid.remove_columns(1, 2).unwrap();
    assert_eq!(grid.column_count(), 2);
    assert_eq!(cell_widths(&grid, 0).len(), 2);
    assert!(grid.remove_columns(1, 2).is_err());
}

// ===== COLSPANS =====

#[test]
fn test_colspan_covers_next_cell() {
    let (mut grid, _) = grid_with(config(500.0, 200.0), 3, 50);
    grid.set_updater(Section::Body, Box::new(SpanningUpdater { every: 2 }));
    assert!(grid.body().rows().uses_colspans());
    assert_eq!(cell_widths(&grid, 0), vec![200.0, 0.0, 100.0]);
    assert_eq!(cell_widths(&grid, 1), vec![100.0, 100.0, 100.0]);

    grid.set_column_width(1, 40.0).unwrap();
    assert_eq!(cell_widths(&grid, 2), vec![140.0, 0.0, 100.0]);
}

#[test]
fn test_recycled_row_drops_old_colspan() {
    let (mut grid, _) = grid_with(config(500.0, 200.0), 3, 50);
    grid.set_updater(Section::Body, Box::new(SpanningUpdater { every: 5 }));
    let row0 = grid.body().row_element_for(0).unwrap();
    assert_eq!(cell_widths(&grid, 0), vec![200.0, 0.0, 100.0]);
    // one row down: row 0's element now shows row 12
    grid.set_scroll_top(20.0);
    assert_eq!(grid.body().logical_index_of(row0), Some(12));
    let cells = &grid.body().row_element(row0).unwrap().cells;
    assert!(cells.iter().all(|c| c.colspan == 1 && !c.hidden));
    assert_eq!(cell_widths(&grid, 12), vec![100.0, 100.0, 100.0]);
    assert_eq!(cell_widths(&grid, 5), vec![200.0, 0.0, 100.0]);
}

// ===== FROZEN COLUMNS =====

#[test]
fn test_frozen_columns_follow_horizontal_scroll() {
    let (mut grid, _) = grid_with(config(300.0, 200.0), 6, 100);
    grid.insert_rows(Section::Header, 0, 1).unwrap();
    grid.insert_rows(Section::Footer, 0, 1).unwrap();
    grid.set_frozen_column_count(2).unwrap();
    grid.set_scroll_left(120.0);

    let header_row = grid.header().row_at(0).unwrap();
    let header_cells = &grid.header().row_element(header_row).unwrap().cells;
    assert!(header_cells[1].frozen && header_cells[1].last_frozen);
    assert_eq!(header_cells[0].offset_left, 120.0);
    assert_eq!(header_cells[2].offset_left, 0.0);
    assert_eq!(grid.positions().left(grid.footer().root()), -120.0);
    assert_eq!(grid.horizontal_scrollbar().position(), 200.0);

    grid.set_frozen_column_count(1).unwrap();
    let body_row = grid.body().row_element_for(0).unwrap();
    let body_cells = &grid.body().row_element(body_row).unwrap().cells;
    assert!(body_cells[0].last_frozen);
    assert!(!body_cells[1].frozen);
    assert_eq!(body_cells[1].offset_left, 0.0);

    assert!(grid.set_frozen_column_count(7).is_err());
}

#[test]
fn test_frozen_width_is_outside_horizontal_scroll() {
    let (mut grid, _) = grid_with(config(300.0, 200.0), 6, 5);
    grid.set_frozen_column_count(1).unwrap();
    // 600px of columns, 100 frozen, in a 300px table
    assert_eq!(grid.horizontal_scrollbar().scroll_size(), 500.0);
    assert_eq!(grid.horizontal_scrollbar().offset_size(), 200.0);
    grid.set_scroll_left(10_000.0);
    assert_eq!(grid.scroll_left(), 300.0);
}

// ===== HEIGHT MODES =====

#[test]
fn test_row_mode_counts_horizontal_scrollbar() {
    let (mut grid, _) = grid_with(config(300.0, 400.0), 5, 100);
    grid.insert_rows(Section::Header, 0, 1).unwrap();
    grid.set_height_by_rows(5.0).unwrap();
    assert_eq!(grid.viewport().height, 400.0);

    grid.set_height_mode(HeightMode::Row);
    assert_eq!(grid.height_mode(), HeightMode::Row);
    assert!(grid.horizontal_scrollbar().shows_scroll_handle());
    assert_eq!(grid.viewport().height, 135.0);
    assert_eq!(grid.vertical_scrollbar().offset_size(), 100.0);
    assert_eq!(grid.max_visible_row_count(), 7);
}

#[test]
fn test_css_height_is_remembered_in_other_modes() {
    let (mut grid, _) = grid(1000);
    grid.set_height_mode(HeightMode::Row);
    grid.set_size(500.0, 300.0).unwrap();
    assert_eq!(grid.viewport().height, 200.0);
    grid.set_height_mode(HeightMode::Css);
    assert_eq!(grid.viewport().height, 300.0);
    assert_eq!(grid.max_visible_row_count(), 17);
    assert_window_invariants(&grid);
}

#[test]
fn test_undefined_mode_grows_with_rows() {
    let (mut grid, _) = grid(3);
    grid.insert_rows(Section::Header, 0, 1).unwrap();
    grid.set_height_mode(HeightMode::Undefined);
    assert_eq!(grid.viewport().height, 80.0);
    grid.insert_rows(Section::Body, 3, 2).unwrap();
    assert_eq!(grid.viewport().height, 120.0);
    assert_eq!(grid.body().visual_row_order().len(), 5);
    assert!(!grid.vertical_scrollbar().shows_scroll_handle());
}

#[test]
fn test_footer_hugs_short_content() {
    let (mut grid, _) = grid(3);
    grid.insert_rows(Section::Header, 0, 1).unwrap();
    grid.insert_rows(Section::Footer, 0, 1).unwrap();
    assert_eq!(grid.positions().top(grid.body().root()), 20.0);
    assert_eq!(grid.positions().top(grid.footer().root()), 80.0);
    grid.insert_rows(Section::Body, 0, 100).unwrap();
    assert_eq!(grid.positions().top(grid.footer().root()), 180.0);
}

#[test]
fn test_invalid_sizes_are_rejected() {
    let (mut grid, _) = grid(10);
    assert!(grid.set_size(-1.0, 100.0).is_err());
    assert!(grid.set_size(100.0, f64::INFINITY).is_err());
    assert!(grid.set_default_row_height(Section::Body, 0.5).is_err());
    assert!(EscalatorConfig {
        height: f64::NAN,
        ..EscalatorConfig::default()
    }
    .validate()
    .is_err());
}
