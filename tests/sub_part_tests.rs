//! Sub-part names resolving to elements and back.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

mod common;

use common::*;
use escalator::{Escalator, Section, SubPart};
use test_case::test_case;

/// 1000 body rows between one header and one footer row: a 160px body.
fn framed_grid() -> Escalator {
    let (mut grid, _) = grid(1000);
    grid.insert_rows(Section::Header, 0, 1).unwrap();
    grid.insert_rows(Section::Footer, 0, 1).unwrap();
    grid
}

// ===== RESOLVING =====

#[test]
fn test_section_roots() {
    let mut grid = framed_grid();
    assert_eq!(
        grid.sub_part_element("header"),
        Some(SubPart::SectionRoot {
            element: grid.header().root()
        })
    );
    assert_eq!(
        grid.sub_part_element("cell"),
        Some(SubPart::SectionRoot {
            element: grid.body().root()
        })
    );
    assert_eq!(
        grid.sub_part_element("footer"),
        Some(SubPart::SectionRoot {
            element: grid.footer().root()
        })
    );
}

#[test]
fn test_rows_and_cells() {
    let mut grid = framed_grid();
    let header_row = grid.header().row_at(0).unwrap();
    let body_row = grid.body().row_element_for(3).unwrap();
    assert_eq!(
        grid.sub_part_element("header[0]"),
        Some(SubPart::Row {
            element: header_row
        })
    );
    assert_eq!(
        grid.sub_part_element("cell[3][1]"),
        Some(SubPart::Cell {
            row: body_row,
            column: 1
        })
    );
    assert!(grid.sub_part_element("HEADER[0][0]").is_some());
}

#[test]
fn test_unrendered_body_row_scrolls_into_view() {
    let mut grid = framed_grid();
    assert_eq!(grid.sub_part_element("cell[500][0]"), None);
    // scrolled just far enough to show the row at the bottom
    assert_eq!(grid.scroll_top(), 9860.0);
    assert!(grid.visible_row_range().contains(500));
    let row = grid.body().row_element_for(500).unwrap();
    assert_eq!(
        grid.sub_part_element("cell[500][0]"),
        Some(SubPart::Cell { row, column: 0 })
    );
}

#[test]
fn test_covered_cell_resolves_to_spanning_cell() {
    let mut grid = framed_grid();
    grid.set_updater(Section::Body, Box::new(SpanningUpdater { every: 2 }));
    let row = grid.body().row_element_for(2).unwrap();
    assert_eq!(
        grid.sub_part_element("cell[2][1]"),
        Some(SubPart::Cell { row, column: 0 })
    );
    let odd = grid.body().row_element_for(3).unwrap();
    assert_eq!(
        grid.sub_part_element("cell[3][1]"),
        Some(SubPart::Cell { row: odd, column: 1 })
    );
}

#[test]
fn test_spacers() {
    let mut grid = framed_grid();
    grid.set_spacer(4, 30.0).unwrap();
    let root = grid.body().spacers().get(4).unwrap().root();
    assert_eq!(
        grid.sub_part_element("spacer[4]"),
        Some(SubPart::Spacer { element: root })
    );
    assert_eq!(grid.sub_part_element("spacer[5]"), None);
    assert_eq!(grid.sub_part_element("spacer"), None);
}

#[test_case("cell[1][1][1]" ; "too many indices")]
#[test_case("cell[-1]" ; "negative row")]
#[test_case("cell[3][9]" ; "missing column")]
#[test_case("header[4]" ; "missing header row")]
#[test_case("bogus[1]" ; "unknown type")]
#[test_case("cell[1" ; "unparsable")]
fn test_unresolvable_names(name: &str) {
    let mut grid = framed_grid();
    assert_eq!(grid.sub_part_element(name), None);
    assert_eq!(grid.scroll_top(), 0.0);
}

// ===== NAMING =====

#[test]
fn test_names_round_trip() {
    let mut grid = framed_grid();
    grid.set_spacer(4, 30.0).unwrap();
    let names = [
        "header",
        "cell",
        "footer",
        "header[0]",
        "cell[7]",
        "cell[7][1]",
        "footer[0][0]",
        "spacer[4]",
    ];
    for name in names {
        let part = grid.sub_part_element(name).unwrap();
        assert_eq!(grid.sub_part_name(part).as_deref(), Some(name));
    }
}

#[test]
fn test_names_of_elements() {
    let mut grid = framed_grid();
    grid.set_spacer(-1, 10.0).unwrap();
    let spacer = grid.body().spacers().get(-1).unwrap();
    let (root, deco) = (spacer.root(), spacer.deco());
    assert_eq!(grid.sub_part_name_of(root).as_deref(), Some("spacer[-1]"));
    assert_eq!(grid.sub_part_name_of(deco).as_deref(), Some("spacer[-1]"));

    let row = grid.body().row_element_for(2).unwrap();
    assert_eq!(grid.sub_part_name_of(row).as_deref(), Some("cell[2]"));
    grid.set_scroll_top(5000.0);
    // the element was recycled and now shows another row
    assert_ne!(grid.sub_part_name_of(row).as_deref(), Some("cell[2]"));
}
