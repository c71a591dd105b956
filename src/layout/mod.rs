//! Geometry bookkeeping: element positions, column widths, scrollbars and
//! the viewport they measure against.
//!
//! This module handles:
//! - Recording the offset assigned to every managed element
//! - Column widths and the frozen column count
//! - Scroll position clamping for both axes
//! - Scroll target computation for `scroll_to_*` operations

mod columns;
mod geometry;
mod scrollbar;
mod viewport;

pub use columns::{Column, ColumnConfiguration};
pub use geometry::{Position, PositionTracker};
pub use scrollbar::{Direction, ScrollbarBundle};
pub use viewport::{scroll_pos, validate_scroll_destination, ScrollDestination, Viewport};
