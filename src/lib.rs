//! escalator - a virtualized grid engine
//!
//! Renders only the rows that fit the viewport and recycles them while the
//! user scrolls:
//! - Header, body and footer sections over one column configuration
//! - Frozen columns, column spans, auto-measured column widths
//! - Spacers (detail rows) below any body row
//! - `scroll_to_*` with start/middle/end/any alignment
//! - Debounced resync of the DOM order after scrolling
//!
//! The engine is headless: elements are [`container::ElementId`] handles with
//! positions kept in a [`layout::PositionTracker`]. The `web` module mirrors
//! them into a browser DOM.
//!
//! # Usage
//!
//! ```
//! use escalator::{Escalator, EscalatorConfig, Section};
//!
//! let mut grid = Escalator::new(EscalatorConfig::default())?;
//! grid.insert_columns(0, 4)?;
//! grid.insert_rows(Section::Body, 0, 10_000)?;
//! grid.attach();
//! grid.set_scroll_top(5_000.0);
//! assert_eq!(grid.visible_row_range().start(), 250);
//! # Ok::<(), escalator::EscalatorError>(())
//! ```

pub mod clock;
pub mod config;
pub mod container;
pub mod error;
pub mod escalator;
pub mod event;
pub mod layout;
pub mod px;
pub mod range;
pub mod updater;

#[cfg(target_arch = "wasm32")]
pub mod web;

use wasm_bindgen::prelude::*;

pub use crate::config::{EscalatorConfig, HeightMode, RowHeights};
pub use crate::container::{DomMove, ElementId, ElementKind, RowContainer, Section};
pub use crate::error::{EscalatorError, Result};
pub use crate::escalator::{Escalator, Snapshot, SubPart, WheelDeltaMode};
pub use crate::event::EscalatorEvent;
pub use crate::layout::{Direction, ScrollDestination};
pub use crate::range::Range;

/// Get the library version
#[must_use]
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
