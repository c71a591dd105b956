//! Notifications produced by the engine.
//!
//! Events are queued while an operation runs and handed out by
//! [`crate::Escalator::drain_events`].

use serde::Serialize;

use crate::container::Section;
use crate::layout::Direction;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EscalatorEvent {
    /// The set of rendered body rows changed.
    RowVisibilityChanged {
        first_visible_row: usize,
        visible_row_count: usize,
    },
    Scrolled {
        top: f64,
        left: f64,
    },
    /// A section's default row height was set or detected.
    RowHeightChanged {
        section: Section,
        height: f64,
    },
    /// A scrollbar's handle appeared or disappeared.
    ScrollbarVisibilityChanged {
        direction: Direction,
        visible: bool,
    },
    SpacerVisibilityChanged {
        row: i64,
        visible: bool,
    },
}
