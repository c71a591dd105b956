//! Viewport dimensions and scroll target computation.

use serde::{Deserialize, Serialize};

use crate::error::{EscalatorError, Result};

/// Where a `scroll_to_*` target should end up in the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrollDestination {
    /// Scroll as little as possible to make the target fully visible.
    Any,
    /// Align the target with the top/left edge.
    Start,
    /// Center the target. Padding is not allowed.
    Middle,
    /// Align the target with the bottom/right edge.
    End,
}

/// `Middle` cannot honour a padding.
pub fn validate_scroll_destination(destination: ScrollDestination, padding: f64) -> Result<()> {
    if destination == ScrollDestination::Middle && padding.abs() > 0.0 {
        return Err(EscalatorError::IllegalArgument(
            "You cannot have a padding with a MIDDLE destination".to_string(),
        ));
    }
    Ok(())
}

/// The scroll position that brings `[target_start, target_end)` to
/// `destination` within `[viewport_start, viewport_end)`.
pub fn scroll_pos(
    destination: ScrollDestination,
    target_start: f64,
    target_end: f64,
    viewport_start: f64,
    viewport_end: f64,
    padding: f64,
) -> f64 {
    let viewport_length = viewport_end - viewport_start;
    match destination {
        ScrollDestination::Any => {
            if target_start - padding < viewport_start {
                target_start - padding
            } else if target_end + padding > viewport_end {
                target_end + padding - viewport_length
            } else {
                viewport_start
            }
        }
        ScrollDestination::End => target_end + padding - viewport_length,
        ScrollDestination::Middle => {
            target_start + (target_end - target_start) / 2.0 - viewport_length / 2.0
        }
        ScrollDestination::Start => target_start - padding,
    }
}

/// Outer size of the escalator and the table area left after scrollbars.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Viewport {
    /// Outer width in pixels
    pub width: f64,
    /// Outer height in pixels
    pub height: f64,
    /// Width of the table wrapper (outer minus the vertical scrollbar)
    pub inner_width: f64,
    /// Height of the table wrapper (outer minus the horizontal scrollbar)
    pub inner_height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            inner_width: width,
            inner_height: height,
        }
    }

    /// Height available to body rows between the header and the footer.
    pub fn body_height(&self, header_height: f64, footer_height: f64) -> f64 {
        (self.inner_height - header_height - footer_height).max(0.0)
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
    }
}
