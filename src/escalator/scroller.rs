//! Scrollbar sizing and the input paths that move the scroll position.

use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

use super::Escalator;
use crate::container::RowContainer;
use crate::event::EscalatorEvent;
use crate::px::EPSILON;

/// Unit of a wheel event's deltas, as in `WheelEvent.deltaMode`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WheelDeltaMode {
    #[default]
    Pixel,
    Line,
    Page,
}

impl WheelDeltaMode {
    pub fn from_dom(mode: u32) -> Option<Self> {
        match mode {
            0 => Some(Self::Pixel),
            1 => Some(Self::Line),
            2 => Some(Self::Page),
            _ => None,
        }
    }
}

/// Drop the minor axis of a mostly one-directional gesture. An axis is
/// zeroed when its share relative to the other is below `threshold`.
pub fn snap_deltas(delta_x: f64, delta_y: f64, threshold: f64) -> (f64, f64) {
    if delta_x == 0.0 || delta_y == 0.0 {
        return (delta_x, delta_y);
    }
    let x_ratio = delta_x.abs() / delta_y.abs();
    let y_ratio = delta_y.abs() / delta_x.abs();
    let x = if x_ratio < threshold { 0.0 } else { delta_x };
    let y = if y_ratio < threshold { 0.0 } else { delta_y };
    (x, y)
}

/// tan(30°): gestures within 30 degrees of an axis snap to it.
fn touch_snap_threshold() -> f64 {
    3.0_f64.sqrt().recip()
}

impl Escalator {
    /// Decide which scrollbars are needed and size both bundles and the
    /// table wrapper accordingly.
    pub(super) fn recalculate_scrollbars(&mut self) {
        let content_height = self.body.content_height();
        let content_width = self.content_width();
        let width = self.viewport.width;
        let height = self.viewport.height;

        let mut vertical_needed = self.needs_vertical(content_height, height);
        let mut horizontal_needed = content_width > width + EPSILON;
        // one scrollbar can make room for the other run out
        if vertical_needed != horizontal_needed {
            if vertical_needed {
                horizontal_needed =
                    content_width > width + EPSILON - self.vertical.scrollbar_thickness();
            } else {
                vertical_needed = self.needs_vertical(
                    content_height,
                    height - self.horizontal.scrollbar_thickness(),
                );
            }
        }

        let mut wrapper_width = width;
        let mut wrapper_height = height;
        if horizontal_needed {
            wrapper_height -= self.horizontal.scrollbar_thickness();
        }
        if vertical_needed {
            wrapper_width -= self.vertical.scrollbar_thickness();
        }
        self.viewport.inner_width = wrapper_width.max(0.0);
        self.viewport.inner_height = wrapper_height.max(0.0);

        let header = self.header.height_of_section();
        let body_height = self.body_area_height();
        self.vertical.set_position(header);
        self.vertical.set_offset_size(body_height);
        self.vertical.set_scroll_size(content_height);
        self.body.set_section_height(body_height);

        let previous_left = self.horizontal.scroll_pos();
        let frozen = self.columns.frozen_width();
        self.horizontal.set_offset_size(self.viewport.inner_width - frozen);
        self.horizontal.set_scroll_size(content_width - frozen);
        self.horizontal.set_position(frozen);
        self.horizontal.set_scroll_pos(previous_left);

        trace!(
            vertical_needed,
            horizontal_needed,
            inner_width = self.viewport.inner_width,
            inner_height = self.viewport.inner_height,
            "recalculated scrollbars"
        );
    }

    /// Bring sections, frozen cells and the rendered window in line with
    /// the bundles' scroll positions.
    pub(super) fn on_scroll(&mut self) {
        self.vertical.take_scroll_pending();
        self.horizontal.take_scroll_pending();
        let scroll_top = self.vertical.scroll_pos();
        let scroll_left = self.horizontal.scroll_pos();

        if (scroll_left - self.last_scroll_left).abs() > EPSILON {
            let frozen = self.columns.frozen_column_count();
            self.for_each_core(|core, _| {
                for column in 0..frozen {
                    core.update_freeze_position(column, scroll_left);
                }
            });
        }
        self.position_section_roots();
        self.body.set_body_scroll_position(scroll_left, scroll_top);

        if self.attached {
            self.body_op(|body, ctx| body.update_rows_on_scroll(ctx));
            for (row, visible) in self.body.update_spacer_visibility() {
                self.events
                    .push(EscalatorEvent::SpacerVisibilityChanged { row, visible });
            }
        }

        let moved = (scroll_top - self.last_scroll_top).abs() > EPSILON
            || (scroll_left - self.last_scroll_left).abs() > EPSILON;
        if moved {
            self.events.push(EscalatorEvent::Scrolled {
                top: scroll_top,
                left: scroll_left,
            });
            self.last_scroll_top = scroll_top;
            self.last_scroll_left = scroll_left;
        }
        self.push_scrollbar_events();
    }

    /// Apply a mouse wheel event. Returns whether the host should prevent
    /// the event's default action.
    pub fn on_wheel(&mut self, delta_x: f64, delta_y: f64, mode: WheelDeltaMode) -> bool {
        let delta_y = match mode {
            WheelDeltaMode::Pixel => delta_y,
            WheelDeltaMode::Line => delta_y * self.body.default_row_height(),
            WheelDeltaMode::Page => {
                warn!(?mode, "unsupported wheel delta mode, treating deltas as pixels");
                delta_y
            }
        };
        self.move_scroll_from_event(delta_x, delta_y)
    }

    fn move_scroll_from_event(&mut self, delta_x: f64, delta_y: f64) -> bool {
        if !delta_x.is_nan() {
            self.horizontal.set_scroll_pos_by_delta(delta_x);
        }
        if !delta_y.is_nan() {
            self.vertical.set_scroll_pos_by_delta(delta_y);
        }
        let warranted_y = delta_y.abs() > 0.0 && self.vertical.shows_scroll_handle();
        let warranted_x = delta_x.abs() > 0.0 && self.horizontal.shows_scroll_handle();
        self.on_scroll();
        warranted_y || warranted_x
    }

    pub fn on_touch_start(&mut self, x: f64, y: f64) {
        self.set_touch_active(true);
        self.last_touch = Some((x, y));
    }

    /// Scroll by the finger's movement since the last touch point. Returns
    /// whether the host should prevent the event's default action.
    pub fn on_touch_move(&mut self, x: f64, y: f64) -> bool {
        let Some((last_x, last_y)) = self.last_touch else {
            return false;
        };
        self.last_touch = Some((x, y));
        let (delta_x, delta_y) = snap_deltas(last_x - x, last_y - y, touch_snap_threshold());
        self.move_scroll_from_event(delta_x, delta_y)
    }

    pub fn on_touch_end(&mut self) {
        self.set_touch_active(false);
    }
}
