//! Scrollbar bundles: one per axis.
//!
//! A bundle owns the logical scroll position of its axis and clamps it to
//! `[0, scroll_size - offset_size]`. Positions are whole pixels, truncated
//! towards zero like the browser's `scrollTop`.

use serde::{Deserialize, Serialize};

use crate::px::EPSILON;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Vertical,
    Horizontal,
}

#[derive(Debug, Clone)]
pub struct ScrollbarBundle {
    direction: Direction,
    scroll_pos: f64,
    scroll_size: f64,
    offset_size: f64,
    thickness: f64,
    /// Offset of the scrollbar element along its own axis.
    position: f64,
    locked: bool,
    handle_visible: bool,
    visibility_changed: Option<bool>,
    scroll_pending: bool,
}

impl ScrollbarBundle {
    pub fn new(direction: Direction, thickness: f64) -> Self {
        Self {
            direction,
            scroll_pos: 0.0,
            scroll_size: 0.0,
            offset_size: 0.0,
            thickness: thickness.max(0.0),
            position: 0.0,
            locked: false,
            handle_visible: false,
            visibility_changed: None,
            scroll_pending: false,
        }
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn scroll_pos(&self) -> f64 {
        self.scroll_pos
    }

    pub fn scroll_size(&self) -> f64 {
        self.scroll_size
    }

    pub fn offset_size(&self) -> f64 {
        self.offset_size
    }

    pub fn max_scroll_pos(&self) -> f64 {
        (self.scroll_size - self.offset_size).max(0.0)
    }

    /// Set the scroll position. Returns whether it changed.
    pub fn set_scroll_pos(&mut self, px: f64) -> bool {
        if self.locked || px.is_nan() {
            return false;
        }
        let old = self.scroll_pos;
        self.scroll_pos = px.trunc().min(self.max_scroll_pos()).max(0.0);
        let changed = (old - self.scroll_pos).abs() > EPSILON;
        if changed {
            self.scroll_pending = true;
        }
        changed
    }

    pub fn set_scroll_pos_by_delta(&mut self, delta: f64) -> bool {
        if delta.abs() > 0.0 {
            self.set_scroll_pos(self.scroll_pos + delta)
        } else {
            false
        }
    }

    /// Total scrollable length of the content.
    pub fn set_scroll_size(&mut self, px: f64) {
        self.scroll_size = px.max(0.0);
        self.reclamp();
    }

    /// Visible length of the axis.
    pub fn set_offset_size(&mut self, px: f64) {
        self.offset_size = px.max(0.0);
        self.reclamp();
    }

    fn reclamp(&mut self) {
        let max = self.max_scroll_pos();
        if self.scroll_pos > max {
            self.scroll_pos = max.trunc();
            self.scroll_pending = true;
        }
        let visible = self.shows_scroll_handle();
        if visible != self.handle_visible {
            self.handle_visible = visible;
            self.visibility_changed = Some(visible);
        }
    }

    /// Whether the content overflows, i.e. the handle is visible.
    pub fn shows_scroll_handle(&self) -> bool {
        self.scroll_size - self.offset_size > EPSILON
    }

    /// Thickness of the scrollbar when shown. Zero for overlay scrollbars.
    pub fn scrollbar_thickness(&self) -> f64 {
        self.thickness
    }

    pub fn set_scrollbar_thickness(&mut self, px: f64) {
        self.thickness = px.max(0.0);
    }

    /// Space the scrollbar takes from the table, if it is shown.
    pub fn occupied_thickness(&self) -> f64 {
        if self.shows_scroll_handle() {
            self.thickness
        } else {
            0.0
        }
    }

    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn set_position(&mut self, px: f64) {
        self.position = px;
    }

    /// A locked bundle ignores scroll position changes.
    pub fn set_locked(&mut self, locked: bool) {
        self.locked = locked;
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// The handle visibility change since the last call, if any.
    pub fn take_visibility_change(&mut self) -> Option<bool> {
        self.visibility_changed.take()
    }

    /// Whether a scroll position change has not been handled yet.
    pub fn is_work_pending(&self) -> bool {
        self.scroll_pending
    }

    pub(crate) fn take_scroll_pending(&mut self) -> bool {
        std::mem::take(&mut self.scroll_pending)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    fn bundle(size: f64, offset: f64) -> ScrollbarBundle {
        let mut b = ScrollbarBundle::new(Direction::Vertical, 15.0);
        b.set_offset_size(offset);
        b.set_scroll_size(size);
        b
    }

    #[test]
    fn test_scroll_pos_is_clamped_and_truncated() {
        let mut b = bundle(1000.0, 200.0);
        assert!(b.set_scroll_pos(123.9));
        assert_eq!(b.scroll_pos(), 123.0);
        b.set_scroll_pos(5000.0);
        assert_eq!(b.scroll_pos(), 800.0);
        b.set_scroll_pos(-40.0);
        assert_eq!(b.scroll_pos(), 0.0);
    }

    #[test]
    fn test_shrinking_content_pulls_position_back() {
        let mut b = bundle(1000.0, 200.0);
        b.set_scroll_pos(700.0);
        b.set_scroll_size(500.0);
        assert_eq!(b.scroll_pos(), 300.0);
    }

    #[test]
    fn test_visibility_change_reported_once() {
        let mut b = ScrollbarBundle::new(Direction::Horizontal, 15.0);
        b.set_offset_size(100.0);
        b.set_scroll_size(300.0);
        assert_eq!(b.take_visibility_change(), Some(true));
        assert_eq!(b.take_visibility_change(), None);
        b.set_scroll_size(100.0);
        assert!(!b.shows_scroll_handle());
        assert_eq!(b.take_visibility_change(), Some(false));
    }

    #[test]
    fn test_locked_bundle_ignores_scroll() {
        let mut b = bundle(1000.0, 200.0);
        b.set_locked(true);
        assert!(!b.set_scroll_pos(100.0));
        assert_eq!(b.scroll_pos(), 0.0);
    }

    #[test]
    fn test_occupied_thickness_follows_handle() {
        let mut b = bundle(100.0, 200.0);
        assert_eq!(b.occupied_thickness(), 0.0);
        b.set_scroll_size(400.0);
        assert_eq!(b.occupied_thickness(), 15.0);
    }
}
