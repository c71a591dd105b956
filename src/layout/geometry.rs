//! Position bookkeeping for managed elements.
//!
//! The tracker does not decide where anything goes. Containers compute
//! offsets and write them here; everything that needs an element's current
//! offset reads it back from here.

use std::collections::HashMap;

use serde::Serialize;

use crate::container::ElementId;

/// Offset of an element relative to its section's origin.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Position {
    pub left: f64,
    pub top: f64,
}

/// Element -> assigned position.
#[derive(Debug, Clone, Default)]
pub struct PositionTracker {
    positions: HashMap<ElementId, Position>,
}

impl PositionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, element: ElementId, left: f64, top: f64) {
        self.positions.insert(element, Position { left, top });
    }

    pub fn set_top(&mut self, element: ElementId, top: f64) {
        self.positions.entry(element).or_default().top = top;
    }

    pub fn set_left(&mut self, element: ElementId, left: f64) {
        self.positions.entry(element).or_default().left = left;
    }

    pub fn get(&self, element: ElementId) -> Option<Position> {
        self.positions.get(&element).copied()
    }

    /// Top offset of a tracked element.
    ///
    /// Reading an untracked element is an engine bug; release builds fall
    /// back to zero.
    pub fn top(&self, element: ElementId) -> f64 {
        let position = self.positions.get(&element);
        debug_assert!(position.is_some(), "{element:?} has no recorded position");
        position.map_or(0.0, |p| p.top)
    }

    pub fn left(&self, element: ElementId) -> f64 {
        let position = self.positions.get(&element);
        debug_assert!(position.is_some(), "{element:?} has no recorded position");
        position.map_or(0.0, |p| p.left)
    }

    /// Move an element vertically by `delta`.
    pub fn shift_top(&mut self, element: ElementId, delta: f64) {
        if let Some(position) = self.positions.get_mut(&element) {
            position.top += delta;
        }
    }

    /// Forget a detached element.
    pub fn remove(&mut self, element: ElementId) {
        self.positions.remove(&element);
    }

    pub fn contains(&self, element: ElementId) -> bool {
        self.positions.contains_key(&element)
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::container::{ElementKind, Section};

    fn row(serial: u32) -> ElementId {
        ElementId::new(Section::Body, ElementKind::Row, serial)
    }

    #[test]
    fn test_set_shift_remove() {
        let mut tracker = PositionTracker::new();
        tracker.set(row(1), 0.0, 40.0);
        tracker.shift_top(row(1), 10.0);
        assert_eq!(tracker.top(row(1)), 50.0);
        assert_eq!(tracker.left(row(1)), 0.0);

        tracker.remove(row(1));
        assert!(!tracker.contains(row(1)));
        assert!(tracker.is_empty());
    }

    #[test]
    fn test_shift_of_untracked_element_is_ignored() {
        let mut tracker = PositionTracker::new();
        tracker.shift_top(row(9), 10.0);
        assert!(tracker.get(row(9)).is_none());
    }
}
