//! Spacers: detail rows attached below a logical body row.
//!
//! A spacer keyed by row `k` sits directly under row `k`; the key `-1`
//! places it above row 0. Positions are derived from the keys, the default
//! row height and the heights of the spacers above, so any row shift only
//! needs a re-key followed by [`SpacerContainer::reposition`].

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use super::{ElementId, ElementKind, Section};
use crate::error::{EscalatorError, Result};
use crate::layout::PositionTracker;
use crate::px::{ceil_i64, floor_i64, signed, EPSILON};
use crate::range::Range;
use crate::updater::{NullSpacerUpdater, SpacerUpdater, SpacerView};

/// How a spacer straddling a query boundary is counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SpacerInclusion {
    /// Count the whole spacer.
    Complete,
    /// Count only the part inside the queried range.
    Partial,
    /// Ignore the spacer.
    None,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Spacer {
    row: i64,
    height: f64,
    root: ElementId,
    deco: ElementId,
    in_viewport: bool,
    displayed: bool,
}

impl Spacer {
    pub fn row(&self) -> i64 {
        self.row
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    /// Element holding the spacer content.
    pub fn root(&self) -> ElementId {
        self.root
    }

    /// Accent element spanning the owning row and the spacer.
    pub fn deco(&self) -> ElementId {
        self.deco
    }

    /// Intersects the viewport.
    pub fn is_in_viewport(&self) -> bool {
        self.in_viewport
    }

    /// Shown in the DOM next to its rendered row.
    pub fn is_displayed(&self) -> bool {
        self.displayed
    }
}

/// Body facts a spacer change depends on.
#[derive(Debug, Clone, Copy)]
pub(crate) struct BodyMetrics {
    pub row_count: usize,
    pub row_height: f64,
    pub top_row_logical_index: usize,
    pub scroll_top: f64,
}

/// How the body has to follow a spacer height change.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum RowShift {
    /// Rendered rows below the spacer move by the height difference.
    After,
    /// Every rendered row moves and the scroll position follows.
    All { scroll_delta: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct HeightChange {
    pub row: i64,
    pub diff: f64,
    pub shift: RowShift,
}

pub struct SpacerContainer {
    spacers: BTreeMap<i64, Spacer>,
    updater: Box<dyn SpacerUpdater>,
    next_serial: u32,
}

impl std::fmt::Debug for SpacerContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpacerContainer")
            .field("spacers", &self.spacers)
            .finish_non_exhaustive()
    }
}

impl Default for SpacerContainer {
    fn default() -> Self {
        Self::new()
    }
}

impl SpacerContainer {
    pub fn new() -> Self {
        Self {
            spacers: BTreeMap::new(),
            updater: Box::new(NullSpacerUpdater),
            next_serial: 0,
        }
    }

    pub fn get(&self, row: i64) -> Option<&Spacer> {
        self.spacers.get(&row)
    }

    pub fn exists(&self, row: i64) -> bool {
        self.spacers.contains_key(&row)
    }

    pub fn len(&self) -> usize {
        self.spacers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spacers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Spacer> {
        self.spacers.values()
    }

    /// Height of the spacer below `row`, zero if there is none.
    pub fn spacer_height(&self, row: i64) -> f64 {
        self.spacers.get(&row).map_or(0.0, |s| s.height)
    }

    /// `(row, top, height)` of every spacer, top to bottom.
    fn layout(&self, row_height: f64) -> impl Iterator<Item = (i64, f64, f64)> + '_ {
        let mut above = 0.0;
        self.spacers.values().map(move |s| {
            let top = (s.row + 1) as f64 * row_height + above;
            above += s.height;
            (s.row, top, s.height)
        })
    }

    /// Top of the spacer below `row`.
    pub fn spacer_top(&self, row: i64, row_height: f64) -> Option<f64> {
        self.layout(row_height)
            .find(|(r, _, _)| *r == row)
            .map(|(_, top, _)| top)
    }

    /// Sum of every spacer height.
    pub fn total_height(&self) -> f64 {
        self.spacers.values().map(|s| s.height).sum()
    }

    /// Heights of the spacers attached to rows before `row`.
    pub fn sum_until_index(&self, row: i64) -> f64 {
        self.spacers.range(..row).map(|(_, s)| s.height).sum()
    }

    /// Spacer pixels between `0` and `px`.
    pub fn sum_until_px(&self, px: f64, row_height: f64) -> f64 {
        self.sum_between_px(
            0.0,
            SpacerInclusion::Partial,
            px,
            SpacerInclusion::Partial,
            row_height,
        )
    }

    /// Spacer pixels between `y1` and `y2`. `top_inclusion` decides for
    /// spacers crossing `y1` and for spacers crossing both boundaries.
    pub fn sum_between_px(
        &self,
        y1: f64,
        top_inclusion: SpacerInclusion,
        y2: f64,
        bottom_inclusion: SpacerInclusion,
        row_height: f64,
    ) -> f64 {
        if y2 <= y1 {
            return 0.0;
        }
        let mut sum = 0.0;
        for (_, top, height) in self.layout(row_height) {
            let bottom = top + height;
            if height <= 0.0 || bottom <= y1 || top >= y2 {
                continue;
            }
            let crosses_top = top < y1;
            let crosses_bottom = bottom > y2;
            sum += match (crosses_top, crosses_bottom) {
                (false, false) => height,
                (true, false) => included(top_inclusion, height, bottom - y1),
                (false, true) => included(bottom_inclusion, height, y2 - top),
                (true, true) => included(top_inclusion, height, y2 - y1),
            };
        }
        sum
    }

    /// Pixel position at which `row_px` pixels of rows lie above, the
    /// inverse of `px - sum_until_px(px)`. Lands on a spacer's top rather
    /// than inside it.
    pub fn px_for_row_px(&self, row_px: f64, row_height: f64) -> f64 {
        let mut spacer_px = 0.0;
        for (_, top, height) in self.layout(row_height) {
            if row_px <= top - spacer_px {
                return row_px + spacer_px;
            }
            spacer_px += height;
        }
        row_px + spacer_px
    }

    /// Rows of the spacers that lie after `px`. With `Partial`, spacers
    /// crossing `px` count too.
    pub fn spacers_after_px(
        &self,
        px: f64,
        inclusion: SpacerInclusion,
        row_height: f64,
    ) -> Vec<i64> {
        self.layout(row_height)
            .filter(|(_, top, height)| match inclusion {
                SpacerInclusion::Partial => top + height > px,
                SpacerInclusion::Complete | SpacerInclusion::None => *top >= px,
            })
            .map(|(row, _, _)| row)
            .collect()
    }

    pub(crate) fn validate_row(row: i64, row_count: usize) -> Result<()> {
        if row < -1 || row >= signed(row_count) {
            return Err(EscalatorError::IllegalArgument(format!(
                "invalid row index: {row}, while the body only has {row_count} rows."
            )));
        }
        Ok(())
    }

    /// Create, resize or (with a negative height) remove the spacer below `row`.
    pub(crate) fn set_spacer(
        &mut self,
        row: i64,
        height: f64,
        metrics: BodyMetrics,
        positions: &mut PositionTracker,
    ) -> Result<Option<HeightChange>> {
        Self::validate_row(row, metrics.row_count)?;
        if height.is_nan() || height.is_infinite() {
            return Err(EscalatorError::IllegalArgument(format!(
                "spacer height must be finite, got {height}"
            )));
        }
        if height < 0.0 {
            return Ok(self.remove(row, metrics, positions));
        }
        if !self.spacers.contains_key(&row) {
            self.insert_new(row, metrics, positions);
        }
        let change = self.set_height(row, height, metrics);
        self.reposition(metrics.row_height, positions);
        self.notify_update(row, metrics.row_height);
        Ok(change)
    }

    fn insert_new(&mut self, row: i64, metrics: BodyMetrics, positions: &mut PositionTracker) {
        let root = self.allocate(ElementKind::Spacer);
        let deco = self.allocate(ElementKind::SpacerDeco);
        self.spacers.insert(
            row,
            Spacer {
                row,
                height: 0.0,
                root,
                deco,
                in_viewport: false,
                displayed: false,
            },
        );
        self.reposition(metrics.row_height, positions);
        if let Some(view) = self.view(row, metrics.row_height) {
            self.updater.init(&view);
        }
        debug!(row, "spacer created");
    }

    fn allocate(&mut self, kind: ElementKind) -> ElementId {
        let id = ElementId::new(Section::Body, kind, self.next_serial);
        self.next_serial = self.next_serial.wrapping_add(1);
        id
    }

    fn set_height(&mut self, row: i64, height: f64, metrics: BodyMetrics) -> Option<HeightChange> {
        let top = self.spacer_top(row, metrics.row_height)?;
        let spacer = self.spacers.get_mut(&row)?;
        let old = spacer.height.max(0.0);
        let diff = height - old;
        spacer.height = height;
        if diff.abs() < EPSILON {
            return None;
        }

        let growing = diff > 0.0;
        let top_index = signed(metrics.top_row_logical_index);
        let minus_one_exception = growing && row == -1 && top_index == 0;
        let shift = if row < top_index && !minus_one_exception {
            let viewport_mid_spacer =
                metrics.scroll_top > top && metrics.scroll_top < top + old;
            let scroll_delta = if viewport_mid_spacer && !growing {
                diff.max(top - metrics.scroll_top)
            } else {
                diff
            };
            RowShift::All { scroll_delta }
        } else {
            RowShift::After
        };
        Some(HeightChange { row, diff, shift })
    }

    fn remove(
        &mut self,
        row: i64,
        metrics: BodyMetrics,
        positions: &mut PositionTracker,
    ) -> Option<HeightChange> {
        if !self.spacers.contains_key(&row) {
            return None;
        }
        let change = self.set_height(row, 0.0, metrics);
        if let Some(view) = self.view(row, metrics.row_height) {
            self.updater.destroy(&view);
        }
        if let Some(spacer) = self.spacers.remove(&row) {
            positions.remove(spacer.root);
            positions.remove(spacer.deco);
        }
        self.reposition(metrics.row_height, positions);
        debug!(row, "spacer removed");
        change
    }

    /// Remove every spacer attached to a row in `rows`.
    pub(crate) fn remove_in(
        &mut self,
        rows: Range,
        metrics: BodyMetrics,
        positions: &mut PositionTracker,
    ) -> Vec<HeightChange> {
        let doomed: Vec<i64> = self
            .spacers
            .range(rows.start()..rows.end())
            .map(|(row, _)| *row)
            .collect();
        doomed
            .into_iter()
            .filter_map(|row| self.remove(row, metrics, positions))
            .collect()
    }

    /// Re-key spacers at or after `index` by `delta` rows.
    pub(crate) fn shift_by_rows(&mut self, index: i64, delta: i64, row_height: f64) {
        if delta == 0 {
            return;
        }
        let moved = self.spacers.split_off(&index);
        let rows: Vec<i64> = moved.keys().map(|r| r + delta).collect();
        for (_, mut spacer) in moved {
            spacer.row += delta;
            self.spacers.insert(spacer.row, spacer);
        }
        for row in rows {
            self.notify_update(row, row_height);
        }
    }

    /// Write every spacer's position into the tracker.
    pub(crate) fn reposition(&self, row_height: f64, positions: &mut PositionTracker) {
        for (row, top, _) in self.layout(row_height) {
            if let Some(spacer) = self.spacers.get(&row) {
                positions.set(spacer.root, 0.0, top);
                positions.set(spacer.deco, 0.0, top - row_height);
            }
        }
    }

    /// Height of the deco element: the owning row plus the spacer.
    pub fn deco_height(&self, row: i64, row_height: f64) -> Option<f64> {
        self.spacers.get(&row).map(|s| s.height + row_height)
    }

    /// Recompute which spacers intersect `[scroll_top, scroll_top + section_height)`.
    /// Returns the spacers whose state flipped.
    pub(crate) fn update_visibility(
        &mut self,
        scroll_top: f64,
        section_height: f64,
        row_height: f64,
    ) -> Vec<(i64, bool)> {
        let viewport = Range::with_length(floor_i64(scroll_top), ceil_i64(section_height));
        let states: Vec<(i64, bool)> = self
            .layout(row_height)
            .map(|(row, top, height)| {
                let range = Range::with_length(ceil_i64(top), floor_i64(height));
                (row, range.intersects(&viewport))
            })
            .collect();
        let mut flipped = Vec::new();
        for (row, visible) in states {
            if let Some(spacer) = self.spacers.get_mut(&row) {
                if spacer.in_viewport != visible {
                    spacer.in_viewport = visible;
                    flipped.push((row, visible));
                }
            }
        }
        flipped
    }

    pub(crate) fn set_displayed(&mut self, row: i64, displayed: bool) {
        if let Some(spacer) = self.spacers.get_mut(&row) {
            spacer.displayed = displayed;
        }
    }

    /// Swap the updater: spacers are destroyed with the old one and
    /// initialised with the new one.
    pub(crate) fn set_updater(&mut self, updater: Box<dyn SpacerUpdater>, row_height: f64) {
        let rows: Vec<i64> = self.spacers.keys().copied().collect();
        for row in &rows {
            if let Some(view) = self.view(*row, row_height) {
                self.updater.destroy(&view);
            }
        }
        self.updater = updater;
        for row in &rows {
            if let Some(view) = self.view(*row, row_height) {
                self.updater.init(&view);
            }
        }
    }

    fn notify_update(&mut self, row: i64, row_height: f64) {
        if let Some(view) = self.view(row, row_height) {
            self.updater.update(&view);
        }
    }

    pub fn view(&self, row: i64, row_height: f64) -> Option<SpacerView> {
        let spacer = self.spacers.get(&row)?;
        Some(SpacerView {
            element: spacer.root,
            row,
            height: spacer.height,
            top: self.spacer_top(row, row_height).unwrap_or(0.0),
        })
    }

    /// The spacer owning `element` (root or deco).
    pub fn spacer_of(&self, element: ElementId) -> Option<&Spacer> {
        self.spacers
            .values()
            .find(|s| s.root == element || s.deco == element)
    }
}

fn included(inclusion: SpacerInclusion, complete: f64, partial: f64) -> f64 {
    match inclusion {
        SpacerInclusion::Complete => complete,
        SpacerInclusion::Partial => partial,
        SpacerInclusion::None => 0.0,
    }
}
