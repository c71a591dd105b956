//! The body section: a bounded window of rendered rows over a large
//! logical row set.
//!
//! Three index spaces are in play:
//! - logical: position in the data set, `0..row_count`
//! - visual: position in `visual_row_order`, top to bottom on screen
//! - physical: position among the section's DOM children
//!
//! Visual index `v` always shows logical row `top_row_logical_index + v`.
//! Physical order lags behind and is resynced by [`DomSorter`].

use std::collections::{BTreeMap, HashSet, VecDeque};

use serde::Serialize;
use tracing::{debug, trace};

use super::spacer::{BodyMetrics, HeightChange, RowShift};
use super::{
    DomSorter, ElementId, ElementKind, PaintContext, RowContainer, RowSection, Section,
    SpacerContainer,
};
use crate::error::Result;
use crate::event::EscalatorEvent;
use crate::layout::{ColumnConfiguration, PositionTracker, ScrollbarBundle};
use crate::px::{ceil_count, floor_index, signed};
use crate::range::Range;
use crate::updater::{EscalatorUpdater, SpacerUpdater};

/// Rows rendered beyond the strictly visible ones.
const BUFFER_ROWS: usize = 2;

/// What a body operation needs from the escalator.
pub(crate) struct BodyContext<'a> {
    pub columns: &'a ColumnConfiguration,
    pub positions: &'a mut PositionTracker,
    pub scroll_left: f64,
    pub vertical: &'a mut ScrollbarBundle,
    pub now_ms: f64,
    pub events: &'a mut Vec<EscalatorEvent>,
}

impl BodyContext<'_> {
    fn paint(&mut self) -> PaintContext<'_> {
        PaintContext {
            columns: self.columns,
            positions: &mut *self.positions,
            scroll_left: self.scroll_left,
        }
    }
}

/// One step of a physical reorder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DomMove {
    /// Insert as the section's first child.
    First { element: ElementId },
    /// Insert directly after `anchor`.
    After {
        element: ElementId,
        anchor: ElementId,
    },
}

#[derive(Debug)]
pub struct BodyRowContainer {
    core: RowSection,
    root: ElementId,
    visual_row_order: VecDeque<ElementId>,
    top_row_logical_index: usize,
    physical_order: Vec<ElementId>,
    spacers: SpacerContainer,
    dom_sorter: DomSorter,
    focused_row: Option<ElementId>,
    scroll_top: f64,
    scroll_left: f64,
    /// Height available to body rows between header and footer.
    section_height: f64,
}

impl BodyRowContainer {
    pub(crate) fn new(row_height: Option<f64>, sort_delay_ms: f64, sort_frames: u32) -> Self {
        let mut core = RowSection::new(Section::Body, row_height);
        let root = core.allocate(ElementKind::SectionRoot);
        Self {
            core,
            root,
            visual_row_order: VecDeque::new(),
            top_row_logical_index: 0,
            physical_order: Vec::new(),
            spacers: SpacerContainer::new(),
            dom_sorter: DomSorter::new(sort_delay_ms, sort_frames),
            focused_row: None,
            scroll_top: 0.0,
            scroll_left: 0.0,
            section_height: 0.0,
        }
    }

    pub fn root(&self) -> ElementId {
        self.root
    }

    pub fn spacers(&self) -> &SpacerContainer {
        &self.spacers
    }

    pub fn dom_sorter(&self) -> &DomSorter {
        &self.dom_sorter
    }

    pub(crate) fn core_mut(&mut self) -> &mut RowSection {
        &mut self.core
    }

    pub(crate) fn set_updater(&mut self, updater: Box<dyn EscalatorUpdater>) {
        self.core.set_updater(updater);
    }

    pub(crate) fn set_spacer_updater(&mut self, updater: Box<dyn SpacerUpdater>) {
        let row_height = self.row_height();
        self.spacers.set_updater(updater, row_height);
    }

    pub fn top_row_logical_index(&self) -> usize {
        self.top_row_logical_index
    }

    /// Rendered rows, top to bottom.
    pub fn visual_row_order(&self) -> &VecDeque<ElementId> {
        &self.visual_row_order
    }

    /// Rows and spacer roots in DOM order.
    pub fn physical_order(&self) -> &[ElementId] {
        &self.physical_order
    }

    pub fn scroll_top(&self) -> f64 {
        self.scroll_top
    }

    pub fn scroll_left(&self) -> f64 {
        self.scroll_left
    }

    fn row_height(&self) -> f64 {
        self.core.default_row_height()
    }

    fn row_count(&self) -> usize {
        self.core.row_count()
    }

    /// Logical range currently rendered.
    pub fn visible_row_range(&self) -> Range {
        if self.visual_row_order.is_empty() {
            Range::with_length(0, 0)
        } else {
            Range::of_rows(self.top_row_logical_index, self.visual_row_order.len())
        }
    }

    /// `ceil(section_height / row_height) + 2`.
    pub fn max_visible_row_count(&self) -> usize {
        ceil_count(self.section_height / self.row_height()) + BUFFER_ROWS
    }

    /// Pixel top of a logical row.
    pub fn row_top(&self, logical: usize) -> f64 {
        logical as f64 * self.row_height() + self.spacers.sum_until_index(signed(logical))
    }

    /// Rows plus spacers.
    pub fn content_height(&self) -> f64 {
        self.row_count() as f64 * self.row_height() + self.spacers.total_height()
    }

    /// Logical row at pixel `px`, counting spacers as occupied space.
    pub fn logical_index_at(&self, px: f64) -> usize {
        let row_height = self.row_height();
        let row_px = px - self.spacers.sum_until_px(px, row_height);
        floor_index(row_px / row_height)
    }

    /// Row pixels between `y1` and `y2`, spacers excluded.
    fn row_heights_sum_between_px(&self, y1: f64, y2: f64) -> f64 {
        debug_assert!(y1 <= y2, "y1 must not be greater than y2");
        let spacer_px = self.spacers.sum_between_px(
            y1,
            super::SpacerInclusion::Partial,
            y2,
            super::SpacerInclusion::Partial,
            self.row_height(),
        );
        (y2 - y1) - spacer_px
    }

    /// Visual index of a logical row, if rendered.
    pub fn logical_to_visual(&self, logical: usize) -> Option<usize> {
        let visual = logical.checked_sub(self.top_row_logical_index)?;
        (visual < self.visual_row_order.len()).then_some(visual)
    }

    /// Physical index of a rendered element.
    pub fn visual_to_physical(&self, visual: usize) -> Option<usize> {
        let element = self.visual_row_order.get(visual)?;
        self.physical_order.iter().position(|e| e == element)
    }

    /// Rendered row showing `logical`.
    pub fn row_element_for(&self, logical: usize) -> Option<ElementId> {
        self.logical_to_visual(logical)
            .and_then(|v| self.visual_row_order.get(v).copied())
    }

    fn metrics(&self) -> BodyMetrics {
        BodyMetrics {
            row_count: self.row_count(),
            row_height: self.row_height(),
            top_row_logical_index: self.top_row_logical_index,
            scroll_top: self.scroll_top,
        }
    }

    pub(crate) fn set_section_height(&mut self, px: f64) {
        self.section_height = px.max(0.0);
    }

    pub(crate) fn set_body_scroll_position(&mut self, left: f64, top: f64) {
        self.scroll_left = left;
        self.scroll_top = top;
    }

    pub(crate) fn set_focused_row(&mut self, element: Option<ElementId>) {
        self.focused_row = element.filter(|e| self.visual_row_order.contains(e));
    }

    fn fire_visibility_change(&self, ctx: &mut BodyContext<'_>) {
        let range = self.visible_row_range();
        ctx.events.push(EscalatorEvent::RowVisibilityChanged {
            first_visible_row: crate::px::unsigned(range.start()),
            visible_row_count: range.len(),
        });
    }

    fn rows_changed(&mut self, ctx: &mut BodyContext<'_>) {
        self.fire_visibility_change(ctx);
        self.dom_sorter.reschedule(ctx.now_ms);
    }

    /// Lay rendered rows and spacers out from the current top index.
    fn reposition_rendered(&self, positions: &mut PositionTracker) {
        let row_height = self.row_height();
        let mut y = self.row_top(self.top_row_logical_index);
        for (visual, element) in self.visual_row_order.iter().enumerate() {
            positions.set(*element, 0.0, y);
            let logical = self.top_row_logical_index + visual;
            y += row_height + self.spacers.spacer_height(signed(logical));
        }
        self.spacers.reposition(row_height, positions);
    }

    fn create_row(&mut self, logical: usize, ctx: &mut BodyContext<'_>) -> ElementId {
        let element = self.core.create_row(logical, &ctx.paint());
        self.physical_order.push(element);
        element
    }

    fn destroy_row(&mut self, element: ElementId, ctx: &mut BodyContext<'_>) {
        self.core.destroy_row(element, &mut ctx.paint());
        self.physical_order.retain(|e| *e != element);
        if self.focused_row == Some(element) {
            self.focused_row = None;
        }
    }

    /// Move `visual_source` rows to `visual_target`, give them logical
    /// indices from `logical_target` on and lay them out.
    fn move_and_update_rows(
        &mut self,
        visual_source: std::ops::Range<usize>,
        visual_target: usize,
        logical_target: usize,
        ctx: &mut BodyContext<'_>,
    ) {
        if visual_source.is_empty() || visual_source.end > self.visual_row_order.len() {
            return;
        }
        let count = visual_source.len();
        let adjusted_target = if visual_source.start < visual_target {
            visual_target - count
        } else {
            visual_target
        };
        let moved: Vec<ElementId> = self.visual_row_order.drain(visual_source).collect();
        for (i, element) in moved.iter().enumerate() {
            self.visual_row_order.insert(adjusted_target + i, *element);
        }

        let row_height = self.row_height();
        let mut y = self.row_top(logical_target);
        for (i, element) in moved.iter().enumerate() {
            let logical = logical_target + i;
            self.core.refresh_row(*element, logical, ctx.columns);
            ctx.positions.set(*element, 0.0, y);
            y += row_height + self.spacers.spacer_height(signed(logical));
        }
    }

    /// Close any gap between the viewport and the rendered rows by
    /// recycling rows from the opposite end. Returns whether rows moved.
    pub(crate) fn update_rows_on_scroll(&mut self, ctx: &mut BodyContext<'_>) -> bool {
        let len = self.visual_row_order.len();
        let Some(first) = self.visual_row_order.front().copied() else {
            return false;
        };
        let row_height = self.row_height();
        let row_count = self.row_count();
        let top = self.top_row_logical_index;
        let scroll_top = self.scroll_top;

        let top_spacer_row = signed(top) - 1;
        let (top_element_position, next_row_bottom_offset) =
            match self.spacers.spacer_top(top_spacer_row, row_height) {
                Some(spacer_top) => (
                    spacer_top,
                    self.spacers.spacer_height(top_spacer_row) + row_height,
                ),
                None => (ctx.positions.top(first), row_height),
            };
        let viewport_offset = top_element_position - scroll_top;

        let mut moved = false;
        if viewport_offset > 0.0 {
            // empty room above the first rendered row
            let row_px = self.row_heights_sum_between_px(scroll_top, top_element_position);
            let rows_to_move = ceil_count(row_px / row_height).min(top).min(len);
            if rows_to_move > 0 && rows_to_move < len {
                let logical = top - rows_to_move;
                self.move_and_update_rows(len - rows_to_move..len, 0, logical, ctx);
                self.top_row_logical_index = logical;
                moved = true;
            } else if rows_to_move == len {
                let logical = self
                    .logical_index_at(scroll_top)
                    .min(row_count.saturating_sub(len));
                self.move_and_update_rows(0..len, 0, logical, ctx);
                self.top_row_logical_index = logical;
                moved = true;
            }
        } else if viewport_offset + next_row_bottom_offset <= 0.0 {
            // the first rendered row is entirely above the viewport
            let row_px = self.row_heights_sum_between_px(top_element_position, scroll_top);
            let rows_to_move = floor_index(row_px / row_height);
            let next_logical = top + len;
            let room_below = row_count.saturating_sub(next_logical);
            if rows_to_move < len {
                let rows_to_move = rows_to_move.min(room_below);
                if rows_to_move > 0 {
                    self.move_and_update_rows(0..rows_to_move, len, next_logical, ctx);
                    self.top_row_logical_index = top + rows_to_move;
                    moved = true;
                }
            } else {
                let logical = self
                    .logical_index_at(scroll_top)
                    .min(row_count.saturating_sub(len));
                if logical != top {
                    self.move_and_update_rows(0..len, len, logical, ctx);
                    self.top_row_logical_index = logical;
                    moved = true;
                }
            }
        }

        if moved {
            trace!(
                top = self.top_row_logical_index,
                scroll_top,
                "recycled rows on scroll"
            );
            self.debug_check_invariants();
            self.rows_changed(ctx);
        }
        moved
    }

    /// Rebuild the rendered window at `desired_top`, reusing rows whose
    /// content is still valid. `identity` maps a rendered row's current
    /// logical index to the index of the same data after a structural change,
    /// or `None` if its data is gone. Returns whether anything changed.
    fn reconcile(
        &mut self,
        identity: &dyn Fn(usize) -> Option<usize>,
        desired_top: usize,
        ctx: &mut BodyContext<'_>,
    ) -> bool {
        let row_count = self.row_count();
        let wanted = self
            .max_visible_row_count()
            .min(row_count);
        let top = desired_top.min(row_count - wanted);
        let old_range = self.visible_row_range();
        let new_range = top..top + wanted;

        let mut kept: BTreeMap<usize, ElementId> = BTreeMap::new();
        let mut free: VecDeque<ElementId> = VecDeque::new();
        for (visual, element) in self.visual_row_order.iter().enumerate() {
            match identity(self.top_row_logical_index + visual) {
                Some(logical) if new_range.contains(&logical) && !kept.contains_key(&logical) => {
                    kept.insert(logical, *element);
                }
                _ => free.push_back(*element),
            }
        }

        let mut content_changed = false;
        let mut order = VecDeque::with_capacity(wanted);
        for logical in new_range {
            if let Some(element) = kept.remove(&logical) {
                self.core.relabel(element, logical);
                order.push_back(element);
            } else if let Some(element) = free.pop_front() {
                self.core.refresh_row(element, logical, ctx.columns);
                order.push_back(element);
                content_changed = true;
            } else {
                let element = self.create_row(logical, ctx);
                order.push_back(element);
                content_changed = true;
            }
        }
        for element in free {
            self.destroy_row(element, ctx);
            content_changed = true;
        }

        self.visual_row_order = order;
        self.top_row_logical_index = top;
        self.reposition_rendered(ctx.positions);

        let changed = content_changed || old_range != self.visible_row_range();
        if changed {
            self.rows_changed(ctx);
        }
        self.debug_check_invariants();
        changed
    }

    /// Grow or shrink the rendered window to the current capacity.
    pub(crate) fn verify_escalator_count(&mut self, ctx: &mut BodyContext<'_>) -> bool {
        let top = self.top_row_logical_index;
        let reconciled = self.reconcile(&Some, top, ctx);
        let scrolled = self.update_rows_on_scroll(ctx);
        reconciled || scrolled
    }

    pub(crate) fn insert_rows(
        &mut self,
        index: usize,
        count: usize,
        attached: bool,
        ctx: &mut BodyContext<'_>,
    ) -> Result<()> {
        self.core.validate_insert(index, count)?;
        self.core.set_row_count(self.row_count() + count);
        let row_height = self.row_height();
        self.spacers
            .shift_by_rows(signed(index), signed(count), row_height);
        ctx.vertical.set_scroll_size(self.content_height());
        if attached {
            self.paint_insert_rows(index, count, ctx);
        } else {
            self.spacers.reposition(row_height, ctx.positions);
        }
        debug!(index, count, row_count = self.row_count(), "inserted body rows");
        Ok(())
    }

    fn paint_insert_rows(&mut self, index: usize, count: usize, ctx: &mut BodyContext<'_>) {
        let top = self.top_row_logical_index;
        let inserted_above_viewport = self.row_top(index) < self.scroll_top;
        let desired_top = if inserted_above_viewport {
            let y_delta = count as f64 * self.row_height();
            ctx.vertical.set_scroll_pos(self.scroll_top + y_delta);
            self.scroll_top = ctx.vertical.scroll_pos();
            if index <= top {
                top + count
            } else {
                top
            }
        } else {
            top
        };
        let shift = move |logical: usize| {
            Some(if logical >= index {
                logical + count
            } else {
                logical
            })
        };
        self.reconcile(&shift, desired_top, ctx);
        self.update_rows_on_scroll(ctx);
    }

    pub(crate) fn remove_rows(
        &mut self,
        index: usize,
        count: usize,
        attached: bool,
        ctx: &mut BodyContext<'_>,
    ) -> Result<()> {
        self.core.validate_remove(index, count)?;
        let removed = Range::of_rows(index, count);

        let metrics = self.metrics();
        let changes = self.spacers.remove_in(removed, metrics, ctx.positions);
        let mut scroll_delta = 0.0;
        for change in changes {
            if let RowShift::All { scroll_delta: delta } = change.shift {
                scroll_delta += delta;
            }
        }

        self.core.set_row_count(self.row_count() - count);
        let row_height = self.row_height();
        self.spacers
            .shift_by_rows(signed(index + count), -signed(count), row_height);

        let [above, _, _] = removed.partition_with(&self.visible_row_range());
        let removed_above = if self.visual_row_order.is_empty() {
            0
        } else {
            above.len()
        };
        scroll_delta -= removed_above as f64 * row_height;

        let target_scroll = self.scroll_top + scroll_delta;
        ctx.vertical.set_scroll_size(self.content_height());
        ctx.vertical.set_scroll_pos(target_scroll);
        self.scroll_top = ctx.vertical.scroll_pos();

        if attached {
            let end = index + count;
            let identity = move |logical: usize| {
                if logical < index {
                    Some(logical)
                } else if logical >= end {
                    Some(logical - count)
                } else {
                    None
                }
            };
            let desired_top = self.top_row_logical_index.saturating_sub(removed_above);
            self.reconcile(&identity, desired_top, ctx);
            self.update_rows_on_scroll(ctx);
        } else {
            self.spacers.reposition(row_height, ctx.positions);
        }
        debug!(index, count, row_count = self.row_count(), "removed body rows");
        Ok(())
    }

    /// Re-run the updater for rendered rows in `[index, index + count)`.
    pub(crate) fn refresh_rows(
        &mut self,
        index: usize,
        count: usize,
        columns: &ColumnConfiguration,
    ) -> Result<()> {
        self.core.validate_refresh(index, count)?;
        let refreshed = Range::of_rows(index, count).restrict_to(&self.visible_row_range());
        for logical in refreshed.iter() {
            let logical = crate::px::unsigned(logical);
            if let Some(element) = self.row_element_for(logical) {
                self.core.refresh_row(element, logical, columns);
            }
        }
        Ok(())
    }

    pub(crate) fn refresh_cells(&mut self, column_range: Range, columns: &ColumnConfiguration) {
        let rendered: Vec<ElementId> = self.visual_row_order.iter().copied().collect();
        for element in rendered {
            self.core.refresh_cells(element, column_range, columns);
        }
    }

    /// Apply a new default row height, keeping the relative scroll position.
    pub(crate) fn set_default_row_height(
        &mut self,
        px: f64,
        explicit: bool,
        ctx: &mut BodyContext<'_>,
    ) -> bool {
        let old_row_height = self.row_height();
        let old_content = self.content_height();
        let spacer_total = self.spacers.total_height();
        let spacer_above = self.spacers.sum_until_px(self.scroll_top, old_row_height);
        let row_content = old_content - spacer_total;
        let ratio = if row_content > 0.0 {
            (self.scroll_top - spacer_above) / row_content
        } else {
            0.0
        };

        if !self.core.set_default_row_height(px, explicit) {
            return false;
        }

        let new_row_content = self.content_height() - spacer_total;
        let new_scroll = self
            .spacers
            .px_for_row_px(ratio * new_row_content, px);
        ctx.vertical.set_scroll_size(self.content_height());
        ctx.vertical.set_scroll_pos(new_scroll);
        self.scroll_top = ctx.vertical.scroll_pos();

        let desired_top = self.logical_index_at(self.scroll_top);
        self.reconcile(&Some, desired_top, ctx);
        self.update_rows_on_scroll(ctx);
        debug!(
            old = old_row_height,
            new = px,
            scroll_top = self.scroll_top,
            "body row height changed"
        );
        true
    }

    /// Create, resize or remove the spacer below `row`.
    pub(crate) fn set_spacer(&mut self, row: i64, height: f64, ctx: &mut BodyContext<'_>) -> Result<()> {
        let metrics = self.metrics();
        let change = self
            .spacers
            .set_spacer(row, height, metrics, ctx.positions)?;
        if let Some(change) = change {
            self.apply_height_change(change, ctx);
        }
        Ok(())
    }

    fn apply_height_change(&mut self, change: HeightChange, ctx: &mut BodyContext<'_>) {
        let content = self.content_height();
        match change.shift {
            RowShift::After => ctx.vertical.set_scroll_size(content),
            RowShift::All { scroll_delta } => {
                // the scroll size must admit the new position before it is set
                if change.diff > 0.0 {
                    ctx.vertical.set_scroll_size(content);
                    ctx.vertical.set_scroll_pos(self.scroll_top + scroll_delta);
                } else {
                    ctx.vertical.set_scroll_pos(self.scroll_top + scroll_delta);
                    ctx.vertical.set_scroll_size(content);
                }
                self.scroll_top = ctx.vertical.scroll_pos();
            }
        }
        self.reposition_rendered(ctx.positions);
        trace!(row = change.row, diff = change.diff, "spacer height changed");
    }

    /// Spacers that became visible or hidden in the viewport.
    pub(crate) fn update_spacer_visibility(&mut self) -> Vec<(i64, bool)> {
        let row_height = self.row_height();
        self.spacers
            .update_visibility(self.scroll_top, self.section_height, row_height)
    }

    /// Resync physical order with visual order and return the moves made.
    /// Spacers next to rendered rows are shown, all others hidden.
    pub(crate) fn sort_dom_elements(&mut self) -> Vec<DomMove> {
        let mut ordered = Vec::with_capacity(self.visual_row_order.len() * 2);
        let mut displayed = HashSet::new();
        let top = signed(self.top_row_logical_index);
        if let Some(spacer) = self.spacers.get(top - 1) {
            ordered.push(spacer.root());
            displayed.insert(top - 1);
        }
        for (visual, element) in self.visual_row_order.iter().enumerate() {
            ordered.push(*element);
            let logical = top + signed(visual);
            if let Some(spacer) = self.spacers.get(logical) {
                ordered.push(spacer.root());
                displayed.insert(logical);
            }
        }
        let spacer_rows: Vec<i64> = self.spacers.iter().map(|s| s.row()).collect();
        for row in spacer_rows {
            let shown = displayed.contains(&row);
            self.spacers.set_displayed(row, shown);
            if !shown {
                if let Some(spacer) = self.spacers.get(row) {
                    ordered.push(spacer.root());
                }
            }
        }

        let focused = self.focused_row.filter(|f| ordered.contains(f));
        let mut moves = Vec::with_capacity(ordered.len());
        let mut before_focus = focused.is_none();
        for element in ordered.iter().rev() {
            if Some(*element) == focused {
                before_focus = true;
                continue;
            }
            match (before_focus, focused) {
                (false, Some(anchor)) => moves.push(DomMove::After {
                    element: *element,
                    anchor,
                }),
                _ => moves.push(DomMove::First { element: *element }),
            }
        }

        self.physical_order = ordered;
        self.dom_sorter.cancel();
        moves
    }

    /// Drive the deferred sort. Returns the moves if it ran.
    pub(crate) fn on_animation_frame(&mut self, now_ms: f64, touch_active: bool) -> Option<Vec<DomMove>> {
        if self.dom_sorter.on_frame(now_ms, touch_active) {
            Some(self.sort_dom_elements())
        } else {
            None
        }
    }

    /// Build the rendered window from scratch (on attach).
    pub(crate) fn attach(&mut self, ctx: &mut BodyContext<'_>) {
        ctx.vertical.set_scroll_size(self.content_height());
        self.verify_escalator_count(ctx);
    }

    /// Destroy every rendered row and forget the visual range.
    pub(crate) fn detach(&mut self, ctx: &mut BodyContext<'_>) {
        let rendered: Vec<ElementId> = self.visual_row_order.drain(..).collect();
        for element in rendered {
            self.destroy_row(element, ctx);
        }
        self.top_row_logical_index = 0;
        self.dom_sorter.cancel();
    }

    fn debug_check_invariants(&self) {
        debug_assert!(
            self.top_row_logical_index + self.visual_row_order.len() <= self.row_count(),
            "rendered range {}..{} exceeds row count {}",
            self.top_row_logical_index,
            self.top_row_logical_index + self.visual_row_order.len(),
            self.row_count()
        );
        debug_assert!(
            self.visual_row_order.len() <= self.max_visible_row_count(),
            "{} rendered rows exceed capacity {}",
            self.visual_row_order.len(),
            self.max_visible_row_count()
        );
    }
}

impl RowContainer for BodyRowContainer {
    fn rows(&self) -> &RowSection {
        &self.core
    }

    fn rendered_rows(&self) -> Vec<ElementId> {
        self.visual_row_order.iter().copied().collect()
    }

    fn row_can_be_frozen(&self, element: ElementId) -> bool {
        self.visual_row_order.contains(&element)
    }

    fn height_of_section(&self) -> f64 {
        self.section_height
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::layout::Direction;

    struct Fixture {
        columns: ColumnConfiguration,
        positions: PositionTracker,
        vertical: ScrollbarBundle,
        events: Vec<EscalatorEvent>,
        body: BodyRowContainer,
    }

    impl Fixture {
        fn new(rows: usize) -> Self {
            let mut columns = ColumnConfiguration::new(100.0);
            columns.insert(0, 2).unwrap();
            let mut vertical = ScrollbarBundle::new(Direction::Vertical, 15.0);
            vertical.set_offset_size(200.0);
            let mut f = Self {
                columns,
                positions: PositionTracker::new(),
                vertical,
                events: Vec::new(),
                body: BodyRowContainer::new(Some(20.0), 50.0, 3),
            };
            f.body.set_section_height(200.0);
            f.with_ctx(|body, ctx| body.attach(ctx));
            if rows > 0 {
                f.with_ctx(|body, ctx| body.insert_rows(0, rows, true, ctx).unwrap());
            }
            f.events.clear();
            f
        }

        fn with_ctx<R>(&mut self, op: impl FnOnce(&mut BodyRowContainer, &mut BodyContext<'_>) -> R) -> R {
            let mut ctx = BodyContext {
                columns: &self.columns,
                positions: &mut self.positions,
                scroll_left: 0.0,
                vertical: &mut self.vertical,
                now_ms: 0.0,
                events: &mut self.events,
            };
            op(&mut self.body, &mut ctx)
        }

        fn scroll_to(&mut self, px: f64) {
            self.vertical.set_scroll_pos(px);
            let top = self.vertical.scroll_pos();
            self.body.set_body_scroll_position(0.0, top);
            self.with_ctx(|body, ctx| body.update_rows_on_scroll(ctx));
        }

        fn logical_indices(&self) -> Vec<usize> {
            self.body
                .visual_row_order()
                .iter()
                .map(|e| self.body.logical_index_of(*e).unwrap())
                .collect()
        }
    }

    #[test]
    fn test_capacity_and_initial_window() {
        let f = Fixture::new(1000);
        assert_eq!(f.body.max_visible_row_count(), 12);
        assert_eq!(f.body.visual_row_order().len(), 12);
        assert_eq!(f.body.top_row_logical_index(), 0);
        assert_eq!(f.logical_indices(), (0..12).collect::<Vec<_>>());
    }

    #[test]
    fn test_small_scroll_recycles_from_top() {
        let mut f = Fixture::new(1000);
        let before: Vec<ElementId> = f.body.visual_row_order().iter().copied().collect();
        f.scroll_to(45.0);
        assert_eq!(f.body.top_row_logical_index(), 2);
        assert_eq!(f.logical_indices(), (2..14).collect::<Vec<_>>());
        let after = f.body.visual_row_order();
        assert_eq!(after[10], before[0]);
        assert_eq!(after[11], before[1]);
        assert_eq!(f.positions.top(after[10]), 240.0);
    }

    #[test]
    fn test_scroll_up_recycles_from_bottom() {
        let mut f = Fixture::new(1000);
        f.scroll_to(1000.0);
        assert_eq!(f.body.top_row_logical_index(), 50);
        f.scroll_to(950.0);
        assert_eq!(f.body.top_row_logical_index(), 47);
        assert_eq!(f.logical_indices(), (47..59).collect::<Vec<_>>());
    }

    #[test]
    fn test_scroll_to_bottom_stays_in_bounds() {
        let mut f = Fixture::new(100);
        f.scroll_to(10_000.0);
        assert_eq!(f.vertical.scroll_pos(), 1800.0);
        assert_eq!(f.body.top_row_logical_index(), 88);
        assert_eq!(f.logical_indices().last(), Some(&99));
    }

    #[test]
    fn test_physical_order_lags_until_sorted() {
        let mut f = Fixture::new(1000);
        f.body.sort_dom_elements();
        f.scroll_to(45.0);
        let visual: Vec<ElementId> = f.body.visual_row_order().iter().copied().collect();
        assert_ne!(f.body.physical_order(), visual.as_slice());
        assert!(f.body.dom_sorter().is_pending());
        let moves = f.body.sort_dom_elements();
        assert_eq!(f.body.physical_order(), visual.as_slice());
        assert_eq!(moves.len(), 12);
        assert_eq!(f.body.visual_to_physical(3), Some(3));
    }

    #[test]
    fn test_sort_pivots_around_focused_row() {
        let mut f = Fixture::new(1000);
        f.scroll_to(45.0);
        let focused = f.body.visual_row_order()[4];
        f.body.set_focused_row(Some(focused));
        let moves = f.body.sort_dom_elements();
        assert_eq!(moves.len(), 11);
        assert!(moves.iter().all(|m| match m {
            DomMove::First { element } | DomMove::After { element, .. } => *element != focused,
        }));
        let after_focus = moves
            .iter()
            .filter(|m| matches!(m, DomMove::After { .. }))
            .count();
        assert_eq!(after_focus, 7);
    }

    #[test]
    fn test_remove_inside_window_refills() {
        let mut f = Fixture::new(1000);
        f.with_ctx(|body, ctx| body.remove_rows(3, 2, true, ctx).unwrap());
        assert_eq!(f.body.row_count(), 998);
        assert_eq!(f.logical_indices(), (0..12).collect::<Vec<_>>());
    }

    #[test]
    fn test_remove_everything() {
        let mut f = Fixture::new(30);
        f.scroll_to(200.0);
        f.with_ctx(|body, ctx| body.remove_rows(0, 30, true, ctx).unwrap());
        assert!(f.body.visual_row_order().is_empty());
        assert_eq!(f.body.visible_row_range(), Range::with_length(0, 0));
        assert_eq!(f.vertical.scroll_pos(), 0.0);
        // every rendered row was destroyed and forgotten
        assert!(f.positions.is_empty() || f.body.physical_order().is_empty());
    }

    #[test]
    fn test_few_rows_render_all() {
        let f = Fixture::new(5);
        assert_eq!(f.body.visual_row_order().len(), 5);
        assert_eq!(f.body.visible_row_range(), Range::between(0, 5));
    }

    #[test]
    fn test_spacer_pushes_rows_below() {
        let mut f = Fixture::new(100);
        let row3 = f.body.row_element_for(3).unwrap();
        let row4 = f.body.row_element_for(4).unwrap();
        f.with_ctx(|body, ctx| body.set_spacer(3, 25.0, ctx).unwrap());
        assert_eq!(f.positions.top(row3), 60.0);
        assert_eq!(f.positions.top(row4), 105.0);
        assert_eq!(f.vertical.scroll_size(), 2025.0);
        assert_eq!(f.body.logical_index_at(70.0), 3);
        assert_eq!(f.body.logical_index_at(105.0), 4);
    }
}
