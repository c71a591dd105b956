//! The escalator: header, body and footer sections over one column
//! configuration, scrolled by a vertical and a horizontal scrollbar bundle.
//!
//! Every public mutator validates first, applies the change to the row
//! containers, then re-derives element sizes and runs the scroll handler
//! so that the rendered window always covers the viewport when the call
//! returns. Work that needs a settled layout (row height detection, auto
//! column widths) is queued for [`Escalator::flush_deferred`].

mod scroll_to;
mod scroller;
mod snapshot;
mod subpart;

use tracing::{debug, warn};

use crate::clock::{Clock, SystemClock};
use crate::config::{EscalatorConfig, HeightMode};
use crate::container::{
    BodyContext, BodyRowContainer, DomMove, PaintContext, RowContainer, RowSection, Section,
    StaticRowContainer,
};
use crate::error::{EscalatorError, Result};
use crate::event::EscalatorEvent;
use crate::layout::{
    ColumnConfiguration, Direction, PositionTracker, ScrollbarBundle, Viewport,
};
use crate::px::EPSILON;
use crate::range::Range;
use crate::updater::{EscalatorUpdater, FixedMeasurer, Measurer, SpacerUpdater};

pub use scroller::{snap_deltas, WheelDeltaMode};
pub use snapshot::{RowSnapshot, Snapshot, SpacerSnapshot};
pub use subpart::{SubPart, SubPartArguments};

pub struct Escalator {
    header: StaticRowContainer,
    body: BodyRowContainer,
    footer: StaticRowContainer,
    columns: ColumnConfiguration,
    positions: PositionTracker,
    vertical: ScrollbarBundle,
    horizontal: ScrollbarBundle,
    viewport: Viewport,
    height_mode: HeightMode,
    height_by_rows: f64,
    height_by_css: f64,
    attached: bool,
    touch_active: bool,
    last_touch: Option<(f64, f64)>,
    last_scroll_top: f64,
    last_scroll_left: f64,
    measurer: Box<dyn Measurer>,
    clock: Box<dyn Clock>,
    events: Vec<EscalatorEvent>,
}

impl std::fmt::Debug for Escalator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Escalator")
            .field("header", &self.header)
            .field("body", &self.body)
            .field("footer", &self.footer)
            .field("viewport", &self.viewport)
            .field("height_mode", &self.height_mode)
            .field("attached", &self.attached)
            .finish_non_exhaustive()
    }
}

impl Escalator {
    pub fn new(config: EscalatorConfig) -> Result<Self> {
        Self::with_environment(
            config,
            Box::new(FixedMeasurer::default()),
            Box::new(SystemClock::default()),
        )
    }

    /// Build an escalator with host-supplied measurement and time sources.
    pub fn with_environment(
        config: EscalatorConfig,
        measurer: Box<dyn Measurer>,
        clock: Box<dyn Clock>,
    ) -> Result<Self> {
        config.validate()?;
        let heights = config.default_row_height;
        Ok(Self {
            header: StaticRowContainer::new(Section::Header, heights.header),
            body: BodyRowContainer::new(
                heights.body,
                config.dom_sort_delay_ms,
                config.dom_sort_frames,
            ),
            footer: StaticRowContainer::new(Section::Footer, heights.footer),
            columns: ColumnConfiguration::new(config.default_column_width),
            positions: PositionTracker::new(),
            vertical: ScrollbarBundle::new(Direction::Vertical, config.scrollbar_thickness),
            horizontal: ScrollbarBundle::new(Direction::Horizontal, config.scrollbar_thickness),
            viewport: Viewport::new(config.width, config.height),
            height_mode: config.height_mode,
            height_by_rows: config.height_by_rows,
            height_by_css: config.height,
            attached: false,
            touch_active: false,
            last_touch: None,
            last_scroll_top: 0.0,
            last_scroll_left: 0.0,
            measurer,
            clock,
            events: Vec::new(),
        })
    }

    // ===== Accessors =====

    pub fn header(&self) -> &StaticRowContainer {
        &self.header
    }

    pub fn body(&self) -> &BodyRowContainer {
        &self.body
    }

    pub fn footer(&self) -> &StaticRowContainer {
        &self.footer
    }

    pub fn section(&self, section: Section) -> &dyn RowContainer {
        match section {
            Section::Header => &self.header,
            Section::Body => &self.body,
            Section::Footer => &self.footer,
        }
    }

    pub fn columns(&self) -> &ColumnConfiguration {
        &self.columns
    }

    /// Offsets assigned to every managed element.
    pub fn positions(&self) -> &PositionTracker {
        &self.positions
    }

    pub fn vertical_scrollbar(&self) -> &ScrollbarBundle {
        &self.vertical
    }

    pub fn horizontal_scrollbar(&self) -> &ScrollbarBundle {
        &self.horizontal
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Take the events queued since the last call.
    pub fn drain_events(&mut self) -> Vec<EscalatorEvent> {
        std::mem::take(&mut self.events)
    }

    // ===== Context plumbing =====

    fn body_op<R>(
        &mut self,
        op: impl FnOnce(&mut BodyRowContainer, &mut BodyContext<'_>) -> R,
    ) -> R {
        let mut ctx = BodyContext {
            columns: &self.columns,
            positions: &mut self.positions,
            scroll_left: self.horizontal.scroll_pos(),
            vertical: &mut self.vertical,
            now_ms: self.clock.now_ms(),
            events: &mut self.events,
        };
        op(&mut self.body, &mut ctx)
    }

    fn static_op<R>(
        &mut self,
        section: Section,
        op: impl FnOnce(&mut StaticRowContainer, &mut PaintContext<'_>) -> R,
    ) -> R {
        let container = match section {
            Section::Footer => &mut self.footer,
            Section::Header | Section::Body => &mut self.header,
        };
        let mut ctx = PaintContext {
            columns: &self.columns,
            positions: &mut self.positions,
            scroll_left: self.horizontal.scroll_pos(),
        };
        op(container, &mut ctx)
    }

    /// Run `op` on the shared bookkeeping of all three sections.
    fn for_each_core(&mut self, mut op: impl FnMut(&mut RowSection, &PaintContext<'_>)) {
        let ctx = PaintContext {
            columns: &self.columns,
            positions: &mut self.positions,
            scroll_left: self.horizontal.scroll_pos(),
        };
        op(self.header.core_mut(), &ctx);
        op(self.body.core_mut(), &ctx);
        op(self.footer.core_mut(), &ctx);
    }

    // ===== Rows =====

    pub fn row_count(&self, section: Section) -> usize {
        self.section(section).row_count()
    }

    pub fn set_updater(&mut self, section: Section, updater: Box<dyn EscalatorUpdater>) {
        match section {
            Section::Header => self.header.set_updater(updater),
            Section::Body => self.body.set_updater(updater),
            Section::Footer => self.footer.set_updater(updater),
        }
        let rows = self.row_count(section);
        if rows > 0 {
            // every rendered row gets repopulated by the new updater
            if let Err(e) = self.refresh_rows(section, 0, rows) {
                warn!(error = %e, "refreshing rows for a new updater failed");
            }
        }
    }

    pub fn insert_rows(&mut self, section: Section, index: usize, count: usize) -> Result<()> {
        let attached = self.attached;
        let was_empty = self.row_count(section) == 0;
        match section {
            Section::Body => self.body_op(|body, ctx| body.insert_rows(index, count, attached, ctx))?,
            Section::Header | Section::Footer => self.static_op(section, |container, ctx| {
                container.insert_rows(index, count, attached, ctx)
            })?,
        }
        if attached && was_empty {
            self.core_mut(section).autodetect_row_height_later();
        }
        self.recalculate_element_sizes();
        Ok(())
    }

    pub fn remove_rows(&mut self, section: Section, index: usize, count: usize) -> Result<()> {
        let attached = self.attached;
        match section {
            Section::Body => self.body_op(|body, ctx| body.remove_rows(index, count, attached, ctx))?,
            Section::Header | Section::Footer => self.static_op(section, |container, ctx| {
                container.remove_rows(index, count, ctx)
            })?,
        }
        self.recalculate_element_sizes();
        Ok(())
    }

    /// Re-run the updater for rows `[index, index + count)`. Rows the body
    /// does not render are skipped.
    pub fn refresh_rows(&mut self, section: Section, index: usize, count: usize) -> Result<()> {
        match section {
            Section::Body => self.body.refresh_rows(index, count, &self.columns),
            Section::Header => self.header.refresh_rows(index, count, &self.columns),
            Section::Footer => self.footer.refresh_rows(index, count, &self.columns),
        }
    }

    pub fn default_row_height(&self, section: Section) -> f64 {
        self.section(section).default_row_height()
    }

    pub fn set_default_row_height(&mut self, section: Section, px: f64) -> Result<()> {
        RowSection::check_row_height(px)?;
        self.apply_row_height(section, px, true);
        Ok(())
    }

    fn apply_row_height(&mut self, section: Section, px: f64, explicit: bool) {
        let changed = match section {
            Section::Body if self.attached => {
                self.body_op(|body, ctx| body.set_default_row_height(px, explicit, ctx))
            }
            Section::Body => self.body.core_mut().set_default_row_height(px, explicit),
            Section::Header => self
                .header
                .set_default_row_height(px, explicit, &mut self.positions),
            Section::Footer => self
                .footer
                .set_default_row_height(px, explicit, &mut self.positions),
        };
        if changed {
            debug!(?section, px, explicit, "default row height changed");
            self.events
                .push(EscalatorEvent::RowHeightChanged { section, height: px });
            self.recalculate_element_sizes();
        }
    }

    fn core_mut(&mut self, section: Section) -> &mut RowSection {
        match section {
            Section::Header => self.header.core_mut(),
            Section::Body => self.body.core_mut(),
            Section::Footer => self.footer.core_mut(),
        }
    }

    // ===== Columns =====

    pub fn column_count(&self) -> usize {
        self.columns.column_count()
    }

    pub fn frozen_column_count(&self) -> usize {
        self.columns.frozen_column_count()
    }

    pub fn insert_columns(&mut self, index: usize, count: usize) -> Result<()> {
        self.columns.insert(index, count)?;
        self.for_each_core(|core, ctx| core.insert_cells(index, count, ctx));

        let left_of_insert = self.columns.left_of(index);
        let inserted_width = self
            .columns
            .calculated_columns_width(Range::of_rows(index, count));
        let scroll_left = self.horizontal.scroll_pos();
        self.recalculate_element_sizes();
        if scroll_left > left_of_insert {
            self.horizontal.set_scroll_pos(scroll_left + inserted_width);
            self.on_scroll();
        }
        debug!(index, count, columns = self.columns.column_count(), "inserted columns");
        Ok(())
    }

    pub fn remove_columns(&mut self, index: usize, count: usize) -> Result<()> {
        self.columns.validate_remove(index, count)?;
        let left_of_first = self.columns.left_of(index);
        let scroll_left = self.horizontal.scroll_pos();
        let removed_width = self.columns.remove(index, count)?;
        self.for_each_core(|core, ctx| core.remove_cells(index, count, ctx));

        self.recalculate_element_sizes();
        if scroll_left > left_of_first {
            self.horizontal
                .set_scroll_pos(left_of_first.max(scroll_left - removed_width));
            self.on_scroll();
        }
        debug!(index, count, columns = self.columns.column_count(), "removed columns");
        Ok(())
    }

    /// Re-run the updater for columns `[index, index + count)` of every
    /// rendered row.
    pub fn refresh_columns(&mut self, index: usize, count: usize) -> Result<()> {
        if count < 1 {
            return Err(EscalatorError::IllegalArgument(format!(
                "Number of columns must be 1 or greater (was {count})"
            )));
        }
        let column_count = self.columns.column_count();
        if index + count > column_count {
            return Err(EscalatorError::out_of_bounds(
                "Column",
                index + count,
                0,
                column_count + 1,
            ));
        }
        let range = Range::of_rows(index, count);
        self.header.refresh_cells(range, &self.columns);
        self.body.refresh_cells(range, &self.columns);
        self.footer.refresh_cells(range, &self.columns);
        Ok(())
    }

    pub fn set_frozen_column_count(&mut self, count: usize) -> Result<()> {
        let flipped = self.columns.set_frozen_column_count(count)?;
        let scroll_left = self.horizontal.scroll_pos();
        self.for_each_core(|core, _| {
            for column in flipped.iter() {
                let column = crate::px::unsigned(column);
                core.set_column_frozen(column, column < count, scroll_left);
            }
            core.set_last_frozen(count);
        });
        self.recalculate_element_sizes();
        Ok(())
    }

    /// Width in effect for `index`.
    pub fn column_width(&self, index: usize) -> Result<f64> {
        match self.columns.column(index) {
            Some(column) => Ok(column.calculated_width),
            None => Err(EscalatorError::out_of_bounds(
                "Column",
                index,
                0,
                self.columns.column_count(),
            )),
        }
    }

    /// Set a column width. A negative width measures the column from its
    /// content, now if attached and otherwise once attached.
    pub fn set_column_width(&mut self, index: usize, px: f64) -> Result<()> {
        self.columns.set_defined_width(index, px)?;
        if px < 0.0 && self.attached {
            self.measure_column(index);
        }
        self.reapply_column_widths();
        Ok(())
    }

    /// Set several column widths with one relayout.
    pub fn set_column_widths(&mut self, widths: &[(usize, f64)]) -> Result<()> {
        for (index, px) in widths {
            if self.columns.column(*index).is_none() {
                return Err(EscalatorError::out_of_bounds(
                    "Column",
                    *index,
                    0,
                    self.columns.column_count(),
                ));
            }
            if !px.is_finite() {
                return Err(EscalatorError::IllegalArgument(format!(
                    "Column width must be finite, got {px}"
                )));
            }
        }
        for (index, px) in widths {
            self.columns.set_defined_width(*index, *px)?;
            if *px < 0.0 && self.attached {
                self.measure_column(*index);
            }
        }
        self.reapply_column_widths();
        Ok(())
    }

    /// Narrowest width the cells of `index` can take, content ignored.
    pub fn min_cell_width(&mut self, index: usize) -> f64 {
        self.max_cell_width_in_sections(index, false)
    }

    fn max_cell_width_in_sections(&mut self, index: usize, with_content: bool) -> f64 {
        let measurer = self.measurer.as_mut();
        let header = self.header.rows().min_cell_width(index, measurer, with_content);
        let body = self.body.rows().min_cell_width(index, measurer, with_content);
        let footer = self.footer.rows().min_cell_width(index, measurer, with_content);
        header.max(body).max(footer)
    }

    fn measure_column(&mut self, index: usize) {
        let measured = self.max_cell_width_in_sections(index, true);
        if measured > 0.0 {
            self.columns.set_measured_width(index, measured);
        } else {
            // nothing rendered to measure: keep the current width
            let current = self.columns.width(index);
            self.columns.set_measured_width(index, current);
        }
        debug!(index, width = self.columns.width(index), "measured column");
    }

    fn reapply_column_widths(&mut self) {
        self.header.core_mut().reapply_column_widths(&self.columns);
        self.body.core_mut().reapply_column_widths(&self.columns);
        self.footer.core_mut().reapply_column_widths(&self.columns);
        self.recalculate_element_sizes();
    }

    // ===== Spacers =====

    pub fn set_spacer_updater(&mut self, updater: Box<dyn SpacerUpdater>) {
        self.body.set_spacer_updater(updater);
    }

    /// Create or resize the spacer below `row`. A negative height removes it.
    pub fn set_spacer(&mut self, row: i64, height: f64) -> Result<()> {
        self.body_op(|body, ctx| body.set_spacer(row, height, ctx))?;
        self.recalculate_element_sizes();
        if !self.attached {
            self.on_scroll();
        }
        Ok(())
    }

    pub fn spacer_exists(&self, row: i64) -> bool {
        self.body.spacers().exists(row)
    }

    // ===== Scrolling =====

    pub fn scroll_top(&self) -> f64 {
        self.vertical.scroll_pos()
    }

    pub fn scroll_left(&self) -> f64 {
        self.horizontal.scroll_pos()
    }

    pub fn set_scroll_top(&mut self, px: f64) {
        self.vertical.set_scroll_pos(px);
        self.on_scroll();
    }

    pub fn set_scroll_left(&mut self, px: f64) {
        self.horizontal.set_scroll_pos(px);
        self.on_scroll();
    }

    /// Scrollable width of the horizontal axis.
    pub fn scroll_width(&self) -> f64 {
        self.horizontal.scroll_size()
    }

    /// Scrollable height of the body.
    pub fn scroll_height(&self) -> f64 {
        self.vertical.scroll_size()
    }

    pub fn set_scroll_locked(&mut self, direction: Direction, locked: bool) {
        match direction {
            Direction::Vertical => self.vertical.set_locked(locked),
            Direction::Horizontal => self.horizontal.set_locked(locked),
        }
    }

    pub fn is_scroll_locked(&self, direction: Direction) -> bool {
        match direction {
            Direction::Vertical => self.vertical.is_locked(),
            Direction::Horizontal => self.horizontal.is_locked(),
        }
    }

    /// Logical range of the rendered body rows.
    pub fn visible_row_range(&self) -> Range {
        self.body.visible_row_range()
    }

    /// Rendered body row capacity.
    pub fn max_visible_row_count(&self) -> usize {
        self.body.max_visible_row_count()
    }

    /// Width of the table area, without the vertical scrollbar.
    pub fn inner_width(&self) -> f64 {
        self.viewport.inner_width
    }

    // ===== Sizing =====

    pub fn set_size(&mut self, width: f64, height: f64) -> Result<()> {
        for (name, value) in [("width", width), ("height", height)] {
            if !value.is_finite() || value < 0.0 {
                return Err(EscalatorError::IllegalArgument(format!(
                    "{name} must be a non-negative finite number, got {value}"
                )));
            }
        }
        self.height_by_css = height;
        self.viewport.resize(width, self.viewport.height);
        if self.height_mode == HeightMode::Css {
            self.viewport.resize(width, height);
        }
        self.recalculate_element_sizes();
        Ok(())
    }

    pub fn height_mode(&self) -> HeightMode {
        self.height_mode
    }

    pub fn set_height_mode(&mut self, mode: HeightMode) {
        if mode != self.height_mode {
            debug!(?mode, "height mode changed");
            self.height_mode = mode;
            if mode == HeightMode::Css {
                self.viewport.resize(self.viewport.width, self.height_by_css);
            }
            self.recalculate_element_sizes();
        }
    }

    pub fn height_by_rows(&self) -> f64 {
        self.height_by_rows
    }

    /// Rows the body shows in [`HeightMode::Row`]. Remembered in other modes.
    pub fn set_height_by_rows(&mut self, rows: f64) -> Result<()> {
        if rows.is_nan() {
            return Err(EscalatorError::IllegalArgument(
                "The number must not be NaN.".to_string(),
            ));
        }
        if rows <= 0.0 {
            return Err(EscalatorError::IllegalArgument(
                "The number of rows must be a positive number.".to_string(),
            ));
        }
        if rows.is_infinite() {
            return Err(EscalatorError::IllegalArgument(
                "The number of rows must be finite.".to_string(),
            ));
        }
        self.height_by_rows = rows;
        self.recalculate_element_sizes();
        Ok(())
    }

    /// Outer height demanded by the active height mode.
    fn derived_height(&self) -> f64 {
        let header = self.header.height_of_section();
        let footer = self.footer.height_of_section();
        let scrollbar = self.horizontal.occupied_thickness();
        match self.height_mode {
            HeightMode::Css => self.height_by_css,
            HeightMode::Row => {
                header + self.body.default_row_height() * self.height_by_rows + scrollbar + footer
            }
            HeightMode::Undefined => header + self.body.content_height() + scrollbar + footer,
        }
    }

    /// Re-derive the outer height, the scrollbars and the body capacity.
    fn recalculate_element_sizes(&mut self) {
        if !self.attached {
            return;
        }
        // the row-based heights depend on the horizontal scrollbar and the
        // scrollbar on the height; two rounds settle it
        for _ in 0..2 {
            let horizontal_shown = self.horizontal.shows_scroll_handle();
            let height = self.derived_height();
            self.viewport.resize(self.viewport.width, height);
            self.recalculate_scrollbars();
            if self.horizontal.shows_scroll_handle() == horizontal_shown {
                break;
            }
        }
        self.body_op(|body, ctx| body.verify_escalator_count(ctx));
        self.on_scroll();
    }

    // ===== Lifecycle =====

    /// Render the sections and lay everything out.
    pub fn attach(&mut self) {
        if self.attached {
            return;
        }
        self.attached = true;
        for section in [Section::Header, Section::Body, Section::Footer] {
            self.core_mut(section).autodetect_row_height_later();
        }
        self.static_op(Section::Header, |header, ctx| header.paint_all(ctx));
        self.static_op(Section::Footer, |footer, ctx| footer.paint_all(ctx));
        let height = self.derived_height();
        self.viewport.resize(self.viewport.width, height);
        self.recalculate_scrollbars();
        self.body_op(|body, ctx| body.attach(ctx));
        self.recalculate_element_sizes();
        debug!(width = self.viewport.width, height = self.viewport.height, "attached");
    }

    /// Destroy every rendered row. Logical state is kept.
    pub fn detach(&mut self) {
        if !self.attached {
            return;
        }
        self.body_op(|body, ctx| body.detach(ctx));
        self.static_op(Section::Header, |header, ctx| header.destroy_all(ctx));
        self.static_op(Section::Footer, |footer, ctx| footer.destroy_all(ctx));
        self.attached = false;
        debug!("detached");
    }

    /// End-of-turn hook: run queued row height detection and column
    /// measurement. Returns whether anything was done.
    pub fn flush_deferred(&mut self) -> bool {
        if !self.attached {
            return false;
        }
        let mut worked = false;
        for section in [Section::Header, Section::Body, Section::Footer] {
            if !self.core_mut(section).take_autodetect() {
                continue;
            }
            worked = true;
            let px = self.measurer.probe_row_height(section);
            if RowSection::check_row_height(px).is_ok() {
                self.apply_row_height(section, px, false);
            } else {
                warn!(?section, px, "probed row height is unusable, keeping the current one");
            }
        }
        let pending = self.columns.columns_pending_measurement();
        if !pending.is_empty() {
            worked = true;
            for index in pending {
                self.measure_column(index);
            }
            self.reapply_column_widths();
        }
        worked
    }

    /// Advance the DOM resync debouncer by one animation frame. Returns the
    /// element moves to replay when the resync ran.
    pub fn on_animation_frame(&mut self) -> Vec<DomMove> {
        let now_ms = self.clock.now_ms();
        self.body
            .on_animation_frame(now_ms, self.touch_active)
            .unwrap_or_default()
    }

    /// A touch gesture holds back the DOM resync until it ends.
    pub fn set_touch_active(&mut self, active: bool) {
        self.touch_active = active;
        if !active {
            self.last_touch = None;
        }
    }

    /// Pivot of the DOM resync: the rendered body row showing `logical`.
    pub fn set_focused_row(&mut self, logical: Option<usize>) {
        let element = logical.and_then(|l| self.body.row_element_for(l));
        self.body.set_focused_row(element);
    }

    /// Whether debounced or deferred work is still outstanding.
    pub fn is_work_pending(&self) -> bool {
        let autodetect = [Section::Header, Section::Body, Section::Footer]
            .into_iter()
            .any(|s| self.section(s).rows().is_autodetect_pending());
        self.body.dom_sorter().is_pending()
            || self.vertical.is_work_pending()
            || self.horizontal.is_work_pending()
            || (self.attached && autodetect)
            || (self.attached && !self.columns.columns_pending_measurement().is_empty())
    }

    /// Header and footer follow the horizontal scroll, the body sits
    /// between them and the footer hugs short content.
    fn position_section_roots(&mut self) {
        let scroll_left = self.horizontal.scroll_pos();
        let header_height = self.header.height_of_section();
        let body_height = self.body_area_height().min(self.body.content_height());
        self.positions.set(self.header.root(), -scroll_left, 0.0);
        self.positions.set(self.body.root(), 0.0, header_height);
        self.positions
            .set(self.footer.root(), -scroll_left, header_height + body_height);
    }

    fn push_scrollbar_events(&mut self) {
        for bundle in [&mut self.vertical, &mut self.horizontal] {
            if let Some(visible) = bundle.take_visibility_change() {
                self.events.push(EscalatorEvent::ScrollbarVisibilityChanged {
                    direction: bundle.direction(),
                    visible,
                });
            }
        }
    }

    /// Width of the content compared against the viewport.
    fn content_width(&self) -> f64 {
        self.columns.total_width()
    }

    fn body_area_height(&self) -> f64 {
        self.viewport.body_height(
            self.header.height_of_section(),
            self.footer.height_of_section(),
        )
    }

    fn needs_vertical(&self, content_height: f64, height: f64) -> bool {
        content_height
            > height + EPSILON - self.header.height_of_section() - self.footer.height_of_section()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::config::RowHeights;

    fn escalator(rows: usize) -> Escalator {
        let config = EscalatorConfig {
            width: 500.0,
            height: 215.0,
            default_row_height: RowHeights {
                header: Some(20.0),
                body: Some(20.0),
                footer: Some(20.0),
            },
            ..EscalatorConfig::default()
        };
        let mut e = Escalator::with_environment(
            config,
            Box::new(FixedMeasurer::default()),
            Box::new(ManualClock::new()),
        )
        .unwrap();
        e.insert_columns(0, 3).unwrap();
        e.insert_rows(Section::Body, 0, rows).unwrap();
        e.attach();
        e.flush_deferred();
        e
    }

    #[test]
    fn test_attach_builds_window() {
        let e = escalator(1000);
        // 215 - 15 (horizontal scrollbar absent) leaves 215 for the body
        assert!(!e.horizontal_scrollbar().shows_scroll_handle());
        assert_eq!(e.max_visible_row_count(), 13);
        assert_eq!(e.body().visual_row_order().len(), 13);
        assert_eq!(e.visible_row_range(), Range::between(0, 13));
    }

    #[test]
    fn test_header_shrinks_body_area() {
        let mut e = escalator(1000);
        e.insert_rows(Section::Header, 0, 1).unwrap();
        assert_eq!(e.vertical_scrollbar().offset_size(), 195.0);
        assert_eq!(e.positions().top(e.body().root()), 20.0);
        assert_eq!(e.max_visible_row_count(), 12);
    }

    #[test]
    fn test_detach_resets_window() {
        let mut e = escalator(100);
        e.set_scroll_top(400.0);
        e.detach();
        assert!(e.body().visual_row_order().is_empty());
        assert_eq!(e.body().top_row_logical_index(), 0);
        assert_eq!(e.row_count(Section::Body), 100);
    }

    #[test]
    fn test_height_by_rows_drives_height() {
        let mut e = escalator(100);
        e.insert_rows(Section::Header, 0, 1).unwrap();
        e.set_height_mode(HeightMode::Row);
        e.set_height_by_rows(5.0).unwrap();
        assert_eq!(e.viewport().height, 120.0);
        assert_eq!(e.vertical_scrollbar().offset_size(), 100.0);
        assert!(e.set_height_by_rows(0.0).is_err());
        assert!(e.set_height_by_rows(f64::INFINITY).is_err());
        assert!(e.set_height_by_rows(f64::NAN).is_err());
    }

    #[test]
    fn test_undefined_height_fits_content() {
        let mut e = escalator(4);
        e.set_height_mode(HeightMode::Undefined);
        assert_eq!(e.viewport().height, 80.0);
        assert!(!e.vertical_scrollbar().shows_scroll_handle());
        e.set_height_mode(HeightMode::Css);
        assert_eq!(e.viewport().height, 215.0);
    }

    #[test]
    fn test_column_insert_scroll_compensation() {
        let mut e = escalator(10);
        e.insert_columns(3, 5).unwrap();
        e.set_scroll_left(300.0);
        assert_eq!(e.scroll_left(), 300.0);
        e.insert_columns(0, 1).unwrap();
        assert_eq!(e.scroll_left(), 400.0);
        e.remove_columns(0, 2).unwrap();
        assert_eq!(e.scroll_left(), 200.0);
    }

    #[test]
    fn test_frozen_columns_pin_cells() {
        let mut e = escalator(10);
        e.insert_columns(3, 5).unwrap();
        e.set_frozen_column_count(1).unwrap();
        e.set_scroll_left(150.0);
        let row = e.body().row_element_for(0).unwrap();
        let cells = &e.body().row_element(row).unwrap().cells;
        assert!(cells[0].frozen && cells[0].last_frozen);
        assert_eq!(cells[0].offset_left, 150.0);
        assert!(!cells[1].frozen);
        assert_eq!(e.positions().left(e.header().root()), -150.0);
        assert_eq!(e.horizontal_scrollbar().position(), 100.0);
    }

    #[test]
    fn test_auto_width_measured_on_flush() {
        let config = EscalatorConfig::default();
        let measurer = FixedMeasurer {
            row_height: 24.0,
            cell_width: 70.0,
        };
        let mut e =
            Escalator::with_environment(config, Box::new(measurer), Box::new(ManualClock::new()))
                .unwrap();
        e.insert_columns(0, 2).unwrap();
        e.insert_rows(Section::Body, 0, 5).unwrap();
        e.set_column_width(1, -1.0).unwrap();
        e.attach();
        assert!(e.is_work_pending());
        assert!(e.flush_deferred());
        assert_eq!(e.default_row_height(Section::Body), 24.0);
        assert_eq!(e.column_width(1).unwrap(), 70.0);
        assert_eq!(e.column_width(0).unwrap(), 100.0);
        assert!(e
            .drain_events()
            .iter()
            .any(|ev| matches!(ev, EscalatorEvent::RowHeightChanged { section: Section::Body, .. })));
    }

    #[test]
    fn test_refresh_columns_validates() {
        let mut e = escalator(10);
        assert!(e.refresh_columns(0, 3).is_ok());
        assert!(e.refresh_columns(2, 2).is_err());
        assert!(e.refresh_columns(0, 0).is_err());
    }
}
