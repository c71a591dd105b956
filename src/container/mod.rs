//! Row containers: the header, body and footer sections of the escalator.
//!
//! Every section shares the bookkeeping in [`RowSection`]: the logical row
//! count, the default row height, the cell updater and the rendered row
//! elements with their cells. [`StaticRowContainer`] renders every row it
//! has; [`BodyRowContainer`] renders a bounded window and recycles it.

mod body;
mod dom_sort;
mod spacer;
mod static_section;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::INITIAL_DEFAULT_ROW_HEIGHT;
use crate::error::{EscalatorError, Result};
use crate::layout::{ColumnConfiguration, PositionTracker};
use crate::range::Range;
use crate::updater::{EscalatorUpdater, FlyweightCell, FlyweightRow, Measurer, NullUpdater};

pub use body::{BodyRowContainer, DomMove};
pub use dom_sort::{DomSortState, DomSorter};
pub use spacer::{Spacer, SpacerContainer, SpacerInclusion};
pub use static_section::StaticRowContainer;

pub(crate) use body::BodyContext;

/// The three sections of an escalator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Header,
    Body,
    Footer,
}

impl Section {
    /// Sub-part name of the section's cells.
    pub fn sub_part_name(self) -> &'static str {
        match self {
            Section::Header => "header",
            Section::Body => "cell",
            Section::Footer => "footer",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    /// The section root itself (`thead`, `tbody`, `tfoot`).
    SectionRoot,
    Row,
    Spacer,
    SpacerDeco,
}

/// Handle of a rendered element. Stable for the element's whole lifetime,
/// never reused by its section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ElementId {
    pub section: Section,
    pub kind: ElementKind,
    pub serial: u32,
}

impl ElementId {
    pub fn new(section: Section, kind: ElementKind, serial: u32) -> Self {
        Self {
            section,
            kind,
            serial,
        }
    }
}

/// A rendered cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CellElement {
    pub width: f64,
    pub colspan: usize,
    /// Covered by a spanning cell to its left.
    pub hidden: bool,
    pub frozen: bool,
    pub last_frozen: bool,
    /// Horizontal translation that pins a frozen cell.
    pub offset_left: f64,
}

/// A rendered row and its cells.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowElement {
    pub logical_index: usize,
    pub cells: Vec<CellElement>,
    /// Sum of the cell widths, rounded up.
    pub width: f64,
}

/// What a template operation on a section needs from its surroundings.
pub(crate) struct PaintContext<'a> {
    pub columns: &'a ColumnConfiguration,
    pub positions: &'a mut PositionTracker,
    pub scroll_left: f64,
}

#[derive(Debug, Clone, Copy)]
enum Hook {
    PreAttach,
    PostAttach,
    Update,
    PreDetach,
    PostDetach,
}

/// Read-only capabilities shared by every section.
pub trait RowContainer {
    fn rows(&self) -> &RowSection;

    /// Rendered rows in visual order.
    fn rendered_rows(&self) -> Vec<ElementId>;

    /// Whether cells of this rendered row take part in column freezing.
    fn row_can_be_frozen(&self, element: ElementId) -> bool;

    /// Total pixel height of the section as laid out.
    fn height_of_section(&self) -> f64;

    fn section(&self) -> Section {
        self.rows().section()
    }

    fn row_count(&self) -> usize {
        self.rows().row_count()
    }

    fn default_row_height(&self) -> f64 {
        self.rows().default_row_height()
    }

    /// Tag of the cells in a browser rendering.
    fn cell_tag_name(&self) -> &'static str {
        match self.section() {
            Section::Header => "th",
            Section::Body | Section::Footer => "td",
        }
    }

    fn row_element(&self, element: ElementId) -> Option<&RowElement> {
        self.rows().element(element)
    }

    /// Logical index of a rendered row.
    fn logical_index_of(&self, element: ElementId) -> Option<usize> {
        self.rows().element(element).map(|r| r.logical_index)
    }
}

/// Bookkeeping shared by all sections.
pub struct RowSection {
    section: Section,
    row_count: usize,
    default_row_height: f64,
    height_explicit: bool,
    autodetect_pending: bool,
    updater: Box<dyn EscalatorUpdater>,
    elements: HashMap<ElementId, RowElement>,
    next_serial: u32,
    colspans_used: bool,
}

impl std::fmt::Debug for RowSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RowSection")
            .field("section", &self.section)
            .field("row_count", &self.row_count)
            .field("default_row_height", &self.default_row_height)
            .field("rendered", &self.elements.len())
            .finish_non_exhaustive()
    }
}

impl RowSection {
    pub(crate) fn new(section: Section, row_height: Option<f64>) -> Self {
        Self {
            section,
            row_count: 0,
            default_row_height: row_height.unwrap_or(INITIAL_DEFAULT_ROW_HEIGHT),
            height_explicit: row_height.is_some(),
            autodetect_pending: false,
            updater: Box::new(NullUpdater),
            elements: HashMap::new(),
            next_serial: 0,
            colspans_used: false,
        }
    }

    pub fn section(&self) -> Section {
        self.section
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn default_row_height(&self) -> f64 {
        self.default_row_height
    }

    /// The height was set explicitly rather than detected.
    pub fn has_explicit_height(&self) -> bool {
        self.height_explicit
    }

    pub fn element(&self, element: ElementId) -> Option<&RowElement> {
        self.elements.get(&element)
    }

    pub fn rendered_count(&self) -> usize {
        self.elements.len()
    }

    /// Some cell has used a colspan greater than one.
    pub fn uses_colspans(&self) -> bool {
        self.colspans_used
    }

    pub(crate) fn set_updater(&mut self, updater: Box<dyn EscalatorUpdater>) {
        self.updater = updater;
    }

    pub(crate) fn validate_insert(&self, index: usize, count: usize) -> Result<()> {
        if index > self.row_count {
            return Err(EscalatorError::out_of_bounds(
                "Row",
                index,
                0,
                self.row_count + 1,
            ));
        }
        if count < 1 {
            return Err(EscalatorError::IllegalArgument(format!(
                "Number of rows must be 1 or greater (was {count})"
            )));
        }
        Ok(())
    }

    pub(crate) fn validate_remove(&self, index: usize, count: usize) -> Result<()> {
        if count < 1 {
            return Err(EscalatorError::IllegalArgument(format!(
                "Number of rows must be 1 or greater (was {count})"
            )));
        }
        if index + count > self.row_count {
            return Err(EscalatorError::out_of_bounds(
                "Row",
                index + count,
                0,
                self.row_count + 1,
            ));
        }
        Ok(())
    }

    pub(crate) fn validate_refresh(&self, index: usize, count: usize) -> Result<()> {
        if count < 1 {
            return Err(EscalatorError::IllegalArgument(format!(
                "Number of rows must be 1 or greater (was {count})"
            )));
        }
        if index + count > self.row_count {
            return Err(EscalatorError::out_of_bounds(
                "Row",
                index + count,
                0,
                self.row_count + 1,
            ));
        }
        Ok(())
    }

    pub(crate) fn set_row_count(&mut self, row_count: usize) {
        self.row_count = row_count;
    }

    /// Validate an explicit default row height.
    pub(crate) fn check_row_height(px: f64) -> Result<()> {
        if !px.is_finite() || px < 1.0 {
            return Err(EscalatorError::IllegalArgument(format!(
                "Height must be positive. {px} was given."
            )));
        }
        Ok(())
    }

    /// Returns whether the height actually changed.
    pub(crate) fn set_default_row_height(&mut self, px: f64, explicit: bool) -> bool {
        if explicit {
            self.height_explicit = true;
            self.autodetect_pending = false;
        }
        let changed = (self.default_row_height - px).abs() > crate::px::EPSILON;
        self.default_row_height = px;
        changed
    }

    /// Queue a probe measurement unless one is queued or a height was set.
    pub(crate) fn autodetect_row_height_later(&mut self) {
        if !self.height_explicit {
            self.autodetect_pending = true;
        }
    }

    pub(crate) fn take_autodetect(&mut self) -> bool {
        std::mem::take(&mut self.autodetect_pending)
    }

    pub(crate) fn is_autodetect_pending(&self) -> bool {
        self.autodetect_pending
    }

    pub(crate) fn allocate(&mut self, kind: ElementKind) -> ElementId {
        let id = ElementId::new(self.section, kind, self.next_serial);
        self.next_serial = self.next_serial.wrapping_add(1);
        id
    }

    /// Create a row element for `logical_index` and run the attach hooks.
    pub(crate) fn create_row(&mut self, logical_index: usize, ctx: &PaintContext<'_>) -> ElementId {
        let id = self.allocate(ElementKind::Row);
        let columns = ctx.columns;
        let frozen = columns.frozen_column_count();
        let cells = (0..columns.column_count())
            .map(|c| CellElement {
                width: columns.width(c),
                colspan: 1,
                hidden: false,
                frozen: c < frozen,
                last_frozen: c + 1 == frozen,
                offset_left: if c < frozen { ctx.scroll_left } else { 0.0 },
            })
            .collect();
        let mut element = RowElement {
            logical_index,
            cells,
            width: 0.0,
        };
        element.width = row_width(&element.cells);

        let all = Range::of_rows(0, columns.column_count());
        let (row, mut flyweights) = self.flyweights(id, &element, all);
        self.updater.pre_attach(&row, &mut flyweights);
        self.elements.insert(id, element);
        self.write_back(id, &flyweights, columns);
        self.invoke(id, all, Hook::PostAttach, columns);
        self.invoke(id, all, Hook::Update, columns);
        id
    }

    /// Run the detach hooks and forget `element`.
    pub(crate) fn destroy_row(&mut self, element: ElementId, ctx: &mut PaintContext<'_>) {
        let all = Range::of_rows(0, ctx.columns.column_count());
        self.invoke(element, all, Hook::PreDetach, ctx.columns);
        if let Some(removed) = self.elements.remove(&element) {
            let (row, flyweights) = self.flyweights(element, &removed, all);
            self.updater.post_detach(&row, &flyweights);
        }
        ctx.positions.remove(element);
    }

    /// Give `element` a new logical identity and repopulate every cell.
    pub(crate) fn refresh_row(
        &mut self,
        element: ElementId,
        logical_index: usize,
        columns: &ColumnConfiguration,
    ) {
        if let Some(row) = self.elements.get_mut(&element) {
            row.logical_index = logical_index;
        }
        let all = Range::of_rows(0, columns.column_count());
        self.invoke(element, all, Hook::Update, columns);
    }

    /// Re-run the updater for `column_range` of a rendered row.
    pub(crate) fn refresh_cells(
        &mut self,
        element: ElementId,
        column_range: Range,
        columns: &ColumnConfiguration,
    ) {
        self.invoke(element, column_range, Hook::Update, columns);
    }

    /// Change a row's logical index without touching its content.
    pub(crate) fn relabel(&mut self, element: ElementId, logical_index: usize) {
        if let Some(row) = self.elements.get_mut(&element) {
            row.logical_index = logical_index;
        }
    }

    fn flyweights(
        &self,
        id: ElementId,
        element: &RowElement,
        column_range: Range,
    ) -> (FlyweightRow, Vec<FlyweightCell>) {
        let row = FlyweightRow {
            element: id,
            section: self.section,
            logical_index: element.logical_index,
            height: self.default_row_height,
        };
        let cells = column_range
            .iter()
            .filter_map(|c| {
                let column = crate::px::unsigned(c);
                element.cells.get(column).map(|cell| {
                    FlyweightCell::new(
                        element.logical_index,
                        column,
                        cell.width,
                        cell.frozen,
                        cell.colspan,
                    )
                })
            })
            .collect();
        (row, cells)
    }

    fn invoke(
        &mut self,
        id: ElementId,
        column_range: Range,
        hook: Hook,
        columns: &ColumnConfiguration,
    ) {
        let Some(element) = self.elements.get(&id) else {
            return;
        };
        let (row, mut cells) = self.flyweights(id, element, column_range);
        if matches!(hook, Hook::Update) {
            // every update starts from unspanned cells
            for cell in &mut cells {
                cell.set_colspan(1);
            }
        }
        match hook {
            Hook::PreAttach => self.updater.pre_attach(&row, &mut cells),
            Hook::PostAttach => self.updater.post_attach(&row, &mut cells),
            Hook::Update => self.updater.update(&row, &mut cells),
            Hook::PreDetach => self.updater.pre_detach(&row, &cells),
            Hook::PostDetach => self.updater.post_detach(&row, &cells),
        }
        self.write_back(id, &cells, columns);
    }

    /// Store colspans chosen by the updater and re-derive span widths.
    fn write_back(&mut self, id: ElementId, cells: &[FlyweightCell], columns: &ColumnConfiguration) {
        let Some(element) = self.elements.get_mut(&id) else {
            return;
        };
        let mut changed = false;
        for cell in cells {
            if let Some(target) = element.cells.get_mut(cell.column) {
                if target.colspan != cell.colspan() {
                    target.colspan = cell.colspan();
                    changed = true;
                }
                if cell.colspan() > 1 {
                    self.colspans_used = true;
                }
            }
        }
        if changed {
            apply_spans(element, &columns.widths());
        }
    }

    /// Insert `count` empty cells at `index` in every rendered row, then
    /// populate them.
    pub(crate) fn insert_cells(&mut self, index: usize, count: usize, ctx: &PaintContext<'_>) {
        let columns = ctx.columns;
        let frozen = columns.frozen_column_count();
        let ids: Vec<ElementId> = self.elements.keys().copied().collect();
        for id in &ids {
            if let Some(element) = self.elements.get_mut(id) {
                let at = index.min(element.cells.len());
                let new_cells = (index..index + count).map(|c| CellElement {
                    width: columns.width(c),
                    colspan: 1,
                    hidden: false,
                    frozen: c < frozen,
                    last_frozen: false,
                    offset_left: if c < frozen { ctx.scroll_left } else { 0.0 },
                });
                element.cells.splice(at..at, new_cells);
                refresh_frozen_flags(element, frozen, ctx.scroll_left);
                apply_spans(element, &columns.widths());
            }
        }
        let range = Range::of_rows(index, count);
        for id in ids {
            self.invoke(id, range, Hook::Update, columns);
        }
        debug!(section = ?self.section, index, count, "inserted cells");
    }

    pub(crate) fn remove_cells(&mut self, index: usize, count: usize, ctx: &PaintContext<'_>) {
        let frozen = ctx.columns.frozen_column_count();
        let widths = ctx.columns.widths();
        for element in self.elements.values_mut() {
            let end = (index + count).min(element.cells.len());
            let start = index.min(end);
            element.cells.drain(start..end);
            refresh_frozen_flags(element, frozen, ctx.scroll_left);
            apply_spans(element, &widths);
        }
    }

    /// Push the current column widths into every rendered cell.
    pub(crate) fn reapply_column_widths(&mut self, columns: &ColumnConfiguration) {
        let widths = columns.widths();
        for element in self.elements.values_mut() {
            apply_spans(element, &widths);
        }
    }

    /// Toggle frozen state of one column in every rendered row.
    pub(crate) fn set_column_frozen(
        &mut self,
        column: usize,
        frozen: bool,
        scroll_left: f64,
    ) {
        for element in self.elements.values_mut() {
            if let Some(cell) = element.cells.get_mut(column) {
                cell.frozen = frozen;
                cell.offset_left = if frozen { scroll_left } else { 0.0 };
            }
        }
    }

    /// Mark the last frozen column, clearing the mark elsewhere.
    pub(crate) fn set_last_frozen(&mut self, frozen_count: usize) {
        for element in self.elements.values_mut() {
            for (c, cell) in element.cells.iter_mut().enumerate() {
                cell.last_frozen = c + 1 == frozen_count;
            }
        }
    }

    /// Keep a frozen column pinned at the current horizontal scroll.
    pub(crate) fn update_freeze_position(&mut self, column: usize, scroll_left: f64) {
        for element in self.elements.values_mut() {
            if let Some(cell) = element.cells.get_mut(column) {
                if cell.frozen {
                    cell.offset_left = scroll_left;
                }
            }
        }
    }

    /// Largest minimal width of the cells of `column` across rendered rows.
    /// Spanning and covered cells do not count.
    pub(crate) fn min_cell_width(
        &self,
        column: usize,
        measurer: &mut dyn Measurer,
        with_content: bool,
    ) -> f64 {
        let mut max = 0.0_f64;
        for (id, element) in &self.elements {
            let Some(cell) = element.cells.get(column) else {
                continue;
            };
            if cell.colspan > 1 || cell.hidden {
                continue;
            }
            let row = FlyweightRow {
                element: *id,
                section: self.section,
                logical_index: element.logical_index,
                height: self.default_row_height,
            };
            max = max.max(measurer.min_cell_width(&row, column, with_content));
        }
        max
    }
}

fn refresh_frozen_flags(element: &mut RowElement, frozen: usize, scroll_left: f64) {
    for (c, cell) in element.cells.iter_mut().enumerate() {
        cell.frozen = c < frozen;
        cell.last_frozen = c + 1 == frozen;
        cell.offset_left = if cell.frozen { scroll_left } else { 0.0 };
    }
}

/// Recompute widths and coverage from colspans.
fn apply_spans(element: &mut RowElement, widths: &[f64]) {
    let mut covered_until = 0;
    for (c, cell) in element.cells.iter_mut().enumerate() {
        if c < covered_until {
            cell.hidden = true;
            cell.width = 0.0;
            continue;
        }
        cell.hidden = false;
        let end = (c + cell.colspan.max(1)).min(widths.len().max(c + 1));
        cell.width = widths.get(c..end).map_or(0.0, |w| w.iter().sum());
        covered_until = end;
    }
    element.width = row_width(&element.cells);
}

fn row_width(cells: &[CellElement]) -> f64 {
    cells.iter().map(|c| c.width).sum::<f64>().ceil()
}
