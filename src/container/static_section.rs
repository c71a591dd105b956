//! Header and footer sections.
//!
//! A static container renders every logical row, so logical, physical and
//! visual indices coincide.

use tracing::debug;

use super::{ElementId, ElementKind, PaintContext, RowContainer, RowSection, Section};
use crate::error::Result;
use crate::layout::{ColumnConfiguration, PositionTracker};
use crate::range::Range;
use crate::updater::EscalatorUpdater;

#[derive(Debug)]
pub struct StaticRowContainer {
    core: RowSection,
    order: Vec<ElementId>,
    root: ElementId,
}

impl StaticRowContainer {
    pub(crate) fn new(section: Section, row_height: Option<f64>) -> Self {
        let mut core = RowSection::new(section, row_height);
        let root = core.allocate(ElementKind::SectionRoot);
        Self {
            core,
            order: Vec::new(),
            root,
        }
    }

    /// The section's root element.
    pub fn root(&self) -> ElementId {
        self.root
    }

    pub(crate) fn core_mut(&mut self) -> &mut RowSection {
        &mut self.core
    }

    pub(crate) fn set_updater(&mut self, updater: Box<dyn EscalatorUpdater>) {
        self.core.set_updater(updater);
    }

    /// Row element at `index`.
    pub fn row_at(&self, index: usize) -> Option<ElementId> {
        self.order.get(index).copied()
    }

    pub(crate) fn insert_rows(
        &mut self,
        index: usize,
        count: usize,
        attached: bool,
        ctx: &mut PaintContext<'_>,
    ) -> Result<()> {
        self.core.validate_insert(index, count)?;
        self.core.set_row_count(self.core.row_count() + count);
        if attached {
            for offset in 0..count {
                let id = self.core.create_row(index + offset, ctx);
                let at = (index + offset).min(self.order.len());
                self.order.insert(at, id);
            }
            self.relabel_from(index + count);
            self.reposition(ctx.positions);
        }
        debug!(section = ?self.core.section(), index, count, "inserted rows");
        Ok(())
    }

    pub(crate) fn remove_rows(
        &mut self,
        index: usize,
        count: usize,
        ctx: &mut PaintContext<'_>,
    ) -> Result<()> {
        self.core.validate_remove(index, count)?;
        self.core.set_row_count(self.core.row_count() - count);
        let end = (index + count).min(self.order.len());
        let start = index.min(end);
        let removed: Vec<ElementId> = self.order.drain(start..end).collect();
        for id in removed {
            self.core.destroy_row(id, ctx);
        }
        self.relabel_from(index);
        self.reposition(ctx.positions);
        debug!(section = ?self.core.section(), index, count, "removed rows");
        Ok(())
    }

    pub(crate) fn refresh_rows(
        &mut self,
        index: usize,
        count: usize,
        columns: &ColumnConfiguration,
    ) -> Result<()> {
        self.core.validate_refresh(index, count)?;
        for logical in index..index + count {
            if let Some(id) = self.order.get(logical).copied() {
                self.core.refresh_row(id, logical, columns);
            }
        }
        Ok(())
    }

    pub(crate) fn refresh_cells(&mut self, column_range: Range, columns: &ColumnConfiguration) {
        for id in self.order.clone() {
            self.core.refresh_cells(id, column_range, columns);
        }
    }

    /// Render every logical row (on attach).
    pub(crate) fn paint_all(&mut self, ctx: &mut PaintContext<'_>) {
        for logical in self.order.len()..self.core.row_count() {
            let id = self.core.create_row(logical, ctx);
            self.order.push(id);
        }
        self.reposition(ctx.positions);
    }

    /// Destroy every rendered row (on detach).
    pub(crate) fn destroy_all(&mut self, ctx: &mut PaintContext<'_>) {
        for id in std::mem::take(&mut self.order) {
            self.core.destroy_row(id, ctx);
        }
    }

    pub(crate) fn set_default_row_height(
        &mut self,
        px: f64,
        explicit: bool,
        positions: &mut PositionTracker,
    ) -> bool {
        let changed = self.core.set_default_row_height(px, explicit);
        self.reposition(positions);
        changed
    }

    fn relabel_from(&mut self, index: usize) {
        for (logical, id) in self.order.iter().enumerate().skip(index) {
            self.core.relabel(*id, logical);
        }
    }

    fn reposition(&self, positions: &mut PositionTracker) {
        let row_height = self.core.default_row_height();
        for (i, id) in self.order.iter().enumerate() {
            positions.set(*id, 0.0, i as f64 * row_height);
        }
    }
}

impl RowContainer for StaticRowContainer {
    fn rows(&self) -> &RowSection {
        &self.core
    }

    fn rendered_rows(&self) -> Vec<ElementId> {
        self.order.clone()
    }

    fn row_can_be_frozen(&self, element: ElementId) -> bool {
        self.order.contains(&element)
    }

    fn height_of_section(&self) -> f64 {
        self.core.row_count() as f64 * self.core.default_row_height()
    }
}
