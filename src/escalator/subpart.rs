//! Sub-part addressing: stable string names for rows, cells and spacers,
//! like `cell[12][3]`, `header[0]` or `spacer[7]`.

use std::str::FromStr;

use serde::Serialize;
use tracing::{debug, warn};

use super::Escalator;
use crate::container::{ElementId, ElementKind, Section};
use crate::error::{EscalatorError, Result};
use crate::layout::ScrollDestination;
use crate::px::unsigned;

/// A parsed sub-part name: a type and zero or more bracketed indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubPartArguments {
    kind: String,
    indices: Vec<i64>,
}

impl SubPartArguments {
    pub fn parse(sub_part: &str) -> Result<Self> {
        let (kind, mut rest) = match sub_part.find('[') {
            Some(at) => sub_part.split_at(at),
            None => (sub_part, ""),
        };
        if kind.is_empty() {
            return Err(EscalatorError::SubPart(format!("missing type in {sub_part:?}")));
        }
        let mut indices = Vec::new();
        while !rest.is_empty() {
            let inner = rest
                .strip_prefix('[')
                .and_then(|r| r.split_once(']'))
                .ok_or_else(|| EscalatorError::SubPart(format!("malformed indices in {sub_part:?}")))?;
            let index = inner.0.trim().parse::<i64>().map_err(|e| {
                EscalatorError::SubPart(format!("bad index {:?} in {sub_part:?}: {e}", inner.0))
            })?;
            indices.push(index);
            rest = inner.1;
        }
        Ok(Self {
            kind: kind.to_string(),
            indices,
        })
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn indices(&self) -> &[i64] {
        &self.indices
    }

    pub fn index(&self, i: usize) -> Option<i64> {
        self.indices.get(i).copied()
    }
}

impl FromStr for SubPartArguments {
    type Err = EscalatorError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// An element addressed by a sub-part name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SubPart {
    /// A section root, addressed by the bare type.
    SectionRoot { element: ElementId },
    Row { element: ElementId },
    /// Cell `column` of `row`. A cell covered by a colspan resolves to the
    /// spanning cell.
    Cell { row: ElementId, column: usize },
    Spacer { element: ElementId },
}

impl Escalator {
    /// Resolve a sub-part name. Body cells outside the rendered window are
    /// scrolled to and resolve to `None` until they are rendered.
    pub fn sub_part_element(&mut self, sub_part: &str) -> Option<SubPart> {
        let args = match SubPartArguments::parse(sub_part) {
            Ok(args) => args,
            Err(e) => {
                warn!(error = %e, "unparsable sub-part");
                return None;
            }
        };
        if let Some(found) = self.table_structure_sub_part(&args) {
            return Some(found);
        }
        if args.kind() == "spacer" && args.indices().len() == 1 {
            let row = args.index(0)?;
            return self
                .body
                .spacers()
                .get(row)
                .map(|spacer| SubPart::Spacer {
                    element: spacer.root(),
                });
        }
        None
    }

    fn table_structure_sub_part(&mut self, args: &SubPartArguments) -> Option<SubPart> {
        let section = match args.kind().to_ascii_lowercase().as_str() {
            "header" => Section::Header,
            "cell" => Section::Body,
            "footer" => Section::Footer,
            _ => return None,
        };
        let Some(row_index) = args.index(0) else {
            let element = self.section_root(section);
            return Some(SubPart::SectionRoot { element });
        };
        if row_index < 0 {
            return None;
        }
        let row_index = unsigned(row_index);

        if section == Section::Body && !self.body.visible_row_range().contains(args.index(0)?) {
            if let Err(e) = self.scroll_to_row(row_index, ScrollDestination::Any, 0.0) {
                debug!(error = %e, row_index, "sub-part row cannot be scrolled to");
            }
            return None;
        }

        let row = match section {
            Section::Header => self.header.row_at(row_index),
            Section::Footer => self.footer.row_at(row_index),
            Section::Body => self.body.row_element_for(row_index),
        }?;
        let Some(column_index) = args.index(1) else {
            return Some(SubPart::Row { element: row });
        };
        if column_index < 0 || args.indices().len() > 2 {
            return None;
        }
        let column_index = unsigned(column_index);
        if column_index >= self.columns.frozen_column_count()
            && column_index < self.columns.column_count()
        {
            if let Err(e) = self.scroll_to_column(column_index, ScrollDestination::Any, 0.0) {
                debug!(error = %e, column_index, "sub-part column cannot be scrolled to");
            }
        }

        let cells = &self.section(section).row_element(row)?.cells;
        cells.get(column_index)?;
        // a covered cell belongs to the nearest spanning cell on its left
        let column = (0..=column_index)
            .rev()
            .find(|c| cells.get(*c).is_some_and(|cell| !cell.hidden))?;
        Some(SubPart::Cell { row, column })
    }

    fn section_root(&self, section: Section) -> ElementId {
        match section {
            Section::Header => self.header.root(),
            Section::Body => self.body.root(),
            Section::Footer => self.footer.root(),
        }
    }

    /// Name of an element known to the escalator, if it has one.
    pub fn sub_part_name(&self, part: SubPart) -> Option<String> {
        match part {
            SubPart::Spacer { element } => self.spacer_name(element),
            SubPart::SectionRoot { element } => {
                (self.section_root(element.section) == element)
                    .then(|| element.section.sub_part_name().to_string())
            }
            SubPart::Row { element } => self.sub_part_name_of(element),
            SubPart::Cell { row, column } => {
                let container = self.section(row.section);
                let logical = container.logical_index_of(row)?;
                container.row_element(row)?.cells.get(column)?;
                Some(format!(
                    "{}[{logical}][{column}]",
                    row.section.sub_part_name()
                ))
            }
        }
    }

    /// Name of a row or spacer element.
    pub fn sub_part_name_of(&self, element: ElementId) -> Option<String> {
        match element.kind {
            ElementKind::Spacer | ElementKind::SpacerDeco => self.spacer_name(element),
            ElementKind::Row => {
                let logical = self.section(element.section).logical_index_of(element)?;
                Some(format!("{}[{logical}]", element.section.sub_part_name()))
            }
            ElementKind::SectionRoot => self.sub_part_name(SubPart::SectionRoot { element }),
        }
    }

    fn spacer_name(&self, element: ElementId) -> Option<String> {
        self.body
            .spacers()
            .spacer_of(element)
            .map(|spacer| format!("spacer[{}]", spacer.row()))
    }
}
