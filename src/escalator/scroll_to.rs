//! `scroll_to_*` operations.

use tracing::debug;

use super::Escalator;
use crate::container::RowContainer;
use crate::error::{EscalatorError, Result};
use crate::layout::{scroll_pos, validate_scroll_destination, ScrollDestination};
use crate::px::{ceil_i64, floor_i64, signed, unsigned};
use crate::range::Range;

impl Escalator {
    fn verify_valid_row_index(&self, row: usize) -> Result<()> {
        let row_count = self.body.row_count();
        if row >= row_count {
            return Err(EscalatorError::out_of_bounds("Row", row, 0, row_count));
        }
        Ok(())
    }

    /// Scroll the body so that `row` lands at `destination`.
    pub fn scroll_to_row(
        &mut self,
        row: usize,
        destination: ScrollDestination,
        padding: f64,
    ) -> Result<()> {
        validate_scroll_destination(destination, padding)?;
        self.verify_valid_row_index(row)?;

        let target_start = self.body.row_top(row);
        let target_end = target_start + self.body.default_row_height();
        let viewport_start = self.scroll_top();
        let viewport_end = viewport_start + self.body.height_of_section();
        let pos = scroll_pos(
            destination,
            target_start,
            target_end,
            viewport_start,
            viewport_end,
            padding,
        );
        debug!(row, ?destination, pos, "scroll to row");
        self.set_scroll_top(pos);
        Ok(())
    }

    /// Scroll horizontally so that `column` lands at `destination`. Frozen
    /// columns are always visible and cannot be scrolled to.
    pub fn scroll_to_column(
        &mut self,
        column: usize,
        destination: ScrollDestination,
        padding: f64,
    ) -> Result<()> {
        validate_scroll_destination(destination, padding)?;
        let column_count = self.columns.column_count();
        if column >= column_count {
            return Err(EscalatorError::out_of_bounds("Column", column, 0, column_count));
        }
        if column < self.columns.frozen_column_count() {
            return Err(EscalatorError::IllegalArgument(format!(
                "The given column index {column} is frozen."
            )));
        }

        let frozen = self.columns.frozen_width();
        let target_start = self.columns.left_of(column) - frozen;
        let target_end = target_start + self.columns.width(column);
        let viewport_start = self.scroll_left();
        let mut viewport_end = viewport_start + self.viewport.width - frozen;
        if self.vertical.shows_scroll_handle() {
            viewport_end -= self.vertical.scrollbar_thickness();
        }
        let pos = scroll_pos(
            destination,
            target_start,
            target_end,
            viewport_start,
            viewport_end,
            padding,
        );
        debug!(column, ?destination, pos, "scroll to column");
        self.set_scroll_left(pos);
        Ok(())
    }

    /// Scroll the body so that the spacer below `row` lands at `destination`.
    pub fn scroll_to_spacer(
        &mut self,
        row: i64,
        destination: ScrollDestination,
        padding: f64,
    ) -> Result<()> {
        validate_scroll_destination(destination, padding)?;
        let range = self.spacer_range(row)?.ok_or_else(|| {
            EscalatorError::IllegalArgument(format!("No spacer open at index {row}"))
        })?;
        self.scroll_body_to_range(range, destination, padding);
        Ok(())
    }

    /// Scroll so that `row` and the spacer below it are shown together. Row
    /// `-1` stands for the spacer above the first row alone.
    pub fn scroll_to_row_and_spacer(
        &mut self,
        row: i64,
        destination: ScrollDestination,
        padding: f64,
    ) -> Result<()> {
        validate_scroll_destination(destination, padding)?;
        let spacer = self.spacer_range(row)?;
        let row_range = if row == -1 {
            if spacer.is_none() {
                return Err(EscalatorError::IllegalArgument(
                    "Cannot scroll to row index -1, as there is no spacer open at that index."
                        .to_string(),
                ));
            }
            Range::with_length(0, 0)
        } else {
            // spacer_range has already rejected rows below -1
            let row = unsigned(row);
            self.verify_valid_row_index(row)?;
            Range::with_length(
                floor_i64(self.body.row_top(row)),
                ceil_i64(self.body.default_row_height()),
            )
        };

        let target = match spacer {
            Some(spacer) if row_range.is_empty() => spacer,
            Some(spacer) => row_range.combine_with(&spacer)?,
            None => row_range,
        };
        self.scroll_body_to_range(target, destination, padding);
        Ok(())
    }

    /// Pixel extent of the spacer below `row`, if one is open.
    fn spacer_range(&self, row: i64) -> Result<Option<Range>> {
        if row < -1 || row >= signed(self.body.row_count()) {
            return Err(EscalatorError::IndexOutOfBounds {
                what: "Spacer",
                index: row,
                min: -1,
                max: signed(self.body.row_count()),
            });
        }
        let spacers = self.body.spacers();
        let row_height = self.body.default_row_height();
        Ok(spacers.get(row).and_then(|spacer| {
            spacers.spacer_top(row, row_height).map(|top| {
                Range::with_length(floor_i64(top), ceil_i64(spacer.height()))
            })
        }))
    }

    fn scroll_body_to_range(&mut self, target: Range, destination: ScrollDestination, padding: f64) {
        let viewport_start = self.scroll_top().floor();
        let viewport_end = viewport_start + self.body.height_of_section();
        let pos = scroll_pos(
            destination,
            target.start() as f64,
            target.end() as f64,
            viewport_start,
            viewport_end,
            padding,
        );
        debug!(?target, ?destination, pos, "scroll to body range");
        self.set_scroll_top(pos);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use crate::clock::ManualClock;
    use crate::config::{EscalatorConfig, RowHeights};
    use crate::container::Section;
    use crate::error::EscalatorError;
    use crate::escalator::Escalator;
    use crate::layout::ScrollDestination;
    use crate::updater::FixedMeasurer;

    fn escalator() -> Escalator {
        let config = EscalatorConfig {
            width: 500.0,
            height: 200.0,
            default_row_height: RowHeights {
                body: Some(20.0),
                ..RowHeights::default()
            },
            ..EscalatorConfig::default()
        };
        let mut e = Escalator::with_environment(
            config,
            Box::new(FixedMeasurer::default()),
            Box::new(ManualClock::new()),
        )
        .unwrap();
        e.insert_columns(0, 10).unwrap();
        e.insert_rows(Section::Body, 0, 100).unwrap();
        e.attach();
        e
    }

    #[test]
    fn test_scroll_to_row_destinations() {
        let mut e = escalator();
        // body area is 185px: 200 minus the horizontal scrollbar
        e.scroll_to_row(50, ScrollDestination::Start, 0.0).unwrap();
        assert_eq!(e.scroll_top(), 1000.0);
        assert_eq!(e.visible_row_range().start(), 50);
        e.scroll_to_row(50, ScrollDestination::Any, 0.0).unwrap();
        assert_eq!(e.scroll_top(), 1000.0);
        e.scroll_to_row(60, ScrollDestination::End, 0.0).unwrap();
        assert_eq!(e.scroll_top(), 1220.0 - 185.0);
    }

    #[test]
    fn test_scroll_to_row_rejects_bad_input() {
        let mut e = escalator();
        assert!(matches!(
            e.scroll_to_row(100, ScrollDestination::Any, 0.0),
            Err(EscalatorError::IndexOutOfBounds { .. })
        ));
        assert!(matches!(
            e.scroll_to_row(5, ScrollDestination::Middle, 3.0),
            Err(EscalatorError::IllegalArgument(_))
        ));
    }

    #[test]
    fn test_scroll_to_frozen_column_fails() {
        let mut e = escalator();
        e.set_frozen_column_count(2).unwrap();
        assert!(matches!(
            e.scroll_to_column(1, ScrollDestination::Any, 0.0),
            Err(EscalatorError::IllegalArgument(_))
        ));
        e.scroll_to_column(9, ScrollDestination::End, 0.0).unwrap();
        assert_eq!(e.scroll_left(), e.horizontal_scrollbar().max_scroll_pos());
    }

    #[test]
    fn test_scroll_to_missing_spacer() {
        let mut e = escalator();
        assert!(matches!(
            e.scroll_to_spacer(4, ScrollDestination::Any, 0.0),
            Err(EscalatorError::IllegalArgument(_))
        ));
        assert!(e
            .scroll_to_row_and_spacer(-1, ScrollDestination::Any, 0.0)
            .is_err());
    }

    #[test]
    fn test_scroll_to_row_and_spacer_covers_both() {
        let mut e = escalator();
        e.set_spacer(30, 50.0).unwrap();
        e.scroll_to_row_and_spacer(30, ScrollDestination::Start, 0.0)
            .unwrap();
        assert_eq!(e.scroll_top(), 600.0);
        e.scroll_to_spacer(30, ScrollDestination::Start, 0.0).unwrap();
        assert_eq!(e.scroll_top(), 620.0);
    }
}
