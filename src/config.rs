//! Engine configuration and defaults.

use serde::{Deserialize, Serialize};

use crate::error::{EscalatorError, Result};

/// Row height used until a section's height is set or detected.
pub const INITIAL_DEFAULT_ROW_HEIGHT: f64 = 20.0;

/// Width given to columns before they are measured.
pub const DEFAULT_COLUMN_WIDTH: f64 = 100.0;

/// Outer width when the host gives none.
pub const DEFAULT_WIDTH: f64 = 500.0;

/// Outer height when the host gives none.
pub const DEFAULT_HEIGHT: f64 = 400.0;

/// Rows shown in the body while in [`HeightMode::Row`] until told otherwise.
pub const DEFAULT_HEIGHT_BY_ROWS: f64 = 10.0;

/// Native scrollbar thickness assumed by default.
pub const DEFAULT_SCROLLBAR_THICKNESS: f64 = 15.0;

/// Minimum time between a scroll-triggered recycle and the DOM resync.
pub const DOM_SORT_DELAY_MS: f64 = 50.0;

/// Minimum animation frames between a recycle and the DOM resync.
pub const DOM_SORT_REQUIRED_FRAMES: u32 = 3;

/// How the escalator's height is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeightMode {
    /// The host defines the height (the CSS height in a browser).
    #[default]
    Css,
    /// The body always shows `height_by_rows` rows of default height.
    Row,
    /// The escalator grows to fit all of its content.
    Undefined,
}

/// Per-section default row heights. `None` means auto-detect.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RowHeights {
    pub header: Option<f64>,
    pub body: Option<f64>,
    pub footer: Option<f64>,
}

/// Configuration of an [`crate::Escalator`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EscalatorConfig {
    pub width: f64,
    pub height: f64,
    pub height_mode: HeightMode,
    pub height_by_rows: f64,
    /// Zero means the scrollbars overlay the content and take no space.
    pub scrollbar_thickness: f64,
    pub default_row_height: RowHeights,
    pub default_column_width: f64,
    pub dom_sort_delay_ms: f64,
    pub dom_sort_frames: u32,
}

impl Default for EscalatorConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            height_mode: HeightMode::Css,
            height_by_rows: DEFAULT_HEIGHT_BY_ROWS,
            scrollbar_thickness: DEFAULT_SCROLLBAR_THICKNESS,
            default_row_height: RowHeights::default(),
            default_column_width: DEFAULT_COLUMN_WIDTH,
            dom_sort_delay_ms: DOM_SORT_DELAY_MS,
            dom_sort_frames: DOM_SORT_REQUIRED_FRAMES,
        }
    }
}

impl EscalatorConfig {
    /// Reject sizes that would poison the pixel math.
    pub fn validate(&self) -> Result<()> {
        check_size("width", self.width)?;
        check_size("height", self.height)?;
        check_size("scrollbar_thickness", self.scrollbar_thickness)?;
        check_size("default_column_width", self.default_column_width)?;
        check_size("dom_sort_delay_ms", self.dom_sort_delay_ms)?;
        if !self.height_by_rows.is_finite() || self.height_by_rows <= 0.0 {
            return Err(EscalatorError::Config(format!(
                "height_by_rows must be a positive finite number, got {}",
                self.height_by_rows
            )));
        }
        let heights = [
            ("header", self.default_row_height.header),
            ("body", self.default_row_height.body),
            ("footer", self.default_row_height.footer),
        ];
        for (section, height) in heights {
            if let Some(h) = height {
                if !h.is_finite() || h < 1.0 {
                    return Err(EscalatorError::Config(format!(
                        "{section} row height must be at least 1px, got {h}"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Parse a JSON configuration and validate it.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| EscalatorError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}

fn check_size(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(EscalatorError::Config(format!(
            "{name} must be a non-negative finite number, got {value}"
        )))
    }
}
