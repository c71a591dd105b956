//! CLI tool for escalator - replays a JSON operation script and prints the
//! resulting engine state as JSON
//!
//! Usage:
//!   escalator_cli <script.json>              # Output JSON to stdout
//!   escalator_cli <script.json> -o out.json  # Output JSON to file
//!
//! Logs go to stderr, filtered by `ESCALATOR_LOG` (default `warn`).
//!
//! Script format:
//! ```json
//! {
//!   "config": { "height": 300 },
//!   "ops": [
//!     { "op": "insert_columns", "index": 0, "count": 4 },
//!     { "op": "insert_rows", "section": "body", "index": 0, "count": 1000 },
//!     { "op": "attach" },
//!     { "op": "scroll_to_row", "row": 500, "destination": "middle" },
//!     { "op": "frames", "count": 4 }
//!   ]
//! }
//! ```

use std::env;
use std::fs;
use std::io::{self, Write};
use std::process::ExitCode;

use escalator::clock::ManualClock;
use escalator::updater::FixedMeasurer;
use escalator::{
    DomMove, Escalator, EscalatorConfig, EscalatorError, HeightMode, ScrollDestination, Section,
    SubPart, WheelDeltaMode,
};
use serde::Deserialize;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Frame interval used when a script does not give one.
const DEFAULT_FRAME_MS: f64 = 16.0;

#[derive(Debug, Deserialize)]
struct Script {
    #[serde(default)]
    config: EscalatorConfig,
    ops: Vec<Op>,
}

fn any() -> ScrollDestination {
    ScrollDestination::Any
}

fn frame_ms() -> f64 {
    DEFAULT_FRAME_MS
}

#[derive(Debug, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
enum Op {
    InsertRows { section: Section, index: usize, count: usize },
    RemoveRows { section: Section, index: usize, count: usize },
    RefreshRows { section: Section, index: usize, count: usize },
    InsertColumns { index: usize, count: usize },
    RemoveColumns { index: usize, count: usize },
    RefreshColumns { index: usize, count: usize },
    SetColumnWidth { index: usize, px: f64 },
    SetFrozenColumnCount { count: usize },
    SetRowHeight { section: Section, px: f64 },
    SetSpacer { row: i64, height: f64 },
    SetScrollTop { px: f64 },
    SetScrollLeft { px: f64 },
    ScrollToRow {
        row: usize,
        #[serde(default = "any")]
        destination: ScrollDestination,
        #[serde(default)]
        padding: f64,
    },
    ScrollToColumn {
        column: usize,
        #[serde(default = "any")]
        destination: ScrollDestination,
        #[serde(default)]
        padding: f64,
    },
    ScrollToSpacer {
        row: i64,
        #[serde(default = "any")]
        destination: ScrollDestination,
        #[serde(default)]
        padding: f64,
    },
    ScrollToRowAndSpacer {
        row: i64,
        #[serde(default = "any")]
        destination: ScrollDestination,
        #[serde(default)]
        padding: f64,
    },
    Wheel {
        #[serde(default)]
        dx: f64,
        #[serde(default)]
        dy: f64,
        #[serde(default)]
        mode: WheelDeltaMode,
    },
    SetHeightMode { mode: HeightMode },
    SetHeightByRows { rows: f64 },
    SetSize { width: f64, height: f64 },
    SetFocusedRow { row: Option<usize> },
    Attach,
    Detach,
    Flush,
    /// Advance the clock and push animation frames.
    Frames {
        count: u32,
        #[serde(default = "frame_ms")]
        ms: f64,
    },
    SubPart { name: String },
}

#[derive(Debug, Default, serde::Serialize)]
struct Replay {
    dom_moves: Vec<DomMove>,
    sub_parts: Vec<(String, Option<SubPart>)>,
}

fn apply(
    grid: &mut Escalator,
    clock: &ManualClock,
    op: Op,
    replay: &mut Replay,
) -> Result<(), EscalatorError> {
    match op {
        Op::InsertRows { section, index, count } => grid.insert_rows(section, index, count)?,
        Op::RemoveRows { section, index, count } => grid.remove_rows(section, index, count)?,
        Op::RefreshRows { section, index, count } => grid.refresh_rows(section, index, count)?,
        Op::InsertColumns { index, count } => grid.insert_columns(index, count)?,
        Op::RemoveColumns { index, count } => grid.remove_columns(index, count)?,
        Op::RefreshColumns { index, count } => grid.refresh_columns(index, count)?,
        Op::SetColumnWidth { index, px } => grid.set_column_width(index, px)?,
        Op::SetFrozenColumnCount { count } => grid.set_frozen_column_count(count)?,
        Op::SetRowHeight { section, px } => grid.set_default_row_height(section, px)?,
        Op::SetSpacer { row, height } => grid.set_spacer(row, height)?,
        Op::SetScrollTop { px } => grid.set_scroll_top(px),
        Op::SetScrollLeft { px } => grid.set_scroll_left(px),
        Op::ScrollToRow { row, destination, padding } => {
            grid.scroll_to_row(row, destination, padding)?;
        }
        Op::ScrollToColumn { column, destination, padding } => {
            grid.scroll_to_column(column, destination, padding)?;
        }
        Op::ScrollToSpacer { row, destination, padding } => {
            grid.scroll_to_spacer(row, destination, padding)?;
        }
        Op::ScrollToRowAndSpacer { row, destination, padding } => {
            grid.scroll_to_row_and_spacer(row, destination, padding)?;
        }
        Op::Wheel { dx, dy, mode } => {
            let prevented = grid.on_wheel(dx, dy, mode);
            debug!(dx, dy, prevented, "wheel");
        }
        Op::SetHeightMode { mode } => grid.set_height_mode(mode),
        Op::SetHeightByRows { rows } => grid.set_height_by_rows(rows)?,
        Op::SetSize { width, height } => grid.set_size(width, height)?,
        Op::SetFocusedRow { row } => grid.set_focused_row(row),
        Op::Attach => grid.attach(),
        Op::Detach => grid.detach(),
        Op::Flush => {
            grid.flush_deferred();
        }
        Op::Frames { count, ms } => {
            for _ in 0..count {
                clock.advance(ms);
                replay.dom_moves.extend(grid.on_animation_frame());
            }
        }
        Op::SubPart { name } => {
            let part = grid.sub_part_element(&name);
            replay.sub_parts.push((name, part));
        }
    }
    Ok(())
}

fn run(script_json: &str) -> Result<String, String> {
    let script: Script =
        serde_json::from_str(script_json).map_err(|e| format!("Error parsing script: {e}"))?;
    script.config.validate().map_err(|e| e.to_string())?;

    let clock = ManualClock::new();
    let mut grid = Escalator::with_environment(
        script.config,
        Box::new(FixedMeasurer::default()),
        Box::new(clock.clone()),
    )
    .map_err(|e| e.to_string())?;

    let mut replay = Replay::default();
    let total = script.ops.len();
    for (i, op) in script.ops.into_iter().enumerate() {
        debug!(step = i, ?op, "applying");
        apply(&mut grid, &clock, op, &mut replay).map_err(|e| format!("op {i}: {e}"))?;
    }
    grid.flush_deferred();
    info!(ops = total, "script replayed");

    let output = serde_json::json!({
        "snapshot": grid.snapshot(),
        "events": grid.drain_events(),
        "dom_moves": replay.dom_moves,
        "sub_parts": replay.sub_parts,
    });
    serde_json::to_string_pretty(&output).map_err(|e| format!("Error serializing JSON: {e}"))
}

fn init_logging() {
    let filter =
        EnvFilter::try_from_env("ESCALATOR_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() -> ExitCode {
    init_logging();
    let args: Vec<String> = env::args().collect();

    let Some(input_path) = args.get(1) else {
        eprintln!("Usage: escalator_cli <script.json> [-o output.json]");
        return ExitCode::FAILURE;
    };
    let output_path = match (args.get(2).map(String::as_str), args.get(3)) {
        (Some("-o"), Some(path)) => Some(path),
        _ => None,
    };

    let script = match fs::read_to_string(input_path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error reading {input_path}: {e}");
            return ExitCode::FAILURE;
        }
    };

    let json = match run(&script) {
        Ok(json) => json,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    match output_path {
        Some(path) => {
            if let Err(e) = fs::write(path, &json) {
                eprintln!("Error writing {path}: {e}");
                return ExitCode::FAILURE;
            }
            eprintln!("Written: {path}");
        }
        None => {
            let mut stdout = io::stdout();
            if let Err(e) = writeln!(stdout, "{json}") {
                eprintln!("Error writing output: {e}");
                return ExitCode::FAILURE;
            }
        }
    }
    ExitCode::SUCCESS
}
