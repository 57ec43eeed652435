//! Deterministic snapshot generation
//!
//! Snapshots capture the complete terminal state in a serializable format
//! for testing and debugging. Given the same byte stream, the terminal
//! must produce identical snapshots no matter how the stream was chunked.

use serde::{Deserialize, Serialize};

use super::cell::{Cell, Color, Style};
use super::modes::{Modes, MouseMode};
use super::screen::{Cursor, Screen};
use crate::config::Config;

/// A complete snapshot of the terminal state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Screen dimensions
    pub cols: usize,
    pub rows: usize,
    /// Written cells, row-major. Rows hold only the cells written so far.
    pub grid: Vec<Vec<CellSnapshot>>,
    pub cursor: Cursor,
    pub saved_cursor: Cursor,
    /// Scroll region
    pub scroll_top: usize,
    pub scroll_bottom: usize,
    pub modes: ModesSnapshot,
    /// Style applied to the next written cell
    pub pen: StyleSnapshot,
    pub title: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub working_dir: String,
}

/// Snapshot of a single cell
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellSnapshot {
    pub ch: char,
    #[serde(flatten)]
    pub style: StyleSnapshot,
}

/// Snapshot of a color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ColorSnapshot {
    #[default]
    Unset,
    Default,
    Rgb { r: u8, g: u8, b: u8 },
}

impl ColorSnapshot {
    fn is_unset(&self) -> bool {
        matches!(self, ColorSnapshot::Unset)
    }
}

/// Snapshot of colors and attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StyleSnapshot {
    #[serde(default, skip_serializing_if = "ColorSnapshot::is_unset")]
    pub fg: ColorSnapshot,
    #[serde(default, skip_serializing_if = "ColorSnapshot::is_unset")]
    pub bg: ColorSnapshot,
    #[serde(default, skip_serializing_if = "is_false")]
    pub bold: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub underline: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub blink: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub reverse: bool,
}

fn is_false(b: &bool) -> bool {
    !*b
}

/// Snapshot of terminal modes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModesSnapshot {
    pub autowrap: bool,
    pub cursor_visible: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub newline: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub alternate_screen: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub bracketed_paste: bool,
    pub mouse: String,
}

impl From<&Color> for ColorSnapshot {
    fn from(color: &Color) -> Self {
        match *color {
            Color::Unset => ColorSnapshot::Unset,
            Color::Default => ColorSnapshot::Default,
            Color::Rgb(r, g, b) => ColorSnapshot::Rgb { r, g, b },
        }
    }
}

impl From<&Style> for StyleSnapshot {
    fn from(style: &Style) -> Self {
        StyleSnapshot {
            fg: ColorSnapshot::from(&style.fg),
            bg: ColorSnapshot::from(&style.bg),
            bold: style.bold,
            underline: style.underline,
            blink: style.blink,
            reverse: style.reverse,
        }
    }
}

impl From<&Cell> for CellSnapshot {
    fn from(cell: &Cell) -> Self {
        CellSnapshot {
            ch: cell.ch,
            style: StyleSnapshot::from(&cell.style),
        }
    }
}

impl From<&Modes> for ModesSnapshot {
    fn from(modes: &Modes) -> Self {
        ModesSnapshot {
            autowrap: modes.autowrap,
            cursor_visible: modes.cursor_visible,
            newline: modes.newline,
            alternate_screen: modes.alternate_screen,
            bracketed_paste: modes.bracketed_paste,
            mouse: match modes.mouse {
                MouseMode::Off => "off".to_string(),
                MouseMode::X10 => "x10".to_string(),
                MouseMode::Normal => "normal".to_string(),
            },
        }
    }
}

impl Snapshot {
    /// Create a snapshot from a screen and the sideband config
    pub fn from_screen(screen: &Screen, config: &Config) -> Self {
        let grid = screen
            .grid()
            .iter()
            .map(|row| row.cells.iter().map(CellSnapshot::from).collect())
            .collect();

        Snapshot {
            cols: screen.cols(),
            rows: screen.rows(),
            grid,
            cursor: screen.cursor(),
            saved_cursor: screen.saved_cursor(),
            scroll_top: screen.scroll_top(),
            scroll_bottom: screen.scroll_bottom(),
            modes: ModesSnapshot::from(&screen.modes),
            pen: StyleSnapshot::from(&screen.pen),
            title: config.title.clone(),
            working_dir: config.working_dir.clone(),
        }
    }

    /// Convert snapshot to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Parse snapshot from JSON string
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Plain text of the grid, one line per row, trailing empty rows dropped
    pub fn to_text(&self) -> String {
        let mut lines: Vec<String> = self
            .grid
            .iter()
            .map(|row| row.iter().map(|c| c.ch).collect())
            .collect();
        while lines.last().is_some_and(|l| l.is_empty()) {
            lines.pop();
        }
        lines.join("\n")
    }
}
