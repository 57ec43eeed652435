//! Terminal mode flags
//!
//! Modes toggled by `CSI h` / `CSI l` that change how output is applied
//! or how host input should be encoded.

use serde::{Deserialize, Serialize};

/// Mouse reporting mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MouseMode {
    /// No mouse reporting
    #[default]
    Off,
    /// X10 compatibility mode (DECSET 9) - report button press only
    X10,
    /// Normal tracking mode (DECSET 1000) - report press and release
    Normal,
}

/// Terminal mode flags
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modes {
    /// DECAWM - characters written past the right margin wrap to the next line
    pub autowrap: bool,

    /// LNM - line feed also returns the cursor to column 0
    pub newline: bool,

    /// Show cursor (DECTCEM - DECSET 25)
    pub cursor_visible: bool,

    /// Alternate screen buffer active (DECSET 1049/47)
    pub alternate_screen: bool,

    /// Bracketed paste mode (DECSET 2004)
    pub bracketed_paste: bool,

    /// Mouse reporting mode
    pub mouse: MouseMode,
}

impl Default for Modes {
    fn default() -> Self {
        Self {
            autowrap: true,
            newline: false,
            cursor_visible: true,
            alternate_screen: false,
            bracketed_paste: false,
            mouse: MouseMode::Off,
        }
    }
}
