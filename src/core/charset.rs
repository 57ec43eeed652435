//! Character set handling for terminal emulation
//!
//! Supports the G0/G1 slots, Shift Out / Shift In, and DEC Special Graphics
//! (line drawing).

use serde::{Deserialize, Serialize};

/// Character set designations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Charset {
    /// ASCII (US) - default
    #[default]
    Ascii,
    /// DEC Special Graphics (line drawing characters)
    DecSpecialGraphics,
    /// Any other designator; passes runes through unchanged
    Alternate,
}

impl Charset {
    /// Parse the designator that follows `ESC (` or `ESC )`
    pub fn from_designator(c: char) -> Self {
        match c {
            'B' => Charset::Ascii,
            '0' => Charset::DecSpecialGraphics,
            _ => Charset::Alternate,
        }
    }

    /// Translate a rune through this charset
    pub fn translate(self, c: char) -> char {
        match self {
            Charset::Ascii | Charset::Alternate => c,
            Charset::DecSpecialGraphics => translate_dec_special_graphics(c),
        }
    }
}

/// Which slot an `ESC (` / `ESC )` designation targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CharsetSlot {
    G0,
    G1,
}

/// Character set state for the G0/G1 slots
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharsetState {
    /// G0 character set
    pub g0: Charset,
    /// G1 character set
    pub g1: Charset,
    /// Whether G1 is shifted in (SO) instead of G0
    pub use_g1: bool,
}

impl CharsetState {
    /// Create new charset state with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Designate a charset into a slot
    pub fn designate(&mut self, slot: CharsetSlot, charset: Charset) {
        match slot {
            CharsetSlot::G0 => self.g0 = charset,
            CharsetSlot::G1 => self.g1 = charset,
        }
    }

    /// Shift Out (SO) - select G1
    pub fn shift_out(&mut self) {
        self.use_g1 = true;
    }

    /// Shift In (SI) - select G0
    pub fn shift_in(&mut self) {
        self.use_g1 = false;
    }

    /// Get the currently active charset
    pub fn current(&self) -> Charset {
        if self.use_g1 {
            self.g1
        } else {
            self.g0
        }
    }

    /// Translate a character through the current charset
    pub fn translate(&self, c: char) -> char {
        self.current().translate(c)
    }
}

/// Translate DEC Special Graphics characters
fn translate_dec_special_graphics(c: char) -> char {
    match c {
        '`' => '◆', // Diamond
        'a' => '▒', // Checkerboard
        'b' => '␉', // HT symbol
        'c' => '␌', // FF symbol
        'd' => '␍', // CR symbol
        'e' => '␊', // LF symbol
        'f' => '°',  // Degree symbol
        'g' => '±',  // Plus/minus
        'h' => '␤', // NL symbol
        'i' => '␋', // VT symbol
        'j' => '┘', // Lower right corner
        'k' => '┐', // Upper right corner
        'l' => '┌', // Upper left corner
        'm' => '└', // Lower left corner
        'n' => '┼', // Crossing lines
        'o' => '⎺', // Scan line 1
        'p' => '⎻', // Scan line 3
        'q' => '─', // Horizontal line (scan line 5)
        'r' => '─', // Scan line 7
        's' => '⎽', // Scan line 9
        't' => '├', // Left tee
        'u' => '┤', // Right tee
        'v' => '┴', // Bottom tee
        'w' => '┬', // Top tee
        'x' => '│', // Vertical line
        'y' => '≤', // Less than or equal
        'z' => '≥', // Greater than or equal
        '{' => 'π',  // Pi
        '|' => '≠', // Not equal
        '}' => '£',  // Pound sterling
        '~' => '·',  // Centered dot
        _ => c,
    }
}
