//! Terminal Actions
//!
//! Semantic operations produced by the parser that should be applied to the screen.

use serde::{Deserialize, Serialize};

use crate::core::CharsetSlot;

/// A terminal action produced by the parser
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    /// Print a character to the screen
    Print(char),

    /// Execute a C0 control character (BEL, BS, HT, LF, VT, FF, CR, SO, SI)
    Execute(u8),

    /// A one-shot ESC sequence
    Esc(EscAction),

    /// `ESC (` or `ESC )` followed by a charset designator
    DesignateCharset { slot: CharsetSlot, designator: char },

    /// Execute a CSI (Control Sequence Introducer) command
    Csi(CsiAction),

    /// OSC payload, `<id>;<text>`
    Osc(String),

    /// DCS payload
    Dcs(String),

    /// APC payload
    Apc(String),

    /// A completed printer spool block
    PrintJob(Vec<u8>),
}

/// ESC sequence actions (non-CSI)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EscAction {
    /// ESC 7 - Save cursor (DECSC)
    SaveCursor,

    /// ESC 8 - Restore cursor (DECRC)
    RestoreCursor,

    /// ESC D - Index (IND) - move cursor down, scroll if at bottom
    Index,

    /// ESC M - Reverse Index (RI) - move cursor up, scroll if at top
    ReverseIndex,

    /// ESC = / ESC > - keypad mode, accepted and ignored
    Keypad,

    /// Unknown ESC sequence
    Unknown(char),
}

/// CSI (Control Sequence Introducer) actions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CsiAction {
    /// The final character that identifies the command
    pub final_char: char,
    /// Parsed parameters
    pub params: CsiParams,
}

impl CsiAction {
    pub fn new(params: &str, final_char: char) -> Self {
        Self {
            final_char,
            params: CsiParams::parse(params),
        }
    }
}

/// The parameter string of a CSI sequence split into fields.
///
/// A field that is empty or not a number is `None`, so every operation can
/// apply its own default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CsiParams {
    /// Raw parameter text, as received
    pub raw: String,
    /// Leading `?` (DEC private)
    pub private: bool,
    /// Any other leading marker (`>` or `=`)
    pub marker: Option<char>,
    /// `;`-separated fields
    pub values: Vec<Option<u32>>,
}

impl CsiParams {
    pub fn parse(raw: &str) -> Self {
        let mut rest = raw;
        let mut private = false;
        let mut marker = None;
        if let Some(stripped) = rest.strip_prefix('?') {
            private = true;
            rest = stripped;
        } else if let Some(c) = rest.chars().next().filter(|c| matches!(c, '>' | '=')) {
            marker = Some(c);
            rest = &rest[c.len_utf8()..];
        }

        let values = if rest.is_empty() {
            Vec::new()
        } else {
            rest.split(';').map(|f| f.parse::<u32>().ok()).collect()
        };

        Self {
            raw: raw.to_string(),
            private,
            marker,
            values,
        }
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Get the field at index, or `default` if missing or malformed
    pub fn get(&self, index: usize, default: u32) -> u32 {
        self.values.get(index).copied().flatten().unwrap_or(default)
    }

    /// Get the field at index, treating 0 as default as well
    pub fn get_or_default(&self, index: usize, default: u32) -> u32 {
        match self.get(index, default) {
            0 => default,
            v => v,
        }
    }
}
