//! Parser State Machine
//!
//! Decodes a byte stream one Unicode scalar at a time and turns it into
//! [`Action`]s. The stream may be split anywhere: partial escape sequences
//! are carried in the parser between calls, and a trailing incomplete
//! UTF-8 sequence is handed back to the caller to prepend to the next chunk.
//!
//! Modes:
//! - Ground: text and C0 controls
//! - Csi: after `ESC [`, collecting `[0-9;=?>]` until a final rune
//! - Osc: after `ESC ]`, until BEL, NUL or `ESC \`
//! - Dcs: after `ESC P`, until `\`
//! - Apc: after `ESC _`, until NUL or `ESC \`
//! - Charset: after `ESC (` / `ESC )`, waiting for the designator
//! - Printing: after `CSI 5 i`, spooling raw bytes until `CSI 4 i`
//!
//! A pending ESC is tracked separately from the mode so that string
//! terminators (`ESC \`) can be recognized inside OSC and APC payloads.

use unicode_width::UnicodeWidthChar;

use super::action::{Action, CsiAction, EscAction};
use crate::core::CharsetSlot;

/// Byte sequence that ends a printer spool (`CSI 4 i`)
const PRINT_STOP: &[u8] = b"\x1b[4i";

/// Parser mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Ground,
    Csi,
    Osc,
    Dcs,
    Apc,
    Charset(CharsetSlot),
    Printing,
}

/// Result of decoding the rune at the front of a buffer
enum Decoded {
    Rune(char, usize),
    Incomplete,
    Invalid,
}

fn decode(bytes: &[u8]) -> Decoded {
    let window = &bytes[..bytes.len().min(4)];
    let valid = match std::str::from_utf8(window) {
        Ok(s) => s,
        Err(e) if e.valid_up_to() > 0 => match std::str::from_utf8(&window[..e.valid_up_to()]) {
            Ok(s) => s,
            Err(_) => return Decoded::Invalid,
        },
        Err(e) if e.error_len().is_none() => return Decoded::Incomplete,
        Err(_) => return Decoded::Invalid,
    };
    match valid.chars().next() {
        Some(c) => Decoded::Rune(c, c.len_utf8()),
        None => Decoded::Incomplete,
    }
}

/// The terminal parser
#[derive(Debug)]
pub struct Parser {
    mode: Mode,
    /// An ESC was the last rune seen
    escape: bool,
    /// Accumulated CSI parameters or string payload
    code: String,
    /// Raw bytes collected while printing
    spool: Vec<u8>,
    debug: bool,
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser {
    /// Create a new parser in the ground state
    pub fn new() -> Self {
        Self {
            mode: Mode::Ground,
            escape: false,
            code: String::with_capacity(64),
            spool: Vec::new(),
            debug: false,
        }
    }

    /// Log dropped input
    pub fn set_debug(&mut self, debug: bool) {
        self.debug = debug;
    }

    /// Reset the parser to initial state
    pub fn reset(&mut self) {
        self.mode = Mode::Ground;
        self.escape = false;
        self.code.clear();
        self.spool.clear();
    }

    /// Whether no sequence is in progress
    pub fn is_ground(&self) -> bool {
        self.mode == Mode::Ground && !self.escape
    }

    /// Decode `bytes`, appending actions in stream order.
    ///
    /// Returns the trailing bytes that form an incomplete UTF-8 sequence;
    /// the caller must prepend them to the next chunk. Everything else is
    /// consumed, with partial escape sequences kept in the parser.
    pub fn consume<'a>(&mut self, bytes: &'a [u8], actions: &mut Vec<Action>) -> &'a [u8] {
        let mut rest = bytes;
        while let Some(&first) = rest.first() {
            if self.mode == Mode::Printing {
                self.spool_byte(first, actions);
                rest = &rest[1..];
                continue;
            }
            match decode(rest) {
                Decoded::Rune(c, len) => {
                    self.advance(c, actions);
                    rest = &rest[len..];
                }
                Decoded::Incomplete => break,
                Decoded::Invalid => {
                    if self.debug {
                        tracing::debug!("Invalid UTF-8 byte {:#04x}", first);
                    }
                    rest = &rest[1..];
                }
            }
        }
        rest
    }

    fn advance(&mut self, c: char, actions: &mut Vec<Action>) {
        if c == '\x1b' {
            self.escape = true;
            if matches!(self.mode, Mode::Csi | Mode::Charset(_)) {
                self.code.clear();
                self.mode = Mode::Ground;
            }
            return;
        }

        if self.mode == Mode::Dcs {
            self.escape = false;
            if c == '\\' {
                actions.push(Action::Dcs(std::mem::take(&mut self.code)));
                self.mode = Mode::Ground;
            } else {
                self.code.push(c);
            }
            return;
        }

        if self.escape {
            self.escape = false;
            self.escape_successor(c, actions);
            return;
        }

        match self.mode {
            Mode::Apc => {
                if c == '\0' {
                    actions.push(Action::Apc(std::mem::take(&mut self.code)));
                    self.mode = Mode::Ground;
                } else {
                    self.code.push(c);
                }
            }
            Mode::Osc => {
                if c == '\x07' || c == '\0' {
                    actions.push(Action::Osc(std::mem::take(&mut self.code)));
                    self.mode = Mode::Ground;
                } else {
                    self.code.push(c);
                }
            }
            Mode::Charset(slot) => {
                actions.push(Action::DesignateCharset {
                    slot,
                    designator: c,
                });
                self.mode = Mode::Ground;
            }
            Mode::Csi => self.csi_rune(c, actions),
            Mode::Ground => self.ground_rune(c, actions),
            // Both consumed before a rune is decoded
            Mode::Dcs | Mode::Printing => {}
        }
    }

    /// Handle the rune right after ESC
    fn escape_successor(&mut self, c: char, actions: &mut Vec<Action>) {
        if c == '\\' {
            let payload = std::mem::take(&mut self.code);
            match self.mode {
                Mode::Osc => actions.push(Action::Osc(payload)),
                Mode::Apc => actions.push(Action::Apc(payload)),
                _ => {}
            }
            self.mode = Mode::Ground;
            return;
        }

        if matches!(self.mode, Mode::Osc | Mode::Apc) {
            if self.debug {
                tracing::debug!("Unterminated string sequence: {:?}", self.code);
            }
            self.code.clear();
        }
        self.mode = Mode::Ground;

        match c {
            '[' => {
                self.code.clear();
                self.mode = Mode::Csi;
            }
            ']' => self.mode = Mode::Osc,
            'P' => self.mode = Mode::Dcs,
            '_' => self.mode = Mode::Apc,
            '(' => self.mode = Mode::Charset(CharsetSlot::G0),
            ')' => self.mode = Mode::Charset(CharsetSlot::G1),
            '7' => actions.push(Action::Esc(EscAction::SaveCursor)),
            '8' => actions.push(Action::Esc(EscAction::RestoreCursor)),
            'D' => actions.push(Action::Esc(EscAction::Index)),
            'M' => actions.push(Action::Esc(EscAction::ReverseIndex)),
            '=' | '>' => actions.push(Action::Esc(EscAction::Keypad)),
            _ => actions.push(Action::Esc(EscAction::Unknown(c))),
        }
    }

    fn csi_rune(&mut self, c: char, actions: &mut Vec<Action>) {
        // Some shells pad parameters with leading NULs
        if c == '\0' && self.code.is_empty() {
            return;
        }
        if c.is_ascii_digit() || matches!(c, ';' | '=' | '?' | '>') {
            self.code.push(c);
            return;
        }

        let params = std::mem::take(&mut self.code);
        self.mode = Mode::Ground;
        if c == 'i' && params == "5" {
            self.spool.clear();
            self.mode = Mode::Printing;
            return;
        }
        actions.push(Action::Csi(CsiAction::new(&params, c)));
    }

    fn ground_rune(&mut self, c: char, actions: &mut Vec<Action>) {
        match c {
            '\x07' | '\x08' | '\t' | '\n' | '\x0b' | '\x0c' | '\r' | '\x0e' | '\x0f' => {
                actions.push(Action::Execute(c as u8));
            }
            '\0' => {}
            _ if c.width().is_none() => {
                if self.debug {
                    tracing::debug!("Dropping non-printing rune {:?}", c);
                }
            }
            _ => actions.push(Action::Print(c)),
        }
    }

    fn spool_byte(&mut self, byte: u8, actions: &mut Vec<Action>) {
        self.spool.push(byte);
        if self.spool.ends_with(PRINT_STOP) {
            let len = self.spool.len() - PRINT_STOP.len();
            self.spool.truncate(len);
            actions.push(Action::PrintJob(std::mem::take(&mut self.spool)));
            self.mode = Mode::Ground;
        }
    }
}
