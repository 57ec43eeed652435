//! CSI command dispatch
//!
//! Maps a completed `ESC [ params final` sequence onto screen operations.
//! Cursor positions in parameters are 1-based; the screen is 0-based.

use crate::core::{EraseMode, MouseMode};
use crate::parser::CsiAction;
use crate::sgr;
use crate::terminal::Terminal;

impl Terminal {
    /// Run a CSI command from its parameter text and final character, as
    /// if `ESC [ {params}{final_char}` had been received
    pub fn dispatch_csi(&mut self, params: &str, final_char: char) {
        self.execute_csi(&CsiAction::new(params, final_char));
    }

    pub(crate) fn execute_csi(&mut self, csi: &CsiAction) {
        let p = &csi.params;
        let cursor = self.screen.cursor();

        match csi.final_char {
            // Cursor movement
            'A' => {
                // CUU - Cursor Up
                let n = p.get_or_default(0, 1) as usize;
                self.screen
                    .move_cursor(cursor.row.saturating_sub(n), cursor.col);
            }
            'B' => {
                // CUD - Cursor Down
                let n = p.get_or_default(0, 1) as usize;
                self.screen
                    .move_cursor(cursor.row.saturating_add(n), cursor.col);
            }
            'C' => {
                // CUF - Cursor Forward
                let n = p.get_or_default(0, 1) as usize;
                self.screen
                    .move_cursor(cursor.row, cursor.col.saturating_add(n));
            }
            'D' => {
                // CUB - Cursor Backward
                let n = p.get_or_default(0, 1) as usize;
                self.screen
                    .move_cursor(cursor.row, cursor.col.saturating_sub(n));
            }
            'E' => {
                // CNL - Cursor Next Line
                let n = p.get_or_default(0, 1) as usize;
                self.screen.move_cursor(cursor.row.saturating_add(n), 0);
            }
            'F' => {
                // CPL - Cursor Previous Line
                let n = p.get_or_default(0, 1) as usize;
                self.screen.move_cursor(cursor.row.saturating_sub(n), 0);
            }
            'G' => {
                // CHA - Cursor Character Absolute
                let col = p.get_or_default(0, 1) - 1;
                self.screen.move_cursor(cursor.row, col as usize);
            }
            'd' => {
                // VPA - Vertical Position Absolute
                let row = p.get_or_default(0, 1) - 1;
                self.screen.move_cursor(row as usize, cursor.col);
            }
            'H' | 'f' => {
                // CUP - Cursor Position, HVP
                let row = p.get_or_default(0, 1) - 1;
                let col = p.get_or_default(1, 1) - 1;
                self.screen.move_cursor(row as usize, col as usize);
            }

            // Erase operations
            'J' => {
                // ED - Erase in Display
                match EraseMode::from_param(p.get(0, 0)) {
                    Some(mode) => self.screen.erase_display(mode),
                    None => self.log_unrecognized(csi),
                }
            }
            'K' => {
                // EL - Erase in Line
                match EraseMode::from_param(p.get(0, 0)) {
                    Some(mode) => self.screen.erase_line(mode),
                    None => self.log_unrecognized(csi),
                }
            }
            'X' => {
                // ECH - Erase Characters
                let n = p.get_or_default(0, 1) as usize;
                self.screen.erase_cells(n);
            }

            // Insert/delete
            'L' => {
                // IL - Insert Lines
                let n = p.get_or_default(0, 1) as usize;
                self.screen.insert_lines(n);
            }
            'M' => {
                // DL - Delete Lines
                let n = p.get_or_default(0, 1) as usize;
                self.screen.delete_lines(n);
            }
            '@' => {
                // ICH - Insert Characters
                let n = p.get_or_default(0, 1) as usize;
                self.screen.insert_cells(n);
            }
            'P' => {
                // DCH - Delete Characters
                let n = p.get_or_default(0, 1) as usize;
                self.screen.delete_cells(n);
            }

            // Scrolling
            'r' => {
                // DECSTBM - Set Top and Bottom Margins
                if p.is_empty() {
                    self.screen.reset_scroll_region();
                } else {
                    let top = p.get_or_default(0, 1) - 1;
                    let bottom = p.get_or_default(1, self.screen.rows() as u32);
                    self.screen
                        .set_scroll_region(top as usize, bottom.saturating_sub(1) as usize);
                }
            }
            'S' => {
                // SU - Scroll Up
                let n = p.get_or_default(0, 1) as usize;
                self.screen.scroll_up(n);
            }
            'T' => {
                // SD - Scroll Down
                let n = p.get_or_default(0, 1) as usize;
                self.screen.scroll_down(n);
            }

            's' => self.screen.save_cursor(),
            'u' => self.screen.restore_cursor(),

            // Modes
            'h' => self.set_modes(csi, true),
            'l' => self.set_modes(csi, false),

            'm' => {
                // SGR - Select Graphic Rendition
                if p.private || p.marker.is_some() {
                    self.log_unrecognized(csi);
                } else {
                    sgr::apply(&p.values, &mut self.screen.pen, &self.options);
                }
            }

            'i' => {
                // MC - Media Copy. `5 i` never gets here: the parser spools
                // until `4 i` and hands over the whole job.
                if p.get(0, 0) == 4 {
                    if self.options.debug {
                        tracing::debug!("Printer stop without a print job");
                    }
                } else {
                    self.log_unrecognized(csi);
                }
            }

            // Device status
            'c' => {
                // DA - Primary Device Attributes
                if p.raw.is_empty() {
                    self.respond(b"\x1b[?1;2c");
                } else {
                    self.log_unrecognized(csi);
                }
            }
            'n' => {
                // DSR - Device Status Report
                match p.get(0, 0) {
                    5 => self.respond(b"\x1b[0n"),
                    6 => {
                        let col = cursor.col.min(self.screen.cols().saturating_sub(1));
                        let report = format!("\x1b[{};{}R", cursor.row + 1, col + 1);
                        self.respond(report.as_bytes());
                    }
                    _ => self.log_unrecognized(csi),
                }
            }

            _ => self.log_unrecognized(csi),
        }
    }

    fn set_modes(&mut self, csi: &CsiAction, enable: bool) {
        let p = &csi.params;
        if p.marker.is_some() {
            self.log_unrecognized(csi);
            return;
        }
        for mode in p.values.iter().flatten().copied() {
            if p.private {
                self.set_dec_mode(mode, enable);
            } else {
                self.set_mode(mode, enable);
            }
        }
    }

    /// Set DEC private mode
    fn set_dec_mode(&mut self, mode: u32, enable: bool) {
        let modes = &mut self.screen.modes;
        match mode {
            7 => {
                // DECAWM - Autowrap Mode
                modes.autowrap = enable;
            }
            9 => {
                // X10 mouse reporting
                modes.mouse = if enable { MouseMode::X10 } else { MouseMode::Off };
            }
            20 => modes.newline = enable,
            25 => {
                // DECTCEM - Text Cursor Enable Mode
                modes.cursor_visible = enable;
            }
            47 => {
                // Alternate screen buffer (old xterm)
                self.screen.set_alternate_screen(enable);
            }
            1000 => {
                // Normal mouse tracking
                modes.mouse = if enable {
                    MouseMode::Normal
                } else {
                    MouseMode::Off
                };
            }
            1049 => {
                // Alternate screen with cursor save/restore
                if enable {
                    if !self.screen.modes.alternate_screen {
                        self.screen.save_cursor();
                    }
                    self.screen.set_alternate_screen(true);
                } else {
                    self.screen.set_alternate_screen(false);
                    self.screen.restore_cursor();
                }
            }
            2004 => modes.bracketed_paste = enable,
            _ => {
                if self.options.debug {
                    tracing::debug!("Unknown DEC mode: {} = {}", mode, enable);
                }
            }
        }
    }

    /// Set ANSI mode
    fn set_mode(&mut self, mode: u32, enable: bool) {
        match mode {
            20 => {
                // LNM - Line Feed/New Line Mode
                self.screen.modes.newline = enable;
            }
            _ => {
                if self.options.debug {
                    tracing::debug!("Unknown mode: {} = {}", mode, enable);
                }
            }
        }
    }

    fn log_unrecognized(&self, csi: &CsiAction) {
        if self.options.debug {
            tracing::debug!("Unrecognised CSI: {:?} {:?}", csi.params.raw, csi.final_char);
        }
    }
}
