//! Terminal Executor
//!
//! Ties together the parser, screen model and sideband handlers, and
//! applies parsed actions to update the terminal state. This is the main
//! integration point between a host and the core.
//!
//! A `Terminal` is single-threaded: `consume`, `resize` and the selection
//! calls must be serialized by the caller. The only state shared across
//! threads is the bell flag, see [`BellHandle`].

use std::io::{self, Read, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Receiver;
use std::sync::Arc;
use std::time::Duration;

use crate::config::{Config, Listeners, Options};
use crate::core::selection::{self, SelectionPoint, SelectionRange};
use crate::core::{Charset, Screen, Snapshot};
use crate::error::Result;
use crate::mouse::{self, Modifiers, MouseButton, MouseEventType};
use crate::parser::{Action, EscAction, Parser};
use crate::printer::Printer;
use crate::sideband::{self, ApcContext, ApcRegistry};

/// How long a host should show the bell before calling [`BellHandle::reset`]
pub const BELL_DURATION: Duration = Duration::from_millis(300);

/// Size of the chunks read by [`Terminal::run`]
const READ_BUFFER_SIZE: usize = 32 * 1024;

/// Shared "bell is ringing" flag.
///
/// BEL sets it; the host clears it from its own timer. Clearing is safe
/// from any thread at any time, since it touches nothing but the flag.
#[derive(Debug, Clone, Default)]
pub struct BellHandle(Arc<AtomicBool>);

impl BellHandle {
    pub fn is_ringing(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    pub fn reset(&self) {
        self.0.store(false, Ordering::Release);
    }

    fn ring(&self) {
        self.0.store(true, Ordering::Release);
    }
}

/// Terminal executor that processes parsed actions and updates the screen
pub struct Terminal {
    /// The terminal screen
    pub(crate) screen: Screen,
    /// The escape sequence parser
    parser: Parser,
    pub(crate) options: Options,
    config: Config,
    listeners: Listeners,
    apc: ApcRegistry,
    printer: Option<Box<dyn Printer + Send>>,
    /// Replies to the peer process (device attributes, status reports, mouse)
    responses: Box<dyn Write + Send>,
    selection: Option<SelectionRange>,
    bell: BellHandle,
    rang: bool,
    /// Reused between `consume` calls
    actions: Vec<Action>,
}

impl Terminal {
    /// Create a new terminal with the given dimensions
    pub fn new(rows: usize, cols: usize) -> Self {
        Self::with_options(rows, cols, Options::default())
    }

    /// Create a new terminal with explicit options
    pub fn with_options(rows: usize, cols: usize, options: Options) -> Self {
        Self::with_apc_registry(rows, cols, options, ApcRegistry::with_builtins())
    }

    /// Create a new terminal with explicit options and APC handlers
    pub fn with_apc_registry(
        rows: usize,
        cols: usize,
        options: Options,
        apc: ApcRegistry,
    ) -> Self {
        let mut parser = Parser::new();
        parser.set_debug(options.debug);
        Self {
            screen: Screen::new(rows, cols),
            parser,
            options,
            config: Config {
                rows,
                cols,
                ..Default::default()
            },
            listeners: Listeners::default(),
            apc,
            printer: None,
            responses: Box::new(io::sink()),
            selection: None,
            bell: BellHandle::default(),
            rang: false,
            actions: Vec::with_capacity(256),
        }
    }

    /// Get a reference to the screen
    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Toggle logging of unrecognized sequences and dropped bytes
    pub fn set_debug(&mut self, debug: bool) {
        self.options.debug = debug;
        self.parser.set_debug(debug);
    }

    /// Where replies to the peer process are written
    pub fn set_response_writer(&mut self, writer: impl Write + Send + 'static) {
        self.responses = Box::new(writer);
    }

    /// Install the sink for completed print jobs
    pub fn set_printer(&mut self, printer: impl Printer + Send + 'static) {
        self.printer = Some(Box::new(printer));
    }

    pub fn has_printer(&self) -> bool {
        self.printer.is_some()
    }

    /// Register an APC command handler after the existing ones
    pub fn register_apc<F>(&mut self, prefix: impl Into<String>, handler: F)
    where
        F: FnMut(&str, &mut ApcContext<'_>) + Send + 'static,
    {
        self.apc.register(prefix, handler);
    }

    /// Receive a copy of the config whenever title, size or working
    /// directory change
    pub fn subscribe(&mut self, capacity: usize) -> Receiver<Config> {
        self.listeners.subscribe(capacity)
    }

    /// Shared bell flag for the host's timer
    pub fn bell(&self) -> BellHandle {
        self.bell.clone()
    }

    /// Whether the bell rang since the last call
    pub fn take_bell(&mut self) -> bool {
        std::mem::take(&mut self.rang)
    }

    /// Whether the cursor was moved since the last call
    pub fn take_cursor_moved(&mut self) -> bool {
        self.screen.take_cursor_moved()
    }

    /// Process output from the peer process.
    ///
    /// Returns the trailing bytes of an incomplete UTF-8 sequence, to be
    /// prepended to the next chunk. Any selection is cleared.
    pub fn consume<'a>(&mut self, bytes: &'a [u8]) -> &'a [u8] {
        if !bytes.is_empty() {
            self.selection = None;
        }
        let mut actions = std::mem::take(&mut self.actions);
        let tail = self.parser.consume(bytes, &mut actions);
        for action in actions.drain(..) {
            self.apply_action(action);
        }
        self.actions = actions;
        tail
    }

    /// Feed everything `reader` produces until EOF
    pub fn run<R: Read>(&mut self, mut reader: R) -> Result<()> {
        let mut buf = vec![0u8; READ_BUFFER_SIZE];
        let mut pending = 0;
        loop {
            let n = match reader.read(&mut buf[pending..]) {
                Ok(0) => return Ok(()),
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };
            let len = pending + n;
            let tail = self.consume(&buf[..len]).len();
            buf.copy_within(len - tail..len, 0);
            pending = tail;
        }
    }

    /// Apply a single parsed action to the screen
    fn apply_action(&mut self, action: Action) {
        match action {
            Action::Print(c) => self.screen.write_rune(c),
            Action::Execute(byte) => self.execute_c0(byte),
            Action::Esc(esc) => self.execute_esc(esc),
            Action::DesignateCharset { slot, designator } => {
                self.screen
                    .charsets
                    .designate(slot, Charset::from_designator(designator));
            }
            Action::Csi(csi) => self.execute_csi(&csi),
            Action::Osc(payload) => {
                if sideband::handle_osc(&payload, &mut self.config, self.options.debug) {
                    self.listeners.notify(&self.config);
                }
            }
            Action::Dcs(payload) => {
                if let Some(response) = sideband::dcs_response(&payload, self.options.debug) {
                    self.respond(response);
                }
            }
            Action::Apc(payload) => {
                let mut ctx = ApcContext {
                    printer: &mut self.printer,
                };
                if !self.apc.dispatch(&payload, &mut ctx) && self.options.debug {
                    tracing::debug!("Unrecognised APC: {:?}", payload);
                }
            }
            Action::PrintJob(data) => match self.printer.as_mut() {
                Some(printer) => printer.print(&data),
                None => {
                    if self.options.debug {
                        tracing::debug!("No printer set, dropping {} bytes", data.len());
                    }
                }
            },
        }
    }

    /// Execute a C0 control character
    fn execute_c0(&mut self, byte: u8) {
        match byte {
            0x07 => {
                // BEL
                self.bell.ring();
                self.rang = true;
            }
            0x08 => self.screen.backspace(),
            0x09 => self.screen.tab(self.options.tab_width),
            // LF, VT, FF
            0x0A..=0x0C => self.screen.linefeed(),
            0x0D => self.screen.carriage_return(),
            0x0E => self.screen.charsets.shift_out(),
            0x0F => self.screen.charsets.shift_in(),
            _ => {}
        }
    }

    fn execute_esc(&mut self, esc: EscAction) {
        match esc {
            EscAction::SaveCursor => self.screen.save_cursor(),
            EscAction::RestoreCursor => self.screen.restore_cursor(),
            EscAction::Index => self.screen.index(),
            EscAction::ReverseIndex => self.screen.reverse_index(),
            EscAction::Keypad => {}
            EscAction::Unknown(c) => {
                if self.options.debug {
                    tracing::debug!("Unrecognised escape: ESC {:?}", c);
                }
            }
        }
    }

    /// Write a reply to the peer process
    pub(crate) fn respond(&mut self, bytes: &[u8]) {
        let result = self
            .responses
            .write_all(bytes)
            .and_then(|_| self.responses.flush());
        if let Err(e) = result {
            tracing::warn!("Failed to write terminal response: {}", e);
        }
    }

    /// Resize the visible area. A zero dimension is ignored.
    pub fn resize(&mut self, rows: usize, cols: usize) {
        if rows == 0 || cols == 0 {
            return;
        }
        self.screen.resize(rows, cols);
        if (self.config.rows, self.config.cols) != (rows, cols) {
            self.config.rows = rows;
            self.config.cols = cols;
            self.listeners.notify(&self.config);
        }
    }

    /// Report a button press at 0-based cell (row, col), if mouse
    /// reporting is on
    pub fn mouse_down(&mut self, button: MouseButton, modifiers: Modifiers, row: usize, col: usize) {
        self.report_mouse(button, MouseEventType::Press, modifiers, row, col);
    }

    /// Report a button release at 0-based cell (row, col)
    pub fn mouse_up(&mut self, button: MouseButton, modifiers: Modifiers, row: usize, col: usize) {
        self.report_mouse(button, MouseEventType::Release, modifiers, row, col);
    }

    fn report_mouse(
        &mut self,
        button: MouseButton,
        event: MouseEventType,
        modifiers: Modifiers,
        row: usize,
        col: usize,
    ) {
        let mode = self.screen.modes.mouse;
        if let Some(report) = mouse::encode_mouse(button, event, row, col, modifiers, mode) {
            self.respond(&report);
        }
    }

    /// Start a selection at 1-based (row, col)
    pub fn set_anchor(&mut self, row: usize, col: usize, block: bool) {
        self.selection = Some(SelectionRange::new(SelectionPoint::new(row, col), block));
    }

    /// Move the end of the current selection to 1-based (row, col)
    pub fn set_extent(&mut self, row: usize, col: usize) {
        if let Some(selection) = self.selection.as_mut() {
            selection.extent = SelectionPoint::new(row, col);
        }
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    pub fn selection(&self) -> Option<&SelectionRange> {
        self.selection.as_ref()
    }

    /// Select the word at 1-based (row, col). Returns false, leaving
    /// nothing selected, if the cell is not a letter or digit.
    pub fn select_word(&mut self, row: usize, col: usize) -> bool {
        self.selection = selection::word_at(self.screen.grid(), row, col);
        self.selection.is_some()
    }

    /// Text covered by the current selection, empty if there is none
    pub fn selected_text(&self) -> String {
        self.selection
            .as_ref()
            .map(|s| s.text(self.screen.grid()))
            .unwrap_or_default()
    }

    /// The (foreground, background) to paint at a cell.
    ///
    /// Unset and default colors take the theme colors from [`Options`], and
    /// reverse video is applied. Cells never written resolve like blanks.
    /// `None` outside the grid.
    pub fn cell_colors(&self, row: usize, col: usize) -> Option<((u8, u8, u8), (u8, u8, u8))> {
        if row >= self.screen.rows() || col >= self.screen.cols() {
            return None;
        }
        let style = self
            .screen
            .grid()
            .cell(row, col)
            .map(|cell| cell.style)
            .unwrap_or_default();
        Some(style.effective_colors(
            self.options.theme_foreground,
            self.options.theme_background,
        ))
    }

    /// The grid as text, rows joined by newlines
    pub fn text(&self) -> String {
        self.screen.grid().text()
    }

    /// Capture the full state
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::from_screen(&self.screen, &self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Color, Cursor, MouseMode};
    use std::sync::Mutex;

    /// Response writer the test can read back
    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl SharedBuf {
        fn take(&self) -> Vec<u8> {
            std::mem::take(&mut *self.0.lock().unwrap())
        }
    }

    fn terminal_with_responses(rows: usize, cols: usize) -> (Terminal, SharedBuf) {
        let mut term = Terminal::new(rows, cols);
        let buf = SharedBuf::default();
        term.set_response_writer(buf.clone());
        (term, buf)
    }

    #[test]
    fn test_terminal_print() {
        let mut term = Terminal::new(24, 80);
        term.consume(b"Hello");

        assert_eq!(term.text(), "Hello");
        assert_eq!(term.screen().cursor(), Cursor { row: 0, col: 5 });
    }

    #[test]
    fn test_terminal_crlf() {
        let mut term = Terminal::new(24, 80);
        term.consume(b"hello\r\nworld");
        assert_eq!(term.text(), "hello\nworld");
        assert_eq!(term.screen().cursor(), Cursor { row: 1, col: 5 });
    }

    #[test]
    fn test_terminal_newline_mode() {
        let mut term = Terminal::new(24, 80);
        term.consume(b"\x1b[?20hhello\n\x0b\x0cworld");
        assert_eq!(term.text(), "hello\n\n\nworld");
        assert_eq!(term.screen().cursor(), Cursor { row: 3, col: 5 });

        term.consume(b"\x1b[?20l\nX");
        assert_eq!(term.screen().cursor(), Cursor { row: 4, col: 6 });
    }

    #[test]
    fn test_terminal_colors() {
        let mut term = Terminal::new(24, 80);
        term.consume(b"\x1b[31mR\x1b[0mN");

        let red = term.screen().grid().cell(0, 0).unwrap();
        assert_eq!(red.style.fg, Color::Rgb(170, 0, 0));
        let plain = term.screen().grid().cell(0, 1).unwrap();
        assert!(plain.style.fg.is_unset());
    }

    #[test]
    fn test_terminal_bell() {
        let mut term = Terminal::new(24, 80);
        let bell = term.bell();
        term.consume(b"\x07");

        assert!(bell.is_ringing());
        assert!(term.take_bell());
        assert!(!term.take_bell());

        bell.reset();
        assert!(!term.bell().is_ringing());
    }

    #[test]
    fn test_terminal_cursor_moved() {
        let mut term = Terminal::new(24, 80);
        term.consume(b"abc");
        assert!(!term.take_cursor_moved());

        term.consume(b"\x1b[2;2H");
        assert!(term.take_cursor_moved());
    }

    #[test]
    fn test_terminal_title_notifies() {
        let mut term = Terminal::new(24, 80);
        let rx = term.subscribe(8);

        term.consume(b"\x1b]0;My Title\x07");
        assert_eq!(term.config().title, "My Title");
        assert_eq!(rx.try_recv().unwrap().title, "My Title");

        term.consume(b"\x1b]1;icon\x07");
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_terminal_resize_notifies() {
        let mut term = Terminal::new(24, 80);
        let rx = term.subscribe(8);

        term.resize(30, 100);
        let config = rx.try_recv().unwrap();
        assert_eq!((config.rows, config.cols), (30, 100));

        term.resize(0, 100);
        term.resize(30, 100);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_terminal_dcs_response() {
        let (mut term, buf) = terminal_with_responses(24, 80);
        term.consume(b"\x1bP+q544e\x1b\\");
        assert_eq!(buf.take(), b"\x1bP0+r\x1b\\");
    }

    #[test]
    fn test_terminal_printer() {
        let jobs = Arc::new(Mutex::new(Vec::new()));
        let mut term = Terminal::new(24, 80);
        let sink = Arc::clone(&jobs);
        term.set_printer(move |data: &[u8]| sink.lock().unwrap().push(data.to_vec()));

        term.consume(b"before\x1b[5ipage one\x1b[4iafter");

        assert_eq!(*jobs.lock().unwrap(), vec![b"page one".to_vec()]);
        assert_eq!(term.text(), "beforeafter");
    }

    #[test]
    fn test_terminal_custom_apc() {
        let mut term = Terminal::new(24, 80);
        let seen = Arc::new(Mutex::new(String::new()));
        let sink = Arc::clone(&seen);
        term.register_apc("greet:", move |arg, _| *sink.lock().unwrap() = arg.to_string());

        term.consume(b"\x1b_greet:world\x00");
        assert_eq!(*seen.lock().unwrap(), "world");
    }

    #[test]
    fn test_terminal_mouse() {
        let (mut term, buf) = terminal_with_responses(24, 80);
        let mods = Modifiers::default();

        term.mouse_down(MouseButton::Left, mods, 0, 0);
        assert!(buf.take().is_empty());

        term.consume(b"\x1b[?1000h");
        assert_eq!(term.screen().modes.mouse, MouseMode::Normal);
        term.mouse_down(MouseButton::Left, mods, 0, 0);
        term.mouse_up(MouseButton::Left, mods, 0, 0);
        assert_eq!(buf.take(), b"\x1b[M !!\x1b[M#!!");

        term.consume(b"\x1b[?1000l\x1b[?9h");
        assert_eq!(term.screen().modes.mouse, MouseMode::X10);
        term.mouse_up(MouseButton::Left, mods, 0, 0);
        assert!(buf.take().is_empty());
    }

    #[test]
    fn test_terminal_selection_cleared_by_output() {
        let mut term = Terminal::new(24, 80);
        term.consume(b"Hello World!");

        assert!(term.select_word(1, 7));
        assert_eq!(term.selected_text(), "World");

        term.consume(b"");
        assert!(term.selection().is_some());

        term.consume(b"x");
        assert!(term.selection().is_none());
        assert_eq!(term.selected_text(), "");
    }

    #[test]
    fn test_terminal_drag_selection() {
        let mut term = Terminal::new(24, 80);
        term.consume(b"ABC\r\nDEF\r\nGHI");

        term.set_anchor(3, 2, false);
        term.set_extent(1, 2);
        assert_eq!(term.selected_text(), "BC\nDEF\nGH");

        term.set_anchor(1, 2, true);
        term.set_extent(3, 3);
        assert_eq!(term.selected_text(), "BC\nEF\nHI");

        term.clear_selection();
        assert_eq!(term.selected_text(), "");
    }

    #[test]
    fn test_terminal_run() {
        let mut term = Terminal::new(24, 80);
        term.run(&b"\x1b[1mbold\x1b[0m \xe2\x94\x80"[..]).unwrap();
        assert_eq!(term.text(), "bold ─");
        assert!(term.screen().grid().cell(0, 0).unwrap().style.bold);
    }

    #[test]
    fn test_terminal_cell_colors_use_theme() {
        let options = Options {
            theme_foreground: (200, 200, 200),
            theme_background: (10, 20, 30),
            ..Options::default()
        };
        let mut term = Terminal::with_options(2, 10, options);
        term.consume(b"a\x1b[31mb\x1b[0;7mc\x1b[32;49md");

        assert_eq!(term.cell_colors(0, 0), Some(((200, 200, 200), (10, 20, 30))));
        assert_eq!(term.cell_colors(0, 1), Some(((170, 0, 0), (10, 20, 30))));
        // Reverse video swaps the theme pair
        assert_eq!(term.cell_colors(0, 2), Some(((10, 20, 30), (200, 200, 200))));
        assert_eq!(term.cell_colors(0, 3), Some(((10, 20, 30), (0, 170, 0))));

        // Unwritten cells resolve like blanks; outside the grid there is nothing
        assert_eq!(term.cell_colors(1, 9), Some(((200, 200, 200), (10, 20, 30))));
        assert_eq!(term.cell_colors(2, 0), None);
        assert_eq!(term.cell_colors(0, 10), None);
    }

    #[test]
    fn test_terminal_with_apc_registry() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&seen);
        let mut registry = ApcRegistry::new();
        registry.register("note:", move |arg, _| log.lock().unwrap().push(arg.to_string()));

        let mut term = Terminal::with_apc_registry(2, 10, Options::default(), registry);
        term.consume(b"\x1b_note:hi\x00\x1b_set printer:_file:/tmp/x\x00");

        assert_eq!(*seen.lock().unwrap(), vec!["hi".to_string()]);
        // The built-ins were not registered
        assert!(!term.has_printer());
    }
}
