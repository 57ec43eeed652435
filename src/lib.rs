//! vtcore - VT/xterm terminal emulation core
//!
//! Decodes the byte stream a program writes to its terminal and keeps a
//! character grid in sync with it. No rendering, PTY or keyboard handling
//! lives here; a host feeds bytes in and reads state out.
//!
//! - `parser`: streaming escape sequence decoder
//! - `core`: grid, screen, selection and snapshots
//! - `sgr`: text attribute and color resolution
//! - `sideband`: OSC, DCS and APC handlers
//! - `terminal`: the [`Terminal`] facade tying them together
//!
//! ```
//! use vtcore::Terminal;
//!
//! let mut term = Terminal::new(24, 80);
//! let tail = term.consume(b"\x1b[1mhello\x1b[0m \xe2\x94");
//! assert_eq!(tail, b"\xe2\x94");
//! assert_eq!(term.text(), "hello ");
//! ```

pub mod config;
pub mod core;
mod csi;
pub mod error;
pub mod mouse;
pub mod parser;
pub mod printer;
pub mod sgr;
pub mod sideband;
pub mod terminal;

pub use config::{Config, Options};
pub use error::{Error, Result};
pub use mouse::{Modifiers, MouseButton, MouseEventType};
pub use printer::{EditorPrinter, FilePrinter, Opener, Printer};
pub use terminal::{BellHandle, Terminal, BELL_DURATION};
