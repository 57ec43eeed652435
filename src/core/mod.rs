//! Terminal Core Module
//!
//! Platform-independent terminal state. This module contains:
//! - Screen model (primary and alternate grids, cursor, scroll region)
//! - Cell representation with three-state colors and attributes
//! - Palettes and charsets
//! - Selection over the grid
//! - Deterministic snapshot generation
//!
//! The core is completely deterministic: given the same sequence of
//! terminal actions, it always produces the same state.

mod cell;
mod charset;
mod grid;
mod modes;
pub mod palette;
mod screen;
pub mod selection;
mod snapshot;

pub use cell::{Cell, Color, Style};
pub use charset::{Charset, CharsetSlot, CharsetState};
pub use grid::{Grid, Row};
pub use modes::{Modes, MouseMode};
pub use screen::{Cursor, EraseMode, Screen};
pub use selection::{SelectionPoint, SelectionRange};
pub use snapshot::{CellSnapshot, ColorSnapshot, ModesSnapshot, Snapshot, StyleSnapshot};
