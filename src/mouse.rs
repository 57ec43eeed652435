//! Mouse report encoding
//!
//! When a program enables mouse reporting (DECSET 9 or 1000), pointer
//! events are sent back as `CSI M Cb Cx Cy`, each value offset by 32:
//! - X10: button press only, no modifiers
//! - Normal: press and release, with modifier bits

use crate::core::MouseMode;

/// Keyboard modifiers held during a mouse event
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
}

/// Mouse button
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
}

/// Mouse event type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseEventType {
    Press,
    Release,
}

/// Largest coordinate that still fits in one byte after the offset
const MAX_COORD: usize = 255 - 32;

/// Encode a mouse event at 0-based cell (row, col), or `None` if the
/// active mode does not report it
pub fn encode_mouse(
    button: MouseButton,
    event_type: MouseEventType,
    row: usize,
    col: usize,
    modifiers: Modifiers,
    mode: MouseMode,
) -> Option<Vec<u8>> {
    let modifiers = match mode {
        MouseMode::Off => return None,
        MouseMode::X10 if event_type == MouseEventType::Release => return None,
        MouseMode::X10 => Modifiers::default(),
        MouseMode::Normal => modifiers,
    };

    let mut cb: u8 = match (event_type, button) {
        (MouseEventType::Release, _) => 3,
        (MouseEventType::Press, MouseButton::Left) => 0,
        (MouseEventType::Press, MouseButton::Middle) => 1,
        (MouseEventType::Press, MouseButton::Right) => 2,
    };
    if modifiers.shift {
        cb += 4;
    }
    if modifiers.alt {
        cb += 8;
    }
    if modifiers.ctrl {
        cb += 16;
    }

    let cx = (col + 1).min(MAX_COORD) as u8 + 32;
    let cy = (row + 1).min(MAX_COORD) as u8 + 32;
    Some(vec![0x1b, b'[', b'M', cb + 32, cx, cy])
}
