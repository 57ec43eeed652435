//! Color palettes
//!
//! Maps SGR palette numbers to concrete RGB values:
//! - 0-7: basic colors
//! - 8-15: bright colors
//! - 16-231: 6x6x6 color cube
//! - 232-255: grayscale ramp

use super::cell::Color;

/// Basic 8-color palette (SGR 30-37 / 40-47)
pub const BASIC: [(u8, u8, u8); 8] = [
    (0, 0, 0),       // Black
    (170, 0, 0),     // Red
    (0, 170, 0),     // Green
    (170, 170, 0),   // Yellow
    (0, 0, 170),     // Blue
    (170, 0, 170),   // Magenta
    (0, 255, 255),   // Cyan
    (170, 170, 170), // White
];

/// Bright 8-color palette (SGR 90-97 / 100-107)
pub const BRIGHT: [(u8, u8, u8); 8] = [
    (85, 85, 85),    // Bright Black
    (255, 85, 85),   // Bright Red
    (85, 255, 85),   // Bright Green
    (255, 255, 85),  // Bright Yellow
    (85, 85, 255),   // Bright Blue
    (255, 85, 255),  // Bright Magenta
    (85, 255, 255),  // Bright Cyan
    (255, 255, 255), // Bright White
];

/// Channel values of the 6x6x6 cube
const CUBE_BANDS: [u8; 6] = [0x00, 0x5f, 0x87, 0xaf, 0xd7, 0xff];

/// Step between grayscale ramp entries
const GRAY_STEP: u8 = (256 / 24) as u8;

/// Color from the basic palette, `index` in 0..8
pub fn basic(index: usize) -> Color {
    let (r, g, b) = BASIC[index % 8];
    Color::Rgb(r, g, b)
}

/// Color from the bright palette, `index` in 0..8
pub fn bright(index: usize) -> Color {
    let (r, g, b) = BRIGHT[index % 8];
    Color::Rgb(r, g, b)
}

/// Convert a 256-color index to RGB
pub fn indexed(index: u8) -> (u8, u8, u8) {
    match index {
        0..=7 => BASIC[index as usize],
        8..=15 => BRIGHT[index as usize - 8],
        16..=231 => {
            let mut idx = (index - 16) as usize;
            let b = idx % 6;
            idx /= 6;
            let g = idx % 6;
            let r = idx / 6;
            (CUBE_BANDS[r], CUBE_BANDS[g], CUBE_BANDS[b])
        }
        232..=255 => {
            let gray = (index - 232) * GRAY_STEP;
            (gray, gray, gray)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_and_bright() {
        assert_eq!(indexed(0), (0, 0, 0));
        assert_eq!(indexed(1), (170, 0, 0));
        assert_eq!(indexed(9), (255, 85, 85));
        assert_eq!(indexed(15), (255, 255, 255));
        assert_eq!(basic(6), Color::Rgb(0, 255, 255));
        assert_eq!(bright(0), Color::Rgb(85, 85, 85));
    }

    #[test]
    fn test_color_cube() {
        assert_eq!(indexed(16), (0, 0, 0));
        assert_eq!(indexed(52), (95, 0, 0));
        assert_eq!(indexed(196), (255, 0, 0));
        assert_eq!(indexed(231), (255, 255, 255));
    }

    #[test]
    fn test_grayscale() {
        assert_eq!(indexed(232), (0, 0, 0));
        assert_eq!(indexed(233), (10, 10, 10));
        assert_eq!(indexed(255), (230, 230, 230));
    }
}
