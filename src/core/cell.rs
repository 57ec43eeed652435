//! Terminal Cell
//!
//! Represents a single cell in the terminal grid, containing a character
//! and the style it was written with.

use serde::{Deserialize, Serialize};

/// A single cell in the terminal grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    /// The rune displayed in this cell
    pub ch: char,
    /// Colors and attributes
    pub style: Style,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            ch: ' ',
            style: Style::default(),
        }
    }
}

impl Cell {
    /// Create a new unstyled cell
    pub fn new(ch: char) -> Self {
        Self {
            ch,
            style: Style::default(),
        }
    }

    /// Create a new cell with a style
    pub fn with_style(ch: char, style: Style) -> Self {
        Self { ch, style }
    }
}

/// A cell color.
///
/// `Unset` means "whatever the host renders by default" and is what a
/// reset restores. `Default` pins the theme default explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Color {
    /// No color chosen; the host decides
    #[default]
    Unset,
    /// The theme's default for this side (foreground or background)
    Default,
    /// 24-bit RGB color
    Rgb(u8, u8, u8),
}

impl Color {
    /// Check whether a color has been chosen
    pub fn is_unset(&self) -> bool {
        matches!(self, Color::Unset)
    }

    /// Resolve to concrete RGB, using `theme` for Unset and Default
    pub fn resolve(&self, theme: (u8, u8, u8)) -> (u8, u8, u8) {
        match *self {
            Color::Unset | Color::Default => theme,
            Color::Rgb(r, g, b) => (r, g, b),
        }
    }
}

/// Colors and text attributes applied to written cells
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Style {
    pub fg: Color,
    pub bg: Color,
    pub bold: bool,
    pub underline: bool,
    pub blink: bool,
    /// Render with foreground and background swapped
    pub reverse: bool,
}

impl Style {
    /// Back to unset colors with every attribute off
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// The (foreground, background) a renderer should paint.
    ///
    /// Reverse video is applied here instead of being baked into the
    /// stored colors, so turning it off restores the original pair.
    pub fn effective_colors(
        &self,
        theme_fg: (u8, u8, u8),
        theme_bg: (u8, u8, u8),
    ) -> ((u8, u8, u8), (u8, u8, u8)) {
        let fg = self.fg.resolve(theme_fg);
        let bg = self.bg.resolve(theme_bg);
        if self.reverse {
            (bg, fg)
        } else {
            (fg, bg)
        }
    }
}
