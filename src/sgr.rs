//! SGR (Select Graphic Rendition) resolver
//!
//! Applies the parameter list of an `m`-terminated CSI to a pen style.
//! Extended colors (`38;5;N`, `38;2;R;G;B` and their `48` background
//! forms) consume their trailing fields before scanning resumes.

use crate::config::Options;
use crate::core::{palette, Color, Style};

/// Apply SGR parameters to `style`. An empty list is a full reset.
pub fn apply(params: &[Option<u32>], style: &mut Style, options: &Options) {
    if params.is_empty() {
        style.reset();
        return;
    }

    let mut i = 0;
    while i < params.len() {
        // Empty or malformed field
        let Some(code) = params[i] else {
            i += 1;
            continue;
        };

        match code {
            38 | 48 => {
                let (color, used) = extended_color(&params[i + 1..], options);
                if let Some(color) = color {
                    if code == 38 {
                        style.fg = color;
                    } else {
                        style.bg = color;
                    }
                }
                i += used;
            }
            _ => apply_code(code, style, options),
        }
        i += 1;
    }
}

/// Resolve the fields after a `38`/`48`, returning the color (if any)
/// and how many fields were used
fn extended_color(rest: &[Option<u32>], options: &Options) -> (Option<Color>, usize) {
    match rest {
        [Some(5), Some(index), ..] => (Some(indexed_color(*index, options)), 2),
        [Some(5), None, ..] => {
            if options.debug {
                tracing::debug!("Invalid color map ID");
            }
            (None, 2)
        }
        [Some(2), r, g, b, ..] => {
            let channel = |v: &Option<u32>| v.unwrap_or(0).min(255) as u8;
            (Some(Color::Rgb(channel(r), channel(g), channel(b))), 4)
        }
        _ => {
            if options.debug {
                tracing::debug!("Incomplete extended color: {:?}", rest);
            }
            (None, rest.len())
        }
    }
}

fn indexed_color(index: u32, options: &Options) -> Color {
    match u8::try_from(index) {
        Ok(index) => {
            let (r, g, b) = palette::indexed(index);
            Color::Rgb(r, g, b)
        }
        Err(_) => {
            if options.debug {
                tracing::debug!("Invalid color map ID {}", index);
            }
            Color::Unset
        }
    }
}

fn apply_code(code: u32, style: &mut Style, options: &Options) {
    match code {
        0 => style.reset(),
        1 => style.bold = true,
        4 => style.underline = true,
        5 => style.blink = true,
        24 => style.underline = false,
        7 if options.legacy_reverse_video => {
            let (fg, bg) = (style.fg, style.bg);
            style.bg = if fg.is_unset() { Color::Default } else { fg };
            style.fg = if bg.is_unset() { Color::Default } else { bg };
        }
        7 => style.reverse = true,
        27 if options.legacy_reverse_video => {
            style.fg = Color::Unset;
            style.bg = Color::Unset;
        }
        27 => style.reverse = false,
        30..=37 => style.fg = palette::basic((code - 30) as usize),
        39 => style.fg = Color::Unset,
        40..=47 => style.bg = palette::basic((code - 40) as usize),
        49 => style.bg = Color::Unset,
        90..=97 => style.fg = palette::bright((code - 90) as usize),
        100..=107 => style.bg = palette::bright((code - 100) as usize),
        _ => {
            if options.debug {
                tracing::debug!("Unsupported graphics mode {}", code);
            }
        }
    }
}
