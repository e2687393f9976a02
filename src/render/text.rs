//! Font discovery, color parsing, and measured text drawing.
//!
//! Fonts are loaded once into a [`FontSet`] when the engine is built —
//! either from an explicit file or by probing a short list of common system
//! locations. Strategies select a face by numeric weight (the 100–900 CSS
//! scale the option schemas use) and draw through the helpers here, which
//! wrap `imageproc`'s ab_glyph-based text rasterizer.
//!
//! A theme that needs text on a machine with no discoverable font is a
//! render error, not a silent no-text export.

use crate::render::RenderError;
use ab_glyph::{FontVec, PxScale};
use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_text_mut, text_size};
use log::debug;
use std::path::Path;

const REGULAR_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation-sans/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/System/Library/Fonts/Helvetica.ttc",
    "C:\\Windows\\Fonts\\arial.ttf",
];

const BOLD_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/TTF/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf",
    "/usr/share/fonts/liberation-sans/LiberationSans-Bold.ttf",
    "/System/Library/Fonts/Supplemental/Arial Bold.ttf",
    "C:\\Windows\\Fonts\\arialbd.ttf",
];

/// Regular and bold faces, either of which may be absent. Selection falls
/// back to whichever face exists; both absent is an error at draw time.
pub struct FontSet {
    regular: Option<FontVec>,
    bold: Option<FontVec>,
}

impl FontSet {
    /// Probe for usable faces. An explicit `custom` file takes the place of
    /// the regular face and wins over every candidate.
    pub fn discover(custom: Option<&Path>) -> Self {
        let regular = custom
            .and_then(load_font)
            .or_else(|| REGULAR_CANDIDATES.iter().find_map(|p| load_font(Path::new(p))));
        let bold = BOLD_CANDIDATES.iter().find_map(|p| load_font(Path::new(p)));
        Self { regular, bold }
    }

    /// A set with no faces. Drawing text through it always errors.
    pub fn empty() -> Self {
        Self { regular: None, bold: None }
    }

    /// Build from raw TTF bytes (tests, embedded use).
    pub fn from_bytes(regular: Vec<u8>, bold: Option<Vec<u8>>) -> Result<Self, RenderError> {
        let regular = FontVec::try_from_vec(regular)
            .map_err(|_| RenderError::Font("invalid regular font data".to_string()))?;
        let bold = match bold {
            Some(bytes) => Some(
                FontVec::try_from_vec(bytes)
                    .map_err(|_| RenderError::Font("invalid bold font data".to_string()))?,
            ),
            None => None,
        };
        Ok(Self { regular: Some(regular), bold })
    }

    pub fn has_any(&self) -> bool {
        self.regular.is_some() || self.bold.is_some()
    }

    /// Select a face by CSS-style weight: 600 and up prefers bold.
    pub fn select(&self, weight: f64) -> Result<&FontVec, RenderError> {
        let preferred = if weight >= 600.0 {
            self.bold.as_ref().or(self.regular.as_ref())
        } else {
            self.regular.as_ref().or(self.bold.as_ref())
        };
        preferred.ok_or_else(|| {
            RenderError::Font(
                "no usable font found; set the fontPath setting to a TTF file".to_string(),
            )
        })
    }
}

fn load_font(path: &Path) -> Option<FontVec> {
    let data = std::fs::read(path).ok()?;
    match FontVec::try_from_vec(data) {
        Ok(font) => {
            debug!("loaded font {}", path.display());
            Some(font)
        }
        Err(_) => None,
    }
}

/// Parse a `#rgb`, `#rrggbb`, or `#rrggbbaa` hex color.
pub fn parse_hex_color(s: &str) -> Result<Rgba<u8>, RenderError> {
    let hex = s.trim().strip_prefix('#').ok_or_else(|| RenderError::Color(s.to_string()))?;
    if !hex.is_ascii() {
        return Err(RenderError::Color(s.to_string()));
    }
    let parse = |chunk: &str| u8::from_str_radix(chunk, 16);
    let channels: Result<Vec<u8>, _> = match hex.len() {
        3 => hex
            .chars()
            .map(|c| parse(&format!("{c}{c}")))
            .collect(),
        6 | 8 => (0..hex.len())
            .step_by(2)
            .map(|i| parse(&hex[i..i + 2]))
            .collect(),
        _ => return Err(RenderError::Color(s.to_string())),
    };
    let channels = channels.map_err(|_| RenderError::Color(s.to_string()))?;
    Ok(match channels.as_slice() {
        [r, g, b] => Rgba([*r, *g, *b, 255]),
        [r, g, b, a] => Rgba([*r, *g, *b, *a]),
        _ => return Err(RenderError::Color(s.to_string())),
    })
}

/// Fill an entire surface with one color.
pub fn fill(surface: &mut RgbaImage, color: Rgba<u8>) {
    for pixel in surface.pixels_mut() {
        *pixel = color;
    }
}

/// Measured width of `text` at `size` pixels.
pub fn measure_width(font: &FontVec, size: f64, text: &str) -> u32 {
    if text.is_empty() {
        return 0;
    }
    text_size(PxScale::from(size as f32), font, text).0
}

/// Draw one line of text with its top-left corner at `(x, y)`.
pub fn draw_line(
    surface: &mut RgbaImage,
    font: &FontVec,
    size: f64,
    color: Rgba<u8>,
    x: i32,
    y: i32,
    text: &str,
) {
    if text.is_empty() {
        return;
    }
    draw_text_mut(surface, color, x, y, PxScale::from(size as f32), font, text);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_colors_parse_in_all_three_widths() {
        assert_eq!(parse_hex_color("#fff").unwrap(), Rgba([255, 255, 255, 255]));
        assert_eq!(parse_hex_color("#1a2b3c").unwrap(), Rgba([26, 43, 60, 255]));
        assert_eq!(parse_hex_color("#1a2b3c80").unwrap(), Rgba([26, 43, 60, 128]));
        assert_eq!(parse_hex_color("  #000000 ").unwrap(), Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn malformed_colors_are_rejected() {
        assert!(parse_hex_color("ffffff").is_err());
        assert!(parse_hex_color("#ggg").is_err());
        assert!(parse_hex_color("#12345").is_err());
        assert!(parse_hex_color("").is_err());
    }

    #[test]
    fn empty_font_set_errors_on_select() {
        let fonts = FontSet::empty();
        assert!(matches!(fonts.select(400.0), Err(RenderError::Font(_))));
        assert!(!fonts.has_any());
    }

    #[test]
    fn fill_covers_every_pixel() {
        let mut surface = RgbaImage::new(4, 4);
        fill(&mut surface, Rgba([10, 20, 30, 255]));
        assert!(surface.pixels().all(|p| *p == Rgba([10, 20, 30, 255])));
    }
}
