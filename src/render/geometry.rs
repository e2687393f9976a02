//! Pure calculation functions for output geometry.
//!
//! All functions here are pure and testable without any I/O or images.
//! The engine derives a per-render [`OutputGeometry`] from the source
//! bitmap's natural dimensions and the settings snapshot — nothing is
//! persisted, everything is recomputed on every render.

use crate::settings::GlobalSettings;
use log::warn;

/// Hard ceiling on the fixed-width export size.
pub const MAX_EXPORT_WIDTH: u32 = 4096;

/// Width and height of a bitmap or surface, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// The shorter edge, used for proportional frame thickness.
    pub fn min_edge(&self) -> u32 {
        self.width.min(self.height)
    }
}

/// A crop window inside a source bitmap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Per-render geometry: an optional center crop applied to the source,
/// followed by the final scaled size of the photo area.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputGeometry {
    pub crop: Option<CropRect>,
    pub size: Dimensions,
}

/// Scale proportionally so the width equals `target_width`, clamped to
/// [`MAX_EXPORT_WIDTH`]. Heights round to the nearest pixel and never drop
/// below 1.
///
/// ```
/// # use framelab::render::geometry::{fixed_width_dimensions, Dimensions};
/// // 4000x3000 at a fixed 1920 → 1920x1440
/// assert_eq!(
///     fixed_width_dimensions(Dimensions::new(4000, 3000), 1920),
///     Dimensions::new(1920, 1440)
/// );
/// ```
pub fn fixed_width_dimensions(source: Dimensions, target_width: u32) -> Dimensions {
    if source.is_empty() {
        return source;
    }
    let width = target_width.clamp(1, MAX_EXPORT_WIDTH);
    let height = (source.height as f64 * width as f64 / source.width as f64)
        .round()
        .max(1.0) as u32;
    Dimensions::new(width, height)
}

/// Parse an aspect-ratio selector. `"free"` (and the empty string) mean no
/// ratio; anything else must be `"W:H"` with both terms positive.
pub fn parse_ratio(ratio: &str) -> Option<(u32, u32)> {
    let ratio = ratio.trim();
    if ratio.is_empty() || ratio.eq_ignore_ascii_case("free") {
        return None;
    }
    let (w, h) = ratio.split_once(':')?;
    let w: u32 = w.trim().parse().ok()?;
    let h: u32 = h.trim().parse().ok()?;
    if w == 0 || h == 0 {
        return None;
    }
    Some((w, h))
}

/// The largest centered window of `source` with the given aspect ratio.
pub fn center_crop_rect(source: Dimensions, aspect: (u32, u32)) -> CropRect {
    let (aspect_w, aspect_h) = aspect;
    let src_aspect = source.width as f64 / source.height as f64;
    let tgt_aspect = aspect_w as f64 / aspect_h as f64;

    if src_aspect > tgt_aspect {
        // Source is wider: full height, trim the sides.
        let width = ((source.height as f64 * tgt_aspect).round() as u32)
            .clamp(1, source.width);
        CropRect {
            x: (source.width - width) / 2,
            y: 0,
            width,
            height: source.height,
        }
    } else {
        // Source is taller (or exact): full width, trim top and bottom.
        let height = ((source.width as f64 / tgt_aspect).round() as u32)
            .clamp(1, source.height);
        CropRect {
            x: 0,
            y: (source.height - height) / 2,
            width: source.width,
            height,
        }
    }
}

/// Derive the photo-area geometry for one render.
///
/// Crop policy: center-crop to the selected ratio unless `not_cropped_mode`
/// forces the crop off (letterboxing is then theme-dependent). A ratio
/// string that fails to parse is treated as `"free"` — a bad persisted
/// value must degrade, not fail the render.
pub fn output_geometry(source: Dimensions, settings: &GlobalSettings) -> OutputGeometry {
    let ratio = parse_ratio(&settings.ratio);
    if ratio.is_none() && !settings.ratio.trim().eq_ignore_ascii_case("free")
        && !settings.ratio.trim().is_empty()
    {
        warn!("unparseable aspect ratio {:?}, rendering uncropped", settings.ratio);
    }

    let (crop, cropped) = match ratio {
        Some(aspect) if !settings.not_cropped_mode => {
            let rect = center_crop_rect(source, aspect);
            (Some(rect), Dimensions::new(rect.width, rect.height))
        }
        _ => (None, source),
    };

    let size = if settings.enable_fix_image_width {
        fixed_width_dimensions(cropped, settings.fix_image_width)
    } else {
        cropped
    };

    OutputGeometry { crop, size }
}
