//! `just-frame` — a uniform border around the photo, no text. Border
//! thickness is proportional to the photo's shorter edge so the look
//! survives any export resolution.

use super::{DrawStrategy, OptionSchema, ResolvedOptions, ThemeDefinition};
use crate::render::geometry::Dimensions;
use crate::render::text::{self, FontSet};
use crate::render::{PreparedPhoto, RenderError};
use crate::settings::GlobalSettings;
use image::RgbaImage;

pub(super) fn definition() -> ThemeDefinition {
    ThemeDefinition::new(
        "just-frame",
        vec![
            OptionSchema::color("FRAME_COLOR", "#ffffff"),
            OptionSchema::number("FRAME_RATIO", 0.06, 0.0, 0.3, 0.01),
        ],
        Box::new(JustFrame),
    )
}

struct JustFrame;

fn border_width(photo: Dimensions, options: &ResolvedOptions) -> Result<u32, RenderError> {
    let ratio = options.number("FRAME_RATIO")?;
    Ok((f64::from(photo.min_edge()) * ratio).round() as u32)
}

impl DrawStrategy for JustFrame {
    fn surface_size(
        &self,
        photo: Dimensions,
        options: &ResolvedOptions,
        _settings: &GlobalSettings,
    ) -> Result<Dimensions, RenderError> {
        let border = border_width(photo, options)?;
        Ok(Dimensions::new(photo.width + 2 * border, photo.height + 2 * border))
    }

    fn draw(
        &self,
        surface: &mut RgbaImage,
        photo: &PreparedPhoto,
        options: &ResolvedOptions,
        _settings: &GlobalSettings,
        _fonts: &FontSet,
    ) -> Result<(), RenderError> {
        let border = border_width(photo.size(), options)?;
        let color = text::parse_hex_color(options.color("FRAME_COLOR")?)?;
        text::fill(surface, color);
        image::imageops::overlay(surface, &photo.bitmap, i64::from(border), i64::from(border));
        Ok(())
    }
}
