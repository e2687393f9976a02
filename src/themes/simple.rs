//! `simple` — a uniform border with one centered caption line beneath the
//! photo: camera identity, then the exposure settings.

use super::{DrawStrategy, OptionSchema, ResolvedOptions, ThemeDefinition};
use crate::render::geometry::Dimensions;
use crate::render::text::{self, FontSet};
use crate::render::{PreparedPhoto, RenderError};
use crate::settings::GlobalSettings;
use image::RgbaImage;

pub(super) fn definition() -> ThemeDefinition {
    ThemeDefinition::new(
        "simple",
        vec![
            OptionSchema::color("BACKGROUND_COLOR", "#ffffff"),
            OptionSchema::color("TEXT_COLOR", "#333333"),
            OptionSchema::number("PADDING_RATIO", 0.05, 0.0, 0.25, 0.01),
            OptionSchema::number("FONT_SIZE", 48.0, 10.0, 200.0, 1.0),
            OptionSchema::text("DIVIDER", "  |  "),
        ],
        Box::new(Simple),
    )
}

struct Simple;

struct Layout {
    border: u32,
    caption_band: u32,
    font_size: f64,
}

fn layout(photo: Dimensions, options: &ResolvedOptions) -> Result<Layout, RenderError> {
    let ratio = options.number("PADDING_RATIO")?;
    let font_size = options.number("FONT_SIZE")?;
    let border = (f64::from(photo.min_edge()) * ratio).round() as u32;
    // The caption band never shrinks below the border, so an empty caption
    // still leaves a balanced frame.
    let caption_band = border.max((font_size * 2.4).round() as u32);
    Ok(Layout { border, caption_band, font_size })
}

fn caption(photo: &PreparedPhoto, divider: &str) -> String {
    let camera = photo.meta.camera_line();
    let settings = photo.meta.settings_line(" ");
    match (camera.is_empty(), settings.is_empty()) {
        (true, true) => String::new(),
        (false, true) => camera,
        (true, false) => settings,
        (false, false) => format!("{camera}{divider}{settings}"),
    }
}

impl DrawStrategy for Simple {
    fn surface_size(
        &self,
        photo: Dimensions,
        options: &ResolvedOptions,
        _settings: &GlobalSettings,
    ) -> Result<Dimensions, RenderError> {
        let l = layout(photo, options)?;
        Ok(Dimensions::new(
            photo.width + 2 * l.border,
            photo.height + l.border + l.caption_band,
        ))
    }

    fn draw(
        &self,
        surface: &mut RgbaImage,
        photo: &PreparedPhoto,
        options: &ResolvedOptions,
        _settings: &GlobalSettings,
        fonts: &FontSet,
    ) -> Result<(), RenderError> {
        let l = layout(photo.size(), options)?;
        let background = text::parse_hex_color(options.color("BACKGROUND_COLOR")?)?;
        let text_color = text::parse_hex_color(options.color("TEXT_COLOR")?)?;

        text::fill(surface, background);
        image::imageops::overlay(surface, &photo.bitmap, i64::from(l.border), i64::from(l.border));

        let line = caption(photo, options.text("DIVIDER")?);
        if line.is_empty() {
            return Ok(());
        }
        let font = fonts.select(400.0)?;
        let width = text::measure_width(font, l.font_size, &line);
        let x = (i64::from(surface.width()) - i64::from(width)) / 2;
        let band_top = photo.size().height + l.border;
        let y = f64::from(band_top) + (f64::from(l.caption_band) - l.font_size) / 2.0;
        text::draw_line(surface, font, l.font_size, text_color, x.max(0) as i32, y as i32, &line);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::DisplayedMetadata;
    use std::collections::BTreeMap;

    #[test]
    fn surface_adds_border_and_caption_band() {
        let options = ResolvedOptions::resolve(&definition().options, &BTreeMap::new());
        let size = definition()
            .strategy()
            .surface_size(Dimensions::new(1000, 800), &options, &GlobalSettings::default())
            .unwrap();
        // border = 800 * 0.05 = 40; caption band = max(40, 48 * 2.4) = 115
        assert_eq!(size, Dimensions::new(1080, 955));
    }

    #[test]
    fn caption_composes_camera_and_settings() {
        let photo = PreparedPhoto {
            bitmap: RgbaImage::new(1, 1),
            meta: DisplayedMetadata {
                make: "SONY".to_string(),
                model: "ILCE-7M3".to_string(),
                focal_length: "50mm".to_string(),
                f_number: "F1.8".to_string(),
                ..DisplayedMetadata::default()
            },
        };
        assert_eq!(caption(&photo, "  |  "), "SONY ILCE-7M3  |  50mm F1.8");
    }

    #[test]
    fn caption_skips_hidden_sides() {
        let photo = PreparedPhoto {
            bitmap: RgbaImage::new(1, 1),
            meta: DisplayedMetadata {
                iso: "ISO100".to_string(),
                ..DisplayedMetadata::default()
            },
        };
        assert_eq!(caption(&photo, "  |  "), "ISO100");

        let empty = PreparedPhoto {
            bitmap: RgbaImage::new(1, 1),
            meta: DisplayedMetadata::default(),
        };
        assert_eq!(caption(&empty, "  |  "), "");
    }

    #[test]
    fn empty_caption_draws_without_fonts() {
        let theme = definition();
        let options = ResolvedOptions::resolve(&theme.options, &BTreeMap::new());
        let settings = GlobalSettings::default();
        let photo = PreparedPhoto {
            bitmap: RgbaImage::new(60, 40),
            meta: DisplayedMetadata::default(),
        };
        let size = theme.strategy().surface_size(photo.size(), &options, &settings).unwrap();
        let mut surface = RgbaImage::new(size.width, size.height);
        theme
            .strategy()
            .draw(&mut surface, &photo, &options, &settings, &FontSet::empty())
            .unwrap();
    }
}
