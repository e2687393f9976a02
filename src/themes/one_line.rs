//! `one-line` — a bottom band only: exposure settings on the left, the
//! capture date on the right. The photo keeps its full width.

use super::{DrawStrategy, OptionSchema, ResolvedOptions, ThemeDefinition};
use crate::render::geometry::Dimensions;
use crate::render::text::{self, FontSet};
use crate::render::{PreparedPhoto, RenderError};
use crate::settings::GlobalSettings;
use image::RgbaImage;

pub(super) fn definition() -> ThemeDefinition {
    ThemeDefinition::new(
        "one-line",
        vec![
            OptionSchema::color("BACKGROUND_COLOR", "#ffffff"),
            OptionSchema::color("TEXT_COLOR", "#000000"),
            OptionSchema::number("FONT_SIZE", 44.0, 10.0, 200.0, 1.0),
            OptionSchema::number("PADDING", 32.0, 0.0, 400.0, 1.0),
            OptionSchema::text("DIVIDER", " "),
        ],
        Box::new(OneLine),
    )
}

struct OneLine;

fn band_height(options: &ResolvedOptions) -> Result<u32, RenderError> {
    let font_size = options.number("FONT_SIZE")?;
    let padding = options.number("PADDING")?;
    Ok((font_size + 2.0 * padding).round() as u32)
}

impl DrawStrategy for OneLine {
    fn surface_size(
        &self,
        photo: Dimensions,
        options: &ResolvedOptions,
        _settings: &GlobalSettings,
    ) -> Result<Dimensions, RenderError> {
        Ok(Dimensions::new(photo.width, photo.height + band_height(options)?))
    }

    fn draw(
        &self,
        surface: &mut RgbaImage,
        photo: &PreparedPhoto,
        options: &ResolvedOptions,
        _settings: &GlobalSettings,
        fonts: &FontSet,
    ) -> Result<(), RenderError> {
        let background = text::parse_hex_color(options.color("BACKGROUND_COLOR")?)?;
        let color = text::parse_hex_color(options.color("TEXT_COLOR")?)?;
        let font_size = options.number("FONT_SIZE")?;
        let padding = options.number("PADDING")?;

        text::fill(surface, background);
        image::imageops::overlay(surface, &photo.bitmap, 0, 0);

        let left = photo.meta.settings_line(options.text("DIVIDER")?);
        let right = &photo.meta.taken_at;
        if left.is_empty() && right.is_empty() {
            return Ok(());
        }

        let font = fonts.select(400.0)?;
        let photo_height = photo.size().height;
        let y = (f64::from(photo_height) + padding) as i32;
        if !left.is_empty() {
            text::draw_line(surface, font, font_size, color, padding as i32, y, &left);
        }
        if !right.is_empty() {
            let width = text::measure_width(font, font_size, right);
            let x = surface.width() as i64 - padding as i64 - i64::from(width);
            text::draw_line(surface, font, font_size, color, x.max(0) as i32, y, right);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::DisplayedMetadata;
    use std::collections::BTreeMap;

    #[test]
    fn band_adds_font_size_plus_padding() {
        let options = ResolvedOptions::resolve(&definition().options, &BTreeMap::new());
        let size = definition()
            .strategy()
            .surface_size(Dimensions::new(1200, 800), &options, &GlobalSettings::default())
            .unwrap();
        // band = 44 + 2*32 = 108
        assert_eq!(size, Dimensions::new(1200, 908));
    }

    #[test]
    fn fully_hidden_metadata_needs_no_font() {
        let theme = definition();
        let options = ResolvedOptions::resolve(&theme.options, &BTreeMap::new());
        let settings = GlobalSettings::default();
        let photo = PreparedPhoto {
            bitmap: RgbaImage::new(80, 50),
            meta: DisplayedMetadata::default(),
        };
        let size = theme.strategy().surface_size(photo.size(), &options, &settings).unwrap();
        let mut surface = RgbaImage::new(size.width, size.height);
        theme
            .strategy()
            .draw(&mut surface, &photo, &options, &settings, &FontSet::empty())
            .unwrap();
    }

    #[test]
    fn metadata_without_font_is_an_error() {
        let theme = definition();
        let options = ResolvedOptions::resolve(&theme.options, &BTreeMap::new());
        let settings = GlobalSettings::default();
        let photo = PreparedPhoto {
            bitmap: RgbaImage::new(80, 50),
            meta: DisplayedMetadata {
                iso: "ISO400".to_string(),
                ..DisplayedMetadata::default()
            },
        };
        let size = theme.strategy().surface_size(photo.size(), &options, &settings).unwrap();
        let mut surface = RgbaImage::new(size.width, size.height);
        let result =
            theme
                .strategy()
                .draw(&mut surface, &photo, &options, &settings, &FontSet::empty());
        assert!(matches!(result, Err(RenderError::Font(_))));
    }
}
