//! `cinema-scope` — letterbox bars above and below the photo, with the
//! exposure settings tucked into the bottom bar when enabled.

use super::{DrawStrategy, OptionSchema, ResolvedOptions, ThemeDefinition};
use crate::render::geometry::Dimensions;
use crate::render::text::{self, FontSet};
use crate::render::{PreparedPhoto, RenderError};
use crate::settings::GlobalSettings;
use image::RgbaImage;

pub(super) fn definition() -> ThemeDefinition {
    ThemeDefinition::new(
        "cinema-scope",
        vec![
            OptionSchema::color("BAR_COLOR", "#000000"),
            OptionSchema::color("TEXT_COLOR", "#e8e8e8"),
            OptionSchema::number("BAR_RATIO", 0.12, 0.02, 0.4, 0.01),
            OptionSchema::number("FONT_SIZE", 36.0, 10.0, 200.0, 1.0),
            OptionSchema::flag("SHOW_SETTINGS", true),
        ],
        Box::new(CinemaScope),
    )
}

struct CinemaScope;

fn bar_height(photo: Dimensions, options: &ResolvedOptions) -> Result<u32, RenderError> {
    let ratio = options.number("BAR_RATIO")?;
    Ok((f64::from(photo.height) * ratio).round().max(1.0) as u32)
}

impl DrawStrategy for CinemaScope {
    fn surface_size(
        &self,
        photo: Dimensions,
        options: &ResolvedOptions,
        _settings: &GlobalSettings,
    ) -> Result<Dimensions, RenderError> {
        let bar = bar_height(photo, options)?;
        Ok(Dimensions::new(photo.width, photo.height + 2 * bar))
    }

    fn draw(
        &self,
        surface: &mut RgbaImage,
        photo: &PreparedPhoto,
        options: &ResolvedOptions,
        _settings: &GlobalSettings,
        fonts: &FontSet,
    ) -> Result<(), RenderError> {
        let bar = bar_height(photo.size(), options)?;
        let bar_color = text::parse_hex_color(options.color("BAR_COLOR")?)?;
        text::fill(surface, bar_color);
        image::imageops::overlay(surface, &photo.bitmap, 0, i64::from(bar));

        if !options.flag("SHOW_SETTINGS")? {
            return Ok(());
        }
        let line = photo.meta.settings_line("  ");
        if line.is_empty() {
            return Ok(());
        }

        let color = text::parse_hex_color(options.color("TEXT_COLOR")?)?;
        let requested = options.number("FONT_SIZE")?;
        // Keep the line inside the bar whatever the option says.
        let font_size = requested.min(f64::from(bar) * 0.6).max(1.0);
        let font = fonts.select(400.0)?;
        let width = text::measure_width(font, font_size, &line);
        let x = (i64::from(surface.width()) - i64::from(width)) / 2;
        let bottom_bar_top = f64::from(photo.size().height + bar);
        let y = bottom_bar_top + (f64::from(bar) - font_size) / 2.0;
        text::draw_line(surface, font, font_size, color, x.max(0) as i32, y as i32, &line);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::DisplayedMetadata;
    use crate::themes::OptionValue;
    use image::Rgba;
    use std::collections::BTreeMap;

    #[test]
    fn bars_scale_with_photo_height() {
        let options = ResolvedOptions::resolve(&definition().options, &BTreeMap::new());
        let size = definition()
            .strategy()
            .surface_size(Dimensions::new(1920, 800), &options, &GlobalSettings::default())
            .unwrap();
        // bar = 800 * 0.12 = 96 per side
        assert_eq!(size, Dimensions::new(1920, 992));
    }

    #[test]
    fn bars_are_painted_and_photo_sits_between_them() {
        let theme = definition();
        let mut overrides = BTreeMap::new();
        overrides.insert("SHOW_SETTINGS".to_string(), OptionValue::Flag(false));
        let options = ResolvedOptions::resolve(&theme.options, &overrides);
        let settings = GlobalSettings::default();

        let photo = PreparedPhoto {
            bitmap: RgbaImage::from_pixel(100, 100, Rgba([0, 0, 255, 255])),
            meta: DisplayedMetadata::default(),
        };
        let size = theme.strategy().surface_size(photo.size(), &options, &settings).unwrap();
        let mut surface = RgbaImage::new(size.width, size.height);
        theme
            .strategy()
            .draw(&mut surface, &photo, &options, &settings, &FontSet::empty())
            .unwrap();

        // bar = 100 * 0.12 = 12
        assert_eq!(*surface.get_pixel(50, 0), Rgba([0, 0, 0, 255]));
        assert_eq!(*surface.get_pixel(50, 50), Rgba([0, 0, 255, 255]));
        assert_eq!(*surface.get_pixel(50, size.height - 1), Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn settings_flag_off_skips_text_entirely() {
        let theme = definition();
        let mut overrides = BTreeMap::new();
        overrides.insert("SHOW_SETTINGS".to_string(), OptionValue::Flag(false));
        let options = ResolvedOptions::resolve(&theme.options, &overrides);
        let photo = PreparedPhoto {
            bitmap: RgbaImage::new(50, 50),
            meta: DisplayedMetadata {
                iso: "ISO800".to_string(),
                ..DisplayedMetadata::default()
            },
        };
        let settings = GlobalSettings::default();
        let size = theme.strategy().surface_size(photo.size(), &options, &settings).unwrap();
        let mut surface = RgbaImage::new(size.width, size.height);
        // No font available, but the flag short-circuits before text.
        theme
            .strategy()
            .draw(&mut surface, &photo, &options, &settings, &FontSet::empty())
            .unwrap();
    }
}
