//! `shot-on-one-line` — a dark bottom band with a centered
//! "Shot on <model>" marketing line; the model is emphasized with the
//! bold face when one is available.

use super::{DrawStrategy, OptionSchema, ResolvedOptions, ThemeDefinition};
use crate::render::geometry::Dimensions;
use crate::render::text::{self, FontSet};
use crate::render::{PreparedPhoto, RenderError};
use crate::settings::GlobalSettings;
use image::RgbaImage;

pub(super) fn definition() -> ThemeDefinition {
    ThemeDefinition::new(
        "shot-on-one-line",
        vec![
            OptionSchema::color("BACKGROUND_COLOR", "#000000"),
            OptionSchema::color("TEXT_COLOR", "#ffffff"),
            OptionSchema::number("FONT_SIZE", 48.0, 10.0, 200.0, 1.0),
            OptionSchema::number("PADDING", 40.0, 0.0, 400.0, 1.0),
            OptionSchema::text("LEAD_TEXT", "Shot on"),
        ],
        Box::new(ShotOnOneLine),
    )
}

struct ShotOnOneLine;

/// The emphasized device label: model, falling back to make. Both empty
/// (hidden by display policy or absent) means no line at all.
fn device_label(photo: &PreparedPhoto) -> String {
    if !photo.meta.model.is_empty() {
        photo.meta.model.clone()
    } else {
        photo.meta.make.clone()
    }
}

impl DrawStrategy for ShotOnOneLine {
    fn surface_size(
        &self,
        photo: Dimensions,
        options: &ResolvedOptions,
        _settings: &GlobalSettings,
    ) -> Result<Dimensions, RenderError> {
        let font_size = options.number("FONT_SIZE")?;
        let padding = options.number("PADDING")?;
        let band = (font_size + 2.0 * padding).round() as u32;
        Ok(Dimensions::new(photo.width, photo.height + band))
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

        let device = device_label(photo);
        if device.is_empty() {
            return Ok(());
        }
        let lead = options.text("LEAD_TEXT")?;
        let regular = fonts.select(400.0)?;
        let emphasis = fonts.select(700.0)?;

        let lead_width = if lead.is_empty() {
            0
        } else {
            // Trailing space joins the lead to the device label.
            text::measure_width(regular, font_size, &format!("{lead} "))
        };
        let device_width = text::measure_width(emphasis, font_size, &device);
        let total = i64::from(lead_width) + i64::from(device_width);
        let x = (i64::from(surface.width()) - total) / 2;
        let y = (f64::from(photo.size().height) + padding) as i32;

        if !lead.is_empty() {
            text::draw_line(surface, regular, font_size, color, x.max(0) as i32, y, lead);
        }
        text::draw_line(
            surface,
            emphasis,
            font_size,
            color,
            (x + i64::from(lead_width)).max(0) as i32,
            y,
            &device,
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::DisplayedMetadata;
    use std::collections::BTreeMap;

    fn photo_with(meta: DisplayedMetadata) -> PreparedPhoto {
        PreparedPhoto {
            bitmap: RgbaImage::new(1, 1),
            meta,
        }
    }

    #[test]
    fn device_label_prefers_model_over_make() {
        let both = photo_with(DisplayedMetadata {
            make: "SONY".to_string(),
            model: "ILCE-7M3".to_string(),
            ..DisplayedMetadata::default()
        });
        assert_eq!(device_label(&both), "ILCE-7M3");

        let make_only = photo_with(DisplayedMetadata {
            make: "SONY".to_string(),
            ..DisplayedMetadata::default()
        });
        assert_eq!(device_label(&make_only), "SONY");
    }

    #[test]
    fn hidden_device_draws_nothing_and_needs_no_font() {
        let theme = definition();
        let options = ResolvedOptions::resolve(&theme.options, &BTreeMap::new());
        let settings = GlobalSettings::default();
        let photo = photo_with(DisplayedMetadata::default());
        let size = theme.strategy().surface_size(photo.size(), &options, &settings).unwrap();
        let mut surface = RgbaImage::new(size.width, size.height);
        theme
            .strategy()
            .draw(&mut surface, &photo, &options, &settings, &FontSet::empty())
            .unwrap();
    }

    #[test]
    fn band_height_from_font_and_padding() {
        let options = ResolvedOptions::resolve(&definition().options, &BTreeMap::new());
        let size = definition()
            .strategy()
            .surface_size(Dimensions::new(900, 600), &options, &GlobalSettings::default())
            .unwrap();
        // band = 48 + 2*40 = 128
        assert_eq!(size, Dimensions::new(900, 728));
    }
}
