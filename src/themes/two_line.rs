//! `two-line` — a bottom band with a camera/lens identity line over a
//! settings/date line in a secondary color.

use super::{DrawStrategy, OptionSchema, ResolvedOptions, ThemeDefinition};
use crate::render::geometry::Dimensions;
use crate::render::text::{self, FontSet};
use crate::render::{PreparedPhoto, RenderError};
use crate::settings::GlobalSettings;
use image::RgbaImage;

pub(super) fn definition() -> ThemeDefinition {
    ThemeDefinition::new(
        "two-line",
        vec![
            OptionSchema::color("BACKGROUND_COLOR", "#ffffff"),
            OptionSchema::color("TEXT_COLOR", "#111111"),
            OptionSchema::color("SECONDARY_TEXT_COLOR", "#666666"),
            OptionSchema::number("FONT_SIZE", 40.0, 10.0, 200.0, 1.0),
            OptionSchema::number("FONT_WEIGHT", 400.0, 100.0, 900.0, 100.0),
            OptionSchema::number("PADDING", 36.0, 0.0, 400.0, 1.0),
            OptionSchema::text("DIVIDER", " · "),
        ],
        Box::new(TwoLine),
    )
}

struct TwoLine;

struct Layout {
    font_size: f64,
    padding: f64,
    gap: f64,
}

fn layout(options: &ResolvedOptions) -> Result<Layout, RenderError> {
    let font_size = options.number("FONT_SIZE")?;
    Ok(Layout {
        font_size,
        padding: options.number("PADDING")?,
        gap: (font_size * 0.5).round(),
    })
}

fn band_height(l: &Layout) -> u32 {
    (2.0 * l.font_size + l.gap + 2.0 * l.padding).round() as u32
}

fn identity_line(photo: &PreparedPhoto) -> String {
    let camera = photo.meta.camera_line();
    let lens = &photo.meta.lens_model;
    match (camera.is_empty(), lens.is_empty()) {
        (true, true) => String::new(),
        (false, true) => camera,
        (true, false) => lens.clone(),
        (false, false) => format!("{camera} {lens}"),
    }
}

fn detail_line(photo: &PreparedPhoto, divider: &str) -> String {
    let settings = photo.meta.settings_line(divider);
    let date = &photo.meta.taken_at;
    match (settings.is_empty(), date.is_empty()) {
        (true, true) => String::new(),
        (false, true) => settings,
        (true, false) => date.clone(),
        (false, false) => format!("{settings}{divider}{date}"),
    }
}

impl DrawStrategy for TwoLine {
    fn surface_size(
        &self,
        photo: Dimensions,
        options: &ResolvedOptions,
        _settings: &GlobalSettings,
    ) -> Result<Dimensions, RenderError> {
        let l = layout(options)?;
        Ok(Dimensions::new(photo.width, photo.height + band_height(&l)))
    }

    fn draw(
        &self,
        surface: &mut RgbaImage,
        photo: &PreparedPhoto,
        options: &ResolvedOptions,
        _settings: &GlobalSettings,
        fonts: &FontSet,
    ) -> Result<(), RenderError> {
        let l = layout(options)?;
        let background = text::parse_hex_color(options.color("BACKGROUND_COLOR")?)?;
        let primary = text::parse_hex_color(options.color("TEXT_COLOR")?)?;
        let secondary = text::parse_hex_color(options.color("SECONDARY_TEXT_COLOR")?)?;
        let weight = options.number("FONT_WEIGHT")?;

        text::fill(surface, background);
        image::imageops::overlay(surface, &photo.bitmap, 0, 0);

        let first = identity_line(photo);
        let second = detail_line(photo, options.text("DIVIDER")?);
        if first.is_empty() && second.is_empty() {
            return Ok(());
        }

        let x = l.padding as i32;
        let top = f64::from(photo.size().height) + l.padding;
        if !first.is_empty() {
            let font = fonts.select(weight)?;
            text::draw_line(surface, font, l.font_size, primary, x, top as i32, &first);
        }
        if !second.is_empty() {
            let font = fonts.select(400.0)?;
            let y = top + l.font_size + l.gap;
            text::draw_line(surface, font, l.font_size, secondary, x, y as i32, &second);
        }
        Ok(())
    }
}
