//! `no-frame` — the photo itself, untouched. Exists so the export pipeline
//! (fixed width, aspect crop, encoding) can run without any decoration.

use super::{DrawStrategy, ResolvedOptions, ThemeDefinition};
use crate::render::geometry::Dimensions;
use crate::render::text::FontSet;
use crate::render::{PreparedPhoto, RenderError};
use crate::settings::GlobalSettings;
use image::RgbaImage;

pub(super) fn definition() -> ThemeDefinition {
    ThemeDefinition::new("no-frame", Vec::new(), Box::new(NoFrame))
}

struct NoFrame;

impl DrawStrategy for NoFrame {
    fn surface_size(
        &self,
        photo: Dimensions,
        _options: &ResolvedOptions,
        _settings: &GlobalSettings,
    ) -> Result<Dimensions, RenderError> {
        Ok(photo)
    }

    fn draw(
        &self,
        surface: &mut RgbaImage,
        photo: &PreparedPhoto,
        _options: &ResolvedOptions,
        _settings: &GlobalSettings,
        _fonts: &FontSet,
    ) -> Result<(), RenderError> {
        image::imageops::overlay(surface, &photo.bitmap, 0, 0);
        Ok(())
    }
}
