//! The render engine: photo in, framed export bitmap out.
//!
//! [`RenderEngine::render`] is the single entry point the preview and
//! export layers call. One render is a pure function of four inputs —
//! theme, photo, resolved options, settings snapshot — and runs as a
//! single stateless pass:
//!
//! 1. Compute the photo-area geometry ([`geometry::output_geometry`]):
//!    optional center crop to the selected aspect ratio, then fixed-width
//!    proportional scaling (clamped to 4096px).
//! 2. Prepare the base bitmap (crop → Lanczos3 resample) and resolve the
//!    metadata display strings once.
//! 3. Ask the theme's strategy how large a surface its frame needs around
//!    that photo area, allocate it, and let the strategy paint.
//!
//! A zero-size surface is a hard error surfaced to the caller, and an
//! error thrown inside a strategy propagates unchanged — the engine never
//! retries. Identical inputs produce byte-identical output; that property
//! is what makes debounced re-rendering and "last result wins"
//! supersession (see [`crate::schedule`]) safe.

pub mod geometry;
pub mod text;

use crate::metadata::DisplayedMetadata;
use crate::photo::Photo;
use crate::settings::GlobalSettings;
use crate::themes::{OptionError, ResolvedOptions, ThemeDefinition};
use geometry::Dimensions;
use image::imageops::FilterType;
use image::{Rgba, RgbaImage};
use text::FontSet;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("render produced an invalid {width}x{height} surface")]
    InvalidSurface { width: u32, height: u32 },
    #[error(transparent)]
    Option(#[from] OptionError),
    #[error("invalid color value {0:?}")]
    Color(String),
    #[error("font error: {0}")]
    Font(String),
}

/// The photo as a strategy receives it: base bitmap already cropped and
/// scaled to the computed geometry, metadata already resolved through the
/// display policy. Strategies paint this, they never re-derive it.
pub struct PreparedPhoto {
    pub bitmap: RgbaImage,
    pub meta: DisplayedMetadata,
}

impl PreparedPhoto {
    pub fn size(&self) -> Dimensions {
        Dimensions::new(self.bitmap.width(), self.bitmap.height())
    }
}

/// Stateless renderer holding the only shared resource: the loaded fonts.
pub struct RenderEngine {
    fonts: FontSet,
}

impl RenderEngine {
    pub fn new(fonts: FontSet) -> Self {
        Self { fonts }
    }

    pub fn fonts(&self) -> &FontSet {
        &self.fonts
    }

    /// Render one photo through one theme. See the module docs for the
    /// pass structure and failure modes.
    pub fn render(
        &self,
        theme: &ThemeDefinition,
        photo: &Photo,
        options: &ResolvedOptions,
        settings: &GlobalSettings,
    ) -> Result<RgbaImage, RenderError> {
        let source = Dimensions::new(photo.image.width(), photo.image.height());
        let geo = geometry::output_geometry(source, settings);

        let cropped = match geo.crop {
            Some(rect) => photo.image.crop_imm(rect.x, rect.y, rect.width, rect.height),
            None => photo.image.clone(),
        };
        let scaled = if Dimensions::new(cropped.width(), cropped.height()) == geo.size {
            cropped
        } else {
            cropped.resize_exact(geo.size.width, geo.size.height, FilterType::Lanczos3)
        };

        let prepared = PreparedPhoto {
            bitmap: scaled.to_rgba8(),
            meta: photo.metadata.display(&settings.display),
        };

        let strategy = theme.strategy();
        let surface_size = strategy.surface_size(prepared.size(), options, settings)?;
        if surface_size.is_empty() {
            return Err(RenderError::InvalidSurface {
                width: surface_size.width,
                height: surface_size.height,
            });
        }

        let mut surface =
            RgbaImage::from_pixel(surface_size.width, surface_size.height, Rgba([0, 0, 0, 255]));
        strategy.draw(&mut surface, &prepared, options, settings, &self.fonts)?;

        if settings.fix_watermark && !settings.watermark.is_empty() {
            self.draw_watermark(&mut surface, &settings.watermark)?;
        }

        Ok(surface)
    }

    /// Pinned watermark in the bottom-right corner, sized off the surface.
    fn draw_watermark(&self, surface: &mut RgbaImage, watermark: &str) -> Result<(), RenderError> {
        let font = self.fonts.select(400.0)?;
        let size = f64::from((surface.width() / 48).max(14));
        let margin = size.round() as i32;
        let text_width = text::measure_width(font, size, watermark) as i32;
        let x = surface.width() as i32 - margin - text_width;
        let y = surface.height() as i32 - margin - size.round() as i32;
        text::draw_line(
            surface,
            font,
            size,
            Rgba([255, 255, 255, 208]),
            x.max(0),
            y.max(0),
            watermark,
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::photo::Photo;
    use crate::themes::ThemeRegistry;
    use image::DynamicImage;
    use std::collections::BTreeMap;
    use std::path::PathBuf;

    fn test_photo(width: u32, height: u32) -> Photo {
        let image = DynamicImage::ImageRgba8(RgbaImage::from_fn(width, height, |x, y| {
            Rgba([(x % 251) as u8, (y % 239) as u8, ((x + y) % 256) as u8, 255])
        }));
        let thumbnail = image.thumbnail(300, 250).to_rgba8();
        Photo {
            path: PathBuf::from("synthetic.jpg"),
            file_size: 0,
            image,
            thumbnail,
            metadata: crate::metadata::MetadataRecord::default(),
        }
    }

    fn render_with(theme_name: &str, photo: &Photo, settings: &GlobalSettings) -> RgbaImage {
        let registry = ThemeRegistry::builtin();
        let theme = registry.get(theme_name).unwrap();
        let options = ResolvedOptions::resolve(&theme.options, &BTreeMap::new());
        RenderEngine::new(FontSet::empty())
            .render(theme, photo, &options, settings)
            .unwrap()
    }

    #[test]
    fn render_is_deterministic_for_identical_inputs() {
        let photo = test_photo(320, 240);
        let settings = GlobalSettings::default();
        let first = render_with("just-frame", &photo, &settings);
        let second = render_with("just-frame", &photo, &settings);
        assert_eq!(first.as_raw(), second.as_raw());
    }

    #[test]
    fn no_frame_surface_matches_photo_geometry() {
        let photo = test_photo(320, 240);
        let out = render_with("no-frame", &photo, &GlobalSettings::default());
        assert_eq!((out.width(), out.height()), (320, 240));
        // Pixel content is the photo itself.
        assert_eq!(out.get_pixel(10, 20), photo.image.to_rgba8().get_pixel(10, 20));
    }

    #[test]
    fn fixed_width_mode_scales_the_output() {
        let photo = test_photo(640, 480);
        let settings = GlobalSettings {
            enable_fix_image_width: true,
            fix_image_width: 320,
            ..GlobalSettings::default()
        };
        let out = render_with("no-frame", &photo, &settings);
        assert_eq!((out.width(), out.height()), (320, 240));
    }

    #[test]
    fn aspect_ratio_center_crops_the_photo_area() {
        let photo = test_photo(400, 200);
        let settings = GlobalSettings {
            ratio: "1:1".to_string(),
            ..GlobalSettings::default()
        };
        let out = render_with("no-frame", &photo, &settings);
        assert_eq!((out.width(), out.height()), (200, 200));
    }

    #[test]
    fn strategy_errors_propagate_unchanged() {
        // A text theme with no usable font must fail, not silently skip.
        let photo = test_photo(200, 150);
        let registry = ThemeRegistry::builtin();
        let theme = registry.get("one-line").unwrap();
        let options = ResolvedOptions::resolve(&theme.options, &BTreeMap::new());
        let settings = GlobalSettings::default();
        let photo_with_meta = Photo {
            metadata: crate::metadata::MetadataRecord {
                iso: Some("ISO100".to_string()),
                ..Default::default()
            },
            ..photo
        };
        let result = RenderEngine::new(FontSet::empty()).render(
            theme,
            &photo_with_meta,
            &options,
            &settings,
        );
        assert!(matches!(result, Err(RenderError::Font(_))));
    }
}
