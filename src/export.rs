//! Export: encoding, file naming, and batch zip packaging.
//!
//! Single-photo export encodes one rendered surface and writes it next to
//! a deterministic name: `<originalBaseName>_<themeSlug>.<jpg|originalExt>`.
//! Batch export renders photos **sequentially** (one render in flight at a
//! time), reports `(current, total)` progress after each photo, and packs
//! every successful result into one archive named
//! `exif_frames_<themeSlug>_<count>photos.zip`.
//!
//! One photo failing to render never aborts the batch: the failure is
//! recorded by submission index in the final [`BatchReport`] and the loop
//! moves on. Archive-level I/O failures (cannot create or finish the zip)
//! are batch-fatal — they are infrastructure, not per-item, errors.
//!
//! The loop is written against the narrow [`FrameRenderer`] seam so tests
//! can drive it with a failing renderer without touching themes or fonts.

use crate::photo::Photo;
use crate::render::{RenderEngine, RenderError};
use crate::settings::GlobalSettings;
use crate::themes::{ResolvedOptions, ThemeDefinition};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{DynamicImage, ExtendedColorType, ImageEncoder, RgbaImage};
use log::warn;
use std::collections::HashSet;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("image encode failed: {0}")]
    Encode(String),
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error(transparent)]
    Render(#[from] RenderError),
}

/// Encoded output container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Jpeg,
    Png,
}

/// Anything that can turn a photo into a finished frame. The production
/// implementation is [`ThemedRenderer`]; tests substitute their own.
pub trait FrameRenderer {
    fn render_frame(&self, photo: &Photo) -> Result<RgbaImage, RenderError>;
}

/// The engine bound to one (theme, options, settings) triple — the
/// snapshot a batch or preview works from.
pub struct ThemedRenderer<'a> {
    pub engine: &'a RenderEngine,
    pub theme: &'a ThemeDefinition,
    pub options: &'a ResolvedOptions,
    pub settings: &'a GlobalSettings,
}

impl FrameRenderer for ThemedRenderer<'_> {
    fn render_frame(&self, photo: &Photo) -> Result<RgbaImage, RenderError> {
        self.engine.render(self.theme, photo, self.options, self.settings)
    }
}

/// Encode a rendered surface. Quality is the 0.1–1.0 interface range,
/// mapped onto the encoder's 1–100 scale; PNG is lossless and ignores it.
pub fn encode_image(
    image: &RgbaImage,
    format: ExportFormat,
    quality: f32,
) -> Result<Vec<u8>, ExportError> {
    let mut bytes = Vec::new();
    match format {
        ExportFormat::Jpeg => {
            let rgb = DynamicImage::ImageRgba8(image.clone()).to_rgb8();
            let q = (quality.clamp(0.1, 1.0) * 100.0).round() as u8;
            JpegEncoder::new_with_quality(Cursor::new(&mut bytes), q)
                .write_image(rgb.as_raw(), rgb.width(), rgb.height(), ExtendedColorType::Rgb8)
                .map_err(|e| ExportError::Encode(e.to_string()))?;
        }
        ExportFormat::Png => {
            PngEncoder::new(Cursor::new(&mut bytes))
                .write_image(
                    image.as_raw(),
                    image.width(),
                    image.height(),
                    ExtendedColorType::Rgba8,
                )
                .map_err(|e| ExportError::Encode(e.to_string()))?;
        }
    }
    Ok(bytes)
}

/// Theme name → filename fragment: lowercased, whitespace and dashes as
/// underscores.
pub fn theme_slug(name: &str) -> String {
    name.to_lowercase()
        .split(|c: char| c.is_whitespace() || c == '-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}

/// Output name for one photo: `<base>_<slug>.<jpg|originalExt>`.
pub fn output_file_name(source: &Path, theme_name: &str, export_to_jpeg: bool) -> String {
    let base = source
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("photo");
    let ext = if export_to_jpeg {
        "jpg".to_string()
    } else {
        source
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("jpg")
            .to_string()
    };
    format!("{base}_{}.{ext}", theme_slug(theme_name))
}

/// Batch archive name: `exif_frames_<slug>_<count>photos.zip`.
pub fn archive_name(theme_name: &str, count: usize) -> String {
    format!("exif_frames_{}_{count}photos.zip", theme_slug(theme_name))
}

/// Container for one photo's encoded output, chosen by final extension.
fn format_for(source: &Path, export_to_jpeg: bool) -> ExportFormat {
    if export_to_jpeg {
        return ExportFormat::Jpeg;
    }
    match source.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("png") => ExportFormat::Png,
        _ => ExportFormat::Jpeg,
    }
}

/// Render and write one photo to `out_dir`, returning the written path.
/// Single-photo failures propagate — the caller owns the retry affordance.
pub fn export_single(
    renderer: &impl FrameRenderer,
    photo: &Photo,
    theme_name: &str,
    settings: &GlobalSettings,
    out_dir: &Path,
) -> Result<PathBuf, ExportError> {
    let surface = renderer.render_frame(photo)?;
    let bytes = encode_image(
        &surface,
        format_for(&photo.path, settings.export_to_jpeg),
        settings.quality,
    )?;
    std::fs::create_dir_all(out_dir)?;
    let path = out_dir.join(output_file_name(&photo.path, theme_name, settings.export_to_jpeg));
    std::fs::write(&path, bytes)?;
    Ok(path)
}

/// Incremental batch progress, sent after each photo completes or fails.
#[derive(Debug, Clone, PartialEq)]
pub enum ExportEvent {
    Progress { current: usize, total: usize },
    Failed { index: usize, reason: String },
}

/// Final report of a batch export.
#[derive(Debug)]
pub struct BatchReport {
    pub archive: PathBuf,
    pub exported: usize,
    /// Submission indices that failed, with the reason.
    pub failures: Vec<(usize, String)>,
}

/// Render every photo through `renderer` and pack the results into one
/// zip archive under `out_dir`. See the module docs for the failure
/// isolation and progress contract.
pub fn export_batch(
    renderer: &impl FrameRenderer,
    photos: &[Photo],
    theme_name: &str,
    settings: &GlobalSettings,
    out_dir: &Path,
    events: Option<&Sender<ExportEvent>>,
) -> Result<BatchReport, ExportError> {
    std::fs::create_dir_all(out_dir)?;
    let archive = out_dir.join(archive_name(theme_name, photos.len()));
    let file = std::fs::File::create(&archive)?;
    let mut zip = ZipWriter::new(file);
    let zip_options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let emit = |event: ExportEvent| {
        if let Some(tx) = events {
            // A dropped receiver only means nobody is watching.
            let _ = tx.send(event);
        }
    };

    let total = photos.len();
    let mut exported = 0;
    let mut failures = Vec::new();
    let mut used_names: HashSet<String> = HashSet::new();

    for (index, photo) in photos.iter().enumerate() {
        let result = renderer.render_frame(photo).map_err(ExportError::from).and_then(
            |surface| {
                encode_image(
                    &surface,
                    format_for(&photo.path, settings.export_to_jpeg),
                    settings.quality,
                )
            },
        );
        match result {
            Ok(bytes) => {
                let mut name =
                    output_file_name(&photo.path, theme_name, settings.export_to_jpeg);
                if !used_names.insert(name.clone()) {
                    // Same base name twice in one batch: disambiguate by index.
                    name = format!("{index}_{name}");
                    used_names.insert(name.clone());
                }
                zip.start_file(name, zip_options)?;
                zip.write_all(&bytes)?;
                exported += 1;
            }
            Err(error) => {
                let reason = error.to_string();
                warn!("batch export: photo {index} ({}) failed: {reason}", photo.path.display());
                emit(ExportEvent::Failed { index, reason: reason.clone() });
                failures.push((index, reason));
            }
        }
        emit(ExportEvent::Progress { current: index + 1, total });
    }

    zip.finish()?;
    Ok(BatchReport { archive, exported, failures })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::MetadataRecord;
    use image::Rgba;
    use std::sync::mpsc;
    use tempfile::TempDir;

    fn synthetic_photo(name: &str) -> Photo {
        let image = DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            32,
            24,
            Rgba([90, 120, 150, 255]),
        ));
        let thumbnail = image.thumbnail(300, 250).to_rgba8();
        Photo {
            path: PathBuf::from(name),
            file_size: 0,
            image,
            thumbnail,
            metadata: MetadataRecord::default(),
        }
    }

    /// Renders a fixed surface, failing for one designated path.
    struct ScriptedRenderer {
        fail_for: Option<PathBuf>,
    }

    impl FrameRenderer for ScriptedRenderer {
        fn render_frame(&self, photo: &Photo) -> Result<RgbaImage, RenderError> {
            if self.fail_for.as_deref() == Some(photo.path.as_path()) {
                return Err(RenderError::InvalidSurface { width: 0, height: 0 });
            }
            Ok(RgbaImage::from_pixel(16, 16, Rgba([1, 2, 3, 255])))
        }
    }

    // =========================================================================
    // Naming
    // =========================================================================

    #[test]
    fn theme_slug_lowercases_and_joins() {
        assert_eq!(theme_slug("Cinema Scope"), "cinema_scope");
        assert_eq!(theme_slug("just-frame"), "just_frame");
        assert_eq!(theme_slug("Simple"), "simple");
    }

    #[test]
    fn output_name_keeps_or_replaces_the_extension() {
        let source = Path::new("holiday/IMG_0042.PNG");
        assert_eq!(
            output_file_name(source, "one-line", false),
            "IMG_0042_one_line.PNG"
        );
        assert_eq!(
            output_file_name(source, "one-line", true),
            "IMG_0042_one_line.jpg"
        );
    }

    #[test]
    fn archive_name_embeds_slug_and_count() {
        assert_eq!(
            archive_name("Cinema Scope", 12),
            "exif_frames_cinema_scope_12photos.zip"
        );
    }

    // =========================================================================
    // Encoding
    // =========================================================================

    #[test]
    fn jpeg_and_png_round_trip_dimensions() {
        let surface = RgbaImage::from_pixel(20, 10, Rgba([200, 100, 50, 255]));

        for format in [ExportFormat::Jpeg, ExportFormat::Png] {
            let bytes = encode_image(&surface, format, 0.9).unwrap();
            assert!(!bytes.is_empty());
            let decoded = image::load_from_memory(&bytes).unwrap();
            assert_eq!((decoded.width(), decoded.height()), (20, 10));
        }
    }

    #[test]
    fn out_of_range_quality_is_clamped_not_rejected() {
        let surface = RgbaImage::from_pixel(8, 8, Rgba([10, 20, 30, 255]));
        assert!(encode_image(&surface, ExportFormat::Jpeg, 7.0).is_ok());
        assert!(encode_image(&surface, ExportFormat::Jpeg, 0.0).is_ok());
    }

    #[test]
    fn png_sources_stay_png_unless_forced_to_jpeg() {
        assert_eq!(format_for(Path::new("x.png"), false), ExportFormat::Png);
        assert_eq!(format_for(Path::new("x.png"), true), ExportFormat::Jpeg);
        assert_eq!(format_for(Path::new("x.jpg"), false), ExportFormat::Jpeg);
    }

    // =========================================================================
    // Batch
    // =========================================================================

    #[test]
    fn batch_skips_the_failing_photo_and_reports_it() {
        let dir = TempDir::new().unwrap();
        let photos = vec![
            synthetic_photo("a.jpg"),
            synthetic_photo("b.jpg"),
            synthetic_photo("c.jpg"),
        ];
        let renderer = ScriptedRenderer {
            fail_for: Some(PathBuf::from("b.jpg")),
        };
        let settings = GlobalSettings::default();

        let report = export_batch(&renderer, &photos, "simple", &settings, dir.path(), None)
            .unwrap();

        assert_eq!(report.exported, 2);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].0, 1);

        let archive = std::fs::File::open(&report.archive).unwrap();
        let zip = zip::ZipArchive::new(archive).unwrap();
        assert_eq!(zip.len(), 2);
    }

    #[test]
    fn batch_emits_progress_after_every_photo() {
        let dir = TempDir::new().unwrap();
        let photos = vec![synthetic_photo("a.jpg"), synthetic_photo("b.jpg")];
        let renderer = ScriptedRenderer { fail_for: None };
        let (tx, rx) = mpsc::channel();

        export_batch(
            &renderer,
            &photos,
            "simple",
            &GlobalSettings::default(),
            dir.path(),
            Some(&tx),
        )
        .unwrap();
        drop(tx);

        let events: Vec<_> = rx.iter().collect();
        assert_eq!(
            events,
            vec![
                ExportEvent::Progress { current: 1, total: 2 },
                ExportEvent::Progress { current: 2, total: 2 },
            ]
        );
    }

    #[test]
    fn batch_disambiguates_duplicate_base_names() {
        let dir = TempDir::new().unwrap();
        let photos = vec![synthetic_photo("same.jpg"), synthetic_photo("same.jpg")];
        let renderer = ScriptedRenderer { fail_for: None };

        let report = export_batch(
            &renderer,
            &photos,
            "simple",
            &GlobalSettings::default(),
            dir.path(),
            None,
        )
        .unwrap();
        assert_eq!(report.exported, 2);

        let archive = std::fs::File::open(&report.archive).unwrap();
        let zip = zip::ZipArchive::new(archive).unwrap();
        assert_eq!(zip.len(), 2);
    }

    #[test]
    fn single_export_writes_the_conventional_name() {
        let dir = TempDir::new().unwrap();
        let photo = synthetic_photo("IMG_0001.jpg");
        let renderer = ScriptedRenderer { fail_for: None };

        let path = export_single(
            &renderer,
            &photo,
            "two-line",
            &GlobalSettings::default(),
            dir.path(),
        )
        .unwrap();
        assert_eq!(
            path.file_name().unwrap().to_str().unwrap(),
            "IMG_0001_two_line.jpg"
        );
        assert!(path.exists());
    }
}
