//! Photos: decode, metadata extraction, thumbnails, batch ingestion.
//!
//! A [`Photo`] owns everything a render needs: the decoded bitmap, a
//! bounded thumbnail for list display, and the derived
//! [`MetadataRecord`]. Construction can fail on decode; metadata
//! extraction can *not* fail a photo — a file with no usable EXIF still
//! loads and renders with empty fields.
//!
//! Batch ingestion ([`load_photos`]) schedules decoding across files with
//! rayon but assembles results **in submission order** — the caller's
//! indices are stable regardless of which file finishes first. Per-file
//! failures are collected into the report, never thrown across the batch:
//! adding ten files where three are corrupt yields seven photos and three
//! indexed failures.
//!
//! HEIC/HEIF is the decoder collaborator's explicit out-of-scope format:
//! those files are rejected up front with an error naming the required
//! pre-transcode, instead of a generic decode failure.

use crate::exif;
use crate::metadata::MetadataRecord;
use image::{DynamicImage, ImageReader, RgbaImage};
use log::{info, warn};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

/// Thumbnail bounding box for list display.
pub const THUMBNAIL_MAX_WIDTH: u32 = 300;
pub const THUMBNAIL_MAX_HEIGHT: u32 = 250;

/// File extensions the decoder accepts (lowercased for comparison).
const SUPPORTED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "tif", "tiff", "webp"];

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to decode {path}: {message}")]
    Decode { path: PathBuf, message: String },
    #[error("{path} is HEIC/HEIF; transcode it to a browser-native format before adding")]
    HeifNotTranscoded { path: PathBuf },
}

/// A loaded photo. Immutable once constructed — the render engine only
/// ever reads it.
pub struct Photo {
    pub path: PathBuf,
    pub file_size: u64,
    pub image: DynamicImage,
    /// Fits within [`THUMBNAIL_MAX_WIDTH`]×[`THUMBNAIL_MAX_HEIGHT`].
    pub thumbnail: RgbaImage,
    pub metadata: MetadataRecord,
}

impl Photo {
    /// Decode one file, extract its metadata, and build the thumbnail.
    pub fn load(path: &Path) -> Result<Self, IngestError> {
        if is_heif(path) {
            return Err(IngestError::HeifNotTranscoded { path: path.to_path_buf() });
        }
        let file_size = std::fs::metadata(path)
            .map(|m| m.len())
            .map_err(|source| IngestError::Io { path: path.to_path_buf(), source })?;
        let image = ImageReader::open(path)
            .map_err(|source| IngestError::Io { path: path.to_path_buf(), source })?
            .decode()
            .map_err(|e| IngestError::Decode {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        // Extraction failure is "no metadata", handled inside extract().
        let metadata = MetadataRecord::from_tags(&exif::extract(path));
        let thumbnail = image
            .thumbnail(THUMBNAIL_MAX_WIDTH, THUMBNAIL_MAX_HEIGHT)
            .to_rgba8();

        Ok(Self {
            path: path.to_path_buf(),
            file_size,
            image,
            thumbnail,
            metadata,
        })
    }
}

fn is_heif(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("heic") || e.eq_ignore_ascii_case("heif"))
}

fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| {
            let lower = e.to_ascii_lowercase();
            SUPPORTED_EXTENSIONS.contains(&lower.as_str())
        })
        || is_heif(path) // kept so the transcode contract error surfaces
}

/// One failed item of a batch, tied to its submission index.
#[derive(Debug)]
pub struct IngestFailure {
    pub index: usize,
    pub path: PathBuf,
    pub error: IngestError,
}

/// Outcome of a batch ingest: loaded photos in submission order plus the
/// indexed failures.
pub struct IngestReport {
    pub photos: Vec<Photo>,
    pub failures: Vec<IngestFailure>,
}

impl IngestReport {
    pub fn submitted(&self) -> usize {
        self.photos.len() + self.failures.len()
    }
}

/// Load a batch of files. Decoding runs in parallel; the report is
/// assembled index-stable in submission order.
pub fn load_photos(paths: &[PathBuf]) -> IngestReport {
    let results: Vec<Result<Photo, IngestError>> =
        paths.par_iter().map(|path| Photo::load(path)).collect();

    let mut photos = Vec::new();
    let mut failures = Vec::new();
    for (index, result) in results.into_iter().enumerate() {
        match result {
            Ok(photo) => photos.push(photo),
            Err(error) => {
                warn!("skipping {}: {error}", paths[index].display());
                failures.push(IngestFailure {
                    index,
                    path: paths[index].clone(),
                    error,
                });
            }
        }
    }
    info!("loaded {} of {} photos", photos.len(), paths.len());
    IngestReport { photos, failures }
}

/// Expand CLI arguments into a flat file list: files pass through,
/// directories are walked recursively with entries in sorted order.
pub fn collect_image_paths(args: &[PathBuf]) -> Vec<PathBuf> {
    let mut paths = Vec::new();
    for arg in args {
        if arg.is_dir() {
            for entry in WalkDir::new(arg)
                .sort_by_file_name()
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_file())
            {
                if is_supported(entry.path()) {
                    paths.push(entry.path().to_path_buf());
                }
            }
        } else {
            paths.push(arg.clone());
        }
    }
    paths
}
