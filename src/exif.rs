//! EXIF extraction — the metadata-extractor collaborator.
//!
//! Wraps `kamadak-exif` behind a single function, [`extract`], that turns a
//! file into a [`RawTags`] dictionary. The contract is deliberately loose:
//! absence of any tag is `None`, never an error, and a file with no readable
//! EXIF container at all (PNG screenshots, stripped JPEGs, corrupt segments)
//! yields `RawTags::default()` with a logged warning. "No metadata" is a
//! normal state, not a failure — a photo without EXIF still renders with
//! empty fields.
//!
//! Normalization of the raw values into display form (unit suffixes, the
//! lens source priority chain, the known-device correction table) happens in
//! [`crate::metadata`], not here. This module only reads tags and formats
//! them the way the reader presents them.

use exif::{In, Tag, Value};
use log::{debug, warn};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Raw tag dictionary handed to [`crate::metadata::MetadataRecord::from_tags`].
///
/// One optional entry per tag source the record constructor consumes. The
/// lens fields mirror the tag names different writers use; a given extractor
/// backend fills the ones its reader exposes and leaves the rest `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTags {
    pub make: Option<String>,
    pub model: Option<String>,
    pub lens_model: Option<String>,
    pub lens_spec: Option<String>,
    pub lens_specification: Option<String>,
    pub lens: Option<String>,
    pub lens_info: Option<String>,
    /// Focal length as presented by the reader, e.g. `"50 mm"`.
    pub focal_length: Option<String>,
    /// 35mm-equivalent focal length, numeric string without unit.
    pub focal_length_in_35mm: Option<String>,
    /// Secondary 35mm-equivalent source; may carry a fractional part.
    pub upright_focal_length_35mm: Option<String>,
    /// F-number as presented by the reader, e.g. `"f/1.8"`.
    pub f_number: Option<String>,
    /// ISO speed rating, numeric string.
    pub iso: Option<String>,
    /// Exposure time without unit, e.g. `"1/100"`.
    pub exposure_time: Option<String>,
    /// Capture timestamp, `"YYYY:MM:DD HH:MM:SS"`-shaped (dash-dated forms
    /// from other readers are accepted downstream).
    pub date_time_original: Option<String>,
}

/// Read the EXIF container of `path` into a [`RawTags`] dictionary.
///
/// Every failure mode collapses to the empty dictionary.
pub fn extract(path: &Path) -> RawTags {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) => {
            warn!("cannot open {} for EXIF extraction: {e}", path.display());
            return RawTags::default();
        }
    };
    let mut reader = BufReader::new(file);
    let exif = match exif::Reader::new().read_from_container(&mut reader) {
        Ok(exif) => exif,
        Err(e) => {
            debug!("no EXIF data in {}: {e}", path.display());
            return RawTags::default();
        }
    };

    let text = |tag: Tag| -> Option<String> {
        exif.get_field(tag, In::PRIMARY)
            .map(|f| f.display_value().to_string().trim_matches('"').trim().to_string())
            .filter(|s| !s.is_empty())
    };
    // Unsigned-short tags read as numbers so "0" never masquerades as data.
    let short = |tag: Tag| -> Option<u32> {
        exif.get_field(tag, In::PRIMARY).and_then(|f| match f.value {
            Value::Short(ref v) => v.first().map(|&n| n as u32),
            Value::Long(ref v) => v.first().copied(),
            _ => None,
        })
    };

    RawTags {
        make: text(Tag::Make),
        model: text(Tag::Model),
        lens_model: text(Tag::LensModel),
        lens_spec: None,
        lens_specification: text(Tag::LensSpecification),
        lens: None,
        lens_info: None,
        focal_length: exif
            .get_field(Tag::FocalLength, In::PRIMARY)
            .map(|f| f.display_value().with_unit(&exif).to_string()),
        focal_length_in_35mm: short(Tag::FocalLengthIn35mmFilm)
            .filter(|&n| n > 0)
            .map(|n| n.to_string()),
        upright_focal_length_35mm: None,
        f_number: exif
            .get_field(Tag::FNumber, In::PRIMARY)
            .map(|f| f.display_value().with_unit(&exif).to_string()),
        iso: short(Tag::PhotographicSensitivity)
            .filter(|&n| n > 0)
            .map(|n| n.to_string()),
        exposure_time: text(Tag::ExposureTime),
        date_time_original: text(Tag::DateTimeOriginal),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::codecs::jpeg::JpegEncoder;
    use image::{ExtendedColorType, ImageEncoder, RgbImage};
    use tempfile::TempDir;

    /// A JPEG with no EXIF segment at all.
    fn create_plain_jpeg(path: &Path) {
        let img = RgbImage::from_pixel(16, 16, image::Rgb([120, 130, 140]));
        let file = File::create(path).unwrap();
        let writer = std::io::BufWriter::new(file);
        JpegEncoder::new(writer)
            .write_image(img.as_raw(), 16, 16, ExtendedColorType::Rgb8)
            .unwrap();
    }

    #[test]
    fn missing_file_yields_empty_tags() {
        assert_eq!(extract(Path::new("/nonexistent/photo.jpg")), RawTags::default());
    }

    #[test]
    fn jpeg_without_exif_yields_empty_tags() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("plain.jpg");
        create_plain_jpeg(&path);
        assert_eq!(extract(&path), RawTags::default());
    }

    #[test]
    fn non_image_bytes_yield_empty_tags() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("notes.jpg");
        std::fs::write(&path, b"definitely not a jpeg").unwrap();
        assert_eq!(extract(&path), RawTags::default());
    }
}
