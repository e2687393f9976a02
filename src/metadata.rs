//! Camera metadata: record construction and display-time resolution.
//!
//! A [`MetadataRecord`] is derived exactly once per photo from the raw tag
//! dictionary ([`crate::exif::RawTags`]) and never mutated afterwards. What
//! the user actually sees is resolved at read time by
//! [`MetadataRecord::display`], which layers three concerns on top of the
//! extracted values, in order:
//!
//! 1. **Display policy** — per-field "show this" flags. A disabled field
//!    resolves to the empty string regardless of what was extracted.
//! 2. **Overrides** — user-entered replacement values win over extracted
//!    ones, field by field.
//! 3. **Modes** — focal length has two mutually exclusive display modes:
//!    ratio mode (extracted value × user ratio, rounded) takes priority
//!    over 35mm-equivalent mode; with neither active the raw value shows.
//!
//! ## Construction rules
//!
//! - **Lens label**: sources are tried in fixed priority order
//!   `lens_model → lens_spec → lens_specification → lens → lens_info`;
//!   first defined wins. A known-device correction table then patches
//!   specific literal labels (currently the RX100-family lens spec) to
//!   their 35mm-equivalent marketing label — a data patch, extended per
//!   device, never generalized into unit conversion. Finally, if a camera
//!   model is present its substring is stripped from the label to avoid
//!   duplicate model text.
//! - **Units**: focal length `" mm"` → `"mm"`; f-number keeps its first
//!   five characters with a leading `"f/"` rewritten to `"F"`; ISO gains an
//!   `"ISO"` prefix; exposure time gains a trailing `"s"`.
//! - **Timestamp**: the `"YYYY:MM:DD HH:MM:SS"` EXIF form is stored as
//!   `"YYYY-MM-DD HH:MM:SS"` and reformatted at read time into one of a
//!   fixed set of locale notations; an unknown notation preference yields
//!   the empty string.

use crate::exif::RawTags;
use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};

/// Known-device lens label corrections. Literal match → replacement.
const LENS_LABEL_CORRECTIONS: &[(&str, &str)] = &[
    ("8.8-25.7 mm f/2.8", "24-70mm F1.8-2.8"),
    ("8.8-25.7 mm f/1.8-2.8", "24-70mm F1.8-2.8"),
];

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Normalized, immutable view of a photo's camera/lens/exposure metadata.
///
/// All fields are pre-formatted display strings (`"50mm"`, `"F1.8"`,
/// `"ISO100"`, `"1/100s"`); `None` means the tag was absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetadataRecord {
    pub make: Option<String>,
    pub model: Option<String>,
    pub lens_model: Option<String>,
    pub focal_length: Option<String>,
    pub focal_length_in_35mm: Option<String>,
    pub f_number: Option<String>,
    pub iso: Option<String>,
    pub exposure_time: Option<String>,
    /// Stored as `"YYYY-MM-DD HH:MM:SS"`.
    pub taken_at: Option<String>,
}

impl MetadataRecord {
    /// Derive a record from raw tags. Every rule here is defensive: any
    /// absent tag simply leaves its field `None`.
    pub fn from_tags(tags: &RawTags) -> Self {
        let model = tags.model.clone();
        Self {
            make: tags.make.clone(),
            lens_model: resolve_lens_label(tags, model.as_deref()),
            focal_length: tags.focal_length.as_deref().map(|f| f.replace(" mm", "mm")),
            focal_length_in_35mm: format_focal_35mm(
                tags.focal_length_in_35mm.as_deref(),
                tags.upright_focal_length_35mm.as_deref(),
            ),
            f_number: tags.f_number.as_deref().map(format_f_number),
            iso: tags.iso.as_deref().map(|v| format!("ISO{v}")),
            exposure_time: tags.exposure_time.as_deref().map(|v| format!("{v}s")),
            taken_at: tags.date_time_original.as_deref().and_then(normalize_timestamp),
            model,
        }
    }

    /// Resolve every field through policy, overrides, and modes into the
    /// strings a drawing strategy consumes. Empty string means "nothing to
    /// draw" — strategies must not second-guess it.
    pub fn display(&self, opts: &DisplayOptions) -> DisplayedMetadata {
        DisplayedMetadata {
            make: gated(opts.show_camera_maker, &opts.overrides.make, &self.make),
            model: gated(opts.show_camera_model, &opts.overrides.model, &self.model),
            lens_model: gated(opts.show_lens_model, &opts.overrides.lens_model, &self.lens_model),
            focal_length: self.focal_length_display(opts),
            f_number: first_value(&opts.overrides.f_number, &self.f_number),
            iso: first_value(&opts.overrides.iso, &self.iso),
            exposure_time: first_value(&opts.overrides.exposure_time, &self.exposure_time),
            taken_at: self.taken_at_display(opts),
        }
    }

    fn focal_length_display(&self, opts: &DisplayOptions) -> String {
        if opts.focal_ratio_mode {
            let raw = opts
                .overrides
                .focal_length
                .as_deref()
                .or(self.focal_length.as_deref())
                .unwrap_or("0");
            let base = parse_leading_f64(&raw.replace(" mm", ""));
            return format!("{}mm", (base * opts.focal_ratio).round() as i64);
        }
        if opts.focal_35mm_mode {
            first_value(&opts.overrides.focal_length_in_35mm, &self.focal_length_in_35mm)
        } else {
            first_value(&opts.overrides.focal_length, &self.focal_length)
        }
    }

    fn taken_at_display(&self, opts: &DisplayOptions) -> String {
        let Some(stored) = opts.overrides.taken_at.as_deref().or(self.taken_at.as_deref()) else {
            return String::new();
        };
        match parse_stored_timestamp(stored) {
            Some(dt) => format_notation(&dt, &opts.date_notation),
            None => String::new(),
        }
    }
}

/// Read-time resolution inputs: display policy flags, user overrides, and
/// focal/date display modes. Lives in the settings snapshot, never consulted
/// by strategies directly.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayOptions {
    pub show_camera_maker: bool,
    pub show_camera_model: bool,
    pub show_lens_model: bool,
    /// Substitute the 35mm-equivalent focal length.
    pub focal_35mm_mode: bool,
    /// Multiply the extracted focal length by [`Self::focal_ratio`].
    /// Takes priority over `focal_35mm_mode` when both are set.
    pub focal_ratio_mode: bool,
    pub focal_ratio: f64,
    /// One of the fixed notation templates; anything else formats to `""`.
    pub date_notation: String,
    pub overrides: MetadataOverrides,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            show_camera_maker: true,
            show_camera_model: true,
            show_lens_model: true,
            focal_35mm_mode: false,
            focal_ratio_mode: false,
            focal_ratio: 1.0,
            date_notation: "2001/01/01 01:01:01".to_string(),
            overrides: MetadataOverrides::default(),
        }
    }
}

/// User-entered replacement values, keyed by field. `None` = no override.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetadataOverrides {
    pub make: Option<String>,
    pub model: Option<String>,
    pub lens_model: Option<String>,
    pub focal_length: Option<String>,
    pub focal_length_in_35mm: Option<String>,
    pub f_number: Option<String>,
    pub iso: Option<String>,
    pub exposure_time: Option<String>,
    pub taken_at: Option<String>,
}

/// Fully resolved metadata strings, ready to paint. Empty = hidden/absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DisplayedMetadata {
    pub make: String,
    pub model: String,
    pub lens_model: String,
    pub focal_length: String,
    pub f_number: String,
    pub iso: String,
    pub exposure_time: String,
    pub taken_at: String,
}

impl DisplayedMetadata {
    /// Camera identity line: make and model, skipping empty parts.
    pub fn camera_line(&self) -> String {
        join_non_empty(&[&self.make, &self.model], " ")
    }

    /// Exposure settings line: focal length, f-number, ISO, exposure time.
    pub fn settings_line(&self, divider: &str) -> String {
        join_non_empty(
            &[&self.focal_length, &self.f_number, &self.iso, &self.exposure_time],
            divider,
        )
    }
}

fn join_non_empty(parts: &[&str], divider: &str) -> String {
    parts
        .iter()
        .filter(|p| !p.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(divider)
}

fn gated(show: bool, over: &Option<String>, value: &Option<String>) -> String {
    if !show {
        return String::new();
    }
    first_value(over, value)
}

fn first_value(over: &Option<String>, value: &Option<String>) -> String {
    over.clone().or_else(|| value.clone()).unwrap_or_default()
}

/// Lens label: fixed source priority, then the correction table, then
/// camera-model substring stripping.
fn resolve_lens_label(tags: &RawTags, model: Option<&str>) -> Option<String> {
    let label = tags
        .lens_model
        .as_deref()
        .or(tags.lens_spec.as_deref())
        .or(tags.lens_specification.as_deref())
        .or(tags.lens.as_deref())
        .or(tags.lens_info.as_deref())?;

    let label = LENS_LABEL_CORRECTIONS
        .iter()
        .find(|(raw, _)| *raw == label)
        .map(|(_, fixed)| *fixed)
        .unwrap_or(label);

    Some(match model {
        Some(model) => label.replace(model, "").trim().to_string(),
        None => label.to_string(),
    })
}

/// 35mm-equivalent: prefer the direct 35mm-film tag; fall back to the
/// upright source, truncating any fractional part.
fn format_focal_35mm(film: Option<&str>, upright: Option<&str>) -> Option<String> {
    if let Some(v) = film {
        return Some(format!("{v}mm"));
    }
    upright.map(|v| {
        let whole = v.split('.').next().unwrap_or(v);
        format!("{whole}mm")
    })
}

/// First 5 characters, with a leading `"f/"` rewritten to `"F"`.
fn format_f_number(raw: &str) -> String {
    let head: String = raw.chars().take(5).collect();
    match head.strip_prefix("f/") {
        Some(rest) => format!("F{rest}"),
        None => head,
    }
}

/// Parse the leading numeric portion of a string like `"50mm"` or `"50.5"`.
/// Non-numeric input parses as 0, matching the permissive original behavior.
fn parse_leading_f64(s: &str) -> f64 {
    let numeric: String = s
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    numeric.parse().unwrap_or(0.0)
}

/// Normalize a `"YYYY:MM:DD HH:MM:SS"`-shaped EXIF date into the stored
/// `"YYYY-MM-DD HH:MM:SS"` form. Dash-dated input passes through unchanged.
fn normalize_timestamp(raw: &str) -> Option<String> {
    let mut parts = raw.trim().splitn(2, ' ');
    let date = parts.next()?.replace(':', "-");
    let time = parts.next()?;
    if date.is_empty() || time.is_empty() {
        return None;
    }
    Some(format!("{date} {time}"))
}

fn parse_stored_timestamp(stored: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(stored, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(stored, "%Y:%m:%d %H:%M:%S"))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(stored, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Format a timestamp per the notation preference. The notation strings are
/// themselves example dates; an unrecognized preference yields `""`.
fn format_notation(dt: &NaiveDateTime, notation: &str) -> String {
    let (y, mo, d) = (dt.year(), dt.month(), dt.day());
    let (h, mi, s) = (dt.hour(), dt.minute(), dt.second());
    match notation {
        "2001/01/01 01:01:01" => format!("{y}/{mo:02}/{d:02} {h:02}:{mi:02}:{s:02}"),
        "2001-01-01 01:01:01" => format!("{y}-{mo:02}-{d:02} {h:02}:{mi:02}:{s:02}"),
        "2001年01月01日 01時01分" => format!("{y}年{mo:02}月{d:02}日 {h:02}時{mi:02}分"),
        "2001년 01월 01일 01시 01분" => format!("{y}년 {mo:02}월 {d:02}일 {h:02}시 {mi:02}분"),
        "2001/01/01" => format!("{y}/{mo:02}/{d:02}"),
        "2001-01-01" => format!("{y}-{mo:02}-{d:02}"),
        "2001年01月01日" => format!("{y}年{mo:02}月{d:02}日"),
        "2001년 01월 01일" => format!("{y}년 {mo:02}월 {d:02}일"),
        "Jan 1, 2001" => format!("{} {d:02}, {y}", MONTHS[mo as usize - 1]),
        _ => String::new(),
    }
}
