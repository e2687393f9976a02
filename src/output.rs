//! CLI output formatting.
//!
//! Every report has a pure `format_*` function returning `Vec<String>` (one
//! entry per line, testable without capturing stdout) and a thin `print_*`
//! wrapper that writes the lines. Display is information-first: the primary
//! line for every entity is its semantic identity — index, name, outcome —
//! with filesystem paths as indented `Source:` context.
//!
//! ## Ingest
//!
//! ```text
//! Loaded 2 of 3 photos
//! 001 dawn.jpg (4000x3000, SONY ILCE-7M3)
//! 002 dusk.jpg (1600x900)
//! Failed
//! 003 broken.jpg
//!     failed to decode ...
//! ```
//!
//! ## Themes
//!
//! ```text
//! no-frame
//! just-frame
//!     FRAME_COLOR   color   #ffffff
//!     FRAME_RATIO   number  0.06 (0..0.3)
//! ```
//!
//! ## Batch
//!
//! ```text
//! [2/3] rendered
//! Exported 2 of 3 photos to exif_frames_simple_3photos.zip
//! 002 failed: render produced an invalid 0x0 surface
//! ```

use crate::export::{BatchReport, ExportEvent};
use crate::photo::IngestReport;
use crate::themes::{OptionValue, ThemeDefinition};

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

fn file_name(path: &std::path::Path) -> &str {
    path.file_name().and_then(|n| n.to_str()).unwrap_or("?")
}

// ============================================================================
// Ingest
// ============================================================================

pub fn format_ingest_report(report: &IngestReport) -> Vec<String> {
    let mut lines = vec![format!(
        "Loaded {} of {} photos",
        report.photos.len(),
        report.submitted()
    )];
    for (pos, photo) in report.photos.iter().enumerate() {
        let camera = photo
            .metadata
            .display(&crate::metadata::DisplayOptions::default())
            .camera_line();
        let detail = if camera.is_empty() {
            format!("{}x{}", photo.image.width(), photo.image.height())
        } else {
            format!("{}x{}, {}", photo.image.width(), photo.image.height(), camera)
        };
        lines.push(format!(
            "{} {} ({detail})",
            format_index(pos + 1),
            file_name(&photo.path)
        ));
    }
    if !report.failures.is_empty() {
        lines.push("Failed".to_string());
        for failure in &report.failures {
            lines.push(format!(
                "{} {}",
                format_index(failure.index + 1),
                file_name(&failure.path)
            ));
            lines.push(format!("    {}", failure.error));
        }
    }
    lines
}

pub fn print_ingest_report(report: &IngestReport) {
    for line in format_ingest_report(report) {
        println!("{line}");
    }
}

// ============================================================================
// Themes
// ============================================================================

fn format_option_value(value: &OptionValue) -> String {
    match value {
        OptionValue::Color(c) => format!("color   {c}"),
        OptionValue::Number(n) => format!("number  {n}"),
        OptionValue::Text(t) => format!("text    {t:?}"),
        OptionValue::Flag(b) => format!("flag    {b}"),
        OptionValue::Choice(c) => format!("choice  {c}"),
    }
}

pub fn format_theme_list(themes: &[ThemeDefinition]) -> Vec<String> {
    let mut lines = Vec::new();
    for theme in themes {
        lines.push(theme.name.to_string());
        for option in &theme.options {
            let mut line = format!("    {:<16} {}", option.id, format_option_value(&option.default));
            if let Some(range) = option.range {
                line.push_str(&format!(" ({}..{})", range.min, range.max));
            }
            if !option.choices.is_empty() {
                line.push_str(&format!(" [{}]", option.choices.join(", ")));
            }
            lines.push(line);
        }
    }
    lines
}

pub fn print_theme_list(themes: &[ThemeDefinition]) {
    for line in format_theme_list(themes) {
        println!("{line}");
    }
}

// ============================================================================
// Batch export
// ============================================================================

pub fn format_export_event(event: &ExportEvent) -> String {
    match event {
        ExportEvent::Progress { current, total } => format!("[{current}/{total}] rendered"),
        ExportEvent::Failed { index, reason } => {
            format!("{} failed: {reason}", format_index(index + 1))
        }
    }
}

pub fn format_batch_summary(report: &BatchReport, submitted: usize) -> Vec<String> {
    let mut lines = vec![format!(
        "Exported {} of {} photos to {}",
        report.exported,
        submitted,
        file_name(&report.archive)
    )];
    for (index, reason) in &report.failures {
        lines.push(format!("{} failed: {reason}", format_index(index + 1)));
    }
    lines
}

pub fn print_batch_summary(report: &BatchReport, submitted: usize) {
    for line in format_batch_summary(report, submitted) {
        println!("{line}");
    }
}
