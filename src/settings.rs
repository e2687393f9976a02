//! Persisted user settings with typed accessors and graceful degradation.
//!
//! Settings live in a flat JSON file under the platform config directory
//! (`~/.config/framelab/settings.json` on Linux). The store is deliberately
//! forgiving on the read side and strict on the write side:
//!
//! - **Reads never fail.** Every getter takes an explicit fallback for its
//!   call site. A missing file, unreadable file, corrupt JSON, missing key,
//!   or wrong-typed value all degrade to the fallback with a logged warning.
//!   The application must remain fully usable with storage disabled — the
//!   only thing lost is persistence across sessions.
//! - **Writes report errors.** [`SettingsError`] is returned from setters so
//!   the caller can decide how to surface a failed save.
//!
//! The render pipeline never touches this store directly. Each render reads
//! a [`GlobalSettings`] snapshot built once per trigger
//! ([`GlobalSettings::from_store`]), so a concurrently-arriving settings
//! mutation cannot alter an in-flight render's inputs.

use crate::metadata::{DisplayOptions, MetadataOverrides};
use log::warn;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("settings storage is unavailable")]
    Unavailable,
    #[error("failed to write settings file {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to serialize settings value for key {0}")]
    Serialize(String),
}

/// Hard ceiling for the fixed export width, applied at write time.
pub const MAX_FIX_IMAGE_WIDTH: u32 = 4096;

/// Key-value settings store backed by a JSON file.
///
/// `path: None` means storage is unavailable (no config directory, or the
/// store was opened in memory); getters fall back, setters return
/// [`SettingsError::Unavailable`] only for file-backed failures — an
/// in-memory store still accepts writes so a storage-less session behaves
/// normally, it just forgets everything on exit.
pub struct SettingsStore {
    path: Option<PathBuf>,
    values: Map<String, Value>,
}

impl SettingsStore {
    /// Open the store at the default platform location.
    pub fn open_default() -> Self {
        match dirs::config_dir() {
            Some(dir) => Self::open(dir.join("framelab").join("settings.json")),
            None => {
                warn!("no config directory available, settings will not persist");
                Self::in_memory()
            }
        }
    }

    /// Open the store at an explicit path. Missing or corrupt files start
    /// from an empty map; the file is created on first successful set.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = match std::fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str::<Value>(&content) {
                Ok(Value::Object(map)) => map,
                Ok(_) | Err(_) => {
                    warn!("settings file {} is not valid JSON, starting fresh", path.display());
                    Map::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Map::new(),
            Err(e) => {
                warn!("cannot read settings file {}: {e}, using defaults", path.display());
                Map::new()
            }
        };
        Self {
            path: Some(path),
            values,
        }
    }

    /// A store with no backing file. Used when storage is unavailable and
    /// in tests.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            values: Map::new(),
        }
    }

    /// Location of the backing file, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn string(&self, key: &str, fallback: &str) -> String {
        match self.values.get(key) {
            Some(Value::String(s)) => s.clone(),
            Some(other) => {
                warn!("settings key {key} holds {other}, expected a string; using fallback");
                fallback.to_string()
            }
            None => fallback.to_string(),
        }
    }

    pub fn boolean(&self, key: &str, fallback: bool) -> bool {
        match self.values.get(key) {
            Some(Value::Bool(b)) => *b,
            Some(other) => {
                warn!("settings key {key} holds {other}, expected a boolean; using fallback");
                fallback
            }
            None => fallback,
        }
    }

    pub fn number(&self, key: &str, fallback: f64) -> f64 {
        match self.values.get(key).and_then(Value::as_f64) {
            Some(n) => n,
            None => fallback,
        }
    }

    pub fn int(&self, key: &str, fallback: i64) -> i64 {
        match self.values.get(key).and_then(Value::as_i64) {
            Some(n) => n,
            None => fallback,
        }
    }

    /// Deserialize a structured value. Any shape mismatch falls back.
    pub fn json<T: DeserializeOwned>(&self, key: &str, fallback: T) -> T {
        match self.values.get(key) {
            Some(value) => match serde_json::from_value(value.clone()) {
                Ok(v) => v,
                Err(e) => {
                    warn!("settings key {key} failed to deserialize: {e}; using fallback");
                    fallback
                }
            },
            None => fallback,
        }
    }

    pub fn set_string(&mut self, key: &str, value: &str) -> Result<(), SettingsError> {
        self.values.insert(key.to_string(), Value::String(value.to_string()));
        self.persist()
    }

    pub fn set_boolean(&mut self, key: &str, value: bool) -> Result<(), SettingsError> {
        self.values.insert(key.to_string(), Value::Bool(value));
        self.persist()
    }

    pub fn set_number(&mut self, key: &str, value: f64) -> Result<(), SettingsError> {
        let number = serde_json::Number::from_f64(value)
            .ok_or_else(|| SettingsError::Serialize(key.to_string()))?;
        self.values.insert(key.to_string(), Value::Number(number));
        self.persist()
    }

    pub fn set_int(&mut self, key: &str, value: i64) -> Result<(), SettingsError> {
        self.values.insert(key.to_string(), Value::Number(value.into()));
        self.persist()
    }

    pub fn set_json<T: Serialize>(&mut self, key: &str, value: &T) -> Result<(), SettingsError> {
        let value = serde_json::to_value(value)
            .map_err(|_| SettingsError::Serialize(key.to_string()))?;
        self.values.insert(key.to_string(), value);
        self.persist()
    }

    pub fn remove(&mut self, key: &str) -> Result<(), SettingsError> {
        self.values.remove(key);
        self.persist()
    }

    /// Set the fixed export width, clamped to [`MAX_FIX_IMAGE_WIDTH`].
    pub fn set_fix_image_width(&mut self, width: u32) -> Result<(), SettingsError> {
        self.set_int("fixImageWidth", width.min(MAX_FIX_IMAGE_WIDTH) as i64)
    }

    /// Set the export quality, clamped into the 0.1–1.0 interface range.
    pub fn set_quality(&mut self, quality: f64) -> Result<(), SettingsError> {
        self.set_number("quality", quality.clamp(0.1, 1.0))
    }

    fn persist(&self) -> Result<(), SettingsError> {
        let Some(path) = &self.path else {
            // In-memory store: the write took effect for this session.
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| SettingsError::Write {
                path: path.clone(),
                source,
            })?;
        }
        let json = serde_json::to_string_pretty(&Value::Object(self.values.clone()))
            .map_err(|_| SettingsError::Serialize("<store>".to_string()))?;
        std::fs::write(path, json).map_err(|source| SettingsError::Write {
            path: path.clone(),
            source,
        })
    }
}

/// Read-only snapshot of every setting a render consumes.
///
/// Built once per render trigger; strategies and the engine only ever see
/// this plain-value copy, never the store.
#[derive(Debug, Clone, PartialEq)]
pub struct GlobalSettings {
    /// Lossy encoding quality, 0.1–1.0.
    pub quality: f32,
    pub export_to_jpeg: bool,
    pub fix_image_width: u32,
    pub enable_fix_image_width: bool,
    /// Aspect ratio selector: `"free"` or `"W:H"` (e.g. `"4:5"`).
    pub ratio: String,
    /// When set, the ratio is achieved without cropping (theme-dependent
    /// letterboxing instead of a center crop).
    pub not_cropped_mode: bool,
    pub dark_mode: bool,
    pub watermark: String,
    pub fix_watermark: bool,
    pub display: DisplayOptions,
}

impl GlobalSettings {
    /// Build a snapshot from the store, one documented fallback per key.
    pub fn from_store(store: &SettingsStore) -> Self {
        Self {
            quality: store.number("quality", 0.95).clamp(0.1, 1.0) as f32,
            export_to_jpeg: store.boolean("exportToJpeg", false),
            fix_image_width: (store.int("fixImageWidth", 1920).max(1) as u32)
                .min(MAX_FIX_IMAGE_WIDTH),
            enable_fix_image_width: store.boolean("enableFixImageWidth", false),
            ratio: store.string("ratio", "free"),
            not_cropped_mode: store.boolean("notCroppedMode", false),
            dark_mode: store.boolean("darkMode", false),
            watermark: store.string("watermark", ""),
            fix_watermark: store.boolean("fixWatermark", false),
            display: DisplayOptions {
                show_camera_maker: store.boolean("showCameraMaker", true),
                show_camera_model: store.boolean("showCameraModel", true),
                show_lens_model: store.boolean("showLensModel", true),
                focal_35mm_mode: store.boolean("focalLength35mmMode", false),
                focal_ratio_mode: store.boolean("focalLengthRatioMode", false),
                focal_ratio: store.number("focalLengthRatio", 1.0),
                date_notation: store.string("dateNotation", "2001/01/01 01:01:01"),
                overrides: MetadataOverrides {
                    make: non_empty(store.string("overrideCameraMaker", "")),
                    model: non_empty(store.string("overrideCameraModel", "")),
                    lens_model: non_empty(store.string("overrideLensModel", "")),
                    ..MetadataOverrides::default()
                },
            },
        }
    }
}

impl Default for GlobalSettings {
    fn default() -> Self {
        Self::from_store(&SettingsStore::in_memory())
    }
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() { None } else { Some(s) }
}
