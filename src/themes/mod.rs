//! Theme catalog: drawing strategies plus their option schemas.
//!
//! The catalog is closed and fixed at build time — no runtime registration.
//! Each entry pairs a name with a [`DrawStrategy`] implementation and the
//! typed option schema that strategy consumes. Lookup is by exact name;
//! resolving a name absent from the registry is a programming/state error
//! ([`ThemeError::UnknownTheme`]) because the UI layer only ever presents
//! names drawn from the registry itself.
//!
//! | Theme | Frame | Metadata |
//! |---|---|---|
//! | `no-frame` | none | none |
//! | `just-frame` | uniform border | none |
//! | `simple` | border + caption band | camera and settings, centered |
//! | `one-line` | bottom band | settings left, date right |
//! | `two-line` | bottom band | camera/lens line + settings/date line |
//! | `shot-on-one-line` | bottom band | "Shot on <model>", centered |
//! | `cinema-scope` | letterbox bars | settings in the bottom bar |

pub mod options;

mod cinema_scope;
mod just_frame;
mod no_frame;
mod one_line;
mod shot_on_one_line;
mod simple;
mod two_line;

pub use options::{
    NumberRange, OptionError, OptionSchema, OptionStore, OptionValue, ResolvedOptions,
};

use crate::render::geometry::Dimensions;
use crate::render::text::FontSet;
use crate::render::{PreparedPhoto, RenderError};
use crate::settings::GlobalSettings;
use image::RgbaImage;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ThemeError {
    #[error("unknown theme: {0:?}")]
    UnknownTheme(String),
}

/// One theme's drawing behavior. Implementations are stateless unit
/// structs; every render is a single pass over the provided surface.
///
/// Contract highlights (the engine depends on these):
/// - Option values arrive already resolved and typed; strategies never
///   default or validate them.
/// - Metadata visibility arrives pre-resolved in
///   [`PreparedPhoto::meta`]; an empty string means "draw nothing".
/// - `settings` is a read-only snapshot; persisted storage is never read
///   or written here.
pub trait DrawStrategy: Send + Sync {
    /// Surface geometry this theme needs around a photo area of `photo`
    /// pixels. The engine allocates; the strategy never resizes.
    fn surface_size(
        &self,
        photo: Dimensions,
        options: &ResolvedOptions,
        settings: &GlobalSettings,
    ) -> Result<Dimensions, RenderError>;

    /// Paint frame geometry and metadata text onto `surface`.
    fn draw(
        &self,
        surface: &mut RgbaImage,
        photo: &PreparedPhoto,
        options: &ResolvedOptions,
        settings: &GlobalSettings,
        fonts: &FontSet,
    ) -> Result<(), RenderError>;
}

/// A named theme: strategy + declared options.
pub struct ThemeDefinition {
    pub name: &'static str,
    pub options: Vec<OptionSchema>,
    strategy: Box<dyn DrawStrategy>,
}

impl std::fmt::Debug for ThemeDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThemeDefinition")
            .field("name", &self.name)
            .field("options", &self.options)
            .field("strategy", &"<dyn DrawStrategy>")
            .finish()
    }
}

impl ThemeDefinition {
    pub(crate) fn new(
        name: &'static str,
        options: Vec<OptionSchema>,
        strategy: Box<dyn DrawStrategy>,
    ) -> Self {
        debug_assert!(
            {
                let mut ids: Vec<_> = options.iter().map(|o| o.id).collect();
                ids.sort_unstable();
                ids.windows(2).all(|w| w[0] != w[1])
            },
            "duplicate option id in theme {name}"
        );
        Self { name, options, strategy }
    }

    pub fn strategy(&self) -> &dyn DrawStrategy {
        self.strategy.as_ref()
    }
}

/// The fixed, ordered theme catalog.
pub struct ThemeRegistry {
    themes: Vec<ThemeDefinition>,
}

impl ThemeRegistry {
    pub fn builtin() -> Self {
        Self {
            themes: vec![
                no_frame::definition(),
                just_frame::definition(),
                simple::definition(),
                one_line::definition(),
                two_line::definition(),
                shot_on_one_line::definition(),
                cinema_scope::definition(),
            ],
        }
    }

    pub fn get(&self, name: &str) -> Result<&ThemeDefinition, ThemeError> {
        self.themes
            .iter()
            .find(|t| t.name == name)
            .ok_or_else(|| ThemeError::UnknownTheme(name.to_string()))
    }

    /// Position of a theme in the catalog, for callers that need to hold
    /// onto a selection without borrowing the registry.
    pub fn index_of(&self, name: &str) -> Result<usize, ThemeError> {
        self.themes
            .iter()
            .position(|t| t.name == name)
            .ok_or_else(|| ThemeError::UnknownTheme(name.to_string()))
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.themes.iter().map(|t| t.name)
    }

    pub fn themes(&self) -> &[ThemeDefinition] {
        &self.themes
    }
}

impl Default for ThemeRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
