//! # Framelab
//!
//! A frame exporter for photographs: load photos, read their embedded
//! camera metadata (EXIF), and render "framed" exports — the original
//! photo composited with decorative borders and overlaid metadata text —
//! through a themeable rendering pipeline.
//!
//! # Architecture: Snapshot → Render → Encode
//!
//! Everything flows through one pure function:
//!
//! ```text
//! (theme, photo, resolved options, settings snapshot) → render → bitmap
//! ```
//!
//! The engine ([`render`]) computes the output geometry (fixed-width
//! scaling, aspect-ratio cropping), prepares the photo area, and hands a
//! surface to the selected theme's drawing strategy. Identical inputs
//! produce byte-identical output — there is no hidden mutable state a
//! strategy can reach. That determinism is what makes debounced
//! re-rendering and "last result wins" supersession ([`schedule`]) safe,
//! and it is pinned by tests.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`photo`] | Decoding, thumbnails, order-stable batch ingestion |
//! | [`exif`] | EXIF extraction into the raw tag dictionary |
//! | [`metadata`] | Record construction + display-policy/override resolution |
//! | [`themes`] | Fixed theme catalog: strategies + typed option schemas |
//! | [`render`] | The engine, output geometry math, fonts and text drawing |
//! | [`export`] | Encoding, file naming, sequential batch export to zip |
//! | [`settings`] | Persisted key-value settings with typed fallbacks |
//! | [`schedule`] | Debounce state machine + render supersession tickets |
//! | [`output`] | CLI report formatting — pure `format_*` functions |
//!
//! # Design Decisions
//!
//! ## Closed Theme Catalog
//!
//! Themes are a fixed, build-time catalog — a trait object per theme behind
//! [`themes::ThemeRegistry`], not a runtime-open plugin system. Looking up
//! a name the registry does not contain is a programming error, not a user
//! error: the UI layer only ever offers names taken from the registry.
//!
//! ## Typed Options, Resolved Once
//!
//! Theme options are a typed sum ([`themes::OptionValue`]) keyed by id.
//! User overrides are stored sparsely and layered onto the declared
//! defaults in one resolution step; strategies receive the complete map
//! and contain no defaulting logic. Switching themes replaces the override
//! set atomically, so no render ever observes keys from a previous theme.
//!
//! ## Degrade Reads, Report Writes
//!
//! Persisted settings ([`settings`]) follow one rule everywhere: reads
//! never fail (explicit per-call-site fallback, logged warning), writes
//! surface their errors. The application stays fully usable with storage
//! unavailable — it just forgets preferences between sessions. The render
//! pipeline itself never touches storage; it receives a plain-value
//! snapshot built once per render trigger.
//!
//! ## Isolation Over Abortion
//!
//! Per-item failures stay per-item. One corrupt file in a multi-file add
//! is reported and skipped; one photo failing to render inside a batch
//! export is recorded by index while the rest of the archive completes.
//! Only engine-level invariant violations (unknown theme, zero-size
//! surface) are fatal for their operation.

pub mod exif;
pub mod export;
pub mod metadata;
pub mod output;
pub mod photo;
pub mod render;
pub mod schedule;
pub mod settings;
pub mod themes;
