//! Theme option schemas, typed values, and resolution.
//!
//! Every theme declares its options as a list of [`OptionSchema`] entries:
//! a unique id, a typed default, and constraints (numeric range or an
//! enumerated choice list). User overrides are stored sparsely; resolution
//! ([`ResolvedOptions::resolve`]) layers them over the declared defaults so
//! a drawing strategy always receives a complete, typed mapping — one entry
//! per declared id, never a key foreign to the active theme.
//!
//! Values are a typed sum ([`OptionValue`]) keyed by id rather than a
//! stringly map. Overrides of the wrong kind for their id, numbers outside
//! the declared range (clamped), and choices not in the declared list are
//! all normalized during resolution, so strategies contain no defaulting or
//! validation logic at all.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum OptionError {
    #[error("option {0} is not declared by the active theme")]
    Missing(String),
    #[error("option {id} holds a {found}, expected a {expected}")]
    Type {
        id: String,
        expected: &'static str,
        found: &'static str,
    },
}

/// A concrete option value. The variant is the option's type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value")]
pub enum OptionValue {
    /// Hex color string, e.g. `"#ffffff"`.
    Color(String),
    Number(f64),
    Text(String),
    Flag(bool),
    /// One of the schema's enumerated choices.
    Choice(String),
}

impl OptionValue {
    fn kind(&self) -> &'static str {
        match self {
            OptionValue::Color(_) => "color",
            OptionValue::Number(_) => "number",
            OptionValue::Text(_) => "text",
            OptionValue::Flag(_) => "flag",
            OptionValue::Choice(_) => "choice",
        }
    }
}

/// Inclusive numeric constraints for `Number` options.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumberRange {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

/// One declared option of a theme.
#[derive(Debug, Clone)]
pub struct OptionSchema {
    /// Unique within the declaring theme.
    pub id: &'static str,
    pub default: OptionValue,
    /// Constraints for `Number` options; ignored for other kinds.
    pub range: Option<NumberRange>,
    /// Enumerated values for `Choice` options; empty for other kinds.
    pub choices: &'static [&'static str],
}

impl OptionSchema {
    pub fn color(id: &'static str, default: &str) -> Self {
        Self {
            id,
            default: OptionValue::Color(default.to_string()),
            range: None,
            choices: &[],
        }
    }

    pub fn number(id: &'static str, default: f64, min: f64, max: f64, step: f64) -> Self {
        Self {
            id,
            default: OptionValue::Number(default),
            range: Some(NumberRange { min, max, step }),
            choices: &[],
        }
    }

    pub fn text(id: &'static str, default: &str) -> Self {
        Self {
            id,
            default: OptionValue::Text(default.to_string()),
            range: None,
            choices: &[],
        }
    }

    pub fn flag(id: &'static str, default: bool) -> Self {
        Self {
            id,
            default: OptionValue::Flag(default),
            range: None,
            choices: &[],
        }
    }

    pub fn choice(id: &'static str, default: &'static str, choices: &'static [&'static str]) -> Self {
        debug_assert!(choices.contains(&default));
        Self {
            id,
            default: OptionValue::Choice(default.to_string()),
            range: None,
            choices,
        }
    }

    /// Normalize an override against this schema entry. `None` means the
    /// override is unusable (wrong kind, unknown choice) and the default
    /// must stand.
    fn accept(&self, value: &OptionValue) -> Option<OptionValue> {
        if value.kind() != self.default.kind() {
            return None;
        }
        match (value, self.range) {
            (OptionValue::Number(n), Some(range)) => {
                Some(OptionValue::Number(n.clamp(range.min, range.max)))
            }
            (OptionValue::Choice(c), _) => {
                if self.choices.contains(&c.as_str()) {
                    Some(value.clone())
                } else {
                    None
                }
            }
            _ => Some(value.clone()),
        }
    }
}

/// Complete, typed option mapping for one theme: defaults layered with the
/// overrides that belong to it. Strategies read it through the typed
/// accessors; a missing or mistyped id is an invariant violation surfaced
/// as an error, never silently defaulted.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedOptions {
    values: BTreeMap<String, OptionValue>,
}

impl ResolvedOptions {
    /// Layer `overrides` onto the declared defaults. Override keys not
    /// declared by the theme are ignored — this is what keeps stale keys
    /// from a previously selected theme out of the resolved set.
    pub fn resolve(
        declared: &[OptionSchema],
        overrides: &BTreeMap<String, OptionValue>,
    ) -> Self {
        let values = declared
            .iter()
            .map(|schema| {
                let value = overrides
                    .get(schema.id)
                    .and_then(|v| schema.accept(v))
                    .unwrap_or_else(|| schema.default.clone());
                (schema.id.to_string(), value)
            })
            .collect();
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&OptionValue> {
        self.values.get(id)
    }

    pub fn color(&self, id: &str) -> Result<&str, OptionError> {
        match self.require(id)? {
            OptionValue::Color(c) => Ok(c),
            other => Err(self.type_error(id, "color", other)),
        }
    }

    pub fn number(&self, id: &str) -> Result<f64, OptionError> {
        match self.require(id)? {
            OptionValue::Number(n) => Ok(*n),
            other => Err(self.type_error(id, "number", other)),
        }
    }

    pub fn text(&self, id: &str) -> Result<&str, OptionError> {
        match self.require(id)? {
            OptionValue::Text(t) => Ok(t),
            other => Err(self.type_error(id, "text", other)),
        }
    }

    pub fn flag(&self, id: &str) -> Result<bool, OptionError> {
        match self.require(id)? {
            OptionValue::Flag(b) => Ok(*b),
            other => Err(self.type_error(id, "flag", other)),
        }
    }

    pub fn choice(&self, id: &str) -> Result<&str, OptionError> {
        match self.require(id)? {
            OptionValue::Choice(c) => Ok(c),
            other => Err(self.type_error(id, "choice", other)),
        }
    }

    fn require(&self, id: &str) -> Result<&OptionValue, OptionError> {
        self.values.get(id).ok_or_else(|| OptionError::Missing(id.to_string()))
    }

    fn type_error(&self, id: &str, expected: &'static str, found: &OptionValue) -> OptionError {
        OptionError::Type {
            id: id.to_string(),
            expected,
            found: found.kind(),
        }
    }
}

/// Caller-side override state. This is the only mutable option state in the
/// system; everything downstream works on [`ResolvedOptions`] snapshots.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OptionStore {
    overrides: BTreeMap<String, OptionValue>,
}

impl OptionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(overrides: BTreeMap<String, OptionValue>) -> Self {
        Self { overrides }
    }

    pub fn overrides(&self) -> &BTreeMap<String, OptionValue> {
        &self.overrides
    }

    pub fn set(&mut self, id: &str, value: OptionValue) {
        self.overrides.insert(id.to_string(), value);
    }

    pub fn clear(&mut self) {
        self.overrides.clear();
    }

    /// Theme switch: drop every override key the newly selected theme does
    /// not declare, as a single state transition. Keys shared between the
    /// old and new schema carry their values over; everything else is gone
    /// before the next resolution, so no render ever observes a mixed set.
    pub fn switch_theme(&mut self, new_declared: &[OptionSchema]) {
        self.overrides
            .retain(|id, _| new_declared.iter().any(|schema| schema.id == id));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema_a() -> Vec<OptionSchema> {
        vec![
            OptionSchema::number("PADDING", 40.0, 0.0, 400.0, 1.0),
            OptionSchema::color("TEXT_COLOR", "#000000"),
        ]
    }

    fn schema_b() -> Vec<OptionSchema> {
        vec![
            OptionSchema::color("TEXT_COLOR", "#ffffff"),
            OptionSchema::text("DIVIDER", "|"),
        ]
    }

    #[test]
    fn empty_overrides_yield_exactly_the_defaults() {
        let resolved = ResolvedOptions::resolve(&schema_a(), &BTreeMap::new());
        assert_eq!(resolved.len(), 2);
        assert_eq!(resolved.number("PADDING").unwrap(), 40.0);
        assert_eq!(resolved.color("TEXT_COLOR").unwrap(), "#000000");
    }

    #[test]
    fn overrides_replace_defaults_for_declared_ids() {
        let mut overrides = BTreeMap::new();
        overrides.insert("PADDING".to_string(), OptionValue::Number(80.0));
        let resolved = ResolvedOptions::resolve(&schema_a(), &overrides);
        assert_eq!(resolved.number("PADDING").unwrap(), 80.0);
        assert_eq!(resolved.color("TEXT_COLOR").unwrap(), "#000000");
    }

    #[test]
    fn undeclared_override_keys_are_ignored() {
        let mut overrides = BTreeMap::new();
        overrides.insert("GHOST".to_string(), OptionValue::Number(1.0));
        let resolved = ResolvedOptions::resolve(&schema_a(), &overrides);
        assert_eq!(resolved.len(), 2);
        assert!(resolved.get("GHOST").is_none());
    }

    #[test]
    fn wrong_kind_override_falls_back_to_default() {
        let mut overrides = BTreeMap::new();
        overrides.insert("PADDING".to_string(), OptionValue::Text("wide".to_string()));
        let resolved = ResolvedOptions::resolve(&schema_a(), &overrides);
        assert_eq!(resolved.number("PADDING").unwrap(), 40.0);
    }

    #[test]
    fn number_overrides_clamp_into_declared_range() {
        let mut overrides = BTreeMap::new();
        overrides.insert("PADDING".to_string(), OptionValue::Number(9000.0));
        let resolved = ResolvedOptions::resolve(&schema_a(), &overrides);
        assert_eq!(resolved.number("PADDING").unwrap(), 400.0);
    }

    #[test]
    fn unknown_choice_falls_back_to_default() {
        let schema = vec![OptionSchema::choice("POSITION", "bottom", &["top", "bottom"])];
        let mut overrides = BTreeMap::new();
        overrides.insert("POSITION".to_string(), OptionValue::Choice("left".to_string()));
        let resolved = ResolvedOptions::resolve(&schema, &overrides);
        assert_eq!(resolved.choice("POSITION").unwrap(), "bottom");

        overrides.insert("POSITION".to_string(), OptionValue::Choice("top".to_string()));
        let resolved = ResolvedOptions::resolve(&schema, &overrides);
        assert_eq!(resolved.choice("POSITION").unwrap(), "top");
    }

    #[test]
    fn accessor_errors_on_undeclared_id() {
        let resolved = ResolvedOptions::resolve(&schema_a(), &BTreeMap::new());
        assert_eq!(
            resolved.number("NOPE"),
            Err(OptionError::Missing("NOPE".to_string()))
        );
    }

    #[test]
    fn accessor_errors_on_kind_mismatch() {
        let resolved = ResolvedOptions::resolve(&schema_a(), &BTreeMap::new());
        assert!(matches!(
            resolved.text("PADDING"),
            Err(OptionError::Type { expected: "text", found: "number", .. })
        ));
    }

    #[test]
    fn theme_switch_keeps_common_keys_and_drops_the_rest() {
        // Theme A declares {PADDING, TEXT_COLOR}; theme B {TEXT_COLOR, DIVIDER}.
        let mut store = OptionStore::new();
        store.set("PADDING", OptionValue::Number(5.0));
        store.set("TEXT_COLOR", OptionValue::Color("#ff0000".to_string()));

        store.switch_theme(&schema_b());

        // TEXT_COLOR survives (still declared), PADDING is gone.
        assert_eq!(store.overrides().len(), 1);
        let resolved = ResolvedOptions::resolve(&schema_b(), store.overrides());
        assert_eq!(resolved.color("TEXT_COLOR").unwrap(), "#ff0000");
        // DIVIDER takes its default.
        assert_eq!(resolved.text("DIVIDER").unwrap(), "|");
        assert_eq!(resolved.len(), 2);
    }

    #[test]
    fn option_values_round_trip_through_json() {
        let mut store = OptionStore::new();
        store.set("PADDING", OptionValue::Number(64.0));
        store.set("TEXT_COLOR", OptionValue::Color("#aabbcc".to_string()));
        store.set("SHOW_DATE", OptionValue::Flag(true));

        let json = serde_json::to_string(store.overrides()).unwrap();
        let back: BTreeMap<String, OptionValue> = serde_json::from_str(&json).unwrap();
        assert_eq!(&back, store.overrides());
    }
}
