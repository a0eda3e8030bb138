use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("invalid settings JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// How `operator ==` / `hashCode` are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EqualityMode {
    /// Type-check-and-field-compare `operator ==` plus an `Object.hash` combinator.
    #[default]
    Default,
    /// A `props` list getter for an external Equatable-style mixin.
    Equatable,
}

/// Feature flags consumed by the generators and the diff engine.
///
/// Loaded once per invocation and treated as an immutable snapshot for the
/// duration of one pipeline run. Every field has a serde default so a
/// partial settings file is valid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Equality rendering mode.
    #[serde(default)]
    pub equality_mode: EqualityMode,

    /// Compare collection-typed members structurally instead of by reference.
    #[serde(default)]
    pub deep_equality: bool,

    /// Generate the sentinel-based copyWith interface/implementation pair,
    /// which distinguishes "not provided" from "explicitly set to null".
    #[serde(default)]
    pub accurate_copy_with: bool,

    /// Expose accurate copyWith as a getter instead of a method.
    #[serde(default = "default_true")]
    pub copy_with_getter: bool,

    /// Language feature version. Gates by-name vs by-index enum codecs
    /// (by-name requires >= 2.15).
    #[serde(default = "default_feature_version")]
    pub feature_version: f64,

    /// Column width above which single-line renderings switch to block form.
    #[serde(default = "default_line_width")]
    pub line_width: usize,
}

fn default_true() -> bool {
    true
}

fn default_feature_version() -> f64 {
    2.17
}

fn default_line_width() -> usize {
    78
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            equality_mode: EqualityMode::Default,
            deep_equality: false,
            accurate_copy_with: false,
            copy_with_getter: true,
            feature_version: default_feature_version(),
            line_width: default_line_width(),
        }
    }
}

impl Settings {
    /// Parse a settings snapshot from a JSON document. Missing fields take
    /// their defaults; a partial file is valid.
    pub fn from_json(src: &str) -> Result<Self, SettingsError> {
        Ok(serde_json::from_str(src)?)
    }

    /// Whether the target language level supports `Enum.values.byName`.
    pub fn supports_enum_by_name(&self) -> bool {
        self.feature_version >= 2.15
    }
}
