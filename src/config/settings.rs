//! Configuration structures for deserialisation.
//!
//! These structures map directly to the JSON configuration file format.

use serde::Deserialize;

use crate::board::shape::DEFAULT_UNWRAP_LIMIT;
use crate::board::{PadOptions, ParseOptions, ShapeOptions, SourceFormat};
use crate::error::ConfigError;
use crate::geometry::roundrect::DEFAULT_ARC_SEGMENTS;
use crate::geometry::touch::DEFAULT_LINE_RECT_MARGIN;
use crate::geometry::TouchRules;

/// Root configuration structure.
///
/// This is the top-level structure that matches the JSON config file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Optional JSON schema reference (ignored during parsing).
    #[serde(rename = "$schema", default)]
    _schema: Option<String>,

    /// Optional comment field (ignored during parsing).
    #[serde(rename = "_comment", default)]
    _comment: Option<String>,

    /// Document format of the host.
    #[serde(default)]
    pub format: FormatSetting,

    /// Editor version string, used when `format` is `auto`.
    #[serde(default)]
    pub editor_version: Option<String>,

    /// Reconstruction settings.
    #[serde(default)]
    pub engine: EngineConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any validation checks fail.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.engine.validate()?;

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.to_ascii_lowercase().as_str()) {
            return Err(ConfigError::ValidationError {
                message: format!(
                    "Invalid log level '{}'. Must be one of: {}",
                    self.logging.level,
                    valid_levels.join(", ")
                ),
            });
        }
        Ok(())
    }

    /// Resolves the document format.
    ///
    /// An explicit `legacy`/`keyed` setting wins. With `auto`, the editor
    /// version decides; without a readable version the current format is
    /// assumed.
    #[must_use]
    pub fn source_format(&self) -> SourceFormat {
        match self.format {
            FormatSetting::Legacy => SourceFormat::Legacy,
            FormatSetting::Keyed => SourceFormat::Keyed,
            FormatSetting::Auto => self
                .editor_version
                .as_deref()
                .and_then(SourceFormat::from_editor_version)
                .unwrap_or_default(),
        }
    }
}

/// Document format selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FormatSetting {
    /// Detect from the editor version.
    #[default]
    Auto,
    /// Force the legacy format.
    Legacy,
    /// Force the keyed format.
    Keyed,
}

/// Reconstruction engine configuration.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// Spatial grid cell size, in board units.
    #[serde(default = "default_grid_size")]
    pub grid_size: f64,

    /// Padding added to every bounding box before bucketing.
    /// Must be at least `line_rect_margin`.
    #[serde(default = "default_grid_padding")]
    pub grid_padding: f64,

    /// Segments per rounded corner when expanding rectangles.
    #[serde(default = "default_arc_segments")]
    pub arc_segments: u32,

    /// Extra reach of a track into a rectangular pad.
    #[serde(default = "default_line_rect_margin")]
    pub line_rect_margin: f64,

    /// Wrapper layers peeled from a polygon payload before giving up.
    #[serde(default = "default_unwrap_limit")]
    pub unwrap_limit: usize,

    /// Model pads at arbitrary rotations exactly instead of as squares.
    #[serde(default)]
    pub exact_rotated_pads: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            grid_size: default_grid_size(),
            grid_padding: default_grid_padding(),
            arc_segments: default_arc_segments(),
            line_rect_margin: default_line_rect_margin(),
            unwrap_limit: default_unwrap_limit(),
            exact_rotated_pads: false,
        }
    }
}

impl EngineConfig {
    /// Validates engine settings.
    ///
    /// # Errors
    ///
    /// Returns an error for non-positive sizes, out-of-range limits, or a
    /// grid padding smaller than the track margin (the grid would miss
    /// touching pairs).
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fail = |message: String| Err(ConfigError::ValidationError { message });

        if !(self.grid_size.is_finite() && self.grid_size > 0.0) {
            return fail(format!("grid_size must be positive, got {}", self.grid_size));
        }
        if !(self.line_rect_margin.is_finite() && self.line_rect_margin >= 0.0) {
            return fail(format!(
                "line_rect_margin must not be negative, got {}",
                self.line_rect_margin
            ));
        }
        if !(self.grid_padding.is_finite() && self.grid_padding >= self.line_rect_margin) {
            return fail(format!(
                "grid_padding ({}) must be at least line_rect_margin ({})",
                self.grid_padding, self.line_rect_margin
            ));
        }
        if !(1..=64).contains(&self.arc_segments) {
            return fail(format!(
                "arc_segments must be between 1 and 64, got {}",
                self.arc_segments
            ));
        }
        if !(1..=32).contains(&self.unwrap_limit) {
            return fail(format!(
                "unwrap_limit must be between 1 and 32, got {}",
                self.unwrap_limit
            ));
        }
        Ok(())
    }

    /// Touching predicate settings.
    #[must_use]
    pub const fn touch_rules(&self) -> TouchRules {
        TouchRules {
            line_rect_margin: self.line_rect_margin,
        }
    }

    /// Polygon payload settings.
    #[must_use]
    pub const fn shape_options(&self) -> ShapeOptions {
        ShapeOptions {
            unwrap_limit: self.unwrap_limit,
            arc_segments: self.arc_segments,
        }
    }

    /// Reader settings for the given format.
    #[must_use]
    pub const fn parse_options(&self, format: SourceFormat) -> ParseOptions {
        ParseOptions {
            format,
            shape: self.shape_options(),
        }
    }

    /// Host pad settings.
    #[must_use]
    pub const fn pad_options(&self) -> PadOptions {
        PadOptions {
            exact_rotated_pads: self.exact_rotated_pads,
            arc_segments: self.arc_segments,
        }
    }
}

const fn default_grid_size() -> f64 {
    150.0
}

const fn default_grid_padding() -> f64 {
    10.0
}

const fn default_arc_segments() -> u32 {
    DEFAULT_ARC_SEGMENTS
}

const fn default_line_rect_margin() -> f64 {
    DEFAULT_LINE_RECT_MARGIN
}

const fn default_unwrap_limit() -> usize {
    DEFAULT_UNWRAP_LIMIT
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_minimal_config() {
        let json = r"{}";
        let config: Config = serde_json::from_str(json).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.format, FormatSetting::Auto);
        assert_eq!(config.source_format(), SourceFormat::Keyed);
    }

    #[test]
    fn parse_full_config() {
        let json = r#"{
            "$schema": "https://json-schema.org/draft/2020-12/schema",
            "_comment": "Test config",
            "format": "auto",
            "editor_version": "2.2.40",
            "engine": {
                "grid_size": 200,
                "grid_padding": 5,
                "arc_segments": 8,
                "line_rect_margin": 0.2,
                "unwrap_limit": 7,
                "exact_rotated_pads": true
            },
            "logging": {
                "level": "debug"
            }
        }"#;

        let config: Config = serde_json::from_str(json).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.source_format(), SourceFormat::Legacy);
        assert!((config.engine.grid_size - 200.0).abs() < f64::EPSILON);
        assert_eq!(config.engine.arc_segments, 8);
        assert_eq!(config.engine.unwrap_limit, 7);
        assert!(config.engine.exact_rotated_pads);
        assert!(config.engine.pad_options().exact_rotated_pads);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn explicit_format_beats_version() {
        let json = r#"{ "format": "keyed", "editor_version": "2.0" }"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.source_format(), SourceFormat::Keyed);
    }

    #[test]
    fn engine_config_defaults() {
        let config = EngineConfig::default();
        assert!((config.grid_size - 150.0).abs() < f64::EPSILON);
        assert!((config.grid_padding - 10.0).abs() < f64::EPSILON);
        assert_eq!(config.arc_segments, 6);
        assert!((config.line_rect_margin - 0.1).abs() < f64::EPSILON);
        assert_eq!(config.unwrap_limit, 5);
        assert!(!config.exact_rotated_pads);
    }

    #[test]
    fn logging_config_defaults() {
        let config = LoggingConfig::default();
        assert_eq!(config.level, "warn");
    }

    #[test]
    fn reject_padding_below_margin() {
        let json = r#"{ "engine": { "grid_padding": 0.05 } }"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn reject_bad_engine_values() {
        for engine in [
            r#"{ "grid_size": 0 }"#,
            r#"{ "arc_segments": 0 }"#,
            r#"{ "unwrap_limit": 100 }"#,
        ] {
            let json = format!(r#"{{ "engine": {engine} }}"#);
            let config: Config = serde_json::from_str(&json).unwrap();
            assert!(config.validate().is_err(), "{engine} should be rejected");
        }
    }

    #[test]
    fn reject_invalid_log_level() {
        let json = r#"{ "logging": { "level": "loud" } }"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn reject_unknown_fields() {
        let json = r#"{
            "unknown_field": "value"
        }"#;

        let result: Result<Config, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }
}
