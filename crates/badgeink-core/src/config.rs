//! Editor configuration.

use crate::position::{BadgePosition, ClampBounds, DEFAULT_BADGE_SIZE};
use kurbo::{Point, Rect, Size};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Default export raster width.
pub const DEFAULT_SURFACE_WIDTH: u32 = 800;
/// Default export raster height.
pub const DEFAULT_SURFACE_HEIGHT: u32 = 600;
/// Largest export raster edge accepted, in pixels.
pub const MAX_SURFACE_DIMENSION: u32 = 8192;
/// Placeholder replaced by the subject name in share text.
pub const NAME_PLACEHOLDER: &str = "{name}";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Settings for one badge editor.
///
/// Every field has a default, so a JSON file only needs the keys it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Export raster width in pixels.
    pub surface_width: u32,
    /// Export raster height in pixels.
    pub surface_height: u32,
    /// Badge edge length in pixels. Fixed for the editor's lifetime.
    pub badge_size: u32,
    /// Interval badge coordinates are clamped into.
    pub bounds: ClampBounds,
    /// Where the badge sits before the first drag, clamped into `bounds`.
    #[serde(deserialize_with = "crate::position::deserialize_unbounded")]
    pub initial_position: BadgePosition,
    /// Reference to the badge image.
    pub badge_image: String,
    /// Share sheet text. `{name}` is replaced by the subject name.
    pub share_text: String,
    /// Appended to the subject name for the exported file.
    pub download_suffix: String,
    /// Where the host sends the user when no subject was supplied.
    pub redirect_route: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            surface_width: DEFAULT_SURFACE_WIDTH,
            surface_height: DEFAULT_SURFACE_HEIGHT,
            badge_size: DEFAULT_BADGE_SIZE,
            bounds: ClampBounds::default(),
            initial_position: BadgePosition::default(),
            badge_image: "assets/badge.png".to_string(),
            share_text: "Check out {name}!".to_string(),
            download_suffix: "-badge.png".to_string(),
            redirect_route: "/restaurants".to_string(),
        }
    }
}

impl EditorConfig {
    /// Parse and validate a JSON config.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON config file.
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("Failed to read {}: {}", path.display(), e)))?;
        Self::from_json(&json)
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check that the settings describe a usable editor.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.surface_width == 0 || self.surface_height == 0 {
            return Err(ConfigError::Invalid(format!(
                "surface must be non-empty, got {}x{}",
                self.surface_width, self.surface_height
            )));
        }
        if self.surface_width > MAX_SURFACE_DIMENSION || self.surface_height > MAX_SURFACE_DIMENSION {
            return Err(ConfigError::Invalid(format!(
                "surface may be at most {}x{}, got {}x{}",
                MAX_SURFACE_DIMENSION, MAX_SURFACE_DIMENSION, self.surface_width, self.surface_height
            )));
        }
        if self.badge_size == 0 {
            return Err(ConfigError::Invalid("badge_size must be positive".to_string()));
        }
        let shorter_side = self.surface_width.min(self.surface_height);
        if self.badge_size > shorter_side {
            return Err(ConfigError::Invalid(format!(
                "badge_size {} does not fit a {}x{} surface",
                self.badge_size, self.surface_width, self.surface_height
            )));
        }
        if !self.bounds.is_valid() {
            return Err(ConfigError::Invalid(format!(
                "bounds must satisfy 0 <= min <= max <= 100, got [{}, {}]",
                self.bounds.min, self.bounds.max
            )));
        }
        if self.badge_image.trim().is_empty() {
            return Err(ConfigError::Invalid("badge_image must not be empty".to_string()));
        }
        Ok(())
    }

    /// Export raster size.
    pub fn surface_size(&self) -> Size {
        Size::new(self.surface_width as f64, self.surface_height as f64)
    }

    /// Export raster rectangle with origin at zero.
    pub fn surface_rect(&self) -> Rect {
        Rect::from_origin_size(Point::ZERO, self.surface_size())
    }

    /// Initial position clamped into the configured bounds.
    pub fn start_position(&self) -> BadgePosition {
        self.initial_position.within(&self.bounds)
    }

    /// Share text for a subject name.
    pub fn share_text_for(&self, name: &str) -> String {
        self.share_text.replace(NAME_PLACEHOLDER, name)
    }

    /// Export file name for a subject name, e.g. `"Cafe-badge.png"`.
    pub fn download_filename(&self, base: &str) -> String {
        format!("{}{}", base, self.download_suffix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = EditorConfig::default();
        assert_eq!(config.surface_width, 800);
        assert_eq!(config.surface_height, 600);
        assert_eq!(config.badge_size, 100);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = EditorConfig::from_json(r#"{"badge_image": "logo.png"}"#).unwrap();
        assert_eq!(config.badge_image, "logo.png");
        assert_eq!(config.surface_width, 800);
        assert_eq!(config.download_suffix, "-badge.png");
    }

    #[test]
    fn test_rejects_inverted_bounds() {
        let result = EditorConfig::from_json(r#"{"bounds": {"min": 80.0, "max": 20.0}}"#);
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_rejects_zero_surface() {
        let result = EditorConfig::from_json(r#"{"surface_width": 0}"#);
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_initial_position_uses_configured_bounds() {
        let config = EditorConfig::from_json(
            r#"{"bounds":{"min":0,"max":100},"initial_position":{"x":5,"y":95}}"#,
        )
        .unwrap();
        assert_eq!(config.start_position(), BadgePosition::clamped(5.0, 95.0, &ClampBounds::FULL));

        // Still clamped when the bounds are narrower
        let config = EditorConfig::from_json(r#"{"initial_position":{"x":5,"y":95}}"#).unwrap();
        assert_eq!(config.start_position(), BadgePosition::new(10.0, 90.0));
    }

    #[test]
    fn test_rejects_oversized_surface() {
        let result = EditorConfig::from_json(r#"{"surface_width": 8193}"#);
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
        let config = EditorConfig::from_json(r#"{"surface_width": 8192, "surface_height": 8192}"#);
        assert!(config.is_ok());
    }

    #[test]
    fn test_rejects_badge_larger_than_surface() {
        let result = EditorConfig::from_json(r#"{"surface_height": 90, "badge_size": 100}"#);
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
        let config = EditorConfig::from_json(r#"{"surface_height": 100, "badge_size": 100}"#);
        assert!(config.is_ok());
    }

    #[test]
    fn test_rejects_malformed_json() {
        let result = EditorConfig::from_json("{ not json");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_file_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("editor.json");
        let mut config = EditorConfig::default();
        config.share_text = "Look at {name}".to_string();
        std::fs::write(&path, config.to_json().unwrap()).unwrap();

        let loaded = EditorConfig::from_json_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempdir().unwrap();
        let result = EditorConfig::from_json_file(&dir.path().join("absent.json"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_share_text_and_filename() {
        let config = EditorConfig::default();
        assert_eq!(config.share_text_for("Diner"), "Check out Diner!");
        assert_eq!(config.download_filename("Diner"), "Diner-badge.png");
    }

    #[test]
    fn test_start_position_clamped() {
        let mut config = EditorConfig::default();
        config.bounds = ClampBounds::new(30.0, 40.0).unwrap();
        let pos = config.start_position();
        assert!((pos.x() - 40.0).abs() < f64::EPSILON);
    }
}
