use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::history::MAX_HISTORY;
use crate::style::{self, MAX_BRUSH_SIZE, MIN_BRUSH_SIZE};

/// Largest backing-store side accepted from a config file
pub const MAX_CANVAS_SIDE: u32 = 16_384;

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// What happens to an in-flight shape when the pointer leaves the canvas
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShapeLeave {
    /// Drop the candidate shape; the canvas shows only committed pixels
    #[default]
    Abandon,
    /// Commit the shape at the last position seen inside the canvas
    Finalize,
}

/// Settings for a drawing session and the app around it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)] // missing fields fall back to their defaults
pub struct CanvasConfig {
    /// Backing-store width in device pixels
    pub width: u32,
    /// Backing-store height in device pixels
    pub height: u32,
    pub max_history: usize,
    /// Opacity of the candidate shape while dragging
    pub preview_opacity: f32,
    pub default_colour: String,
    pub default_brush_size: u32,
    pub palette: Vec<String>,
    pub brush_sizes: Vec<u32>,
    pub shape_leave: ShapeLeave,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: 1024,
            height: 640,
            max_history: MAX_HISTORY,
            preview_opacity: 0.7,
            default_colour: "#000000".to_string(),
            default_brush_size: 5,
            palette: ["#1e1e1e", "#b10909", "#10b310", "#1010c3", "#d0b60a", "#e8e8e8"]
                .iter()
                .map(|c| c.to_string())
                .collect(),
            brush_sizes: vec![2, 5, 10, 20],
            shape_leave: ShapeLeave::Abandon,
        }
    }
}

impl CanvasConfig {
    /// Read a JSON config file and validate it
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let json = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> ConfigResult<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn validate(&self) -> ConfigResult<()> {
        let side_range = 1..=MAX_CANVAS_SIDE;
        if !side_range.contains(&self.width) || !side_range.contains(&self.height) {
            return Err(ConfigError::Invalid(format!(
                "canvas size {}x{}",
                self.width, self.height
            )));
        }
        if self.max_history == 0 {
            return Err(ConfigError::Invalid("max_history must be at least 1".into()));
        }
        if !(0.0..=1.0).contains(&self.preview_opacity) {
            return Err(ConfigError::Invalid(format!(
                "preview_opacity {} outside 0..=1",
                self.preview_opacity
            )));
        }
        for colour in self.palette.iter().chain(std::iter::once(&self.default_colour)) {
            style::parse_hex_colour(colour).map_err(|e| ConfigError::Invalid(e.to_string()))?;
        }
        let size_range = MIN_BRUSH_SIZE..=MAX_BRUSH_SIZE;
        if let Some(size) = self
            .brush_sizes
            .iter()
            .chain(std::iter::once(&self.default_brush_size))
            .find(|s| !size_range.contains(*s))
        {
            return Err(ConfigError::Invalid(format!("brush size {} outside {:?}", size, size_range)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = CanvasConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_history, 20);
        assert_eq!(config.palette.len(), 6);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: CanvasConfig =
            serde_json::from_str(r#"{ "width": 800, "height": 600, "shape_leave": "Finalize" }"#).unwrap();
        assert_eq!((config.width, config.height), (800, 600));
        assert_eq!(config.shape_leave, ShapeLeave::Finalize);
        assert_eq!(config.preview_opacity, 0.7);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut config = CanvasConfig::default();
        config.palette.push("red".into());
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = CanvasConfig::default();
        config.brush_sizes.push(40);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_canvas_size_is_bounded() {
        let mut config = CanvasConfig::default();
        config.width = 0;
        assert!(config.validate().is_err());

        config.width = MAX_CANVAS_SIDE;
        config.height = MAX_CANVAS_SIDE;
        assert!(config.validate().is_ok());

        config.width = 70_000;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_save_and_load() {
        let path = std::env::temp_dir().join(format!("doodle_canvas_config_{}.json", std::process::id()));
        let mut config = CanvasConfig::default();
        config.width = 320;
        config.save(&path).unwrap();
        let loaded = CanvasConfig::load(&path).unwrap();
        let _ = fs::remove_file(&path);
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = CanvasConfig::load("/nonexistent/doodle_canvas.json");
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}
