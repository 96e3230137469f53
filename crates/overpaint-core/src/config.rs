//! Editor configuration.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Tunables for the editor. Missing fields fall back to their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Initial stroke color.
    pub stroke_color: String,
    /// Initial stroke width.
    pub stroke_width: f64,
    /// Initial fill color.
    pub fill_color: String,
    /// Initial text color.
    pub text_color: String,
    /// Initial font size.
    pub font_size: f64,
    /// Content of freshly created text shapes.
    pub text_placeholder: String,
    /// Stroke color of the multi-point guide.
    pub guide_color: String,
    /// Stroke width of the multi-point guide.
    pub guide_width: f64,
    /// Fraction of the window width available to the canvas.
    pub canvas_ratio: f64,
    /// Encoder quality in `0.0..=1.0`.
    pub export_quality: f32,
    /// Points needed before a polygon or polyline can be committed. Values
    /// below 3 are treated as 3.
    pub min_polygon_points: usize,
    /// Pointer slop for hit-testing, in canvas pixels.
    pub hit_tolerance: f64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            stroke_color: "#ff0000".to_string(),
            stroke_width: 2.0,
            fill_color: "#0000ff".to_string(),
            text_color: "#00ff00".to_string(),
            font_size: 17.0,
            text_placeholder: "Your text here".to_string(),
            guide_color: "#000000".to_string(),
            guide_width: 2.0,
            canvas_ratio: 0.8,
            export_quality: 1.0,
            min_polygon_points: 3,
            hit_tolerance: 4.0,
        }
    }
}

impl EditorConfig {
    /// Parse a config from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
