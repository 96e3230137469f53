//! Current drawing style.
//!
//! Setters overwrite unconditionally and return the [`StyleChange`] they made,
//! which the editor forwards to the selection controller.

use crate::config::EditorConfig;
use crate::shapes::{CssColor, ShapeStyle};

/// A single field update on [`StyleState`].
#[derive(Debug, Clone, PartialEq)]
pub enum StyleChange {
    StrokeColor(CssColor),
    StrokeWidth(f64),
    FillColor(CssColor),
    TextColor(CssColor),
    FontSize(f64),
}

/// Style applied to new shapes and pushed to selected ones.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleState {
    stroke_color: CssColor,
    stroke_width: f64,
    fill_color: CssColor,
    text_color: CssColor,
    font_size: f64,
}

impl Default for StyleState {
    fn default() -> Self {
        Self::from_config(&EditorConfig::default())
    }
}

impl StyleState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &EditorConfig) -> Self {
        Self {
            stroke_color: CssColor::from(config.stroke_color.as_str()),
            stroke_width: config.stroke_width,
            fill_color: CssColor::from(config.fill_color.as_str()),
            text_color: CssColor::from(config.text_color.as_str()),
            font_size: config.font_size,
        }
    }

    pub fn stroke_color(&self) -> &CssColor {
        &self.stroke_color
    }

    pub fn stroke_width(&self) -> f64 {
        self.stroke_width
    }

    pub fn fill_color(&self) -> &CssColor {
        &self.fill_color
    }

    pub fn text_color(&self) -> &CssColor {
        &self.text_color
    }

    pub fn font_size(&self) -> f64 {
        self.font_size
    }

    pub fn set_stroke_color(&mut self, color: impl Into<CssColor>) -> StyleChange {
        self.stroke_color = color.into();
        StyleChange::StrokeColor(self.stroke_color.clone())
    }

    /// Not validated: zero and negative widths pass through.
    pub fn set_stroke_width(&mut self, width: f64) -> StyleChange {
        self.stroke_width = width;
        StyleChange::StrokeWidth(width)
    }

    pub fn set_fill_color(&mut self, color: impl Into<CssColor>) -> StyleChange {
        self.fill_color = color.into();
        StyleChange::FillColor(self.fill_color.clone())
    }

    pub fn set_text_color(&mut self, color: impl Into<CssColor>) -> StyleChange {
        self.text_color = color.into();
        StyleChange::TextColor(self.text_color.clone())
    }

    pub fn set_font_size(&mut self, size: f64) -> StyleChange {
        self.font_size = size;
        StyleChange::FontSize(size)
    }

    /// Apply a change produced elsewhere, e.g. when replaying a session.
    pub fn apply(&mut self, change: StyleChange) -> StyleChange {
        match change {
            StyleChange::StrokeColor(c) => self.set_stroke_color(c),
            StyleChange::StrokeWidth(w) => self.set_stroke_width(w),
            StyleChange::FillColor(c) => self.set_fill_color(c),
            StyleChange::TextColor(c) => self.set_text_color(c),
            StyleChange::FontSize(s) => self.set_font_size(s),
        }
    }

    /// Shape style for a new non-text shape. Kinds without fill drop it.
    pub fn shape_style(&self, with_fill: bool) -> ShapeStyle {
        ShapeStyle {
            stroke_color: self.stroke_color.clone(),
            stroke_width: self.stroke_width,
            fill_color: with_fill.then(|| self.fill_color.clone()),
        }
    }

    /// Shape style for a new text shape: the text color is its fill.
    pub fn text_style(&self) -> ShapeStyle {
        ShapeStyle {
            stroke_color: self.text_color.clone(),
            stroke_width: 0.0,
            fill_color: Some(self.text_color.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let style = StyleState::new();
        assert_eq!(style.stroke_color().as_str(), "#ff0000");
        assert!((style.stroke_width() - 2.0).abs() < f64::EPSILON);
        assert_eq!(style.text_color().as_str(), "#00ff00");
        assert!((style.font_size() - 17.0).abs() < f64::EPSILON);
        assert_eq!(style.fill_color().as_str(), "#0000ff");
    }

    #[test]
    fn test_setters_report_change() {
        let mut style = StyleState::new();
        assert_eq!(style.set_font_size(24.0), StyleChange::FontSize(24.0));
        assert_eq!(
            style.set_stroke_color("#123456"),
            StyleChange::StrokeColor(CssColor::from("#123456"))
        );
        assert_eq!(style.stroke_color().as_str(), "#123456");
    }

    #[test]
    fn test_no_validation() {
        let mut style = StyleState::new();
        style.set_stroke_width(-3.0);
        style.set_font_size(0.0);
        assert!((style.stroke_width() + 3.0).abs() < f64::EPSILON);
        assert!(style.font_size().abs() < f64::EPSILON);
    }

    #[test]
    fn test_shape_style_fill_rule() {
        let style = StyleState::new();
        assert!(style.shape_style(true).fill_color.is_some());
        assert!(style.shape_style(false).fill_color.is_none());
        assert_eq!(
            style.text_style().fill_color.map(|c| c.as_str().to_string()),
            Some("#00ff00".to_string())
        );
    }
}
