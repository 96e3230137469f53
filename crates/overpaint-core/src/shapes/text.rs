//! Text shape.

use super::rectangle::unit_scale;
use super::{CssColor, ShapeId, ShapeKind, ShapeStyle, ShapeTrait};
use kurbo::{BezPath, Point, Rect, Shape as KurboShape, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Average glyph advance as a fraction of the font size.
const CHAR_WIDTH_FACTOR: f64 = 0.55;
/// Line height as a multiple of the font size.
const LINE_HEIGHT: f64 = 1.2;

/// A text label. The text color lives in `style.fill_color`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Text {
    pub(crate) id: ShapeId,
    /// Top-left corner of the text box.
    pub position: Point,
    pub content: String,
    pub font_size: f64,
    #[serde(default = "unit_scale")]
    pub scale: Vec2,
    pub style: ShapeStyle,
}

impl Text {
    pub fn new(position: Point, content: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            position,
            content,
            font_size: 17.0,
            scale: unit_scale(),
            style: ShapeStyle::default(),
        }
    }

    pub fn with_id(mut self, id: ShapeId) -> Self {
        self.id = id;
        self
    }

    pub fn with_font_size(mut self, size: f64) -> Self {
        self.font_size = size;
        self
    }

    /// Set the text color.
    pub fn with_color(mut self, color: CssColor) -> Self {
        self.style.fill_color = Some(color);
        self
    }

    /// Current text color, falling back to the stroke color.
    pub fn color(&self) -> &CssColor {
        self.style.fill_color.as_ref().unwrap_or(&self.style.stroke_color)
    }

    /// Approximate size from character count and line count.
    fn approximate_size(&self) -> (f64, f64) {
        let widest = self
            .content
            .lines()
            .map(|line| line.chars().count())
            .max()
            .unwrap_or(0);
        let mut lines = self.content.lines().count().max(1);
        if self.content.ends_with('\n') {
            lines += 1;
        }
        let size = self.font_size.abs();
        (
            widest as f64 * size * CHAR_WIDTH_FACTOR,
            lines as f64 * size * LINE_HEIGHT,
        )
    }
}

impl ShapeTrait for Text {
    fn id(&self) -> ShapeId {
        self.id
    }

    fn kind(&self) -> ShapeKind {
        ShapeKind::Text
    }

    fn position(&self) -> Point {
        self.position
    }

    fn set_position(&mut self, position: Point) {
        self.position = position;
    }

    fn scale(&self) -> Vec2 {
        self.scale
    }

    fn set_scale(&mut self, scale: Vec2) {
        self.scale = scale;
    }

    /// The text box outline.
    fn local_path(&self) -> BezPath {
        let (w, h) = self.approximate_size();
        Rect::from_origin_size(self.position, (w, h)).to_path(0.1)
    }

    fn style(&self) -> &ShapeStyle {
        &self.style
    }

    fn style_mut(&mut self) -> &mut ShapeStyle {
        &mut self.style
    }
}
