//! Line shape.

use super::rectangle::unit_scale;
use super::{ShapeId, ShapeKind, ShapeStyle, ShapeTrait};
use kurbo::{BezPath, Line as KurboLine, Point, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A straight line segment. Lines never carry a fill.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Line {
    pub(crate) id: ShapeId,
    /// Start point (the anchor).
    pub start: Point,
    /// End point.
    pub end: Point,
    #[serde(default = "unit_scale")]
    pub scale: Vec2,
    /// Style properties.
    pub style: ShapeStyle,
}

impl Line {
    /// Create a new line.
    pub fn new(start: Point, end: Point) -> Self {
        Self {
            id: Uuid::new_v4(),
            start,
            end,
            scale: unit_scale(),
            style: ShapeStyle::default(),
        }
    }

    pub fn with_id(mut self, id: ShapeId) -> Self {
        self.id = id;
        self
    }

    /// The free endpoint follows the pointer.
    pub fn update_from_drag(&mut self, _anchor: Point, pointer: Point) {
        self.end = pointer;
    }

    /// Get the length of the line.
    pub fn length(&self) -> f64 {
        (self.end - self.start).hypot()
    }

    /// Get as a kurbo Line.
    pub fn as_kurbo(&self) -> KurboLine {
        KurboLine::new(self.start, self.end)
    }
}

impl ShapeTrait for Line {
    fn id(&self) -> ShapeId {
        self.id
    }

    fn kind(&self) -> ShapeKind {
        ShapeKind::Line
    }

    fn position(&self) -> Point {
        self.start
    }

    fn set_position(&mut self, position: Point) {
        let delta = position - self.start;
        self.start = position;
        self.end += delta;
    }

    fn scale(&self) -> Vec2 {
        self.scale
    }

    fn set_scale(&mut self, scale: Vec2) {
        self.scale = scale;
    }

    fn local_path(&self) -> BezPath {
        let mut path = BezPath::new();
        path.move_to(self.start);
        path.line_to(self.end);
        path
    }

    fn style(&self) -> &ShapeStyle {
        &self.style
    }

    fn style_mut(&mut self) -> &mut ShapeStyle {
        &mut self.style
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_creation() {
        let line = Line::new(Point::new(0.0, 0.0), Point::new(3.0, 4.0));
        assert!((line.length() - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_drag_moves_end_only() {
        let anchor = Point::new(5.0, 5.0);
        let mut line = Line::new(anchor, anchor);
        line.update_from_drag(anchor, Point::new(40.0, -10.0));
        assert_eq!(line.start, anchor);
        assert_eq!(line.end, Point::new(40.0, -10.0));
    }

    #[test]
    fn test_set_position_translates_both_ends() {
        let mut line = Line::new(Point::new(0.0, 0.0), Point::new(10.0, 0.0));
        line.set_position(Point::new(5.0, 5.0));
        assert_eq!(line.end, Point::new(15.0, 5.0));
    }
}
