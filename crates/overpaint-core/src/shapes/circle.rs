//! Circle shape.

use super::rectangle::unit_scale;
use super::{ShapeId, ShapeKind, ShapeStyle, ShapeTrait};
use kurbo::{BezPath, Circle as KurboCircle, Point, Shape as KurboShape, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A circle anchored at the top-left corner of its bounding box.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Circle {
    pub(crate) id: ShapeId,
    /// Top-left corner of the bounding box.
    pub position: Point,
    pub radius: f64,
    #[serde(default = "unit_scale")]
    pub scale: Vec2,
    pub style: ShapeStyle,
}

impl Circle {
    pub fn new(position: Point, radius: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            position,
            radius,
            scale: unit_scale(),
            style: ShapeStyle::default(),
        }
    }

    pub fn with_id(mut self, id: ShapeId) -> Self {
        self.id = id;
        self
    }

    /// Radius follows the Euclidean distance from the anchor.
    pub fn update_from_drag(&mut self, anchor: Point, pointer: Point) {
        self.radius = (pointer - anchor).hypot();
    }

    pub fn center(&self) -> Point {
        self.position + Vec2::new(self.radius, self.radius)
    }
}

impl ShapeTrait for Circle {
    fn id(&self) -> ShapeId {
        self.id
    }

    fn kind(&self) -> ShapeKind {
        ShapeKind::Circle
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

    fn local_path(&self) -> BezPath {
        KurboCircle::new(self.center(), self.radius.abs()).to_path(0.1)
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
    fn test_radius_is_euclidean() {
        let anchor = Point::new(10.0, 10.0);
        let mut circle = Circle::new(anchor, 0.0);
        circle.update_from_drag(anchor, Point::new(13.0, 14.0));
        assert!((circle.radius - 5.0).abs() < f64::EPSILON);
        assert_eq!(circle.position, anchor);
    }

    #[test]
    fn test_bounds_from_top_left() {
        let circle = Circle::new(Point::new(0.0, 0.0), 10.0);
        let bounds = circle.bounds();
        assert!(bounds.x0.abs() < 1e-6);
        assert!((bounds.x1 - 20.0).abs() < 1e-6);
    }
}
