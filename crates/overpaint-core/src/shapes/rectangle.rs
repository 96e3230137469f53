//! Rectangle and square shapes.

use super::{ShapeId, ShapeKind, ShapeStyle, ShapeTrait};
use kurbo::{BezPath, Point, Rect, Shape as KurboShape, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An axis-aligned rectangle. Squares are rectangles that keep both sides equal while dragged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rectangle {
    pub(crate) id: ShapeId,
    /// Top-left corner position.
    pub position: Point,
    /// Width of the rectangle.
    pub width: f64,
    /// Height of the rectangle.
    pub height: f64,
    /// Square constraint.
    #[serde(default)]
    pub square: bool,
    #[serde(default = "unit_scale")]
    pub scale: Vec2,
    /// Style properties.
    pub style: ShapeStyle,
}

pub(crate) fn unit_scale() -> Vec2 {
    Vec2::new(1.0, 1.0)
}

impl Rectangle {
    /// Create a new rectangle.
    pub fn new(position: Point, width: f64, height: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            position,
            width,
            height,
            square: false,
            scale: unit_scale(),
            style: ShapeStyle::default(),
        }
    }

    /// Create a square with the given side length.
    pub fn square(position: Point, side: f64) -> Self {
        Self {
            square: true,
            ..Self::new(position, side, side)
        }
    }

    /// Create a rectangle with a caller-allocated ID.
    pub fn with_id(mut self, id: ShapeId) -> Self {
        self.id = id;
        self
    }

    /// Recompute geometry from a drag between `anchor` and `pointer`.
    ///
    /// Extents are never negative: the corner moves toward negative deltas.
    /// Squares take the horizontal delta for both sides.
    pub fn update_from_drag(&mut self, anchor: Point, pointer: Point) {
        let dx = pointer.x - anchor.x;
        let dy = pointer.y - anchor.y;
        if self.square {
            let side = dx.abs();
            self.width = side;
            self.height = side;
            self.position.x = if dx < 0.0 { anchor.x - side } else { anchor.x };
            self.position.y = if dy < 0.0 { anchor.y - side } else { anchor.y };
        } else {
            self.width = dx.abs();
            self.height = dy.abs();
            self.position = Point::new(anchor.x.min(pointer.x), anchor.y.min(pointer.y));
        }
    }

    /// Get the unscaled rectangle as a kurbo Rect.
    pub fn as_rect(&self) -> Rect {
        Rect::new(
            self.position.x,
            self.position.y,
            self.position.x + self.width,
            self.position.y + self.height,
        )
    }
}

impl ShapeTrait for Rectangle {
    fn id(&self) -> ShapeId {
        self.id
    }

    fn kind(&self) -> ShapeKind {
        if self.square {
            ShapeKind::Square
        } else {
            ShapeKind::Rectangle
        }
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
        self.as_rect().to_path(0.1)
    }

    fn style(&self) -> &ShapeStyle {
        &self.style
    }

    fn style_mut(&mut self) -> &mut ShapeStyle {
        &mut self.style
    }
}
