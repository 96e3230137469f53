//! Polygon and polyline shapes built from accumulated points.

use super::rectangle::unit_scale;
use super::{ShapeId, ShapeKind, ShapeStyle, ShapeTrait, points_bounds};
use kurbo::{BezPath, Point, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A multi-point shape. Closed polygons join the last point back to the first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Polygon {
    pub(crate) id: ShapeId,
    /// Vertices in world coordinates.
    pub points: Vec<Point>,
    /// Closed (polygon) or open (polyline).
    pub closed: bool,
    #[serde(default = "unit_scale")]
    pub scale: Vec2,
    pub style: ShapeStyle,
}

impl Polygon {
    /// Create a closed polygon.
    pub fn closed(points: Vec<Point>) -> Self {
        Self::build(points, true)
    }

    /// Create an open polyline.
    pub fn open(points: Vec<Point>) -> Self {
        Self::build(points, false)
    }

    fn build(points: Vec<Point>, closed: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            points,
            closed,
            scale: unit_scale(),
            style: ShapeStyle::default(),
        }
    }

    pub fn with_id(mut self, id: ShapeId) -> Self {
        self.id = id;
        self
    }
}

impl ShapeTrait for Polygon {
    fn id(&self) -> ShapeId {
        self.id
    }

    fn kind(&self) -> ShapeKind {
        if self.closed {
            ShapeKind::Polygon
        } else {
            ShapeKind::Polyline
        }
    }

    /// Top-left of the vertex bounding box.
    fn position(&self) -> Point {
        points_bounds(&self.points).origin()
    }

    fn set_position(&mut self, position: Point) {
        let delta = position - self.position();
        for p in &mut self.points {
            *p += delta;
        }
    }

    fn scale(&self) -> Vec2 {
        self.scale
    }

    fn set_scale(&mut self, scale: Vec2) {
        self.scale = scale;
    }

    fn local_path(&self) -> BezPath {
        let mut path = BezPath::new();
        let Some((first, rest)) = self.points.split_first() else {
            return path;
        };
        path.move_to(*first);
        for p in rest {
            path.line_to(*p);
        }
        if self.closed {
            path.close_path();
        }
        path
    }

    fn style(&self) -> &ShapeStyle {
        &self.style
    }

    fn style_mut(&mut self) -> &mut ShapeStyle {
        &mut self.style
    }
}
