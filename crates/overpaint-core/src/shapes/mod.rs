//! Shape definitions for the editor.

mod circle;
mod color;
mod ellipse;
mod group;
mod line;
mod polygon;
mod rectangle;
mod text;
mod triangle;

pub use circle::Circle;
pub use color::{CssColor, Rgba8};
pub use ellipse::Ellipse;
pub use group::Group;
pub use line::Line;
pub use polygon::Polygon;
pub use rectangle::Rectangle;
pub use text::Text;
pub use triangle::Triangle;

use kurbo::{Affine, BezPath, PathEl, Point, Rect, Shape as KurboShape, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for shapes.
pub type ShapeId = Uuid;

/// Geometric kind of a shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Line,
    Rectangle,
    Square,
    Circle,
    Ellipse,
    Triangle,
    Polygon,
    Polyline,
    Text,
    Group,
}

impl ShapeKind {
    /// Lowercase name used in serialized scenes and logs.
    pub fn name(&self) -> &'static str {
        match self {
            ShapeKind::Line => "line",
            ShapeKind::Rectangle => "rectangle",
            ShapeKind::Square => "square",
            ShapeKind::Circle => "circle",
            ShapeKind::Ellipse => "ellipse",
            ShapeKind::Triangle => "triangle",
            ShapeKind::Polygon => "polygon",
            ShapeKind::Polyline => "polyline",
            ShapeKind::Text => "text",
            ShapeKind::Group => "group",
        }
    }

    /// Whether shapes of this kind carry a fill color.
    pub fn has_fill(&self) -> bool {
        !matches!(self, ShapeKind::Line | ShapeKind::Text | ShapeKind::Group)
    }
}

/// Style properties for shapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeStyle {
    /// Stroke color.
    pub stroke_color: CssColor,
    /// Stroke width. Passed through unvalidated.
    pub stroke_width: f64,
    /// Fill color (None = no fill).
    pub fill_color: Option<CssColor>,
}

impl Default for ShapeStyle {
    fn default() -> Self {
        Self {
            stroke_color: CssColor::from("#000000"),
            stroke_width: 2.0,
            fill_color: None,
        }
    }
}

/// Transform that scales around `origin` by `scale`.
pub(crate) fn placement(origin: Point, scale: Vec2) -> Affine {
    Affine::translate(origin.to_vec2())
        * Affine::scale_non_uniform(scale.x, scale.y)
        * Affine::translate(-origin.to_vec2())
}

/// Bounding box of a set of points, or an empty rect at the origin.
pub(crate) fn points_bounds(points: &[Point]) -> Rect {
    let Some(first) = points.first() else {
        return Rect::ZERO;
    };
    points
        .iter()
        .skip(1)
        .fold(Rect::from_points(*first, *first), |r, p| r.union_pt(*p))
}

/// Distance from a point to a line segment (a→b).
pub fn point_to_segment_dist(point: Point, a: Point, b: Point) -> f64 {
    let seg = b - a;
    let pv = point - a;
    let len_sq = seg.hypot2();
    if len_sq < f64::EPSILON {
        return pv.hypot();
    }
    let t = (pv.dot(seg) / len_sq).clamp(0.0, 1.0);
    (point - (a + seg * t)).hypot()
}

/// Common trait for all shapes.
pub trait ShapeTrait {
    /// Get the unique identifier.
    fn id(&self) -> ShapeId;

    /// Geometric kind.
    fn kind(&self) -> ShapeKind;

    /// Anchor position (left/top, or center for ellipses).
    fn position(&self) -> Point;

    /// Move the shape so its anchor sits at `position`.
    fn set_position(&mut self, position: Point);

    /// Per-object scale factor applied around the anchor.
    fn scale(&self) -> Vec2;

    /// Set the per-object scale factor.
    fn set_scale(&mut self, scale: Vec2);

    /// Unscaled outline in world coordinates.
    fn local_path(&self) -> BezPath;

    /// Get the style.
    fn style(&self) -> &ShapeStyle;

    /// Get mutable style.
    fn style_mut(&mut self) -> &mut ShapeStyle;

    /// Path with the per-object scale applied.
    fn to_path(&self) -> BezPath {
        let mut path = self.local_path();
        path.apply_affine(placement(self.position(), self.scale()));
        path
    }

    /// Get the bounding box in world coordinates.
    fn bounds(&self) -> Rect {
        self.to_path().bounding_box()
    }
}

/// Enum wrapper for all shape types.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Shape {
    Line(Line),
    Rectangle(Rectangle),
    Circle(Circle),
    Ellipse(Ellipse),
    Triangle(Triangle),
    Polygon(Polygon),
    Text(Text),
    Group(Group),
}

impl Shape {
    fn inner(&self) -> &dyn ShapeTrait {
        match self {
            Shape::Line(s) => s,
            Shape::Rectangle(s) => s,
            Shape::Circle(s) => s,
            Shape::Ellipse(s) => s,
            Shape::Triangle(s) => s,
            Shape::Polygon(s) => s,
            Shape::Text(s) => s,
            Shape::Group(s) => s,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn ShapeTrait {
        match self {
            Shape::Line(s) => s,
            Shape::Rectangle(s) => s,
            Shape::Circle(s) => s,
            Shape::Ellipse(s) => s,
            Shape::Triangle(s) => s,
            Shape::Polygon(s) => s,
            Shape::Text(s) => s,
            Shape::Group(s) => s,
        }
    }

    pub fn id(&self) -> ShapeId {
        self.inner().id()
    }

    pub fn kind(&self) -> ShapeKind {
        self.inner().kind()
    }

    pub fn position(&self) -> Point {
        self.inner().position()
    }

    pub fn set_position(&mut self, position: Point) {
        self.inner_mut().set_position(position);
    }

    pub fn scale(&self) -> Vec2 {
        self.inner().scale()
    }

    pub fn set_scale(&mut self, scale: Vec2) {
        self.inner_mut().set_scale(scale);
    }

    pub fn bounds(&self) -> Rect {
        self.inner().bounds()
    }

    pub fn to_path(&self) -> BezPath {
        self.inner().to_path()
    }

    pub fn style(&self) -> &ShapeStyle {
        self.inner().style()
    }

    pub fn style_mut(&mut self) -> &mut ShapeStyle {
        self.inner_mut().style_mut()
    }

    /// Multiply position and scale by `factor` on each axis independently.
    pub fn rescale(&mut self, factor: Vec2) {
        let position = self.position();
        let scale = self.scale();
        self.set_position(Point::new(position.x * factor.x, position.y * factor.y));
        self.set_scale(Vec2::new(scale.x * factor.x, scale.y * factor.y));
    }

    /// Check if a point (in world coordinates) hits this shape.
    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        match self {
            Shape::Text(t) => t.bounds().inflate(tolerance, tolerance).contains(point),
            Shape::Group(g) => g.hit_test(point, tolerance),
            _ => {
                let path = self.to_path();
                let filled = self.kind().has_fill() && self.style().fill_color.is_some();
                if filled && path.winding(point) != 0 {
                    return true;
                }
                let reach = tolerance + self.style().stroke_width.abs() / 2.0;
                outline_distance(&path, point) <= reach
            }
        }
    }

    /// Check if this shape is a group.
    pub fn is_group(&self) -> bool {
        matches!(self, Shape::Group(_))
    }

    /// Get the group if this shape is a group.
    pub fn as_group(&self) -> Option<&Group> {
        match self {
            Shape::Group(g) => Some(g),
            _ => None,
        }
    }

    /// Get the text if this shape is text.
    pub fn as_text(&self) -> Option<&Text> {
        match self {
            Shape::Text(t) => Some(t),
            _ => None,
        }
    }

    /// Get the mutable text if this shape is text.
    pub fn as_text_mut(&mut self) -> Option<&mut Text> {
        match self {
            Shape::Text(t) => Some(t),
            _ => None,
        }
    }
}

/// Minimum distance from a point to the flattened outline of a path.
fn outline_distance(path: &BezPath, point: Point) -> f64 {
    let mut best = f64::INFINITY;
    let mut start = Point::ZERO;
    let mut last = Point::ZERO;
    kurbo::flatten(path, 0.25, |el| match el {
        PathEl::MoveTo(p) => {
            start = p;
            last = p;
            best = best.min((point - p).hypot());
        }
        PathEl::LineTo(p) => {
            best = best.min(point_to_segment_dist(point, last, p));
            last = p;
        }
        PathEl::ClosePath => {
            best = best.min(point_to_segment_dist(point, last, start));
            last = start;
        }
        _ => {}
    });
    best
}
