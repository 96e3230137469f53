//! Group shape for combining multiple shapes.

use super::rectangle::unit_scale;
use super::{Shape, ShapeId, ShapeKind, ShapeStyle, ShapeTrait, placement};
use kurbo::{BezPath, Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A group of shapes manipulated as a single unit.
///
/// The group's position is the top-left of its children's bounds. Its own
/// scale applies on top of each child's scale and is baked into the children
/// when the group is released.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    pub(crate) id: ShapeId,
    /// Child shapes in paint order.
    pub children: Vec<Shape>,
    #[serde(default = "unit_scale")]
    pub scale: Vec2,
    /// Not painted; kept so groups answer style queries like any shape.
    style: ShapeStyle,
}

impl Group {
    /// Create a new group from a list of shapes.
    pub fn new(children: Vec<Shape>) -> Self {
        Self {
            id: Uuid::new_v4(),
            children,
            scale: unit_scale(),
            style: ShapeStyle::default(),
        }
    }

    pub fn with_id(mut self, id: ShapeId) -> Self {
        self.id = id;
        self
    }

    pub fn children(&self) -> &[Shape] {
        &self.children
    }

    /// IDs of the direct children.
    pub fn child_ids(&self) -> Vec<ShapeId> {
        self.children.iter().map(Shape::id).collect()
    }

    /// Dissolve the group, folding its scale into each child.
    pub fn release(self) -> Vec<Shape> {
        let origin = self.position();
        let scale = self.scale;
        self.children
            .into_iter()
            .map(|mut child| {
                let p = child.position();
                let moved = origin + Vec2::new((p.x - origin.x) * scale.x, (p.y - origin.y) * scale.y);
                let s = child.scale();
                child.set_position(moved);
                child.set_scale(Vec2::new(s.x * scale.x, s.y * scale.y));
                child
            })
            .collect()
    }

    /// Hit if any child is hit, with the group scale undone first.
    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        let local = placement(self.position(), self.scale).inverse() * point;
        self.children
            .iter()
            .any(|child| child.hit_test(local, tolerance))
    }

    fn children_bounds(&self) -> Rect {
        let mut iter = self.children.iter().map(Shape::bounds);
        let Some(first) = iter.next() else {
            return Rect::ZERO;
        };
        iter.fold(first, |acc, b| acc.union(b))
    }
}

impl ShapeTrait for Group {
    fn id(&self) -> ShapeId {
        self.id
    }

    fn kind(&self) -> ShapeKind {
        ShapeKind::Group
    }

    fn position(&self) -> Point {
        self.children_bounds().origin()
    }

    fn set_position(&mut self, position: Point) {
        let delta = position - self.position();
        for child in &mut self.children {
            let p = child.position();
            child.set_position(p + delta);
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
        for child in &self.children {
            path.extend(child.to_path());
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::Rectangle;

    fn two_rects() -> Group {
        let rect1 = Rectangle::new(Point::new(0.0, 0.0), 100.0, 50.0);
        let rect2 = Rectangle::new(Point::new(200.0, 200.0), 50.0, 100.0);
        Group::new(vec![Shape::Rectangle(rect1), Shape::Rectangle(rect2)])
    }

    #[test]
    fn test_group_bounds() {
        let bounds = two_rects().bounds();
        assert!(bounds.x0.abs() < 1e-9);
        assert!((bounds.x1 - 250.0).abs() < 1e-9);
        assert!((bounds.y1 - 300.0).abs() < 1e-9);
    }

    #[test]
    fn test_group_hit_test() {
        let group = two_rects();
        assert!(group.hit_test(Point::new(0.0, 25.0), 0.0));
        assert!(group.hit_test(Point::new(225.0, 300.0), 0.0));
        assert!(!group.hit_test(Point::new(150.0, 100.0), 0.0));
    }

    #[test]
    fn test_set_position_translates_children() {
        let mut group = two_rects();
        group.set_position(Point::new(10.0, 10.0));
        assert_eq!(group.children[1].position(), Point::new(210.0, 210.0));
    }

    #[test]
    fn test_release_bakes_scale() {
        let mut group = two_rects();
        group.set_scale(Vec2::new(2.0, 2.0));
        let scaled_bounds = group.bounds();
        let children = group.release();
        let union = children[0].bounds().union(children[1].bounds());
        assert!((union.x1 - scaled_bounds.x1).abs() < 1e-9);
        assert!((union.y1 - scaled_bounds.y1).abs() < 1e-9);
        assert_eq!(children[1].position(), Point::new(400.0, 400.0));
    }
}
