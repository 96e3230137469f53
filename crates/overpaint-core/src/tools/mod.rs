//! Tool system: the pointer-driven shape drawing state machine.

use crate::config::EditorConfig;
use crate::layers::{LayerModel, ops};
use crate::scene::{Cursor, SceneGraph};
use crate::shapes::{
    Circle, CssColor, Ellipse, Line, Polygon, Rectangle, Shape, ShapeId, ShapeStyle, Text, Triangle,
};
use crate::style::StyleState;
use kurbo::Point;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Fewest points a polygon or polyline is ever committed with.
pub const MIN_POLYGON_POINTS: usize = 3;

/// Drawing tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolKind {
    Line,
    Rectangle,
    Square,
    Circle,
    Ellipse,
    Triangle,
    Polygon,
    Polyline,
    Text,
}

impl ToolKind {
    /// Tools that accumulate clicks and commit on double-click.
    pub fn is_multi_point(self) -> bool {
        matches!(self, ToolKind::Polygon | ToolKind::Polyline)
    }

    /// Create/drag functions for single-gesture tools.
    pub fn builder(self) -> Option<ShapeBuilder> {
        let (create, update_from_drag): (CreateFn, DragFn) = match self {
            ToolKind::Line => (create_line, drag_line),
            ToolKind::Rectangle => (create_rectangle, drag_rectangle),
            ToolKind::Square => (create_square, drag_rectangle),
            ToolKind::Circle => (create_circle, drag_circle),
            ToolKind::Ellipse => (create_ellipse, drag_ellipse),
            ToolKind::Triangle => (create_triangle, drag_triangle),
            ToolKind::Text => (create_text, drag_none),
            ToolKind::Polygon | ToolKind::Polyline => return None,
        };
        Some(ShapeBuilder {
            create,
            update_from_drag,
        })
    }

    /// Commit function for multi-point tools.
    pub fn finalizer(self) -> Option<FinalizeFn> {
        match self {
            ToolKind::Polygon => Some(finalize_polygon),
            ToolKind::Polyline => Some(finalize_polyline),
            _ => None,
        }
    }
}

/// Inputs for creating a draft shape.
pub struct Seed<'a> {
    pub id: ShapeId,
    pub anchor: Point,
    pub style: &'a StyleState,
    pub config: &'a EditorConfig,
}

pub type CreateFn = fn(&Seed<'_>) -> Shape;
pub type DragFn = fn(&mut Shape, Point, Point);
pub type FinalizeFn = fn(Vec<Point>, &StyleState) -> Shape;

/// Per-kind behaviour of a single-gesture tool.
#[derive(Clone, Copy)]
pub struct ShapeBuilder {
    /// Zero-size shape at the anchor.
    pub create: CreateFn,
    /// Recompute geometry from anchor and pointer.
    pub update_from_drag: DragFn,
}

fn create_line(seed: &Seed<'_>) -> Shape {
    let mut line = Line::new(seed.anchor, seed.anchor).with_id(seed.id);
    line.style = seed.style.shape_style(false);
    Shape::Line(line)
}

fn create_rectangle(seed: &Seed<'_>) -> Shape {
    let mut rect = Rectangle::new(seed.anchor, 0.0, 0.0).with_id(seed.id);
    rect.style = seed.style.shape_style(true);
    Shape::Rectangle(rect)
}

fn create_square(seed: &Seed<'_>) -> Shape {
    let mut square = Rectangle::square(seed.anchor, 0.0).with_id(seed.id);
    square.style = seed.style.shape_style(true);
    Shape::Rectangle(square)
}

fn create_circle(seed: &Seed<'_>) -> Shape {
    let mut circle = Circle::new(seed.anchor, 0.0).with_id(seed.id);
    circle.style = seed.style.shape_style(true);
    Shape::Circle(circle)
}

fn create_ellipse(seed: &Seed<'_>) -> Shape {
    let mut ellipse = Ellipse::new(seed.anchor, 0.0, 0.0).with_id(seed.id);
    ellipse.style = seed.style.shape_style(true);
    Shape::Ellipse(ellipse)
}

fn create_triangle(seed: &Seed<'_>) -> Shape {
    let mut triangle = Triangle::new(seed.anchor, 0.0, 0.0).with_id(seed.id);
    triangle.style = seed.style.shape_style(true);
    Shape::Triangle(triangle)
}

fn create_text(seed: &Seed<'_>) -> Shape {
    let mut text = Text::new(seed.anchor, seed.config.text_placeholder.clone())
        .with_id(seed.id)
        .with_font_size(seed.style.font_size());
    text.style = seed.style.text_style();
    Shape::Text(text)
}

fn drag_line(shape: &mut Shape, anchor: Point, pointer: Point) {
    if let Shape::Line(line) = shape {
        line.update_from_drag(anchor, pointer);
    }
}

fn drag_rectangle(shape: &mut Shape, anchor: Point, pointer: Point) {
    if let Shape::Rectangle(rect) = shape {
        rect.update_from_drag(anchor, pointer);
    }
}

fn drag_circle(shape: &mut Shape, anchor: Point, pointer: Point) {
    if let Shape::Circle(circle) = shape {
        circle.update_from_drag(anchor, pointer);
    }
}

fn drag_ellipse(shape: &mut Shape, anchor: Point, pointer: Point) {
    if let Shape::Ellipse(ellipse) = shape {
        ellipse.update_from_drag(anchor, pointer);
    }
}

fn drag_triangle(shape: &mut Shape, anchor: Point, pointer: Point) {
    if let Shape::Triangle(triangle) = shape {
        triangle.update_from_drag(anchor, pointer);
    }
}

/// Text keeps its size while dragged.
fn drag_none(_shape: &mut Shape, _anchor: Point, _pointer: Point) {}

fn finalize_polygon(points: Vec<Point>, style: &StyleState) -> Shape {
    let mut polygon = Polygon::closed(points);
    polygon.style = style.shape_style(true);
    Shape::Polygon(polygon)
}

fn finalize_polyline(points: Vec<Point>, style: &StyleState) -> Shape {
    let mut polyline = Polygon::open(points);
    polyline.style = style.shape_style(true);
    Shape::Polygon(polyline)
}

/// The shape being dragged out.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Draft {
    pub id: ShapeId,
    pub anchor: Point,
}

/// Drawing state. Only one tool is ever active.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum DrawState {
    #[default]
    Idle,
    Drawing {
        tool: ToolKind,
        draft: Option<Draft>,
    },
    MultiPointDrawing {
        tool: ToolKind,
        points: Vec<Point>,
        guide: Option<ShapeId>,
    },
}

/// Everything a drawing transition may touch.
pub struct DrawContext<'a, S: SceneGraph> {
    pub scene: &'a mut S,
    pub layers: &'a mut LayerModel,
    pub style: &'a StyleState,
    pub config: &'a EditorConfig,
}

/// Owns the [`DrawState`] and runs its transitions.
#[derive(Debug, Clone, Default)]
pub struct DrawingController {
    state: DrawState,
}

impl DrawingController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &DrawState {
        &self.state
    }

    pub fn is_drawing(&self) -> bool {
        !matches!(self.state, DrawState::Idle)
    }

    /// The tool in use, if any.
    pub fn tool(&self) -> Option<ToolKind> {
        match &self.state {
            DrawState::Idle => None,
            DrawState::Drawing { tool, .. } | DrawState::MultiPointDrawing { tool, .. } => Some(*tool),
        }
    }

    /// Arm `tool`. An unfinished multi-point draw is abandoned first.
    pub fn start<S: SceneGraph>(&mut self, tool: ToolKind, cx: &mut DrawContext<'_, S>) {
        self.remove_guide(cx.scene);
        ops::request_ungroup(cx.layers, cx.scene, true);
        cx.scene.set_all_interactive(false);
        cx.scene.set_cursor(Cursor::Crosshair);
        self.state = if tool.is_multi_point() {
            DrawState::MultiPointDrawing {
                tool,
                points: Vec::new(),
                guide: None,
            }
        } else {
            DrawState::Drawing { tool, draft: None }
        };
        log::debug!("Started drawing {tool:?}");
    }

    pub fn pointer_down<S: SceneGraph>(&mut self, point: Point, cx: &mut DrawContext<'_, S>) {
        match &mut self.state {
            DrawState::Idle => {}
            DrawState::Drawing { tool, draft } => {
                if draft.is_some() {
                    return;
                }
                let Some(builder) = tool.builder() else {
                    return;
                };
                let seed = Seed {
                    id: Uuid::new_v4(),
                    anchor: point,
                    style: cx.style,
                    config: cx.config,
                };
                let id = cx.scene.add_object((builder.create)(&seed));
                *draft = Some(Draft { id, anchor: point });
                ops::append_object(cx.layers, cx.scene, id);
            }
            DrawState::MultiPointDrawing { points, guide, .. } => {
                points.push(point);
                match guide {
                    Some(id) => set_guide_points(cx.scene, *id, points.clone()),
                    None => *guide = Some(add_guide(cx.scene, cx.config, points.clone())),
                }
                cx.scene.render_all();
            }
        }
    }

    pub fn pointer_move<S: SceneGraph>(&mut self, point: Point, cx: &mut DrawContext<'_, S>) {
        match &self.state {
            DrawState::Idle => return,
            DrawState::Drawing { tool, draft } => {
                let (Some(draft), Some(builder)) = (draft, tool.builder()) else {
                    return;
                };
                if let Some(shape) = cx.scene.get_mut(draft.id) {
                    (builder.update_from_drag)(shape, draft.anchor, point);
                }
            }
            DrawState::MultiPointDrawing { points, guide, .. } => {
                let Some(id) = guide else {
                    return;
                };
                let mut preview = points.clone();
                preview.push(point);
                set_guide_points(cx.scene, *id, preview);
            }
        }
        cx.scene.render_all();
    }

    /// Finish a single-gesture draw. The draft is already committed.
    pub fn pointer_up<S: SceneGraph>(&mut self, _point: Point, cx: &mut DrawContext<'_, S>) {
        if !matches!(self.state, DrawState::Drawing { .. }) {
            return;
        }
        ops::request_ungroup(cx.layers, cx.scene, false);
        self.finish(cx.scene);
    }

    /// Commit the accumulated points. Returns the new shape id.
    pub fn double_click<S: SceneGraph>(
        &mut self,
        _point: Point,
        cx: &mut DrawContext<'_, S>,
    ) -> Option<ShapeId> {
        let DrawState::MultiPointDrawing { tool, points, .. } = &mut self.state else {
            return None;
        };
        if points.len() < cx.config.min_polygon_points.max(MIN_POLYGON_POINTS) {
            return None;
        }
        let finalize = tool.finalizer()?;
        let shape = finalize(std::mem::take(points), cx.style);
        let id = cx.scene.add_object(shape);
        ops::append_object(cx.layers, cx.scene, id);
        self.remove_guide(cx.scene);
        ops::request_ungroup(cx.layers, cx.scene, false);
        self.finish(cx.scene);
        log::debug!("Committed multi-point shape {id}");
        Some(id)
    }

    /// Abandon the current draw, removing any guide.
    pub fn cancel<S: SceneGraph>(&mut self, scene: &mut S) {
        if !self.is_drawing() {
            return;
        }
        self.remove_guide(scene);
        self.finish(scene);
    }

    /// Forget the state without touching the scene, e.g. after it was cleared.
    pub fn reset(&mut self) {
        self.state = DrawState::Idle;
    }

    fn finish<S: SceneGraph>(&mut self, scene: &mut S) {
        scene.set_all_interactive(true);
        scene.set_cursor(Cursor::Default);
        self.state = DrawState::Idle;
    }

    fn remove_guide<S: SceneGraph>(&mut self, scene: &mut S) {
        if let DrawState::MultiPointDrawing { guide, .. } = &mut self.state {
            if let Some(id) = guide.take() {
                scene.remove_object(id);
            }
        }
    }
}

fn add_guide<S: SceneGraph>(scene: &mut S, config: &EditorConfig, points: Vec<Point>) -> ShapeId {
    let mut guide = Polygon::open(points);
    guide.style = ShapeStyle {
        stroke_color: CssColor::from(config.guide_color.as_str()),
        stroke_width: config.guide_width,
        fill_color: None,
    };
    let id = scene.add_object(Shape::Polygon(guide));
    scene.set_interactive(id, false);
    id
}

fn set_guide_points<S: SceneGraph>(scene: &mut S, id: ShapeId, points: Vec<Point>) {
    if let Some(Shape::Polygon(guide)) = scene.get_mut(id) {
        guide.points = points;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::MemoryScene;
    use crate::shapes::ShapeKind;
    use kurbo::Size;

    struct Fixture {
        scene: MemoryScene,
        layers: LayerModel,
        style: StyleState,
        config: EditorConfig,
        drawing: DrawingController,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                scene: MemoryScene::new(Size::new(800.0, 600.0)),
                layers: LayerModel::new(),
                style: StyleState::new(),
                config: EditorConfig::default(),
                drawing: DrawingController::new(),
            }
        }

        fn run(&mut self, f: impl FnOnce(&mut DrawingController, &mut DrawContext<'_, MemoryScene>)) {
            let mut cx = DrawContext {
                scene: &mut self.scene,
                layers: &mut self.layers,
                style: &self.style,
                config: &self.config,
            };
            f(&mut self.drawing, &mut cx);
        }

        fn drag(&mut self, tool: ToolKind, from: Point, to: Point) -> ShapeId {
            self.run(|d, cx| {
                d.start(tool, cx);
                d.pointer_down(from, cx);
                d.pointer_move(to, cx);
                d.pointer_up(to, cx);
            });
            *self.scene.objects().last().expect("a shape was drawn")
        }
    }

    #[test]
    fn test_rectangle_negative_drag_normalizes() {
        let mut fx = Fixture::new();
        let id = fx.drag(ToolKind::Rectangle, Point::new(100.0, 100.0), Point::new(50.0, 60.0));
        let Some(Shape::Rectangle(rect)) = fx.scene.get(id) else {
            panic!("expected rectangle");
        };
        assert_eq!(rect.position, Point::new(50.0, 60.0));
        assert!((rect.width - 50.0).abs() < f64::EPSILON);
        assert!((rect.height - 40.0).abs() < f64::EPSILON);
        assert_eq!(fx.layers.get(1).map(|l| l.objects.clone()), Some(vec![id]));
    }

    #[test]
    fn test_square_uses_horizontal_delta() {
        let mut fx = Fixture::new();
        let id = fx.drag(ToolKind::Square, Point::new(100.0, 100.0), Point::new(130.0, 170.0));
        assert_eq!(fx.scene.get(id).map(Shape::kind), Some(ShapeKind::Square));
        let Some(Shape::Rectangle(square)) = fx.scene.get(id) else {
            panic!("expected square");
        };
        assert!((square.width - 30.0).abs() < f64::EPSILON);
        assert!((square.height - 30.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_circle_radius_from_anchor() {
        let mut fx = Fixture::new();
        let id = fx.drag(ToolKind::Circle, Point::new(0.0, 0.0), Point::new(30.0, 40.0));
        let Some(Shape::Circle(circle)) = fx.scene.get(id) else {
            panic!("expected circle");
        };
        assert!((circle.radius - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_new_shape_takes_current_style() {
        let mut fx = Fixture::new();
        fx.style.set_stroke_width(7.0);
        let line = fx.drag(ToolKind::Line, Point::ZERO, Point::new(10.0, 0.0));
        let ellipse = fx.drag(ToolKind::Ellipse, Point::ZERO, Point::new(10.0, 5.0));
        let line = fx.scene.get(line).map(|s| s.style().clone());
        let ellipse = fx.scene.get(ellipse).map(|s| s.style().clone());
        assert_eq!(line.as_ref().map(|s| s.stroke_width), Some(7.0));
        assert_eq!(line.and_then(|s| s.fill_color), None);
        assert_eq!(
            ellipse.and_then(|s| s.fill_color).map(|c| c.as_str().to_string()),
            Some("#0000ff".to_string())
        );
    }

    #[test]
    fn test_text_created_with_placeholder() {
        let mut fx = Fixture::new();
        fx.style.set_font_size(30.0);
        let id = fx.drag(ToolKind::Text, Point::new(5.0, 5.0), Point::new(100.0, 100.0));
        let text = fx.scene.get(id).and_then(Shape::as_text).cloned();
        let text = text.expect("text shape");
        assert_eq!(text.content, "Your text here");
        assert!((text.font_size - 30.0).abs() < f64::EPSILON);
        assert_eq!(text.position, Point::new(5.0, 5.0));
        assert_eq!(text.color().as_str(), "#00ff00");
    }

    #[test]
    fn test_lock_and_unlock() {
        let mut fx = Fixture::new();
        let first = fx.drag(ToolKind::Rectangle, Point::ZERO, Point::new(10.0, 10.0));
        fx.run(|d, cx| d.start(ToolKind::Rectangle, cx));
        assert!(!fx.scene.is_interactive(first));
        assert_eq!(fx.scene.cursor(), Cursor::Crosshair);
        assert!(fx.drawing.is_drawing());
        fx.run(|d, cx| {
            d.pointer_down(Point::new(20.0, 20.0), cx);
            d.pointer_up(Point::new(20.0, 20.0), cx);
        });
        assert!(fx.scene.is_interactive(first));
        assert_eq!(fx.scene.cursor(), Cursor::Default);
        assert!(!fx.drawing.is_drawing());
        assert!(!fx.layers.ungroup_requested());
    }

    #[test]
    fn test_moves_repaint() {
        let mut fx = Fixture::new();
        fx.run(|d, cx| {
            d.start(ToolKind::Line, cx);
            d.pointer_down(Point::ZERO, cx);
        });
        let before = fx.scene.render_count();
        fx.run(|d, cx| d.pointer_move(Point::new(3.0, 3.0), cx));
        assert_eq!(fx.scene.render_count(), before + 1);
    }

    #[test]
    fn test_polygon_commit() {
        let mut fx = Fixture::new();
        fx.run(|d, cx| {
            d.start(ToolKind::Polygon, cx);
            d.pointer_down(Point::new(0.0, 0.0), cx);
            d.pointer_down(Point::new(50.0, 0.0), cx);
        });
        // Guide only, not registered in a layer.
        assert_eq!(fx.scene.len(), 1);
        let guide = fx.scene.objects()[0];
        assert!(!fx.scene.is_interactive(guide));
        assert!(fx.layers.layer_of(guide).is_none());

        let mut committed = None;
        fx.run(|d, cx| {
            assert!(d.double_click(Point::new(50.0, 0.0), cx).is_none());
            d.pointer_move(Point::new(25.0, 40.0), cx);
            d.pointer_down(Point::new(25.0, 40.0), cx);
            committed = d.double_click(Point::new(25.0, 40.0), cx);
        });
        let id = committed.expect("polygon committed");
        assert!(!fx.scene.contains(guide));
        assert_eq!(fx.scene.objects(), vec![id]);
        assert_eq!(fx.scene.get(id).map(Shape::kind), Some(ShapeKind::Polygon));
        assert_eq!(fx.layers.get(1).map(|l| l.objects.clone()), Some(vec![id]));
        assert!(!fx.drawing.is_drawing());
    }

    #[test]
    fn test_low_configured_minimum_still_needs_three_points() {
        for minimum in [0, 1, 2] {
            let mut fx = Fixture::new();
            fx.config.min_polygon_points = minimum;
            let mut early = None;
            let mut committed = None;
            fx.run(|d, cx| {
                d.start(ToolKind::Polygon, cx);
                d.pointer_down(Point::new(0.0, 0.0), cx);
                early = d.double_click(Point::new(0.0, 0.0), cx);
                d.pointer_down(Point::new(10.0, 0.0), cx);
                early = early.or(d.double_click(Point::new(10.0, 0.0), cx));
                d.pointer_down(Point::new(10.0, 10.0), cx);
                committed = d.double_click(Point::new(10.0, 10.0), cx);
            });
            assert!(early.is_none());
            let id = committed.expect("polygon committed at three points");
            let Some(Shape::Polygon(polygon)) = fx.scene.get(id) else {
                panic!("expected polygon");
            };
            assert_eq!(polygon.points.len(), 3);
        }
    }

    #[test]
    fn test_polyline_is_open() {
        let mut fx = Fixture::new();
        let mut committed = None;
        fx.run(|d, cx| {
            d.start(ToolKind::Polyline, cx);
            for p in [Point::new(0.0, 0.0), Point::new(10.0, 0.0), Point::new(10.0, 10.0)] {
                d.pointer_down(p, cx);
            }
            committed = d.double_click(Point::new(10.0, 10.0), cx);
        });
        let id = committed.expect("polyline committed");
        assert_eq!(fx.scene.get(id).map(Shape::kind), Some(ShapeKind::Polyline));
    }

    #[test]
    fn test_switching_tools_removes_guide() {
        let mut fx = Fixture::new();
        fx.run(|d, cx| {
            d.start(ToolKind::Polyline, cx);
            d.pointer_down(Point::new(0.0, 0.0), cx);
            d.pointer_down(Point::new(10.0, 0.0), cx);
            d.start(ToolKind::Rectangle, cx);
        });
        assert!(fx.scene.is_empty());
        assert_eq!(fx.drawing.tool(), Some(ToolKind::Rectangle));
    }

    #[test]
    fn test_cancel() {
        let mut fx = Fixture::new();
        fx.run(|d, cx| {
            d.start(ToolKind::Polygon, cx);
            d.pointer_down(Point::new(0.0, 0.0), cx);
        });
        fx.drawing.cancel(&mut fx.scene);
        assert!(fx.scene.is_empty());
        assert!(!fx.drawing.is_drawing());
        assert_eq!(fx.scene.cursor(), Cursor::Default);
    }

    #[test]
    fn test_dispatch_table_covers_all_tools() {
        for tool in [
            ToolKind::Line,
            ToolKind::Rectangle,
            ToolKind::Square,
            ToolKind::Circle,
            ToolKind::Ellipse,
            ToolKind::Triangle,
            ToolKind::Polygon,
            ToolKind::Polyline,
            ToolKind::Text,
        ] {
            assert!(tool.builder().is_some() != tool.finalizer().is_some());
        }
    }
}
