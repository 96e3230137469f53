//! Retained-mode scene graph capability.
//!
//! The editor never owns drawable objects directly; it drives a [`SceneGraph`]
//! implementation. [`MemoryScene`] is the in-process implementation, and the
//! pixel side is delegated to a [`SceneEncoder`].

mod memory;

pub use memory::MemoryScene;

use crate::image::{ImageFormat, ImageSource};
use crate::shapes::{Shape, ShapeId};
use kurbo::{Point, Size, Vec2};
use std::sync::Arc;
use thiserror::Error;

/// Scene errors.
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("No encoder attached to the scene")]
    EncoderUnavailable,
    #[error("Encoding failed: {0}")]
    Encode(String),
}

/// Result type for scene operations.
pub type SceneResult<T> = Result<T, SceneError>;

/// Pointer affordance shown over the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cursor {
    #[default]
    Default,
    Crosshair,
}

/// Events the scene raises to the editor.
#[derive(Debug, Clone, PartialEq)]
pub enum SceneEvent {
    PointerDown(Point),
    PointerMove(Point),
    PointerUp(Point),
    DoubleClick(Point),
    SelectionChanged(Vec<ShapeId>),
    SelectionCleared,
    KeyDown(String),
}

/// Background image drawn under every object.
#[derive(Debug, Clone, PartialEq)]
pub struct Background {
    pub image: ImageSource,
    /// Display scale per axis (canvas size / natural size).
    pub scale: Vec2,
}

impl Background {
    /// Background shown at its natural size.
    pub fn native(image: ImageSource) -> Self {
        Self {
            image,
            scale: Vec2::new(1.0, 1.0),
        }
    }
}

/// A read-only snapshot of what should be painted.
pub struct Frame<'a> {
    pub size: Size,
    pub background: Option<&'a Background>,
    /// Visible objects, back to front.
    pub objects: Vec<&'a Shape>,
}

/// Turns a frame into encoded image bytes.
pub trait SceneEncoder: Send + Sync {
    fn encode(&self, frame: &Frame<'_>, format: ImageFormat, quality: f32) -> SceneResult<Vec<u8>>;
}

/// Shared handle to an encoder.
pub type SharedEncoder = Arc<dyn SceneEncoder>;

/// Operations the editor needs from a scene graph.
///
/// Unknown ids are ignored by every operation: mutators become no-ops and
/// queries answer `None` or `false`.
pub trait SceneGraph {
    /// Add an object on top of the paint stack, visible and interactive.
    fn add_object(&mut self, shape: Shape) -> ShapeId;

    /// Remove an object, returning it.
    fn remove_object(&mut self, id: ShapeId) -> Option<Shape>;

    /// All object ids in paint order (back to front).
    fn objects(&self) -> Vec<ShapeId>;

    fn get(&self, id: ShapeId) -> Option<&Shape>;

    fn get_mut(&mut self, id: ShapeId) -> Option<&mut Shape>;

    fn contains(&self, id: ShapeId) -> bool {
        self.get(id).is_some()
    }

    /// Move an object to `index` in the paint stack (clamped to the top).
    fn move_to_index(&mut self, id: ShapeId, index: usize);

    fn set_visible(&mut self, id: ShapeId, visible: bool);

    fn is_visible(&self, id: ShapeId) -> bool;

    /// Selectable and evented together.
    fn set_interactive(&mut self, id: ShapeId, interactive: bool);

    fn is_interactive(&self, id: ShapeId) -> bool;

    /// Replace the found members with one group object. Returns the group id,
    /// or `None` when none of `ids` exist.
    fn group(&mut self, ids: &[ShapeId]) -> Option<ShapeId>;

    /// Dissolve a group, returning its child ids. `None` if `id` is not a group.
    fn ungroup(&mut self, id: ShapeId) -> Option<Vec<ShapeId>>;

    /// Map an event position into canvas coordinates.
    fn pointer_position(&self, event: Point) -> Point;

    /// Topmost visible, interactive object under `point`.
    fn hit_test(&self, point: Point, tolerance: f64) -> Option<ShapeId>;

    fn select(&mut self, ids: &[ShapeId]);

    fn selection(&self) -> &[ShapeId];

    fn discard_selection(&mut self);

    fn set_cursor(&mut self, cursor: Cursor);

    fn cursor(&self) -> Cursor;

    fn size(&self) -> Size;

    fn set_size(&mut self, size: Size);

    fn set_background(&mut self, background: Option<Background>);

    fn background(&self) -> Option<&Background>;

    /// Request a repaint.
    fn render_all(&mut self);

    /// Serialize the scene to an encoded image.
    fn to_encoded_image(&self, format: ImageFormat, quality: f32) -> SceneResult<Vec<u8>>;

    /// An empty scene of the same kind, sharing the encoder.
    fn offscreen(&self, size: Size) -> Self
    where
        Self: Sized;

    /// Lock or unlock every object.
    fn set_all_interactive(&mut self, interactive: bool) {
        for id in self.objects() {
            self.set_interactive(id, interactive);
        }
        self.render_all();
    }
}
