//! In-memory scene graph.

use super::{Background, Cursor, Frame, SceneError, SceneGraph, SceneResult, SharedEncoder};
use crate::image::ImageFormat;
use crate::shapes::{Group, Shape, ShapeId};
use kurbo::{Point, Size};
use std::fmt;

/// An object as held by the scene.
#[derive(Debug, Clone)]
struct SceneObject {
    shape: Shape,
    visible: bool,
    interactive: bool,
}

/// Retained-mode scene stored in a `Vec` in paint order.
#[derive(Clone)]
pub struct MemoryScene {
    objects: Vec<SceneObject>,
    selection: Vec<ShapeId>,
    cursor: Cursor,
    size: Size,
    background: Option<Background>,
    encoder: Option<SharedEncoder>,
    render_count: u64,
}

impl fmt::Debug for MemoryScene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryScene")
            .field("objects", &self.objects.len())
            .field("selection", &self.selection)
            .field("cursor", &self.cursor)
            .field("size", &self.size)
            .field("background", &self.background.is_some())
            .field("encoder", &self.encoder.is_some())
            .finish()
    }
}

impl MemoryScene {
    /// Create an empty scene with no encoder attached.
    pub fn new(size: Size) -> Self {
        Self {
            objects: Vec::new(),
            selection: Vec::new(),
            cursor: Cursor::default(),
            size,
            background: None,
            encoder: None,
            render_count: 0,
        }
    }

    /// Attach the encoder used by [`SceneGraph::to_encoded_image`].
    pub fn with_encoder(mut self, encoder: SharedEncoder) -> Self {
        self.encoder = Some(encoder);
        self
    }

    /// Number of repaint requests so far.
    pub fn render_count(&self) -> u64 {
        self.render_count
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Snapshot of the visible objects for encoding.
    pub fn frame(&self) -> Frame<'_> {
        Frame {
            size: self.size,
            background: self.background.as_ref(),
            objects: self
                .objects
                .iter()
                .filter(|o| o.visible)
                .map(|o| &o.shape)
                .collect(),
        }
    }

    fn index_of(&self, id: ShapeId) -> Option<usize> {
        self.objects.iter().position(|o| o.shape.id() == id)
    }

    fn object_mut(&mut self, id: ShapeId) -> Option<&mut SceneObject> {
        self.objects.iter_mut().find(|o| o.shape.id() == id)
    }
}

impl SceneGraph for MemoryScene {
    fn add_object(&mut self, shape: Shape) -> ShapeId {
        let id = shape.id();
        self.objects.push(SceneObject {
            shape,
            visible: true,
            interactive: true,
        });
        id
    }

    fn remove_object(&mut self, id: ShapeId) -> Option<Shape> {
        let index = self.index_of(id)?;
        self.selection.retain(|s| *s != id);
        Some(self.objects.remove(index).shape)
    }

    fn objects(&self) -> Vec<ShapeId> {
        self.objects.iter().map(|o| o.shape.id()).collect()
    }

    fn get(&self, id: ShapeId) -> Option<&Shape> {
        self.objects.iter().find(|o| o.shape.id() == id).map(|o| &o.shape)
    }

    fn get_mut(&mut self, id: ShapeId) -> Option<&mut Shape> {
        self.object_mut(id).map(|o| &mut o.shape)
    }

    fn move_to_index(&mut self, id: ShapeId, index: usize) {
        let Some(from) = self.index_of(id) else {
            return;
        };
        let object = self.objects.remove(from);
        let to = index.min(self.objects.len());
        self.objects.insert(to, object);
    }

    fn set_visible(&mut self, id: ShapeId, visible: bool) {
        if let Some(o) = self.object_mut(id) {
            o.visible = visible;
        }
    }

    fn is_visible(&self, id: ShapeId) -> bool {
        self.objects
            .iter()
            .any(|o| o.shape.id() == id && o.visible)
    }

    fn set_interactive(&mut self, id: ShapeId, interactive: bool) {
        if let Some(o) = self.object_mut(id) {
            o.interactive = interactive;
        }
    }

    fn is_interactive(&self, id: ShapeId) -> bool {
        self.objects
            .iter()
            .any(|o| o.shape.id() == id && o.interactive)
    }

    fn group(&mut self, ids: &[ShapeId]) -> Option<ShapeId> {
        let mut children = Vec::new();
        // The group is hidden only when every member was.
        let mut visible = false;
        for id in ids {
            visible |= self.is_visible(*id);
            if let Some(shape) = self.remove_object(*id) {
                children.push(shape);
            }
        }
        if children.is_empty() {
            return None;
        }
        let group = Group::new(children);
        let group_id = self.add_object(Shape::Group(group));
        if !visible {
            self.set_visible(group_id, false);
        }
        self.render_all();
        Some(group_id)
    }

    fn ungroup(&mut self, id: ShapeId) -> Option<Vec<ShapeId>> {
        let index = self.index_of(id)?;
        if !self.objects[index].shape.is_group() {
            return None;
        }
        let object = self.objects.remove(index);
        self.selection.retain(|s| *s != id);
        let Shape::Group(group) = object.shape else {
            return None;
        };
        let children = group.release();
        let ids = children.iter().map(Shape::id).collect();
        for (offset, child) in children.into_iter().enumerate() {
            self.objects.insert(
                index + offset,
                SceneObject {
                    shape: child,
                    visible: object.visible,
                    interactive: object.interactive,
                },
            );
        }
        self.render_all();
        Some(ids)
    }

    fn pointer_position(&self, event: Point) -> Point {
        event
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> Option<ShapeId> {
        self.objects
            .iter()
            .rev()
            .filter(|o| o.visible && o.interactive)
            .find(|o| o.shape.hit_test(point, tolerance))
            .map(|o| o.shape.id())
    }

    fn select(&mut self, ids: &[ShapeId]) {
        self.selection = ids
            .iter()
            .copied()
            .filter(|id| self.objects.iter().any(|o| o.shape.id() == *id))
            .collect();
    }

    fn selection(&self) -> &[ShapeId] {
        &self.selection
    }

    fn discard_selection(&mut self) {
        self.selection.clear();
    }

    fn set_cursor(&mut self, cursor: Cursor) {
        self.cursor = cursor;
    }

    fn cursor(&self) -> Cursor {
        self.cursor
    }

    fn size(&self) -> Size {
        self.size
    }

    fn set_size(&mut self, size: Size) {
        self.size = size;
    }

    fn set_background(&mut self, background: Option<Background>) {
        self.background = background;
    }

    fn background(&self) -> Option<&Background> {
        self.background.as_ref()
    }

    fn render_all(&mut self) {
        self.render_count += 1;
    }

    fn to_encoded_image(&self, format: ImageFormat, quality: f32) -> SceneResult<Vec<u8>> {
        let encoder = self.encoder.as_ref().ok_or(SceneError::EncoderUnavailable)?;
        encoder.encode(&self.frame(), format, quality)
    }

    fn offscreen(&self, size: Size) -> Self {
        let mut scene = Self::new(size);
        scene.encoder = self.encoder.clone();
        scene
    }
}
