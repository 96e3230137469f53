//! Selection mirror and the style push/pull rules between it and [`StyleState`].

use crate::layers::{LayerModel, ops};
use crate::scene::SceneGraph;
use crate::shapes::{Shape, ShapeId, ShapeKind};
use crate::style::{StyleChange, StyleState};

/// Tracks the scene's selection and keeps selected shapes in step with the style.
#[derive(Debug, Clone, Default)]
pub struct SelectionController {
    selected: Vec<ShapeId>,
}

impl SelectionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> &[ShapeId] {
        &self.selected
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Mirror a new scene selection and pull style from its first shape.
    ///
    /// Text pulls font size and text color. Other shapes pull stroke width,
    /// stroke color and, when they have one, fill color. Groups pull nothing.
    pub fn on_selection_changed<S: SceneGraph>(
        &mut self,
        ids: Vec<ShapeId>,
        scene: &S,
        style: &mut StyleState,
    ) {
        self.selected = ids;
        let Some(first) = self.selected.first().and_then(|id| scene.get(*id)) else {
            return;
        };
        match first {
            Shape::Text(text) => {
                style.set_font_size(text.font_size);
                style.set_text_color(text.color().clone());
            }
            Shape::Group(_) => {}
            shape => {
                let shape_style = shape.style();
                style.set_stroke_width(shape_style.stroke_width);
                style.set_stroke_color(shape_style.stroke_color.clone());
                if let Some(fill) = &shape_style.fill_color {
                    style.set_fill_color(fill.clone());
                }
            }
        }
        log::debug!("Selection changed: {} shapes", self.selected.len());
    }

    pub fn on_selection_cleared(&mut self) {
        self.selected.clear();
    }

    /// Push a style change onto every selected shape.
    pub fn apply_style_change<S: SceneGraph>(&self, change: &StyleChange, scene: &mut S) {
        if self.selected.is_empty() {
            return;
        }
        for id in &self.selected {
            if let Some(shape) = scene.get_mut(*id) {
                push_style(shape, change);
            }
        }
        scene.render_all();
    }

    /// Delete every selected shape, pruning it from its layer.
    ///
    /// Returns the number of shapes that were selected.
    pub fn remove_selected<S: SceneGraph>(&mut self, scene: &mut S, layers: &mut LayerModel) -> usize {
        if self.selected.is_empty() {
            return 0;
        }
        let ids = std::mem::take(&mut self.selected);
        ops::remove_objects(layers, scene, &ids);
        scene.discard_selection();
        log::debug!("Removed {} selected shapes", ids.len());
        ids.len()
    }
}

fn push_style(shape: &mut Shape, change: &StyleChange) {
    match shape {
        Shape::Text(text) => match change {
            StyleChange::TextColor(color) => text.style.fill_color = Some(color.clone()),
            StyleChange::FontSize(size) => text.font_size = *size,
            _ => {}
        },
        Shape::Group(group) => {
            for child in &mut group.children {
                push_style(child, change);
            }
        }
        shape => {
            let is_line = shape.kind() == ShapeKind::Line;
            let style = shape.style_mut();
            match change {
                StyleChange::StrokeColor(color) => style.stroke_color = color.clone(),
                StyleChange::StrokeWidth(width) => style.stroke_width = *width,
                StyleChange::FillColor(color) if !is_line => style.fill_color = Some(color.clone()),
                _ => {}
            }
        }
    }
}
