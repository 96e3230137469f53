//! The editor: owns the scene, layers, style, selection and drawing state, and
//! routes scene events and UI operations between them.

use crate::config::EditorConfig;
use crate::export::{self, ExportError};
use crate::image::{ImageFormat, ImageSource, fit_canvas};
use crate::layers::{Layer, LayerId, LayerModel, ops};
use crate::scene::{Background, Cursor, SceneEvent, SceneGraph};
use crate::selection::SelectionController;
use crate::shapes::{CssColor, ShapeId};
use crate::style::{StyleChange, StyleState};
use crate::tools::{DrawContext, DrawState, DrawingController, ToolKind};
use kurbo::{Point, Vec2};

/// Keys that delete the selection.
const DELETE_KEYS: [&str; 2] = ["Delete", "Backspace"];

/// Image editor core over a scene graph `S`.
#[derive(Debug)]
pub struct Editor<S: SceneGraph> {
    scene: S,
    layers: LayerModel,
    style: StyleState,
    selection: SelectionController,
    drawing: DrawingController,
    config: EditorConfig,
    /// Base image at its natural size.
    image: Option<ImageSource>,
    window_width: f64,
}

impl<S: SceneGraph> Editor<S> {
    /// Create an editor with the default configuration.
    pub fn new(scene: S) -> Self {
        Self::with_config(scene, EditorConfig::default())
    }

    pub fn with_config(scene: S, config: EditorConfig) -> Self {
        let window_width = scene.size().width;
        Self {
            scene,
            layers: LayerModel::default(),
            style: StyleState::from_config(&config),
            selection: SelectionController::new(),
            drawing: DrawingController::new(),
            config,
            image: None,
            window_width,
        }
    }

    pub fn scene(&self) -> &S {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut S {
        &mut self.scene
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn image(&self) -> Option<&ImageSource> {
        self.image.as_ref()
    }

    // --- Layers ---

    pub fn layers(&self) -> &[Layer] {
        self.layers.layers()
    }

    pub fn layer_model(&self) -> &LayerModel {
        &self.layers
    }

    pub fn active_layer(&self) -> Option<LayerId> {
        self.layers.active_layer()
    }

    pub fn ungroup_requested(&self) -> bool {
        self.layers.ungroup_requested()
    }

    pub fn add_layer(&mut self) -> LayerId {
        ops::add_layer(&mut self.layers, &mut self.scene)
    }

    pub fn remove_layer(&mut self, id: LayerId) -> bool {
        ops::remove_layer(&mut self.layers, &mut self.scene, id)
    }

    pub fn move_layer_up(&mut self, index: usize) -> bool {
        ops::move_up(&mut self.layers, &mut self.scene, index)
    }

    pub fn move_layer_down(&mut self, index: usize) -> bool {
        ops::move_down(&mut self.layers, &mut self.scene, index)
    }

    pub fn set_active_layer(&mut self, id: LayerId) -> bool {
        self.layers.set_active_layer(id)
    }

    pub fn set_layer_visibility(&mut self, id: LayerId, visible: bool) -> bool {
        ops::set_visibility(&mut self.layers, &mut self.scene, id, visible)
    }

    pub fn set_layer_grouped(&mut self, id: LayerId, grouped: bool, object_ids: &[ShapeId]) -> Vec<ShapeId> {
        ops::set_grouped(&mut self.layers, &mut self.scene, id, grouped, object_ids)
    }

    pub fn set_layers(&mut self, layers: Vec<Layer>) {
        ops::set_layers(&mut self.layers, &mut self.scene, layers);
    }

    pub fn request_ungroup(&mut self, requested: bool) {
        ops::request_ungroup(&mut self.layers, &mut self.scene, requested);
    }

    // --- Drawing ---

    pub fn start_drawing(&mut self, tool: ToolKind) {
        self.with_drawing(|drawing, cx| drawing.start(tool, cx));
    }

    pub fn cancel_drawing(&mut self) {
        self.drawing.cancel(&mut self.scene);
    }

    pub fn is_drawing(&self) -> bool {
        self.drawing.is_drawing()
    }

    pub fn drawing_state(&self) -> &DrawState {
        self.drawing.state()
    }

    fn with_drawing<R>(
        &mut self,
        f: impl FnOnce(&mut DrawingController, &mut DrawContext<'_, S>) -> R,
    ) -> R {
        let mut cx = DrawContext {
            scene: &mut self.scene,
            layers: &mut self.layers,
            style: &self.style,
            config: &self.config,
        };
        f(&mut self.drawing, &mut cx)
    }

    // --- Selection ---

    pub fn selection(&self) -> &[ShapeId] {
        self.selection.selected()
    }

    /// Select shapes in the scene and notify the editor as the scene would.
    pub fn select(&mut self, ids: &[ShapeId]) {
        self.scene.select(ids);
        let selected = self.scene.selection().to_vec();
        self.handle_event(SceneEvent::SelectionChanged(selected));
    }

    /// Select the topmost interactive shape under `point`, if any.
    pub fn select_at(&mut self, point: Point) -> Option<ShapeId> {
        let position = self.scene.pointer_position(point);
        match self.scene.hit_test(position, self.config.hit_tolerance) {
            Some(id) => {
                self.select(&[id]);
                Some(id)
            }
            None => {
                self.deselect();
                None
            }
        }
    }

    pub fn deselect(&mut self) {
        self.scene.discard_selection();
        self.handle_event(SceneEvent::SelectionCleared);
    }

    pub fn remove_selected_objects(&mut self) -> usize {
        self.selection.remove_selected(&mut self.scene, &mut self.layers)
    }

    // --- Style ---

    pub fn style(&self) -> &StyleState {
        &self.style
    }

    pub fn set_stroke_color(&mut self, color: impl Into<CssColor>) {
        let change = self.style.set_stroke_color(color);
        self.style_changed(change);
    }

    pub fn set_stroke_width(&mut self, width: f64) {
        let change = self.style.set_stroke_width(width);
        self.style_changed(change);
    }

    pub fn set_fill_color(&mut self, color: impl Into<CssColor>) {
        let change = self.style.set_fill_color(color);
        self.style_changed(change);
    }

    pub fn set_text_color(&mut self, color: impl Into<CssColor>) {
        let change = self.style.set_text_color(color);
        self.style_changed(change);
    }

    pub fn set_font_size(&mut self, size: f64) {
        let change = self.style.set_font_size(size);
        self.style_changed(change);
    }

    /// Apply a style change and push it onto the selection.
    pub fn apply_style(&mut self, change: StyleChange) {
        let change = self.style.apply(change);
        self.style_changed(change);
    }

    fn style_changed(&mut self, change: StyleChange) {
        self.selection.apply_style_change(&change, &mut self.scene);
    }

    // --- Image and canvas ---

    /// Set a new base image and fit the canvas to `window_width`.
    ///
    /// Drawing is cancelled and the selection cleared. Shapes are kept.
    pub fn load_image(&mut self, source: ImageSource, window_width: f64) {
        self.cancel_drawing();
        self.deselect();
        if source.is_degenerate() {
            log::warn!(
                "Ignoring image with degenerate size {}x{}",
                source.width,
                source.height
            );
            return;
        }
        log::debug!("Loaded {}x{} {} image", source.width, source.height, source.format.extension());
        self.window_width = window_width;
        self.image = Some(source);
        self.refit_canvas();
    }

    /// Refit the canvas after the window width changed.
    pub fn resize_window(&mut self, window_width: f64) {
        self.window_width = window_width;
        if self.image.is_some() {
            self.refit_canvas();
        }
    }

    fn refit_canvas(&mut self) {
        let Some(image) = &self.image else {
            return;
        };
        let natural = image.size();
        let canvas = fit_canvas(self.window_width, natural, self.config.canvas_ratio);
        self.scene.set_size(canvas);
        self.scene.set_background(Some(Background {
            image: image.clone(),
            scale: Vec2::new(canvas.width / natural.width, canvas.height / natural.height),
        }));
        self.scene.render_all();
    }

    /// Remove every shape and reset layers, selection and drawing.
    /// The base image stays.
    pub fn clear_canvas(&mut self) {
        self.drawing.reset();
        self.selection.on_selection_cleared();
        self.scene.discard_selection();
        ops::reset(&mut self.layers, &mut self.scene);
        self.scene.set_cursor(Cursor::Default);
        log::debug!("Canvas cleared");
    }

    // --- Export ---

    /// Encode the composited image at maximum quality.
    pub fn export_image(&self, format: ImageFormat) -> Result<Vec<u8>, ExportError> {
        export::export_image(
            &self.scene,
            self.image.as_ref(),
            format,
            self.config.export_quality,
        )
    }

    // --- Events ---

    /// Route a scene event.
    pub fn handle_event(&mut self, event: SceneEvent) {
        match event {
            SceneEvent::PointerDown(p) => {
                let p = self.scene.pointer_position(p);
                self.with_drawing(|drawing, cx| drawing.pointer_down(p, cx));
            }
            SceneEvent::PointerMove(p) => {
                let p = self.scene.pointer_position(p);
                self.with_drawing(|drawing, cx| drawing.pointer_move(p, cx));
            }
            SceneEvent::PointerUp(p) => {
                let p = self.scene.pointer_position(p);
                self.with_drawing(|drawing, cx| drawing.pointer_up(p, cx));
            }
            SceneEvent::DoubleClick(p) => {
                let p = self.scene.pointer_position(p);
                self.with_drawing(|drawing, cx| drawing.double_click(p, cx));
            }
            SceneEvent::SelectionChanged(ids) => {
                self.selection
                    .on_selection_changed(ids, &self.scene, &mut self.style);
            }
            SceneEvent::SelectionCleared => self.selection.on_selection_cleared(),
            SceneEvent::KeyDown(key) => {
                if DELETE_KEYS.contains(&key.as_str()) {
                    self.remove_selected_objects();
                }
            }
        }
    }
}
