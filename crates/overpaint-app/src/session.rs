//! Session replay: a recorded list of editor operations applied in order.

use crate::{AppConfig, AppError, AppResult};
use kurbo::{Point, Size};
use overpaint_core::layers::LayerId;
use overpaint_core::{Editor, ImageFormat, MemoryScene, SceneEvent, ToolKind};
use overpaint_render::{RasterEncoder, load_image_source};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// One recorded editor operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum SessionStep {
    LoadImage { path: PathBuf },
    ResizeWindow { width: f64 },
    AddLayer,
    RemoveLayer { layer: LayerId },
    MoveLayerUp { index: usize },
    MoveLayerDown { index: usize },
    SetActiveLayer { layer: LayerId },
    SetLayerVisibility { layer: LayerId, visible: bool },
    /// Group or ungroup every object of a layer.
    GroupLayer { layer: LayerId, grouped: bool },
    RequestUngroup { requested: bool },
    StartDrawing { tool: ToolKind },
    CancelDrawing,
    PointerDown { x: f64, y: f64 },
    PointerMove { x: f64, y: f64 },
    PointerUp { x: f64, y: f64 },
    DoubleClick { x: f64, y: f64 },
    SelectAt { x: f64, y: f64 },
    Deselect,
    StrokeColor { color: String },
    StrokeWidth { width: f64 },
    FillColor { color: String },
    TextColor { color: String },
    FontSize { size: f64 },
    KeyDown { key: String },
    Clear,
    /// Format defaults to the path's extension, then PNG.
    Export {
        path: PathBuf,
        #[serde(default)]
        format: Option<ImageFormat>,
    },
}

/// An editor wired to the raster encoder, replaying steps.
///
/// Relative paths resolve against `base_dir`. Until an image is loaded the
/// canvas is a square as wide as the window.
#[derive(Debug)]
pub struct Session {
    editor: Editor<MemoryScene>,
    window_width: f64,
    base_dir: PathBuf,
    exported: Vec<PathBuf>,
}

impl Session {
    pub fn new(config: AppConfig, base_dir: impl Into<PathBuf>) -> Self {
        let width = config.window_width;
        let scene = MemoryScene::new(Size::new(width, width)).with_encoder(RasterEncoder::shared());
        Self {
            editor: Editor::with_config(scene, config.editor),
            window_width: width,
            base_dir: base_dir.into(),
            exported: Vec::new(),
        }
    }

    pub fn editor(&self) -> &Editor<MemoryScene> {
        &self.editor
    }

    /// Paths written by export steps so far.
    pub fn exported(&self) -> &[PathBuf] {
        &self.exported
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    /// Apply one step. Operations on unknown layers or objects are ignored.
    pub fn apply(&mut self, step: SessionStep) -> AppResult<()> {
        log::debug!("Session step: {:?}", step);
        let editor = &mut self.editor;
        match step {
            SessionStep::LoadImage { path } => {
                let data = fs::read(self.resolve(&path))?;
                let source = load_image_source(data)?;
                self.editor.load_image(source, self.window_width);
            }
            SessionStep::ResizeWindow { width } => {
                self.window_width = width;
                editor.resize_window(width);
            }
            SessionStep::AddLayer => {
                editor.add_layer();
            }
            SessionStep::RemoveLayer { layer } => {
                editor.remove_layer(layer);
            }
            SessionStep::MoveLayerUp { index } => {
                editor.move_layer_up(index);
            }
            SessionStep::MoveLayerDown { index } => {
                editor.move_layer_down(index);
            }
            SessionStep::SetActiveLayer { layer } => {
                editor.set_active_layer(layer);
            }
            SessionStep::SetLayerVisibility { layer, visible } => {
                editor.set_layer_visibility(layer, visible);
            }
            SessionStep::GroupLayer { layer, grouped } => {
                let objects = editor
                    .layer_model()
                    .get(layer)
                    .map(|l| l.objects.clone())
                    .unwrap_or_default();
                editor.set_layer_grouped(layer, grouped, &objects);
            }
            SessionStep::RequestUngroup { requested } => editor.request_ungroup(requested),
            SessionStep::StartDrawing { tool } => editor.start_drawing(tool),
            SessionStep::CancelDrawing => editor.cancel_drawing(),
            SessionStep::PointerDown { x, y } => {
                editor.handle_event(SceneEvent::PointerDown(Point::new(x, y)));
            }
            SessionStep::PointerMove { x, y } => {
                editor.handle_event(SceneEvent::PointerMove(Point::new(x, y)));
            }
            SessionStep::PointerUp { x, y } => {
                editor.handle_event(SceneEvent::PointerUp(Point::new(x, y)));
            }
            SessionStep::DoubleClick { x, y } => {
                editor.handle_event(SceneEvent::DoubleClick(Point::new(x, y)));
            }
            SessionStep::SelectAt { x, y } => {
                if editor.select_at(Point::new(x, y)).is_none() {
                    log::warn!("Nothing to select at ({}, {})", x, y);
                }
            }
            SessionStep::Deselect => editor.deselect(),
            SessionStep::StrokeColor { color } => editor.set_stroke_color(color),
            SessionStep::StrokeWidth { width } => editor.set_stroke_width(width),
            SessionStep::FillColor { color } => editor.set_fill_color(color),
            SessionStep::TextColor { color } => editor.set_text_color(color),
            SessionStep::FontSize { size } => editor.set_font_size(size),
            SessionStep::KeyDown { key } => editor.handle_event(SceneEvent::KeyDown(key)),
            SessionStep::Clear => editor.clear_canvas(),
            SessionStep::Export { path, format } => {
                let format = format
                    .or_else(|| {
                        path.extension()
                            .and_then(|ext| ext.to_str())
                            .and_then(ImageFormat::from_extension)
                    })
                    .unwrap_or_default();
                let bytes = self.editor.export_image(format)?;
                let target = self.resolve(&path);
                fs::write(&target, &bytes)?;
                log::info!("Exported {} ({} bytes)", target.display(), bytes.len());
                self.exported.push(target);
            }
        }
        Ok(())
    }
}

/// Parse a JSON list of steps and replay it, returning the exported paths.
pub fn run_session(json: &str, config: AppConfig, base_dir: &Path) -> AppResult<Vec<PathBuf>> {
    let steps: Vec<SessionStep> = serde_json::from_str(json)?;
    if steps.is_empty() {
        return Err(AppError::Usage("session has no steps".to_string()));
    }
    let mut session = Session::new(config, base_dir);
    for step in steps {
        session.apply(step)?;
    }
    Ok(session.exported)
}
