//! Overpaint Core Library
//!
//! Shapes, layers, the drawing state machine and the scene graph capability
//! for an editor that draws vector shapes over a base image.

pub mod config;
pub mod editor;
pub mod export;
pub mod image;
pub mod layers;
pub mod scene;
pub mod selection;
pub mod shapes;
pub mod style;
pub mod tools;

pub use config::{ConfigError, EditorConfig};
pub use editor::Editor;
pub use export::ExportError;
pub use image::{ImageFormat, ImageSource, ImageSourceError};
pub use layers::{Layer, LayerId, LayerModel};
pub use scene::{Background, Cursor, Frame, MemoryScene, SceneEncoder, SceneError, SceneEvent, SceneGraph};
pub use selection::SelectionController;
pub use style::{StyleChange, StyleState};
pub use tools::{DrawState, DrawingController, ToolKind};
