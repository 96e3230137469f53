//! Overpaint Application
//!
//! Drives an [`Editor`](overpaint_core::Editor) from recorded sessions and
//! writes exported images to disk.

mod config;
mod session;

pub use config::AppConfig;
pub use session::{Session, SessionStep, run_session};

use overpaint_core::{ConfigError, ExportError};
use overpaint_render::EncodeError;
use thiserror::Error;

/// Application errors.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid session: {0}")]
    Session(#[from] serde_json::Error),
    #[error("Invalid config: {0}")]
    Config(#[from] ConfigError),
    #[error("Failed to load image: {0}")]
    Image(#[from] EncodeError),
    #[error("Export failed: {0}")]
    Export(#[from] ExportError),
    #[error("Usage: {0}")]
    Usage(String),
}

/// Result type for application operations.
pub type AppResult<T> = Result<T, AppError>;
