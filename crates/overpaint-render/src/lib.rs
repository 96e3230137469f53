//! Overpaint Render Library
//!
//! A CPU implementation of the scene encoding capability: shapes and text are
//! rasterized with `vello_cpu`, composited over the decoded background, then
//! encoded as PNG, JPEG or WebP.

mod encoder;
mod text;

pub use encoder::{EncodeError, RasterEncoder, load_image_source};
