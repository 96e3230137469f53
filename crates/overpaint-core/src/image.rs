//! Base images: encoded bytes with their natural size, and canvas fitting.

use base64::{Engine, engine::general_purpose::STANDARD};
use kurbo::{Size, Vec2};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors decoding an image source.
#[derive(Debug, Error)]
pub enum ImageSourceError {
    #[error("Not a data URL: {0}")]
    NotDataUrl(String),
    #[error("Unsupported image type: {0}")]
    UnsupportedType(String),
    #[error("Invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),
}

/// Encoded image format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    #[default]
    Png,
    Jpeg,
    Webp,
}

impl ImageFormat {
    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Webp => "image/webp",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpeg",
            ImageFormat::Webp => "webp",
        }
    }

    /// Detect format from a file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "png" => Some(ImageFormat::Png),
            "jpg" | "jpeg" => Some(ImageFormat::Jpeg),
            "webp" => Some(ImageFormat::Webp),
            _ => None,
        }
    }

    /// Detect format from magic bytes.
    pub fn from_magic_bytes(data: &[u8]) -> Option<Self> {
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
            return Some(ImageFormat::Png);
        }
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(ImageFormat::Jpeg);
        }
        if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
            return Some(ImageFormat::Webp);
        }
        None
    }
}

/// An encoded image together with its natural dimensions.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageSource {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub format: ImageFormat,
}

impl ImageSource {
    pub fn new(data: Vec<u8>, width: u32, height: u32, format: ImageFormat) -> Self {
        Self {
            data,
            width,
            height,
            format,
        }
    }

    /// Decode a `data:image/<ext>;base64,<payload>` URL.
    ///
    /// Natural dimensions are not part of the URL and must be supplied.
    pub fn from_data_url(url: &str, width: u32, height: u32) -> Result<Self, ImageSourceError> {
        let rest = url
            .strip_prefix("data:")
            .ok_or_else(|| ImageSourceError::NotDataUrl(truncate(url)))?;
        let (header, payload) = rest
            .split_once(',')
            .ok_or_else(|| ImageSourceError::NotDataUrl(truncate(url)))?;
        let mime = header
            .strip_suffix(";base64")
            .ok_or_else(|| ImageSourceError::NotDataUrl(truncate(url)))?;
        let ext = mime.strip_prefix("image/").unwrap_or(mime);
        let format = ImageFormat::from_extension(ext)
            .ok_or_else(|| ImageSourceError::UnsupportedType(mime.to_string()))?;
        let data = STANDARD.decode(payload.trim())?;
        Ok(Self::new(data, width, height, format))
    }

    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.format.mime_type(), STANDARD.encode(&self.data))
    }

    /// Natural size in pixels.
    pub fn size(&self) -> Size {
        Size::new(self.width as f64, self.height as f64)
    }

    /// A source with a zero dimension cannot be laid out.
    pub fn is_degenerate(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

fn truncate(s: &str) -> String {
    s.chars().take(32).collect()
}

/// Canvas size for an image shown in a window of `window_width`.
///
/// The canvas takes at most `ratio` of the window width, never upscales past
/// the image width, and keeps the image aspect ratio.
pub fn fit_canvas(window_width: f64, image: Size, ratio: f64) -> Size {
    let container = window_width * ratio;
    let width = if container > image.width {
        image.width
    } else {
        container
    };
    let aspect = image.width / image.height;
    Size::new(width, width / aspect)
}

/// Per-axis factor mapping canvas coordinates onto image pixels.
pub fn export_ratio(image: Size, canvas: Size) -> Vec2 {
    Vec2::new(image.width / canvas.width, image.height / canvas.height)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_canvas_downscales() {
        let size = fit_canvas(500.0, Size::new(2000.0, 1000.0), 0.8);
        assert!((size.width - 400.0).abs() < 1e-9);
        assert!((size.height - 200.0).abs() < 1e-9);
    }

    #[test]
    fn test_fit_canvas_never_upscales() {
        let size = fit_canvas(1920.0, Size::new(300.0, 150.0), 0.8);
        assert!((size.width - 300.0).abs() < 1e-9);
        assert!((size.height - 150.0).abs() < 1e-9);
    }

    #[test]
    fn test_export_ratio() {
        let ratio = export_ratio(Size::new(2000.0, 1000.0), Size::new(400.0, 200.0));
        assert_eq!(ratio, Vec2::new(5.0, 5.0));
    }

    #[test]
    fn test_data_url() {
        let source = ImageSource::new(vec![1, 2, 3, 4], 2, 1, ImageFormat::Jpeg);
        let url = source.to_data_url();
        assert!(url.starts_with("data:image/jpeg;base64,"));
        let back = ImageSource::from_data_url(&url, 2, 1).unwrap();
        assert_eq!(back, source);
    }

    #[test]
    fn test_data_url_errors() {
        assert!(matches!(
            ImageSource::from_data_url("http://example.com/a.png", 1, 1),
            Err(ImageSourceError::NotDataUrl(_))
        ));
        assert!(matches!(
            ImageSource::from_data_url("data:image/gif;base64,AAAA", 1, 1),
            Err(ImageSourceError::UnsupportedType(_))
        ));
        assert!(matches!(
            ImageSource::from_data_url("data:image/png;base64,@@@", 1, 1),
            Err(ImageSourceError::Base64(_))
        ));
    }

    #[test]
    fn test_magic_bytes() {
        assert_eq!(
            ImageFormat::from_magic_bytes(&[0x89, 0x50, 0x4E, 0x47, 0x0D]),
            Some(ImageFormat::Png)
        );
        assert_eq!(ImageFormat::from_magic_bytes(b"RIFF\0\0\0\0WEBP"), Some(ImageFormat::Webp));
        assert_eq!(ImageFormat::from_magic_bytes(b"GIF8"), None);
    }
}
