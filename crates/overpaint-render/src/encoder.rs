//! Raster scene encoder.

use crate::text::text_path;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::webp::WebPEncoder;
use image::imageops::{self, FilterType};
use image::{ExtendedColorType, Rgba, RgbaImage};
use kurbo::{Affine, BezPath, Cap, Join, Stroke};
use overpaint_core::image::{ImageFormat, ImageSource};
use overpaint_core::scene::{Background, Frame, SceneEncoder, SceneError, SceneResult, SharedEncoder};
use overpaint_core::shapes::{Shape, ShapeStyle};
use std::sync::Arc;
use thiserror::Error;
use vello_cpu::{Pixmap, RenderContext};

/// Encoding errors.
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("PNG encoding error: {0}")]
    Png(#[from] png::EncodingError),
    #[error("Invalid canvas size: {0}x{1}")]
    InvalidSize(f64, f64),
    #[error("Unrecognized image data")]
    UnknownFormat,
}

impl From<EncodeError> for SceneError {
    fn from(err: EncodeError) -> Self {
        SceneError::Encode(err.to_string())
    }
}

/// Build an [`ImageSource`] from encoded bytes, reading the natural size.
pub fn load_image_source(data: Vec<u8>) -> Result<ImageSource, EncodeError> {
    let format = ImageFormat::from_magic_bytes(&data).ok_or(EncodeError::UnknownFormat)?;
    let decoded = image::load_from_memory(&data)?;
    Ok(ImageSource::new(data, decoded.width(), decoded.height(), format))
}

/// Paints frames with `vello_cpu` and encodes the result.
#[derive(Debug, Clone, Default)]
pub struct RasterEncoder;

impl RasterEncoder {
    pub fn new() -> Self {
        Self
    }

    /// Wrap in a shared handle for attaching to a scene.
    pub fn shared() -> SharedEncoder {
        Arc::new(Self)
    }

    /// Paint a frame into a straight-alpha image the size of the canvas.
    ///
    /// Shapes are rasterized in paint order onto their own layer, which is
    /// then composited over the scaled background.
    pub fn render(&self, frame: &Frame<'_>) -> Result<RgbaImage, EncodeError> {
        let width = frame.size.width.round();
        let height = frame.size.height.round();
        let limit = f64::from(u16::MAX);
        if !(width >= 1.0 && height >= 1.0 && width <= limit && height <= limit) {
            return Err(EncodeError::InvalidSize(frame.size.width, frame.size.height));
        }
        let (width, height) = (width as u16, height as u16);

        let mut ctx = RenderContext::new(width, height);
        for shape in &frame.objects {
            draw_shape(&mut ctx, shape, Affine::IDENTITY);
        }
        ctx.flush();
        let mut pixmap = Pixmap::new(width, height);
        ctx.render_to_pixmap(&mut pixmap);

        let mut canvas = RgbaImage::new(width.into(), height.into());
        if let Some(background) = frame.background {
            draw_background(&mut canvas, background);
        }
        imageops::overlay(&mut canvas, &unpremultiply(&pixmap), 0, 0);
        Ok(canvas)
    }
}

impl SceneEncoder for RasterEncoder {
    fn encode(&self, frame: &Frame<'_>, format: ImageFormat, quality: f32) -> SceneResult<Vec<u8>> {
        let image = self.render(frame)?;
        let bytes = match format {
            ImageFormat::Png => encode_png(&image)?,
            ImageFormat::Jpeg => encode_jpeg(&image, quality)?,
            ImageFormat::Webp => encode_webp(&image)?,
        };
        log::debug!(
            "Encoded {}x{} frame as {} ({} bytes)",
            image.width(),
            image.height(),
            format.mime_type(),
            bytes.len()
        );
        Ok(bytes)
    }
}

fn draw_background(canvas: &mut RgbaImage, background: &Background) {
    let decoded = match image::load_from_memory(&background.image.data) {
        Ok(img) => img.to_rgba8(),
        Err(e) => {
            log::warn!("Failed to decode background image: {}", e);
            return;
        }
    };
    let target_w = (decoded.width() as f64 * background.scale.x).round().max(1.0) as u32;
    let target_h = (decoded.height() as f64 * background.scale.y).round().max(1.0) as u32;
    let scaled = if (target_w, target_h) == decoded.dimensions() {
        decoded
    } else {
        imageops::resize(&decoded, target_w, target_h, FilterType::Triangle)
    };
    imageops::overlay(canvas, &scaled, 0, 0);
}

fn draw_shape(ctx: &mut RenderContext, shape: &Shape, transform: Affine) {
    match shape {
        Shape::Group(group) => {
            let origin = shape.position().to_vec2();
            let scale = group.scale;
            let inner = transform
                * Affine::translate(origin)
                * Affine::scale_non_uniform(scale.x, scale.y)
                * Affine::translate(-origin);
            for child in group.children() {
                draw_shape(ctx, child, inner);
            }
        }
        Shape::Text(text) => {
            let Some(mut path) = text_path(text) else {
                return;
            };
            path.apply_affine(transform);
            ctx.set_paint(text.color().to_color());
            ctx.fill_path(&path);
        }
        _ => {
            let mut path = shape.to_path();
            path.apply_affine(transform);
            paint(ctx, &path, shape.style());
        }
    }
}

fn paint(ctx: &mut RenderContext, path: &BezPath, style: &ShapeStyle) {
    if let Some(fill) = &style.fill_color {
        ctx.set_paint(fill.to_color());
        ctx.fill_path(path);
    }
    if style.stroke_width > 0.0 {
        ctx.set_stroke(
            Stroke::new(style.stroke_width)
                .with_join(Join::Miter)
                .with_caps(Cap::Butt),
        );
        ctx.set_paint(style.stroke_color.to_color());
        ctx.stroke_path(path);
    }
}

/// Convert premultiplied render output to straight alpha.
fn unpremultiply(pixmap: &Pixmap) -> RgbaImage {
    let mut image = RgbaImage::new(pixmap.width().into(), pixmap.height().into());
    for (dst, src) in image.pixels_mut().zip(pixmap.data()) {
        if src.a == 0 {
            continue;
        }
        let a = u32::from(src.a);
        let straight = |c: u8| ((u32::from(c) * 255 + a / 2) / a).min(255) as u8;
        *dst = Rgba([straight(src.r), straight(src.g), straight(src.b), src.a]);
    }
    image
}

fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, EncodeError> {
    let mut buf = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut buf, image.width(), image.height());
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header()?;
        writer.write_image_data(image.as_raw())?;
        writer.finish()?;
    }
    Ok(buf)
}

/// JPEG has no alpha channel, so the frame is flattened over white.
fn encode_jpeg(image: &RgbaImage, quality: f32) -> Result<Vec<u8>, EncodeError> {
    let rgb: Vec<u8> = image
        .as_raw()
        .chunks_exact(4)
        .flat_map(|px| {
            let a = px[3] as f32 / 255.0;
            let over_white = |c: u8| (c as f32 * a + 255.0 * (1.0 - a)).round() as u8;
            [over_white(px[0]), over_white(px[1]), over_white(px[2])]
        })
        .collect();
    let quality = (quality * 100.0).round().clamp(1.0, 100.0) as u8;
    let mut buf = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut buf, quality);
    encoder.encode(&rgb, image.width(), image.height(), ExtendedColorType::Rgb8)?;
    Ok(buf)
}

fn encode_webp(image: &RgbaImage) -> Result<Vec<u8>, EncodeError> {
    let mut buf = Vec::new();
    let encoder = WebPEncoder::new_lossless(&mut buf);
    encoder.encode(image.as_raw(), image.width(), image.height(), ExtendedColorType::Rgba8)?;
    Ok(buf)
}
