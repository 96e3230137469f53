//! Full-resolution export.

use crate::image::{ImageFormat, ImageSource, export_ratio};
use crate::scene::{Background, SceneError, SceneGraph};
use thiserror::Error;

/// Export errors.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Scene error: {0}")]
    Scene(#[from] SceneError),
}

/// Rebuild `scene` at the original image resolution.
///
/// The copy has the original image as a native-size background and every
/// object cloned with position and scale multiplied by image / canvas size.
pub fn composite<S: SceneGraph>(scene: &S, original: &ImageSource) -> S {
    let size = original.size();
    let ratio = export_ratio(size, scene.size());
    let mut offscreen = scene.offscreen(size);
    offscreen.set_background(Some(Background::native(original.clone())));
    for id in scene.objects() {
        let Some(shape) = scene.get(id) else {
            continue;
        };
        let mut clone = shape.clone();
        clone.rescale(ratio);
        let clone_id = offscreen.add_object(clone);
        offscreen.set_visible(clone_id, scene.is_visible(id));
    }
    offscreen.render_all();
    offscreen
}

/// Encode the scene, at the original resolution when a base image is set.
///
/// Without a base image the on-screen scene is encoded as is.
pub fn export_image<S: SceneGraph>(
    scene: &S,
    original: Option<&ImageSource>,
    format: ImageFormat,
    quality: f32,
) -> Result<Vec<u8>, ExportError> {
    let canvas = scene.size();
    match original {
        Some(image) if !image.is_degenerate() && canvas.width > 0.0 && canvas.height > 0.0 => {
            log::debug!(
                "Exporting {}x{} {} from a {}x{} canvas",
                image.width,
                image.height,
                format.extension(),
                canvas.width,
                canvas.height
            );
            let offscreen = composite(scene, image);
            Ok(offscreen.to_encoded_image(format, quality)?)
        }
        _ => Ok(scene.to_encoded_image(format, quality)?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Frame, MemoryScene, SceneEncoder, SceneResult};
    use crate::shapes::{Rectangle, Shape};
    use kurbo::{Point, Size, Vec2};
    use std::sync::Arc;

    /// Encodes the frame size and first object position as text.
    struct DescribeEncoder;

    impl SceneEncoder for DescribeEncoder {
        fn encode(&self, frame: &Frame<'_>, _format: ImageFormat, _quality: f32) -> SceneResult<Vec<u8>> {
            let first = frame.objects.first().map(|s| s.position()).unwrap_or(Point::ZERO);
            Ok(format!(
                "{}x{} bg={} first={},{}",
                frame.size.width,
                frame.size.height,
                frame.background.is_some(),
                first.x,
                first.y
            )
            .into_bytes())
        }
    }

    fn scene_with_rect() -> (MemoryScene, crate::shapes::ShapeId) {
        let mut scene =
            MemoryScene::new(Size::new(400.0, 200.0)).with_encoder(Arc::new(DescribeEncoder));
        let id = scene.add_object(Shape::Rectangle(Rectangle::new(Point::new(10.0, 20.0), 30.0, 40.0)));
        (scene, id)
    }

    #[test]
    fn test_export_without_background_is_unscaled() {
        let (scene, _) = scene_with_rect();
        let bytes = export_image(&scene, None, ImageFormat::Png, 1.0).unwrap();
        assert_eq!(String::from_utf8(bytes).unwrap(), "400x200 bg=false first=10,20");
    }

    #[test]
    fn test_export_with_background_scales_by_ratio() {
        let (mut scene, id) = scene_with_rect();
        let hidden = scene.add_object(Shape::Rectangle(Rectangle::new(Point::ZERO, 1.0, 1.0)));
        scene.set_visible(hidden, false);
        let original = ImageSource::new(vec![0; 4], 2000, 1000, ImageFormat::Png);

        let offscreen = composite(&scene, &original);
        assert_eq!(offscreen.size(), Size::new(2000.0, 1000.0));
        assert_eq!(offscreen.background().map(|b| b.scale), Some(Vec2::new(1.0, 1.0)));
        let objects = offscreen.objects();
        assert_eq!(objects.len(), 2);
        let clone = offscreen.get(objects[0]).unwrap();
        assert_eq!(clone.id(), id);
        assert_eq!(clone.position(), Point::new(50.0, 100.0));
        assert_eq!(clone.scale(), Vec2::new(5.0, 5.0));
        assert!(!offscreen.is_visible(objects[1]));

        // The on-screen scene is untouched.
        assert_eq!(scene.get(id).map(Shape::position), Some(Point::new(10.0, 20.0)));

        let bytes = export_image(&scene, Some(&original), ImageFormat::Jpeg, 1.0).unwrap();
        assert_eq!(String::from_utf8(bytes).unwrap(), "2000x1000 bg=true first=50,100");
    }

    #[test]
    fn test_export_without_encoder_fails() {
        let scene = MemoryScene::new(Size::new(10.0, 10.0));
        assert!(matches!(
            export_image(&scene, None, ImageFormat::Png, 1.0),
            Err(ExportError::Scene(SceneError::EncoderUnavailable))
        ));
    }
}
