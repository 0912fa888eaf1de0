//! Image export: rasterizer and sink contracts.
//!
//! Export is the only fallible, asynchronous engine operation. A
//! [`Rasterizer`] flattens a [`Scene`] into an encoded image and an
//! [`ExportSink`] persists it. Failures are returned to the caller and
//! never touch the stroke history.

mod memory;

#[cfg(not(target_arch = "wasm32"))]
mod file;

pub use memory::MemorySink;

#[cfg(not(target_arch = "wasm32"))]
pub use file::FileSink;

use crate::surface::Scene;
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Export errors.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Rasterizer unavailable")]
    RasterizerUnavailable,
    #[error("Rasterization failed: {0}")]
    Rasterize(String),
    #[error("Encoding failed: {0}")]
    Encode(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Sink error: {0}")]
    Sink(String),
}

/// Result type for export operations.
pub type ExportResult<T> = Result<T, ExportError>;

/// Boxed future for async operations (compatible with WASM).
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Encoded image formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageFormat {
    #[default]
    Png,
}

impl ImageFormat {
    /// File extension without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
        }
    }
}

/// An encoded raster image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    pub format: ImageFormat,
    pub width: u32,
    pub height: u32,
    pub bytes: Vec<u8>,
}

/// Flattens a scene into an encoded image.
pub trait Rasterizer {
    fn rasterize(&self, scene: &Scene) -> ExportResult<EncodedImage>;
}

/// Rasterizer standing in for a missing backend; always fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableRasterizer;

impl Rasterizer for UnavailableRasterizer {
    fn rasterize(&self, _scene: &Scene) -> ExportResult<EncodedImage> {
        Err(ExportError::RasterizerUnavailable)
    }
}

/// Trait for export destinations.
///
/// Implementations can write to memory, the filesystem or a platform
/// media library.
#[cfg(not(target_arch = "wasm32"))]
pub trait ExportSink: Send + Sync {
    /// Persist `image` under `destination`.
    fn write(&self, destination: &str, image: &EncodedImage) -> BoxFuture<'_, ExportResult<()>>;
}

/// Trait for export destinations (WASM version without Send + Sync).
#[cfg(target_arch = "wasm32")]
pub trait ExportSink {
    /// Persist `image` under `destination`.
    fn write(&self, destination: &str, image: &EncodedImage) -> BoxFuture<'_, ExportResult<()>>;
}

/// Rasterize `scene` and hand the result to `sink`.
pub fn export_scene<'a>(
    scene: Scene,
    rasterizer: &'a dyn Rasterizer,
    sink: &'a dyn ExportSink,
    destination: &'a str,
) -> BoxFuture<'a, ExportResult<EncodedImage>> {
    Box::pin(async move {
        let image = rasterizer.rasterize(&scene)?;
        sink.write(destination, &image).await?;
        Ok(image)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paint::Compositing;
    use crate::surface::StrokeLayer;
    use kurbo::Size;

    struct SolidRasterizer;

    impl Rasterizer for SolidRasterizer {
        fn rasterize(&self, scene: &Scene) -> ExportResult<EncodedImage> {
            let (width, height) = scene.pixel_size();
            Ok(EncodedImage {
                format: ImageFormat::Png,
                width,
                height,
                bytes: vec![1, 2, 3],
            })
        }
    }

    fn scene() -> Scene {
        Scene {
            size: Size::new(4.0, 3.0),
            base: None,
            layer: StrokeLayer {
                compositing: Compositing::SourceOver,
                items: Vec::new(),
            },
            cursor: None,
        }
    }

    #[test]
    fn test_export_scene_writes_to_sink() {
        let sink = MemorySink::new();
        let image = pollster::block_on(export_scene(scene(), &SolidRasterizer, &sink, "out")).unwrap();
        assert_eq!((image.width, image.height), (4, 3));
        assert_eq!(sink.get("out"), Some(image));
    }

    #[test]
    fn test_unavailable_rasterizer_fails() {
        let sink = MemorySink::new();
        let result = pollster::block_on(export_scene(scene(), &UnavailableRasterizer, &sink, "out"));
        assert!(matches!(result, Err(ExportError::RasterizerUnavailable)));
        assert!(sink.is_empty());
    }
}
