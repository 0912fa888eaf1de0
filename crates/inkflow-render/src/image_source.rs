//! Base image decoding.

use crate::renderer::{RenderResult, RendererError};
use inkflow_core::surface::BaseImage;

/// Decode PNG, JPEG or WebP bytes into an RGBA8 base image.
pub fn decode_base_image(bytes: &[u8]) -> RenderResult<BaseImage> {
    let decoded = ::image::load_from_memory(bytes)
        .map_err(|e| RendererError::Decode(e.to_string()))?;
    let rgba = decoded.to_rgba8();
    let (width, height) = rgba.dimensions();
    log::debug!("Decoded base image {}x{}", width, height);
    BaseImage::from_rgba8(width, height, rgba.into_raw())
        .ok_or_else(|| RendererError::Decode(format!("empty image {}x{}", width, height)))
}

/// Read and decode a base image file.
pub fn load_base_image(path: &std::path::Path) -> RenderResult<BaseImage> {
    let bytes = std::fs::read(path)
        .map_err(|e| RendererError::Decode(format!("Failed to read {}: {}", path.display(), e)))?;
    decode_base_image(&bytes)
}
