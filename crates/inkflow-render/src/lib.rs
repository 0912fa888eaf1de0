//! Inkflow Render Library
//!
//! Renderer abstraction and implementations for Inkflow.
//! The interactive implementation uses Vello for GPU-accelerated rendering;
//! export goes through a tiny-skia CPU rasterizer.

mod image_source;
mod raster;
mod renderer;

#[cfg(feature = "vello-renderer")]
mod vello_impl;

pub use image_source::{decode_base_image, load_base_image};
pub use raster::{encode_png, SkiaRasterizer};
pub use renderer::{RenderContext, RenderResult, Renderer, RendererError};

#[cfg(feature = "vello-renderer")]
pub use vello_impl::VelloRenderer;
