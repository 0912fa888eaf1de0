//! Renderer trait abstraction.

use inkflow_core::surface::Scene;
use kurbo::{Affine, Point, Rect, Size};
use peniko::Color;
use thiserror::Error;

/// Renderer errors.
#[derive(Debug, Error)]
pub enum RendererError {
    #[error("Image decode failed: {0}")]
    Decode(String),
}

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RendererError>;

/// Context for a single render frame.
pub struct RenderContext<'a> {
    /// The composed scene to render.
    pub scene: &'a Scene,
    /// Viewport size in physical pixels.
    pub viewport_size: Size,
    /// Device pixel ratio (for HiDPI).
    pub scale_factor: f64,
    /// Painted under the base image.
    pub background_color: Color,
    /// Stroke color of the eraser cursor outline.
    pub cursor_color: Color,
}

impl<'a> RenderContext<'a> {
    /// Create a new render context.
    pub fn new(scene: &'a Scene, viewport_size: Size) -> Self {
        Self {
            scene,
            viewport_size,
            scale_factor: 1.0,
            background_color: Color::WHITE,
            cursor_color: Color::from_rgba8(100, 100, 100, 200),
        }
    }

    /// Set the scale factor for HiDPI.
    pub fn with_scale_factor(mut self, scale_factor: f64) -> Self {
        self.scale_factor = scale_factor;
        self
    }

    /// Set the background color.
    pub fn with_background(mut self, color: Color) -> Self {
        self.background_color = color;
        self
    }

    pub fn with_cursor_color(mut self, color: Color) -> Self {
        self.cursor_color = color;
        self
    }

    /// Surface-to-device transform.
    pub fn transform(&self) -> Affine {
        Affine::scale(self.scale_factor)
    }

    /// Device-space area cleared to the background color.
    pub fn viewport_rect(&self) -> Rect {
        Rect::from_origin_size(Point::ORIGIN, self.viewport_size)
    }
}

/// Trait for rendering backends.
///
/// Implementations can use Vello, a CPU rasterizer, or other rendering engines.
pub trait Renderer {
    /// Build the scene/command buffer for a frame.
    ///
    /// Called whenever the engine reports a change.
    fn build_scene(&mut self, ctx: &RenderContext);

    /// Get the background color (for clearing).
    fn background_color(&self, ctx: &RenderContext) -> Color {
        ctx.background_color
    }
}
