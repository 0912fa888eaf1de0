//! Render surface: composes the base image, committed strokes and the
//! draft into a backend-agnostic scene.

use crate::geometry::Geometry;
use crate::paint::{Compositing, PaintDescriptor};
use crate::stroke::{Draft, Stroke, StrokeId};
use crate::style::ToolMode;
use kurbo::{Point, Size};
use std::sync::Arc;

/// A decoded raster image (straight-alpha RGBA8, row-major).
#[derive(Debug, Clone, PartialEq)]
pub struct BaseImage {
    pub width: u32,
    pub height: u32,
    /// `width * height * 4` bytes.
    pub pixels: Arc<Vec<u8>>,
}

impl BaseImage {
    /// Wrap RGBA8 pixels. Returns `None` if the buffer length does not match.
    pub fn from_rgba8(width: u32, height: u32, pixels: Vec<u8>) -> Option<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)?
            .checked_mul(4)?;
        if pixels.len() != expected || width == 0 || height == 0 {
            return None;
        }
        Some(Self {
            width,
            height,
            pixels: Arc::new(pixels),
        })
    }

    pub fn size(&self) -> Size {
        Size::new(self.width as f64, self.height as f64)
    }
}

/// One stroke in the scene with its paint already resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneItem {
    /// `None` for the draft.
    pub stroke_id: Option<StrokeId>,
    pub geometry: Geometry,
    pub paint: PaintDescriptor,
}

impl SceneItem {
    pub fn is_draft(&self) -> bool {
        self.stroke_id.is_none()
    }
}

/// The grouped ink layer: committed strokes in commit order, then the draft.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StrokeLayer {
    /// `Clear` iff the active tool erases.
    pub compositing: Compositing,
    pub items: Vec<SceneItem>,
}

/// Circle previewing the eraser extent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EraserCursor {
    pub center: Point,
    pub radius: f64,
}

/// Everything a renderer needs to draw one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub size: Size,
    pub base: Option<BaseImage>,
    pub layer: StrokeLayer,
    pub cursor: Option<EraserCursor>,
}

impl Scene {
    /// Integer pixel dimensions, at least 1×1.
    pub fn pixel_size(&self) -> (u32, u32) {
        let dim = |v: f64| if v.is_finite() { v.ceil().max(1.0) as u32 } else { 1 };
        (dim(self.size.width), dim(self.size.height))
    }

    /// The same scene without the cursor overlay.
    pub fn without_cursor(mut self) -> Self {
        self.cursor = None;
        self
    }
}

/// Surface state that is not part of the stroke history.
#[derive(Debug, Clone)]
pub struct RenderSurface {
    base: Option<BaseImage>,
    fallback_size: Size,
    pointer: Option<Point>,
    show_eraser_cursor: bool,
}

impl RenderSurface {
    pub fn new(fallback_size: Size, show_eraser_cursor: bool) -> Self {
        Self {
            base: None,
            fallback_size,
            pointer: None,
            show_eraser_cursor,
        }
    }

    pub fn set_base_image(&mut self, base: Option<BaseImage>) {
        self.base = base;
    }

    pub fn base_image(&self) -> Option<&BaseImage> {
        self.base.as_ref()
    }

    /// Size used when there is no base image.
    pub fn set_fallback_size(&mut self, size: Size) {
        self.fallback_size = size;
    }

    /// Base image size, else the fallback size.
    pub fn size(&self) -> Size {
        self.base.as_ref().map_or(self.fallback_size, BaseImage::size)
    }

    /// Record the last known pointer position (`None` once released).
    pub fn set_pointer(&mut self, pointer: Option<Point>) {
        self.pointer = pointer;
    }

    pub fn pointer(&self) -> Option<Point> {
        self.pointer
    }

    pub fn set_show_eraser_cursor(&mut self, show: bool) {
        self.show_eraser_cursor = show;
    }

    /// Compose a scene.
    ///
    /// Each committed stroke keeps the paint of the mode it was drawn with;
    /// only the layer flag and the cursor follow `active_mode`.
    pub fn compose(
        &self,
        committed: &[Stroke],
        draft: Option<&Draft>,
        active_mode: ToolMode,
        brush_width: f64,
    ) -> Scene {
        let mut items: Vec<SceneItem> = committed
            .iter()
            .map(|stroke| SceneItem {
                stroke_id: Some(stroke.id()),
                geometry: stroke.geometry().clone(),
                paint: stroke.paint(),
            })
            .collect();
        if let Some(draft) = draft {
            items.push(SceneItem {
                stroke_id: None,
                geometry: draft.geometry().clone(),
                paint: draft.paint(),
            });
        }

        let compositing = if active_mode.is_erase() {
            Compositing::Clear
        } else {
            Compositing::SourceOver
        };

        let cursor = match (self.pointer, draft) {
            (Some(center), Some(_)) if self.show_eraser_cursor && active_mode.is_erase() => {
                Some(EraserCursor {
                    center,
                    radius: brush_width,
                })
            }
            _ => None,
        };

        Scene {
            size: self.size(),
            base: self.base.clone(),
            layer: StrokeLayer { compositing, items },
            cursor,
        }
    }
}
