//! Vello-based renderer implementation.

use crate::renderer::{RenderContext, Renderer};
use inkflow_core::paint::{stamp_along, Compositing, PaintDescriptor};
use inkflow_core::surface::{BaseImage, EraserCursor, SceneItem};
use kurbo::{Affine, Circle, Point, Rect, Stroke};
use peniko::{BlendMode, Color, Compose, Fill, Mix};
use std::sync::Arc;
use vello::Scene;

/// Vello-based renderer for GPU-accelerated 2D graphics.
pub struct VelloRenderer {
    /// The Vello scene being built.
    scene: Scene,
    /// Last uploaded base image, so the blob id stays stable across frames.
    image_cache: Option<(Arc<Vec<u8>>, peniko::ImageData)>,
}

impl Default for VelloRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl VelloRenderer {
    /// Create a new renderer.
    pub fn new() -> Self {
        Self {
            scene: Scene::new(),
            image_cache: None,
        }
    }

    /// Get the built scene for rendering.
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Take ownership of the scene (resets internal scene).
    pub fn take_scene(&mut self) -> Scene {
        std::mem::take(&mut self.scene)
    }

    fn base_image_data(&mut self, base: &BaseImage) -> peniko::ImageData {
        if let Some((pixels, data)) = &self.image_cache {
            if Arc::ptr_eq(pixels, &base.pixels) {
                return data.clone();
            }
        }
        let data = peniko::ImageData {
            data: peniko::Blob::new(base.pixels.clone()),
            format: peniko::ImageFormat::Rgba8,
            width: base.width,
            height: base.height,
            alpha_type: peniko::ImageAlphaType::Alpha,
        };
        self.image_cache = Some((base.pixels.clone(), data.clone()));
        data
    }

    /// Render one stroke of the ink layer.
    fn render_item(&mut self, item: &SceneItem, transform: Affine) {
        if item.geometry.is_empty() {
            return;
        }
        match item.paint.compositing {
            Compositing::SourceOver => {
                self.render_ink(item, item.paint.color.into(), transform);
            }
            Compositing::Clear => {
                // Whatever the layer paints is punched out of the ink below.
                let margin = item.paint.width;
                let clip = item.geometry.bounds().inflate(margin, margin);
                self.scene.push_layer(
                    BlendMode::new(Mix::Normal, Compose::DestOut),
                    1.0,
                    transform,
                    &clip,
                );
                self.render_ink(item, Color::BLACK, transform);
                self.scene.pop_layer();
            }
        }
    }

    fn render_ink(&mut self, item: &SceneItem, color: Color, transform: Affine) {
        let paint: &PaintDescriptor = &item.paint;
        let path = item.geometry.to_bez_path();

        if paint.is_stamped() {
            let stamps = stamp_along(&path, &paint.effect);
            self.scene.fill(Fill::NonZero, transform, color, None, &stamps);
        } else if item.geometry.is_dot() {
            if let Some(center) = item.geometry.first_point() {
                let dot = Circle::new(center, paint.width / 2.0);
                self.scene.fill(Fill::NonZero, transform, color, None, &dot);
            }
        } else {
            self.scene.stroke(&paint.to_stroke(), transform, color, None, &path);
        }
    }

    /// Outline showing the eraser extent.
    fn render_cursor(&mut self, cursor: EraserCursor, transform: Affine, color: Color) {
        let circle = Circle::new(cursor.center, cursor.radius);
        let stroke = Stroke::new(1.5);
        self.scene.stroke(&stroke, transform, color, None, &circle);
    }
}

impl Renderer for VelloRenderer {
    fn build_scene(&mut self, ctx: &RenderContext) {
        // Clear the scene
        self.scene.reset();

        let transform = ctx.transform();
        let scene = ctx.scene;
        let bounds = Rect::from_origin_size(Point::ORIGIN, scene.size);

        self.scene.fill(
            Fill::NonZero,
            Affine::IDENTITY,
            ctx.background_color,
            None,
            &ctx.viewport_rect(),
        );

        if let Some(base) = &scene.base {
            let image: peniko::ImageBrush = self.base_image_data(base).into();
            self.scene.draw_image(&image, transform);
        }

        // Strokes live in their own layer so erasing never reaches the base image.
        self.scene
            .push_layer(BlendMode::default(), 1.0, transform, &bounds);
        for item in &scene.layer.items {
            self.render_item(item, transform);
        }
        self.scene.pop_layer();

        if let Some(cursor) = scene.cursor {
            self.render_cursor(cursor, transform, ctx.cursor_color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inkflow_core::{EngineConfig, InkEngine, ManualFrameScheduler, StrokeStyle, ToolMode};
    use kurbo::Size;

    fn engine() -> InkEngine {
        let mut engine = InkEngine::new(EngineConfig::default(), ManualFrameScheduler::new());
        engine.set_surface_size(Size::new(200.0, 100.0));
        engine
    }

    #[test]
    fn test_renderer_creation() {
        let renderer = VelloRenderer::new();
        assert!(renderer.scene().encoding().is_empty());
    }

    #[test]
    fn test_build_empty_scene() {
        let mut renderer = VelloRenderer::new();
        let scene = engine().scene();
        let ctx = RenderContext::new(&scene, Size::new(200.0, 100.0));

        renderer.build_scene(&ctx);
        // Background at minimum
        assert!(!renderer.scene().encoding().is_empty());
    }

    #[test]
    fn test_build_scene_with_every_style() {
        let mut renderer = VelloRenderer::new();
        let mut engine = engine();
        for (i, style) in StrokeStyle::ALL.iter().enumerate() {
            let y = 10.0 + i as f64 * 12.0;
            engine.set_style(*style);
            engine.on_start(Point::new(10.0, y));
            engine.on_move(Point::new(90.0, y));
            engine.on_move(Point::new(180.0, y + 5.0));
            engine.on_end();
        }
        engine.set_tool_mode(ToolMode::Erase);
        engine.on_start(Point::new(50.0, 0.0));
        engine.on_move(Point::new(50.0, 100.0));

        let scene = engine.scene();
        let ctx = RenderContext::new(&scene, Size::new(200.0, 100.0)).with_scale_factor(2.0);
        renderer.build_scene(&ctx);

        let taken = renderer.take_scene();
        assert!(!taken.encoding().is_empty());
        assert!(renderer.scene().encoding().is_empty());
    }

    #[test]
    fn test_base_image_is_cached() {
        let mut renderer = VelloRenderer::new();
        let mut engine = engine();
        engine.set_base_image(BaseImage::from_rgba8(2, 2, vec![255; 16]));
        let scene = engine.scene();
        let ctx = RenderContext::new(&scene, Size::new(2.0, 2.0));

        renderer.build_scene(&ctx);
        let first = renderer.image_cache.as_ref().map(|(_, data)| data.data.id());
        renderer.build_scene(&ctx);
        let second = renderer.image_cache.as_ref().map(|(_, data)| data.data.id());

        assert!(first.is_some());
        assert_eq!(first, second);
    }
}
