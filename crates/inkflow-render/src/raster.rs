//! CPU rasterizer used for export.
//!
//! Paints the base image, then the ink layer as a separate pixmap so
//! clear-mode strokes only remove ink, then encodes the result as PNG.

use inkflow_core::export::{EncodedImage, ExportError, ExportResult, ImageFormat, Rasterizer};
use inkflow_core::paint::{stamp_along, PathEffect};
use inkflow_core::surface::{BaseImage, Scene, SceneItem};
use inkflow_core::SerializableColor;
use kurbo::{BezPath, PathEl};
use tiny_skia::{
    BlendMode, FillRule, LineCap, LineJoin, Paint, PathBuilder, Pixmap, PixmapPaint, Stroke,
    StrokeDash, Transform,
};

/// tiny-skia backed [`Rasterizer`].
#[derive(Debug, Clone, Copy)]
pub struct SkiaRasterizer {
    background: SerializableColor,
}

impl Default for SkiaRasterizer {
    fn default() -> Self {
        Self::new()
    }
}

impl SkiaRasterizer {
    /// Rasterizer with a white background.
    pub fn new() -> Self {
        Self {
            background: SerializableColor::white(),
        }
    }

    /// Set the color painted under everything.
    pub fn with_background(mut self, background: SerializableColor) -> Self {
        self.background = background;
        self
    }

    /// Paint `scene` into a premultiplied pixmap.
    pub fn render(&self, scene: &Scene) -> ExportResult<Pixmap> {
        let (width, height) = scene.pixel_size();
        let mut canvas = Pixmap::new(width, height).ok_or_else(|| {
            ExportError::Rasterize(format!("cannot allocate {}x{} pixmap", width, height))
        })?;
        canvas.fill(skia_color(self.background));

        if let Some(base) = &scene.base {
            let image = base_pixmap(base)?;
            canvas.draw_pixmap(
                0,
                0,
                image.as_ref(),
                &PixmapPaint::default(),
                Transform::identity(),
                None,
            );
        }

        // Isolated ink layer.
        let mut ink = Pixmap::new(width, height).ok_or_else(|| {
            ExportError::Rasterize(format!("cannot allocate {}x{} ink layer", width, height))
        })?;
        for item in &scene.layer.items {
            draw_item(&mut ink, item);
        }
        canvas.draw_pixmap(
            0,
            0,
            ink.as_ref(),
            &PixmapPaint::default(),
            Transform::identity(),
            None,
        );

        Ok(canvas)
    }
}

impl Rasterizer for SkiaRasterizer {
    fn rasterize(&self, scene: &Scene) -> ExportResult<EncodedImage> {
        let pixmap = self.render(scene)?;
        let bytes = encode_png(&pixmap)?;
        Ok(EncodedImage {
            format: ImageFormat::Png,
            width: pixmap.width(),
            height: pixmap.height(),
            bytes,
        })
    }
}

fn skia_color(color: SerializableColor) -> tiny_skia::Color {
    tiny_skia::Color::from_rgba8(color.r, color.g, color.b, color.a)
}

/// Copy straight-alpha RGBA into a premultiplied pixmap.
fn base_pixmap(base: &BaseImage) -> ExportResult<Pixmap> {
    let mut pixmap = Pixmap::new(base.width, base.height).ok_or_else(|| {
        ExportError::Rasterize(format!("cannot allocate {}x{} base image", base.width, base.height))
    })?;
    for (dst, src) in pixmap.pixels_mut().iter_mut().zip(base.pixels.chunks_exact(4)) {
        *dst = tiny_skia::ColorU8::from_rgba(src[0], src[1], src[2], src[3]).premultiply();
    }
    Ok(pixmap)
}

fn to_skia_path(path: &BezPath) -> Option<tiny_skia::Path> {
    let mut builder = PathBuilder::new();
    for el in path.elements() {
        match *el {
            PathEl::MoveTo(p) => builder.move_to(p.x as f32, p.y as f32),
            PathEl::LineTo(p) => builder.line_to(p.x as f32, p.y as f32),
            PathEl::QuadTo(c, p) => builder.quad_to(c.x as f32, c.y as f32, p.x as f32, p.y as f32),
            PathEl::CurveTo(c1, c2, p) => builder.cubic_to(
                c1.x as f32,
                c1.y as f32,
                c2.x as f32,
                c2.y as f32,
                p.x as f32,
                p.y as f32,
            ),
            PathEl::ClosePath => builder.close(),
        }
    }
    builder.finish()
}

fn draw_item(ink: &mut Pixmap, item: &SceneItem) {
    let descriptor = &item.paint;
    let mut paint = Paint::default();
    paint.set_color(skia_color(descriptor.color));
    paint.anti_alias = descriptor.antialias;
    if descriptor.is_clear() {
        paint.blend_mode = BlendMode::Clear;
    }

    let path = item.geometry.to_bez_path();
    let transform = Transform::identity();

    if descriptor.is_stamped() {
        if let Some(stamps) = to_skia_path(&stamp_along(&path, &descriptor.effect)) {
            ink.fill_path(&stamps, &paint, FillRule::Winding, transform, None);
        }
        return;
    }

    if item.geometry.is_dot() {
        let Some(center) = item.geometry.first_point() else {
            return;
        };
        let radius = (descriptor.width / 2.0) as f32;
        if let Some(dot) = PathBuilder::from_circle(center.x as f32, center.y as f32, radius) {
            ink.fill_path(&dot, &paint, FillRule::Winding, transform, None);
        }
        return;
    }

    let Some(path) = to_skia_path(&path) else {
        return;
    };
    let dash = match &descriptor.effect {
        PathEffect::Dash { intervals, phase } => StrokeDash::new(
            intervals.iter().map(|&v| v as f32).collect(),
            *phase as f32,
        ),
        _ => None,
    };
    let stroke = Stroke {
        width: descriptor.width as f32,
        line_cap: LineCap::Round,
        line_join: LineJoin::Round,
        dash,
        ..Stroke::default()
    };
    ink.stroke_path(&path, &paint, &stroke, transform, None);
}

/// Encode a premultiplied pixmap as straight-alpha RGBA PNG.
pub fn encode_png(pixmap: &Pixmap) -> ExportResult<Vec<u8>> {
    let mut rgba = Vec::with_capacity(pixmap.data().len());
    for pixel in pixmap.pixels() {
        let c = pixel.demultiply();
        rgba.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
    }

    let mut png_data = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut png_data, pixmap.width(), pixmap.height());
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder
            .write_header()
            .map_err(|e| ExportError::Encode(format!("Failed to write PNG header: {}", e)))?;
        writer
            .write_image_data(&rgba)
            .map_err(|e| ExportError::Encode(format!("Failed to write PNG data: {}", e)))?;
    }
    Ok(png_data)
}
