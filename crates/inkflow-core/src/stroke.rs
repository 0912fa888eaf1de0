//! Committed strokes and the in-progress draft.

use crate::geometry::{build_polyline, Geometry};
use crate::paint::PaintDescriptor;
use crate::style::{Brush, SerializableColor, StrokeStyle, ToolMode};
use kurbo::{Point, Rect};
use uuid::Uuid;

/// Unique identifier for strokes.
pub type StrokeId = Uuid;

/// A committed, immutable stroke.
///
/// Fields are private so geometry can never change after commit.
#[derive(Debug, Clone, PartialEq)]
pub struct Stroke {
    id: StrokeId,
    geometry: Geometry,
    color: SerializableColor,
    width: f64,
    style: StrokeStyle,
    mode: ToolMode,
}

impl Stroke {
    /// Create a stroke from finished geometry and the brush it was drawn with.
    pub fn new(geometry: Geometry, brush: Brush) -> Self {
        Self {
            id: Uuid::new_v4(),
            geometry,
            color: brush.color,
            width: brush.width,
            style: brush.style,
            mode: brush.mode,
        }
    }

    pub fn id(&self) -> StrokeId {
        self.id
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn color(&self) -> SerializableColor {
        self.color
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn style(&self) -> StrokeStyle {
        self.style
    }

    pub fn mode(&self) -> ToolMode {
        self.mode
    }

    /// Resolved paint, using this stroke's own mode.
    pub fn paint(&self) -> PaintDescriptor {
        PaintDescriptor::resolve(self.color, self.width, self.style, self.mode)
    }

    /// Bounds including half the stroke width.
    pub fn bounds(&self) -> Rect {
        let half = self.width / 2.0;
        self.geometry.bounds().inflate(half, half)
    }
}

/// The stroke currently being drawn.
///
/// Its geometry is a plain polyline through the accepted points, rebuilt
/// whenever points are appended.
#[derive(Debug, Clone, PartialEq)]
pub struct Draft {
    points: Vec<Point>,
    geometry: Geometry,
    brush: Brush,
}

impl Draft {
    /// Start a draft at `start` with the brush in effect at pointer-down.
    pub fn new(start: Point, brush: Brush) -> Self {
        let points = vec![start];
        let geometry = build_polyline(&points);
        Self {
            points,
            geometry,
            brush,
        }
    }

    /// Accepted points, in arrival order.
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn last_point(&self) -> Option<Point> {
        self.points.last().copied()
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn brush(&self) -> Brush {
        self.brush
    }

    pub fn paint(&self) -> PaintDescriptor {
        PaintDescriptor::resolve(self.brush.color, self.brush.width, self.brush.style, self.brush.mode)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Append a point without rebuilding the preview.
    pub(crate) fn push(&mut self, point: Point) {
        self.points.push(point);
    }

    /// Rebuild the preview polyline from the accumulated points.
    pub(crate) fn rebuild_preview(&mut self) {
        self.geometry = build_polyline(&self.points);
    }

    /// Consume the draft, returning its points and brush.
    pub(crate) fn into_parts(self) -> (Vec<Point>, Brush) {
        (self.points, self.brush)
    }
}
