//! Paint resolution: maps brush settings to a paint descriptor.
//!
//! The resolver is pure. Bad input (unknown style or mode, malformed
//! color, out-of-range width) is defaulted or clamped, never rejected.

use crate::config::EngineConfig;
use crate::style::{SerializableColor, StrokeStyle, ToolMode};
use kurbo::{Affine, BezPath, Cap, Circle, Ellipse, Join, PathEl, Point, Shape as _, Stroke, Vec2};

/// Dash pattern for dashed strokes (on, off).
pub const DASH_PATTERN: [f64; 2] = [15.0, 10.0];
/// Dash pattern for dotted strokes (on, off).
pub const DOT_PATTERN: [f64; 2] = [2.0, 8.0];

/// Tolerance for flattening paths before placing stamps.
const FLATTEN_TOLERANCE: f64 = 0.25;
/// Petal count of the flower stamp.
const FLOWER_PETALS: usize = 8;
/// Point count of the star stamp.
const STAR_POINTS: usize = 5;

/// How a stroke combines with what is already drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Compositing {
    /// Paint over existing pixels.
    #[default]
    SourceOver,
    /// Clear existing pixels under the stroke.
    Clear,
}

/// Procedural shape stamped along a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StampShape {
    Heart,
    Flower,
    Star,
}

impl StampShape {
    /// Stamp shape for a style, if the style is stamped.
    pub fn for_style(style: StrokeStyle) -> Option<Self> {
        match style {
            StrokeStyle::Heart => Some(StampShape::Heart),
            StrokeStyle::Flower => Some(StampShape::Flower),
            StrokeStyle::Star => Some(StampShape::Star),
            StrokeStyle::Solid | StrokeStyle::Dashed | StrokeStyle::Dotted => None,
        }
    }

    /// (size scale, size floor, spacing scale) per shape.
    fn constants(self) -> (f64, f64, f64) {
        match self {
            StampShape::Heart => (2.0, 8.0, 1.5),
            StampShape::Flower => (2.2, 10.0, 1.4),
            StampShape::Star => (2.0, 8.0, 1.3),
        }
    }

    /// Stamp size and spacing for a stroke of `width`.
    pub fn metrics(self, width: f64) -> (f64, f64) {
        let (scale, floor, spacing) = self.constants();
        let size = (width * scale).max(floor);
        (size, size * spacing)
    }
}

/// Effect applied along the stroke path.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum PathEffect {
    #[default]
    None,
    /// Repeating on/off intervals starting at `phase`.
    Dash { intervals: Vec<f64>, phase: f64 },
    /// A filled shape repeated every `spacing` units of arc length.
    Stamp { shape: StampShape, size: f64, spacing: f64 },
}

/// Fully resolved paint for one stroke.
#[derive(Debug, Clone, PartialEq)]
pub struct PaintDescriptor {
    pub color: SerializableColor,
    pub width: f64,
    pub cap: Cap,
    pub join: Join,
    pub antialias: bool,
    pub effect: PathEffect,
    pub compositing: Compositing,
}

impl PaintDescriptor {
    /// Resolve typed brush settings. `width` is assumed already clamped.
    pub fn resolve(color: SerializableColor, width: f64, style: StrokeStyle, mode: ToolMode) -> Self {
        let base = Self {
            color,
            width,
            cap: Cap::Round,
            join: Join::Round,
            antialias: true,
            effect: PathEffect::None,
            compositing: Compositing::SourceOver,
        };

        if mode.is_erase() {
            return Self {
                color: SerializableColor::black(),
                compositing: Compositing::Clear,
                ..base
            };
        }

        let effect = match (style, StampShape::for_style(style)) {
            (_, Some(shape)) => {
                let (size, spacing) = shape.metrics(width);
                PathEffect::Stamp { shape, size, spacing }
            }
            (StrokeStyle::Dashed, None) => PathEffect::Dash {
                intervals: DASH_PATTERN.to_vec(),
                phase: 0.0,
            },
            (StrokeStyle::Dotted, None) => PathEffect::Dash {
                intervals: DOT_PATTERN.to_vec(),
                phase: 0.0,
            },
            _ => PathEffect::None,
        };
        Self { effect, ..base }
    }

    /// Dash intervals, if the effect is a dash.
    pub fn dash_pattern(&self) -> Option<&[f64]> {
        match &self.effect {
            PathEffect::Dash { intervals, .. } => Some(intervals),
            _ => None,
        }
    }

    pub fn is_clear(&self) -> bool {
        self.compositing == Compositing::Clear
    }

    /// Whether the stroke is drawn by filling stamps instead of stroking.
    pub fn is_stamped(&self) -> bool {
        matches!(self.effect, PathEffect::Stamp { .. })
    }

    /// kurbo stroke style carrying width, caps, joins and dashes.
    pub fn to_stroke(&self) -> Stroke {
        let stroke = Stroke::new(self.width)
            .with_caps(self.cap)
            .with_join(self.join);
        match &self.effect {
            PathEffect::Dash { intervals, phase } => stroke.with_dashes(*phase, intervals.iter().copied()),
            _ => stroke,
        }
    }
}

/// Resolve paint from textual inputs, defaulting anything unrecognised.
///
/// Widths are clamped to the default [`EngineConfig`] range.
pub fn resolve_paint(color: &str, width: f64, style: &str, mode: &str) -> PaintDescriptor {
    resolve_paint_with(&EngineConfig::default(), color, width, style, mode)
}

/// [`resolve_paint`] with widths clamped to `config`'s range.
pub fn resolve_paint_with(
    config: &EngineConfig,
    color: &str,
    width: f64,
    style: &str,
    mode: &str,
) -> PaintDescriptor {
    PaintDescriptor::resolve(
        SerializableColor::parse_or_default(color),
        config.clamp_width(width),
        StrokeStyle::parse_or_default(style),
        ToolMode::parse_or_default(mode),
    )
}

/// Closed outline of a stamp of the given size, centered on the origin.
pub fn stamp_shape(shape: StampShape, size: f64) -> BezPath {
    match shape {
        StampShape::Heart => heart(size),
        StampShape::Flower => flower(size),
        StampShape::Star => star(size),
    }
}

/// Two cubic lobes meeting at a top notch and a bottom tip.
fn heart(size: f64) -> BezPath {
    let s = size;
    let tip = Point::new(0.0, s * 0.5);
    let notch = Point::new(0.0, -s * 0.2);
    let mut path = BezPath::new();
    path.move_to(tip);
    path.curve_to(Point::new(-s * 0.6, s * 0.1), Point::new(-s * 0.5, -s * 0.5), notch);
    path.curve_to(Point::new(s * 0.5, -s * 0.5), Point::new(s * 0.6, s * 0.1), tip);
    path.close_path();
    path
}

/// Rounded petals arranged symmetrically around a filled center.
fn flower(size: f64) -> BezPath {
    let orbit = size * 0.28;
    let petal_radii = Vec2::new(size * 0.2, size * 0.12);
    let mut path = BezPath::new();
    for i in 0..FLOWER_PETALS {
        let angle = i as f64 * std::f64::consts::TAU / FLOWER_PETALS as f64;
        let center = Point::new(orbit * angle.cos(), orbit * angle.sin());
        let petal = Ellipse::new(center, petal_radii, angle);
        path.extend(petal.path_elements(0.1));
    }
    path.extend(Circle::new(Point::ORIGIN, size * 0.15).path_elements(0.1));
    path
}

/// Five-point star alternating outer and inner radius, with a filled center.
fn star(size: f64) -> BezPath {
    let outer = size * 0.5;
    let inner = outer * 0.4;
    let mut path = BezPath::new();
    for i in 0..STAR_POINTS * 2 {
        let radius = if i % 2 == 0 { outer } else { inner };
        // Start at the top point.
        let angle = -std::f64::consts::FRAC_PI_2 + i as f64 * std::f64::consts::PI / STAR_POINTS as f64;
        let p = Point::new(radius * angle.cos(), radius * angle.sin());
        if i == 0 {
            path.move_to(p);
        } else {
            path.line_to(p);
        }
    }
    path.close_path();
    path.extend(Circle::new(Point::ORIGIN, inner * 0.5).path_elements(0.1));
    path
}

/// Positions at every `spacing` units of arc length along `path`,
/// starting at its first point.
pub fn stamp_positions(path: &BezPath, spacing: f64) -> Vec<Point> {
    let mut positions = Vec::new();
    if !(spacing.is_finite() && spacing > 0.0) {
        return positions;
    }

    let mut polyline: Vec<Point> = Vec::new();
    kurbo::flatten(path.iter(), FLATTEN_TOLERANCE, |el| match el {
        PathEl::MoveTo(p) | PathEl::LineTo(p) => polyline.push(p),
        PathEl::ClosePath => {
            if let Some(&first) = polyline.first() {
                polyline.push(first);
            }
        }
        // flatten only emits moves, lines and closes
        PathEl::QuadTo(..) | PathEl::CurveTo(..) => {}
    });

    let Some(&first) = polyline.first() else {
        return positions;
    };
    positions.push(first);

    // Distance remaining until the next stamp.
    let mut until_next = spacing;
    for window in polyline.windows(2) {
        let (a, b) = (window[0], window[1]);
        let length = a.distance(b);
        let mut travelled = 0.0;
        while length - travelled >= until_next {
            travelled += until_next;
            positions.push(a.lerp(b, travelled / length));
            until_next = spacing;
        }
        until_next -= length - travelled;
    }
    positions
}

/// Filled outline of all stamps placed along `path`.
///
/// Returns an empty path when `effect` is not a stamp.
pub fn stamp_along(path: &BezPath, effect: &PathEffect) -> BezPath {
    let PathEffect::Stamp { shape, size, spacing } = effect else {
        return BezPath::new();
    };
    let stamp = stamp_shape(*shape, *size);
    let mut result = BezPath::new();
    for position in stamp_positions(path, *spacing) {
        let placed = Affine::translate(position.to_vec2()) * stamp.clone();
        result.extend(placed.iter());
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dashed_draw() {
        let paint = resolve_paint("#FF0000", 4.0, "dashed", "draw");
        assert_eq!(paint.dash_pattern(), Some(&[15.0, 10.0][..]));
        assert_eq!(paint.compositing, Compositing::SourceOver);
        assert_eq!(paint.color, SerializableColor::new(255, 0, 0, 255));
        assert_eq!(paint.cap, Cap::Round);
        assert_eq!(paint.join, Join::Round);
        assert!(paint.antialias);
    }

    #[test]
    fn test_erase_ignores_style() {
        for style in StrokeStyle::ALL {
            let paint = resolve_paint("#FF0000", 4.0, style.name(), "erase");
            assert!(paint.is_clear());
            assert_eq!(paint.effect, PathEffect::None);
        }
    }

    #[test]
    fn test_dotted_and_solid() {
        let dotted = resolve_paint("#000", 2.0, "dotted", "draw");
        assert_eq!(dotted.dash_pattern(), Some(&[2.0, 8.0][..]));
        let solid = resolve_paint("#000", 2.0, "solid", "draw");
        assert_eq!(solid.effect, PathEffect::None);
    }

    #[test]
    fn test_invalid_input_defaults() {
        let paint = resolve_paint("bogus", -5.0, "sparkles", "paint");
        assert_eq!(paint.color, SerializableColor::black());
        assert_eq!(paint.width, 0.5);
        assert_eq!(paint.effect, PathEffect::None);
        assert_eq!(paint.compositing, Compositing::SourceOver);
    }

    #[test]
    fn test_configured_width_range() {
        let config = EngineConfig {
            min_width: 2.0,
            max_width: 20.0,
            ..EngineConfig::default()
        };
        assert_eq!(resolve_paint_with(&config, "#000", 50.0, "solid", "draw").width, 20.0);
        assert_eq!(resolve_paint_with(&config, "#000", 1.0, "solid", "draw").width, 2.0);
        // Default range still applies to the plain resolver.
        assert_eq!(resolve_paint("#000", 50.0, "solid", "draw").width, 50.0);
    }

    #[test]
    fn test_heart_is_two_closed_lobes() {
        let path = stamp_shape(StampShape::Heart, 20.0);
        let elements = path.elements();
        assert_eq!(elements.len(), 4);
        assert_eq!(elements[0], PathEl::MoveTo(Point::new(0.0, 10.0)));
        assert!(matches!(elements[1], PathEl::CurveTo(_, _, p) if p == Point::new(0.0, -4.0)));
        assert!(matches!(elements[2], PathEl::CurveTo(_, _, p) if p == Point::new(0.0, 10.0)));
        assert_eq!(elements[3], PathEl::ClosePath);
        // Lobes mirror each other across the vertical axis.
        let bounds = path.bounding_box();
        assert!((bounds.x0 + bounds.x1).abs() < 1e-9);
    }

    #[test]
    fn test_stamp_metrics_scale_with_width() {
        for shape in [StampShape::Heart, StampShape::Flower, StampShape::Star] {
            let (small, small_spacing) = shape.metrics(1.0);
            let (large, large_spacing) = shape.metrics(20.0);
            assert!(small > 0.0 && small_spacing > small);
            assert!(large > small);
            assert!(large_spacing > small_spacing);
            // Deterministic.
            assert_eq!(shape.metrics(20.0), (large, large_spacing));
        }
    }

    #[test]
    fn test_stamp_shapes_fit_size() {
        for shape in [StampShape::Heart, StampShape::Flower, StampShape::Star] {
            let path = stamp_shape(shape, 20.0);
            assert!(!path.elements().is_empty());
            let bounds = path.bounding_box();
            assert!(bounds.width() <= 20.0 + 1e-6, "{:?} too wide", shape);
            assert!(bounds.height() <= 20.0 + 1e-6, "{:?} too tall", shape);
            assert_eq!(stamp_shape(shape, 20.0), path);
        }
    }

    #[test]
    fn test_star_has_ten_vertices() {
        let path = star(10.0);
        let line_count = path
            .elements()
            .iter()
            .take_while(|el| !matches!(el, PathEl::ClosePath))
            .count();
        assert_eq!(line_count, 10);
    }

    #[test]
    fn test_stamp_positions_spacing() {
        let mut path = BezPath::new();
        path.move_to((0.0, 0.0));
        path.line_to((100.0, 0.0));
        let positions = stamp_positions(&path, 25.0);
        assert_eq!(positions.len(), 5);
        assert_eq!(positions[0], Point::new(0.0, 0.0));
        assert!((positions[4].x - 100.0).abs() < 1e-9);
        assert!(stamp_positions(&path, 0.0).is_empty());
    }

    #[test]
    fn test_stamp_positions_across_segments() {
        let mut path = BezPath::new();
        path.move_to((0.0, 0.0));
        path.line_to((10.0, 0.0));
        path.line_to((10.0, 10.0));
        let positions = stamp_positions(&path, 15.0);
        assert_eq!(positions.len(), 2);
        assert!((positions[1].x - 10.0).abs() < 1e-9);
        assert!((positions[1].y - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_stamp_along_dot_places_one_stamp() {
        let mut path = BezPath::new();
        path.move_to((5.0, 5.0));
        path.line_to((5.0, 5.0));
        let paint = resolve_paint("#f00", 4.0, "heart", "draw");
        let stamps = stamp_along(&path, &paint.effect);
        let bounds = stamps.bounding_box();
        assert!(bounds.contains(Point::new(5.0, 5.0)));
    }

    #[test]
    fn test_to_stroke_carries_dashes() {
        let paint = resolve_paint("#000", 3.0, "dashed", "draw");
        let stroke = paint.to_stroke();
        assert_eq!(stroke.width, 3.0);
        assert_eq!(stroke.dash_pattern.as_slice(), &[15.0, 10.0]);
        assert_eq!(stroke.start_cap, Cap::Round);
        assert_eq!(stroke.join, Join::Round);
    }
}
