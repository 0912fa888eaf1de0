//! Stroke geometry: typed path segments and the path builders.
//!
//! Committed geometry is an immutable, shareable list of segments rather
//! than a mutable path builder, so strokes compare structurally and clone
//! in O(1).

use kurbo::{BezPath, Point, Rect};
use std::sync::Arc;

/// One drawing command of a stroke path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Segment {
    MoveTo(Point),
    LineTo(Point),
    CubicTo(Point, Point, Point),
}

impl Segment {
    /// The point this segment ends at.
    pub fn end_point(&self) -> Point {
        match *self {
            Segment::MoveTo(p) | Segment::LineTo(p) => p,
            Segment::CubicTo(_, _, p) => p,
        }
    }
}

/// Immutable stroke geometry.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Geometry {
    segments: Arc<[Segment]>,
}

impl Geometry {
    /// Geometry with no segments.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_segments(segments: Vec<Segment>) -> Self {
        Self {
            segments: segments.into(),
        }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Start point of the path.
    pub fn first_point(&self) -> Option<Point> {
        self.segments.first().map(Segment::end_point)
    }

    /// End point of the path.
    pub fn last_point(&self) -> Option<Point> {
        self.segments.last().map(Segment::end_point)
    }

    /// True when the geometry only contains straight segments.
    pub fn is_polyline(&self) -> bool {
        self.segments
            .iter()
            .all(|s| matches!(s, Segment::MoveTo(_) | Segment::LineTo(_)))
    }

    /// True when every segment ends at the same point (a dot).
    pub fn is_dot(&self) -> bool {
        match self.first_point() {
            Some(first) => self.segments.iter().all(|s| s.end_point() == first),
            None => false,
        }
    }

    /// On-curve points in order (control points excluded).
    pub fn anchor_points(&self) -> Vec<Point> {
        self.segments.iter().map(Segment::end_point).collect()
    }

    /// Convert to a kurbo path for rendering.
    pub fn to_bez_path(&self) -> BezPath {
        let mut path = BezPath::new();
        for segment in self.segments.iter() {
            match *segment {
                Segment::MoveTo(p) => path.move_to(p),
                Segment::LineTo(p) => path.line_to(p),
                Segment::CubicTo(c1, c2, p) => path.curve_to(c1, c2, p),
            }
        }
        path
    }

    /// Control-point bounding box (a superset of the curve bounds).
    pub fn bounds(&self) -> Rect {
        let mut points = self.segments.iter().flat_map(|s| match *s {
            Segment::MoveTo(p) | Segment::LineTo(p) => [Some(p), None, None],
            Segment::CubicTo(c1, c2, p) => [Some(c1), Some(c2), Some(p)],
        });
        let Some(Some(first)) = points.next() else {
            return Rect::ZERO;
        };
        points
            .flatten()
            .fold(Rect::from_points(first, first), |rect, p| rect.union_pt(p))
    }
}

/// Straight segments through `points` in order.
///
/// A single point yields a zero-length segment so round caps render a dot.
pub fn build_polyline(points: &[Point]) -> Geometry {
    let Some((&first, rest)) = points.split_first() else {
        return Geometry::empty();
    };
    let mut segments = Vec::with_capacity(points.len().max(2));
    segments.push(Segment::MoveTo(first));
    if rest.is_empty() {
        segments.push(Segment::LineTo(first));
    } else {
        segments.extend(rest.iter().map(|&p| Segment::LineTo(p)));
    }
    Geometry::from_segments(segments)
}

/// Uniformly subsample `points` to at most `max_points` with a fixed stride,
/// always keeping the exact first and last point.
pub fn subsample(points: &[Point], max_points: usize) -> Vec<Point> {
    let max_points = max_points.max(2);
    let n = points.len();
    if n <= max_points {
        return points.to_vec();
    }
    let stride = (n - 1).div_ceil(max_points - 1);
    let mut result: Vec<Point> = points[..n - 1].iter().step_by(stride).copied().collect();
    result.push(points[n - 1]);
    result
}

/// Midpoint-based cubic fit through `points`.
///
/// Each interior sample contributes one cubic between the midpoints of its
/// neighbouring segments, with both control points pulled from the
/// midpoints toward the sample by `smoothing`. Fewer than three points fall
/// back to a polyline.
pub fn build_smooth_spline(points: &[Point], smoothing: f64, max_points: usize) -> Geometry {
    if points.len() < 3 {
        return build_polyline(points);
    }
    let points = subsample(points, max_points);
    let smoothing = if smoothing.is_finite() { smoothing.clamp(0.0, 1.0) } else { 0.0 };
    let n = points.len();

    let mut segments = Vec::with_capacity(n + 1);
    segments.push(Segment::MoveTo(points[0]));
    segments.push(Segment::LineTo(points[0].midpoint(points[1])));
    for window in points.windows(3) {
        let (prev, p, next) = (window[0], window[1], window[2]);
        let m1 = prev.midpoint(p);
        let m2 = p.midpoint(next);
        let c1 = m1.lerp(p, smoothing);
        let c2 = m2.lerp(p, smoothing);
        segments.push(Segment::CubicTo(c1, c2, m2));
    }
    segments.push(Segment::LineTo(points[n - 1]));
    Geometry::from_segments(segments)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_points(n: usize) -> Vec<Point> {
        (0..n).map(|i| Point::new(i as f64, (i as f64 * 0.3).sin() * 10.0)).collect()
    }

    #[test]
    fn test_polyline_edge_cases() {
        assert!(build_polyline(&[]).is_empty());

        let dot = build_polyline(&[Point::new(3.0, 4.0)]);
        assert!(dot.is_dot());
        assert_eq!(dot.len(), 2);

        let segment = build_polyline(&[Point::new(0.0, 0.0), Point::new(5.0, 0.0)]);
        assert_eq!(
            segment.segments(),
            &[Segment::MoveTo(Point::new(0.0, 0.0)), Segment::LineTo(Point::new(5.0, 0.0))]
        );
    }

    #[test]
    fn test_spline_short_inputs_are_polylines() {
        for n in 0..3 {
            let points = line_points(n);
            let geometry = build_smooth_spline(&points, 0.4, 100);
            assert!(geometry.is_polyline());
            assert_eq!(geometry, build_polyline(&points));
            if n > 0 {
                assert_eq!(geometry.first_point(), points.first().copied());
                assert_eq!(geometry.last_point(), points.last().copied());
            }
        }
    }

    #[test]
    fn test_spline_preserves_endpoints() {
        let points = line_points(12);
        let geometry = build_smooth_spline(&points, 0.3, 100);
        assert_eq!(geometry.first_point(), Some(points[0]));
        assert_eq!(geometry.last_point(), Some(points[11]));
        // move + lead-in line + one cubic per interior point + tail line
        assert_eq!(geometry.len(), 2 + 10 + 1);
    }

    #[test]
    fn test_spline_passes_through_midpoints() {
        let points = vec![Point::new(0.0, 0.0), Point::new(10.0, 10.0), Point::new(20.0, 0.0)];
        let geometry = build_smooth_spline(&points, 0.5, 100);
        match geometry.segments()[2] {
            Segment::CubicTo(c1, c2, end) => {
                assert_eq!(end, Point::new(15.0, 5.0));
                assert_eq!(c1, Point::new(7.5, 7.5));
                assert_eq!(c2, Point::new(12.5, 7.5));
            }
            other => panic!("expected cubic, got {:?}", other),
        }
    }

    #[test]
    fn test_subsample_caps_long_strokes() {
        let points = line_points(250);
        let sampled = subsample(&points, 100);
        assert!(sampled.len() <= 100);
        assert_eq!(sampled.first(), points.first());
        assert_eq!(sampled.last(), points.last());

        for n in [101, 150, 199, 200, 201, 1000] {
            let sampled = subsample(&line_points(n), 100);
            assert!(sampled.len() <= 100, "n = {} gave {}", n, sampled.len());
        }
    }

    #[test]
    fn test_long_spline_uses_capped_points() {
        let points = line_points(250);
        let geometry = build_smooth_spline(&points, 0.2, 100);
        let cubics = geometry
            .segments()
            .iter()
            .filter(|s| matches!(s, Segment::CubicTo(..)))
            .count();
        assert!(cubics + 2 <= 100);
        assert_eq!(geometry.first_point(), Some(points[0]));
        assert_eq!(geometry.last_point(), Some(points[249]));
    }

    #[test]
    fn test_bounds_and_bez_path() {
        let geometry = build_polyline(&[Point::new(0.0, 0.0), Point::new(100.0, 50.0), Point::new(50.0, 100.0)]);
        let bounds = geometry.bounds();
        assert_eq!(bounds, Rect::new(0.0, 0.0, 100.0, 100.0));
        assert_eq!(geometry.to_bez_path().elements().len(), 3);
        assert_eq!(Geometry::empty().bounds(), Rect::ZERO);
    }
}
