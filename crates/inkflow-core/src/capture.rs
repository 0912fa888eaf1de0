//! Live stroke capture.
//!
//! Raw pointer samples are queued as they arrive and consumed in one batch
//! per display frame. Two filters keep point counts down:
//! - a squared-distance guard against the last accepted raw sample, applied
//!   on arrival;
//! - a minimum distance against the last appended point, applied when the
//!   queue is drained.

use crate::stroke::Draft;
use crate::style::Brush;
use kurbo::Point;
use std::collections::VecDeque;
use std::time::Instant;

/// Result of consuming one frame's worth of queued points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameBatch {
    /// Points taken off the queue.
    pub dequeued: usize,
    /// Points that passed the distance filter and were appended.
    pub appended: usize,
}

/// Points and brush of a finished capture, ready for final smoothing.
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedStroke {
    pub points: Vec<Point>,
    pub brush: Brush,
    /// Throughput estimate (points per second) at the time of release.
    pub velocity: f64,
}

/// State of the stroke currently being captured.
#[derive(Debug)]
pub struct StrokeCapture {
    draft: Option<Draft>,
    queue: VecDeque<Point>,
    last_raw: Option<Point>,
    last_frame: Option<Instant>,
    velocity: f64,
    move_guard_sq: f64,
    min_distance: f64,
}

impl StrokeCapture {
    /// Create an idle capture. `move_guard_sq` is the squared distance a raw
    /// sample must exceed to be queued.
    pub fn new(move_guard_sq: f64) -> Self {
        Self {
            draft: None,
            queue: VecDeque::new(),
            last_raw: None,
            last_frame: None,
            velocity: 0.0,
            move_guard_sq,
            min_distance: 0.0,
        }
    }

    /// Begin a new draft at `point`, dropping any previous state.
    pub fn start(&mut self, point: Point, brush: Brush, min_distance: f64, now: Instant) {
        self.queue.clear();
        self.draft = Some(Draft::new(point, brush));
        self.last_raw = Some(point);
        self.last_frame = Some(now);
        self.velocity = 0.0;
        self.min_distance = min_distance;
    }

    /// Queue a raw sample. Returns false if the sample was rejected, either
    /// because no draft is active or because it is too close to the last
    /// accepted sample.
    pub fn enqueue(&mut self, point: Point) -> bool {
        if self.draft.is_none() {
            return false;
        }
        if let Some(last) = self.last_raw {
            if (point - last).hypot2() <= self.move_guard_sq {
                return false;
            }
        }
        self.last_raw = Some(point);
        self.queue.push_back(point);
        true
    }

    /// Drain the queue in one batch, update the velocity estimate and
    /// rebuild the draft preview.
    pub fn consume_frame(&mut self, now: Instant) -> FrameBatch {
        if self.draft.is_none() || self.queue.is_empty() {
            return FrameBatch::default();
        }

        let dequeued = self.queue.len();
        if let Some(last_frame) = self.last_frame {
            let elapsed_ms = now.saturating_duration_since(last_frame).as_secs_f64() * 1000.0;
            if elapsed_ms > 0.0 {
                self.velocity = dequeued as f64 / elapsed_ms * 1000.0;
            }
        }
        self.last_frame = Some(now);

        let appended = self.drain_queue();
        if let Some(draft) = self.draft.as_mut() {
            draft.rebuild_preview();
        }
        FrameBatch { dequeued, appended }
    }

    /// Move queued points into the draft, keeping only those at least
    /// `min_distance` from the last appended point.
    fn drain_queue(&mut self) -> usize {
        let Some(draft) = self.draft.as_mut() else {
            self.queue.clear();
            return 0;
        };
        let mut appended = 0;
        for point in self.queue.drain(..) {
            let far_enough = draft
                .last_point()
                .is_none_or(|last| last.distance(point) >= self.min_distance);
            if far_enough {
                draft.push(point);
                appended += 1;
            }
        }
        appended
    }

    /// End the capture. Still-queued points go through the distance filter
    /// first. Returns `None` when there was nothing to finalize.
    pub fn finish(&mut self) -> Option<CapturedStroke> {
        self.drain_queue();
        let draft = self.draft.take()?;
        self.last_raw = None;
        self.last_frame = None;
        if draft.is_empty() {
            return None;
        }
        let (points, brush) = draft.into_parts();
        Some(CapturedStroke {
            points,
            brush,
            velocity: self.velocity,
        })
    }

    /// Drop the draft and all queued samples.
    pub fn cancel(&mut self) {
        self.draft = None;
        self.queue.clear();
        self.last_raw = None;
        self.last_frame = None;
        self.velocity = 0.0;
    }

    pub fn is_active(&self) -> bool {
        self.draft.is_some()
    }

    pub fn draft(&self) -> Option<&Draft> {
        self.draft.as_ref()
    }

    /// Samples waiting for the next frame.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Points accepted into the draft so far.
    pub fn point_count(&self) -> usize {
        self.draft.as_ref().map_or(0, Draft::len)
    }

    /// Latest throughput estimate in points per second.
    pub fn velocity(&self) -> f64 {
        self.velocity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn started(min_distance: f64) -> (StrokeCapture, Instant) {
        let mut capture = StrokeCapture::new(1.0);
        let t0 = Instant::now();
        capture.start(Point::new(0.0, 0.0), Brush::default(), min_distance, t0);
        (capture, t0)
    }

    #[test]
    fn test_duplicate_moves_rejected() {
        let (mut capture, _) = started(1.0);
        assert!(!capture.enqueue(Point::new(0.0, 0.0)));
        assert!(capture.enqueue(Point::new(3.0, 3.0)));
        assert_eq!(capture.pending(), 1);
        assert!(!capture.enqueue(Point::new(3.0, 3.0)));
        assert_eq!(capture.pending(), 1);
        // Within the 1 px² guard.
        assert!(!capture.enqueue(Point::new(3.5, 3.5)));
        assert_eq!(capture.pending(), 1);
    }

    #[test]
    fn test_enqueue_without_draft() {
        let mut capture = StrokeCapture::new(1.0);
        assert!(!capture.enqueue(Point::new(10.0, 10.0)));
        assert_eq!(capture.pending(), 0);
    }

    #[test]
    fn test_frame_drains_and_filters() {
        let (mut capture, t0) = started(3.0);
        capture.enqueue(Point::new(2.0, 0.0)); // too close to start once drained
        capture.enqueue(Point::new(4.0, 0.0));
        capture.enqueue(Point::new(10.0, 0.0));

        let batch = capture.consume_frame(t0 + Duration::from_millis(10));
        assert_eq!(batch, FrameBatch { dequeued: 3, appended: 2 });
        assert_eq!(capture.pending(), 0);
        let draft = capture.draft().unwrap();
        assert_eq!(
            draft.points(),
            &[Point::new(0.0, 0.0), Point::new(4.0, 0.0), Point::new(10.0, 0.0)]
        );
        assert_eq!(draft.geometry().anchor_points(), draft.points());
    }

    #[test]
    fn test_velocity_is_throughput() {
        let (mut capture, t0) = started(1.0);
        for i in 1..=4 {
            capture.enqueue(Point::new(i as f64 * 10.0, 0.0));
        }
        capture.consume_frame(t0 + Duration::from_millis(20));
        // 4 points over 20 ms.
        assert!((capture.velocity() - 200.0).abs() < 1e-6);
    }

    #[test]
    fn test_empty_frame_keeps_state() {
        let (mut capture, t0) = started(1.0);
        let batch = capture.consume_frame(t0 + Duration::from_millis(16));
        assert_eq!(batch, FrameBatch::default());
        assert_eq!(capture.velocity(), 0.0);
        assert_eq!(capture.point_count(), 1);
    }

    #[test]
    fn test_finish_drains_queue() {
        let (mut capture, _) = started(1.0);
        capture.enqueue(Point::new(5.0, 0.0));
        let captured = capture.finish().unwrap();
        assert_eq!(captured.points, vec![Point::new(0.0, 0.0), Point::new(5.0, 0.0)]);
        assert!(!capture.is_active());
        assert!(capture.finish().is_none());
    }

    #[test]
    fn test_cancel_discards() {
        let (mut capture, _) = started(1.0);
        capture.enqueue(Point::new(5.0, 0.0));
        capture.cancel();
        assert!(!capture.is_active());
        assert_eq!(capture.pending(), 0);
        assert!(capture.finish().is_none());
    }

    #[test]
    fn test_preview_is_prefix_in_order() {
        let (mut capture, t0) = started(1.0);
        let mut expected = vec![Point::new(0.0, 0.0)];
        for frame in 1..=5u64 {
            for i in 0..3 {
                let p = Point::new((frame * 10 + i) as f64 * 2.0, frame as f64);
                capture.enqueue(p);
                expected.push(p);
            }
            capture.consume_frame(t0 + Duration::from_millis(frame * 16));
            let draft = capture.draft().unwrap();
            assert_eq!(draft.points(), &expected[..]);
        }
    }
}
