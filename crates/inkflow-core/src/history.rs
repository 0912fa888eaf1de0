//! Stroke history with undo/redo.

use crate::stroke::{Stroke, StrokeId};

/// Committed strokes (oldest first) and the strokes undone since the last commit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StrokeHistory {
    committed: Vec<Stroke>,
    redo_stack: Vec<Stroke>,
}

impl StrokeHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a stroke. New edits invalidate anything undone.
    pub fn commit(&mut self, stroke: Stroke) {
        self.committed.push(stroke);
        self.redo_stack.clear();
    }

    /// Move the newest committed stroke to the redo stack.
    /// Returns the moved stroke's id, or `None` if nothing to undo.
    pub fn undo(&mut self) -> Option<StrokeId> {
        let stroke = self.committed.pop()?;
        let id = stroke.id();
        self.redo_stack.push(stroke);
        Some(id)
    }

    /// Move the most recently undone stroke back to the committed list.
    /// Returns the moved stroke's id, or `None` if nothing to redo.
    pub fn redo(&mut self) -> Option<StrokeId> {
        let stroke = self.redo_stack.pop()?;
        let id = stroke.id();
        self.committed.push(stroke);
        Some(id)
    }

    /// Drop every stroke, committed and undone.
    pub fn clear(&mut self) {
        self.committed.clear();
        self.redo_stack.clear();
    }

    /// Check if undo is available.
    pub fn can_undo(&self) -> bool {
        !self.committed.is_empty()
    }

    /// Check if redo is available.
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Committed strokes in commit order.
    pub fn committed(&self) -> &[Stroke] {
        &self.committed
    }

    /// Undone strokes; the last entry is the next to be redone.
    pub fn redo_stack(&self) -> &[Stroke] {
        &self.redo_stack
    }

    pub fn len(&self) -> usize {
        self.committed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.committed.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::build_polyline;
    use crate::style::Brush;
    use kurbo::Point;

    fn stroke(x: f64) -> Stroke {
        Stroke::new(build_polyline(&[Point::new(x, 0.0), Point::new(x, 10.0)]), Brush::default())
    }

    #[test]
    fn test_commit_appends_in_order() {
        let mut history = StrokeHistory::new();
        let (a, b) = (stroke(0.0), stroke(1.0));
        history.commit(a.clone());
        history.commit(b.clone());
        assert_eq!(history.committed(), &[a, b]);
    }

    #[test]
    fn test_undo_then_redo_restores_position() {
        let mut history = StrokeHistory::new();
        for i in 0..3 {
            history.commit(stroke(i as f64));
        }
        let before = history.clone();

        assert!(history.undo().is_some());
        assert_eq!(history.len(), 2);
        assert!(history.can_redo());

        assert!(history.redo().is_some());
        assert_eq!(history, before);
    }

    #[test]
    fn test_commit_clears_redo() {
        let mut history = StrokeHistory::new();
        history.commit(stroke(0.0));
        history.undo();
        assert!(history.can_redo());

        history.commit(stroke(1.0));
        assert!(!history.can_redo());
        let before = history.clone();
        assert!(history.redo().is_none());
        assert_eq!(history, before);
    }

    #[test]
    fn test_undo_empty_stack() {
        let mut history = StrokeHistory::new();
        assert!(!history.can_undo());
        assert!(history.undo().is_none());
        assert!(!history.can_redo());
        assert!(history.redo().is_none());
        assert_eq!(history, StrokeHistory::new());
    }

    #[test]
    fn test_redo_order_is_lifo() {
        let mut history = StrokeHistory::new();
        let (a, b) = (stroke(0.0), stroke(1.0));
        history.commit(a.clone());
        history.commit(b.clone());
        assert_eq!(history.undo(), Some(b.id()));
        assert_eq!(history.undo(), Some(a.id()));
        assert_eq!(history.redo(), Some(a.id()));
        assert_eq!(history.committed(), &[a]);
        assert_eq!(history.redo_stack(), &[b]);
    }

    #[test]
    fn test_clear() {
        let mut history = StrokeHistory::new();
        history.commit(stroke(0.0));
        history.commit(stroke(1.0));
        history.undo();
        history.clear();
        assert!(history.is_empty());
        assert!(history.redo_stack().is_empty());
    }
}
