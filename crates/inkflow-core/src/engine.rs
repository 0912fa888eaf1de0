//! The ink engine: one authoritative state object behind the boundary API.
//!
//! All calls are synchronous and expected from the thread that owns input
//! events. Renderers subscribe for notifications instead of the engine
//! reaching into them.

use crate::capture::StrokeCapture;
use crate::config::EngineConfig;
use crate::export::{export_scene, BoxFuture, EncodedImage, ExportResult, ExportSink, Rasterizer};
use crate::geometry::build_smooth_spline;
use crate::history::StrokeHistory;
use crate::input::PointerEvent;
use crate::scheduler::{FrameHandle, FrameScheduler};
use crate::stroke::{Draft, Stroke, StrokeId};
use crate::style::{Brush, SerializableColor, StrokeStyle, ToolMode};
use crate::surface::{BaseImage, RenderSurface, Scene};
use kurbo::{Point, Size};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::time::Instant;

/// Notifications sent to subscribers.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// The draft preview changed; `points` is its accepted point count.
    DraftUpdated { points: usize },
    /// A draft was finalized into the history.
    StrokeCommitted { id: StrokeId },
    /// A draft ended without points and was dropped.
    StrokeDiscarded,
    /// Undo/redo availability may have changed.
    HistoryChanged { can_undo: bool, can_redo: bool },
    /// Everything was cleared.
    Cleared,
    /// Color, width or style changed.
    BrushChanged(Brush),
    ToolModeChanged(ToolMode),
}

/// Freehand ink engine.
pub struct InkEngine {
    config: EngineConfig,
    brush: Brush,
    capture: StrokeCapture,
    history: StrokeHistory,
    surface: RenderSurface,
    scheduler: Box<dyn FrameScheduler>,
    /// The single outstanding frame request.
    pending_frame: Option<FrameHandle>,
    /// The most recently executed frame request.
    last_run_frame: Option<FrameHandle>,
    subscribers: Vec<Sender<EngineEvent>>,
}

impl InkEngine {
    /// Create an engine with the given configuration and frame scheduler.
    pub fn new(config: EngineConfig, scheduler: impl FrameScheduler + 'static) -> Self {
        let mut brush = config.default_brush;
        brush.width = config.clamp_width(brush.width);
        let surface = RenderSurface::new(
            Size::new(config.surface_width as f64, config.surface_height as f64),
            config.show_eraser_cursor,
        );
        Self {
            capture: StrokeCapture::new(config.move_guard_sq),
            history: StrokeHistory::new(),
            brush,
            surface,
            scheduler: Box::new(scheduler),
            pending_frame: None,
            last_run_frame: None,
            subscribers: Vec::new(),
            config,
        }
    }

    // --- Notifications ---

    /// Subscribe to engine notifications. Dropped receivers are pruned on
    /// the next send.
    pub fn subscribe(&mut self) -> Receiver<EngineEvent> {
        let (tx, rx) = channel();
        self.subscribers.push(tx);
        rx
    }

    fn emit(&mut self, event: EngineEvent) {
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }

    fn emit_history(&mut self) {
        let event = EngineEvent::HistoryChanged {
            can_undo: self.history.can_undo(),
            can_redo: self.history.can_redo(),
        };
        self.emit(event);
    }

    // --- Frame scheduling ---

    fn schedule_frame(&mut self) {
        if self.pending_frame.is_none() {
            self.pending_frame = Some(self.scheduler.request_frame());
        }
    }

    fn cancel_frame(&mut self) {
        if let Some(handle) = self.pending_frame.take() {
            self.scheduler.cancel_frame(handle);
        }
    }

    // --- Stroke lifecycle ---

    /// Pointer down.
    pub fn on_start(&mut self, point: Point) {
        self.on_start_at(point, Instant::now());
    }

    /// Pointer down at an explicit time.
    pub fn on_start_at(&mut self, point: Point, now: Instant) {
        if !point.is_finite() {
            log::warn!("Ignoring pointer down at non-finite position {:?}", point);
            return;
        }
        if self.capture.is_active() {
            log::warn!("Pointer down while a stroke is active; dropping the previous draft");
            self.capture.cancel();
            self.emit(EngineEvent::StrokeDiscarded);
        }

        let min_distance = self.config.min_distance(self.brush.width);
        self.capture.start(point, self.brush, min_distance, now);
        self.surface.set_pointer(Some(point));
        self.schedule_frame();

        log::debug!(
            "Stroke started at ({:.1}, {:.1}) with {} {} width {:.1}",
            point.x,
            point.y,
            self.brush.mode.name(),
            self.brush.style.name(),
            self.brush.width
        );
        self.emit(EngineEvent::DraftUpdated { points: 1 });
    }

    /// Pointer move. Returns whether the sample was queued.
    pub fn on_move(&mut self, point: Point) -> bool {
        if !point.is_finite() {
            log::warn!("Ignoring pointer move to non-finite position {:?}", point);
            return false;
        }
        if !self.capture.is_active() {
            return false;
        }
        self.surface.set_pointer(Some(point));
        self.capture.enqueue(point)
    }

    /// Pointer up: finalize the draft, or discard it if it has no points.
    ///
    /// Any pending frame callback is cancelled first, so nothing scheduled
    /// can touch the stroke afterwards.
    pub fn on_end(&mut self) -> Option<StrokeId> {
        self.cancel_frame();
        self.surface.set_pointer(None);
        if !self.capture.is_active() {
            return None;
        }

        let Some(captured) = self.capture.finish() else {
            log::debug!("Discarding empty stroke");
            self.emit(EngineEvent::StrokeDiscarded);
            return None;
        };

        let smoothing = self
            .config
            .smoothing
            .factor(captured.brush.width, captured.velocity);
        let geometry = build_smooth_spline(
            &captured.points,
            smoothing,
            self.config.max_spline_points,
        );
        let stroke = Stroke::new(geometry, captured.brush);
        let id = stroke.id();
        log::debug!(
            "Committed stroke {} ({} points, {} segments, velocity {:.1}, smoothing {:.3})",
            id,
            captured.points.len(),
            stroke.geometry().len(),
            captured.velocity,
            smoothing
        );
        self.history.commit(stroke);

        self.emit(EngineEvent::StrokeCommitted { id });
        self.emit_history();
        Some(id)
    }

    /// Per-frame consumer.
    pub fn on_frame(&mut self, handle: FrameHandle) {
        self.on_frame_at(handle, Instant::now());
    }

    /// Per-frame consumer at an explicit time.
    ///
    /// Only the outstanding handle is honored. Cancelled handles are
    /// ignored; running the same handle twice is a scheduler bug.
    pub fn on_frame_at(&mut self, handle: FrameHandle, now: Instant) {
        if self.last_run_frame == Some(handle) {
            debug_assert!(false, "frame callback {} ran twice", handle.id());
            log::error!("Frame callback {} ran twice; ignoring", handle.id());
            return;
        }
        if self.pending_frame != Some(handle) {
            log::trace!("Ignoring stale frame callback {}", handle.id());
            return;
        }
        self.pending_frame = None;
        self.last_run_frame = Some(handle);

        let batch = self.capture.consume_frame(now);
        if batch.dequeued > 0 {
            log::trace!(
                "Frame {}: dequeued {}, appended {}, velocity {:.1} pt/s",
                handle.id(),
                batch.dequeued,
                batch.appended,
                self.capture.velocity()
            );
        }
        if batch.appended > 0 {
            let points = self.capture.point_count();
            self.emit(EngineEvent::DraftUpdated { points });
        }

        if self.capture.is_active() {
            self.schedule_frame();
        }
    }

    /// Dispatch a pointer event onto the lifecycle calls.
    pub fn handle_pointer_event(&mut self, event: PointerEvent) {
        self.handle_pointer_event_at(event, Instant::now());
    }

    pub fn handle_pointer_event_at(&mut self, event: PointerEvent, now: Instant) {
        match event {
            PointerEvent::Down { position } => self.on_start_at(position, now),
            PointerEvent::Move { position } => {
                self.on_move(position);
            }
            PointerEvent::Up => {
                self.on_end();
            }
        }
    }

    // --- History ---

    /// Move the newest committed stroke to the redo stack.
    pub fn undo(&mut self) -> Option<StrokeId> {
        let id = self.history.undo()?;
        log::debug!("Undo stroke {}", id);
        self.emit_history();
        Some(id)
    }

    /// Move the newest undone stroke back to the committed list.
    pub fn redo(&mut self) -> Option<StrokeId> {
        let id = self.history.redo()?;
        log::debug!("Redo stroke {}", id);
        self.emit_history();
        Some(id)
    }

    /// Empty the history and drop any active draft.
    pub fn clear(&mut self) {
        self.cancel_frame();
        self.capture.cancel();
        self.surface.set_pointer(None);
        self.history.clear();
        log::debug!("Cleared all strokes");
        self.emit(EngineEvent::Cleared);
        self.emit_history();
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    // --- Brush ---

    /// Set the color for subsequent strokes.
    pub fn set_color(&mut self, color: SerializableColor) {
        self.brush.color = color;
        self.emit(EngineEvent::BrushChanged(self.brush));
    }

    /// Set the width for subsequent strokes, clamped to the configured range.
    pub fn set_width(&mut self, width: f64) {
        self.brush.width = self.config.clamp_width(width);
        self.emit(EngineEvent::BrushChanged(self.brush));
    }

    pub fn set_style(&mut self, style: StrokeStyle) {
        self.brush.style = style;
        self.emit(EngineEvent::BrushChanged(self.brush));
    }

    /// Switch between drawing and erasing. Committed strokes keep their own mode.
    pub fn set_tool_mode(&mut self, mode: ToolMode) {
        if self.brush.mode != mode {
            self.brush.mode = mode;
            self.emit(EngineEvent::ToolModeChanged(mode));
        }
    }

    pub fn brush(&self) -> Brush {
        self.brush
    }

    // --- Surface ---

    /// Replace the base image. The surface adopts its size.
    pub fn set_base_image(&mut self, base: Option<BaseImage>) {
        self.surface.set_base_image(base);
    }

    /// Surface size used when there is no base image.
    pub fn set_surface_size(&mut self, size: Size) {
        self.surface.set_fallback_size(size);
    }

    pub fn surface(&self) -> &RenderSurface {
        &self.surface
    }

    /// Compose the live scene, cursor included.
    pub fn scene(&self) -> Scene {
        self.surface.compose(
            self.history.committed(),
            self.capture.draft(),
            self.brush.mode,
            self.brush.width,
        )
    }

    // --- Export ---

    /// Rasterize a cursor-free snapshot and write it to `sink`.
    ///
    /// The snapshot is taken now; the returned future owns it and may be
    /// dropped to cancel. Failures leave the history untouched.
    pub fn export<'a>(
        &self,
        rasterizer: &'a dyn Rasterizer,
        sink: &'a dyn ExportSink,
        destination: &'a str,
    ) -> BoxFuture<'a, ExportResult<EncodedImage>> {
        let snapshot = self.scene().without_cursor();
        let strokes = self.history.len();
        Box::pin(async move {
            match export_scene(snapshot, rasterizer, sink, destination).await {
                Ok(image) => {
                    log::info!(
                        "Exported {} strokes as {}x{} image to {}",
                        strokes,
                        image.width,
                        image.height,
                        destination
                    );
                    Ok(image)
                }
                Err(e) => {
                    log::error!("Export to {} failed: {}", destination, e);
                    Err(e)
                }
            }
        })
    }

    // --- Inspection ---

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn history(&self) -> &StrokeHistory {
        &self.history
    }

    /// Committed strokes, oldest first.
    pub fn committed(&self) -> &[Stroke] {
        self.history.committed()
    }

    pub fn redo_stack(&self) -> &[Stroke] {
        self.history.redo_stack()
    }

    pub fn draft(&self) -> Option<&Draft> {
        self.capture.draft()
    }

    /// Whether a stroke is being drawn.
    pub fn is_drawing(&self) -> bool {
        self.capture.is_active()
    }

    /// Raw samples queued for the next frame.
    pub fn pending_points(&self) -> usize {
        self.capture.pending()
    }

    pub fn pending_frame(&self) -> Option<FrameHandle> {
        self.pending_frame
    }

    /// Current throughput estimate of the active stroke.
    pub fn velocity(&self) -> f64 {
        self.capture.velocity()
    }
}
