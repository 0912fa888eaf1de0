//! Drives an engine from a script with a synthetic clock.

use crate::script::{Command, Script};
use inkflow_core::{
    EngineConfig, InkEngine, ManualFrameScheduler, SerializableColor, StrokeStyle, ToolMode,
};
use kurbo::{Point, Size};
use std::time::{Duration, Instant};

/// Replays commands against an [`InkEngine`].
///
/// Time only advances on `frame` commands, so velocity and smoothing are
/// reproducible across runs.
pub struct Replay {
    engine: InkEngine,
    frames: ManualFrameScheduler,
    clock: Instant,
    frame_interval: Duration,
}

impl Replay {
    pub fn new(config: EngineConfig, frame_interval: Duration) -> Self {
        let frames = ManualFrameScheduler::new();
        Self {
            engine: InkEngine::new(config, frames.clone()),
            frames,
            clock: Instant::now(),
            frame_interval,
        }
    }

    /// Replay set up for `script`'s surface and frame interval.
    pub fn for_script(config: EngineConfig, script: &Script) -> Self {
        let mut replay = Self::new(config, Duration::from_millis(script.frame_interval_ms));
        if let Some(surface) = script.surface {
            replay
                .engine
                .set_surface_size(Size::new(surface.width, surface.height));
        }
        replay
    }

    pub fn apply(&mut self, command: &Command) {
        log::trace!("Replaying {:?}", command);
        match command {
            Command::Down { x, y } => self.engine.on_start_at(Point::new(*x, *y), self.clock),
            Command::Move { x, y } => {
                self.engine.on_move(Point::new(*x, *y));
            }
            Command::Up => {
                self.engine.on_end();
            }
            Command::Frame => self.frame(),
            Command::Undo => {
                self.engine.undo();
            }
            Command::Redo => {
                self.engine.redo();
            }
            Command::Clear => self.engine.clear(),
            Command::Color { value } => self
                .engine
                .set_color(SerializableColor::parse_or_default(value)),
            Command::Width { value } => self.engine.set_width(*value),
            Command::Style { value } => self.engine.set_style(StrokeStyle::parse_or_default(value)),
            Command::Tool { value } => self.engine.set_tool_mode(ToolMode::parse_or_default(value)),
        }
    }

    pub fn run(&mut self, commands: &[Command]) {
        for command in commands {
            self.apply(command);
        }
    }

    /// Advance the clock by one refresh and run whatever frame is due.
    pub fn frame(&mut self) {
        self.clock += self.frame_interval;
        if let Some(handle) = self.frames.take_due() {
            self.engine.on_frame_at(handle, self.clock);
        }
    }

    pub fn engine(&self) -> &InkEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut InkEngine {
        &mut self.engine
    }
}
