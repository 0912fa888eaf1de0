//! Inkflow Core Library
//!
//! Platform-agnostic freehand ink engine: stroke capture, path smoothing,
//! paint resolution, undo/redo history and scene composition.

pub mod capture;
pub mod config;
pub mod engine;
pub mod export;
pub mod geometry;
pub mod history;
pub mod input;
pub mod paint;
pub mod scheduler;
pub mod stroke;
pub mod style;
pub mod surface;

pub use config::{ConfigError, ConfigResult, EngineConfig, SmoothingConfig};
pub use engine::{EngineEvent, InkEngine};
pub use export::{EncodedImage, ExportError, ExportResult, ExportSink, MemorySink, Rasterizer};
pub use geometry::{build_polyline, build_smooth_spline, Geometry, Segment};
pub use history::StrokeHistory;
pub use input::PointerEvent;
pub use paint::{resolve_paint, resolve_paint_with, Compositing, PaintDescriptor, PathEffect, StampShape};
pub use scheduler::{FrameHandle, FrameScheduler, ManualFrameScheduler};
pub use stroke::{Draft, Stroke, StrokeId};
pub use style::{Brush, SerializableColor, StrokeStyle, ToolMode};
pub use surface::{BaseImage, RenderSurface, Scene};

#[cfg(not(target_arch = "wasm32"))]
pub use export::FileSink;
