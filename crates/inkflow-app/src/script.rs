//! Replay script format.
//!
//! ```json
//! {
//!   "surface": { "width": 400, "height": 300 },
//!   "base_image": "photo.png",
//!   "commands": [
//!     { "op": "color", "value": "#e11d48" },
//!     { "op": "down", "x": 10, "y": 10 },
//!     { "op": "move", "x": 60, "y": 40 },
//!     { "op": "frame" },
//!     { "op": "up" }
//!   ],
//!   "output_dir": "out",
//!   "output": "drawing"
//! }
//! ```

use crate::AppError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Surface size used when there is no base image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurfaceSpec {
    pub width: f64,
    pub height: f64,
}

/// One scripted input or tool command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Command {
    Down { x: f64, y: f64 },
    Move { x: f64, y: f64 },
    Up,
    /// One display refresh.
    Frame,
    Undo,
    Redo,
    Clear,
    Color { value: String },
    Width { value: f64 },
    Style { value: String },
    Tool { value: String },
}

fn default_frame_interval_ms() -> u64 {
    16
}

fn default_output() -> String {
    "inkflow".to_string()
}

/// A recorded drawing session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Script {
    #[serde(default)]
    pub surface: Option<SurfaceSpec>,
    /// Base image path, relative to the script file.
    #[serde(default)]
    pub base_image: Option<String>,
    /// Synthetic time between frames.
    #[serde(default = "default_frame_interval_ms")]
    pub frame_interval_ms: u64,
    #[serde(default)]
    pub commands: Vec<Command>,
    /// Export directory, relative to the script file. Defaults to the
    /// platform data directory.
    #[serde(default)]
    pub output_dir: Option<String>,
    /// Export file stem.
    #[serde(default = "default_output")]
    pub output: String,
}

impl Script {
    pub fn from_json(json: &str) -> Result<Self, AppError> {
        serde_json::from_str(json).map_err(|e| AppError::Script(e.to_string()))
    }

    pub fn load(path: &Path) -> Result<Self, AppError> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| AppError::Io(format!("Failed to read {}: {}", path.display(), e)))?;
        Self::from_json(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_script() {
        let script = Script::from_json(r#"{"commands": [{"op": "down", "x": 1, "y": 2}, {"op": "up"}]}"#)
            .unwrap();
        assert_eq!(script.commands, vec![Command::Down { x: 1.0, y: 2.0 }, Command::Up]);
        assert_eq!(script.output, "inkflow");
        assert_eq!(script.frame_interval_ms, 16);
        assert!(script.surface.is_none());
    }

    #[test]
    fn test_parse_tool_commands() {
        let script = Script::from_json(
            r##"{
                "surface": {"width": 100, "height": 50},
                "commands": [
                    {"op": "color", "value": "#00ff00"},
                    {"op": "width", "value": 12.5},
                    {"op": "style", "value": "heart"},
                    {"op": "tool", "value": "erase"},
                    {"op": "frame"},
                    {"op": "undo"},
                    {"op": "redo"},
                    {"op": "clear"}
                ],
                "output": "tools"
            }"##,
        )
        .unwrap();
        assert_eq!(script.surface, Some(SurfaceSpec { width: 100.0, height: 50.0 }));
        assert_eq!(script.commands.len(), 8);
        assert_eq!(script.commands[1], Command::Width { value: 12.5 });
    }

    #[test]
    fn test_unknown_op_is_script_error() {
        let result = Script::from_json(r#"{"commands": [{"op": "teleport"}]}"#);
        assert!(matches!(result, Err(AppError::Script(_))));
    }
}
