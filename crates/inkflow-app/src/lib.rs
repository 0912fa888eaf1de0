//! Inkflow Application
//!
//! Headless shell around the ink engine: replays a recorded drawing script
//! and exports the result as a PNG.

mod replay;
mod script;

pub use replay::Replay;
pub use script::{Command, Script, SurfaceSpec};

use inkflow_core::{ConfigError, EngineConfig, ExportError, FileSink};
use inkflow_render::{load_base_image, RendererError, SkiaRasterizer};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Application errors.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Usage: {0}")]
    Usage(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Invalid script: {0}")]
    Script(String),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Render(#[from] RendererError),
    #[error(transparent)]
    Export(#[from] ExportError),
}

/// Replay the script at `script_path` and export the drawing.
///
/// Returns the path of the written image.
pub fn run(script_path: &Path, config_path: Option<&Path>) -> Result<PathBuf, AppError> {
    let config = match config_path {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    let script = Script::load(script_path)?;
    let script_dir = script_path.parent().unwrap_or_else(|| Path::new("."));

    let mut replay = Replay::for_script(config.clone(), &script);
    if let Some(base) = &script.base_image {
        let image = load_base_image(&script_dir.join(base))?;
        replay.engine_mut().set_base_image(Some(image));
    }
    replay.run(&script.commands);
    if replay.engine().is_drawing() {
        log::warn!("Script ended with the pointer down; finishing the stroke");
        replay.engine_mut().on_end();
    }

    let sink = match &script.output_dir {
        Some(dir) => FileSink::new(script_dir.join(dir))?,
        None => FileSink::default_location()?,
    };
    let rasterizer = SkiaRasterizer::new().with_background(config.export_background);
    let image = pollster::block_on(replay.engine().export(&rasterizer, &sink, &script.output))?;

    Ok(sink.image_path(&script.output, &image))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    const SCRIPT: &str = r##"{
        "surface": {"width": 64, "height": 32},
        "commands": [
            {"op": "color", "value": "#ff0000"},
            {"op": "down", "x": 4, "y": 16},
            {"op": "move", "x": 20, "y": 16},
            {"op": "frame"},
            {"op": "move", "x": 60, "y": 16},
            {"op": "up"}
        ],
        "output_dir": "out",
        "output": "line"
    }"##;

    #[test]
    fn test_run_writes_png() {
        let dir = tempdir().unwrap();
        let script_path = dir.path().join("script.json");
        fs::write(&script_path, SCRIPT).unwrap();

        let output = run(&script_path, None).unwrap();
        assert_eq!(output, dir.path().join("out").join("line.png"));

        let bytes = fs::read(&output).unwrap();
        assert_eq!(&bytes[..4], &[0x89, b'P', b'N', b'G']);
    }

    #[test]
    fn test_run_with_config() {
        let dir = tempdir().unwrap();
        let script_path = dir.path().join("script.json");
        let config_path = dir.path().join("config.json");
        fs::write(&script_path, SCRIPT).unwrap();
        fs::write(&config_path, r#"{"max_width": 20.0}"#).unwrap();

        assert!(run(&script_path, Some(&config_path)).is_ok());
    }

    #[test]
    fn test_run_reports_bad_config() {
        let dir = tempdir().unwrap();
        let script_path = dir.path().join("script.json");
        let config_path = dir.path().join("config.json");
        fs::write(&script_path, SCRIPT).unwrap();
        fs::write(&config_path, r#"{"min_width": 10.0, "max_width": 1.0}"#).unwrap();

        let result = run(&script_path, Some(&config_path));
        assert!(matches!(result, Err(AppError::Config(ConfigError::Invalid(_)))));
    }

    #[test]
    fn test_run_missing_script() {
        let dir = tempdir().unwrap();
        let result = run(&dir.path().join("missing.json"), None);
        assert!(matches!(result, Err(AppError::Io(_))));
    }

    #[test]
    fn test_run_missing_base_image() {
        let dir = tempdir().unwrap();
        let script_path = dir.path().join("script.json");
        fs::write(&script_path, r#"{"base_image": "nope.png", "output_dir": "out"}"#).unwrap();

        let result = run(&script_path, None);
        assert!(matches!(result, Err(AppError::Render(_))));
    }
}
