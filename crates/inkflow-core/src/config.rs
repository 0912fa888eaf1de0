//! Engine configuration.
//!
//! All tunables of the capture loop, the smoothing fit and the paint
//! resolver live here. Every field has a default, so partial JSON files
//! are accepted.

use crate::style::{clamp_width, Brush, SerializableColor};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Constants of the commit-time smoothing factor.
///
/// `factor = clamp(width / base_divisor, base_min, base_max)
///         * clamp(velocity_numerator / (velocity + velocity_offset), velocity_min, velocity_max)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmoothingConfig {
    pub base_divisor: f64,
    pub base_min: f64,
    pub base_max: f64,
    pub velocity_numerator: f64,
    pub velocity_offset: f64,
    pub velocity_min: f64,
    pub velocity_max: f64,
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self {
            base_divisor: 20.0,
            base_min: 0.1,
            base_max: 0.5,
            velocity_numerator: 500.0,
            velocity_offset: 200.0,
            velocity_min: 0.1,
            velocity_max: 0.9,
        }
    }
}

impl SmoothingConfig {
    /// Smoothing factor for a stroke of `width` committed at `velocity`.
    pub fn factor(&self, width: f64, velocity: f64) -> f64 {
        let base = (width / self.base_divisor).clamp(self.base_min, self.base_max);
        let velocity = if velocity.is_finite() { velocity.max(0.0) } else { 0.0 };
        let velocity_factor = (self.velocity_numerator / (velocity + self.velocity_offset))
            .clamp(self.velocity_min, self.velocity_max);
        base * velocity_factor
    }
}

/// Engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Squared distance a raw move must exceed to be enqueued (px²).
    pub move_guard_sq: f64,
    /// Lower bound of the per-frame minimum-distance filter (px).
    pub min_distance_floor: f64,
    /// Upper bound of the per-frame minimum-distance filter (px).
    pub min_distance_ceiling: f64,
    /// The filter threshold is `width / min_distance_divisor`, clamped.
    pub min_distance_divisor: f64,
    /// Maximum number of points fed to the spline fit.
    pub max_spline_points: usize,
    /// Smoothing factor constants.
    pub smoothing: SmoothingConfig,
    /// Smallest accepted stroke width.
    pub min_width: f64,
    /// Largest accepted stroke width.
    pub max_width: f64,
    /// Brush in effect when the engine starts.
    pub default_brush: Brush,
    /// Show the eraser-size cursor while erasing.
    pub show_eraser_cursor: bool,
    /// Surface size used when no base image is set.
    pub surface_width: u32,
    pub surface_height: u32,
    /// Background painted under everything on export when there is no base image.
    pub export_background: SerializableColor,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            move_guard_sq: 1.0,
            min_distance_floor: 1.0,
            min_distance_ceiling: 5.0,
            min_distance_divisor: 4.0,
            max_spline_points: 100,
            smoothing: SmoothingConfig::default(),
            min_width: 0.5,
            max_width: 100.0,
            default_brush: Brush::default(),
            show_eraser_cursor: true,
            surface_width: 1024,
            surface_height: 768,
            export_background: SerializableColor::white(),
        }
    }
}

impl EngineConfig {
    /// Parse a configuration from JSON.
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            ConfigError::Io(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_json(&json)
    }

    /// Reject ranges that cannot be satisfied.
    pub fn validate(&self) -> ConfigResult<()> {
        if !(self.min_width > 0.0 && self.min_width <= self.max_width) {
            return Err(ConfigError::Invalid(format!(
                "width range {}..{} is empty",
                self.min_width, self.max_width
            )));
        }
        if self.min_distance_floor > self.min_distance_ceiling {
            return Err(ConfigError::Invalid(format!(
                "min distance range {}..{} is empty",
                self.min_distance_floor, self.min_distance_ceiling
            )));
        }
        if self.min_distance_divisor <= 0.0 {
            return Err(ConfigError::Invalid("min_distance_divisor must be positive".into()));
        }
        if self.max_spline_points < 2 {
            return Err(ConfigError::Invalid("max_spline_points must be at least 2".into()));
        }
        let s = &self.smoothing;
        if s.base_divisor <= 0.0 || s.base_min > s.base_max || s.velocity_min > s.velocity_max {
            return Err(ConfigError::Invalid("smoothing ranges are inconsistent".into()));
        }
        Ok(())
    }

    /// Clamp a requested stroke width into `min_width..=max_width`.
    pub fn clamp_width(&self, width: f64) -> f64 {
        clamp_width(width, self.min_width, self.max_width)
    }

    /// Minimum distance between appended points for a stroke of `width`.
    pub fn min_distance(&self, width: f64) -> f64 {
        (width / self.min_distance_divisor).clamp(self.min_distance_floor, self.min_distance_ceiling)
    }
}
