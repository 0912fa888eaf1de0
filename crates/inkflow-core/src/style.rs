//! Brush style primitives: color, stroke style and tool mode.

use peniko::Color;
use serde::{Deserialize, Serialize};

/// Serializable color representation (RGBA8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl SerializableColor {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn black() -> Self {
        Self::new(0, 0, 0, 255)
    }

    pub fn white() -> Self {
        Self::new(255, 255, 255, 255)
    }

    /// Parse a hex color string (`#rgb`, `#rrggbb`, `#rrggbbaa`).
    ///
    /// Returns `None` for anything else, including non-hex digits.
    pub fn from_hex(color: &str) -> Option<Self> {
        let hex = color.trim().strip_prefix('#')?;
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let byte = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
        match hex.len() {
            3 => {
                // #rgb -> #rrggbb
                let r = byte(0..1)? * 17;
                let g = byte(1..2)? * 17;
                let b = byte(2..3)? * 17;
                Some(Self::new(r, g, b, 255))
            }
            6 => Some(Self::new(byte(0..2)?, byte(2..4)?, byte(4..6)?, 255)),
            8 => Some(Self::new(byte(0..2)?, byte(2..4)?, byte(4..6)?, byte(6..8)?)),
            _ => None,
        }
    }

    /// Parse a hex color, falling back to black for malformed input.
    pub fn parse_or_default(color: &str) -> Self {
        Self::from_hex(color).unwrap_or_else(|| {
            log::warn!("Invalid color {:?}, using black", color);
            Self::black()
        })
    }

    /// Format as `#rrggbbaa`.
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
    }
}

impl Default for SerializableColor {
    fn default() -> Self {
        Self::black()
    }
}

impl From<SerializableColor> for Color {
    fn from(color: SerializableColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

/// Stroke style for freehand ink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrokeStyle {
    #[default]
    Solid,
    Dashed,
    Dotted,
    Heart,
    Flower,
    Star,
}

impl StrokeStyle {
    pub const ALL: [StrokeStyle; 6] = [
        StrokeStyle::Solid,
        StrokeStyle::Dashed,
        StrokeStyle::Dotted,
        StrokeStyle::Heart,
        StrokeStyle::Flower,
        StrokeStyle::Star,
    ];

    /// Lowercase name of this style.
    pub fn name(self) -> &'static str {
        match self {
            StrokeStyle::Solid => "solid",
            StrokeStyle::Dashed => "dashed",
            StrokeStyle::Dotted => "dotted",
            StrokeStyle::Heart => "heart",
            StrokeStyle::Flower => "flower",
            StrokeStyle::Star => "star",
        }
    }

    /// Look up a style by name (case-insensitive).
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|style| style.name().eq_ignore_ascii_case(name))
    }

    /// Look up a style by name, defaulting to solid for unknown names.
    pub fn parse_or_default(name: &str) -> Self {
        Self::from_name(name).unwrap_or_else(|| {
            log::warn!("Unknown stroke style {:?}, using solid", name);
            StrokeStyle::Solid
        })
    }

    /// Whether this style stamps a procedural shape along the path.
    pub fn is_stamped(self) -> bool {
        matches!(self, StrokeStyle::Heart | StrokeStyle::Flower | StrokeStyle::Star)
    }
}

/// Whether a stroke paints ink or erases it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolMode {
    #[default]
    Draw,
    Erase,
}

impl ToolMode {
    pub fn name(self) -> &'static str {
        match self {
            ToolMode::Draw => "draw",
            ToolMode::Erase => "erase",
        }
    }

    /// Look up a mode by name, defaulting to draw for unknown names.
    pub fn parse_or_default(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "draw" => ToolMode::Draw,
            "erase" => ToolMode::Erase,
            _ => {
                log::warn!("Unknown tool mode {:?}, using draw", name);
                ToolMode::Draw
            }
        }
    }

    pub fn is_erase(self) -> bool {
        self == ToolMode::Erase
    }
}

/// The brush settings applied to new strokes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Brush {
    pub color: SerializableColor,
    pub width: f64,
    pub style: StrokeStyle,
    pub mode: ToolMode,
}

impl Default for Brush {
    fn default() -> Self {
        Self {
            color: SerializableColor::black(),
            width: 4.0,
            style: StrokeStyle::Solid,
            mode: ToolMode::Draw,
        }
    }
}

/// Clamp a stroke width into `[min, max]`; non-finite widths fall back to `min`.
pub fn clamp_width(width: f64, min: f64, max: f64) -> f64 {
    if !width.is_finite() {
        log::warn!("Non-finite stroke width {}, using {}", width, min);
        return min;
    }
    let clamped = width.clamp(min, max);
    if clamped != width {
        log::warn!("Stroke width {} clamped to {}", width, clamped);
    }
    clamped
}
