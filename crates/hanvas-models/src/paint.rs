//! Paint color and blend mode.

use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};

/// Default foreground color for new trail points.
pub const DEFAULT_PAINT_COLOR: PaintColor = PaintColor::rgb(0x6f, 0xa8, 0xe6);

/// An RGBA8 paint color, written as `#rrggbb` (or `#rrggbbaa`) on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PaintColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl PaintColor {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 0xFF }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Parse `#rrggbb` or `#rrggbbaa`. The leading `#` is optional.
    pub fn parse_hex(value: &str) -> ModelResult<Self> {
        let hex = value.trim();
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if !(hex.len() == 6 || hex.len() == 8) || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ModelError::InvalidColor(value.to_string()));
        }

        let channel = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .map_err(|_| ModelError::InvalidColor(value.to_string()))
        };

        let a = if hex.len() == 8 { channel(6)? } else { 0xFF };
        Ok(Self::rgba(channel(0)?, channel(2)?, channel(4)?, a))
    }

    /// Lowercase hex form; alpha is omitted when opaque.
    pub fn to_hex(&self) -> String {
        if self.a == 0xFF {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }

    pub fn to_array(&self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl Default for PaintColor {
    fn default() -> Self {
        DEFAULT_PAINT_COLOR
    }
}

impl FromStr for PaintColor {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_hex(s)
    }
}

impl TryFrom<String> for PaintColor {
    type Error = ModelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse_hex(&value)
    }
}

impl From<PaintColor> for String {
    fn from(color: PaintColor) -> Self {
        color.to_hex()
    }
}

impl std::fmt::Display for PaintColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Compositing rule used when color mixing is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum BlendMode {
    /// Additive-screen: overlaps get lighter.
    #[default]
    Screen,
    /// Overlaps get darker, like layered ink.
    Multiply,
    /// Straight additive, clamped.
    Lighter,
}

impl BlendMode {
    pub const ALL: [BlendMode; 3] = [BlendMode::Screen, BlendMode::Multiply, BlendMode::Lighter];

    pub fn as_str(&self) -> &'static str {
        match self {
            BlendMode::Screen => "screen",
            BlendMode::Multiply => "multiply",
            BlendMode::Lighter => "lighter",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "screen" => Some(BlendMode::Screen),
            "multiply" => Some(BlendMode::Multiply),
            "lighter" | "add" | "additive" => Some(BlendMode::Lighter),
            _ => None,
        }
    }

    /// Next mode in the cycle order.
    pub fn next(&self) -> Self {
        match self {
            BlendMode::Screen => BlendMode::Multiply,
            BlendMode::Multiply => BlendMode::Lighter,
            BlendMode::Lighter => BlendMode::Screen,
        }
    }
}

impl std::fmt::Display for BlendMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
