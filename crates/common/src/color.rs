use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Errors from parsing a color literal.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ColorError {
    #[error("color must be 6 hex digits prefixed with '#' or '0x', got {0:?}")]
    Format(String),
    #[error("invalid hex digits in color {0:?}")]
    Digits(String),
}

/// RGB color in sRGB space, channels in `[0, 1]`.
///
/// Serialized as a hex string (`"#1a237e"`), which is how scene files
/// spell colors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Build from a packed `0xRRGGBB` value.
    pub fn from_u32(hex: u32) -> Self {
        let channel = |shift: u32| ((hex >> shift) & 0xff) as f32 / 255.0;
        Self::rgb(channel(16), channel(8), channel(0))
    }

    pub fn to_u32(self) -> u32 {
        let channel = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u32;
        (channel(self.r) << 16) | (channel(self.g) << 8) | channel(self.b)
    }

    /// Convert to linear RGB for shading.
    pub fn to_linear(self) -> [f32; 3] {
        [
            srgb_to_linear(self.r),
            srgb_to_linear(self.g),
            srgb_to_linear(self.b),
        ]
    }
}

fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

impl FromStr for Color {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_prefix('#')
            .or_else(|| trimmed.strip_prefix("0x"))
            .ok_or_else(|| ColorError::Format(s.to_string()))?;
        if digits.len() != 6 {
            return Err(ColorError::Format(s.to_string()));
        }
        let hex =
            u32::from_str_radix(digits, 16).map_err(|_| ColorError::Digits(s.to_string()))?;
        Ok(Self::from_u32(hex))
    }
}

impl TryFrom<String> for Color {
    type Error = ColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06x}", self.to_u32())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hash_and_0x_forms() {
        let a: Color = "#1a237e".parse().unwrap();
        let b: Color = "0x1a237e".parse().unwrap();
        assert_eq!(a, b);
        assert_eq!(a.to_u32(), 0x1a237e);
        assert_eq!(a.to_string(), "#1a237e");
    }

    #[test]
    fn rejects_malformed() {
        assert!(matches!("1a237e".parse::<Color>(), Err(ColorError::Format(_))));
        assert!(matches!("#1a23".parse::<Color>(), Err(ColorError::Format(_))));
        assert!(matches!("#zz237e".parse::<Color>(), Err(ColorError::Digits(_))));
    }

    #[test]
    fn linear_conversion_endpoints() {
        assert_eq!(Color::BLACK.to_linear(), [0.0, 0.0, 0.0]);
        for c in Color::WHITE.to_linear() {
            assert!((c - 1.0).abs() < 1e-5);
        }
        let navy = Color::from_u32(0x1a237e).to_linear();
        assert!(navy[2] > navy[1] && navy[1] > navy[0]);
    }

    #[test]
    fn serde_uses_hex_strings() {
        let json = serde_json::to_string(&Color::from_u32(0x000000)).unwrap();
        assert_eq!(json, "\"#000000\"");
        let back: Color = serde_json::from_str("\"#1a237e\"").unwrap();
        assert_eq!(back.to_u32(), 0x1a237e);
        assert!(serde_json::from_str::<Color>("\"navy\"").is_err());
    }
}
