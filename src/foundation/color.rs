use crate::foundation::error::{FlowError, FlowResult};
use serde::{Deserialize, Serialize};

/// Straight-alpha RGBA color with channels in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Color {
    /// Red channel.
    pub r: f64,
    /// Green channel.
    pub g: f64,
    /// Blue channel.
    pub b: f64,
    /// Alpha channel.
    pub a: f64,
}

impl Color {
    /// Build a color from channels in `[0, 1]`.
    pub fn rgba(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque color from 8-bit channels.
    pub fn rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(
            f64::from(r) / 255.0,
            f64::from(g) / 255.0,
            f64::from(b) / 255.0,
            1.0,
        )
    }

    /// Parse `#RGB`, `#RRGGBB`, `#RRGGBBAA` or a named color (case-insensitive).
    pub fn parse(s: &str) -> FlowResult<Self> {
        let s = s.trim();
        if let Some(hex) = s.strip_prefix('#') {
            return parse_hex(hex).map_err(FlowError::validation);
        }
        named(s).ok_or_else(|| FlowError::validation(format!("unknown color \"{s}\"")))
    }

    /// Quantize to 8-bit channels, e.g. for stable fingerprints.
    pub fn to_rgba8(self) -> [u8; 4] {
        fn to_u8(x: f64) -> u8 {
            (x.clamp(0.0, 1.0) * 255.0).round() as u8
        }
        [to_u8(self.r), to_u8(self.g), to_u8(self.b), to_u8(self.a)]
    }
}

impl std::str::FromStr for Color {
    type Err = FlowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Str(String),
            RgbaObj {
                r: f64,
                g: f64,
                b: f64,
                #[serde(default = "one")]
                a: f64,
            },
        }

        fn one() -> f64 {
            1.0
        }

        match Repr::deserialize(deserializer)? {
            Repr::Str(s) => Self::parse(&s).map_err(serde::de::Error::custom),
            Repr::RgbaObj { r, g, b, a } => Ok(Self::rgba(r, g, b, a)),
        }
    }
}

fn parse_hex(s: &str) -> Result<Color, String> {
    fn hex_byte(pair: &str) -> Result<u8, String> {
        u8::from_str_radix(pair, 16).map_err(|_| format!("invalid hex byte \"{pair}\""))
    }

    if !s.is_ascii() {
        return Err(format!("invalid hex color \"#{s}\""));
    }

    let (r, g, b, a) = match s.len() {
        3 => {
            let r = hex_byte(&s[0..1].repeat(2))?;
            let g = hex_byte(&s[1..2].repeat(2))?;
            let b = hex_byte(&s[2..3].repeat(2))?;
            (r, g, b, 255)
        }
        6 => (
            hex_byte(&s[0..2])?,
            hex_byte(&s[2..4])?,
            hex_byte(&s[4..6])?,
            255,
        ),
        8 => (
            hex_byte(&s[0..2])?,
            hex_byte(&s[2..4])?,
            hex_byte(&s[4..6])?,
            hex_byte(&s[6..8])?,
        ),
        _ => {
            return Err("hex color must be #RGB, #RRGGBB or #RRGGBBAA".to_owned());
        }
    };

    Ok(Color::rgba(
        f64::from(r) / 255.0,
        f64::from(g) / 255.0,
        f64::from(b) / 255.0,
        f64::from(a) / 255.0,
    ))
}

fn named(s: &str) -> Option<Color> {
    let c = match s.to_ascii_lowercase().as_str() {
        "transparent" => return Some(Color::rgba(0.0, 0.0, 0.0, 0.0)),
        "black" => Color::rgb8(0, 0, 0),
        "white" => Color::rgb8(255, 255, 255),
        "red" => Color::rgb8(255, 0, 0),
        "green" => Color::rgb8(0, 128, 0),
        "blue" => Color::rgb8(0, 0, 255),
        "gold" => Color::rgb8(255, 215, 0),
        "darkred" => Color::rgb8(139, 0, 0),
        "gray" | "grey" => Color::rgb8(128, 128, 128),
        _ => return None,
    };
    Some(c)
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/color.rs"]
mod tests;
