//! CSS color parsing and dimming.
//!
//! Colors travel through the engine as the strings the renderer understands.
//! Only dimming needs the channels: the base color is split into R/G/B and
//! re-encoded as `rgba(r,g,b,opacity)`.

use std::str::FromStr;

use log::debug;
use thiserror::Error;

/// Channels used when a base color cannot be parsed (`#ccc`).
const FALLBACK_DIM: Rgb = Rgb {
    r: 204,
    g: 204,
    b: 204,
};

/// An opaque sRGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Re-encode with an alpha channel.
    pub fn with_alpha(self, alpha: f32) -> String {
        let alpha = if alpha.is_finite() {
            alpha.clamp(0.0, 1.0)
        } else {
            1.0
        };
        format!("rgba({},{},{},{})", self.r, self.g, self.b, alpha)
    }
}

/// Error returned when a string is not a supported color.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unsupported color: {0}")]
pub struct ParseColorError(pub String);

impl FromStr for Rgb {
    type Err = ParseColorError;

    /// Accepts `#rgb`, `#rrggbb`, `rgb(r,g,b)` and `rgba(r,g,b,a)`.
    /// The alpha of `rgba()` is discarded.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let err = || ParseColorError(s.to_string());

        if let Some(hex) = s.strip_prefix('#') {
            return parse_hex(hex).ok_or_else(err);
        }

        let lower = s.to_ascii_lowercase();
        let body = lower
            .strip_prefix("rgba(")
            .or_else(|| lower.strip_prefix("rgb("))
            .and_then(|rest| rest.strip_suffix(')'))
            .ok_or_else(err)?;

        let parts: Vec<&str> = body.split(',').map(str::trim).collect();
        if parts.len() != 3 && parts.len() != 4 {
            return Err(err());
        }
        let channel = |p: &str| p.parse::<u8>().ok();
        match (channel(parts[0]), channel(parts[1]), channel(parts[2])) {
            (Some(r), Some(g), Some(b)) => Ok(Rgb::new(r, g, b)),
            _ => Err(err()),
        }
    }
}

fn parse_hex(hex: &str) -> Option<Rgb> {
    if !hex.is_ascii() {
        return None;
    }
    match hex.len() {
        6 => Some(Rgb::new(
            u8::from_str_radix(&hex[0..2], 16).ok()?,
            u8::from_str_radix(&hex[2..4], 16).ok()?,
            u8::from_str_radix(&hex[4..6], 16).ok()?,
        )),
        3 => Some(Rgb::new(
            u8::from_str_radix(&hex[0..1].repeat(2), 16).ok()?,
            u8::from_str_radix(&hex[1..2].repeat(2), 16).ok()?,
            u8::from_str_radix(&hex[2..3].repeat(2), 16).ok()?,
        )),
        _ => None,
    }
}

/// Dimmed variant of `color` at `opacity`.
pub fn dim(color: &str, opacity: f32) -> String {
    let rgb = color.parse::<Rgb>().unwrap_or_else(|e| {
        debug!("{e}, dimming with fallback gray");
        FALLBACK_DIM
    });
    rgb.with_alpha(opacity)
}
