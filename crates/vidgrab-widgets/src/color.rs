//! Color specifications.
//!
//! Widgets accept colors as symbolic names (`white`, `gray15`) or as hex
//! codes (`#rgb`, `#rrggbb`). [`Color::parse`] resolves either form; the
//! canonical representation handed back to callers is lowercase `#rrggbb`.

use std::fmt;

use vidgrab_core::{Error, Result};

/// An opaque RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    /// Red component.
    pub r: u8,
    /// Green component.
    pub g: u8,
    /// Blue component.
    pub b: u8,
}

impl Color {
    /// Create a color from 8-bit components.
    pub const fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Create a color from the 16-bit components reported by the toolkit.
    pub fn from_rgb16(r: u16, g: u16, b: u16) -> Self {
        Self::from_rgb8((r >> 8) as u8, (g >> 8) as u8, (b >> 8) as u8)
    }

    /// Components scaled to 16 bits.
    pub fn to_rgb16(self) -> (u16, u16, u16) {
        (
            u16::from(self.r) * 257,
            u16::from(self.g) * 257,
            u16::from(self.b) * 257,
        )
    }

    /// Resolve a symbolic name or hex code.
    pub fn parse(spec: &str) -> Result<Self> {
        let spec = spec.trim();
        let parsed = match spec.strip_prefix('#') {
            Some(hex) => parse_hex(hex),
            None => parse_named_color(spec),
        };
        parsed.ok_or_else(|| Error::InvalidColor(spec.to_string()))
    }

    /// Lowercase `#rrggbb`.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Normalize a color specification to lowercase `#rrggbb`.
///
/// Specifications already in that form are returned unchanged.
pub fn normalize(spec: &str) -> Result<String> {
    if is_canonical_hex(spec) {
        return Ok(spec.to_string());
    }
    Color::parse(spec).map(Color::to_hex)
}

fn is_canonical_hex(spec: &str) -> bool {
    spec.len() == 7
        && spec.starts_with('#')
        && spec[1..]
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
}

fn parse_hex(hex: &str) -> Option<Color> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    match hex.len() {
        3 => {
            let digit = |i: usize| u8::from_str_radix(&hex[i..=i], 16).ok().map(|v| v * 17);
            Some(Color::from_rgb8(digit(0)?, digit(1)?, digit(2)?))
        }
        6 => {
            let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
            Some(Color::from_rgb8(byte(0)?, byte(2)?, byte(4)?))
        }
        _ => None,
    }
}

fn parse_named_color(name: &str) -> Option<Color> {
    let name = name.to_lowercase();

    // gray0 .. gray100, in percent of full intensity.
    if let Some(level) = name
        .strip_prefix("gray")
        .or_else(|| name.strip_prefix("grey"))
        .filter(|rest| !rest.is_empty())
    {
        let percent: u32 = level.parse().ok().filter(|p| *p <= 100)?;
        let v = ((percent * 255 + 50) / 100) as u8;
        return Some(Color::from_rgb8(v, v, v));
    }

    let rgb = match name.as_str() {
        "black" => (0, 0, 0),
        "white" => (255, 255, 255),
        "red" => (255, 0, 0),
        "green" => (0, 128, 0),
        "blue" => (0, 0, 255),
        "yellow" => (255, 255, 0),
        "cyan" | "aqua" => (0, 255, 255),
        "magenta" | "fuchsia" => (255, 0, 255),
        "gray" | "grey" => (128, 128, 128),
        "silver" => (192, 192, 192),
        "maroon" => (128, 0, 0),
        "olive" => (128, 128, 0),
        "lime" => (0, 255, 0),
        "navy" => (0, 0, 128),
        "purple" => (128, 0, 128),
        "teal" => (0, 128, 128),
        "orange" => (255, 165, 0),
        "pink" => (255, 192, 203),
        "brown" => (165, 42, 42),
        "gold" => (255, 215, 0),
        "coral" => (255, 127, 80),
        "crimson" => (220, 20, 60),
        "darkblue" => (0, 0, 139),
        "darkgreen" => (0, 100, 0),
        "darkred" => (139, 0, 0),
        "darkgray" | "darkgrey" => (169, 169, 169),
        "lightgray" | "lightgrey" => (211, 211, 211),
        "whitesmoke" => (245, 245, 245),
        "gainsboro" => (220, 220, 220),
        "indigo" => (75, 0, 130),
        "violet" => (238, 130, 238),
        _ => return None,
    };
    Some(Color::from_rgb8(rgb.0, rgb.1, rgb.2))
}
