//! RGB colors and foreground/background pairs.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SchemeError;

/// An opaque RGB color.
///
/// Parsed from `#rrggbb` or one of the [`NAMED_COLORS`] (case-insensitive),
/// and always written back as `#rrggbb`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// Color names accepted in scheme files.
pub const NAMED_COLORS: &[(&str, Color)] = &[
    ("black", Color::rgb(0x00, 0x00, 0x00)),
    ("white", Color::rgb(0xff, 0xff, 0xff)),
    ("red", Color::rgb(0xff, 0x00, 0x00)),
    ("green", Color::rgb(0x00, 0x80, 0x00)),
    ("blue", Color::rgb(0x00, 0x00, 0xff)),
    ("yellow", Color::rgb(0xff, 0xff, 0x00)),
    ("orange", Color::rgb(0xff, 0xa5, 0x00)),
    ("purple", Color::rgb(0x80, 0x00, 0x80)),
    ("gray", Color::rgb(0x80, 0x80, 0x80)),
    ("grey", Color::rgb(0x80, 0x80, 0x80)),
    ("grey50", Color::rgb(0x7f, 0x7f, 0x7f)),
    ("silver", Color::rgb(0xc0, 0xc0, 0xc0)),
    ("navy", Color::rgb(0x00, 0x00, 0x80)),
    ("teal", Color::rgb(0x00, 0x80, 0x80)),
    ("maroon", Color::rgb(0x80, 0x00, 0x00)),
    ("olive", Color::rgb(0x80, 0x80, 0x00)),
    ("cadetblue", Color::rgb(0x5f, 0x9e, 0xa0)),
    ("chartreuse", Color::rgb(0x7f, 0xff, 0x00)),
    ("darkblue", Color::rgb(0x00, 0x00, 0x8b)),
    ("darkgreen", Color::rgb(0x00, 0x64, 0x00)),
    ("forestgreen", Color::rgb(0x22, 0x8b, 0x22)),
    ("mediumblue", Color::rgb(0x00, 0x00, 0xcd)),
    ("midnightblue", Color::rgb(0x19, 0x19, 0x70)),
    ("orangered", Color::rgb(0xff, 0x45, 0x00)),
    ("pink", Color::rgb(0xff, 0xc0, 0xcb)),
];

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Look up a color by name.
    pub fn named(name: &str) -> Option<Self> {
        NAMED_COLORS
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|&(_, color)| color)
    }
}

impl FromStr for Color {
    type Err = SchemeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = || SchemeError::InvalidColor {
            value: s.to_string(),
        };
        if let Some(hex) = s.strip_prefix('#') {
            if hex.len() != 6 || !hex.is_ascii() {
                return Err(invalid());
            }
            let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
            return Ok(Color::rgb(channel(0)?, channel(2)?, channel(4)?));
        }
        Color::named(s).ok_or_else(invalid)
    }
}

impl TryFrom<String> for Color {
    type Error = SchemeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Foreground color with an optional background.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorPair {
    pub foreground: Color,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<Color>,
}

impl ColorPair {
    pub fn new(foreground: Color, background: Option<Color>) -> Self {
        Self {
            foreground,
            background,
        }
    }

    pub fn foreground(foreground: Color) -> Self {
        Self::new(foreground, None)
    }
}
