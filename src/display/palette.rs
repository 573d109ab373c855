//! Display colors

use std::{fmt, str::FromStr};

use crossterm::style::Color;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorError {
    #[error("expected a color like #rrggbb, got {0:?}")]
    Malformed(String),
}

/// 24-bit color, written as `#rrggbb`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);
    pub const RED: Rgb = Rgb::new(255, 0, 0);
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl FromStr for Rgb {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || ColorError::Malformed(s.to_string());
        let hex = s.trim().strip_prefix('#').unwrap_or(s.trim());
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(malformed());
        }

        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16).map_err(|_| malformed())
        };
        Ok(Rgb::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl TryFrom<String> for Rgb {
    type Error = ColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Rgb> for String {
    fn from(value: Rgb) -> Self {
        value.to_string()
    }
}

impl From<Rgb> for Color {
    fn from(value: Rgb) -> Self {
        Color::Rgb {
            r: value.r,
            g: value.g,
            b: value.b,
        }
    }
}

/// Colors used by the display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Palette {
    /// Text color while more than five minutes remain
    pub normal: Rgb,
    /// Text color in the last five minutes and after expiry
    pub warning: Rgb,
    pub background: Rgb,
}

impl Palette {
    pub fn text_color(&self, is_warning: bool) -> Rgb {
        if is_warning {
            self.warning
        } else {
            self.normal
        }
    }

    /// Overwrite the colors present in `update`, leaving the rest alone
    pub fn apply(&mut self, update: &PaletteUpdate) {
        if let Some(normal) = update.normal {
            self.normal = normal;
        }
        if let Some(warning) = update.warning {
            self.warning = warning;
        }
        if let Some(background) = update.background {
            self.background = background;
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            normal: Rgb::WHITE,
            warning: Rgb::RED,
            background: Rgb::BLACK,
        }
    }
}

/// Partial palette change; absent fields keep their current color
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaletteUpdate {
    #[serde(default)]
    pub normal: Option<Rgb>,
    #[serde(default)]
    pub warning: Option<Rgb>,
    #[serde(default)]
    pub background: Option<Rgb>,
}
