use std::fmt;
use std::str::FromStr;

use image::Rgba;
use serde::{Deserialize, Serialize};

use crate::{AvatarError, Result};

/// Straight (non-premultiplied) RGBA color.
#[derive(Eq, PartialEq, Hash, Clone, Copy, Debug, Deserialize, Serialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub alpha: u8,
}

impl Color {
    pub const TRANSPARENT: Color = Color::from_argb(0x00000000);

    pub const fn from_rgba(red: u8, green: u8, blue: u8, alpha: u8) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    pub const fn from_argb(argb: u32) -> Self {
        Self {
            alpha: (argb >> 24) as u8,
            red: (argb >> 16) as u8,
            green: (argb >> 8) as u8,
            blue: argb as u8,
        }
    }

    pub fn to_argb(self) -> u32 {
        (self.alpha as u32) << 24
            | (self.red as u32) << 16
            | (self.green as u32) << 8
            | self.blue as u32
    }

    pub fn to_rgba(self) -> Rgba<u8> {
        Rgba([self.red, self.green, self.blue, self.alpha])
    }

    pub fn to_paint(self) -> tiny_skia::Paint<'static> {
        let mut paint = tiny_skia::Paint::default();
        paint.set_color_rgba8(self.red, self.green, self.blue, self.alpha);
        paint.anti_alias = true;
        paint
    }
}

impl FromStr for Color {
    type Err = AvatarError;

    /// Accepts `#RRGGBB` (opaque) and `#AARRGGBB`.
    fn from_str(s: &str) -> Result<Self> {
        let hex = s
            .strip_prefix('#')
            .filter(|hex| hex.bytes().all(|b| b.is_ascii_hexdigit()))
            .ok_or_else(|| AvatarError::Color(s.to_owned()))?;
        let value = u32::from_str_radix(hex, 16)
            .map_err(|_| AvatarError::Color(s.to_owned()))?;
        match hex.len() {
            6 => Ok(Color::from_argb(0xFF000000 | value)),
            8 => Ok(Color::from_argb(value)),
            _ => Err(AvatarError::Color(s.to_owned())),
        }
    }
}

impl TryFrom<String> for Color {
    type Error = AvatarError;

    fn try_from(value: String) -> Result<Self> {
        Color::from_str(&value)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:08X}", self.to_argb())
    }
}
