use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::Error;

/// An sRGB color with an alpha channel.
///
/// Unpremultiplied by convention. Serializes as a `#rrggbb` or
/// `#rrggbbaa` hex string.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color([u8; 4]);

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(u8::MAX, u8::MAX, u8::MAX);
    pub const RED: Color = Color::rgb(u8::MAX, 0, 0);
    pub const GREEN: Color = Color::rgb(0, u8::MAX, 0);
    pub const BLUE: Color = Color::rgb(0, 0, u8::MAX);
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);

    /// Creates a color from its RGBA components.
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self([r, g, b, a])
    }

    /// Creates a color from RGB components with 100% alpha.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, u8::MAX)
    }

    /// Gets the red component.
    pub fn red(&self) -> u8 {
        self.0[0]
    }

    /// Gets the green component.
    pub fn green(&self) -> u8 {
        self.0[1]
    }

    /// Gets the blue component.
    pub fn blue(&self) -> u8 {
        self.0[2]
    }

    /// Gets the alpha component.
    pub fn alpha(&self) -> u8 {
        self.0[3]
    }

    /// Gets the color as an array of values in RGBA order.
    pub fn to_array(&self) -> [u8; 4] {
        self.0
    }

    /// Creates a color from an array of values in RGBA order.
    pub fn from_array(array: [u8; 4]) -> Self {
        Self(array)
    }

    /// Returns this color with its alpha replaced.
    pub fn with_alpha(mut self, alpha: u8) -> Self {
        self.0[3] = alpha;
        self
    }

    /// Returns this color with its alpha multiplied by `factor / 255`.
    ///
    /// Used to apply a device's global alpha to a paint color.
    pub fn scale_alpha(self, factor: u8) -> Self {
        let alpha = (self.alpha() as u32 * factor as u32 + 127) / 255;
        self.with_alpha(alpha as u8)
    }
}

impl Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let rgba = self.to_array();
        write!(f, "#{:02x}{:02x}{:02x}", rgba[0], rgba[1], rgba[2])?;
        if rgba[3] != u8::MAX {
            write!(f, "{:02x}", rgba[3])?;
        }
        Ok(())
    }
}

impl FromStr for Color {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s
            .strip_prefix('#')
            .ok_or(Error::InvalidParam("color must start with '#'"))?;
        if !matches!(hex.len(), 6 | 8) || !hex.is_ascii() {
            return Err(Error::InvalidParam("color must have 6 or 8 hex digits"));
        }

        let mut rgba = [u8::MAX; 4];
        for (i, component) in rgba.iter_mut().enumerate().take(hex.len() / 2) {
            *component = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16)
                .map_err(|_| Error::InvalidParam("invalid hex digit in color"))?;
        }
        Ok(Self(rgba))
    }
}

impl TryFrom<String> for Color {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}
