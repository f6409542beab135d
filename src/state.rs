use serde::{Deserialize, Serialize};

use crate::{Color, Error, Result};

/// The drawing state of a device: global alpha plus the three paint colors.
///
/// Every value persists across draw calls until reassigned. Backends read
/// it when executing a draw operation.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DrawState {
    /// Scales the opacity of every draw operation (255 = opaque).
    pub global_alpha: u8,
    /// Ink color for glyphs.
    pub text_color: Color,
    /// Color for lines and points.
    pub stroke_color: Color,
    /// Color for filled rectangles.
    pub fill_color: Color,
}

impl Default for DrawState {
    fn default() -> Self {
        Self {
            global_alpha: u8::MAX,
            text_color: Color::BLACK,
            stroke_color: Color::BLACK,
            fill_color: Color::BLACK,
        }
    }
}

impl DrawState {
    /// Validates a requested global alpha, which must lie in `[0, 255]`.
    ///
    /// Out-of-range values are rejected rather than clamped.
    pub fn check_alpha(alpha: i32) -> Result<u8> {
        u8::try_from(alpha).map_err(|_| Error::InvalidParam("global alpha must be in [0, 255]"))
    }

    /// The text color with global alpha applied.
    pub fn effective_text_color(&self) -> Color {
        self.text_color.scale_alpha(self.global_alpha)
    }

    /// The stroke color with global alpha applied.
    pub fn effective_stroke_color(&self) -> Color {
        self.stroke_color.scale_alpha(self.global_alpha)
    }

    /// The fill color with global alpha applied.
    pub fn effective_fill_color(&self) -> Color {
        self.fill_color.scale_alpha(self.global_alpha)
    }
}
