use lcd::Color;
use serde::{Deserialize, Serialize};

/// Settings for a [`TinySkiaBackend`](crate::TinySkiaBackend).
///
/// Every field has a default, so a partial config deserializes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SoftwareConfig {
    /// Surface width in pixels.
    pub width: u32,
    /// Surface height in pixels.
    pub height: u32,
    /// Initial contents of the back and presented buffers.
    pub background: Color,
    /// Number of converted images kept between frames.
    pub image_cache_capacity: usize,
    /// Anti-alias paths drawn through the vector canvas.
    ///
    /// Raster primitives are always pixel-aligned.
    pub anti_alias: bool,
}

impl Default for SoftwareConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 480,
            background: Color::BLACK,
            image_cache_capacity: 32,
            anti_alias: true,
        }
    }
}

impl SoftwareConfig {
    pub fn with_size(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }
}
