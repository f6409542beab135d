//! The vector-canvas capability.
//!
//! A backend that can render arbitrary paths exposes a [`VgCanvas`] through
//! [`Backend::vgcanvas`](crate::Backend::vgcanvas). Callers that get `None`
//! fall back to the raster primitives on [`Lcd`](crate::Lcd).

use glam::Affine2;

use crate::{Color, FillRule, Path, Result, StrokeSettings};

/// A path-based rendering surface.
///
/// The canvas keeps its own paint state, separate from the device's
/// [`DrawState`](crate::DrawState).
pub trait VgCanvas {
    /// Width of the canvas in device pixels.
    fn width(&self) -> u32;

    /// Height of the canvas in device pixels.
    fn height(&self) -> u32;

    /// Sets the transform applied to subsequently rendered paths.
    fn set_transform(&mut self, transform: Affine2);

    fn transform(&self) -> Affine2;

    /// Sets the opacity multiplier for subsequent fills and strokes.
    fn set_global_alpha(&mut self, alpha: u8);

    fn set_fill_color(&mut self, color: Color);

    fn set_stroke_color(&mut self, color: Color);

    /// Fills `path` with the current fill color.
    fn fill_path(&mut self, path: &Path, fill_rule: FillRule) -> Result<()>;

    /// Strokes `path` with the current stroke color.
    fn stroke_path(&mut self, path: &Path, settings: &StrokeSettings) -> Result<()>;
}
