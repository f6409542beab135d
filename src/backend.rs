use std::any::Any;

use crate::{Bitmap, Color, DrawState, Error, Glyph, Point, Rect, Result, VgCanvas};

pub mod recording;

/// A display backend: the operation table an [`Lcd`](crate::Lcd) dispatches to.
///
/// `begin_frame`, `end_frame`, `fill_rect`, `draw_image` and `destroy` are
/// mandatory. Every other operation is optional: the default draw methods
/// report [`Error::NotSupported`], the default state hooks do nothing, and
/// the default [`vgcanvas`](Backend::vgcanvas) is `None`.
///
/// The device validates arguments and lifecycle state before dispatching,
/// so a backend only ever sees calls inside a frame, with non-empty extents
/// and in-bounds source rectangles. Destination coordinates are passed through
/// unchanged; clipping them is up to the backend.
pub trait Backend: 'static {
    /// A short name used in log messages.
    fn name(&self) -> &str {
        "backend"
    }

    /// Width of the surface in pixels. Read once when the device is created.
    fn width(&self) -> u32;

    /// Height of the surface in pixels. Read once when the device is created.
    fn height(&self) -> u32;

    /// Prepares to draw the given region.
    fn begin_frame(&mut self, dirty_rect: Rect) -> Result<()>;

    /// Called before the device stores a new global alpha.
    fn set_global_alpha(&mut self, _alpha: u8) -> Result<()> {
        Ok(())
    }

    /// Called before the device stores a new text color.
    fn set_text_color(&mut self, _color: Color) -> Result<()> {
        Ok(())
    }

    /// Called before the device stores a new stroke color.
    fn set_stroke_color(&mut self, _color: Color) -> Result<()> {
        Ok(())
    }

    /// Called before the device stores a new fill color.
    fn set_fill_color(&mut self, _color: Color) -> Result<()> {
        Ok(())
    }

    /// Draws a vertical line of `h` pixels with the stroke color. `h > 0`.
    fn draw_vline(&mut self, _state: &DrawState, _x: i32, _y: i32, _h: i32) -> Result<()> {
        Err(Error::NotSupported("draw_vline"))
    }

    /// Draws a horizontal line of `w` pixels with the stroke color. `w > 0`.
    fn draw_hline(&mut self, _state: &DrawState, _x: i32, _y: i32, _w: i32) -> Result<()> {
        Err(Error::NotSupported("draw_hline"))
    }

    /// Draws individual pixels with the stroke color. `points` is non-empty.
    fn draw_points(&mut self, _state: &DrawState, _points: &[Point]) -> Result<()> {
        Err(Error::NotSupported("draw_points"))
    }

    /// Fills a non-empty rectangle with the fill color.
    fn fill_rect(&mut self, state: &DrawState, rect: Rect) -> Result<()>;

    /// Paints the `src` region of `glyph` with the text color, placing the
    /// region's top-left corner at `(x, y)`.
    fn draw_glyph(
        &mut self,
        _state: &DrawState,
        _glyph: &Glyph,
        _src: Rect,
        _x: i32,
        _y: i32,
    ) -> Result<()> {
        Err(Error::NotSupported("draw_glyph"))
    }

    /// Copies the `src` region of `image` into `dst`, scaling as needed.
    fn draw_image(&mut self, state: &DrawState, image: &Bitmap, src: Rect, dst: Rect)
        -> Result<()>;

    /// The backend's vector canvas, if it has one.
    fn vgcanvas(&mut self) -> Option<&mut dyn VgCanvas> {
        None
    }

    /// Flushes the frame to the output.
    fn end_frame(&mut self) -> Result<()>;

    /// Releases all resources. Called exactly once.
    fn destroy(&mut self) -> Result<()>;
}

/// Type-erased version of `Backend`.
///
/// Lets a device hold any backend behind one pointer while still handing
/// the concrete type back to callers that know it.
pub trait ErasedBackend: Backend {
    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T> ErasedBackend for T
where
    T: Backend,
{
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
