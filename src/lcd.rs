use std::fmt;

use crate::{
    backend::ErasedBackend, Backend, Bitmap, Color, DeviceState, DrawState, Error, Frame, Glyph,
    Point, Rect, Result, VgCanvas,
};

/// A display device.
///
/// Wraps a [`Backend`] and enforces the frame lifecycle: drawing and state
/// calls are only valid between [`begin_frame`](Lcd::begin_frame) and
/// [`end_frame`](Lcd::end_frame). Calls in the wrong state fail without
/// reaching the backend.
///
/// Dropping a device that has not been [`destroy`](Lcd::destroy)ed
/// destroys it.
pub struct Lcd {
    backend: Box<dyn ErasedBackend>,
    width: u32,
    height: u32,
    state: DrawState,
    device_state: DeviceState,
    dirty_rect: Option<Rect>,
    frames: u64,
}

impl Lcd {
    /// Creates a device on top of `backend`.
    ///
    /// The surface size is read from the backend once and never changes.
    pub fn new(backend: impl Backend) -> Result<Self> {
        let width = backend.width();
        let height = backend.height();
        if width == 0 || height == 0 {
            return Err(Error::InvalidParam("device dimensions must be positive"));
        }

        log::info!(
            "Created {}x{} device on the '{}' backend",
            width,
            height,
            backend.name()
        );
        Ok(Self {
            backend: Box::new(backend),
            width,
            height,
            state: DrawState::default(),
            device_state: DeviceState::Ready,
            dirty_rect: None,
            frames: 0,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// The full surface as a rectangle.
    pub fn bounds(&self) -> Rect {
        Rect::from_size(self.width, self.height)
    }

    pub fn state(&self) -> DeviceState {
        self.device_state
    }

    pub fn draw_state(&self) -> &DrawState {
        &self.state
    }

    pub fn global_alpha(&self) -> u8 {
        self.state.global_alpha
    }

    pub fn text_color(&self) -> Color {
        self.state.text_color
    }

    pub fn stroke_color(&self) -> Color {
        self.state.stroke_color
    }

    pub fn fill_color(&self) -> Color {
        self.state.fill_color
    }

    /// The region being refreshed. `Some` only inside a frame.
    pub fn dirty_rect(&self) -> Option<Rect> {
        self.dirty_rect
    }

    /// Number of frames ended successfully.
    pub fn frame_count(&self) -> u64 {
        self.frames
    }

    /// Gets the backend as its concrete type.
    pub fn backend<B: Backend>(&self) -> Option<&B> {
        self.backend.as_any().downcast_ref()
    }

    /// Gets the backend as its concrete type.
    pub fn backend_mut<B: Backend>(&mut self) -> Option<&mut B> {
        self.backend.as_any_mut().downcast_mut()
    }

    /// Starts a frame that refreshes `dirty_rect`, or the whole surface if `None`.
    pub fn begin_frame(&mut self, dirty_rect: Option<Rect>) -> Result<()> {
        self.require_state("begin_frame", DeviceState::Ready)?;

        let rect = match dirty_rect {
            None => self.bounds(),
            Some(rect) if rect.w < 0 || rect.h < 0 => {
                return Err(Error::InvalidParam("dirty rectangle has a negative extent"))
            }
            Some(rect) => rect,
        };

        self.backend.begin_frame(rect)?;
        self.dirty_rect = Some(rect);
        self.device_state = DeviceState::Drawing;
        log::debug!("Began frame {} over {:?}", self.frames, rect);
        Ok(())
    }

    /// Starts a frame and returns a guard that ends it when dropped.
    ///
    /// Call [`Frame::finish`] to observe the result of ending the frame.
    pub fn frame(&mut self, dirty_rect: Option<Rect>) -> Result<Frame<'_>> {
        self.begin_frame(dirty_rect)?;
        Ok(Frame::new(self))
    }

    /// Flushes the current frame to the output.
    ///
    /// If the backend fails, the device stays inside the frame so the caller
    /// can retry or [`destroy`](Lcd::destroy) it.
    pub fn end_frame(&mut self) -> Result<()> {
        self.require_state("end_frame", DeviceState::Drawing)?;

        self.backend.end_frame()?;
        self.dirty_rect = None;
        self.device_state = DeviceState::Ready;
        log::debug!("Ended frame {}", self.frames);
        self.frames += 1;
        Ok(())
    }

    /// Releases the backend. Any frame in progress is abandoned.
    ///
    /// The device is unusable afterwards even if the backend reports an error.
    pub fn destroy(&mut self) -> Result<()> {
        match self.device_state {
            DeviceState::Destroyed => return Err(Error::Destroyed),
            DeviceState::Drawing => log::debug!("Abandoning frame {} on destroy", self.frames),
            DeviceState::Ready => {}
        }

        self.device_state = DeviceState::Destroyed;
        self.dirty_rect = None;
        let result = self.backend.destroy();
        log::info!(
            "Destroyed device on the '{}' backend after {} frames",
            self.backend.name(),
            self.frames
        );
        result
    }

    /// Sets the global alpha, which must lie in `[0, 255]`.
    pub fn set_global_alpha(&mut self, alpha: i32) -> Result<()> {
        self.require_drawing("set_global_alpha")?;
        let alpha = DrawState::check_alpha(alpha)?;
        self.backend.set_global_alpha(alpha)?;
        self.state.global_alpha = alpha;
        Ok(())
    }

    pub fn set_text_color(&mut self, color: Color) -> Result<()> {
        self.require_drawing("set_text_color")?;
        self.backend.set_text_color(color)?;
        self.state.text_color = color;
        Ok(())
    }

    pub fn set_stroke_color(&mut self, color: Color) -> Result<()> {
        self.require_drawing("set_stroke_color")?;
        self.backend.set_stroke_color(color)?;
        self.state.stroke_color = color;
        Ok(())
    }

    pub fn set_fill_color(&mut self, color: Color) -> Result<()> {
        self.require_drawing("set_fill_color")?;
        self.backend.set_fill_color(color)?;
        self.state.fill_color = color;
        Ok(())
    }

    /// Draws a vertical line of `h` pixels downwards from `(x, y)`
    /// with the stroke color.
    pub fn draw_vline(&mut self, x: i32, y: i32, h: i32) -> Result<()> {
        self.require_drawing("draw_vline")?;
        if h <= 0 {
            return Ok(());
        }
        note_unsupported(self.backend.draw_vline(&self.state, x, y, h))
    }

    /// Draws a horizontal line of `w` pixels rightwards from `(x, y)`
    /// with the stroke color.
    pub fn draw_hline(&mut self, x: i32, y: i32, w: i32) -> Result<()> {
        self.require_drawing("draw_hline")?;
        if w <= 0 {
            return Ok(());
        }
        note_unsupported(self.backend.draw_hline(&self.state, x, y, w))
    }

    /// Draws each point as a single pixel with the stroke color.
    pub fn draw_points(&mut self, points: &[Point]) -> Result<()> {
        self.require_drawing("draw_points")?;
        if points.is_empty() {
            return Ok(());
        }
        note_unsupported(self.backend.draw_points(&self.state, points))
    }

    /// Fills a rectangle with the fill color.
    pub fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32) -> Result<()> {
        self.require_drawing("fill_rect")?;
        if w <= 0 || h <= 0 {
            return Ok(());
        }
        self.backend.fill_rect(&self.state, Rect::new(x, y, w, h))
    }

    /// Paints a glyph with the text color at `(x, y)`.
    ///
    /// `src` restricts drawing to a region of the glyph; `None` draws all of it.
    pub fn draw_glyph(&mut self, glyph: &Glyph, src: Option<Rect>, x: i32, y: i32) -> Result<()> {
        self.require_drawing("draw_glyph")?;
        let src = src.unwrap_or_else(|| glyph.bounds());
        if !glyph.bounds().contains_rect(&src) {
            return Err(Error::InvalidParam("glyph source rectangle exceeds the glyph"));
        }
        if src.is_empty() {
            return Ok(());
        }
        note_unsupported(self.backend.draw_glyph(&self.state, glyph, src, x, y))
    }

    /// Copies the `src` region of `image` into `dst`, scaling if the sizes differ.
    pub fn draw_image(&mut self, image: &Bitmap, src: Rect, dst: Rect) -> Result<()> {
        self.require_drawing("draw_image")?;
        if !image.bounds().contains_rect(&src) {
            return Err(Error::InvalidParam("image source rectangle exceeds the image"));
        }
        if src.is_empty() || dst.is_empty() {
            return Ok(());
        }
        self.backend.draw_image(&self.state, image, src, dst)
    }

    /// The backend's vector canvas, or `None` if it has none.
    ///
    /// Valid inside or outside a frame.
    pub fn vgcanvas(&mut self) -> Result<Option<&mut dyn VgCanvas>> {
        if self.device_state == DeviceState::Destroyed {
            return Err(Error::Destroyed);
        }
        let canvas = self.backend.vgcanvas();
        if canvas.is_none() {
            log::debug!("Backend has no vector canvas");
        }
        Ok(canvas)
    }

    fn require_state(&self, op: &'static str, required: DeviceState) -> Result<()> {
        match self.device_state {
            DeviceState::Destroyed => Err(Error::Destroyed),
            state if state == required => Ok(()),
            state => Err(Error::InvalidState { op, state }),
        }
    }

    fn require_drawing(&self, op: &'static str) -> Result<()> {
        self.require_state(op, DeviceState::Drawing)
    }
}

fn note_unsupported(result: Result<()>) -> Result<()> {
    if let Err(Error::NotSupported(op)) = &result {
        log::debug!("Backend does not support `{}`", op);
    }
    result
}

impl fmt::Debug for Lcd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lcd")
            .field("backend", &self.backend.name())
            .field("width", &self.width)
            .field("height", &self.height)
            .field("state", &self.device_state)
            .field("draw_state", &self.state)
            .field("dirty_rect", &self.dirty_rect)
            .finish()
    }
}

impl Drop for Lcd {
    fn drop(&mut self) {
        if self.device_state != DeviceState::Destroyed {
            if let Err(e) = self.destroy() {
                log::warn!("Failed to destroy device on drop: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::recording::{Call, Op, RecordingBackend};

    fn device() -> Lcd {
        Lcd::new(RecordingBackend::new(100, 100)).unwrap()
    }

    fn calls(lcd: &Lcd) -> &[Call] {
        lcd.backend::<RecordingBackend>().unwrap().calls()
    }

    #[test]
    fn rejects_empty_surface() {
        assert_eq!(
            Lcd::new(RecordingBackend::new(0, 10)).unwrap_err(),
            Error::InvalidParam("device dimensions must be positive")
        );
    }

    #[test]
    fn lifecycle_transitions() {
        let mut lcd = device();
        assert_eq!(lcd.state(), DeviceState::Ready);
        assert_eq!(lcd.dirty_rect(), None);

        lcd.begin_frame(Some(Rect::new(5, 5, 10, 10))).unwrap();
        assert_eq!(lcd.state(), DeviceState::Drawing);
        assert_eq!(lcd.dirty_rect(), Some(Rect::new(5, 5, 10, 10)));

        assert_eq!(
            lcd.begin_frame(None),
            Err(Error::InvalidState {
                op: "begin_frame",
                state: DeviceState::Drawing
            })
        );

        lcd.end_frame().unwrap();
        assert_eq!(lcd.state(), DeviceState::Ready);
        assert_eq!(lcd.dirty_rect(), None);
        assert_eq!(lcd.frame_count(), 1);

        assert_eq!(
            lcd.end_frame(),
            Err(Error::InvalidState {
                op: "end_frame",
                state: DeviceState::Ready
            })
        );
    }

    #[test]
    fn negative_dirty_rect_is_rejected() {
        let mut lcd = device();
        assert!(lcd.begin_frame(Some(Rect::new(0, 0, -1, 10))).is_err());
        assert_eq!(lcd.state(), DeviceState::Ready);
        assert!(calls(&lcd).is_empty());
    }

    #[test]
    fn failed_begin_leaves_device_ready() {
        let mut lcd = device();
        lcd.backend_mut::<RecordingBackend>()
            .unwrap()
            .fail_next(Op::BeginFrame, Error::fail("device lost"));

        assert_eq!(lcd.begin_frame(None), Err(Error::fail("device lost")));
        assert_eq!(lcd.state(), DeviceState::Ready);
        assert_eq!(lcd.dirty_rect(), None);

        // Retrying on the next refresh cycle works.
        lcd.begin_frame(None).unwrap();
        assert_eq!(lcd.state(), DeviceState::Drawing);
    }

    #[test]
    fn failed_end_stays_in_frame() {
        let mut lcd = device();
        lcd.begin_frame(None).unwrap();
        lcd.backend_mut::<RecordingBackend>()
            .unwrap()
            .fail_next(Op::EndFrame, Error::fail("swap failed"));

        assert_eq!(lcd.end_frame(), Err(Error::fail("swap failed")));
        assert_eq!(lcd.state(), DeviceState::Drawing);
        assert!(lcd.dirty_rect().is_some());

        lcd.end_frame().unwrap();
        assert_eq!(lcd.frame_count(), 1);
    }

    #[test]
    fn setter_hook_failure_keeps_old_value() {
        let mut lcd = device();
        lcd.begin_frame(None).unwrap();
        lcd.backend_mut::<RecordingBackend>()
            .unwrap()
            .fail_next(Op::SetTextColor, Error::OutOfMemory);

        assert_eq!(lcd.set_text_color(Color::RED), Err(Error::OutOfMemory));
        assert_eq!(lcd.text_color(), Color::BLACK);
    }

    #[test]
    fn setters_without_hooks_still_store() {
        let backend = RecordingBackend::new(10, 10)
            .without(Op::SetStrokeColor)
            .without(Op::SetGlobalAlpha);
        let mut lcd = Lcd::new(backend).unwrap();
        lcd.begin_frame(None).unwrap();

        lcd.set_stroke_color(Color::BLUE).unwrap();
        lcd.set_global_alpha(7).unwrap();
        assert_eq!(lcd.stroke_color(), Color::BLUE);
        assert_eq!(lcd.global_alpha(), 7);
        assert_eq!(calls(&lcd), &[Call::BeginFrame(Rect::new(0, 0, 10, 10))]);
    }

    #[test]
    fn missing_draw_capability_is_reported() {
        let backend = RecordingBackend::new(10, 10)
            .without(Op::DrawVLine)
            .without(Op::DrawPoints);
        let mut lcd = Lcd::new(backend).unwrap();
        lcd.begin_frame(None).unwrap();

        assert_eq!(lcd.draw_vline(1, 1, 3), Err(Error::NotSupported("draw_vline")));
        assert_eq!(
            lcd.draw_points(&[Point::new(1, 1)]),
            Err(Error::NotSupported("draw_points"))
        );
        // The frame is still usable.
        lcd.draw_hline(1, 1, 3).unwrap();
        lcd.end_frame().unwrap();
    }

    #[test]
    fn draw_failure_keeps_earlier_draws_and_frame() {
        let mut lcd = device();
        let image = Bitmap::solid(2, 2, Color::WHITE).unwrap();
        lcd.begin_frame(None).unwrap();
        lcd.fill_rect(1, 2, 3, 4).unwrap();
        lcd.backend_mut::<RecordingBackend>()
            .unwrap()
            .fail_next(Op::DrawImage, Error::OutOfMemory);

        assert_eq!(
            lcd.draw_image(&image, image.bounds(), Rect::new(0, 0, 4, 4)),
            Err(Error::OutOfMemory)
        );
        assert!(calls(&lcd).contains(&Call::FillRect {
            rect: Rect::new(1, 2, 3, 4),
            color: Color::BLACK,
        }));
        assert_eq!(lcd.state(), DeviceState::Drawing);

        lcd.end_frame().unwrap();
        assert_eq!(calls(&lcd).last(), Some(&Call::EndFrame));
        assert_eq!(lcd.frame_count(), 1);
    }

    #[test]
    fn line_lengths() {
        let mut lcd = device();
        lcd.begin_frame(None).unwrap();
        lcd.set_stroke_color(Color::GREEN).unwrap();
        lcd.draw_vline(3, 4, 0).unwrap();
        lcd.draw_hline(3, 4, -2).unwrap();
        lcd.draw_vline(3, 4, 5).unwrap();
        lcd.draw_hline(3, 4, 6).unwrap();

        assert_eq!(
            &calls(&lcd)[2..],
            &[
                Call::DrawVLine {
                    x: 3,
                    y: 4,
                    h: 5,
                    color: Color::GREEN
                },
                Call::DrawHLine {
                    x: 3,
                    y: 4,
                    w: 6,
                    color: Color::GREEN
                },
            ]
        );
    }

    #[test]
    fn glyph_source_validation() {
        let mut lcd = device();
        lcd.begin_frame(None).unwrap();
        let glyph = Glyph::new(4, 4, vec![255; 16]).unwrap();

        assert_eq!(
            lcd.draw_glyph(&glyph, Some(Rect::new(2, 2, 4, 4)), 0, 0),
            Err(Error::InvalidParam("glyph source rectangle exceeds the glyph"))
        );
        lcd.draw_glyph(&glyph, Some(Rect::new(1, 1, 0, 2)), 0, 0)
            .unwrap();
        lcd.draw_glyph(&glyph, None, 7, 8).unwrap();

        assert_eq!(
            calls(&lcd).last(),
            Some(&Call::DrawGlyph {
                src: Rect::new(0, 0, 4, 4),
                x: 7,
                y: 8,
                color: Color::BLACK,
                alpha: 255,
            })
        );
        assert_eq!(calls(&lcd).iter().filter(|c| c.is_draw()).count(), 1);
    }

    #[test]
    fn image_source_validation() {
        let mut lcd = device();
        lcd.begin_frame(None).unwrap();
        let image = Bitmap::solid(8, 8, Color::RED).unwrap();

        assert!(lcd
            .draw_image(&image, Rect::new(4, 4, 8, 8), Rect::new(0, 0, 8, 8))
            .is_err());
        lcd.draw_image(&image, Rect::new(0, 0, 8, 8), Rect::new(0, 0, 0, 8))
            .unwrap();
        assert!(calls(&lcd).iter().all(|c| !c.is_draw()));

        lcd.set_global_alpha(128).unwrap();
        lcd.draw_image(&image, Rect::new(0, 0, 4, 4), Rect::new(10, 10, 16, 16))
            .unwrap();
        assert_eq!(
            calls(&lcd).last(),
            Some(&Call::DrawImage {
                image: image.id(),
                src: Rect::new(0, 0, 4, 4),
                dst: Rect::new(10, 10, 16, 16),
                alpha: 128,
            })
        );
    }

    #[test]
    fn vgcanvas_is_a_query() {
        let mut lcd = device();
        assert!(lcd.vgcanvas().unwrap().is_some());
        assert_eq!(lcd.state(), DeviceState::Ready);

        let mut lcd = Lcd::new(RecordingBackend::new(10, 10).without(Op::VgCanvas)).unwrap();
        assert!(lcd.vgcanvas().unwrap().is_none());

        lcd.destroy().unwrap();
        assert!(matches!(lcd.vgcanvas(), Err(Error::Destroyed)));
    }

    #[test]
    fn destroy_abandons_frame() {
        let mut lcd = device();
        lcd.begin_frame(None).unwrap();
        lcd.destroy().unwrap();
        assert_eq!(lcd.state(), DeviceState::Destroyed);
        assert_eq!(lcd.dirty_rect(), None);
        assert_eq!(lcd.destroy(), Err(Error::Destroyed));

        let backend = lcd.backend::<RecordingBackend>().unwrap();
        assert!(backend.is_destroyed());
        assert_eq!(backend.calls().last(), Some(&Call::Destroy));
    }

    #[test]
    fn backend_destroy_failure_still_destroys() {
        let mut lcd = device();
        lcd.backend_mut::<RecordingBackend>()
            .unwrap()
            .fail_next(Op::Destroy, Error::fail("busy"));
        assert_eq!(lcd.destroy(), Err(Error::fail("busy")));
        assert_eq!(lcd.state(), DeviceState::Destroyed);
        assert_eq!(lcd.begin_frame(None), Err(Error::Destroyed));
    }
}
