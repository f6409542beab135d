use std::ops::{Deref, DerefMut};

use crate::{DeviceState, Lcd, Result};

/// A frame bracket on an [`Lcd`], created by [`Lcd::frame`].
///
/// Derefs to the device, so drawing calls go through the guard. The frame
/// is ended when the guard is finished or dropped, including on early
/// returns and panics.
#[must_use = "dropping a Frame immediately ends it"]
pub struct Frame<'a> {
    lcd: &'a mut Lcd,
    finished: bool,
}

impl<'a> Frame<'a> {
    pub(crate) fn new(lcd: &'a mut Lcd) -> Self {
        Self {
            lcd,
            finished: false,
        }
    }

    /// Ends the frame, flushing it to the output.
    ///
    /// On failure the device is left inside the frame, as with
    /// [`Lcd::end_frame`].
    pub fn finish(mut self) -> Result<()> {
        self.finished = true;
        self.lcd.end_frame()
    }
}

impl Deref for Frame<'_> {
    type Target = Lcd;

    fn deref(&self) -> &Lcd {
        &*self.lcd
    }
}

impl DerefMut for Frame<'_> {
    fn deref_mut(&mut self) -> &mut Lcd {
        &mut *self.lcd
    }
}

impl Drop for Frame<'_> {
    fn drop(&mut self) {
        // The frame may already have been ended (or the device destroyed)
        // through the guard.
        if self.finished || self.lcd.state() != DeviceState::Drawing {
            return;
        }
        if let Err(e) = self.lcd.end_frame() {
            log::warn!("Failed to end frame on drop: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        backend::recording::{Call, Op, RecordingBackend},
        Color, DeviceState, Error, Lcd, Rect,
    };

    fn draw_and_bail(lcd: &mut Lcd) -> crate::Result<()> {
        let mut frame = lcd.frame(None)?;
        frame.fill_rect(0, 0, 4, 4)?;
        frame.draw_hline(0, 0, 4)?;
        frame.finish()
    }

    #[test]
    fn finish_ends_frame() {
        let mut lcd = Lcd::new(RecordingBackend::new(8, 8)).unwrap();
        let mut frame = lcd.frame(Some(Rect::new(0, 0, 4, 4))).unwrap();
        frame.set_fill_color(Color::RED).unwrap();
        frame.finish().unwrap();

        assert_eq!(lcd.state(), DeviceState::Ready);
        assert_eq!(lcd.frame_count(), 1);
    }

    #[test]
    fn drop_ends_frame_on_error_path() {
        let backend = RecordingBackend::new(8, 8).without(Op::DrawHLine);
        let mut lcd = Lcd::new(backend).unwrap();

        assert_eq!(
            draw_and_bail(&mut lcd),
            Err(Error::NotSupported("draw_hline"))
        );
        assert_eq!(lcd.state(), DeviceState::Ready);
        assert_eq!(
            lcd.backend::<RecordingBackend>().unwrap().calls().last(),
            Some(&Call::EndFrame)
        );
    }

    #[test]
    fn drop_after_manual_end_is_quiet() {
        let mut lcd = Lcd::new(RecordingBackend::new(8, 8)).unwrap();
        {
            let mut frame = lcd.frame(None).unwrap();
            frame.end_frame().unwrap();
        }
        let ends = lcd
            .backend::<RecordingBackend>()
            .unwrap()
            .calls()
            .iter()
            .filter(|call| **call == Call::EndFrame)
            .count();
        assert_eq!(ends, 1);
    }
}
