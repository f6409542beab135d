//! A backend that draws nothing and records every call it receives.
//!
//! Useful as a simulated display in tests, and as a reference for what a
//! device forwards to its backend.

use glam::Affine2;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::{
    Backend, Bitmap, BitmapId, Color, DrawState, Error, FillRule, Glyph, Path, Point, Rect, Result,
    StrokeSettings, VgCanvas,
};

/// An operation in the backend table.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Op {
    BeginFrame,
    SetGlobalAlpha,
    SetTextColor,
    SetStrokeColor,
    SetFillColor,
    DrawVLine,
    DrawHLine,
    DrawPoints,
    FillRect,
    DrawGlyph,
    DrawImage,
    VgCanvas,
    EndFrame,
    Destroy,
}

impl Op {
    /// Whether a backend may leave this operation out.
    pub fn is_optional(self) -> bool {
        !matches!(
            self,
            Op::BeginFrame | Op::EndFrame | Op::FillRect | Op::DrawImage | Op::Destroy
        )
    }
}

/// A call received by a [`RecordingBackend`].
///
/// Draw calls capture the relevant color from the device state
/// at the time of the call.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    BeginFrame(Rect),
    SetGlobalAlpha(u8),
    SetTextColor(Color),
    SetStrokeColor(Color),
    SetFillColor(Color),
    DrawVLine {
        x: i32,
        y: i32,
        h: i32,
        color: Color,
    },
    DrawHLine {
        x: i32,
        y: i32,
        w: i32,
        color: Color,
    },
    DrawPoints {
        points: Vec<Point>,
        color: Color,
    },
    FillRect {
        rect: Rect,
        color: Color,
    },
    DrawGlyph {
        src: Rect,
        x: i32,
        y: i32,
        color: Color,
        alpha: u8,
    },
    DrawImage {
        image: BitmapId,
        src: Rect,
        dst: Rect,
        alpha: u8,
    },
    VgFillPath {
        path: Path,
        fill_rule: FillRule,
        transform: Affine2,
        color: Color,
    },
    VgStrokePath {
        path: Path,
        settings: StrokeSettings,
        transform: Affine2,
        color: Color,
    },
    EndFrame,
    Destroy,
}

impl Call {
    pub fn op(&self) -> Op {
        match self {
            Call::BeginFrame(_) => Op::BeginFrame,
            Call::SetGlobalAlpha(_) => Op::SetGlobalAlpha,
            Call::SetTextColor(_) => Op::SetTextColor,
            Call::SetStrokeColor(_) => Op::SetStrokeColor,
            Call::SetFillColor(_) => Op::SetFillColor,
            Call::DrawVLine { .. } => Op::DrawVLine,
            Call::DrawHLine { .. } => Op::DrawHLine,
            Call::DrawPoints { .. } => Op::DrawPoints,
            Call::FillRect { .. } => Op::FillRect,
            Call::DrawGlyph { .. } => Op::DrawGlyph,
            Call::DrawImage { .. } => Op::DrawImage,
            Call::VgFillPath { .. } | Call::VgStrokePath { .. } => Op::VgCanvas,
            Call::EndFrame => Op::EndFrame,
            Call::Destroy => Op::Destroy,
        }
    }

    /// Whether this call would have changed pixels.
    pub fn is_draw(&self) -> bool {
        matches!(
            self.op(),
            Op::DrawVLine
                | Op::DrawHLine
                | Op::DrawPoints
                | Op::FillRect
                | Op::DrawGlyph
                | Op::DrawImage
                | Op::VgCanvas
        )
    }
}

/// A backend that records calls instead of drawing.
///
/// By default every optional operation is supported. Use
/// [`RecordingBackend::without`] to remove some, and
/// [`RecordingBackend::fail_next`] to make an operation fail once.
#[derive(Debug)]
pub struct RecordingBackend {
    width: u32,
    height: u32,
    calls: Vec<Call>,
    unsupported: FxHashSet<Op>,
    failures: FxHashMap<Op, Error>,
    frames_presented: u64,
    destroyed: bool,
    vg: VgState,
}

#[derive(Debug)]
struct VgState {
    transform: Affine2,
    global_alpha: u8,
    fill_color: Color,
    stroke_color: Color,
}

impl Default for VgState {
    fn default() -> Self {
        Self {
            transform: Affine2::IDENTITY,
            global_alpha: u8::MAX,
            fill_color: Color::BLACK,
            stroke_color: Color::BLACK,
        }
    }
}

impl RecordingBackend {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            calls: Vec::new(),
            unsupported: FxHashSet::default(),
            failures: FxHashMap::default(),
            frames_presented: 0,
            destroyed: false,
            vg: VgState::default(),
        }
    }

    /// Removes an optional operation from the table.
    ///
    /// Removing a state hook makes the device store the value without notifying
    /// the backend. Removing a draw operation makes the device report
    /// [`Error::NotSupported`]. Mandatory operations cannot be removed.
    ///
    /// # Panics
    /// Panics if `op` is mandatory.
    pub fn without(mut self, op: Op) -> Self {
        assert!(op.is_optional(), "{:?} is a mandatory backend operation", op);
        self.unsupported.insert(op);
        self
    }

    /// Makes the next call of `op` fail with `error` without being recorded.
    pub fn fail_next(&mut self, op: Op, error: Error) {
        self.failures.insert(op, error);
    }

    /// All calls recorded so far, in order.
    pub fn calls(&self) -> &[Call] {
        &self.calls
    }

    /// Takes the recorded calls, leaving the log empty.
    pub fn take_calls(&mut self) -> Vec<Call> {
        std::mem::take(&mut self.calls)
    }

    /// Number of frames successfully flushed.
    pub fn frames_presented(&self) -> u64 {
        self.frames_presented
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    pub fn supports(&self, op: Op) -> bool {
        !self.unsupported.contains(&op)
    }

    fn dispatch(&mut self, op: Op) -> Result<()> {
        if self.destroyed {
            return Err(Error::fail("recording backend used after destroy"));
        }
        match self.failures.remove(&op) {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn record_hook(&mut self, op: Op, call: Call) -> Result<()> {
        if !self.supports(op) {
            return Ok(());
        }
        self.dispatch(op)?;
        self.calls.push(call);
        Ok(())
    }

    fn record_draw(&mut self, op: Op, name: &'static str, call: Call) -> Result<()> {
        if !self.supports(op) {
            return Err(Error::NotSupported(name));
        }
        self.dispatch(op)?;
        self.calls.push(call);
        Ok(())
    }

    fn record(&mut self, op: Op, call: Call) -> Result<()> {
        self.dispatch(op)?;
        self.calls.push(call);
        Ok(())
    }
}

impl Backend for RecordingBackend {
    fn name(&self) -> &str {
        "recording"
    }

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn begin_frame(&mut self, dirty_rect: Rect) -> Result<()> {
        self.record(Op::BeginFrame, Call::BeginFrame(dirty_rect))
    }

    fn set_global_alpha(&mut self, alpha: u8) -> Result<()> {
        self.record_hook(Op::SetGlobalAlpha, Call::SetGlobalAlpha(alpha))
    }

    fn set_text_color(&mut self, color: Color) -> Result<()> {
        self.record_hook(Op::SetTextColor, Call::SetTextColor(color))
    }

    fn set_stroke_color(&mut self, color: Color) -> Result<()> {
        self.record_hook(Op::SetStrokeColor, Call::SetStrokeColor(color))
    }

    fn set_fill_color(&mut self, color: Color) -> Result<()> {
        self.record_hook(Op::SetFillColor, Call::SetFillColor(color))
    }

    fn draw_vline(&mut self, state: &DrawState, x: i32, y: i32, h: i32) -> Result<()> {
        let color = state.stroke_color;
        self.record_draw(Op::DrawVLine, "draw_vline", Call::DrawVLine { x, y, h, color })
    }

    fn draw_hline(&mut self, state: &DrawState, x: i32, y: i32, w: i32) -> Result<()> {
        let color = state.stroke_color;
        self.record_draw(Op::DrawHLine, "draw_hline", Call::DrawHLine { x, y, w, color })
    }

    fn draw_points(&mut self, state: &DrawState, points: &[Point]) -> Result<()> {
        let call = Call::DrawPoints {
            points: points.to_vec(),
            color: state.stroke_color,
        };
        self.record_draw(Op::DrawPoints, "draw_points", call)
    }

    fn fill_rect(&mut self, state: &DrawState, rect: Rect) -> Result<()> {
        let color = state.fill_color;
        self.record(Op::FillRect, Call::FillRect { rect, color })
    }

    fn draw_glyph(
        &mut self,
        state: &DrawState,
        _glyph: &Glyph,
        src: Rect,
        x: i32,
        y: i32,
    ) -> Result<()> {
        let call = Call::DrawGlyph {
            src,
            x,
            y,
            color: state.text_color,
            alpha: state.global_alpha,
        };
        self.record_draw(Op::DrawGlyph, "draw_glyph", call)
    }

    fn draw_image(&mut self, state: &DrawState, image: &Bitmap, src: Rect, dst: Rect) -> Result<()> {
        let call = Call::DrawImage {
            image: image.id(),
            src,
            dst,
            alpha: state.global_alpha,
        };
        self.record(Op::DrawImage, call)
    }

    fn vgcanvas(&mut self) -> Option<&mut dyn VgCanvas> {
        if self.supports(Op::VgCanvas) && !self.destroyed {
            Some(self as &mut dyn VgCanvas)
        } else {
            None
        }
    }

    fn end_frame(&mut self) -> Result<()> {
        self.record(Op::EndFrame, Call::EndFrame)?;
        self.frames_presented += 1;
        Ok(())
    }

    fn destroy(&mut self) -> Result<()> {
        self.record(Op::Destroy, Call::Destroy)?;
        self.destroyed = true;
        Ok(())
    }
}

impl VgCanvas for RecordingBackend {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn set_transform(&mut self, transform: Affine2) {
        self.vg.transform = transform;
    }

    fn transform(&self) -> Affine2 {
        self.vg.transform
    }

    fn set_global_alpha(&mut self, alpha: u8) {
        self.vg.global_alpha = alpha;
    }

    fn set_fill_color(&mut self, color: Color) {
        self.vg.fill_color = color;
    }

    fn set_stroke_color(&mut self, color: Color) {
        self.vg.stroke_color = color;
    }

    fn fill_path(&mut self, path: &Path, fill_rule: FillRule) -> Result<()> {
        let call = Call::VgFillPath {
            path: path.clone(),
            fill_rule,
            transform: self.vg.transform,
            color: self.vg.fill_color.scale_alpha(self.vg.global_alpha),
        };
        self.record(Op::VgCanvas, call)
    }

    fn stroke_path(&mut self, path: &Path, settings: &StrokeSettings) -> Result<()> {
        let call = Call::VgStrokePath {
            path: path.clone(),
            settings: *settings,
            transform: self.vg.transform,
            color: self.vg.stroke_color.scale_alpha(self.vg.global_alpha),
        };
        self.record(Op::VgCanvas, call)
    }
}
