use lcd::{glam::Affine2, Color, DrawState, Error, FillRule, Glyph, Path, Rect, StrokeSettings, VgCanvas};
use tiny_skia::{
    BlendMode, ClipMask, ColorU8, FilterQuality, Paint, PathBuilder, Pattern, Pixmap, Shader,
    SpreadMode, Stroke, Transform,
};

use crate::convert::{
    convert_color, convert_fill_rule, convert_line_cap, convert_line_join, convert_path,
    convert_rect, convert_transform, translation,
};

/// The pixel buffers of a software device.
///
/// Draws land in `back`; ending a frame copies the dirty region into `front`,
/// which is what the output shows.
pub(crate) struct Surface {
    back: Pixmap,
    front: Pixmap,
    /// Region draws may touch: the dirty rect during a frame, the whole
    /// surface otherwise. `None` if the dirty rect lies off the surface.
    clip: Option<Rect>,
    /// Mirrors `clip` for vector paths, which cannot be clipped geometrically.
    clip_mask: ClipMask,
    clip_mask_enabled: bool,
    anti_alias: bool,
    vg: VgPaint,
}

struct VgPaint {
    transform: Affine2,
    global_alpha: u8,
    fill_color: Color,
    stroke_color: Color,
}

impl Default for VgPaint {
    fn default() -> Self {
        Self {
            transform: Affine2::IDENTITY,
            global_alpha: u8::MAX,
            fill_color: Color::BLACK,
            stroke_color: Color::BLACK,
        }
    }
}

impl Surface {
    pub fn new(width: u32, height: u32, background: Color, anti_alias: bool) -> Result<Self, Error> {
        let mut back = Pixmap::new(width, height).ok_or(Error::OutOfMemory)?;
        back.fill(convert_color(background));
        let front = back.clone();
        Ok(Self {
            back,
            front,
            clip: Some(Rect::from_size(width, height)),
            clip_mask: ClipMask::new(),
            clip_mask_enabled: false,
            anti_alias,
            vg: VgPaint::default(),
        })
    }

    pub fn bounds(&self) -> Rect {
        Rect::from_size(self.back.width(), self.back.height())
    }

    pub fn front(&self) -> &Pixmap {
        &self.front
    }

    /// Restricts drawing to `dirty_rect` until [`reset_clip`](Self::reset_clip).
    pub fn clip_to(&mut self, dirty_rect: Rect) {
        let bounds = self.bounds();
        self.clip = bounds.intersection(&dirty_rect);
        self.clip_mask_enabled = false;

        if let Some(clip) = self.clip.filter(|clip| *clip != bounds) {
            let mut builder = PathBuilder::new();
            builder.push_rect(clip.x as f32, clip.y as f32, clip.w as f32, clip.h as f32);
            if let Some(path) = builder.finish() {
                self.clip_mask.set_path(
                    self.back.width(),
                    self.back.height(),
                    &path,
                    tiny_skia::FillRule::Winding,
                    false,
                );
                self.clip_mask_enabled = true;
            }
        }
    }

    pub fn reset_clip(&mut self) {
        self.clip = Some(self.bounds());
        self.clip_mask_enabled = false;
    }

    /// Copies the clipped region of the back buffer to the front buffer.
    pub fn present(&mut self) {
        let region = match self.clip.and_then(convert_rect) {
            Some(region) => region,
            None => return,
        };
        let paint = Paint {
            shader: Pattern::new(
                self.back.as_ref(),
                SpreadMode::Pad,
                FilterQuality::Nearest,
                1.0,
                Transform::identity(),
            ),
            blend_mode: BlendMode::Source,
            anti_alias: false,
            ..Default::default()
        };
        self.front
            .fill_rect(region, &paint, Transform::identity(), None);
    }

    /// Fills `rect`, clipped, with a solid color.
    pub fn fill_solid(&mut self, rect: Rect, color: Color) {
        let region = match self.clipped(rect) {
            Some(region) => region,
            None => return,
        };
        let paint = Paint {
            shader: Shader::SolidColor(convert_color(color)),
            anti_alias: false,
            ..Default::default()
        };
        self.back
            .fill_rect(region, &paint, Transform::identity(), None);
    }

    pub fn draw_glyph(
        &mut self,
        state: &DrawState,
        glyph: &Glyph,
        src: Rect,
        x: i32,
        y: i32,
    ) -> Result<(), Error> {
        let region = match self.clipped(Rect::new(x, y, src.w, src.h)) {
            Some(region) => region,
            None => return Ok(()),
        };

        // Tint the coverage mask into a scratch pixmap, then paint it as a pattern.
        let mut scratch = Pixmap::new(src.w as u32, src.h as u32).ok_or(Error::OutOfMemory)?;
        let color = state.effective_text_color();
        for (i, pixel) in scratch.pixels_mut().iter_mut().enumerate() {
            let i = i as i32;
            let coverage = glyph.coverage_at(src.x + i % src.w, src.y + i / src.w);
            let alpha = (color.alpha() as u32 * coverage as u32 + 127) / 255;
            *pixel = ColorU8::from_rgba(color.red(), color.green(), color.blue(), alpha as u8)
                .premultiply();
        }

        let paint = Paint {
            shader: Pattern::new(
                scratch.as_ref(),
                SpreadMode::Pad,
                FilterQuality::Nearest,
                1.0,
                translation(x as f32, y as f32),
            ),
            anti_alias: false,
            ..Default::default()
        };
        self.back
            .fill_rect(region, &paint, Transform::identity(), None);
        Ok(())
    }

    /// Paints the `src` region of `image` scaled into `dst`.
    ///
    /// A partial `src` is copied out first so filtering never samples
    /// pixels beyond its edges.
    pub fn draw_image(
        &mut self,
        state: &DrawState,
        image: &Pixmap,
        src: Rect,
        dst: Rect,
    ) -> Result<(), Error> {
        let region = match self.clipped(dst) {
            Some(region) => region,
            None => return Ok(()),
        };

        let cropped;
        let (source, origin) = if src == Rect::from_size(image.width(), image.height()) {
            (image, src)
        } else {
            cropped = crop(image, src)?;
            (&cropped, Rect::new(0, 0, src.w, src.h))
        };

        let sx = dst.w as f32 / src.w as f32;
        let sy = dst.h as f32 / src.h as f32;
        let quality = if src.w == dst.w && src.h == dst.h {
            FilterQuality::Nearest
        } else {
            FilterQuality::Bilinear
        };
        let transform = Transform::from_row(
            sx,
            0.,
            0.,
            sy,
            dst.x as f32 - origin.x as f32 * sx,
            dst.y as f32 - origin.y as f32 * sy,
        );

        let paint = Paint {
            shader: Pattern::new(
                source.as_ref(),
                SpreadMode::Pad,
                quality,
                state.global_alpha as f32 / u8::MAX as f32,
                transform,
            ),
            anti_alias: false,
            ..Default::default()
        };
        self.back
            .fill_rect(region, &paint, Transform::identity(), None);
        Ok(())
    }

    fn clipped(&self, rect: Rect) -> Option<tiny_skia::Rect> {
        self.clip
            .and_then(|clip| clip.intersection(&rect))
            .and_then(convert_rect)
    }

    fn vg_paint(&self, color: Color) -> Paint<'static> {
        Paint {
            shader: Shader::SolidColor(convert_color(color.scale_alpha(self.vg.global_alpha))),
            anti_alias: self.anti_alias,
            ..Default::default()
        }
    }
}

/// Copies `src`, which must lie inside `image`, into a new pixmap.
fn crop(image: &Pixmap, src: Rect) -> Result<Pixmap, Error> {
    let mut cropped = Pixmap::new(src.w as u32, src.h as u32).ok_or(Error::OutOfMemory)?;
    let stride = image.width() as usize;
    let (x, y, w) = (src.x as usize, src.y as usize, src.w as usize);
    for (row, line) in cropped.pixels_mut().chunks_exact_mut(w).enumerate() {
        let start = (y + row) * stride + x;
        line.copy_from_slice(&image.pixels()[start..start + w]);
    }
    Ok(cropped)
}

impl VgCanvas for Surface {
    fn width(&self) -> u32 {
        self.back.width()
    }

    fn height(&self) -> u32 {
        self.back.height()
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

    fn fill_path(&mut self, path: &Path, fill_rule: FillRule) -> Result<(), Error> {
        let path = match convert_path(path) {
            Some(path) if self.clip.is_some() => path,
            _ => return Ok(()),
        };
        let paint = self.vg_paint(self.vg.fill_color);
        let clip_mask = self.clip_mask_enabled.then_some(&self.clip_mask);
        self.back.fill_path(
            &path,
            &paint,
            convert_fill_rule(fill_rule),
            convert_transform(self.vg.transform),
            clip_mask,
        );
        Ok(())
    }

    fn stroke_path(&mut self, path: &Path, settings: &StrokeSettings) -> Result<(), Error> {
        if !(settings.width.is_finite() && settings.width >= 0.) {
            return Err(Error::InvalidParam("stroke width must be finite and non-negative"));
        }
        let path = match convert_path(path) {
            Some(path) if self.clip.is_some() => path,
            _ => return Ok(()),
        };
        let paint = self.vg_paint(self.vg.stroke_color);
        let stroke = Stroke {
            width: settings.width,
            line_cap: convert_line_cap(settings.line_cap),
            line_join: convert_line_join(settings.line_join),
            ..Default::default()
        };
        let clip_mask = self.clip_mask_enabled.then_some(&self.clip_mask);
        self.back.stroke_path(
            &path,
            &paint,
            &stroke,
            convert_transform(self.vg.transform),
            clip_mask,
        );
        Ok(())
    }
}
