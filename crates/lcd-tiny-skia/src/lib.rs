//! A software display backend for `lcd` that uses [`tiny-skia`](https://docs.rs/tiny-skia).
//!
//! Draws go to a back buffer. Ending a frame copies the dirty region to the
//! presented buffer, which callers read with [`TinySkiaBackend::to_argb`] or
//! [`TinySkiaBackend::presented_pixel`]. All drawing is clipped to the
//! surface and to the current dirty rect.

mod config;
mod convert;
mod surface;

use lcd::{Backend, Bitmap, BitmapId, Color, DrawState, Error, Glyph, Point, Rect, VgCanvas};
use lru::LruCache;
use tiny_skia::Pixmap;

pub use config::SoftwareConfig;

use self::{convert::convert_bitmap, surface::Surface};

/// A `tiny-skia` display backend.
pub struct TinySkiaBackend {
    config: SoftwareConfig,
    /// `None` once destroyed.
    surface: Option<Surface>,
    images: LruCache<BitmapId, Pixmap>,
    frames_presented: u64,
}

impl TinySkiaBackend {
    pub fn new(config: SoftwareConfig) -> Result<Self, Error> {
        if config.width == 0 || config.height == 0 {
            return Err(Error::InvalidParam("surface dimensions must be positive"));
        }
        let surface = Surface::new(
            config.width,
            config.height,
            config.background,
            config.anti_alias,
        )?;
        let images = LruCache::new(config.image_cache_capacity.max(1));

        Ok(Self {
            config,
            surface: Some(surface),
            images,
            frames_presented: 0,
        })
    }

    pub fn config(&self) -> &SoftwareConfig {
        &self.config
    }

    /// Number of frames copied to the presented buffer.
    pub fn frames_presented(&self) -> u64 {
        self.frames_presented
    }

    /// Number of converted images currently cached.
    pub fn cached_images(&self) -> usize {
        self.images.len()
    }

    /// Gets a pixel of the presented buffer.
    pub fn presented_pixel(&self, x: u32, y: u32) -> Option<Color> {
        let pixel = self.surface.as_ref()?.front().pixel(x, y)?.demultiply();
        Some(Color::rgba(
            pixel.red(),
            pixel.green(),
            pixel.blue(),
            pixel.alpha(),
        ))
    }

    /// The presented buffer as unpremultiplied ARGB values, row by row.
    ///
    /// Empty after the backend is destroyed.
    pub fn to_argb(&self) -> Vec<u32> {
        let surface = match &self.surface {
            Some(surface) => surface,
            None => return Vec::new(),
        };
        surface
            .front()
            .pixels()
            .iter()
            .map(|pixel| {
                let pixel = pixel.demultiply();
                u32::from_be_bytes([pixel.alpha(), pixel.red(), pixel.green(), pixel.blue()])
            })
            .collect()
    }

    fn surface(&mut self) -> Result<&mut Surface, Error> {
        self.surface.as_mut().ok_or_else(destroyed)
    }
}

fn destroyed() -> Error {
    Error::fail("software surface has been destroyed")
}

impl Backend for TinySkiaBackend {
    fn name(&self) -> &str {
        "tiny-skia"
    }

    fn width(&self) -> u32 {
        self.config.width
    }

    fn height(&self) -> u32 {
        self.config.height
    }

    fn begin_frame(&mut self, dirty_rect: Rect) -> Result<(), Error> {
        log::trace!("begin_frame {:?}", dirty_rect);
        self.surface()?.clip_to(dirty_rect);
        Ok(())
    }

    fn draw_vline(&mut self, state: &DrawState, x: i32, y: i32, h: i32) -> Result<(), Error> {
        let color = state.effective_stroke_color();
        self.surface()?.fill_solid(Rect::new(x, y, 1, h), color);
        Ok(())
    }

    fn draw_hline(&mut self, state: &DrawState, x: i32, y: i32, w: i32) -> Result<(), Error> {
        let color = state.effective_stroke_color();
        self.surface()?.fill_solid(Rect::new(x, y, w, 1), color);
        Ok(())
    }

    fn draw_points(&mut self, state: &DrawState, points: &[Point]) -> Result<(), Error> {
        let color = state.effective_stroke_color();
        let surface = self.surface()?;
        for point in points {
            surface.fill_solid(Rect::new(point.x, point.y, 1, 1), color);
        }
        Ok(())
    }

    fn fill_rect(&mut self, state: &DrawState, rect: Rect) -> Result<(), Error> {
        log::trace!("fill_rect {:?} with {}", rect, state.fill_color);
        let color = state.effective_fill_color();
        self.surface()?.fill_solid(rect, color);
        Ok(())
    }

    fn draw_glyph(
        &mut self,
        state: &DrawState,
        glyph: &Glyph,
        src: Rect,
        x: i32,
        y: i32,
    ) -> Result<(), Error> {
        self.surface()?.draw_glyph(state, glyph, src, x, y)
    }

    fn draw_image(
        &mut self,
        state: &DrawState,
        image: &Bitmap,
        src: Rect,
        dst: Rect,
    ) -> Result<(), Error> {
        log::trace!("draw_image {:?} {:?} -> {:?}", image.id(), src, dst);
        let surface = self.surface.as_mut().ok_or_else(destroyed)?;

        if !self.images.contains(&image.id()) {
            let pixmap = convert_bitmap(image)?;
            self.images.put(image.id(), pixmap);
        }
        let pixmap = self
            .images
            .get(&image.id())
            .ok_or_else(|| Error::fail("image cache rejected an entry"))?;

        surface.draw_image(state, pixmap, src, dst)
    }

    fn vgcanvas(&mut self) -> Option<&mut dyn VgCanvas> {
        self.surface
            .as_mut()
            .map(|surface| surface as &mut dyn VgCanvas)
    }

    fn end_frame(&mut self) -> Result<(), Error> {
        let surface = self.surface()?;
        surface.present();
        surface.reset_clip();
        self.frames_presented += 1;
        log::trace!("presented frame {}", self.frames_presented);
        Ok(())
    }

    fn destroy(&mut self) -> Result<(), Error> {
        self.surface.take().ok_or_else(destroyed)?;
        self.images.clear();
        log::info!(
            "Released {}x{} software surface",
            self.config.width,
            self.config.height
        );
        Ok(())
    }
}
