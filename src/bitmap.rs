//! Pixel data handed to a device by upstream decoders and rasterizers.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::{Color, Error, Rect, Result};

/// Unique ID of a [`Bitmap`].
///
/// Backends key their converted-image caches on this value. Since a bitmap's
/// pixels are immutable, the ID identifies its content for the bitmap's lifetime.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BitmapId(u64);

impl BitmapId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(0);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// An immutable image in unpremultiplied RGBA8, row-major without padding.
#[derive(Debug, PartialEq, Eq)]
pub struct Bitmap {
    id: BitmapId,
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Bitmap {
    /// Wraps decoded RGBA8 pixels.
    ///
    /// Fails if either dimension is zero or `data` is not exactly
    /// `width * height * 4` bytes.
    pub fn from_rgba8(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidParam("bitmap dimensions must be positive"));
        }
        if data.len() as u64 != width as u64 * height as u64 * 4 {
            return Err(Error::InvalidParam("bitmap data does not match its dimensions"));
        }
        Ok(Self {
            id: BitmapId::next(),
            width,
            height,
            data,
        })
    }

    /// Creates a bitmap filled with a single color.
    pub fn solid(width: u32, height: u32, color: Color) -> Result<Self> {
        let len = width as usize * height as usize;
        let data = color.to_array().repeat(len);
        Self::from_rgba8(width, height, data)
    }

    pub fn id(&self) -> BitmapId {
        self.id
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn bounds(&self) -> Rect {
        Rect::from_size(self.width, self.height)
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Gets the color of the pixel at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        let mut rgba = [0; 4];
        rgba.copy_from_slice(&self.data[i..i + 4]);
        Some(Color::from_array(rgba))
    }
}

/// A pre-rasterized character as an 8-bit coverage mask.
///
/// Produced by a font rasterizer; a device paints it with its text color.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Glyph {
    width: u32,
    height: u32,
    coverage: Vec<u8>,
}

impl Glyph {
    /// Fails if `coverage` is not exactly `width * height` bytes.
    pub fn new(width: u32, height: u32, coverage: Vec<u8>) -> Result<Self> {
        if coverage.len() as u64 != width as u64 * height as u64 {
            return Err(Error::InvalidParam("glyph coverage does not match its dimensions"));
        }
        Ok(Self {
            width,
            height,
            coverage,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn bounds(&self) -> Rect {
        Rect::from_size(self.width, self.height)
    }

    pub fn coverage(&self) -> &[u8] {
        &self.coverage
    }

    /// Coverage at `(x, y)`, or zero outside the glyph.
    pub fn coverage_at(&self, x: i32, y: i32) -> u8 {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return 0;
        }
        self.coverage[y as usize * self.width as usize + x as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bitmap_validation() {
        assert!(Bitmap::from_rgba8(2, 2, vec![0; 16]).is_ok());
        assert_eq!(
            Bitmap::from_rgba8(2, 2, vec![0; 15]),
            Err(Error::InvalidParam("bitmap data does not match its dimensions"))
        );
        assert!(Bitmap::from_rgba8(0, 2, Vec::new()).is_err());
    }

    #[test]
    fn bitmap_ids_are_unique() {
        let a = Bitmap::solid(1, 1, Color::RED).unwrap();
        let b = Bitmap::solid(1, 1, Color::RED).unwrap();
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn bitmap_pixels() {
        let bitmap = Bitmap::solid(3, 2, Color::BLUE).unwrap();
        assert_eq!(bitmap.pixel(2, 1), Some(Color::BLUE));
        assert_eq!(bitmap.pixel(3, 0), None);
    }

    #[test]
    fn glyph_coverage() {
        let glyph = Glyph::new(2, 2, vec![0, 64, 128, 255]).unwrap();
        assert_eq!(glyph.coverage_at(1, 1), 255);
        assert_eq!(glyph.coverage_at(1, 0), 64);
        assert_eq!(glyph.coverage_at(-1, 0), 0);
        assert_eq!(glyph.coverage_at(2, 0), 0);
        assert!(Glyph::new(2, 2, vec![0; 3]).is_err());
    }
}
