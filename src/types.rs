use serde::{Deserialize, Serialize};

/// A point in device pixels.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// An integer rectangle in device pixels.
///
/// `w` and `h` are signed so callers can pass computed extents
/// straight through; a rectangle with a non-positive side is empty.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rect {
    /// The position of the top-left corner.
    pub x: i32,
    pub y: i32,
    /// The side lengths.
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    /// A rectangle at the origin with the given size.
    pub fn from_size(width: u32, height: u32) -> Self {
        Self::new(0, 0, clamp_extent(width), clamp_extent(height))
    }

    pub fn is_empty(&self) -> bool {
        self.w <= 0 || self.h <= 0
    }

    pub fn right(&self) -> i32 {
        self.x.saturating_add(self.w)
    }

    pub fn bottom(&self) -> i32 {
        self.y.saturating_add(self.h)
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x && point.y >= self.y && point.x < self.right() && point.y < self.bottom()
    }

    /// Whether `other` lies entirely inside this rectangle.
    ///
    /// An empty `other` is contained if its origin is within
    /// (or on the far edge of) this rectangle.
    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right().max(other.x) <= self.right()
            && other.bottom().max(other.y) <= self.bottom()
    }

    /// The overlapping region of two rectangles, or `None` if they
    /// do not overlap.
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        if right <= x || bottom <= y {
            return None;
        }
        Some(Rect::new(
            x,
            y,
            right.saturating_sub(x),
            bottom.saturating_sub(y),
        ))
    }
}

fn clamp_extent(extent: u32) -> i32 {
    extent.min(i32::MAX as u32) as i32
}

/// Determines how to fill paths with self-intersections.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum FillRule {
    #[default]
    EvenOdd,
    NonZero,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum LineCap {
    #[default]
    Butt,
    Round,
    Square,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum LineJoin {
    #[default]
    Miter,
    Round,
    Bevel,
}

/// How to stroke a path on a vector canvas.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct StrokeSettings {
    /// Width of the path to stroke
    pub width: f32,
    /// How to cap the ends of open segments
    pub line_cap: LineCap,
    /// How to join segments together
    pub line_join: LineJoin,
}

impl Default for StrokeSettings {
    fn default() -> Self {
        Self {
            width: 1.,
            line_cap: LineCap::default(),
            line_join: LineJoin::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intersection() {
        let a = Rect::new(0, 0, 100, 100);
        let b = Rect::new(50, 80, 100, 100);
        assert_eq!(a.intersection(&b), Some(Rect::new(50, 80, 50, 20)));
        assert_eq!(a.intersection(&Rect::new(100, 0, 10, 10)), None);
        assert_eq!(a.intersection(&Rect::new(-10, -10, 5, 5)), None);
    }

    #[test]
    fn intersection_at_extreme_coordinates() {
        let dirty = Rect::new(5, 5, 10, 10);
        assert_eq!(dirty.intersection(&Rect::new(i32::MIN, i32::MIN, 1, 1)), None);
        assert_eq!(dirty.intersection(&Rect::new(i32::MAX - 1, 6, 10, 1)), None);
        assert_eq!(
            dirty.intersection(&Rect::new(i32::MIN, 6, i32::MAX, 1)),
            None
        );

        let wide = Rect::new(i32::MIN, i32::MIN, i32::MAX, i32::MAX);
        let inside = Rect::new(-10, -10, 5, 5);
        assert_eq!(wide.intersection(&inside), Some(inside));
    }

    #[test]
    fn containment() {
        let bounds = Rect::from_size(16, 8);
        assert!(bounds.contains_rect(&Rect::new(0, 0, 16, 8)));
        assert!(bounds.contains_rect(&Rect::new(4, 4, 0, 0)));
        assert!(!bounds.contains_rect(&Rect::new(4, 4, 13, 1)));
        assert!(!bounds.contains_rect(&Rect::new(-1, 0, 2, 2)));
        assert!(bounds.contains(Point::new(15, 7)));
        assert!(!bounds.contains(Point::new(16, 7)));
    }

    #[test]
    fn emptiness() {
        assert!(Rect::new(0, 0, 0, 10).is_empty());
        assert!(Rect::new(0, 0, 10, -1).is_empty());
        assert!(!Rect::new(-5, -5, 1, 1).is_empty());
    }
}
