use lcd::{glam::Affine2, Bitmap, Color, Error, FillRule, LineCap, LineJoin, Path, PathSegment};
use tiny_skia::{ColorU8, PathBuilder, Pixmap, Transform};

pub fn convert_color(color: Color) -> tiny_skia::Color {
    tiny_skia::Color::from_rgba8(color.red(), color.green(), color.blue(), color.alpha())
}

pub fn convert_rect(rect: lcd::Rect) -> Option<tiny_skia::Rect> {
    tiny_skia::Rect::from_xywh(rect.x as f32, rect.y as f32, rect.w as f32, rect.h as f32)
}

pub fn convert_transform(transform: Affine2) -> Transform {
    let cols = transform.to_cols_array();
    Transform::from_row(cols[0], cols[1], cols[2], cols[3], cols[4], cols[5])
}

pub fn translation(x: f32, y: f32) -> Transform {
    Transform::from_row(1., 0., 0., 1., x, y)
}

/// Builds a `tiny-skia` path, or `None` if `path` has no drawable segments.
pub fn convert_path(path: &Path) -> Option<tiny_skia::Path> {
    let mut builder = PathBuilder::new();
    for segment in path.segments() {
        match segment {
            PathSegment::MoveTo(pos) => builder.move_to(pos.x, pos.y),
            PathSegment::LineTo(pos) => builder.line_to(pos.x, pos.y),
            PathSegment::QuadTo { control, end } => {
                builder.quad_to(control.x, control.y, end.x, end.y)
            }
            PathSegment::CubicTo {
                control1,
                control2,
                end,
            } => builder.cubic_to(control1.x, control1.y, control2.x, control2.y, end.x, end.y),
            PathSegment::Close => builder.close(),
        }
    }
    builder.finish()
}

/// Converts an unpremultiplied RGBA8 bitmap to a pixmap.
pub fn convert_bitmap(bitmap: &Bitmap) -> Result<Pixmap, Error> {
    let mut pixmap = Pixmap::new(bitmap.width(), bitmap.height()).ok_or(Error::OutOfMemory)?;
    for (pixel, rgba) in pixmap
        .pixels_mut()
        .iter_mut()
        .zip(bitmap.data().chunks_exact(4))
    {
        *pixel = ColorU8::from_rgba(rgba[0], rgba[1], rgba[2], rgba[3]).premultiply();
    }
    Ok(pixmap)
}

pub fn convert_line_cap(cap: LineCap) -> tiny_skia::LineCap {
    match cap {
        LineCap::Butt => tiny_skia::LineCap::Butt,
        LineCap::Round => tiny_skia::LineCap::Round,
        LineCap::Square => tiny_skia::LineCap::Square,
    }
}

pub fn convert_line_join(join: LineJoin) -> tiny_skia::LineJoin {
    match join {
        LineJoin::Miter => tiny_skia::LineJoin::Miter,
        LineJoin::Round => tiny_skia::LineJoin::Round,
        LineJoin::Bevel => tiny_skia::LineJoin::Bevel,
    }
}

pub fn convert_fill_rule(rule: FillRule) -> tiny_skia::FillRule {
    match rule {
        FillRule::EvenOdd => tiny_skia::FillRule::EvenOdd,
        FillRule::NonZero => tiny_skia::FillRule::Winding,
    }
}
