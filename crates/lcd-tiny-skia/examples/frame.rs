use std::f32::consts::PI;

use lcd::{
    glam::{vec2, Vec2},
    Color, FillRule, Glyph, Lcd, Path, Point, Rect,
};
use lcd_tiny_skia::{SoftwareConfig, TinySkiaBackend};

fn five_point_star(center: Vec2, outer_radius: f32, inner_radius: f32) -> Path {
    let angle_step = PI * 2. / 5.;
    let mut builder = Path::builder();

    for i in 0..5 {
        let outer_theta = angle_step * i as f32 - PI / 2.;
        let inner_theta = angle_step * (i as f32 + 0.5) - PI / 2.;

        let outer_pos = vec2(outer_theta.cos(), outer_theta.sin()) * outer_radius + center;
        let inner_pos = vec2(inner_theta.cos(), inner_theta.sin()) * inner_radius + center;

        builder = if i == 0 {
            builder.move_to(outer_pos)
        } else {
            builder.line_to(outer_pos)
        };
        builder = builder.line_to(inner_pos);
    }

    builder.close()
}

/// Prints the presented buffer, one character per pixel.
fn dump(lcd: &Lcd) {
    let backend = lcd
        .backend::<TinySkiaBackend>()
        .expect("device uses the tiny-skia backend");
    for (i, argb) in backend.to_argb().into_iter().enumerate() {
        let [_, r, g, b] = argb.to_be_bytes();
        let c = match (r > 127, g > 127, b > 127) {
            (false, false, false) => ' ',
            (true, false, false) => 'r',
            (false, true, false) => 'g',
            (false, false, true) => 'b',
            _ => '#',
        };
        print!("{}", c);
        if (i + 1) % lcd.width() as usize == 0 {
            println!();
        }
    }
}

fn main() -> anyhow::Result<()> {
    simple_logger::init_with_level(log::Level::Debug)?;

    let backend = TinySkiaBackend::new(SoftwareConfig::with_size(48, 24))?;
    let mut lcd = Lcd::new(backend)?;

    {
        let mut frame = lcd.frame(None)?;
        frame.set_fill_color(Color::BLUE)?;
        frame.fill_rect(2, 2, 12, 8)?;
        frame.set_stroke_color(Color::GREEN)?;
        frame.draw_hline(0, 12, 48)?;
        frame.draw_points(&[Point::new(1, 1), Point::new(46, 1)])?;

        let glyph = Glyph::new(3, 3, vec![255, 0, 255, 0, 255, 0, 255, 0, 255])?;
        frame.set_text_color(Color::WHITE)?;
        frame.draw_glyph(&glyph, None, 18, 4)?;

        match frame.vgcanvas()? {
            Some(canvas) => {
                canvas.set_fill_color(Color::RED);
                canvas.fill_path(&five_point_star(vec2(36., 10.), 9., 4.), FillRule::NonZero)?;
            }
            None => log::info!("No vector canvas; skipping the star"),
        }
        frame.finish()?;
    }

    // Only the lower half is refreshed in the second frame.
    {
        let mut frame = lcd.frame(Some(Rect::new(0, 12, 48, 12)))?;
        frame.set_fill_color(Color::RED)?;
        frame.fill_rect(0, 0, 48, 24)?;
        frame.finish()?;
    }

    dump(&lcd);
    lcd.destroy()?;
    Ok(())
}
