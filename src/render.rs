use image::RgbaImage;
use ratatui::{buffer::Buffer, layout::Rect, style::Color, widgets::Widget};

use crate::FRAME_SIZE;

/// Alpha below this renders as the theme background instead of the pixel.
const ALPHA_CUTOFF: u8 = 128;

/// Number of terminal cells a rendered frame occupies: one column per pixel
/// column, one row per two pixel rows.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub const fn cell_size() -> (u16, u16) {
    (FRAME_SIZE as u16, (FRAME_SIZE / 2) as u16)
}

/// Renders one RGBA frame as pixel art.
///
/// Each terminal cell shows the upper-half-block glyph with the foreground
/// colored by the upper pixel and the background by the lower pixel, packing
/// two pixel rows into every character row.
#[derive(Debug)]
pub struct PixelArt<'a> {
    frame: &'a RgbaImage,
    fallback: Color,
}

impl<'a> PixelArt<'a> {
    /// Wraps `frame` for rendering; `fallback` fills transparent pixels.
    #[must_use]
    pub const fn new(frame: &'a RgbaImage, fallback: Color) -> Self {
        Self { frame, fallback }
    }

    fn pixel_color(&self, x: u32, y: u32) -> Color {
        if y >= self.frame.height() {
            return self.fallback;
        }
        let [r, g, b, a] = self.frame.get_pixel(x, y).0;
        if a < ALPHA_CUTOFF {
            self.fallback
        } else {
            Color::Rgb(r, g, b)
        }
    }
}

impl Widget for PixelArt<'_> {
    #[allow(clippy::cast_possible_truncation)]
    fn render(self, area: Rect, buf: &mut Buffer) {
        let columns = u32::from(area.width).min(self.frame.width());
        let rows = u32::from(area.height).min(self.frame.height().div_ceil(2));
        for row in 0..rows {
            for column in 0..columns {
                let upper = self.pixel_color(column, row * 2);
                let lower = self.pixel_color(column, row * 2 + 1);
                buf[(area.x + column as u16, area.y + row as u16)]
                    .set_symbol("▀")
                    .set_fg(upper)
                    .set_bg(lower);
            }
        }
    }
}

#[cfg(test)]
mod test {
    use image::Rgba;

    use super::*;

    const FALLBACK: Color = Color::Rgb(10, 20, 30);

    fn render_to_buffer(frame: &RgbaImage, width: u16, height: u16) -> Buffer {
        let area = Rect::new(0, 0, width, height);
        let mut buf = Buffer::empty(area);
        PixelArt::new(frame, FALLBACK).render(area, &mut buf);
        buf
    }

    #[test]
    fn packs_two_pixel_rows_into_one_cell() {
        let mut frame = RgbaImage::from_pixel(4, 4, Rgba([0, 0, 0, 255]));
        frame.put_pixel(0, 0, Rgba([255, 0, 0, 255]));
        frame.put_pixel(0, 1, Rgba([0, 0, 255, 255]));

        let buf = render_to_buffer(&frame, 4, 2);

        let cell = &buf[(0, 0)];
        assert_eq!(cell.symbol(), "▀");
        assert_eq!(cell.fg, Color::Rgb(255, 0, 0));
        assert_eq!(cell.bg, Color::Rgb(0, 0, 255));
    }

    #[test]
    fn transparent_pixels_use_the_fallback_color() {
        let frame = RgbaImage::from_pixel(2, 2, Rgba([255, 255, 255, 0]));

        let buf = render_to_buffer(&frame, 2, 1);

        assert_eq!(buf[(0, 0)].fg, FALLBACK);
        assert_eq!(buf[(0, 0)].bg, FALLBACK);
    }

    #[test]
    fn odd_pixel_height_fills_the_last_lower_half_with_fallback() {
        let frame = RgbaImage::from_pixel(2, 3, Rgba([0, 255, 0, 255]));

        let buf = render_to_buffer(&frame, 2, 2);

        assert_eq!(buf[(0, 1)].fg, Color::Rgb(0, 255, 0));
        assert_eq!(buf[(0, 1)].bg, FALLBACK);
    }

    #[test]
    fn rendering_is_clipped_to_the_area() {
        let frame = RgbaImage::from_pixel(8, 8, Rgba([255, 0, 0, 255]));
        let area = Rect::new(0, 0, 2, 2);
        let mut buf = Buffer::empty(Rect::new(0, 0, 4, 4));

        PixelArt::new(&frame, FALLBACK).render(area, &mut buf);

        assert_eq!(buf[(1, 1)].symbol(), "▀");
        assert_eq!(buf[(2, 2)].symbol(), " ");
    }

    #[test]
    fn cell_size_matches_the_fixed_frame_target() {
        let (width, height) = cell_size();
        assert_eq!(u32::from(width), FRAME_SIZE);
        assert_eq!(u32::from(height), FRAME_SIZE / 2);
    }
}
