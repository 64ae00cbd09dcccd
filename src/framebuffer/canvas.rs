//! Drawing surface over the writable frame buffer, using embedded-graphics
use alloc::string::String;
use alloc::vec::Vec;

use embedded_graphics::{
    mono_font::{ascii::FONT_6X10, MonoFont, MonoTextStyle},
    pixelcolor::Rgb565,
    prelude::*,
    primitives::{Circle, Line, PrimitiveStyle, Rectangle},
    text::{Baseline, Text},
    Drawable,
};
use embedded_graphics_core::draw_target::DrawTarget;
use embedded_graphics_core::geometry::OriginDimensions;

use super::buffer::FrameBuffer;
use super::color::{Color, Pen};

const TEXT_FONT: &MonoFont<'static> = &FONT_6X10;

/// Pen-based drawing on one frame buffer.
///
/// A canvas borrows the buffer mutably, so nothing else can touch it
/// while drawing is in progress. Everything is clipped to the buffer.
pub struct Canvas<'a> {
    buffer: &'a mut FrameBuffer,
    pen: Pen,
}

impl<'a> Canvas<'a> {
    pub fn new(buffer: &'a mut FrameBuffer) -> Self {
        buffer.assert_writable();
        Self {
            buffer,
            pen: Pen::WHITE,
        }
    }

    pub fn create_pen(&self, r: u8, g: u8, b: u8) -> Pen {
        Color::new(r, g, b).pen()
    }

    pub fn set_pen(&mut self, pen: Pen) {
        self.pen = pen;
    }

    pub fn pen(&self) -> Pen {
        self.pen
    }

    pub fn buffer(&self) -> &FrameBuffer {
        self.buffer
    }

    /// Fill the whole buffer with the current pen
    pub fn clear(&mut self) {
        self.buffer.fill(self.pen);
    }

    pub fn rectangle(&mut self, area: Rectangle) {
        self.buffer.fill_clipped(&area, self.pen);
    }

    /// Filled circle of `radius` pixels around `center`
    pub fn circle(&mut self, center: Point, radius: u32) {
        let color = self.pen.to_rgb565();
        Circle::with_center(center, radius * 2 + 1)
            .into_styled(PrimitiveStyle::with_fill(color))
            .draw(self)
            .ok();
    }

    pub fn line(&mut self, from: Point, to: Point) {
        let color = self.pen.to_rgb565();
        Line::new(from, to)
            .into_styled(PrimitiveStyle::with_stroke(color, 1))
            .draw(self)
            .ok();
    }

    /// Draw `text` with its top-left corner at `origin`, word-wrapped to
    /// `wrap_width` pixels. Returns the number of lines drawn.
    pub fn text(&mut self, text: &str, origin: Point, wrap_width: u32) -> usize {
        let style = MonoTextStyle::new(TEXT_FONT, self.pen.to_rgb565());
        let char_w = TEXT_FONT.character_size.width + TEXT_FONT.character_spacing;
        let line_h = TEXT_FONT.character_size.height as i32;
        let max_chars = (wrap_width / char_w).max(1) as usize;

        let lines = wrap_lines(text, max_chars);
        for (i, line) in lines.iter().enumerate() {
            let at = Point::new(origin.x, origin.y + i as i32 * line_h);
            Text::with_baseline(line, at, style, Baseline::Top)
                .draw(self)
                .ok();
        }
        lines.len()
    }
}

/// Greedy word wrap; words longer than a line are split
fn wrap_lines(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();
    let mut line_chars = 0usize;

    for word in text.split_whitespace() {
        let mut rest = word;
        loop {
            let word_chars = rest.chars().count();
            let needed = if line_chars == 0 { word_chars } else { line_chars + 1 + word_chars };
            if needed <= max_chars {
                if line_chars > 0 {
                    line.push(' ');
                }
                line.push_str(rest);
                line_chars = needed;
                break;
            }
            if line_chars > 0 {
                lines.push(core::mem::take(&mut line));
                line_chars = 0;
                continue;
            }
            let split = rest
                .char_indices()
                .nth(max_chars)
                .map(|(i, _)| i)
                .unwrap_or(rest.len());
            lines.push(String::from(&rest[..split]));
            rest = &rest[split..];
            if rest.is_empty() {
                break;
            }
        }
    }
    if line_chars > 0 {
        lines.push(line);
    }
    lines
}

impl DrawTarget for Canvas<'_> {
    type Color = Rgb565;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(Point { x, y }, color) in pixels {
            self.buffer.put(x, y, Pen::from(color));
        }
        Ok(())
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        self.buffer.fill_clipped(area, Pen::from(color));
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.buffer.fill(Pen::from(color));
        Ok(())
    }
}

impl OriginDimensions for Canvas<'_> {
    fn size(&self) -> Size {
        Size::new(self.buffer.width(), self.buffer.height())
    }
}
