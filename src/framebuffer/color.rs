//! Color representation and RGB565 pens
use embedded_graphics::pixelcolor::raw::RawU16;
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;

/// 8-bit-per-channel color as the application thinks about it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color { r: 0, g: 0, b: 0 };
    pub const WHITE: Color = Color { r: 255, g: 255, b: 255 };
    pub const RED: Color = Color { r: 255, g: 0, b: 0 };
    pub const GREEN: Color = Color { r: 0, g: 255, b: 0 };
    pub const BLUE: Color = Color { r: 0, g: 0, b: 255 };

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xFF) as u8,
            g: ((hex >> 8) & 0xFF) as u8,
            b: (hex & 0xFF) as u8,
        }
    }

    /// Pack into the frame buffer's 16-bit format
    pub const fn pen(self) -> Pen {
        let r5 = (self.r >> 3) as u16;
        let g6 = (self.g >> 2) as u16;
        let b5 = (self.b >> 3) as u16;
        Pen((r5 << 11) | (g6 << 5) | b5)
    }

    pub fn to_rgb565(self) -> Rgb565 {
        self.pen().to_rgb565()
    }
}

/// Packed RGB565 value, exactly what is stored per pixel.
///
/// Pens are plain values: create them once and pass them around freely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Pen(u16);

impl Pen {
    pub const BLACK: Pen = Color::BLACK.pen();
    pub const WHITE: Pen = Color::WHITE.pen();

    pub const fn from_raw(raw: u16) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u16 {
        self.0
    }

    pub fn to_rgb565(self) -> Rgb565 {
        Rgb565::from(RawU16::new(self.0))
    }
}

impl From<Rgb565> for Pen {
    fn from(color: Rgb565) -> Self {
        Pen(color.into_storage())
    }
}

impl From<Color> for Pen {
    fn from(color: Color) -> Self {
        color.pen()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pen_packs_rgb565() {
        assert_eq!(Color::WHITE.pen().raw(), 0xFFFF);
        assert_eq!(Color::RED.pen().raw(), 0xF800);
        assert_eq!(Color::GREEN.pen().raw(), 0x07E0);
        assert_eq!(Color::BLUE.pen().raw(), 0x001F);
        assert_eq!(Pen::BLACK.raw(), 0);
    }

    #[test]
    fn pen_matches_embedded_graphics_encoding() {
        let c = Color::new(200, 100, 50);
        let eg = Rgb565::new(200 >> 3, 100 >> 2, 50 >> 3);
        assert_eq!(c.to_rgb565(), eg);
        assert_eq!(Pen::from(eg), c.pen());
    }

    #[test]
    fn from_hex_splits_channels() {
        assert_eq!(Color::from_hex(0x123456), Color::new(0x12, 0x34, 0x56));
    }
}
