//! Fixed-size pixel buffer the indicator is drawn into.

use std::convert::Infallible;

use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;

/// A square RGB bitmap.
///
/// Implements [`DrawTarget`] so text and primitives from `embedded-graphics`
/// can be drawn straight into it. Pixels outside the canvas are clipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlyphBitmap {
    size: u32,
    pixels: Vec<Rgb888>,
}

impl GlyphBitmap {
    /// Create a `size` x `size` bitmap filled with `fill`.
    pub fn new(size: u32, fill: Rgb888) -> Self {
        Self {
            size,
            pixels: vec![fill; (size * size) as usize],
        }
    }

    /// Width and height in pixels.
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Colour at (`x`, `y`), or `None` outside the canvas.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgb888> {
        if x >= self.size || y >= self.size {
            return None;
        }
        self.pixels.get((y * self.size + x) as usize).copied()
    }

    /// Iterate over pixel rows, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[Rgb888]> {
        self.pixels.chunks(self.size.max(1) as usize)
    }

    /// Number of pixels with exactly this colour.
    pub fn count(&self, color: Rgb888) -> usize {
        self.pixels.iter().filter(|p| **p == color).count()
    }

    /// Packed RGB bytes, row-major, three bytes per pixel.
    pub fn to_rgb_bytes(&self) -> Vec<u8> {
        self.pixels
            .iter()
            .flat_map(|p| [p.r(), p.g(), p.b()])
            .collect()
    }

    /// Each row as a string of `rrggbb` hex triplets.
    pub fn hex_rows(&self) -> Vec<String> {
        self.rows()
            .map(|row| {
                row.iter()
                    .map(|p| format!("{:02x}{:02x}{:02x}", p.r(), p.g(), p.b()))
                    .collect()
            })
            .collect()
    }
}

impl OriginDimensions for GlyphBitmap {
    fn size(&self) -> Size {
        Size::new(self.size, self.size)
    }
}

impl DrawTarget for GlyphBitmap {
    type Color = Rgb888;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        let size = self.size as i32;
        for Pixel(point, color) in pixels {
            if (0..size).contains(&point.x) && (0..size).contains(&point.y) {
                let index = (point.y * size + point.x) as usize;
                self.pixels[index] = color;
            }
        }
        Ok(())
    }
}
