//! In-memory RGB canvas that charts are drawn onto before encoding.

use std::convert::Infallible;
use std::io::Cursor;

use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use image::{ImageBuffer, ImageFormat, Rgb};

use crate::errors::RenderError;

/// Heap-backed pixel buffer implementing `DrawTarget<Color = Rgb888>`.
pub struct Canvas {
    width: u32,
    height: u32,
    pixels: Vec<Rgb888>,
}

impl Canvas {
    pub fn new(width: u32, height: u32, background: Rgb888) -> Self {
        Self {
            width,
            height,
            pixels: vec![background; width as usize * height as usize],
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgb888> {
        if x < self.width && y < self.height {
            Some(self.pixels[self.index(x as usize, y as usize)])
        } else {
            None
        }
    }

    #[inline]
    fn index(&self, x: usize, y: usize) -> usize {
        y * self.width as usize + x
    }

    #[inline]
    fn set_pixel(&mut self, x: usize, y: usize, color: Rgb888) {
        let idx = self.index(x, y);
        self.pixels[idx] = color;
    }

    /// Encode the canvas as a PNG image.
    pub fn to_png(&self) -> Result<Vec<u8>, RenderError> {
        let image = ImageBuffer::from_fn(self.width, self.height, |x, y| {
            let color = self.pixels[self.index(x as usize, y as usize)];
            Rgb([color.r(), color.g(), color.b()])
        });

        let mut bytes = Vec::new();
        image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;

        Ok(bytes)
    }
}

impl OriginDimensions for Canvas {
    fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

impl DrawTarget for Canvas {
    type Color = Rgb888;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        let w = self.width as usize;
        let h = self.height as usize;

        for Pixel(coord, color) in pixels {
            if coord.x >= 0 && coord.y >= 0 && (coord.x as usize) < w && (coord.y as usize) < h {
                self.set_pixel(coord.x as usize, coord.y as usize, color);
            }
        }
        Ok(())
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        let area = area.intersection(&self.bounding_box());

        if let Some(bottom_right) = area.bottom_right() {
            for y in area.top_left.y..=bottom_right.y {
                for x in area.top_left.x..=bottom_right.x {
                    self.set_pixel(x as usize, y as usize, color);
                }
            }
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.pixels.fill(color);
        Ok(())
    }
}
