//! RGBA images handed to texture consumers and preview exporters.

use crate::falloff::FalloffMask;
use crate::region::Color;

/// A 2D image stored as row-major RGBA pixels.
#[derive(Clone, Debug, PartialEq)]
pub struct TextureImage {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// Pixel data in row-major RGBA format. Length = `width * height * 4`.
    pub pixels: Vec<u8>,
}

impl TextureImage {
    /// Create a transparent black image with the given dimensions.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; (width * height * 4) as usize],
        }
    }

    /// Grayscale image of a falloff mask, white where the mask is 0.
    pub fn from_falloff(mask: &FalloffMask, width: u32, height: u32) -> Self {
        let mut image = Self::new(width, height);
        for (i, v) in mask
            .map(width as usize, height as usize)
            .into_iter()
            .enumerate()
        {
            let x = i as u32 % width;
            let y = i as u32 / width;
            image.set_color(x, y, Color::WHITE.lerp(Color::BLACK, v));
        }
        image
    }

    /// Set a single pixel.
    ///
    /// # Panics
    ///
    /// Panics if `x >= width` or `y >= height`.
    pub fn set_color(&mut self, x: u32, y: u32, color: Color) {
        assert!(x < self.width && y < self.height);
        let idx = ((y * self.width + x) * 4) as usize;
        self.pixels[idx..idx + 4].copy_from_slice(&color.to_array());
    }

    /// Get a single pixel.
    ///
    /// # Panics
    ///
    /// Panics if `x >= width` or `y >= height`.
    pub fn color(&self, x: u32, y: u32) -> Color {
        assert!(x < self.width && y < self.height);
        let idx = ((y * self.width + x) * 4) as usize;
        Color::rgba(
            self.pixels[idx],
            self.pixels[idx + 1],
            self.pixels[idx + 2],
            self.pixels[idx + 3],
        )
    }

    /// Copy a `width` x `height` rectangle starting at `(x, y)`.
    ///
    /// Returns `None` if the rectangle leaves the image.
    pub fn crop(&self, x: u32, y: u32, width: u32, height: u32) -> Option<Self> {
        if x + width > self.width || y + height > self.height {
            return None;
        }
        let mut out = Self::new(width, height);
        let row_bytes = (width * 4) as usize;
        for row in 0..height {
            let src = (((y + row) * self.width + x) * 4) as usize;
            let dst = (row * width * 4) as usize;
            out.pixels[dst..dst + row_bytes].copy_from_slice(&self.pixels[src..src + row_bytes]);
        }
        Some(out)
    }

    /// Returns `(width, height)`.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_correct_dimensions() {
        let image = TextureImage::new(256, 128);
        assert_eq!(image.dimensions(), (256, 128));
        assert_eq!(image.pixels.len(), 256 * 128 * 4);
    }

    #[test]
    fn test_set_and_get_color() {
        let mut image = TextureImage::new(8, 8);
        let c = Color::rgba(10, 20, 30, 40);
        image.set_color(2, 3, c);
        assert_eq!(image.color(2, 3), c);
        let idx = ((3 * 8 + 2) * 4) as usize;
        assert_eq!(&image.pixels[idx..idx + 4], &[10, 20, 30, 40]);
    }

    #[test]
    fn test_crop_copies_rows() {
        let mut image = TextureImage::new(6, 4);
        image.set_color(3, 2, Color::WHITE);
        let cropped = image.crop(2, 1, 3, 3).unwrap();
        assert_eq!(cropped.dimensions(), (3, 3));
        assert_eq!(cropped.color(1, 1), Color::WHITE);
        assert_eq!(cropped.color(0, 0), Color::UNCLASSIFIED);
        assert!(image.crop(4, 0, 3, 1).is_none());
    }

    #[test]
    fn test_falloff_image_center_white() {
        let mask = FalloffMask {
            transition: 3.0,
            bias: 2.2,
        };
        let image = TextureImage::from_falloff(&mask, 32, 32);
        assert_eq!(image.color(16, 16), Color::WHITE);
        assert_eq!(image.color(0, 0), Color::BLACK);
    }
}
