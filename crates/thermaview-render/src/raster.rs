//! RGBA raster surface.
//!
//! The renderer composes into a plain byte buffer; binding it to a canvas,
//! terminal, or file sink is the caller's concern.

use crate::color::Rgb;

/// Number of bytes per pixel (RGBA).
pub const BYTES_PER_PIXEL: usize = 4;

/// A fixed-size, row-major RGBA image with opaque alpha.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl RasterImage {
    /// Create an opaque black image.
    #[must_use]
    pub fn new(width: usize, height: usize) -> Self {
        let mut data = vec![0u8; width * height * BYTES_PER_PIXEL];
        for alpha in data.iter_mut().skip(3).step_by(BYTES_PER_PIXEL) {
            *alpha = 255;
        }
        Self {
            width,
            height,
            data,
        }
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Raw RGBA bytes, row-major.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Read one pixel. `x` and `y` must be inside the image.
    #[must_use]
    pub fn pixel(&self, x: usize, y: usize) -> Rgb {
        let i = (y * self.width + x) * BYTES_PER_PIXEL;
        Rgb {
            r: self.data[i],
            g: self.data[i + 1],
            b: self.data[i + 2],
        }
    }

    /// Write one pixel; coordinates outside the image are ignored.
    pub fn put_pixel(&mut self, x: usize, y: usize, color: Rgb) {
        if x >= self.width || y >= self.height {
            return;
        }
        let i = (y * self.width + x) * BYTES_PER_PIXEL;
        self.data[i] = color.r;
        self.data[i + 1] = color.g;
        self.data[i + 2] = color.b;
        self.data[i + 3] = 255;
    }

    /// Fill an axis-aligned rectangle, clipped to the image.
    pub fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, color: Rgb) {
        let x_end = (x + w).min(self.width);
        let y_end = (y + h).min(self.height);
        for py in y..y_end {
            for px in x..x_end {
                self.put_pixel(px, py, color);
            }
        }
    }

    /// Draw a one-pixel rectangle outline, clipped to the image.
    pub fn stroke_rect(&mut self, x: usize, y: usize, w: usize, h: usize, color: Rgb) {
        if w == 0 || h == 0 {
            return;
        }
        for px in x..x + w {
            self.put_pixel(px, y, color);
            self.put_pixel(px, y + h - 1, color);
        }
        for py in y..y + h {
            self.put_pixel(x, py, color);
            self.put_pixel(x + w - 1, py, color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_image_is_opaque_black() {
        let image = RasterImage::new(4, 3);
        assert_eq!(image.as_bytes().len(), 4 * 3 * BYTES_PER_PIXEL);
        assert_eq!(image.pixel(0, 0), Rgb::BLACK);
        assert_eq!(image.as_bytes()[3], 255);
    }

    #[test]
    fn test_put_and_read_pixel() {
        let mut image = RasterImage::new(8, 8);
        image.put_pixel(2, 5, Rgb::RED);
        assert_eq!(image.pixel(2, 5), Rgb::RED);
        assert_eq!(image.pixel(5, 2), Rgb::BLACK);
    }

    #[test]
    fn test_out_of_bounds_write_is_ignored() {
        let mut image = RasterImage::new(4, 4);
        let before = image.clone();
        image.put_pixel(4, 0, Rgb::WHITE);
        image.put_pixel(0, 100, Rgb::WHITE);
        assert_eq!(image, before);
    }

    #[test]
    fn test_fill_rect_clips() {
        let mut image = RasterImage::new(4, 4);
        image.fill_rect(2, 2, 10, 10, Rgb::WHITE);
        assert_eq!(image.pixel(3, 3), Rgb::WHITE);
        assert_eq!(image.pixel(1, 1), Rgb::BLACK);
    }

    #[test]
    fn test_stroke_rect_outline_only() {
        let mut image = RasterImage::new(10, 10);
        image.stroke_rect(1, 1, 5, 5, Rgb::RED);
        assert_eq!(image.pixel(1, 1), Rgb::RED);
        assert_eq!(image.pixel(5, 1), Rgb::RED);
        assert_eq!(image.pixel(1, 5), Rgb::RED);
        assert_eq!(image.pixel(3, 3), Rgb::BLACK);
    }
}
