//! Tiny built-in digit font for marker value labels.
//!
//! The raster pipeline has no text backend, so the numeric labels next to
//! the hot/cold markers are stamped from a 3x5 bitmap per digit, scaled by
//! an integer factor.

use crate::color::Rgb;
use crate::raster::RasterImage;

/// Glyph cell width in font units.
pub const GLYPH_WIDTH: usize = 3;

/// Glyph cell height in font units.
pub const GLYPH_HEIGHT: usize = 5;

/// One column of spacing between digits, in font units.
const GLYPH_SPACING: usize = 1;

// Rows top to bottom, 3 bits each, MSB is the left column.
const DIGITS: [[u8; GLYPH_HEIGHT]; 10] = [
    [0b111, 0b101, 0b101, 0b101, 0b111], // 0
    [0b010, 0b110, 0b010, 0b010, 0b111], // 1
    [0b111, 0b001, 0b111, 0b100, 0b111], // 2
    [0b111, 0b001, 0b111, 0b001, 0b111], // 3
    [0b101, 0b101, 0b111, 0b001, 0b001], // 4
    [0b111, 0b100, 0b111, 0b001, 0b111], // 5
    [0b111, 0b100, 0b111, 0b101, 0b111], // 6
    [0b111, 0b001, 0b010, 0b010, 0b010], // 7
    [0b111, 0b101, 0b111, 0b101, 0b111], // 8
    [0b111, 0b101, 0b111, 0b001, 0b111], // 9
];

/// Stamp one digit (0-9) with its top-left corner at `(x, y)`.
fn draw_digit(image: &mut RasterImage, x: usize, y: usize, digit: u8, scale: usize, color: Rgb) {
    let glyph = &DIGITS[usize::from(digit) % 10];
    for (row, bits) in glyph.iter().enumerate() {
        for col in 0..GLYPH_WIDTH {
            if bits & (1 << (GLYPH_WIDTH - 1 - col)) != 0 {
                image.fill_rect(x + col * scale, y + row * scale, scale, scale, color);
            }
        }
    }
}

/// Draw a non-negative number with its top-left corner at `(x, y)`.
///
/// Returns the width drawn in pixels.
pub fn draw_number(
    image: &mut RasterImage,
    x: usize,
    y: usize,
    value: u32,
    scale: usize,
    color: Rgb,
) -> usize {
    let mut digits = [0u8; 10];
    let mut count = 0;
    let mut rest = value;
    loop {
        digits[count] = (rest % 10) as u8;
        count += 1;
        rest /= 10;
        if rest == 0 {
            break;
        }
    }

    let advance = (GLYPH_WIDTH + GLYPH_SPACING) * scale;
    for (i, digit) in digits[..count].iter().rev().enumerate() {
        draw_digit(image, x + i * advance, y, *digit, scale, color);
    }
    count * advance
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draw_number_returns_width() {
        let mut image = RasterImage::new(64, 16);
        assert_eq!(draw_number(&mut image, 0, 0, 7, 1, Rgb::WHITE), 4);
        assert_eq!(draw_number(&mut image, 0, 8, 100, 2, Rgb::WHITE), 24);
    }

    #[test]
    fn test_digit_one_pixels() {
        let mut image = RasterImage::new(8, 8);
        draw_number(&mut image, 0, 0, 1, 1, Rgb::WHITE);
        // Bottom row of "1" is fully lit.
        assert_eq!(image.pixel(0, 4), Rgb::WHITE);
        assert_eq!(image.pixel(1, 4), Rgb::WHITE);
        assert_eq!(image.pixel(2, 4), Rgb::WHITE);
        // Top-left corner is not.
        assert_eq!(image.pixel(0, 0), Rgb::BLACK);
    }

    #[test]
    fn test_zero_draws_single_glyph() {
        let mut image = RasterImage::new(16, 8);
        let width = draw_number(&mut image, 0, 0, 0, 1, Rgb::WHITE);
        assert_eq!(width, 4);
        assert_eq!(image.pixel(1, 0), Rgb::WHITE);
        assert_eq!(image.pixel(1, 2), Rgb::BLACK); // hollow center of 0
    }
}
