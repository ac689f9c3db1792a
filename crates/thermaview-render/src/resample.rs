//! Generic separable 2D image resampling.
//!
//! The smooth display mode treats the 8x8 color grid as a tiny image and
//! upscales it with a convolution filter applied independently along each
//! axis. The filter is pluggable through [`FilterKernel`]; the viewer uses
//! the 4-tap [`Bicubic`] kernel.

use crate::raster::{BYTES_PER_PIXEL, RasterImage};

/// A separable reconstruction filter.
pub trait FilterKernel {
    /// Half-width of the kernel in source pixels.
    fn support(&self) -> f64;

    /// Filter weight at distance `x` from the sample center.
    fn weight(&self, x: f64) -> f64;
}

/// Cubic convolution kernel (a = -0.5), four taps per axis.
#[derive(Debug, Clone, Copy, Default)]
pub struct Bicubic;

impl FilterKernel for Bicubic {
    fn support(&self) -> f64 {
        2.0
    }

    fn weight(&self, x: f64) -> f64 {
        const A: f64 = -0.5;
        let x = x.abs();
        if x <= 1.0 {
            (A + 2.0) * x * x * x - (A + 3.0) * x * x + 1.0
        } else if x < 2.0 {
            A * x * x * x - 5.0 * A * x * x + 8.0 * A * x - 4.0 * A
        } else {
            0.0
        }
    }
}

/// Per-output-coordinate tap list: first source index plus normalized weights.
struct TapTable {
    taps: Vec<(usize, Vec<f64>)>,
}

impl TapTable {
    /// Build the contribution table for one axis.
    ///
    /// Output pixel centers are mapped back into source space with the
    /// standard half-pixel offset; taps beyond the edges are clamped to the
    /// boundary sample, and each tap list is normalized to unit sum.
    fn build<K: FilterKernel>(src_len: usize, dst_len: usize, kernel: &K) -> Self {
        let ratio = src_len as f64 / dst_len as f64;
        // Widen the kernel when minifying so every source pixel contributes.
        let scale = ratio.max(1.0);
        let support = kernel.support() * scale;

        let mut taps = Vec::with_capacity(dst_len);
        for dst in 0..dst_len {
            let center = (dst as f64 + 0.5) * ratio - 0.5;
            let left = (center - support).ceil() as isize;
            let right = (center + support).floor() as isize;

            let mut weights = Vec::with_capacity((right - left + 1) as usize);
            let mut sum = 0.0;
            for src in left..=right {
                let w = kernel.weight((src as f64 - center) / scale);
                weights.push(w);
                sum += w;
            }
            if sum != 0.0 {
                for w in &mut weights {
                    *w /= sum;
                }
            }

            let start = left.max(0).min(src_len as isize - 1) as usize;
            // Clamped taps are folded into the boundary samples below.
            taps.push((start, Self::fold_clamped(weights, left, src_len)));
        }
        Self { taps }
    }

    /// Merge weights of out-of-range taps into the nearest edge sample.
    fn fold_clamped(weights: Vec<f64>, left: isize, src_len: usize) -> Vec<f64> {
        let max = src_len as isize - 1;
        let start = left.max(0).min(max);
        let end = (left + weights.len() as isize - 1).max(0).min(max);
        let mut folded = vec![0.0; (end - start + 1) as usize];
        for (i, w) in weights.into_iter().enumerate() {
            let src = (left + i as isize).max(0).min(max);
            folded[(src - start) as usize] += w;
        }
        folded
    }
}

/// Resample `src` to `dst_width` x `dst_height` with the given kernel.
///
/// The filter runs separably: a horizontal pass into an intermediate
/// buffer, then a vertical pass. Channel values are accumulated in floating
/// point and clamped back to 0-255.
#[must_use]
pub fn resample<K: FilterKernel>(
    src: &RasterImage,
    dst_width: usize,
    dst_height: usize,
    kernel: &K,
) -> RasterImage {
    let src_w = src.width();
    let src_h = src.height();
    let src_bytes = src.as_bytes();

    // Horizontal pass: src_w x src_h -> dst_width x src_h.
    let h_taps = TapTable::build(src_w, dst_width, kernel);
    let mut mid = vec![0.0f64; dst_width * src_h * BYTES_PER_PIXEL];
    for y in 0..src_h {
        for (dx, (start, weights)) in h_taps.taps.iter().enumerate() {
            let mut acc = [0.0f64; BYTES_PER_PIXEL];
            for (i, w) in weights.iter().enumerate() {
                let offset = (y * src_w + start + i) * BYTES_PER_PIXEL;
                for (channel, value) in acc.iter_mut().enumerate() {
                    *value += f64::from(src_bytes[offset + channel]) * w;
                }
            }
            let offset = (y * dst_width + dx) * BYTES_PER_PIXEL;
            mid[offset..offset + BYTES_PER_PIXEL].copy_from_slice(&acc);
        }
    }

    // Vertical pass: dst_width x src_h -> dst_width x dst_height.
    let v_taps = TapTable::build(src_h, dst_height, kernel);
    let mut dst = RasterImage::new(dst_width, dst_height);
    for (dy, (start, weights)) in v_taps.taps.iter().enumerate() {
        for x in 0..dst_width {
            let mut acc = [0.0f64; BYTES_PER_PIXEL];
            for (i, w) in weights.iter().enumerate() {
                let offset = ((start + i) * dst_width + x) * BYTES_PER_PIXEL;
                for (channel, value) in acc.iter_mut().enumerate() {
                    *value += mid[offset + channel] * w;
                }
            }
            dst.put_pixel(
                x,
                dy,
                crate::color::Rgb {
                    r: clamp_channel(acc[0]),
                    g: clamp_channel(acc[1]),
                    b: clamp_channel(acc[2]),
                },
            );
        }
    }
    dst
}

fn clamp_channel(value: f64) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}
