//! Frame rendering: range classification, color mapping, rasterization,
//! and hot/cold-point annotation.

use thiserror::Error;

use thermaview_types::{DisplaySettings, FrameStats, MATRIX_DIM, ThermalMatrix};

use crate::color::{Rgb, heat_color};
use crate::glyphs::draw_number;
use crate::raster::RasterImage;
use crate::resample::{Bicubic, resample};

/// Side length of the output raster in pixels.
pub const RASTER_DIM: usize = 272;

/// Pixel size of one matrix cell in the output raster (272 / 8).
pub const CELL_PX: usize = RASTER_DIM / MATRIX_DIM;

// Marker geometry differs between the two modes because the outlined square
// hugs the visually meaningful area: 20px over the smoothed gradient, a full
// 34px cell in raw mode.
const SMOOTH_MARKER_PX: usize = 20;
const SMOOTH_LABEL_OFFSET: (usize, usize) = (5, 13);
const SMOOTH_LABEL_SCALE: usize = 2;
const RAW_LABEL_OFFSET: (usize, usize) = (15, 20);
const RAW_LABEL_SCALE: usize = 3;

/// Errors that can abort a single render call.
///
/// A render error never corrupts caller state; the previous raster stays
/// valid and the next complete frame renders normally.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RenderError {
    /// In-range cells exist but their maximum is zero, so normalization
    /// would divide by zero.
    #[error("Degenerate display range: in-range samples are all zero")]
    DegenerateRange,
}

/// The output of one render call: a 272x272 opaque RGBA raster plus the
/// full-matrix statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedFrame {
    /// The rasterized heat map.
    pub image: RasterImage,
    /// Max/min/avg over all 64 cells, unaffected by range filtering.
    pub stats: FrameStats,
}

/// How a cell relates to the configured color range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RangeClass {
    /// Below `min_range`; rendered black.
    BelowRange,
    /// Above `max_range`; rendered white.
    AboveRange,
    /// Inside the inclusive bounds; color mapped.
    InRange,
}

fn classify(sample: u8, settings: &DisplaySettings) -> RangeClass {
    // Order matters for inverted ranges: the low check wins, so every cell
    // comes out black or white consistently instead of erroring.
    if sample < settings.min_range {
        RangeClass::BelowRange
    } else if sample > settings.max_range {
        RangeClass::AboveRange
    } else {
        RangeClass::InRange
    }
}

/// Extremes over the in-range cells only, with the winning cell addresses.
///
/// Seeds are 100 for the minimum and 0 for the maximum; with no in-range
/// cells the seeds survive and the markers land on the origin cell, exactly
/// as the device-local units bound them.
#[derive(Debug, Clone, Copy)]
struct DisplayExtremes {
    max: u8,
    min: u8,
    /// Raster-x of the hottest cell (matrix row index).
    max_x: usize,
    max_y: usize,
    min_x: usize,
    min_y: usize,
    any_in_range: bool,
}

fn scan_display_extremes(matrix: &ThermalMatrix, settings: &DisplaySettings) -> DisplayExtremes {
    let mut extremes = DisplayExtremes {
        max: 0,
        min: 100,
        max_x: 0,
        max_y: 0,
        min_x: 0,
        min_y: 0,
        any_in_range: false,
    };

    // The matrix draws transposed: the row index runs along the raster x
    // axis. The scan order (outer loop over y) decides which cell wins a
    // tie, so it is kept fixed.
    for y in 0..MATRIX_DIM {
        for x in 0..MATRIX_DIM {
            let sample = matrix.get(x, y);
            if classify(sample, settings) != RangeClass::InRange {
                continue;
            }
            extremes.any_in_range = true;
            if extremes.max < sample {
                extremes.max = sample;
                extremes.max_x = x;
                extremes.max_y = y;
            }
            if extremes.min > sample {
                extremes.min = sample;
                extremes.min_x = x;
                extremes.min_y = y;
            }
        }
    }
    extremes
}

/// Render one complete frame.
///
/// Produces either a bicubic-smoothed heat map or, with
/// [`DisplaySettings::raw_mode`], a blocky per-cell fill; both carry the
/// optional hot/cold markers and full-matrix statistics.
///
/// # Errors
///
/// Returns [`RenderError::DegenerateRange`] when in-range cells exist but
/// their maximum is zero. Callers should keep the previous raster on error.
pub fn render(
    matrix: &ThermalMatrix,
    settings: &DisplaySettings,
) -> Result<RenderedFrame, RenderError> {
    let stats = matrix.stats();
    let extremes = scan_display_extremes(matrix, settings);

    if extremes.any_in_range && extremes.max == 0 {
        return Err(RenderError::DegenerateRange);
    }

    // 8x8 source image in cell colors; the matrix row index runs along x.
    let mut source = RasterImage::new(MATRIX_DIM, MATRIX_DIM);
    for y in 0..MATRIX_DIM {
        for x in 0..MATRIX_DIM {
            let sample = matrix.get(x, y);
            let color = match classify(sample, settings) {
                RangeClass::BelowRange => Rgb::BLACK,
                RangeClass::AboveRange => Rgb::WHITE,
                RangeClass::InRange => heat_color(sample, extremes.min, extremes.max),
            };
            source.put_pixel(x, y, color);
        }
    }

    let mut image = if settings.raw_mode {
        let mut image = RasterImage::new(RASTER_DIM, RASTER_DIM);
        for y in 0..MATRIX_DIM {
            for x in 0..MATRIX_DIM {
                image.fill_rect(x * CELL_PX, y * CELL_PX, CELL_PX, CELL_PX, source.pixel(x, y));
            }
        }
        image
    } else {
        resample(&source, RASTER_DIM, RASTER_DIM, &Bicubic)
    };

    let (marker_px, label_offset, label_scale) = if settings.raw_mode {
        (CELL_PX, RAW_LABEL_OFFSET, RAW_LABEL_SCALE)
    } else {
        (SMOOTH_MARKER_PX, SMOOTH_LABEL_OFFSET, SMOOTH_LABEL_SCALE)
    };

    if settings.mark_max {
        draw_marker(
            &mut image,
            extremes.max_x,
            extremes.max_y,
            extremes.max,
            Rgb::RED,
            marker_px,
            label_offset,
            label_scale,
        );
    }
    if settings.mark_min {
        draw_marker(
            &mut image,
            extremes.min_x,
            extremes.min_y,
            extremes.min,
            Rgb::BLUE,
            marker_px,
            label_offset,
            label_scale,
        );
    }

    Ok(RenderedFrame { image, stats })
}

#[allow(clippy::too_many_arguments)]
fn draw_marker(
    image: &mut RasterImage,
    cell_x: usize,
    cell_y: usize,
    value: u8,
    color: Rgb,
    marker_px: usize,
    label_offset: (usize, usize),
    label_scale: usize,
) {
    let x = cell_x * CELL_PX;
    let y = cell_y * CELL_PX;
    image.stroke_rect(x, y, marker_px, marker_px, color);
    draw_number(
        image,
        x + label_offset.0,
        y + label_offset.1,
        u32::from(value),
        label_scale,
        color,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::hsv_to_rgb;
    use thermaview_types::DisplaySettings;

    fn uniform(value: u8) -> ThermalMatrix {
        ThermalMatrix::from_cells([[value; 8]; 8])
    }

    #[test]
    fn test_uniform_ten_raw_blocks() {
        // Uniform 10, range 0..=100, raw mode:
        // t' = 10 * (100/10) - 10 = 90 -> hue 240 - 216 = 24.
        let settings = DisplaySettings::builder().raw_mode(true).build();
        let frame = render(&uniform(10), &settings).unwrap();

        let expected = hsv_to_rgb(24.0, 1.0, 1.0);
        assert_eq!(expected, Rgb { r: 255, g: 102, b: 0 });

        for &(x, y) in &[(0, 0), (33, 33), (34, 0), (170, 200), (271, 271)] {
            assert_eq!(frame.image.pixel(x, y), expected, "pixel ({x},{y})");
        }
        assert_eq!(frame.stats.max, 10);
        assert_eq!(frame.stats.min, 10);
        assert!((frame.stats.avg - 10.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_above_range_renders_white() {
        // Any sample above max_range is white no matter the palette.
        let mut cells = [[50u8; 8]; 8];
        cells[4][6] = 110;
        let matrix = ThermalMatrix::from_cells(cells);
        let settings = DisplaySettings::builder().max_range(100).raw_mode(true).build();

        let frame = render(&matrix, &settings).unwrap();
        // Cell (row 4, col 6) lands at raster x = 4*34, y = 6*34.
        assert_eq!(frame.image.pixel(4 * CELL_PX + 1, 6 * CELL_PX + 1), Rgb::WHITE);
    }

    #[test]
    fn test_below_range_renders_black() {
        let mut cells = [[50u8; 8]; 8];
        cells[0][0] = 5;
        let matrix = ThermalMatrix::from_cells(cells);
        let settings = DisplaySettings::builder().min_range(20).raw_mode(true).build();

        let frame = render(&matrix, &settings).unwrap();
        assert_eq!(frame.image.pixel(0, 0), Rgb::BLACK);
    }

    #[test]
    fn test_min_range_bound_is_inclusive() {
        // A matrix sitting exactly on min_range is entirely in range.
        let settings = DisplaySettings::builder().min_range(30).raw_mode(true).build();
        let frame = render(&uniform(30), &settings).unwrap();
        let corner = frame.image.pixel(0, 0);
        assert_ne!(corner, Rgb::BLACK);
        assert_ne!(corner, Rgb::WHITE);
    }

    #[test]
    fn test_render_is_idempotent() {
        let mut cells = [[20u8; 8]; 8];
        cells[2][3] = 90;
        cells[7][7] = 4;
        let matrix = ThermalMatrix::from_cells(cells);
        let settings = DisplaySettings::builder().mark_max(true).mark_min(true).build();

        let a = render(&matrix, &settings).unwrap();
        let b = render(&matrix, &settings).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_smooth_uniform_matrix_stays_uniform() {
        let frame = render(&uniform(40), &DisplaySettings::default()).unwrap();
        let expected = frame.image.pixel(0, 0);
        for &(x, y) in &[(271, 0), (0, 271), (136, 136), (271, 271)] {
            assert_eq!(frame.image.pixel(x, y), expected);
        }
    }

    #[test]
    fn test_no_markers_without_flags() {
        // Uniform 10 maps to hue 24; pure red and pure blue can only come
        // from the marker strokes.
        let settings = DisplaySettings::builder().raw_mode(true).build();
        let frame = render(&uniform(10), &settings).unwrap();

        for y in 0..RASTER_DIM {
            for x in 0..RASTER_DIM {
                let pixel = frame.image.pixel(x, y);
                assert_ne!(pixel, Rgb::RED);
                assert_ne!(pixel, Rgb::BLUE);
            }
        }
    }

    #[test]
    fn test_max_marker_position_raw() {
        let mut cells = [[10u8; 8]; 8];
        cells[2][5] = 99; // matrix row 2, column 5
        let matrix = ThermalMatrix::from_cells(cells);
        let settings = DisplaySettings::builder().raw_mode(true).mark_max(true).build();

        let frame = render(&matrix, &settings).unwrap();
        // Row index runs along x: square outline starts at (2*34, 5*34).
        assert_eq!(frame.image.pixel(2 * CELL_PX, 5 * CELL_PX), Rgb::RED);
        assert_eq!(
            frame.image.pixel(2 * CELL_PX + CELL_PX - 1, 5 * CELL_PX),
            Rgb::RED
        );
    }

    #[test]
    fn test_min_marker_position_smooth() {
        let mut cells = [[80u8; 8]; 8];
        cells[6][1] = 12;
        let matrix = ThermalMatrix::from_cells(cells);
        let settings = DisplaySettings::builder().mark_min(true).build();

        let frame = render(&matrix, &settings).unwrap();
        // 20x20 outline at the cell origin in smooth mode.
        assert_eq!(frame.image.pixel(6 * CELL_PX, 1 * CELL_PX), Rgb::BLUE);
        assert_eq!(
            frame.image.pixel(6 * CELL_PX + SMOOTH_MARKER_PX - 1, 1 * CELL_PX),
            Rgb::BLUE
        );
    }

    #[test]
    fn test_degenerate_range_is_an_error() {
        // Everything in range but zero-valued: normalization would divide
        // by zero.
        let result = render(&uniform(0), &DisplaySettings::default());
        assert!(matches!(result, Err(RenderError::DegenerateRange)));
    }

    #[test]
    fn test_all_out_of_range_renders_without_error() {
        // No in-range cell means the ramp is never evaluated.
        let settings = DisplaySettings::builder()
            .min_range(60)
            .max_range(100)
            .raw_mode(true)
            .build();
        let frame = render(&uniform(50), &settings).unwrap();
        assert_eq!(frame.image.pixel(100, 100), Rgb::BLACK);
    }

    #[test]
    fn test_inverted_range_degrades_consistently() {
        let settings = DisplaySettings::builder()
            .min_range(80)
            .max_range(20)
            .raw_mode(true)
            .build();

        // Below min_range: black.
        let frame = render(&uniform(50), &settings).unwrap();
        assert_eq!(frame.image.pixel(10, 10), Rgb::BLACK);

        // At or above min_range (and necessarily above max_range): white.
        let frame = render(&uniform(90), &settings).unwrap();
        assert_eq!(frame.image.pixel(10, 10), Rgb::WHITE);
    }

    #[test]
    fn test_stats_ignore_range_filter() {
        let mut cells = [[30u8; 8]; 8];
        cells[0][0] = 120; // filtered out as above-range
        cells[7][7] = 1; // filtered out as below-range
        let matrix = ThermalMatrix::from_cells(cells);
        let settings = DisplaySettings::builder()
            .min_range(20)
            .max_range(100)
            .raw_mode(true)
            .build();

        let frame = render(&matrix, &settings).unwrap();
        assert_eq!(frame.stats.max, 120);
        assert_eq!(frame.stats.min, 1);
    }
}
