//! Temperature-to-color mapping.
//!
//! The viewer's palette is a plain HSV ramp: cold is blue (hue 240), hot is
//! red (hue 0), full saturation and value throughout. The hue a given
//! temperature gets depends on the in-range display extremes, so adjusting
//! the range bounds recolors the whole image.

/// An 8-bit RGB triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };
    pub const WHITE: Rgb = Rgb {
        r: 255,
        g: 255,
        b: 255,
    };
    pub const RED: Rgb = Rgb { r: 255, g: 0, b: 0 };
    pub const BLUE: Rgb = Rgb { r: 0, g: 0, b: 255 };
}

/// Convert an HSV color to RGB.
///
/// `hue` is in degrees and may be any finite value; it is wrapped into
/// [0, 360). `saturation` and `value` are clamped to [0, 1].
#[must_use]
pub fn hsv_to_rgb(hue: f64, saturation: f64, value: f64) -> Rgb {
    let h = hue.rem_euclid(360.0);
    let s = saturation.clamp(0.0, 1.0);
    let v = value.clamp(0.0, 1.0);

    let c = v * s;
    let x = c * (1.0 - ((h / 60.0).rem_euclid(2.0) - 1.0).abs());
    let m = v - c;

    let (r, g, b) = match h {
        h if h < 60.0 => (c, x, 0.0),
        h if h < 120.0 => (x, c, 0.0),
        h if h < 180.0 => (0.0, c, x),
        h if h < 240.0 => (0.0, x, c),
        h if h < 300.0 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };

    Rgb {
        r: ((r + m) * 255.0).round() as u8,
        g: ((g + m) * 255.0).round() as u8,
        b: ((b + m) * 255.0).round() as u8,
    }
}

/// Map an in-range temperature sample to its display color.
///
/// The sample is first normalized against the in-range display extremes,
/// `t' = t * (100 / display_max) - display_min`, then run through the hue
/// ramp `240 - 2.4 * t'`. Callers must guarantee `display_max > 0`.
#[must_use]
pub fn heat_color(sample: u8, display_min: u8, display_max: u8) -> Rgb {
    debug_assert!(display_max > 0, "degenerate display range");
    let normalized =
        f64::from(sample) * (100.0 / f64::from(display_max)) - f64::from(display_min);
    hsv_to_rgb(240.0 - 2.4 * normalized, 1.0, 1.0)
}
