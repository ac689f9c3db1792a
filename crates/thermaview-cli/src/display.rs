//! ANSI terminal display for rendered frames.
//!
//! Paints the 272x272 raster with truecolor half-block characters. Each
//! `▀` cell carries two pixels (foreground above, background below), so
//! the image lands in the terminal as a 68x34 character grid.

use std::io::{self, Write};

use crossterm::style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor};
use crossterm::{cursor, queue, terminal};

use thermaview_render::{RasterImage, Rgb};

/// Horizontal pixels folded into one character column.
const X_STEP: usize = 4;

/// Vertical pixels folded into one character row (two sampled per row).
const Y_STEP: usize = 8;

fn to_ansi(color: Rgb) -> Color {
    Color::Rgb {
        r: color.r,
        g: color.g,
        b: color.b,
    }
}

/// Prepare the terminal for live frame painting.
pub fn enter(out: &mut impl Write) -> io::Result<()> {
    queue!(
        out,
        terminal::Clear(terminal::ClearType::All),
        cursor::Hide,
        cursor::MoveTo(0, 0)
    )?;
    out.flush()
}

/// Restore the terminal after live frame painting.
pub fn leave(out: &mut impl Write) -> io::Result<()> {
    queue!(out, ResetColor, cursor::Show)?;
    out.flush()
}

/// Paint one rendered frame at the top-left of the terminal.
///
/// The caller is expected to have called [`enter`] first; successive
/// frames overwrite each other in place.
pub fn draw_frame(out: &mut impl Write, image: &RasterImage) -> io::Result<()> {
    queue!(out, cursor::MoveTo(0, 0))?;

    let cols = image.width() / X_STEP;
    let rows = image.height() / Y_STEP;

    for row in 0..rows {
        let y_top = row * Y_STEP;
        let y_bottom = y_top + Y_STEP / 2;

        for col in 0..cols {
            let x = col * X_STEP;
            queue!(
                out,
                SetForegroundColor(to_ansi(image.pixel(x, y_top))),
                SetBackgroundColor(to_ansi(image.pixel(x, y_bottom))),
                Print("▀")
            )?;
        }
        queue!(out, ResetColor, Print("\r\n"))?;
    }

    out.flush()
}
