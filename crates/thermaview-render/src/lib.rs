//! Pure rasterization pipeline for 8x8 thermal camera frames.
//!
//! This crate turns a completed [`ThermalMatrix`] plus ephemeral
//! [`DisplaySettings`] into a 272x272 opaque RGBA raster and the frame's
//! summary statistics. It is display-agnostic: binding the raster to a
//! canvas, terminal, or file sink happens at the boundary.
//!
//! # Pipeline
//!
//! ```text
//! ThermalMatrix + DisplaySettings
//!     -> range classification (black / white / in-range)
//!     -> HSV heat ramp against the in-range display extremes
//!     -> bicubic upscale (or raw 34px blocks)
//!     -> hot/cold markers
//!     -> RenderedFrame { RasterImage, FrameStats }
//! ```
//!
//! # Example
//!
//! ```
//! use thermaview_render::{render, RASTER_DIM};
//! use thermaview_types::{DisplaySettings, ThermalMatrix};
//!
//! let matrix = ThermalMatrix::from_cells([[30; 8]; 8]);
//! let frame = render(&matrix, &DisplaySettings::default()).unwrap();
//! assert_eq!(frame.image.width(), RASTER_DIM);
//! ```
//!
//! [`ThermalMatrix`]: thermaview_types::ThermalMatrix
//! [`DisplaySettings`]: thermaview_types::DisplaySettings

pub mod color;
pub mod glyphs;
pub mod raster;
pub mod renderer;
pub mod resample;

pub use color::{Rgb, heat_color, hsv_to_rgb};
pub use raster::{BYTES_PER_PIXEL, RasterImage};
pub use renderer::{CELL_PX, RASTER_DIM, RenderError, RenderedFrame, render};
pub use resample::{Bicubic, FilterKernel, resample};
