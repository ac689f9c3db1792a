//! BLE transport for 8x8 thermal cameras.
//!
//! This crate handles the Bluetooth Low Energy side of thermaview:
//! discovering cameras, connecting with configurable timeouts, and
//! turning the camera's notification stream into completed
//! [`ThermalMatrix`] frames.
//!
//! # Platform Differences
//!
//! Device identification varies by platform due to differences in BLE
//! implementations:
//!
//! - **macOS**: Devices are identified by a UUID assigned by CoreBluetooth.
//!   This UUID is stable for a given device on a given Mac, but differs
//!   between Macs and is not the device's MAC address.
//! - **Linux/Windows**: Devices are identified by their Bluetooth MAC
//!   address (e.g., `AA:BB:CC:DD:EE:FF`).
//!
//! The [`Device::address()`] method returns the appropriate identifier for
//! the platform.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use futures::StreamExt;
//! use thermaview_core::{Device, FrameStream, SessionOptions, scan};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Scan for cameras
//!     let devices = scan::scan_for_devices().await?;
//!     println!("Found {} camera(s)", devices.len());
//!
//!     // Connect and stream frames
//!     let device = Arc::new(Device::connect("GridCam").await?);
//!     let mut frames = FrameStream::open(device.clone(), SessionOptions::default()).await?;
//!
//!     if let Some(frame) = frames.next().await {
//!         let stats = frame?.stats();
//!         println!("max {} min {} avg {}", stats.max, stats.min, stats.avg);
//!     }
//!
//!     frames.close().await?;
//!     device.disconnect().await?;
//!     Ok(())
//! }
//! ```
//!
//! [`ThermalMatrix`]: thermaview_types::ThermalMatrix

pub mod device;
pub mod error;
pub mod scan;
pub mod session;
pub mod util;

// Re-export the UUID constants from thermaview-types for convenience
pub use thermaview_types::uuids;

pub use device::{ConnectionConfig, Device};
pub use error::{DeviceNotFoundReason, Error, Result};
pub use scan::{DiscoveredDevice, ScanOptions, find_device, scan_for_devices};
pub use session::{DeviceFrameExt, FrameResult, FrameStream, SessionOptions};

/// Type alias for a shared device reference.
///
/// `Device` intentionally does not implement `Clone`; wrapping it in `Arc`
/// is the standard pattern for sharing a connection across tasks.
pub type SharedDevice = std::sync::Arc<Device>;
