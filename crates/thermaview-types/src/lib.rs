//! Platform-agnostic types for 8x8 BLE thermal cameras.
//!
//! This crate provides the protocol layer shared by every thermaview
//! front end: notification packet decoding, frame assembly, display
//! settings, and the UUID constants of the camera's GATT service.
//! It has no BLE or I/O dependencies of its own.
//!
//! # Data flow
//!
//! ```text
//! 16-byte notification -> FramePacket -> MatrixAssembler -> ThermalMatrix
//! ```
//!
//! # Example
//!
//! ```
//! use thermaview_types::{FramePacket, MatrixAssembler};
//!
//! let mut assembler = MatrixAssembler::new();
//! let packet = FramePacket { vertical_address: 3, samples: [30; 16] };
//! let frame = assembler.ingest(&packet.to_bytes()).unwrap();
//! assert!(frame.is_some());
//! ```

pub mod error;
pub mod matrix;
pub mod packet;
pub mod settings;
pub mod uuid;

pub use error::{ParseError, ParseResult};
pub use matrix::{FrameStats, IDLE_CELL, MATRIX_DIM, MatrixAssembler, ThermalMatrix};
pub use packet::{FramePacket, PACKET_LEN, PACKETS_PER_FRAME, SAMPLES_PER_PACKET};
pub use settings::{DisplaySettings, DisplaySettingsBuilder};
pub use uuid as uuids;
