//! Error types for data parsing in thermaview-types.

use thiserror::Error;

/// Errors that can occur when decoding thermal camera packets.
///
/// This error type is platform-agnostic and does not include
/// BLE-specific errors (those belong in thermaview-core).
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ParseError {
    /// A notification carried the wrong number of bytes for a frame packet.
    #[error("Invalid packet length: expected {expected} bytes, got {actual}")]
    InvalidPacketLength {
        /// Expected packet size.
        expected: usize,
        /// Actual packet size received.
        actual: usize,
    },

    /// A decoded field held a value outside its valid domain.
    #[error("Invalid value: {0}")]
    InvalidValue(String),
}

/// Result type alias using thermaview-types' ParseError type.
pub type ParseResult<T> = std::result::Result<T, ParseError>;
