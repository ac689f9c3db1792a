//! Bluetooth UUIDs for the thermal camera peripheral.
//!
//! This module contains all the UUIDs needed to communicate with the
//! 8x8 thermal camera over Bluetooth Low Energy.

use uuid::{Uuid, uuid};

/// Primary GATT service exposed by the thermal camera.
pub const THERMAL_SERVICE: Uuid = uuid!("0147088e-4efd-40fa-95f3-e6c7a1285607");

/// Matrix stream characteristic. Notifies 16-byte frame packets,
/// four packets per complete 8x8 frame.
pub const MATRIX_STREAM: Uuid = uuid!("943f94a6-3a7e-45df-8614-1e5f61fe334f");

/// Command characteristic for short write-only control payloads.
pub const COMMAND: Uuid = uuid!("95243321-cb66-4137-802f-4cb51fd4818d");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thermal_service_uuid() {
        let expected = "0147088e-4efd-40fa-95f3-e6c7a1285607";
        assert_eq!(THERMAL_SERVICE.to_string(), expected);
    }

    #[test]
    fn test_matrix_stream_uuid() {
        let expected = "943f94a6-3a7e-45df-8614-1e5f61fe334f";
        assert_eq!(MATRIX_STREAM.to_string(), expected);
    }

    #[test]
    fn test_command_uuid() {
        let expected = "95243321-cb66-4137-802f-4cb51fd4818d";
        assert_eq!(COMMAND.to_string(), expected);
    }

    #[test]
    fn test_uuids_are_distinct() {
        assert_ne!(THERMAL_SERVICE, MATRIX_STREAM);
        assert_ne!(MATRIX_STREAM, COMMAND);
        assert_ne!(THERMAL_SERVICE, COMMAND);
    }
}
