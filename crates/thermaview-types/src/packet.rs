//! Frame packet decoding.
//!
//! The camera streams one complete 8x8 frame as four 16-byte notification
//! packets. Every byte carries a 7-bit temperature sample; the high bits of
//! bytes 0 and 1 are spare and jointly encode a 2-bit vertical address that
//! selects which row pair of the matrix the packet updates.

use crate::error::ParseError;

/// Size of one notification packet in bytes.
pub const PACKET_LEN: usize = 16;

/// Number of temperature samples carried by one packet (two rows of eight).
pub const SAMPLES_PER_PACKET: usize = 16;

/// Number of packets that make up one complete frame.
pub const PACKETS_PER_FRAME: u8 = 4;

/// One decoded notification packet: a 2-bit vertical address plus
/// sixteen 7-bit temperature samples.
///
/// Samples 0-7 belong to matrix row `2 * vertical_address`; samples 8-15
/// belong to row `2 * vertical_address + 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FramePacket {
    /// Row-pair selector, 0..=3.
    pub vertical_address: u8,
    /// Temperature samples in device units (0-127 after masking).
    pub samples: [u8; SAMPLES_PER_PACKET],
}

impl FramePacket {
    /// Decode a packet from a raw notification payload.
    ///
    /// The byte format is:
    /// - byte `i` bits 0-6: temperature sample `i` (device units)
    /// - byte 0 bit 7: vertical address bit 0
    /// - byte 1 bit 7: vertical address bit 1
    /// - bytes 2-15 bit 7: unused
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::InvalidPacketLength`] if `data` is not exactly
    /// [`PACKET_LEN`] (16) bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self, ParseError> {
        if data.len() != PACKET_LEN {
            return Err(ParseError::InvalidPacketLength {
                expected: PACKET_LEN,
                actual: data.len(),
            });
        }

        let vertical_address = ((data[0] & 0x80) >> 7) | ((data[1] & 0x80) >> 6);

        let mut samples = [0u8; SAMPLES_PER_PACKET];
        for (sample, byte) in samples.iter_mut().zip(data) {
            *sample = byte & 0x7F;
        }

        Ok(Self {
            vertical_address,
            samples,
        })
    }

    /// Whether this packet is the last of a frame (vertical address 3).
    #[must_use]
    pub fn is_final(&self) -> bool {
        self.vertical_address == PACKETS_PER_FRAME - 1
    }

    /// Encode the packet back into its 16-byte wire form.
    ///
    /// Useful for simulators and tests; the inverse of
    /// [`from_bytes`](Self::from_bytes) for in-domain values.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; PACKET_LEN] {
        let mut bytes = [0u8; PACKET_LEN];
        for (byte, sample) in bytes.iter_mut().zip(&self.samples) {
            *byte = sample & 0x7F;
        }
        bytes[0] |= (self.vertical_address & 0x01) << 7;
        bytes[1] |= (self.vertical_address & 0x02) << 6;
        bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_decode_masks_high_bits() {
        let mut data = [0xFFu8; PACKET_LEN];
        data[0] = 0x8A; // sample 0x0A, address bit 0 set
        data[1] = 0x0B; // sample 0x0B, address bit 1 clear

        let packet = FramePacket::from_bytes(&data).unwrap();
        assert_eq!(packet.vertical_address, 1);
        assert_eq!(packet.samples[0], 0x0A);
        assert_eq!(packet.samples[1], 0x0B);
        // High bits of the remaining bytes are discarded individually.
        for sample in &packet.samples[2..] {
            assert_eq!(*sample, 0x7F);
        }
    }

    #[test]
    fn test_decode_all_vertical_addresses() {
        for v in 0..PACKETS_PER_FRAME {
            let mut data = [10u8; PACKET_LEN];
            data[0] |= (v & 0x01) << 7;
            data[1] |= (v & 0x02) << 6;

            let packet = FramePacket::from_bytes(&data).unwrap();
            assert_eq!(packet.vertical_address, v);
            assert_eq!(packet.is_final(), v == 3);
        }
    }

    #[test]
    fn test_decode_rejects_short_packet() {
        let data = [0u8; 15];
        let err = FramePacket::from_bytes(&data).unwrap_err();
        assert!(err.to_string().contains("expected 16 bytes, got 15"));
    }

    #[test]
    fn test_decode_rejects_long_packet() {
        let data = [0u8; 20];
        assert!(FramePacket::from_bytes(&data).is_err());
    }

    #[test]
    fn test_decode_rejects_empty_packet() {
        assert!(FramePacket::from_bytes(&[]).is_err());
    }

    proptest! {
        #[test]
        fn prop_roundtrip(v in 0u8..4, samples in prop::array::uniform16(0u8..128)) {
            let packet = FramePacket { vertical_address: v, samples };
            let decoded = FramePacket::from_bytes(&packet.to_bytes()).unwrap();
            prop_assert_eq!(decoded, packet);
        }

        #[test]
        fn prop_samples_are_seven_bit(data in prop::array::uniform16(any::<u8>())) {
            let packet = FramePacket::from_bytes(&data).unwrap();
            prop_assert!(packet.vertical_address < 4);
            for sample in &packet.samples {
                prop_assert!(*sample < 128);
            }
        }
    }
}
