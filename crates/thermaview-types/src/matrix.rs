//! Temperature matrix and frame assembly.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::ParseError;
use crate::packet::{FramePacket, PACKETS_PER_FRAME};

/// Side length of the temperature matrix.
pub const MATRIX_DIM: usize = 8;

/// Value every cell holds before the first packet arrives.
pub const IDLE_CELL: u8 = 25;

/// A complete 8x8 grid of temperature samples in device units
/// (7-bit values, numerically whole-degree Celsius).
///
/// The matrix is `Copy`; a completed frame is handed to consumers by value
/// and is never mutated by them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ThermalMatrix {
    cells: [[u8; MATRIX_DIM]; MATRIX_DIM],
}

impl Default for ThermalMatrix {
    fn default() -> Self {
        Self::new()
    }
}

impl ThermalMatrix {
    /// Create a matrix with every cell set to [`IDLE_CELL`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            cells: [[IDLE_CELL; MATRIX_DIM]; MATRIX_DIM],
        }
    }

    /// Create a matrix from raw row-major cells.
    #[must_use]
    pub fn from_cells(cells: [[u8; MATRIX_DIM]; MATRIX_DIM]) -> Self {
        Self { cells }
    }

    /// Read one cell. `row` and `col` must be < 8.
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> u8 {
        self.cells[row][col]
    }

    /// The rows of the matrix, in device order.
    #[must_use]
    pub fn rows(&self) -> &[[u8; MATRIX_DIM]; MATRIX_DIM] {
        &self.cells
    }

    /// Write one packet's samples into the row pair it addresses.
    ///
    /// Samples 0-7 land in row `2v`, samples 8-15 in row `2v + 1`.
    /// Duplicate or out-of-order addresses overwrite silently.
    pub fn apply(&mut self, packet: &FramePacket) {
        let base = usize::from(packet.vertical_address) * 2;
        for col in 0..MATRIX_DIM {
            self.cells[base][col] = packet.samples[col];
            self.cells[base + 1][col] = packet.samples[col + MATRIX_DIM];
        }
    }

    /// Summary statistics over all 64 cells, independent of any display
    /// range filtering.
    #[must_use]
    pub fn stats(&self) -> FrameStats {
        let mut max = 0u8;
        let mut min = u8::MAX;
        let mut sum = 0u32;

        for row in &self.cells {
            for &cell in row {
                max = max.max(cell);
                min = min.min(cell);
                sum += u32::from(cell);
            }
        }

        let cell_count = (MATRIX_DIM * MATRIX_DIM) as f32;
        let avg = (sum as f32 / cell_count * 10.0).round() / 10.0;

        FrameStats { max, min, avg }
    }
}

/// Summary statistics for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FrameStats {
    /// Hottest sample in device units.
    pub max: u8,
    /// Coldest sample in device units.
    pub min: u8,
    /// Mean over all 64 cells, rounded to one decimal place.
    pub avg: f32,
}

/// Reassembles 8x8 frames from the four-packet notification stream.
///
/// One assembler belongs to exactly one device session; the matrix it owns
/// persists across frames and disconnects (a stale frame stays visible until
/// a new complete frame arrives).
///
/// A frame is considered complete when the packet with vertical address 3
/// arrives, regardless of whether addresses 0-2 were actually seen. That
/// mirrors the device's transmit order; [`missing_row_pairs`] reports how
/// many row pairs of the emitted frame were carried over from earlier data.
///
/// [`missing_row_pairs`]: Self::missing_row_pairs
#[derive(Debug, Clone)]
pub struct MatrixAssembler {
    matrix: ThermalMatrix,
    rows_seen: u8,
    missing_last_frame: u32,
}

impl Default for MatrixAssembler {
    fn default() -> Self {
        Self::new()
    }
}

impl MatrixAssembler {
    /// Create an assembler with an idle matrix.
    #[must_use]
    pub fn new() -> Self {
        Self {
            matrix: ThermalMatrix::new(),
            rows_seen: 0,
            missing_last_frame: 0,
        }
    }

    /// Feed one raw notification payload into the assembler.
    ///
    /// Returns `Ok(Some(matrix))` when the payload completes a frame,
    /// `Ok(None)` while a frame is still in flight.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::InvalidPacketLength`] for payloads that are not
    /// exactly 16 bytes; the matrix is left untouched in that case.
    pub fn ingest(&mut self, data: &[u8]) -> Result<Option<ThermalMatrix>, ParseError> {
        let packet = FramePacket::from_bytes(data)?;
        self.matrix.apply(&packet);
        self.rows_seen |= 1 << packet.vertical_address;

        if packet.is_final() {
            let expected = (1u8 << PACKETS_PER_FRAME) - 1;
            self.missing_last_frame = u32::from((self.rows_seen ^ expected).count_ones());
            self.rows_seen = 0;
            return Ok(Some(self.matrix));
        }

        Ok(None)
    }

    /// The matrix as currently assembled, complete or not.
    #[must_use]
    pub fn matrix(&self) -> &ThermalMatrix {
        &self.matrix
    }

    /// Number of row pairs the most recently emitted frame inherited from
    /// older data instead of receiving in that frame's packet run.
    ///
    /// Zero for a clean 0,1,2,3 run.
    #[must_use]
    pub fn missing_row_pairs(&self) -> u32 {
        self.missing_last_frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packet::PACKET_LEN;
    use proptest::prelude::*;

    fn packet_bytes(v: u8, samples: [u8; 16]) -> [u8; PACKET_LEN] {
        FramePacket {
            vertical_address: v,
            samples,
        }
        .to_bytes()
    }

    #[test]
    fn test_new_matrix_is_idle() {
        let matrix = ThermalMatrix::new();
        for row in 0..MATRIX_DIM {
            for col in 0..MATRIX_DIM {
                assert_eq!(matrix.get(row, col), IDLE_CELL);
            }
        }
    }

    #[test]
    fn test_full_frame_assembly() {
        let mut assembler = MatrixAssembler::new();

        for v in 0..4u8 {
            let mut samples = [0u8; 16];
            for (i, sample) in samples.iter_mut().enumerate() {
                *sample = v * 16 + i as u8;
            }
            let result = assembler.ingest(&packet_bytes(v, samples)).unwrap();
            if v < 3 {
                assert!(result.is_none(), "partial frame must not emit");
            } else {
                let matrix = result.expect("fourth packet completes the frame");
                for row in 0..MATRIX_DIM {
                    for col in 0..MATRIX_DIM {
                        let expected = (row / 2) as u8 * 16 + (row % 2) as u8 * 8 + col as u8;
                        assert_eq!(matrix.get(row, col), expected);
                    }
                }
            }
        }
        assert_eq!(assembler.missing_row_pairs(), 0);
    }

    #[test]
    fn test_uniform_quadruple_scenario() {
        // Four packets of all-10 samples -> uniformly-10 matrix.
        let mut assembler = MatrixAssembler::new();
        let mut emitted = None;
        for v in 0..4u8 {
            emitted = assembler.ingest(&packet_bytes(v, [10; 16])).unwrap();
        }
        let matrix = emitted.expect("frame complete at v=3");
        assert_eq!(matrix, ThermalMatrix::from_cells([[10; 8]; 8]));
    }

    #[test]
    fn test_completion_triggered_only_by_final_address() {
        let mut assembler = MatrixAssembler::new();
        // A lone v=3 packet completes a frame even without 0,1,2.
        let matrix = assembler
            .ingest(&packet_bytes(3, [50; 16]))
            .unwrap()
            .expect("v=3 alone completes");
        // Rows 6 and 7 updated, everything else still idle.
        for col in 0..MATRIX_DIM {
            assert_eq!(matrix.get(6, col), 50);
            assert_eq!(matrix.get(7, col), 50);
            assert_eq!(matrix.get(0, col), IDLE_CELL);
        }
        assert_eq!(assembler.missing_row_pairs(), 3);
    }

    #[test]
    fn test_duplicate_address_overwrites() {
        let mut assembler = MatrixAssembler::new();
        assert!(assembler.ingest(&packet_bytes(1, [11; 16])).unwrap().is_none());
        assert!(assembler.ingest(&packet_bytes(1, [22; 16])).unwrap().is_none());
        assert_eq!(assembler.matrix().get(2, 0), 22);
    }

    #[test]
    fn test_bad_packet_leaves_matrix_untouched() {
        let mut assembler = MatrixAssembler::new();
        assembler.ingest(&packet_bytes(0, [42; 16])).unwrap();
        let before = *assembler.matrix();

        assert!(assembler.ingest(&[0u8; 5]).is_err());
        assert_eq!(*assembler.matrix(), before);
    }

    #[test]
    fn test_rows_seen_resets_between_frames() {
        let mut assembler = MatrixAssembler::new();
        for v in 0..4u8 {
            assembler.ingest(&packet_bytes(v, [1; 16])).unwrap();
        }
        assert_eq!(assembler.missing_row_pairs(), 0);

        // Next frame arrives with only the final packet.
        assembler.ingest(&packet_bytes(3, [2; 16])).unwrap();
        assert_eq!(assembler.missing_row_pairs(), 3);
    }

    #[test]
    fn test_stats_uniform() {
        let matrix = ThermalMatrix::from_cells([[10; 8]; 8]);
        let stats = matrix.stats();
        assert_eq!(stats.max, 10);
        assert_eq!(stats.min, 10);
        assert!((stats.avg - 10.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_stats_avg_rounds_to_one_decimal() {
        // 63 cells of 10 and one cell of 11: avg = 641/64 = 10.015625 -> 10.0
        let mut cells = [[10u8; 8]; 8];
        cells[0][0] = 11;
        let stats = ThermalMatrix::from_cells(cells).stats();
        assert_eq!(stats.max, 11);
        assert_eq!(stats.min, 10);
        assert!((stats.avg - 10.0).abs() < f32::EPSILON);

        // One cell of 25 among zeros: avg = 25/64 = 0.390625 -> 0.4
        let mut cells = [[0u8; 8]; 8];
        cells[3][4] = 25;
        let stats = ThermalMatrix::from_cells(cells).stats();
        assert!((stats.avg - 0.4).abs() < f32::EPSILON);
    }

    proptest! {
        #[test]
        fn prop_packet_updates_addressed_row_pair(
            v in 0u8..4,
            samples in prop::array::uniform16(0u8..128),
        ) {
            let mut assembler = MatrixAssembler::new();
            let _ = assembler.ingest(&packet_bytes(v, samples)).unwrap();

            let base = usize::from(v) * 2;
            for col in 0..MATRIX_DIM {
                prop_assert_eq!(assembler.matrix().get(base, col), samples[col]);
                prop_assert_eq!(assembler.matrix().get(base + 1, col), samples[col + 8]);
            }
        }

        #[test]
        fn prop_stats_ordering(cells in prop::array::uniform8(prop::array::uniform8(0u8..128))) {
            let stats = ThermalMatrix::from_cells(cells).stats();
            prop_assert!(f32::from(stats.min) <= stats.avg + 0.05);
            prop_assert!(stats.avg <= f32::from(stats.max) + 0.05);
            prop_assert!(stats.min <= stats.max);
        }
    }
}
