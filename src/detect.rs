use proc_macros::inline_conditioned;

use crate::board::Board;
use crate::board::constants::Chunk;

/// Fill state of a single row slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RowState {
    Full,
    Partial,
    Empty,
}

/// Content of the non-full rows scanned before the first full run of a chunk.
///
/// These rows sit below the run, so the collapse shift would discard them.
/// They are written back into the same slots afterwards, see
/// [`crate::Collapser::restore_preserved`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Preserved {
    /// Union of the row masks of the preserved slots.
    pub mask: Chunk,
    /// Cells set inside `mask`.
    pub bits: Chunk,
}

impl Preserved {
    pub const NONE: Self = Self { mask: 0, bits: 0 };

    pub const fn is_empty(&self) -> bool {
        self.mask == 0
    }
}

/// Result of scanning one chunk for full rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RowScan {
    /// Length of the first contiguous run of full rows (0 if the chunk has none).
    pub lines: usize,
    pub preserved: Preserved,
}

/// Finds full rows inside a single chunk.
pub trait RowDetector {
    fn classify_row(&self, chunk: usize, slot: usize) -> RowState;

    /// Scans the row slots of `chunk` bottom-up.
    ///
    /// Non-full rows met before any full row are collected into
    /// [`RowScan::preserved`]. Counting starts at the first full row and stops
    /// at the next non-full one, so a full row above a gap is left for a
    /// later pass. Never mutates the board.
    ///
    /// Panics if `chunk` is out of range.
    fn detect_and_consume_full_rows(&self, chunk: usize) -> RowScan;
}

impl<const CHUNKS: usize> RowDetector for Board<CHUNKS> {
    fn classify_row(&self, chunk: usize, slot: usize) -> RowState {
        assert!(chunk < CHUNKS, "chunk {chunk} out of range (board has {CHUNKS})");
        let line = self.geometry().line(slot);
        match self.chunk(chunk) & line {
            0 => RowState::Empty,
            bits if bits == line => RowState::Full,
            _ => RowState::Partial,
        }
    }

    #[inline_conditioned(always)]
    fn detect_and_consume_full_rows(&self, chunk: usize) -> RowScan {
        assert!(chunk < CHUNKS, "chunk {chunk} out of range (board has {CHUNKS})");
        let value = self.chunk(chunk);

        let mut scan = RowScan::default();
        for &line in self.geometry().lines() {
            let row_bits = value & line;
            if row_bits == line {
                scan.lines += 1;
            } else if scan.lines > 0 {
                break;
            } else {
                scan.preserved.mask |= line;
                scan.preserved.bits |= row_bits;
            }
        }
        scan
    }
}

#[cfg(test)]
mod tests {
    use proc_macros::chunk_rows;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use super::*;
    use crate::board::Geometry;

    fn standard_board(matrix: [Chunk; 4]) -> Board<4> {
        Board::new(Geometry::new(10).unwrap(), matrix).unwrap()
    }

    #[test]
    fn test_detect_leading_run() {
        let board = standard_board([
            chunk_rows! {
                0000000000
                0000000000
                0101010101
                1111111111
                1111111111
                1111111111
            },
            0x000000f000ff000f,
            0,
            0,
        ]);
        let scan = board.detect_and_consume_full_rows(0);
        assert_eq!(scan.lines, 3);
        assert!(scan.preserved.is_empty());

        assert_eq!(board.classify_row(0, 0), RowState::Full);
        assert_eq!(board.classify_row(0, 3), RowState::Partial);
        assert_eq!(board.classify_row(0, 4), RowState::Empty);
    }

    #[test]
    fn test_detect_all_zero_chunk() {
        let board = standard_board([0x0556aa556aa556aa, 0x000000f000ff000f, 0, 0]);
        let before = board;
        for chunk in 0..4 {
            assert_eq!(board.detect_and_consume_full_rows(chunk).lines, 0);
        }
        assert_eq!(board, before);

        let empty = board.detect_and_consume_full_rows(3);
        assert_eq!(empty.preserved.mask, board.geometry().playfield_mask());
        assert_eq!(empty.preserved.bits, 0);
    }

    #[test]
    fn test_detect_partial_rows_below_run_are_preserved() {
        let board = standard_board([
            chunk_rows! {
                1111111111
                0000000000
                1111111111
                1111111111
                1000000001
                0110000000
            },
            0,
            0,
            0,
        ]);
        let scan = board.detect_and_consume_full_rows(0);
        assert_eq!(scan.lines, 2);

        let geometry = board.geometry();
        assert_eq!(scan.preserved.mask, geometry.line(0) | geometry.line(1));
        assert_eq!(
            scan.preserved.bits,
            chunk_rows! {
                1000000001
                0110000000
            }
        );
    }

    #[test]
    fn test_detect_stops_at_gap() {
        let board = standard_board([
            chunk_rows! {
                0000000000
                0000000000
                0000000000
                1111111111
                1111111110
                1111111111
            },
            0,
            0,
            0,
        ]);
        let scan = board.detect_and_consume_full_rows(0);
        assert_eq!(scan.lines, 1);
        assert!(scan.preserved.is_empty());
    }

    #[test]
    fn test_detect_full_chunk() {
        let geometry = Geometry::new(10).unwrap();
        let board = Board::<4>::new(geometry, [geometry.playfield_mask(), 0, 0, 0]).unwrap();
        assert_eq!(board.detect_and_consume_full_rows(0).lines, geometry.rows());
        assert_eq!(board.detect_and_consume_full_rows(1).lines, 0);
    }

    #[test]
    fn test_detect_is_idempotent() {
        let mut rng = StdRng::seed_from_u64(11);
        let geometry = Geometry::new(10).unwrap();
        for _ in 0..200 {
            let mut board = Board::<4>::empty(geometry);
            board.flip_random_bits(80, &mut rng);
            let before = board;
            for chunk in 0..4 {
                let first = board.detect_and_consume_full_rows(chunk);
                let second = board.detect_and_consume_full_rows(chunk);
                assert_eq!(first, second);
            }
            assert_eq!(board, before);
        }
    }

    #[test]
    fn test_detect_matches_reference() {
        fn reference_slow(board: &Board<4>, chunk: usize) -> usize {
            let states: Vec<RowState> = (0..board.rows())
                .map(|slot| board.classify_row(chunk, slot))
                .collect();
            let start = states.iter().position(|&s| s == RowState::Full);
            match start {
                None => 0,
                Some(start) => states[start..]
                    .iter()
                    .take_while(|&&s| s == RowState::Full)
                    .count(),
            }
        }

        let mut rng = StdRng::seed_from_u64(3);
        for width in 1..=16 {
            let geometry = Geometry::new(width).unwrap();
            for _ in 0..50 {
                let mut board = Board::<4>::empty(geometry);
                for row in 0..board.height() {
                    if rng.random_bool(0.4) {
                        board.fill_row(row);
                    }
                }
                board.flip_random_bits(rng.random_range(0..6), &mut rng);
                for chunk in 0..4 {
                    assert_eq!(
                        board.detect_and_consume_full_rows(chunk).lines,
                        reference_slow(&board, chunk),
                        "width={} chunk={}\n{}",
                        width,
                        chunk,
                        board
                    );
                }
            }
        }
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_detect_chunk_out_of_range() {
        let board = standard_board([0; 4]);
        board.detect_and_consume_full_rows(4);
    }
}
