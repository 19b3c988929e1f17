use proc_macros::inline_conditioned;
use tracing::{debug, trace};

use crate::board::Board;
use crate::detect::{Preserved, RowDetector};

/// Removes rows by shifting the whole board down.
pub trait Collapser {
    /// Drops the bottom `lines` row slots of `start_chunk` and lets every
    /// higher chunk ripple down by the same number of rows.
    ///
    /// Each higher chunk donates its bottom `lines` rows to the vacated top
    /// slots of the chunk below it. The top `lines` rows of the highest chunk
    /// come out empty and overflow padding is never written.
    ///
    /// Panics unless `1 <= lines <= rows` and `start_chunk < CHUNKS`.
    fn collapse(&mut self, lines: usize, start_chunk: usize);

    /// Writes the rows recorded during detection back into `chunk`.
    fn restore_preserved(&mut self, chunk: usize, preserved: &Preserved);
}

/// Line clearing built from [`RowDetector`] and [`Collapser`].
pub trait Clearer {
    /// One detect, collapse, write-back pass over `chunk`.
    ///
    /// Returns the number of rows removed; 0 leaves the board untouched.
    fn clear_chunk(&mut self, chunk: usize) -> usize;

    /// Removes every full row of the board. Returns the number removed.
    fn clear_full_rows(&mut self) -> usize;
}

impl<const CHUNKS: usize> Collapser for Board<CHUNKS> {
    #[inline_conditioned(always)]
    fn collapse(&mut self, lines: usize, start_chunk: usize) {
        let rows = self.rows();
        assert!(
            (1..=rows).contains(&lines),
            "cannot collapse {lines} rows, a chunk holds {rows}"
        );
        assert!(
            start_chunk < CHUNKS,
            "chunk {start_chunk} out of range (board has {CHUNKS})"
        );

        let width = self.width();
        let drop = (lines * width) as u32;
        let lift = ((rows - lines) * width) as u32;
        let playfield = self.geometry().playfield_mask();

        let matrix = self.matrix_mut();
        matrix[start_chunk] = matrix[start_chunk].unbounded_shr(drop);
        for i in start_chunk + 1..CHUNKS {
            matrix[i - 1] |= matrix[i].unbounded_shl(lift) & playfield;
            matrix[i] = matrix[i].unbounded_shr(drop);
        }
    }

    #[inline_conditioned(always)]
    fn restore_preserved(&mut self, chunk: usize, preserved: &Preserved) {
        let matrix = self.matrix_mut();
        matrix[chunk] = (matrix[chunk] & !preserved.mask) | preserved.bits;
    }
}

impl<const CHUNKS: usize> Clearer for Board<CHUNKS> {
    fn clear_chunk(&mut self, chunk: usize) -> usize {
        let scan = self.detect_and_consume_full_rows(chunk);
        if scan.lines == 0 {
            return 0;
        }
        self.collapse(scan.lines, chunk);
        self.restore_preserved(chunk, &scan.preserved);
        scan.lines
    }

    fn clear_full_rows(&mut self) -> usize {
        let mut cleared = 0;
        // Rows only ever fall, so a chunk with no full rows left stays that way.
        for chunk in 0..CHUNKS {
            loop {
                let lines = self.clear_chunk(chunk);
                if lines == 0 {
                    break;
                }
                trace!(chunk, lines, "collapsed full rows");
                cleared += lines;
            }
        }
        if cleared > 0 {
            debug!(cleared, "cleared full rows");
        }
        cleared
    }
}
