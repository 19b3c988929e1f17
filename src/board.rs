use proc_macros::inline_conditioned;
use rand::Rng;

use std::fmt::Display;

/// Core constants for the chunk layout.
pub mod constants {
    /// Storage word for a chunk. Row slot 0 sits in the low-order bits.
    pub type Chunk = u64;
    pub const CHUNK_BITS: usize = Chunk::BITS as usize;

    /// Layout of the demonstration board: 4 chunks of six 10-column rows.
    pub const DEFAULT_CHUNKS: usize = 4;
    pub const DEFAULT_WIDTH: usize = 10;
}

use constants::{CHUNK_BITS, Chunk};

/// Reasons a geometry or a board cannot be constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardError {
    ZeroWidth,
    WidthTooLarge {
        width: usize,
    },
    InconsistentGeometry {
        width: usize,
        rows: usize,
        overflow: usize,
    },
    OverflowBitsSet {
        chunk: usize,
        bits: Chunk,
    },
}

impl Display for BoardError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BoardError::ZeroWidth => write!(f, "board width must be at least 1 column"),
            BoardError::WidthTooLarge { width } => write!(
                f,
                "board width {width} does not fit in a {CHUNK_BITS}-bit chunk"
            ),
            BoardError::InconsistentGeometry {
                width,
                rows,
                overflow,
            } => write!(
                f,
                "geometry width={width} rows={rows} overflow={overflow} does not match a {CHUNK_BITS}-bit chunk (expected rows={}, overflow={})",
                CHUNK_BITS / width,
                CHUNK_BITS - (CHUNK_BITS / width) * width
            ),
            BoardError::OverflowBitsSet { chunk, bits } => write!(
                f,
                "chunk {chunk} has overflow padding bits set: {bits:#018x}"
            ),
        }
    }
}

impl std::error::Error for BoardError {}

/// Shape of every chunk of a board, plus the full-row masks derived from it.
///
/// A chunk holds `rows = CHUNK_BITS / width` row slots of `width` bits each.
/// The `overflow = CHUNK_BITS - rows * width` high-order bits are padding and
/// are never part of a row.
///
/// ```text
/// width = 10, rows = 6, overflow = 4
///
/// bit 63      59        49        39        29        19        9       0
///     | pad  | slot 5  | slot 4  | slot 3  | slot 2  | slot 1  | slot 0 |
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Geometry {
    width: usize,
    rows: usize,
    overflow: usize,
    playfield: Chunk,
    lines: [Chunk; CHUNK_BITS],
}

impl Geometry {
    /// Derives the chunk layout for rows of `width` columns.
    pub const fn new(width: usize) -> Result<Self, BoardError> {
        if width == 0 {
            return Err(BoardError::ZeroWidth);
        }
        if width > CHUNK_BITS {
            return Err(BoardError::WidthTooLarge { width });
        }

        let rows = CHUNK_BITS / width;
        let overflow = CHUNK_BITS - rows * width;
        let row_mask = Chunk::MAX.unbounded_shr((CHUNK_BITS - width) as u32);

        let mut lines = [0; CHUNK_BITS];
        let mut slot = 0;
        while slot < rows {
            lines[slot] = row_mask.unbounded_shl((slot * width) as u32);
            slot += 1;
        }

        Ok(Self {
            width,
            rows,
            overflow,
            playfield: Chunk::MAX.unbounded_shr(overflow as u32),
            lines,
        })
    }

    /// Builds a geometry from an explicit `(width, rows, overflow)` triple,
    /// rejecting triples that disagree with [`Geometry::new`].
    pub const fn from_parts(width: usize, rows: usize, overflow: usize) -> Result<Self, BoardError> {
        let geometry = match Self::new(width) {
            Ok(geometry) => geometry,
            Err(err) => return Err(err),
        };
        if geometry.rows != rows || geometry.overflow != overflow {
            return Err(BoardError::InconsistentGeometry {
                width,
                rows,
                overflow,
            });
        }
        Ok(geometry)
    }

    pub const fn width(&self) -> usize {
        self.width
    }

    /// Row slots per chunk.
    pub const fn rows(&self) -> usize {
        self.rows
    }

    pub const fn overflow(&self) -> usize {
        self.overflow
    }

    /// Mask of the bits of `slot` that must all be set for the row to be full.
    #[inline_conditioned(always)]
    pub const fn line(&self, slot: usize) -> Chunk {
        assert!(slot < self.rows, "row slot out of range");
        self.lines[slot]
    }

    /// Full-row masks indexed by row slot.
    pub fn lines(&self) -> &[Chunk] {
        &self.lines[..self.rows]
    }

    /// Every bit of a chunk that belongs to some row slot.
    #[inline_conditioned(always)]
    pub const fn playfield_mask(&self) -> Chunk {
        self.playfield
    }

    /// Padding bits above the last row slot of a chunk.
    #[inline_conditioned(always)]
    pub const fn overflow_mask(&self) -> Chunk {
        !self.playfield
    }
}

/// A falling-block board made of `CHUNKS` bit-packed words.
///
/// `matrix[0]` is the bottom of the board. Global row `r` lives in chunk
/// `r / rows`, slot `r % rows`; column `c` of that row is bit
/// `slot * width + c`. Overflow padding bits are always zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Board<const CHUNKS: usize = { constants::DEFAULT_CHUNKS }> {
    matrix: [Chunk; CHUNKS],
    geometry: Geometry,
}

impl<const CHUNKS: usize> Board<CHUNKS> {
    pub const NUM_CHUNKS: usize = CHUNKS;

    /// Creates a board from explicit chunk values.
    ///
    /// Fails if any chunk carries bits in its overflow padding.
    pub fn new(geometry: Geometry, matrix: [Chunk; CHUNKS]) -> Result<Self, BoardError> {
        const { assert!(CHUNKS > 0, "a board needs at least one chunk") };

        let overflow_mask = geometry.overflow_mask();
        if let Some((chunk, bits)) = matrix
            .iter()
            .enumerate()
            .find(|&(_, value)| value & overflow_mask != 0)
        {
            return Err(BoardError::OverflowBitsSet {
                chunk,
                bits: bits & overflow_mask,
            });
        }
        Ok(Self { matrix, geometry })
    }

    pub fn empty(geometry: Geometry) -> Self {
        const { assert!(CHUNKS > 0, "a board needs at least one chunk") };
        Self {
            matrix: [0; CHUNKS],
            geometry,
        }
    }

    pub const fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub const fn width(&self) -> usize {
        self.geometry.width
    }

    /// Row slots per chunk.
    pub const fn rows(&self) -> usize {
        self.geometry.rows
    }

    pub const fn overflow(&self) -> usize {
        self.geometry.overflow
    }

    /// Playable rows across the whole board.
    pub const fn height(&self) -> usize {
        self.geometry.rows * CHUNKS
    }

    #[inline_conditioned(always)]
    pub const fn chunk(&self, index: usize) -> Chunk {
        self.matrix[index]
    }

    pub const fn matrix(&self) -> &[Chunk; CHUNKS] {
        &self.matrix
    }

    #[inline_conditioned(always)]
    pub(crate) fn matrix_mut(&mut self) -> &mut [Chunk; CHUNKS] {
        &mut self.matrix
    }

    /// Number of filled cells on the board.
    pub fn count(&self) -> u32 {
        self.matrix.iter().map(|chunk| chunk.count_ones()).sum()
    }

    /// Zeroes every chunk.
    pub fn clear_all(&mut self) {
        self.matrix = [0; CHUNKS];
    }

    /// Chunk index and bit position of a cell. Panics outside the playfield.
    fn locate(&self, col: usize, row: usize) -> (usize, u32) {
        assert!(
            col < self.width() && row < self.height(),
            "cell (col {col}, row {row}) is outside a {}x{} board",
            self.width(),
            self.height()
        );
        let rows = self.rows();
        (row / rows, ((row % rows) * self.width() + col) as u32)
    }

    pub fn get_bit(&self, col: usize, row: usize) -> bool {
        let (chunk, bit) = self.locate(col, row);
        (self.matrix[chunk] >> bit) & 1 != 0
    }

    pub fn set_bit(&mut self, col: usize, row: usize) {
        let (chunk, bit) = self.locate(col, row);
        self.matrix[chunk] |= 1 << bit;
    }

    pub fn unset_bit(&mut self, col: usize, row: usize) {
        let (chunk, bit) = self.locate(col, row);
        self.matrix[chunk] &= !(1 << bit);
    }

    pub fn flip_bit(&mut self, col: usize, row: usize) {
        let (chunk, bit) = self.locate(col, row);
        self.matrix[chunk] ^= 1 << bit;
    }

    /// Sets every cell of global row `row`.
    pub fn fill_row(&mut self, row: usize) {
        assert!(row < self.height(), "row {row} is outside the board");
        let rows = self.rows();
        self.matrix[row / rows] |= self.geometry.line(row % rows);
    }

    /// Flips `num_bits` uniformly chosen cells. Not perf critical.
    pub fn flip_random_bits<R: Rng + ?Sized>(&mut self, num_bits: usize, rng: &mut R) {
        for _ in 0..num_bits {
            let col = rng.random_range(0..self.width());
            let row = rng.random_range(0..self.height());
            self.flip_bit(col, row);
        }
    }
}
