//! Bit-packed falling-block board.
//!
//! The board is an array of `u64` chunks, each packing as many `width`-bit
//! rows as fit in a word. Full rows are found per chunk with precomputed row
//! masks and removed with a single downward shift that ripples across every
//! higher chunk.
//!
//! ```
//! use chunk_board::{Board, Clearer, Geometry};
//!
//! let geometry = Geometry::new(10).unwrap();
//! let mut board = Board::<4>::empty(geometry);
//! board.fill_row(0);
//! board.set_bit(3, 1);
//! assert_eq!(board.clear_full_rows(), 1);
//! assert!(board.get_bit(3, 0));
//! ```

pub mod board;
pub mod collapse;
pub mod detect;
pub mod render;

#[cfg(feature = "bench")]
pub mod benches;

pub use board::*;
pub use collapse::*;
pub use detect::*;
pub use render::*;
