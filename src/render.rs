use std::fmt::Display;

use crate::board::Board;
use crate::board::constants::{CHUNK_BITS, Chunk};

const FILLED: char = '1';
const EMPTY: char = '0';
const PADDING: char = '.';

#[inline(always)]
fn token(value: Chunk, bit: usize) -> char {
    if (value >> bit) & 1 != 0 { FILLED } else { EMPTY }
}

impl<const CHUNKS: usize> Board<CHUNKS> {
    /// One `'1'`/`'0'` token per stored bit, chunks bottom to top and bits low
    /// to high, overflow padding included.
    pub fn tokens(&self) -> impl Iterator<Item = char> + '_ {
        self.matrix()
            .iter()
            .flat_map(|&value| (0..CHUNK_BITS).map(move |bit| token(value, bit)))
    }

    /// Human-readable dump, top of the board first.
    pub fn dump(&self) -> BoardDump<'_, CHUNKS> {
        BoardDump { board: self }
    }
}

/// Top-down text rendering of a [`Board`].
///
/// ```text
/// chunk 3 | . . . .
///  23 | 0 0 0 0 0 0 0 0 0 0
///  ...
///  18 | 0 0 0 0 0 0 0 0 0 0
/// chunk 2 | . . . .
///  ...
/// ```
///
/// Each chunk opens with its overflow padding (`.` when clear, `1` if a
/// padding bit were ever set), followed by its rows from the top slot down.
/// Column 0 is printed leftmost.
pub struct BoardDump<'a, const CHUNKS: usize> {
    board: &'a Board<CHUNKS>,
}

impl<const CHUNKS: usize> Display for BoardDump<'_, CHUNKS> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let board = self.board;
        let (width, rows) = (board.width(), board.rows());
        let playfield_bits = rows * width;

        writeln!(f)?;
        for chunk in (0..CHUNKS).rev() {
            let value = board.chunk(chunk);

            write!(f, "chunk {chunk} |")?;
            for bit in (playfield_bits..CHUNK_BITS).rev() {
                let padding = match token(value, bit) {
                    FILLED => FILLED,
                    _ => PADDING,
                };
                write!(f, " {padding}")?;
            }
            writeln!(f)?;

            for slot in (0..rows).rev() {
                write!(f, "{:3} |", chunk * rows + slot)?;
                for col in 0..width {
                    write!(f, " {}", token(value, slot * width + col))?;
                }
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

impl<const CHUNKS: usize> Display for Board<CHUNKS> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.dump().fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Geometry;

    #[test]
    fn test_tokens_order() {
        let geometry = Geometry::new(10).unwrap();
        let board = Board::<2>::new(geometry, [0b101, 1 << 59]).unwrap();
        let tokens: Vec<char> = board.tokens().collect();
        assert_eq!(tokens.len(), 2 * CHUNK_BITS);
        assert_eq!(&tokens[..4], &['1', '0', '1', '0']);
        assert_eq!(tokens[CHUNK_BITS + 59], '1');
        assert_eq!(tokens.iter().filter(|&&t| t == '1').count(), 3);
    }

    #[test]
    fn test_dump_layout() {
        let geometry = Geometry::new(10).unwrap();
        let mut board = Board::<2>::empty(geometry);
        board.set_bit(0, 0);
        board.fill_row(11);

        let dump = board.to_string();
        let lines: Vec<&str> = dump.lines().collect();
        assert_eq!(lines.len(), 1 + 2 * (1 + geometry.rows()), "{}", dump);
        assert_eq!(lines[0], "");
        assert_eq!(lines[1], "chunk 1 | . . . .");
        assert_eq!(lines[2], " 11 | 1 1 1 1 1 1 1 1 1 1");
        assert_eq!(lines[3], " 10 | 0 0 0 0 0 0 0 0 0 0");
        assert_eq!(lines[8], "chunk 0 | . . . .");
        assert_eq!(lines[14], "  0 | 1 0 0 0 0 0 0 0 0 0");
    }

    #[test]
    fn test_dump_without_overflow() {
        let geometry = Geometry::new(32).unwrap();
        let board = Board::<1>::empty(geometry);
        let dump = board.dump().to_string();
        assert_eq!(dump.lines().nth(1), Some("chunk 0 |"));
        assert_eq!(dump.lines().count(), 4);
    }
}
