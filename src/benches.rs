// Benchmark bodies, compiled only with the `bench` feature. The target under
// `benches/` is a thin wrapper that registers them with Criterion.

use crate::board::constants::{DEFAULT_CHUNKS, DEFAULT_WIDTH};
use crate::board::{Board, Geometry};
use crate::collapse::{Clearer, Collapser};
use crate::detect::RowDetector;
use criterion::{BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::hint::black_box;

const NUM_ELEMS: usize = 10_000;

type BenchBoard = Board<DEFAULT_CHUNKS>;

/// Registered benchmark entrypoint.
///
/// Bench functions register themselves via `board_bench!`, which submits a
/// function pointer into this registry.
pub struct BenchSpec {
    pub f: fn(&mut Criterion),
}

inventory::collect!(BenchSpec);

/// Defines a benchmark entrypoint and registers it into the `inventory` bench
/// registry.
macro_rules! board_bench {
    (
        $(#[$meta:meta])*
        $vis:vis fn $name:ident ( $c:ident : &mut Criterion ) $body:block
    ) => {
        $(#[$meta])*
        $vis fn $name($c: &mut Criterion) $body

        ::inventory::submit! {
            BenchSpec { f: $name }
        }
    };
}

pub fn all_benches(c: &mut Criterion) {
    for spec in inventory::iter::<BenchSpec> {
        (spec.f)(c);
    }
}

/// Random boards where roughly half of the rows are full.
fn row_heavy_boards(width: usize, seed: u64) -> Vec<BenchBoard> {
    let geometry = Geometry::new(width).expect("benchmark width is valid");
    let mut rng = StdRng::seed_from_u64(seed);
    (0..NUM_ELEMS)
        .map(|_| {
            let mut board = BenchBoard::empty(geometry);
            for row in 0..board.height() {
                if rng.random_bool(0.5) {
                    board.fill_row(row);
                }
            }
            board.flip_random_bits(4, &mut rng);
            board
        })
        .collect()
}

board_bench! {
    pub fn bench_detect(c: &mut Criterion) {
        let boards = black_box(row_heavy_boards(DEFAULT_WIDTH, 1));
        c.bench_with_input(BenchmarkId::new("detect_and_consume_full_rows", NUM_ELEMS), &NUM_ELEMS, |b, _| {
            b.iter(|| {
                boards
                    .iter()
                    .map(|board| board.detect_and_consume_full_rows(0).lines)
                    .sum::<usize>()
            })
        });
    }
}

board_bench! {
    pub fn bench_collapse(c: &mut Criterion) {
        let boards = black_box(row_heavy_boards(DEFAULT_WIDTH, 2));
        c.bench_with_input(BenchmarkId::new("collapse", NUM_ELEMS), &NUM_ELEMS, |b, _| {
            b.iter(|| {
                let mut boards = boards.clone();
                for board in boards.iter_mut() {
                    board.collapse(3, 0);
                }
                boards
            })
        });
    }
}

board_bench! {
    pub fn bench_clear_full_rows(c: &mut Criterion) {
        let mut group = c.benchmark_group("clear_full_rows");
        for width in [4, DEFAULT_WIDTH, 21] {
            let boards = black_box(row_heavy_boards(width, 3));
            group.bench_with_input(BenchmarkId::from_parameter(width), &width, |b, _| {
                b.iter(|| {
                    let mut boards = boards.clone();
                    boards
                        .iter_mut()
                        .map(|board| board.clear_full_rows())
                        .sum::<usize>()
                })
            });
        }
        group.finish();
    }
}
