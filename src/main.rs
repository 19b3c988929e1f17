use anyhow::{Context, Result, bail, ensure};
use chunk_board::constants::{Chunk, DEFAULT_CHUNKS, DEFAULT_WIDTH};
use chunk_board::{Board, Clearer, Collapser, Geometry, RowDetector, RowScan};
use clap::{Parser, Subcommand};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::str::FromStr;
use tracing::{Level, info};
use tracing_subscriber::prelude::*;

/// Chunks of the fixed demonstration board, bottom first.
const DEMO_MATRIX: [Chunk; DEFAULT_CHUNKS] = [0x0556aa556aa556aa, 0x000000f000ff000f, 0, 0];
const DEMO_COLLAPSE_LINES: usize = 3;

type DemoBoard = Board<DEFAULT_CHUNKS>;

#[derive(Debug, Subcommand)]
enum Commands {
    /// Dump the demonstration board, collapse three rows from chunk 0, dump again.
    Demo {},
    /// Classify the rows of one chunk and report the full-row scan.
    Scan {
        #[arg(long = "chunk", value_parser = parse_chunk, help = "Chunk value, bottom chunk first (repeatable, hex with 0x or decimal)")]
        chunks: Vec<Chunk>,

        #[arg(long, default_value = "0", help = "Index of the chunk to scan")]
        index: usize,
    },
    /// Clear every full row of a board.
    Clear {
        #[arg(long = "chunk", value_parser = parse_chunk, help = "Chunk value, bottom chunk first (repeatable, hex with 0x or decimal)")]
        chunks: Vec<Chunk>,

        #[arg(long, help = "Flip this many random cells before clearing")]
        random_bits: Option<usize>,

        #[arg(long, default_value = "0", help = "Seed for --random-bits")]
        seed: u64,
    },
}

#[derive(Debug, Parser)]
#[command(version, about = "Inspect full-row detection and collapse on a bit-packed board")]
struct Cli {
    #[arg(short = 'v', long, global = true, action = clap::ArgAction::Count, help = "Increase verbosity level (-v = INFO, -vv = DEBUG, -vvv = TRACE)")]
    verbose: u8,

    #[arg(long, global = true, default_value_t = DEFAULT_WIDTH, help = "Columns per row")]
    width: usize,

    #[arg(
        long,
        global = true,
        help = "Parse arguments and exit immediately (for validation)"
    )]
    noop: bool,

    #[command(subcommand)]
    command: Commands,
}

fn parse_chunk(s: &str) -> Result<Chunk> {
    let digits = s.replace('_', "");
    let value = match digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        Some(hex) => Chunk::from_str_radix(hex, 16),
        None => digits.parse::<Chunk>(),
    };
    value.with_context(|| format!("invalid chunk value `{s}`"))
}

fn build_board(geometry: Geometry, chunks: &[Chunk]) -> Result<DemoBoard> {
    ensure!(
        chunks.len() <= DEFAULT_CHUNKS,
        "got {} chunks, the board holds {}",
        chunks.len(),
        DEFAULT_CHUNKS
    );
    let mut matrix = [0; DEFAULT_CHUNKS];
    matrix[..chunks.len()].copy_from_slice(chunks);
    Board::new(geometry, matrix).context("invalid board")
}

fn report_scan(index: usize, scan: &RowScan) {
    println!(
        "chunk {index}: {} full row(s), preserved mask {:#018x} bits {:#018x}",
        scan.lines, scan.preserved.mask, scan.preserved.bits
    );
}

fn run_demo() -> Result<()> {
    let geometry = Geometry::from_parts(DEFAULT_WIDTH, 6, 4)?;
    let mut board = DemoBoard::new(geometry, DEMO_MATRIX)?;
    println!("{board}");

    report_scan(0, &board.detect_and_consume_full_rows(0));

    info!(lines = DEMO_COLLAPSE_LINES, "collapsing bottom rows of chunk 0");
    board.collapse(DEMO_COLLAPSE_LINES, 0);
    println!("{board}");
    Ok(())
}

fn run_scan(geometry: Geometry, chunks: &[Chunk], index: usize) -> Result<()> {
    let board = build_board(geometry, chunks)?;
    if index >= DEFAULT_CHUNKS {
        bail!("chunk index {index} out of range (board has {DEFAULT_CHUNKS})");
    }
    println!("{board}");
    for slot in (0..board.rows()).rev() {
        println!("slot {slot}: {:?}", board.classify_row(index, slot));
    }
    report_scan(index, &board.detect_and_consume_full_rows(index));
    Ok(())
}

fn run_clear(
    geometry: Geometry,
    chunks: &[Chunk],
    random_bits: Option<usize>,
    seed: u64,
) -> Result<()> {
    let mut board = build_board(geometry, chunks)?;
    if let Some(num_bits) = random_bits {
        let mut rng = StdRng::seed_from_u64(seed);
        board.flip_random_bits(num_bits, &mut rng);
    }
    println!("{board}");

    let cleared = board.clear_full_rows();
    info!(cleared, "clear finished");
    println!("cleared {cleared} row(s)");
    println!("{board}");
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // If noop flag is set, exit immediately after parsing arguments
    if cli.noop {
        println!("Arguments parsed successfully (--noop mode)");
        return Ok(());
    }

    let verbosity = cli.verbose.saturating_add(2).clamp(1, 5);
    let level = Level::from_str(verbosity.to_string().as_str())?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(tracing_subscriber::filter::LevelFilter::from_level(level))
        .init();

    info!("Starting chunk-board");

    let geometry = Geometry::new(cli.width)?;
    match cli.command {
        Commands::Demo {} => run_demo(),
        Commands::Scan { chunks, index } => run_scan(geometry, &chunks, index),
        Commands::Clear {
            chunks,
            random_bits,
            seed,
        } => run_clear(geometry, &chunks, random_bits, seed),
    }
}
