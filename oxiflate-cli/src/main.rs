//! OxiFlate CLI - Pure Rust DEFLATE
//!
//! Compresses and decompresses raw DEFLATE (RFC 1951) streams.

use clap::{Parser, Subcommand, ValueEnum};
use oxiflate::{Level, compress, decompress};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Parser)]
#[command(name = "oxiflate")]
#[command(author, version, about = "Pure Rust DEFLATE compression utility")]
#[command(long_about = "
OxiFlate is a Pure Rust implementation of the DEFLATE compressed data
format (RFC 1951). It reads and writes raw DEFLATE streams without any
container framing (no gzip or zlib headers).

Examples:
  oxiflate compress data.txt
  oxiflate compress data.txt -o data.deflate --level best
  oxiflate decompress data.deflate -o data.txt
  oxiflate test data.txt
")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compress a file into a raw DEFLATE stream
    #[command(alias = "c")]
    Compress {
        /// File to compress
        input: PathBuf,

        /// Output file (defaults to <input>.deflate)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Compression level
        #[arg(short, long, default_value = "default")]
        level: LevelArg,
    },

    /// Decompress a raw DEFLATE stream
    #[command(alias = "d")]
    Decompress {
        /// File to decompress
        input: PathBuf,

        /// Output file (defaults to <input>.out)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Round-trip a file in memory and verify the result
    #[command(alias = "t")]
    Test {
        /// File to round-trip
        input: PathBuf,

        /// Compression level
        #[arg(short, long, default_value = "default")]
        level: LevelArg,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum LevelArg {
    /// Shallow match search, fastest
    Fast,
    /// Balanced speed and ratio
    Default,
    /// Deepest match search, best ratio
    Best,
}

impl From<LevelArg> for Level {
    fn from(arg: LevelArg) -> Self {
        match arg {
            LevelArg::Fast => Level::Fast,
            LevelArg::Default => Level::Default,
            LevelArg::Best => Level::Best,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Compress {
            input,
            output,
            level,
        } => cmd_compress(&input, output, level.into()),
        Commands::Decompress { input, output } => cmd_decompress(&input, output),
        Commands::Test { input, level } => cmd_test(&input, level.into()),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn cmd_compress(
    input: &Path,
    output: Option<PathBuf>,
    level: Level,
) -> Result<(), Box<dyn std::error::Error>> {
    let data = fs::read(input)?;
    let output = output.unwrap_or_else(|| input.with_extension("deflate"));

    let start = Instant::now();
    let packed = compress(&data, level)?;
    let elapsed = start.elapsed();

    fs::write(&output, &packed)?;

    let ratio = if data.is_empty() {
        1.0
    } else {
        packed.len() as f64 / data.len() as f64
    };
    println!(
        "{} -> {}: {} -> {} bytes ({:.1}%) in {:.2?}",
        input.display(),
        output.display(),
        data.len(),
        packed.len(),
        ratio * 100.0,
        elapsed
    );
    Ok(())
}

fn cmd_decompress(input: &Path, output: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    let packed = fs::read(input)?;
    let output = output.unwrap_or_else(|| input.with_extension("out"));

    let start = Instant::now();
    let data = decompress(&packed)?;
    let elapsed = start.elapsed();

    fs::write(&output, &data)?;

    println!(
        "{} -> {}: {} -> {} bytes in {:.2?}",
        input.display(),
        output.display(),
        packed.len(),
        data.len(),
        elapsed
    );
    Ok(())
}

fn cmd_test(input: &Path, level: Level) -> Result<(), Box<dyn std::error::Error>> {
    let data = fs::read(input)?;

    let start = Instant::now();
    let packed = compress(&data, level)?;
    let unpacked = decompress(&packed)?;
    let elapsed = start.elapsed();

    if unpacked != data {
        return Err("round-trip mismatch".into());
    }

    let ratio = if data.is_empty() {
        1.0
    } else {
        packed.len() as f64 / data.len() as f64
    };
    println!(
        "{}: OK, {} -> {} bytes ({:.1}%) in {:.2?}",
        input.display(),
        data.len(),
        packed.len(),
        ratio * 100.0,
        elapsed
    );
    Ok(())
}
