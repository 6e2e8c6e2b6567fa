//! # OxiFlate
//!
//! Pure Rust implementation of the DEFLATE compressed data format
//! (RFC 1951): LZ77 back-references over a 32 KiB window, canonical Huffman
//! coding, and the three block encodings (stored, fixed, dynamic).
//!
//! ## Quick start
//!
//! ```
//! use oxiflate::{Level, compress, decompress};
//!
//! let data = b"compress me, compress me again";
//! let packed = compress(data, Level::Default).unwrap();
//! assert_eq!(decompress(&packed).unwrap(), data);
//! ```
//!
//! Compression succeeds for every input. Decompression validates the stream
//! and reports the first malformed construct with its bit offset; see
//! [`OxiFlateError`].

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod deflate;
pub mod huffman;
pub mod inflate;
pub mod lz77;
pub mod splitter;
pub mod tables;

pub use deflate::{Deflater, deflate};
pub use inflate::{Inflater, inflate};
pub use oxiflate_core::{OxiFlateError, Result};

/// Compression effort level.
///
/// Levels trade match-search effort for ratio; the output format and its
/// correctness are identical across levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Level {
    /// Shallow match search, no lazy evaluation.
    Fast,
    /// Balanced search depth with one-step lazy evaluation.
    #[default]
    Default,
    /// Deep match search, never settles for an early match.
    Best,
}

/// Compress `data` into a raw DEFLATE stream.
pub fn compress(data: &[u8], level: Level) -> Result<Vec<u8>> {
    deflate::deflate(data, level)
}

/// Decompress a raw DEFLATE stream.
pub fn decompress(data: &[u8]) -> Result<Vec<u8>> {
    inflate::inflate(data)
}
