//! # OxiFlate Core
//!
//! Core components for the OxiFlate DEFLATE library.
//!
//! This crate provides the building blocks the codec crate is assembled from:
//!
//! - [`bitstream`]: LSB-first bit-level I/O over in-memory buffers
//! - [`window`]: decoder-side output window for back-reference replay
//! - [`error`]: error types
//!
//! ## Architecture
//!
//! OxiFlate is a layered codec:
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │ CLI: compress / decompress / test            │
//! ├──────────────────────────────────────────────┤
//! │ Block codec: stored / fixed / dynamic frames │
//! ├──────────────────────────────────────────────┤
//! │ LZ77 matcher + canonical Huffman coder       │
//! ├──────────────────────────────────────────────┤
//! │ BitStream + OutputWindow (this crate)        │
//! └──────────────────────────────────────────────┘
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod bitstream;
pub mod error;
pub mod window;

// Re-exports for convenience
pub use bitstream::{BitReader, BitWriter};
pub use error::{OxiFlateError, Result};
pub use window::{MAX_DISTANCE, OutputWindow};
