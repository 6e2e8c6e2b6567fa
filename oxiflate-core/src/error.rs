//! Error types for OxiFlate operations.
//!
//! Every decode-path error carries the bit or byte offset at which it was
//! detected. A failed decode aborts the whole call; there is no partial-block
//! recovery, since a broken code table invalidates the interpretation of every
//! subsequent bit.

use std::io;
use thiserror::Error;

/// The main error type for OxiFlate operations.
#[derive(Debug, Error)]
pub enum OxiFlateError {
    /// I/O error from file plumbing (CLI only; the codec core is in-memory).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Reserved block type (BTYPE=11) in a block header.
    #[error("Invalid block type at bit {bit_position}")]
    InvalidBlockType {
        /// Bit position of the offending block header.
        bit_position: u64,
    },

    /// A code length set that cannot form a valid prefix code.
    #[error("Invalid code lengths (over-subscribed prefix code) at bit {bit_position}")]
    InvalidCodeLengths {
        /// Bit position where the length set was read.
        bit_position: u64,
    },

    /// Stored block whose LEN field does not match its one's complement.
    #[error("Corrupt stored block at offset {offset}: LEN {len:#06x} vs NLEN {nlen:#06x}")]
    CorruptStoredBlock {
        /// Byte offset of the LEN/NLEN header.
        offset: u64,
        /// The LEN field as read.
        len: u16,
        /// The NLEN field as read.
        nlen: u16,
    },

    /// Bit or byte demand exceeded the remaining input.
    #[error("Unexpected end of stream at bit {bit_position}")]
    UnexpectedEndOfStream {
        /// Bit position at which more input was required.
        bit_position: u64,
    },

    /// A symbol with no assigned code, or a bit pattern mapping to no symbol.
    #[error("Unknown symbol {symbol} at bit {bit_position}")]
    UnknownSymbol {
        /// The symbol (encode side) or accumulated code value (decode side).
        symbol: u16,
        /// Bit position of detection.
        bit_position: u64,
    },

    /// Back-reference pointing before the start of the produced output.
    #[error("Invalid back-reference distance: {distance} exceeds history size {available}")]
    InvalidDistance {
        /// The invalid distance value.
        distance: usize,
        /// Bytes of history available at that point.
        available: usize,
    },
}

/// Result type alias for OxiFlate operations.
pub type Result<T> = std::result::Result<T, OxiFlateError>;

impl OxiFlateError {
    /// Create an invalid block type error.
    pub fn invalid_block_type(bit_position: u64) -> Self {
        Self::InvalidBlockType { bit_position }
    }

    /// Create an invalid code lengths error.
    pub fn invalid_code_lengths(bit_position: u64) -> Self {
        Self::InvalidCodeLengths { bit_position }
    }

    /// Create a corrupt stored block error.
    pub fn corrupt_stored_block(offset: u64, len: u16, nlen: u16) -> Self {
        Self::CorruptStoredBlock { offset, len, nlen }
    }

    /// Create an unexpected end of stream error.
    pub fn unexpected_eos(bit_position: u64) -> Self {
        Self::UnexpectedEndOfStream { bit_position }
    }

    /// Create an unknown symbol error.
    pub fn unknown_symbol(symbol: u16, bit_position: u64) -> Self {
        Self::UnknownSymbol {
            symbol,
            bit_position,
        }
    }

    /// Create an invalid distance error.
    pub fn invalid_distance(distance: usize, available: usize) -> Self {
        Self::InvalidDistance {
            distance,
            available,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = OxiFlateError::invalid_block_type(24);
        assert!(err.to_string().contains("bit 24"));

        let err = OxiFlateError::corrupt_stored_block(3, 0x0005, 0x0005);
        assert!(err.to_string().contains("Corrupt stored block"));

        let err = OxiFlateError::invalid_distance(300, 17);
        assert!(err.to_string().contains("300"));
        assert!(err.to_string().contains("17"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: OxiFlateError = io_err.into();
        assert!(matches!(err, OxiFlateError::Io(_)));
    }
}
