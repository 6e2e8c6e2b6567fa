//! DEFLATE constant tables (RFC 1951 section 3.2).
//!
//! Length and distance symbols encode a base value plus a count of extra bits
//! read verbatim from the stream. The tables here are indexed by
//! `symbol - 257` for lengths and by symbol for distances.

use crate::huffman::{HuffmanDecoder, HuffmanEncoder};
use std::sync::OnceLock;

/// Longest code allowed in the literal/length and distance alphabets.
pub const MAX_CODE_LENGTH: u8 = 15;

/// Longest code allowed in the code-length alphabet.
pub const MAX_CODELEN_LENGTH: u8 = 7;

/// Literal/length alphabet size used by the encoder (285 is the last symbol
/// ever emitted; 286 and 287 exist only in the fixed table).
pub const LITLEN_ALPHABET_SIZE: usize = 286;

/// Distance alphabet size.
pub const DISTANCE_ALPHABET_SIZE: usize = 30;

/// Code-length alphabet size (symbols 0-18).
pub const CODELEN_ALPHABET_SIZE: usize = 19;

/// End-of-block symbol in the literal/length alphabet.
pub const END_OF_BLOCK: u16 = 256;

/// Shortest match length.
pub const MIN_MATCH: usize = 3;

/// Longest match length.
pub const MAX_MATCH: usize = 258;

/// Base match length for symbols 257-285.
pub const LENGTH_BASE: [u16; 29] = [
    3, 4, 5, 6, 7, 8, 9, 10, 11, 13, 15, 17, 19, 23, 27, 31, 35, 43, 51, 59, 67, 83, 99, 115, 131,
    163, 195, 227, 258,
];

/// Extra bits for length symbols 257-285.
pub const LENGTH_EXTRA_BITS: [u8; 29] = [
    0, 0, 0, 0, 0, 0, 0, 0, 1, 1, 1, 1, 2, 2, 2, 2, 3, 3, 3, 3, 4, 4, 4, 4, 5, 5, 5, 5, 0,
];

/// Base distance for symbols 0-29.
pub const DISTANCE_BASE: [u16; 30] = [
    1, 2, 3, 4, 5, 7, 9, 13, 17, 25, 33, 49, 65, 97, 129, 193, 257, 385, 513, 769, 1025, 1537,
    2049, 3073, 4097, 6145, 8193, 12289, 16385, 24577,
];

/// Extra bits for distance symbols 0-29.
pub const DISTANCE_EXTRA_BITS: [u8; 30] = [
    0, 0, 0, 0, 1, 1, 2, 2, 3, 3, 4, 4, 5, 5, 6, 6, 7, 7, 8, 8, 9, 9, 10, 10, 11, 11, 12, 12, 13,
    13,
];

/// Transmission order of code-length code lengths in a dynamic header.
pub const CODE_LENGTH_ORDER: [usize; 19] = [
    16, 17, 18, 0, 8, 7, 9, 6, 10, 5, 11, 4, 12, 3, 13, 2, 14, 1, 15,
];

/// Code lengths of the fixed literal/length table (symbols 0-287).
pub fn fixed_litlen_lengths() -> [u8; 288] {
    let mut lengths = [0u8; 288];
    for (symbol, len) in lengths.iter_mut().enumerate() {
        *len = match symbol {
            0..=143 => 8,
            144..=255 => 9,
            256..=279 => 7,
            _ => 8,
        };
    }
    lengths
}

/// Code lengths of the fixed distance table (all 5 bits).
pub fn fixed_distance_lengths() -> [u8; 30] {
    [5u8; 30]
}

/// Map a match length (3-258) to `(symbol, extra_bits, extra_value)`.
pub fn length_to_code(length: u16) -> (u16, u8, u16) {
    debug_assert!((MIN_MATCH as u16..=MAX_MATCH as u16).contains(&length));

    // 258 has its own dedicated symbol; it must not be encoded as 227 + 31.
    if length == MAX_MATCH as u16 {
        return (285, 0, 0);
    }
    let mut index = 0;
    while index + 1 < LENGTH_BASE.len() - 1 && LENGTH_BASE[index + 1] <= length {
        index += 1;
    }
    let symbol = 257 + index as u16;
    (
        symbol,
        LENGTH_EXTRA_BITS[index],
        length - LENGTH_BASE[index],
    )
}

/// Map a match distance (1-32768) to `(symbol, extra_bits, extra_value)`.
pub fn distance_to_code(distance: u16) -> (u16, u8, u16) {
    debug_assert!(distance >= 1);

    let mut index = 0;
    while index + 1 < DISTANCE_BASE.len() && DISTANCE_BASE[index + 1] <= distance {
        index += 1;
    }
    (
        index as u16,
        DISTANCE_EXTRA_BITS[index],
        distance - DISTANCE_BASE[index],
    )
}

/// Reconstruct a match length from a length symbol and its extra bits value.
pub fn decode_length(symbol: u16, extra: u16) -> u16 {
    debug_assert!((257..=285).contains(&symbol));
    let index = (symbol - 257) as usize;
    LENGTH_BASE[index] + extra
}

/// Reconstruct a match distance from a distance symbol and its extra bits value.
pub fn decode_distance(symbol: u16, extra: u16) -> u16 {
    debug_assert!(symbol < DISTANCE_ALPHABET_SIZE as u16);
    DISTANCE_BASE[symbol as usize] + extra
}

/// Shared decoder for the fixed literal/length table.
pub fn fixed_litlen_decoder() -> &'static HuffmanDecoder {
    static DECODER: OnceLock<HuffmanDecoder> = OnceLock::new();
    DECODER.get_or_init(|| {
        HuffmanDecoder::from_lengths(&fixed_litlen_lengths(), 0)
            .expect("fixed literal/length table is a complete code")
    })
}

/// Shared decoder for the fixed distance table.
pub fn fixed_distance_decoder() -> &'static HuffmanDecoder {
    static DECODER: OnceLock<HuffmanDecoder> = OnceLock::new();
    DECODER.get_or_init(|| {
        HuffmanDecoder::from_lengths(&fixed_distance_lengths(), 0)
            .expect("fixed distance table is a complete code")
    })
}

/// Shared encoder for the fixed literal/length table.
pub fn fixed_litlen_encoder() -> &'static HuffmanEncoder {
    static ENCODER: OnceLock<HuffmanEncoder> = OnceLock::new();
    ENCODER.get_or_init(|| HuffmanEncoder::from_lengths(&fixed_litlen_lengths()))
}

/// Shared encoder for the fixed distance table.
pub fn fixed_distance_encoder() -> &'static HuffmanEncoder {
    static ENCODER: OnceLock<HuffmanEncoder> = OnceLock::new();
    ENCODER.get_or_init(|| HuffmanEncoder::from_lengths(&fixed_distance_lengths()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_code_boundaries() {
        assert_eq!(length_to_code(3), (257, 0, 0));
        assert_eq!(length_to_code(10), (264, 0, 0));
        assert_eq!(length_to_code(11), (265, 1, 0));
        assert_eq!(length_to_code(12), (265, 1, 1));
        assert_eq!(length_to_code(257), (284, 5, 30));
        // 258 must map to the dedicated zero-extra symbol
        assert_eq!(length_to_code(258), (285, 0, 0));
    }

    #[test]
    fn test_distance_code_boundaries() {
        assert_eq!(distance_to_code(1), (0, 0, 0));
        assert_eq!(distance_to_code(4), (3, 0, 0));
        assert_eq!(distance_to_code(5), (4, 1, 0));
        assert_eq!(distance_to_code(6), (4, 1, 1));
        assert_eq!(distance_to_code(24577), (29, 13, 0));
        assert_eq!(distance_to_code(32768), (29, 13, 8191));
    }

    #[test]
    fn test_length_roundtrip() {
        for length in MIN_MATCH as u16..=MAX_MATCH as u16 {
            let (symbol, _, extra) = length_to_code(length);
            assert_eq!(decode_length(symbol, extra), length);
        }
    }

    #[test]
    fn test_distance_roundtrip() {
        for distance in [1u16, 2, 3, 4, 5, 100, 257, 1024, 8192, 32767, 32768] {
            let (symbol, _, extra) = distance_to_code(distance);
            assert_eq!(decode_distance(symbol, extra), distance);
        }
    }

    #[test]
    fn test_fixed_litlen_lengths() {
        let lengths = fixed_litlen_lengths();
        assert_eq!(lengths[0], 8);
        assert_eq!(lengths[143], 8);
        assert_eq!(lengths[144], 9);
        assert_eq!(lengths[255], 9);
        assert_eq!(lengths[256], 7);
        assert_eq!(lengths[279], 7);
        assert_eq!(lengths[280], 8);
        assert_eq!(lengths[287], 8);
    }
}
