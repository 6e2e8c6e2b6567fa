//! DEFLATE decompression.
//!
//! Blocks are processed strictly in stream order until a block with BFINAL
//! set has been fully replayed. Any malformed construct aborts the whole
//! call with an error pinpointing the offending bit offset; once a header
//! or table is broken there is no way to reinterpret the bits after it.

use crate::huffman::HuffmanDecoder;
use crate::tables::{
    CODE_LENGTH_ORDER, CODELEN_ALPHABET_SIZE, DISTANCE_ALPHABET_SIZE, DISTANCE_EXTRA_BITS,
    END_OF_BLOCK, LENGTH_EXTRA_BITS, decode_distance, decode_length, fixed_distance_decoder,
    fixed_litlen_decoder,
};
use oxiflate_core::{BitReader, OutputWindow, OxiFlateError, Result};

/// DEFLATE decompressor.
#[derive(Debug, Default)]
pub struct Inflater;

impl Inflater {
    /// Create a decompressor.
    pub fn new() -> Self {
        Self
    }

    /// Decompress a raw DEFLATE stream.
    pub fn decompress(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mut reader = BitReader::new(data);
        let mut window = OutputWindow::with_capacity(data.len().saturating_mul(3));

        loop {
            let header_position = reader.bit_position();
            let is_final = reader.read_bit()?;
            let block_type = reader.read_bits(2)?;

            match block_type {
                0b00 => inflate_stored(&mut reader, &mut window)?,
                0b01 => inflate_compressed(
                    &mut reader,
                    &mut window,
                    fixed_litlen_decoder(),
                    fixed_distance_decoder(),
                )?,
                0b10 => {
                    let (litlen, dist) = read_dynamic_tables(&mut reader)?;
                    inflate_compressed(&mut reader, &mut window, &litlen, &dist)?;
                }
                _ => return Err(OxiFlateError::invalid_block_type(header_position)),
            }

            if is_final {
                break;
            }
        }

        Ok(window.into_vec())
    }
}

/// Convenience wrapper around [`Inflater`].
pub fn inflate(data: &[u8]) -> Result<Vec<u8>> {
    Inflater::new().decompress(data)
}

/// Stored block: byte-align, check LEN against its complement, copy.
fn inflate_stored(reader: &mut BitReader<'_>, window: &mut OutputWindow) -> Result<()> {
    reader.align_to_byte();
    let offset = reader.byte_position();
    let len = reader.read_bits(16)? as u16;
    let nlen = reader.read_bits(16)? as u16;
    if len != !nlen {
        return Err(OxiFlateError::corrupt_stored_block(offset, len, nlen));
    }
    let bytes = reader.read_bytes(len as usize)?;
    window.push_literals(bytes);
    Ok(())
}

/// Read the dynamic header and rebuild both decode tables.
fn read_dynamic_tables(
    reader: &mut BitReader<'_>,
) -> Result<(HuffmanDecoder, HuffmanDecoder)> {
    let hlit = reader.read_bits(5)? as usize + 257;
    let hdist = reader.read_bits(5)? as usize + 1;
    let hclen = reader.read_bits(4)? as usize + 4;

    let mut codelen_lengths = [0u8; CODELEN_ALPHABET_SIZE];
    for &index in CODE_LENGTH_ORDER.iter().take(hclen) {
        codelen_lengths[index] = reader.read_bits(3)? as u8;
    }
    let codelen_decoder = HuffmanDecoder::from_lengths(&codelen_lengths, reader.bit_position())?;

    // The literal/length and distance length sequences share one RLE stream;
    // a repeat may span the boundary between them.
    let total = hlit + hdist;
    let mut lengths: Vec<u8> = Vec::with_capacity(total);
    while lengths.len() < total {
        let symbol_position = reader.bit_position();
        let symbol = codelen_decoder.decode(reader)?;
        match symbol {
            0..=15 => lengths.push(symbol as u8),
            16 => {
                let &previous = lengths
                    .last()
                    .ok_or_else(|| OxiFlateError::invalid_code_lengths(symbol_position))?;
                let repeat = 3 + reader.read_bits(2)? as usize;
                lengths.resize(lengths.len() + repeat, previous);
            }
            17 => {
                let repeat = 3 + reader.read_bits(3)? as usize;
                lengths.resize(lengths.len() + repeat, 0);
            }
            18 => {
                let repeat = 11 + reader.read_bits(7)? as usize;
                lengths.resize(lengths.len() + repeat, 0);
            }
            _ => return Err(OxiFlateError::unknown_symbol(symbol, symbol_position)),
        }
        if lengths.len() > total {
            // a repeat ran past HLIT + HDIST
            return Err(OxiFlateError::invalid_code_lengths(symbol_position));
        }
    }

    let litlen = HuffmanDecoder::from_lengths(&lengths[..hlit], reader.bit_position())?;
    let dist = HuffmanDecoder::from_lengths(&lengths[hlit..], reader.bit_position())?;
    Ok((litlen, dist))
}

/// Decode literals and back-references until end-of-block.
fn inflate_compressed(
    reader: &mut BitReader<'_>,
    window: &mut OutputWindow,
    litlen: &HuffmanDecoder,
    dist: &HuffmanDecoder,
) -> Result<()> {
    loop {
        let symbol = litlen.decode(reader)?;
        match symbol {
            0..=255 => window.push_literal(symbol as u8),
            END_OF_BLOCK => return Ok(()),
            257..=285 => {
                let extra_bits = LENGTH_EXTRA_BITS[(symbol - 257) as usize];
                let extra = reader.read_bits(extra_bits)? as u16;
                let length = decode_length(symbol, extra);

                let dist_symbol = dist.decode(reader)?;
                if dist_symbol >= DISTANCE_ALPHABET_SIZE as u16 {
                    return Err(OxiFlateError::unknown_symbol(
                        dist_symbol,
                        reader.bit_position(),
                    ));
                }
                let extra_bits = DISTANCE_EXTRA_BITS[dist_symbol as usize];
                let extra = reader.read_bits(extra_bits)? as u16;
                let distance = decode_distance(dist_symbol, extra);

                window.copy_match(distance as usize, length as usize)?;
            }
            // 286 and 287 exist in the fixed table but encode nothing
            _ => return Err(OxiFlateError::unknown_symbol(symbol, reader.bit_position())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stored_block() {
        // BFINAL=1 BTYPE=00, LEN=5, NLEN=!5, "Hello"
        let stream = [
            0x01, 0x05, 0x00, 0xFA, 0xFF, b'H', b'e', b'l', b'l', b'o',
        ];
        assert_eq!(inflate(&stream).unwrap(), b"Hello");
    }

    #[test]
    fn test_corrupt_stored_length() {
        // NLEN is not the complement of LEN
        let stream = [0x01, 0x05, 0x00, 0xFA, 0xFE, b'H', b'e', b'l', b'l', b'o'];
        let err = inflate(&stream).unwrap_err();
        assert!(matches!(
            err,
            OxiFlateError::CorruptStoredBlock {
                offset: 1,
                len: 0x0005,
                nlen: 0xFEFA,
            }
        ));
    }

    #[test]
    fn test_reserved_block_type() {
        // BFINAL=1 BTYPE=11
        let stream = [0b0000_0111u8];
        let err = inflate(&stream).unwrap_err();
        assert!(matches!(
            err,
            OxiFlateError::InvalidBlockType { bit_position: 0 }
        ));
    }

    #[test]
    fn test_fixed_block_hand_assembled() {
        // BFINAL=1 BTYPE=01, four literal 'A's, end-of-block
        let stream = [0x73, 0x74, 0x74, 0x74, 0x04, 0x00];
        assert_eq!(inflate(&stream).unwrap(), b"AAAA");
    }

    #[test]
    fn test_truncated_stream() {
        // fixed block header with nothing after it
        let stream = [0b0000_0011u8];
        let err = inflate(&stream).unwrap_err();
        assert!(matches!(err, OxiFlateError::UnexpectedEndOfStream { .. }));
    }

    #[test]
    fn test_empty_input() {
        let err = inflate(&[]).unwrap_err();
        assert!(matches!(
            err,
            OxiFlateError::UnexpectedEndOfStream { bit_position: 0 }
        ));
    }

    #[test]
    fn test_distance_before_stream_start() {
        use oxiflate_core::BitWriter;

        // fixed block whose first token is a match: no history to copy from
        let mut writer = BitWriter::new();
        writer.write_bit(true);
        writer.write_bits(0b01, 2);
        // length symbol 257 (code 0000001 MSB-first, 7 bits)
        writer.write_bits(0b1000000, 7);
        // distance symbol 0 (code 00000, 5 bits)
        writer.write_bits(0b00000, 5);
        let stream = writer.into_bytes();

        let err = inflate(&stream).unwrap_err();
        assert!(matches!(
            err,
            OxiFlateError::InvalidDistance {
                distance: 1,
                available: 0
            }
        ));
    }
}
