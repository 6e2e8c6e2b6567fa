//! Bit-level I/O over in-memory byte buffers.
//!
//! DEFLATE packs variable-length codes LSB-first within each byte: the first
//! bit of the stream is the least significant bit of the first byte. Both
//! sides here follow that ordering, and both maintain a strictly sequential
//! bit cursor, so the validity of each operation depends on every operation
//! before it on the same stream.
//!
//! # Example
//!
//! ```
//! use oxiflate_core::bitstream::{BitReader, BitWriter};
//!
//! let mut writer = BitWriter::new();
//! writer.write_bits(0b101, 3);
//! writer.write_bits(0b1100, 4);
//! let bytes = writer.into_bytes();
//!
//! let mut reader = BitReader::new(&bytes);
//! assert_eq!(reader.read_bits(3).unwrap(), 0b101);
//! assert_eq!(reader.read_bits(4).unwrap(), 0b1100);
//! ```

use crate::error::{OxiFlateError, Result};

/// A bit-level reader over a byte slice.
///
/// Reads consume bits LSB-first and fail with
/// [`OxiFlateError::UnexpectedEndOfStream`] when the demand exceeds the
/// remaining input.
#[derive(Debug)]
pub struct BitReader<'a> {
    data: &'a [u8],
    /// Absolute bit cursor into `data`.
    cursor: usize,
}

impl<'a> BitReader<'a> {
    /// Create a reader positioned at the first bit of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, cursor: 0 }
    }

    /// Current bit position (for error reporting).
    pub fn bit_position(&self) -> u64 {
        self.cursor as u64
    }

    /// Current byte position, rounded down.
    pub fn byte_position(&self) -> u64 {
        (self.cursor / 8) as u64
    }

    /// Read up to 32 bits, first bit read landing in the LSB of the result.
    pub fn read_bits(&mut self, count: u8) -> Result<u32> {
        debug_assert!(count <= 32, "cannot read more than 32 bits at once");

        let end = self.cursor + count as usize;
        if end > self.data.len() * 8 {
            return Err(OxiFlateError::unexpected_eos(self.data.len() as u64 * 8));
        }

        let mut value = 0u32;
        for i in 0..count {
            let byte = self.data[self.cursor >> 3];
            let bit = (byte >> (self.cursor & 7)) & 1;
            value |= u32::from(bit) << i;
            self.cursor += 1;
        }
        Ok(value)
    }

    /// Read a single bit.
    pub fn read_bit(&mut self) -> Result<bool> {
        Ok(self.read_bits(1)? != 0)
    }

    /// Discard bits up to the next byte boundary.
    pub fn align_to_byte(&mut self) {
        self.cursor = (self.cursor + 7) & !7;
    }

    /// Read whole bytes. The cursor must be byte-aligned.
    pub fn read_bytes(&mut self, count: usize) -> Result<&'a [u8]> {
        debug_assert!(self.cursor % 8 == 0, "read_bytes requires byte alignment");

        let start = self.cursor / 8;
        let end = start + count;
        if end > self.data.len() {
            return Err(OxiFlateError::unexpected_eos(self.data.len() as u64 * 8));
        }
        self.cursor = end * 8;
        Ok(&self.data[start..end])
    }

    /// Whether every bit of the input has been consumed.
    pub fn is_empty(&self) -> bool {
        self.cursor >= self.data.len() * 8
    }
}

/// A bit-level writer accumulating into an owned byte buffer.
///
/// Writing into memory cannot fail, so none of these operations return
/// `Result`. Call [`BitWriter::into_bytes`] to pad the final partial byte
/// with zeros and take the output.
#[derive(Debug, Default)]
pub struct BitWriter {
    bytes: Vec<u8>,
    /// Partial byte being assembled.
    buffer: u8,
    /// Bits used in `buffer`, 0..8.
    used: u8,
}

impl BitWriter {
    /// Create an empty writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a writer with an output capacity hint in bytes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(capacity),
            ..Self::default()
        }
    }

    /// Current bit position in the stream, alignment padding included.
    pub fn bits_written(&self) -> u64 {
        self.bytes.len() as u64 * 8 + u64::from(self.used)
    }

    /// Append a single bit.
    #[inline]
    pub fn write_bit(&mut self, bit: bool) {
        self.buffer |= (bit as u8) << self.used;
        self.used += 1;
        if self.used == 8 {
            self.bytes.push(self.buffer);
            self.buffer = 0;
            self.used = 0;
        }
    }

    /// Append the low `count` bits of `value`, LSB first.
    pub fn write_bits(&mut self, value: u32, count: u8) {
        debug_assert!(count <= 32, "cannot write more than 32 bits at once");
        for i in 0..count {
            self.write_bit((value >> i) & 1 != 0);
        }
    }

    /// Pad the current byte with zero bits up to the next byte boundary.
    pub fn align_to_byte(&mut self) {
        if self.used > 0 {
            self.bytes.push(self.buffer);
            self.buffer = 0;
            self.used = 0;
        }
    }

    /// Append whole bytes. Pads to a byte boundary first.
    pub fn write_bytes(&mut self, buf: &[u8]) {
        self.align_to_byte();
        self.bytes.extend_from_slice(buf);
    }

    /// Pad the final partial byte with zeros and return the output buffer.
    pub fn into_bytes(mut self) -> Vec<u8> {
        self.align_to_byte();
        self.bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reader_lsb_first() {
        // 0b10110101 = 0xB5, read bit by bit from the LSB
        let data = [0xB5u8];
        let mut reader = BitReader::new(&data);

        let expected = [1, 0, 1, 0, 1, 1, 0, 1];
        for &bit in &expected {
            assert_eq!(reader.read_bits(1).unwrap(), bit);
        }
        assert!(reader.is_empty());
    }

    #[test]
    fn test_reader_crosses_byte_boundary() {
        let data = [0xFF, 0x00];
        let mut reader = BitReader::new(&data);

        assert_eq!(reader.read_bits(4).unwrap(), 0xF);
        assert_eq!(reader.read_bits(8).unwrap(), 0x0F);
        assert_eq!(reader.read_bits(4).unwrap(), 0x0);
    }

    #[test]
    fn test_reader_eos() {
        let data = [0xAB];
        let mut reader = BitReader::new(&data);
        reader.read_bits(6).unwrap();

        let err = reader.read_bits(3).unwrap_err();
        assert!(matches!(
            err,
            OxiFlateError::UnexpectedEndOfStream { bit_position: 8 }
        ));
    }

    #[test]
    fn test_writer_packs_bytes() {
        let mut writer = BitWriter::new();
        writer.write_bits(0b101, 3);
        writer.write_bits(0b11001, 5);
        // 3 bits 101, then 5 bits 11001 -> 0b11001_101 = 0xCD
        assert_eq!(writer.into_bytes(), vec![0xCD]);
    }

    #[test]
    fn test_writer_pads_final_byte() {
        let mut writer = BitWriter::new();
        writer.write_bits(0b11, 2);
        assert_eq!(writer.bits_written(), 2);
        assert_eq!(writer.into_bytes(), vec![0x03]);
    }

    #[test]
    fn test_roundtrip() {
        let mut writer = BitWriter::new();
        writer.write_bits(0b101, 3);
        writer.write_bits(0b1111, 4);
        writer.write_bits(0b10, 2);
        writer.write_bits(0b110011, 6);
        let bytes = writer.into_bytes();

        let mut reader = BitReader::new(&bytes);
        assert_eq!(reader.read_bits(3).unwrap(), 0b101);
        assert_eq!(reader.read_bits(4).unwrap(), 0b1111);
        assert_eq!(reader.read_bits(2).unwrap(), 0b10);
        assert_eq!(reader.read_bits(6).unwrap(), 0b110011);
    }

    #[test]
    fn test_align_and_bytes() {
        let mut writer = BitWriter::new();
        writer.write_bits(0b1, 1);
        writer.write_bytes(&[0x12, 0x34]);
        let bytes = writer.into_bytes();
        assert_eq!(bytes, vec![0x01, 0x12, 0x34]);

        let mut reader = BitReader::new(&bytes);
        assert!(reader.read_bit().unwrap());
        reader.align_to_byte();
        assert_eq!(reader.read_bytes(2).unwrap(), &[0x12, 0x34]);
    }

    #[test]
    fn test_read_bytes_eos() {
        let data = [0x12];
        let mut reader = BitReader::new(&data);
        assert!(reader.read_bytes(2).is_err());
    }
}
