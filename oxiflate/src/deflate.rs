//! DEFLATE compression.
//!
//! The pipeline is: LZ77 tokenize the whole input, partition the token
//! stream into blocks with the distribution-drift splitter, then emit each
//! block in whichever of the three encodings costs the fewest bits. Costs
//! are exact bit counts computed from the actual code tables, not
//! estimates, so the choice can never make the output bigger than the
//! alternatives it rejected.

use crate::Level;
use crate::huffman::{HuffmanEncoder, build_lengths};
use crate::lz77::{MatchParams, Token, tokenize};
use crate::splitter::BlockSplitter;
use crate::tables::{
    CODE_LENGTH_ORDER, CODELEN_ALPHABET_SIZE, DISTANCE_ALPHABET_SIZE, END_OF_BLOCK,
    LITLEN_ALPHABET_SIZE, MAX_CODE_LENGTH, MAX_CODELEN_LENGTH, distance_to_code,
    fixed_distance_encoder, fixed_litlen_encoder, length_to_code,
};
use oxiflate_core::{BitWriter, Result};
use std::ops::Range;

/// Largest payload of a single stored block.
const MAX_STORED_LEN: usize = 65535;

/// DEFLATE compressor.
#[derive(Debug)]
pub struct Deflater {
    params: MatchParams,
}

impl Deflater {
    /// Create a compressor for the given level.
    pub fn new(level: Level) -> Self {
        Self {
            params: MatchParams::for_level(level),
        }
    }

    /// Compress `data` into a raw DEFLATE stream.
    ///
    /// Succeeds for every input; the `Result` only reflects internal symbol
    /// bookkeeping, which cannot fail for tokens produced by the matcher.
    pub fn compress(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mut writer = BitWriter::with_capacity(data.len() / 2 + 64);

        if data.is_empty() {
            // a stream must contain at least one final block
            write_stored(&mut writer, &[], true);
            return Ok(writer.into_bytes());
        }

        let tokens = tokenize(data, self.params);
        let blocks = split_blocks(&tokens);

        let mut consumed = 0;
        let last = blocks.len() - 1;
        for (i, range) in blocks.iter().enumerate() {
            let block_tokens = &tokens[range.clone()];
            let raw_len: usize = block_tokens.iter().map(Token::byte_len).sum();
            let raw = &data[consumed..consumed + raw_len];
            consumed += raw_len;
            write_block(&mut writer, block_tokens, raw, i == last)?;
        }
        debug_assert_eq!(consumed, data.len());

        Ok(writer.into_bytes())
    }
}

/// Convenience wrapper around [`Deflater`].
pub fn deflate(data: &[u8], level: Level) -> Result<Vec<u8>> {
    Deflater::new(level).compress(data)
}

/// Partition the token stream at distribution-drift boundaries.
fn split_blocks(tokens: &[Token]) -> Vec<Range<usize>> {
    let mut splitter = BlockSplitter::new();
    let mut blocks = Vec::new();
    let mut start = 0;
    let mut block_bytes = 0;

    for (i, token) in tokens.iter().enumerate() {
        match *token {
            Token::Literal(byte) => splitter.observe_literal(byte),
            Token::Match { length, .. } => splitter.observe_match(length),
        }
        block_bytes += token.byte_len();

        if splitter.should_end_block(block_bytes) {
            blocks.push(start..i + 1);
            start = i + 1;
            block_bytes = 0;
            splitter.reset();
        }
    }
    if start < tokens.len() || blocks.is_empty() {
        blocks.push(start..tokens.len());
    }
    blocks
}

/// Symbol frequencies of a block, end-of-block included.
fn token_frequencies(
    tokens: &[Token],
) -> (
    [u32; LITLEN_ALPHABET_SIZE],
    [u32; DISTANCE_ALPHABET_SIZE],
) {
    let mut litlen = [0u32; LITLEN_ALPHABET_SIZE];
    let mut dist = [0u32; DISTANCE_ALPHABET_SIZE];
    for token in tokens {
        match *token {
            Token::Literal(byte) => litlen[byte as usize] += 1,
            Token::Match { length, distance } => {
                let (symbol, _, _) = length_to_code(length);
                litlen[symbol as usize] += 1;
                let (symbol, _, _) = distance_to_code(distance);
                dist[symbol as usize] += 1;
            }
        }
    }
    litlen[END_OF_BLOCK as usize] = 1;
    (litlen, dist)
}

/// Exact payload cost of the block body under the given tables, EOB included.
fn token_cost_bits(tokens: &[Token], litlen: &HuffmanEncoder, dist: &HuffmanEncoder) -> u64 {
    let mut bits = 0u64;
    for token in tokens {
        match *token {
            Token::Literal(byte) => bits += u64::from(litlen.code_length(u16::from(byte))),
            Token::Match { length, distance } => {
                let (symbol, extra_bits, _) = length_to_code(length);
                bits += u64::from(litlen.code_length(symbol)) + u64::from(extra_bits);
                let (symbol, extra_bits, _) = distance_to_code(distance);
                bits += u64::from(dist.code_length(symbol)) + u64::from(extra_bits);
            }
        }
    }
    bits + u64::from(litlen.code_length(END_OF_BLOCK))
}

/// Run-length encoded code length sequence: `(symbol, extra_value, extra_bits)`.
type RleOp = (u8, u8, u8);

/// Everything needed to cost and emit one dynamic header.
struct DynamicHeader {
    hlit: usize,
    hdist: usize,
    hclen: usize,
    codelen_lengths: [u8; CODELEN_ALPHABET_SIZE],
    rle: Vec<RleOp>,
}

impl DynamicHeader {
    fn plan(litlen_lengths: &[u8], dist_lengths: &[u8]) -> Self {
        // EOB always has a code, so the literal/length count is at least 257.
        let hlit = litlen_lengths
            .iter()
            .rposition(|&l| l > 0)
            .map_or(257, |i| (i + 1).max(257));
        let hdist = dist_lengths
            .iter()
            .rposition(|&l| l > 0)
            .map_or(1, |i| i + 1);

        let mut combined = Vec::with_capacity(hlit + hdist);
        combined.extend_from_slice(&litlen_lengths[..hlit]);
        combined.extend_from_slice(&dist_lengths[..hdist]);
        let rle = rle_encode_lengths(&combined);

        let mut codelen_freqs = [0u32; CODELEN_ALPHABET_SIZE];
        for &(symbol, _, _) in &rle {
            codelen_freqs[symbol as usize] += 1;
        }
        let codelen_lengths_vec = build_lengths(&codelen_freqs, MAX_CODELEN_LENGTH);
        let mut codelen_lengths = [0u8; CODELEN_ALPHABET_SIZE];
        codelen_lengths.copy_from_slice(&codelen_lengths_vec);

        // trailing zero lengths in transmission order are omitted
        let mut transmitted = CODELEN_ALPHABET_SIZE;
        while transmitted > 4 && codelen_lengths[CODE_LENGTH_ORDER[transmitted - 1]] == 0 {
            transmitted -= 1;
        }

        Self {
            hlit,
            hdist,
            hclen: transmitted - 4,
            codelen_lengths,
            rle,
        }
    }

    /// Header cost in bits, from HLIT through the last code length run.
    fn cost_bits(&self) -> u64 {
        let codelen_encoder = HuffmanEncoder::from_lengths(&self.codelen_lengths);
        let mut bits = 5 + 5 + 4 + 3 * (self.hclen as u64 + 4);
        for &(symbol, _, extra_bits) in &self.rle {
            bits += u64::from(codelen_encoder.code_length(u16::from(symbol)))
                + u64::from(extra_bits);
        }
        bits
    }

    fn write(&self, writer: &mut BitWriter) -> Result<()> {
        writer.write_bits((self.hlit - 257) as u32, 5);
        writer.write_bits((self.hdist - 1) as u32, 5);
        writer.write_bits(self.hclen as u32, 4);
        for &index in CODE_LENGTH_ORDER.iter().take(self.hclen + 4) {
            writer.write_bits(u32::from(self.codelen_lengths[index]), 3);
        }
        let codelen_encoder = HuffmanEncoder::from_lengths(&self.codelen_lengths);
        for &(symbol, extra_value, extra_bits) in &self.rle {
            codelen_encoder.encode(writer, u16::from(symbol))?;
            if extra_bits > 0 {
                writer.write_bits(u32::from(extra_value), extra_bits);
            }
        }
        Ok(())
    }
}

/// RFC 1951 run-length encoding of a code length sequence, using the repeat
/// symbols 16 (copy previous 3-6), 17 (zeros 3-10) and 18 (zeros 11-138).
fn rle_encode_lengths(lengths: &[u8]) -> Vec<RleOp> {
    let mut ops = Vec::new();
    let mut i = 0;
    while i < lengths.len() {
        let len = lengths[i];
        let mut run = 1;
        while i + run < lengths.len() && lengths[i + run] == len {
            run += 1;
        }

        if len == 0 {
            let mut remaining = run;
            while remaining >= 11 {
                let take = remaining.min(138);
                ops.push((18, (take - 11) as u8, 7));
                remaining -= take;
            }
            if remaining >= 3 {
                ops.push((17, (remaining - 3) as u8, 3));
                remaining = 0;
            }
            for _ in 0..remaining {
                ops.push((0, 0, 0));
            }
        } else {
            ops.push((len, 0, 0));
            let mut remaining = run - 1;
            while remaining >= 3 {
                let take = remaining.min(6);
                ops.push((16, (take - 3) as u8, 2));
                remaining -= take;
            }
            for _ in 0..remaining {
                ops.push((len, 0, 0));
            }
        }
        i += run;
    }
    ops
}

/// Emit the block body under the given tables, EOB terminated.
fn write_tokens(
    writer: &mut BitWriter,
    tokens: &[Token],
    litlen: &HuffmanEncoder,
    dist: &HuffmanEncoder,
) -> Result<()> {
    for token in tokens {
        match *token {
            Token::Literal(byte) => litlen.encode(writer, u16::from(byte))?,
            Token::Match { length, distance } => {
                let (symbol, extra_bits, extra_value) = length_to_code(length);
                litlen.encode(writer, symbol)?;
                if extra_bits > 0 {
                    writer.write_bits(u32::from(extra_value), extra_bits);
                }
                let (symbol, extra_bits, extra_value) = distance_to_code(distance);
                dist.encode(writer, symbol)?;
                if extra_bits > 0 {
                    writer.write_bits(u32::from(extra_value), extra_bits);
                }
            }
        }
    }
    litlen.encode(writer, END_OF_BLOCK)
}

/// Total bits a stored rendition would append at the current position,
/// including alignment padding and any 64 KiB chunking.
fn stored_cost_bits(position: u64, len: usize) -> u64 {
    let mut bits = position;
    let mut remaining = len;
    loop {
        let chunk = remaining.min(MAX_STORED_LEN);
        bits += 3;
        bits += (8 - bits % 8) % 8;
        bits += 32 + chunk as u64 * 8;
        remaining -= chunk;
        if remaining == 0 {
            break;
        }
    }
    bits - position
}

/// Emit `raw` as stored blocks, chunked at 64 KiB.
fn write_stored(writer: &mut BitWriter, raw: &[u8], is_final: bool) {
    let mut chunks: Vec<&[u8]> = raw.chunks(MAX_STORED_LEN).collect();
    if chunks.is_empty() {
        chunks.push(&[]);
    }
    let last = chunks.len() - 1;
    for (i, chunk) in chunks.iter().enumerate() {
        writer.write_bit(is_final && i == last);
        writer.write_bits(0b00, 2);
        writer.align_to_byte();
        let len = chunk.len() as u16;
        writer.write_bits(u32::from(len), 16);
        writer.write_bits(u32::from(!len), 16);
        writer.write_bytes(chunk);
    }
}

/// Emit one block, choosing the cheapest of the three encodings.
///
/// Stored must be strictly smaller to win; a fixed/dynamic tie goes to
/// fixed, whose header costs nothing.
fn write_block(writer: &mut BitWriter, tokens: &[Token], raw: &[u8], is_final: bool) -> Result<()> {
    let (litlen_freqs, dist_freqs) = token_frequencies(tokens);

    let fixed_cost = 3 + token_cost_bits(tokens, fixed_litlen_encoder(), fixed_distance_encoder());

    let litlen_lengths = build_lengths(&litlen_freqs, MAX_CODE_LENGTH);
    let dist_lengths = build_lengths(&dist_freqs, MAX_CODE_LENGTH);
    let header = DynamicHeader::plan(&litlen_lengths, &dist_lengths);
    let dynamic_litlen = HuffmanEncoder::from_lengths(&litlen_lengths);
    let dynamic_dist = HuffmanEncoder::from_lengths(&dist_lengths);
    let dynamic_cost =
        3 + header.cost_bits() + token_cost_bits(tokens, &dynamic_litlen, &dynamic_dist);

    let stored_cost = stored_cost_bits(writer.bits_written(), raw.len());

    if stored_cost < fixed_cost.min(dynamic_cost) {
        write_stored(writer, raw, is_final);
    } else if fixed_cost <= dynamic_cost {
        writer.write_bit(is_final);
        writer.write_bits(0b01, 2);
        write_tokens(writer, tokens, fixed_litlen_encoder(), fixed_distance_encoder())?;
    } else {
        writer.write_bit(is_final);
        writer.write_bits(0b10, 2);
        header.write(writer)?;
        write_tokens(writer, tokens, &dynamic_litlen, &dynamic_dist)?;
    }
    Ok(())
}
