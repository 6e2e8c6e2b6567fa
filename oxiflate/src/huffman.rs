//! Canonical Huffman coding.
//!
//! Code lengths are the only thing the two sides share: given the same length
//! set, encoder and decoder both derive the canonical code assignment of RFC
//! 1951 section 3.2.2 (codes of the same length are consecutive, ordered by
//! symbol; shorter codes numerically precede longer ones after shifting).
//!
//! The encoder builds lengths with a plain greedy merge and then rebalances
//! any length over the cap with the counts-array scheme zlib uses, so the
//! emitted code is always complete. The decoder walks the canonical code
//! space bit by bit, tracking the first code value of each length.

use crate::tables::MAX_CODE_LENGTH;
use oxiflate_core::{BitReader, BitWriter, OxiFlateError, Result};

/// Derive code lengths for `freqs`, capped at `max_len` bits.
///
/// Symbols with zero frequency get length 0 (no code). A single used symbol
/// gets length 1. Ties during the merge are broken deterministically: leaves
/// are ordered by (frequency, symbol) and preferred over internal nodes of
/// equal weight, so both sides of a build always agree.
pub fn build_lengths(freqs: &[u32], max_len: u8) -> Vec<u8> {
    let mut lengths = vec![0u8; freqs.len()];

    let mut leaves: Vec<usize> = (0..freqs.len()).filter(|&s| freqs[s] > 0).collect();
    if leaves.is_empty() {
        return lengths;
    }
    if leaves.len() == 1 {
        lengths[leaves[0]] = 1;
        return lengths;
    }
    leaves.sort_by_key(|&s| (freqs[s], s));

    // Two-queue merge. Leaves occupy node indices 0..leaves.len() in
    // ascending frequency order; internal nodes follow in creation order.
    // Both queues are nondecreasing in weight, so the two fronts always
    // hold the two global minima.
    let mut nodes: Vec<(u64, usize)> = leaves
        .iter()
        .map(|&s| (u64::from(freqs[s]), usize::MAX))
        .collect();
    let mut internal: Vec<usize> = Vec::with_capacity(leaves.len() - 1);
    let mut leaf_pos = 0;
    let mut internal_pos = 0;

    fn take_min(
        nodes: &[(u64, usize)],
        leaf_count: usize,
        leaf_pos: &mut usize,
        internal: &[usize],
        internal_pos: &mut usize,
    ) -> usize {
        let have_leaf = *leaf_pos < leaf_count;
        let have_internal = *internal_pos < internal.len();
        // on equal weight, take the leaf
        if have_leaf
            && (!have_internal || nodes[*leaf_pos].0 <= nodes[internal[*internal_pos]].0)
        {
            *leaf_pos += 1;
            *leaf_pos - 1
        } else {
            debug_assert!(have_internal);
            *internal_pos += 1;
            internal[*internal_pos - 1]
        }
    }

    let leaf_count = leaves.len();
    for _ in 0..leaf_count - 1 {
        let a = take_min(&nodes, leaf_count, &mut leaf_pos, &internal, &mut internal_pos);
        let b = take_min(&nodes, leaf_count, &mut leaf_pos, &internal, &mut internal_pos);
        let merged = nodes.len();
        let weight = nodes[a].0 + nodes[b].0;
        nodes[a].1 = merged;
        nodes[b].1 = merged;
        nodes.push((weight, usize::MAX));
        internal.push(merged);
    }

    // Parents are always created after their children, so a single reverse
    // pass resolves every depth from the root down.
    let mut depth = vec![0u32; nodes.len()];
    for idx in (0..nodes.len() - 1).rev() {
        depth[idx] = depth[nodes[idx].1] + 1;
    }

    // Clamp over-long codes and rebalance the per-length counts the way
    // zlib's gen_bitlen does: each step turns a leaf above the deepest
    // non-empty level into an internal node whose two children absorb one
    // clamped code.
    let max = max_len as usize;
    let mut bl_count = vec![0i32; max + 1];
    let mut overflow = 0i32;
    for &d in depth.iter().take(leaf_count) {
        let mut d = d as usize;
        if d > max {
            d = max;
            overflow += 1;
        }
        bl_count[d] += 1;
    }
    while overflow > 0 {
        let mut bits = max - 1;
        while bl_count[bits] == 0 {
            bits -= 1;
        }
        bl_count[bits] -= 1;
        bl_count[bits + 1] += 2;
        bl_count[max] -= 1;
        overflow -= 2;
    }

    // Hand the longest codes to the least frequent symbols. `leaves` is
    // already in ascending frequency order.
    let mut next_leaf = 0;
    for bits in (1..=max).rev() {
        for _ in 0..bl_count[bits] {
            lengths[leaves[next_leaf]] = bits as u8;
            next_leaf += 1;
        }
    }
    debug_assert_eq!(next_leaf, leaf_count);

    lengths
}

/// Canonical code assignment: `(code, length)` per symbol, MSB-first codes.
fn canonical_codes(lengths: &[u8]) -> Vec<(u16, u8)> {
    let mut bl_count = [0u16; MAX_CODE_LENGTH as usize + 1];
    for &len in lengths {
        if len > 0 {
            bl_count[len as usize] += 1;
        }
    }

    let mut next_code = [0u16; MAX_CODE_LENGTH as usize + 1];
    let mut code = 0u16;
    for bits in 1..=MAX_CODE_LENGTH as usize {
        code = (code + bl_count[bits - 1]) << 1;
        next_code[bits] = code;
    }

    lengths
        .iter()
        .map(|&len| {
            if len == 0 {
                (0, 0)
            } else {
                let assigned = next_code[len as usize];
                next_code[len as usize] += 1;
                (assigned, len)
            }
        })
        .collect()
}

/// Reverse the low `len` bits of `code` for LSB-first emission.
fn reverse_bits(code: u16, len: u8) -> u16 {
    debug_assert!(len >= 1 && len <= 16);
    code.reverse_bits() >> (16 - len)
}

/// Encoder side of a canonical Huffman table.
#[derive(Debug)]
pub struct HuffmanEncoder {
    /// Per symbol: bit-reversed code and its length (0 = no code).
    codes: Vec<(u16, u8)>,
}

impl HuffmanEncoder {
    /// Build an encoder from a code length set.
    pub fn from_lengths(lengths: &[u8]) -> Self {
        let codes = canonical_codes(lengths)
            .into_iter()
            .map(|(code, len)| {
                if len == 0 {
                    (0, 0)
                } else {
                    (reverse_bits(code, len), len)
                }
            })
            .collect();
        Self { codes }
    }

    /// Emit the code for `symbol`.
    ///
    /// Fails with [`OxiFlateError::UnknownSymbol`] if the symbol has no
    /// assigned code.
    pub fn encode(&self, writer: &mut BitWriter, symbol: u16) -> Result<()> {
        match self.codes.get(symbol as usize) {
            Some(&(code, len)) if len > 0 => {
                writer.write_bits(u32::from(code), len);
                Ok(())
            }
            _ => Err(OxiFlateError::unknown_symbol(symbol, writer.bits_written())),
        }
    }

    /// Code length of `symbol` in bits, 0 if unassigned. Used for exact
    /// block cost accounting.
    pub fn code_length(&self, symbol: u16) -> u8 {
        self.codes.get(symbol as usize).map_or(0, |&(_, len)| len)
    }
}

/// Decoder side of a canonical Huffman table.
///
/// Stores only the per-length code counts and the symbols sorted by
/// (length, symbol); the canonical numbering makes that enough to decode.
#[derive(Debug)]
pub struct HuffmanDecoder {
    counts: [u16; MAX_CODE_LENGTH as usize + 1],
    symbols: Vec<u16>,
    max_length: u8,
}

impl HuffmanDecoder {
    /// Build a decoder from a code length set.
    ///
    /// Over-subscribed length sets (Kraft sum above one) fail with
    /// [`OxiFlateError::InvalidCodeLengths`] carrying `bit_position`.
    /// Incomplete sets are accepted; their dead bit patterns surface as
    /// [`OxiFlateError::UnknownSymbol`] during decode. The degenerate
    /// single-symbol table (one code of length 1) is legal.
    pub fn from_lengths(lengths: &[u8], bit_position: u64) -> Result<Self> {
        let mut counts = [0u16; MAX_CODE_LENGTH as usize + 1];
        let mut max_length = 0u8;
        for &len in lengths {
            if len > 0 {
                counts[len as usize] += 1;
                max_length = max_length.max(len);
            }
        }

        let mut left: i32 = 1;
        for &count in counts.iter().skip(1) {
            left <<= 1;
            left -= i32::from(count);
            if left < 0 {
                return Err(OxiFlateError::invalid_code_lengths(bit_position));
            }
        }

        // Symbols sorted by (length, symbol): offsets are prefix sums of the
        // counts, then one pass drops each symbol into its slot.
        let mut offsets = [0usize; MAX_CODE_LENGTH as usize + 2];
        for len in 1..=MAX_CODE_LENGTH as usize {
            offsets[len + 1] = offsets[len] + counts[len] as usize;
        }
        let mut symbols = vec![0u16; offsets[MAX_CODE_LENGTH as usize + 1]];
        for (symbol, &len) in lengths.iter().enumerate() {
            if len > 0 {
                symbols[offsets[len as usize]] = symbol as u16;
                offsets[len as usize] += 1;
            }
        }

        Ok(Self {
            counts,
            symbols,
            max_length,
        })
    }

    /// Decode one symbol from `reader`.
    ///
    /// Accumulates bits until the code value falls inside the canonical range
    /// of some length. A pattern outside every range (possible only with an
    /// incomplete table) fails with [`OxiFlateError::UnknownSymbol`].
    pub fn decode(&self, reader: &mut BitReader<'_>) -> Result<u16> {
        let mut code: u32 = 0;
        let mut first: u32 = 0;
        let mut index: usize = 0;

        for len in 1..=self.max_length as usize {
            code |= reader.read_bits(1)?;
            let count = u32::from(self.counts[len]);
            if code < first + count {
                return Ok(self.symbols[index + (code - first) as usize]);
            }
            index += count as usize;
            first = (first + count) << 1;
            code <<= 1;
        }

        Err(OxiFlateError::unknown_symbol(
            (code >> 1) as u16,
            reader.bit_position(),
        ))
    }
}
