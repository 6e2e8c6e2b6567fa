//! Block splitting heuristic.
//!
//! Decides when to cut a new block (and thus new Huffman tables) by watching
//! the token stream's symbol distribution. Tokens are bucketed into ten
//! coarse observation types; when the distribution of recent observations
//! drifts far enough from the block's cumulative distribution, the block
//! ends. The comparison is done in cross-multiplied integer space so no
//! division or floating point is needed.

const NUM_LITERAL_OBSERVATION_TYPES: usize = 8;
const NUM_MATCH_OBSERVATION_TYPES: usize = 2;
const NUM_OBSERVATION_TYPES: usize = NUM_LITERAL_OBSERVATION_TYPES + NUM_MATCH_OBSERVATION_TYPES;

/// Observations gathered between distribution checks.
const OBSERVATIONS_PER_CHECK: u64 = 512;

/// Blocks shorter than this never end early.
const MIN_BLOCK_LENGTH: usize = 1000;

/// Streaming distribution tracker deciding block boundaries.
#[derive(Debug, Default)]
pub struct BlockSplitter {
    observations: [u64; NUM_OBSERVATION_TYPES],
    new_observations: [u64; NUM_OBSERVATION_TYPES],
    num_observations: u64,
    num_new_observations: u64,
}

impl BlockSplitter {
    /// Create a splitter with empty statistics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a literal byte. Buckets by the top two and bottom one bits,
    /// a cheap proxy for text/binary and even/odd structure.
    pub fn observe_literal(&mut self, literal: u8) {
        let obs_type = (((literal >> 5) & 0x6) | (literal & 1)) as usize;
        self.new_observations[obs_type] += 1;
        self.num_new_observations += 1;
    }

    /// Record a match, bucketed into short (< 9) and long.
    pub fn observe_match(&mut self, length: u16) {
        let obs_type = NUM_LITERAL_OBSERVATION_TYPES + usize::from(length >= 9);
        self.new_observations[obs_type] += 1;
        self.num_new_observations += 1;
    }

    fn merge_new_observations(&mut self) {
        for i in 0..NUM_OBSERVATION_TYPES {
            self.observations[i] += self.new_observations[i];
            self.new_observations[i] = 0;
        }
        self.num_observations += self.num_new_observations;
        self.num_new_observations = 0;
    }

    /// Whether the block covering `block_length` input bytes should end here.
    ///
    /// Checks only once enough fresh observations accumulated and the block
    /// has a worthwhile minimum size; otherwise the fresh counts are folded
    /// into the cumulative ones and the block continues.
    pub fn should_end_block(&mut self, block_length: usize) -> bool {
        if self.num_new_observations < OBSERVATIONS_PER_CHECK || block_length < MIN_BLOCK_LENGTH {
            return false;
        }

        if self.num_observations == 0 {
            self.merge_new_observations();
            return false;
        }

        // Sum of |p_new - p_old| per type, scaled by both totals to stay
        // in integers.
        let mut total_delta = 0u64;
        for i in 0..NUM_OBSERVATION_TYPES {
            let expected = self.observations[i] * self.num_new_observations;
            let actual = self.new_observations[i] * self.num_observations;
            total_delta += expected.abs_diff(actual);
        }

        let num_items = self.num_observations + self.num_new_observations;

        // base cutoff: a 200/512 probability shift
        let mut cutoff = self.num_new_observations * 200 * self.num_observations / 512;

        // raise the bar for blocks too small to amortize a fresh header
        if block_length < 10_000 && num_items < 8192 {
            cutoff += cutoff * (8192 - num_items) / 8192;
        }

        // long blocks get progressively easier to cut
        let length_penalty = (block_length as u64 / 4096) * self.num_observations;

        if total_delta + length_penalty >= cutoff {
            return true;
        }

        self.merge_new_observations();
        false
    }

    /// Clear all statistics for the next block.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_split_before_minimums() {
        let mut splitter = BlockSplitter::new();
        for _ in 0..100 {
            splitter.observe_literal(b'a');
        }
        // too few observations and too short a block
        assert!(!splitter.should_end_block(500));
        assert!(!splitter.should_end_block(100_000));
    }

    #[test]
    fn test_uniform_stream_never_splits() {
        let mut splitter = BlockSplitter::new();
        let mut length = 0usize;
        for i in 0..20_000u32 {
            splitter.observe_literal((i % 4) as u8);
            length += 1;
            assert!(
                !splitter.should_end_block(length.min(9_000)),
                "uniform stream split at {length}"
            );
        }
    }

    #[test]
    fn test_distribution_shift_splits() {
        let mut splitter = BlockSplitter::new();

        // establish a lowercase-text distribution
        for i in 0..4096u32 {
            splitter.observe_literal(b'a' + (i % 2) as u8);
            splitter.should_end_block(4096);
        }
        // switch to high-bit binary data
        let mut split = false;
        for _ in 0..4096 {
            splitter.observe_literal(0xF0);
            if splitter.should_end_block(8192) {
                split = true;
                break;
            }
        }
        assert!(split, "distribution change went undetected");
    }

    #[test]
    fn test_reset_clears_state() {
        let mut splitter = BlockSplitter::new();
        for _ in 0..600 {
            splitter.observe_match(20);
        }
        splitter.reset();
        assert!(!splitter.should_end_block(1_000_000));
    }
}
