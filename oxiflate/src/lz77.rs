//! LZ77 match finding.
//!
//! A hash chain over 3-byte prefixes drives the search: `head` maps a prefix
//! hash to the most recent position that carried it, `prev` threads each
//! position to the previous one with the same hash. Chains are walked from
//! most recent to oldest, so the first candidate of a given length is also
//! the closest one, and only a strictly longer match replaces it. That keeps
//! distances (and their extra bits) small for free.

use crate::Level;
use crate::tables::{MAX_MATCH, MIN_MATCH};
use oxiflate_core::MAX_DISTANCE;

const HASH_BITS: u32 = 15;
const HASH_SIZE: usize = 1 << HASH_BITS;
const NO_POS: u32 = u32::MAX;

/// One unit of LZ77 output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    /// A byte passed through verbatim.
    Literal(u8),
    /// A back-reference: copy `length` bytes from `distance` back.
    Match {
        /// Match length, 3-258.
        length: u16,
        /// Match distance, 1-32768.
        distance: u16,
    },
}

impl Token {
    /// Number of input bytes this token covers.
    pub fn byte_len(&self) -> usize {
        match *self {
            Token::Literal(_) => 1,
            Token::Match { length, .. } => length as usize,
        }
    }
}

/// Search effort knobs, fixed per compression level.
#[derive(Debug, Clone, Copy)]
pub struct MatchParams {
    /// Hash chain candidates examined per search.
    max_chain: usize,
    /// Stop searching once a match of at least this length is found.
    nice_length: usize,
    /// Defer a match by one byte when the next position matches longer.
    lazy: bool,
}

impl MatchParams {
    /// Parameters for a compression level.
    pub fn for_level(level: Level) -> Self {
        match level {
            Level::Fast => Self {
                max_chain: 32,
                nice_length: 16,
                lazy: false,
            },
            Level::Default => Self {
                max_chain: 128,
                nice_length: 128,
                lazy: true,
            },
            Level::Best => Self {
                max_chain: 1024,
                nice_length: MAX_MATCH,
                lazy: true,
            },
        }
    }
}

/// Hash chain state over one input buffer.
struct Matcher<'a> {
    input: &'a [u8],
    head: Vec<u32>,
    prev: Vec<u32>,
    /// Positions below this are already inserted into the chains.
    inserted: usize,
    params: MatchParams,
}

impl<'a> Matcher<'a> {
    fn new(input: &'a [u8], params: MatchParams) -> Self {
        Self {
            input,
            head: vec![NO_POS; HASH_SIZE],
            prev: vec![NO_POS; input.len()],
            inserted: 0,
            params,
        }
    }

    #[inline]
    fn hash(&self, pos: usize) -> usize {
        let prefix = u32::from(self.input[pos])
            | u32::from(self.input[pos + 1]) << 8
            | u32::from(self.input[pos + 2]) << 16;
        (prefix.wrapping_mul(0x9E37_79B1) >> (32 - HASH_BITS)) as usize
    }

    /// Insert every position before `end` into the hash chains.
    fn insert_to(&mut self, end: usize) {
        let limit = end.min(self.input.len().saturating_sub(MIN_MATCH - 1));
        while self.inserted < limit {
            let h = self.hash(self.inserted);
            self.prev[self.inserted] = self.head[h];
            self.head[h] = self.inserted as u32;
            self.inserted += 1;
        }
        self.inserted = self.inserted.max(end);
    }

    /// Best match at `pos`, walking the chain most-recent-first.
    fn find_match(&self, pos: usize) -> Option<(u16, u16)> {
        let input = self.input;
        let max_len = MAX_MATCH.min(input.len() - pos);
        if max_len < MIN_MATCH {
            return None;
        }

        let mut best_len = MIN_MATCH - 1;
        let mut best_dist = 0usize;
        let mut candidate = self.head[self.hash(pos)];
        let mut remaining = self.params.max_chain;

        while candidate != NO_POS && remaining > 0 {
            let cand = candidate as usize;
            let distance = pos - cand;
            // chain positions only get older from here
            if distance > MAX_DISTANCE {
                break;
            }

            // cheap rejection: a longer match must extend past the current best
            if input[cand + best_len] == input[pos + best_len] {
                let mut len = 0;
                while len < max_len && input[cand + len] == input[pos + len] {
                    len += 1;
                }
                if len > best_len {
                    best_len = len;
                    best_dist = distance;
                    if len >= self.params.nice_length || len == max_len {
                        break;
                    }
                }
            }

            candidate = self.prev[cand];
            remaining -= 1;
        }

        if best_len >= MIN_MATCH {
            Some((best_len as u16, best_dist as u16))
        } else {
            None
        }
    }
}

/// Tokenize `input` into literals and back-references.
pub fn tokenize(input: &[u8], params: MatchParams) -> Vec<Token> {
    let mut matcher = Matcher::new(input, params);
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < input.len() {
        matcher.insert_to(pos);

        let Some((length, distance)) = matcher.find_match(pos) else {
            tokens.push(Token::Literal(input[pos]));
            pos += 1;
            continue;
        };

        // Lazy evaluation: a strictly longer match one byte later wins; this
        // position is demoted to a literal.
        if params.lazy && (length as usize) < MAX_MATCH && pos + 1 < input.len() {
            matcher.insert_to(pos + 1);
            if let Some((next_length, _)) = matcher.find_match(pos + 1) {
                if next_length > length {
                    tokens.push(Token::Literal(input[pos]));
                    pos += 1;
                    continue;
                }
            }
        }

        tokens.push(Token::Match { length, distance });
        pos += length as usize;
    }

    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokenize_default(input: &[u8]) -> Vec<Token> {
        tokenize(input, MatchParams::for_level(Level::Default))
    }

    fn replay(tokens: &[Token]) -> Vec<u8> {
        let mut out = Vec::new();
        for token in tokens {
            match *token {
                Token::Literal(b) => out.push(b),
                Token::Match { length, distance } => {
                    let mut src = out.len() - distance as usize;
                    for _ in 0..length {
                        let b = out[src];
                        out.push(b);
                        src += 1;
                    }
                }
            }
        }
        out
    }

    #[test]
    fn test_no_match_for_short_input() {
        assert_eq!(tokenize_default(b"ab"), vec![
            Token::Literal(b'a'),
            Token::Literal(b'b')
        ]);
        assert!(tokenize_default(b"").is_empty());
    }

    #[test]
    fn test_run_becomes_overlapping_match() {
        // ten a's: one literal, then a distance-1 match spanning the rest
        let tokens = tokenize_default(b"aaaaaaaaaa");
        assert_eq!(tokens, vec![
            Token::Literal(b'a'),
            Token::Match {
                length: 9,
                distance: 1
            }
        ]);
    }

    #[test]
    fn test_repeated_phrase() {
        let tokens = tokenize_default(b"abcdefabcdef");
        assert_eq!(tokens.len(), 7);
        assert_eq!(
            tokens[6],
            Token::Match {
                length: 6,
                distance: 6
            }
        );
    }

    #[test]
    fn test_closest_match_wins_on_equal_length() {
        // "xyz" appears at 0 and 4; the reference from 8 must use distance 4
        let tokens = tokenize_default(b"xyz_xyz_xyz");
        let last = tokens.last().unwrap();
        assert_eq!(
            *last,
            Token::Match {
                length: 3,
                distance: 4
            }
        );
    }

    #[test]
    fn test_match_length_capped() {
        let input = vec![b'z'; 1000];
        let tokens = tokenize_default(&input);
        for token in &tokens {
            if let Token::Match { length, .. } = token {
                assert!((*length as usize) <= MAX_MATCH);
            }
        }
        assert_eq!(replay(&tokens), input);
    }

    #[test]
    fn test_replay_roundtrip_all_levels() {
        let mut input = Vec::new();
        for i in 0..600u32 {
            input.extend_from_slice(format!("line {} of the sample\n", i % 37).as_bytes());
        }
        for level in [Level::Fast, Level::Default, Level::Best] {
            let tokens = tokenize(&input, MatchParams::for_level(level));
            assert_eq!(replay(&tokens), input, "level {level:?}");
            let bytes: usize = tokens.iter().map(Token::byte_len).sum();
            assert_eq!(bytes, input.len());
        }
    }

    #[test]
    fn test_lazy_prefers_longer_follow_up() {
        // At 'b' a 3-byte match exists ("bcd"), but starting one later
        // "cdefgh" matches 6 bytes. Lazy matching must take the longer one.
        let input = b"bcd_cdefgh_bcdefgh";
        let tokens = tokenize(input, MatchParams::for_level(Level::Best));
        assert_eq!(replay(tokens.as_slice()), input);
        assert!(tokens.contains(&Token::Match {
            length: 6,
            distance: 8
        }));
    }
}
