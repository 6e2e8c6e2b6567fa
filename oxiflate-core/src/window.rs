//! Decoder-side output window for LZ77 back-references.
//!
//! The decompressed stream doubles as the match history: a back-reference of
//! distance `d` copies from `d` bytes behind the current end of the output.
//! Copies run byte-by-byte so overlapping references (distance < length)
//! replay the repeating pattern they encode, which a bulk copy of the source
//! range would get wrong.

use crate::error::{OxiFlateError, Result};

/// Maximum back-reference distance in DEFLATE (32 KiB).
pub const MAX_DISTANCE: usize = 32768;

/// Growable output buffer whose tail serves as the match window.
#[derive(Debug, Default)]
pub struct OutputWindow {
    output: Vec<u8>,
}

impl OutputWindow {
    /// Create an empty window.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with an output capacity hint.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            output: Vec::with_capacity(capacity),
        }
    }

    /// Append a literal byte.
    #[inline]
    pub fn push_literal(&mut self, byte: u8) {
        self.output.push(byte);
    }

    /// Append a run of literal bytes (stored blocks).
    pub fn push_literals(&mut self, bytes: &[u8]) {
        self.output.extend_from_slice(bytes);
    }

    /// Replay a back-reference of `length` bytes from `distance` back.
    ///
    /// Fails with [`OxiFlateError::InvalidDistance`] if the distance reaches
    /// before the start of the produced output or beyond the 32 KiB window.
    pub fn copy_match(&mut self, distance: usize, length: usize) -> Result<()> {
        let available = self.output.len().min(MAX_DISTANCE);
        if distance == 0 || distance > available {
            return Err(OxiFlateError::invalid_distance(distance, available));
        }

        self.output.reserve(length);
        let mut src = self.output.len() - distance;
        for _ in 0..length {
            let byte = self.output[src];
            self.output.push(byte);
            src += 1;
        }
        Ok(())
    }

    /// Bytes produced so far.
    pub fn len(&self) -> usize {
        self.output.len()
    }

    /// Whether any output has been produced.
    pub fn is_empty(&self) -> bool {
        self.output.is_empty()
    }

    /// View of the produced output.
    pub fn as_slice(&self) -> &[u8] {
        &self.output
    }

    /// Consume the window and return the produced output.
    pub fn into_vec(self) -> Vec<u8> {
        self.output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literals_and_match() {
        let mut window = OutputWindow::new();
        window.push_literals(b"Hello");
        window.copy_match(5, 5).unwrap();
        assert_eq!(window.as_slice(), b"HelloHello");
    }

    #[test]
    fn test_overlapping_copy() {
        // distance=2, length=6 over "AB" must produce the repeating pattern
        let mut window = OutputWindow::new();
        window.push_literals(b"AB");
        window.copy_match(2, 6).unwrap();
        assert_eq!(window.as_slice(), b"ABABABAB");
    }

    #[test]
    fn test_single_byte_run() {
        let mut window = OutputWindow::new();
        window.push_literal(b'X');
        window.copy_match(1, 5).unwrap();
        assert_eq!(window.as_slice(), b"XXXXXX");
    }

    #[test]
    fn test_invalid_distance() {
        let mut window = OutputWindow::new();
        window.push_literals(b"abc");

        assert!(matches!(
            window.copy_match(4, 1),
            Err(OxiFlateError::InvalidDistance {
                distance: 4,
                available: 3
            })
        ));
        assert!(window.copy_match(0, 1).is_err());
    }

    #[test]
    fn test_distance_into_empty_window() {
        let mut window = OutputWindow::new();
        assert!(window.copy_match(1, 1).is_err());
    }
}
