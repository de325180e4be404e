//! Newline-delimited frame decoding.
//!
//! The monitor socket carries text frames separated by `\n`. Chunks
//! read from the socket can split a frame anywhere, including inside a
//! multi-byte character, so the decoder buffers the unterminated tail
//! between reads. How bytes were grouped into reads never changes
//! which frames come out.
//!
//! Empty frames (and frames that are a lone `\r`) are dropped here so
//! blank keep-alive lines never reach the classifier.

// ============================================================================
// Imports
// ============================================================================

use crate::error::{Error, Result};

// ============================================================================
// Constants
// ============================================================================

/// Default upper bound for a single frame, in bytes.
///
/// Monitor replies are small; a frame approaching this limit means the
/// peer stopped sending newlines and the buffer would otherwise grow
/// without bound.
pub const DEFAULT_MAX_FRAME_LEN: usize = 1024 * 1024;

// ============================================================================
// FrameDecoder
// ============================================================================

/// Incremental splitter of a byte stream into text frames.
///
/// Feed it chunks in arrival order; it returns every frame completed
/// by that chunk and keeps the unterminated tail for the next call.
#[derive(Debug)]
pub struct FrameDecoder {
    /// Bytes of the frame still waiting for its delimiter.
    carry: Vec<u8>,
    /// Per-frame size limit in bytes.
    max_frame_len: usize,
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameDecoder {
    /// Creates a decoder with [`DEFAULT_MAX_FRAME_LEN`].
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::with_max_frame_len(DEFAULT_MAX_FRAME_LEN)
    }

    /// Creates a decoder with a custom per-frame size limit.
    #[inline]
    #[must_use]
    pub fn with_max_frame_len(max_frame_len: usize) -> Self {
        Self {
            carry: Vec::new(),
            max_frame_len,
        }
    }

    /// Returns the number of buffered bytes awaiting a delimiter.
    #[inline]
    #[must_use]
    pub fn buffered(&self) -> usize {
        self.carry.len()
    }

    /// Consumes one chunk and returns the frames it completed.
    ///
    /// # Errors
    ///
    /// - [`Error::FrameTooLarge`] when the pending frame would exceed
    ///   the configured limit.
    /// - [`Error::MalformedMessage`] when a completed frame is not
    ///   valid UTF-8.
    ///
    /// Both errors invalidate the stream; the decoder must not be fed
    /// further after one is returned.
    pub fn feed(&mut self, chunk: &[u8]) -> Result<Vec<String>> {
        let mut frames = Vec::new();
        let mut rest = chunk;

        while let Some(pos) = rest.iter().position(|&b| b == b'\n') {
            self.check_capacity(pos)?;
            self.carry.extend_from_slice(&rest[..pos]);
            rest = &rest[pos + 1..];

            if let Some(frame) = Self::finish(std::mem::take(&mut self.carry))? {
                frames.push(frame);
            }
        }

        self.check_capacity(rest.len())?;
        self.carry.extend_from_slice(rest);

        Ok(frames)
    }

    /// Rejects growth past the per-frame limit.
    fn check_capacity(&self, additional: usize) -> Result<()> {
        let length = self.carry.len() + additional;
        if length > self.max_frame_len {
            return Err(Error::frame_too_large(self.max_frame_len, length));
        }
        Ok(())
    }

    /// Finalizes a delimited frame: strips one trailing `\r`, drops
    /// empty frames, validates UTF-8.
    fn finish(mut frame: Vec<u8>) -> Result<Option<String>> {
        if frame.last() == Some(&b'\r') {
            frame.pop();
        }
        if frame.is_empty() {
            return Ok(None);
        }

        match String::from_utf8(frame) {
            Ok(text) => Ok(Some(text)),
            Err(err) => {
                let context = String::from_utf8_lossy(err.as_bytes()).into_owned();
                Err(Error::malformed("frame is not valid UTF-8", context))
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
