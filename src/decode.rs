//! Incremental UTF-8 decoding of a chunked response body.
//!
//! A chunk boundary may fall inside a multi-byte character. The decoder keeps
//! the incomplete tail of one chunk and completes it with the head of the
//! next, so decoding a body in any number of pieces yields exactly the text
//! obtained by decoding it in one go.

use bytes::{Buf, BytesMut};
use thiserror::Error;

use crate::options::DecodeMode;

const REPLACEMENT: char = '\u{FFFD}';

/// Errors raised by a strict decoder.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("invalid UTF-8 sequence at byte offset {offset}")]
    InvalidSequence { offset: u64 },

    #[error("stream ended inside a multi-byte character ({pending} dangling bytes)")]
    Truncated { pending: usize },
}

/// Stateful byte-to-text decoder owned by one in-flight request.
#[derive(Debug, Default)]
pub struct Utf8StreamDecoder {
    pending: BytesMut,
    consumed: u64,
    mode: DecodeMode,
}

impl Utf8StreamDecoder {
    pub fn new(mode: DecodeMode) -> Self {
        Self {
            pending: BytesMut::new(),
            consumed: 0,
            mode,
        }
    }

    /// Number of bytes held back waiting for the rest of a character.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Decode the next chunk, returning all text that is complete so far.
    ///
    /// In lossy mode every maximal invalid subsequence becomes one U+FFFD,
    /// the same substitution a non-fatal text decoder performs.
    pub fn decode(&mut self, chunk: &[u8]) -> Result<String, DecodeError> {
        self.pending.extend_from_slice(chunk);
        let mut out = String::with_capacity(self.pending.len());

        loop {
            let error = match std::str::from_utf8(&self.pending) {
                Ok(text) => {
                    out.push_str(text);
                    self.advance(self.pending.len());
                    return Ok(out);
                }
                Err(error) => error,
            };

            let valid = error.valid_up_to();
            out.push_str(&String::from_utf8_lossy(&self.pending[..valid]));

            match error.error_len() {
                // Incomplete character at the end: wait for more bytes.
                None => {
                    self.advance(valid);
                    return Ok(out);
                }
                Some(invalid) => match self.mode {
                    DecodeMode::Strict => {
                        let offset = self.consumed + valid as u64;
                        self.pending.clear();
                        return Err(DecodeError::InvalidSequence { offset });
                    }
                    DecodeMode::Lossy => {
                        out.push(REPLACEMENT);
                        self.advance(valid + invalid);
                    }
                },
            }
        }
    }

    /// Flush the decoder at end of stream.
    ///
    /// Dangling bytes become one U+FFFD in lossy mode and an error in strict mode.
    pub fn finish(&mut self) -> Result<String, DecodeError> {
        if self.pending.is_empty() {
            return Ok(String::new());
        }
        let pending = self.pending.len();
        self.pending.clear();
        match self.mode {
            DecodeMode::Lossy => Ok(REPLACEMENT.to_string()),
            DecodeMode::Strict => Err(DecodeError::Truncated { pending }),
        }
    }

    fn advance(&mut self, n: usize) {
        self.pending.advance(n);
        self.consumed += n as u64;
    }
}
