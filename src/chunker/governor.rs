use serde::Serialize;

use crate::tokenizer::TokenCodec;

use super::boundary::trim_at_boundary;
use super::config::ChunkConfig;
use super::error::ChunkError;
use super::normalize::{accepts, normalize};
use super::window::next_window;

/// One emitted chunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Chunk {
    pub text: String,
    /// tokens consumed from the input to produce this chunk
    pub token_count: usize,
    /// true for the untrimmed remainder appended after the chunk cap was hit
    pub tail: bool,
}

/// Lazy chunk stream over one text.
///
/// Each `next` runs main-loop iterations until a window is accepted, the cap
/// is reached or tokens run out. Once the loop stops, whatever tokens are left
/// are emitted as a single tail chunk. After an error the stream is fused.
pub struct Chunks<'c, C: ?Sized> {
    codec: &'c C,
    config: ChunkConfig,
    tokens: Vec<u32>,
    cursor: usize,
    emitted: usize,
    done: bool,
}

impl<'c, C> Chunks<'c, C>
where
    C: TokenCodec + ?Sized,
{
    pub(crate) fn new(codec: &'c C, config: ChunkConfig, text: &str) -> Result<Self, ChunkError> {
        config.validate()?;
        // blank input never reaches the codec
        let tokens = if text.trim().is_empty() { Vec::new() } else { codec.encode(text)? };
        let done = tokens.is_empty();
        Ok(Self { codec, config, tokens, cursor: 0, emitted: 0, done })
    }

    /// Tokens not yet consumed.
    pub fn remaining(&self) -> usize { self.tokens.len() - self.cursor }

    pub fn total_tokens(&self) -> usize { self.tokens.len() }

    fn advance(&mut self) -> Result<Option<Chunk>, ChunkError> {
        while self.cursor < self.tokens.len() && self.emitted < self.config.max_chunk_count {
            let remaining = &self.tokens[self.cursor..];
            let window = next_window(self.codec, remaining, self.config.chunk_token_size)?;

            if window.is_blank() {
                self.cursor += window.len();
                continue;
            }

            let trimmed = trim_at_boundary(&window.text, self.config.min_boundary_offset_chars);
            let used = self.codec.encode(trimmed)?.len();
            if used == 0 {
                return Err(ChunkError::ProgressStalled {
                    cursor: self.cursor,
                    remaining: remaining.len(),
                    window: window.len(),
                });
            }
            let used = used.min(remaining.len());
            self.cursor += used;

            let candidate = normalize(trimmed);
            if accepts(&candidate, self.config.min_accept_length_chars) {
                self.emitted += 1;
                return Ok(Some(Chunk { text: candidate, token_count: used, tail: false }));
            }
        }
        self.take_tail()
    }

    fn take_tail(&mut self) -> Result<Option<Chunk>, ChunkError> {
        if self.cursor >= self.tokens.len() {
            return Ok(None);
        }
        let tail = &self.tokens[self.cursor..];
        let token_count = tail.len();
        let text = self.codec.decode(tail)?;
        self.cursor = self.tokens.len();

        let candidate = normalize(&text);
        if accepts(&candidate, self.config.min_accept_length_chars) {
            Ok(Some(Chunk { text: candidate, token_count, tail: true }))
        } else {
            Ok(None)
        }
    }
}

impl<C> Iterator for Chunks<'_, C>
where
    C: TokenCodec + ?Sized,
{
    type Item = Result<Chunk, ChunkError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.advance() {
            Ok(Some(chunk)) => Some(Ok(chunk)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
