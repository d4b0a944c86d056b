//! Token-budgeted text chunking.
//!
//! Text is encoded once, then consumed window by window: each window holds at
//! most `chunk_token_size` tokens, is cut back to its last sentence or line
//! break when that break sits late enough, and is normalized before it is
//! emitted. The cursor advances by the re-encoded length of the cut text, so
//! whatever follows the break starts the next window.

pub mod boundary;
pub mod config;
pub mod error;
pub mod governor;
pub mod normalize;
pub mod window;

pub use config::{ChunkConfig, CHUNK_SIZE, MAX_NUM_CHUNKS, MIN_CHUNK_LENGTH_TO_EMBED, MIN_CHUNK_SIZE_CHARS};
pub use error::ChunkError;
pub use governor::{Chunk, Chunks};

use crate::tokenizer::TokenCodec;

/// Chunks text with a shared codec and a fixed configuration.
pub struct Chunker<'c, C: ?Sized> {
    codec: &'c C,
    config: ChunkConfig,
}

impl<'c, C> Chunker<'c, C>
where
    C: TokenCodec + ?Sized,
{
    pub fn new(codec: &'c C, config: ChunkConfig) -> Self {
        Self { codec, config }
    }

    pub fn config(&self) -> &ChunkConfig { &self.config }

    /// Lazy chunk stream. `format` is a reserved hint (e.g. a file extension)
    /// and does not influence splitting.
    pub fn chunks(&self, text: &str, format: &str) -> Result<Chunks<'c, C>, ChunkError> {
        let _ = format;
        Chunks::new(self.codec, self.config, text)
    }

    pub fn chunk_records(&self, text: &str, format: &str) -> Result<Vec<Chunk>, ChunkError> {
        self.chunks(text, format)?.collect()
    }

    pub fn chunk(&self, text: &str, format: &str) -> Result<Vec<String>, ChunkError> {
        self.chunks(text, format)?.map(|r| r.map(|c| c.text)).collect()
    }
}

/// Split `text` into chunks of roughly `chunk_token_size` tokens (default
/// [`CHUNK_SIZE`]) using the default limits from [`ChunkConfig`].
pub fn chunk<C>(codec: &C, text: &str, chunk_token_size: Option<usize>, format: &str) -> Result<Vec<String>, ChunkError>
where
    C: TokenCodec + ?Sized,
{
    let config = ChunkConfig::default().with_chunk_token_size(chunk_token_size);
    Chunker::new(codec, config).chunk(text, format)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::CharTokenizer;
    use anyhow::Result;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingCodec {
        calls: AtomicUsize,
    }

    impl TokenCodec for CountingCodec {
        fn encode(&self, text: &str) -> Result<Vec<u32>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            CharTokenizer.encode(text)
        }
        fn decode(&self, ids: &[u32]) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            CharTokenizer.decode(ids)
        }
    }

    fn sample_text() -> String {
        let sentences = [
            "The quick brown fox jumps over the lazy dog.",
            "Pack my box with five dozen liquor jugs!",
            "How vexingly quick daft zebras jump?",
            "Sphinx of black quartz, judge my vow",
            "\n\n",
            "A wizard's job is to vex chumps quickly in fog.",
            "\n",
            "Jackdaws love my big sphinx of quartz",
        ];
        let mut out = String::new();
        for i in 0..40 {
            out.push_str(sentences[i % sentences.len()]);
            out.push(' ');
        }
        out
    }

    fn worked_config() -> ChunkConfig {
        ChunkConfig::default()
            .with_chunk_token_size(Some(20))
            .with_min_boundary_offset_chars(5)
            .with_min_accept_length_chars(1)
            .with_max_chunk_count(10)
    }

    #[test]
    fn worked_example() {
        let chunker = Chunker::new(&CharTokenizer, worked_config());
        let chunks = chunker.chunk("Hello world. This is a test sentence.", "txt").unwrap();
        assert_eq!(chunks, vec!["Hello world.", "This is a test sent", "ence."]);
    }

    #[test]
    fn blank_input_yields_nothing_without_codec_calls() {
        let codec = CountingCodec { calls: AtomicUsize::new(0) };
        assert!(chunk(&codec, "", None, "txt").unwrap().is_empty());
        assert!(chunk(&codec, "   \n\t ", None, "txt").unwrap().is_empty());
        assert_eq!(codec.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn zero_chunk_size_is_rejected() {
        let err = chunk(&CharTokenizer, "some text", Some(0), "txt").unwrap_err();
        assert!(matches!(err, ChunkError::InvalidConfiguration(_)));
    }

    #[test]
    fn default_size_applies_when_unset() {
        let text = "word ".repeat(100);
        let chunks = chunk(&CharTokenizer, &text, None, "txt").unwrap();
        // 500 chars with no boundary: 200 + 200 + 100
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].chars().count(), CHUNK_SIZE - 1);
    }

    #[test]
    fn format_hint_does_not_change_output() {
        let chunker = Chunker::new(&CharTokenizer, worked_config());
        let text = sample_text();
        let a = chunker.chunk(&text, "py").unwrap();
        let b = chunker.chunk(&text, "rs").unwrap();
        let c = chunker.chunk(&text, "").unwrap();
        assert_eq!(a, b);
        assert_eq!(a, c);
    }

    #[test]
    fn chunks_are_clean_bounded_and_ordered() {
        let config = ChunkConfig::default()
            .with_chunk_token_size(Some(40))
            .with_min_boundary_offset_chars(10)
            .with_min_accept_length_chars(2)
            .with_max_chunk_count(1000);
        let text = sample_text();
        let records = Chunker::new(&CharTokenizer, config).chunk_records(&text, "txt").unwrap();
        assert!(!records.is_empty());

        let flat = text.replace('\n', " ");
        let mut pos = 0usize;
        for rec in &records {
            assert!(!rec.text.is_empty());
            assert!(!rec.text.contains('\n'));
            assert_eq!(rec.text.trim(), rec.text);
            if !rec.tail {
                assert!(rec.token_count <= 40);
                assert!(rec.text.chars().count() <= 40);
            }
            let found = flat[pos..].find(&rec.text).expect("chunk text comes from input in order");
            pos += found + rec.text.len();
        }
    }

    #[test]
    fn cap_bounds_output() {
        let config = ChunkConfig::default()
            .with_chunk_token_size(Some(16))
            .with_min_boundary_offset_chars(4)
            .with_min_accept_length_chars(0)
            .with_max_chunk_count(3);
        let text = sample_text();
        let records = Chunker::new(&CharTokenizer, config).chunk_records(&text, "txt").unwrap();
        assert_eq!(records.len(), 4);
        assert!(records[..3].iter().all(|r| !r.tail));
        assert!(records[3].tail);
        assert!(records[3].token_count > 16);
    }
}
