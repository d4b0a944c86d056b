use std::env;

use serde::{Deserialize, Serialize};

use super::error::ChunkError;

/// Target tokens per chunk before boundary trimming.
pub const CHUNK_SIZE: usize = 200;
/// A boundary must sit past this character offset inside the window to be honored.
pub const MIN_CHUNK_SIZE_CHARS: usize = 350;
/// Normalized chunks at or below this many characters are dropped.
pub const MIN_CHUNK_LENGTH_TO_EMBED: usize = 5;
/// Cap on chunks emitted by the main loop (the tail may add one more).
pub const MAX_NUM_CHUNKS: usize = 10_000;

pub const ENV_CHUNK_SIZE: &str = "RAG_CHUNK_SIZE";
pub const ENV_MIN_CHUNK_SIZE_CHARS: &str = "RAG_MIN_CHUNK_SIZE_CHARS";
pub const ENV_MIN_CHUNK_LENGTH_TO_EMBED: &str = "RAG_MIN_CHUNK_LENGTH_TO_EMBED";
pub const ENV_MAX_NUM_CHUNKS: &str = "RAG_MAX_NUM_CHUNKS";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkConfig {
    pub chunk_token_size: usize,
    pub min_boundary_offset_chars: usize,
    pub min_accept_length_chars: usize,
    pub max_chunk_count: usize,
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            chunk_token_size: CHUNK_SIZE,
            min_boundary_offset_chars: MIN_CHUNK_SIZE_CHARS,
            min_accept_length_chars: MIN_CHUNK_LENGTH_TO_EMBED,
            max_chunk_count: MAX_NUM_CHUNKS,
        }
    }
}

impl ChunkConfig {
    /// Defaults overridden by `RAG_CHUNK_SIZE`, `RAG_MIN_CHUNK_SIZE_CHARS`,
    /// `RAG_MIN_CHUNK_LENGTH_TO_EMBED` and `RAG_MAX_NUM_CHUNKS` when set.
    pub fn from_env() -> Result<Self, ChunkError> {
        let d = Self::default();
        let cfg = Self {
            chunk_token_size: setting(ENV_CHUNK_SIZE, env::var(ENV_CHUNK_SIZE).ok().as_deref(), d.chunk_token_size)?,
            min_boundary_offset_chars: setting(
                ENV_MIN_CHUNK_SIZE_CHARS,
                env::var(ENV_MIN_CHUNK_SIZE_CHARS).ok().as_deref(),
                d.min_boundary_offset_chars,
            )?,
            min_accept_length_chars: setting(
                ENV_MIN_CHUNK_LENGTH_TO_EMBED,
                env::var(ENV_MIN_CHUNK_LENGTH_TO_EMBED).ok().as_deref(),
                d.min_accept_length_chars,
            )?,
            max_chunk_count: setting(ENV_MAX_NUM_CHUNKS, env::var(ENV_MAX_NUM_CHUNKS).ok().as_deref(), d.max_chunk_count)?,
        };
        cfg.validate()?;
        Ok(cfg)
    }

    /// `None` keeps the configured size; `Some(0)` is rejected by `validate`.
    pub fn with_chunk_token_size(mut self, size: Option<usize>) -> Self {
        if let Some(n) = size { self.chunk_token_size = n; }
        self
    }

    pub fn with_min_boundary_offset_chars(mut self, n: usize) -> Self { self.min_boundary_offset_chars = n; self }
    pub fn with_min_accept_length_chars(mut self, n: usize) -> Self { self.min_accept_length_chars = n; self }
    pub fn with_max_chunk_count(mut self, n: usize) -> Self { self.max_chunk_count = n; self }

    pub fn validate(&self) -> Result<(), ChunkError> {
        if self.chunk_token_size == 0 {
            return Err(ChunkError::invalid("chunk_token_size must be a positive integer"));
        }
        Ok(())
    }
}

// Parse one numeric override. Negative or non-numeric values fail instead of clamping.
fn setting(name: &str, raw: Option<&str>, default: usize) -> Result<usize, ChunkError> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else { return Ok(default) };
    let v: i64 = raw
        .parse()
        .map_err(|_| ChunkError::invalid(format!("{name} must be an integer, got {raw:?}")))?;
    usize::try_from(v).map_err(|_| ChunkError::invalid(format!("{name} must be non-negative, got {v}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_constants() {
        let cfg = ChunkConfig::default();
        assert_eq!(cfg.chunk_token_size, CHUNK_SIZE);
        assert_eq!(cfg.min_boundary_offset_chars, MIN_CHUNK_SIZE_CHARS);
        assert_eq!(cfg.min_accept_length_chars, MIN_CHUNK_LENGTH_TO_EMBED);
        assert_eq!(cfg.max_chunk_count, MAX_NUM_CHUNKS);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn zero_chunk_size_is_rejected() {
        let cfg = ChunkConfig::default().with_chunk_token_size(Some(0));
        let err = cfg.validate().unwrap_err();
        assert!(matches!(err, ChunkError::InvalidConfiguration(_)));
    }

    #[test]
    fn missing_size_keeps_default() {
        let cfg = ChunkConfig::default().with_chunk_token_size(None);
        assert_eq!(cfg.chunk_token_size, CHUNK_SIZE);
    }

    #[test]
    fn setting_parses_overrides() {
        assert_eq!(setting("X", None, 7).unwrap(), 7);
        assert_eq!(setting("X", Some("  "), 7).unwrap(), 7);
        assert_eq!(setting("X", Some("42"), 7).unwrap(), 42);
        assert_eq!(setting("X", Some("0"), 7).unwrap(), 0);
    }

    #[test]
    fn setting_rejects_negative_and_garbage() {
        let neg = setting("RAG_MAX_NUM_CHUNKS", Some("-3"), 7).unwrap_err();
        assert!(neg.to_string().contains("non-negative"));
        let junk = setting("RAG_CHUNK_SIZE", Some("lots"), 7).unwrap_err();
        assert!(junk.to_string().contains("RAG_CHUNK_SIZE"));
    }
}
