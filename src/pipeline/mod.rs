pub mod batch;
pub mod chunk;

use anyhow::Result;
use clap::Args;

use crate::chunker::ChunkConfig;

/// Per-run overrides for the chunk limits; unset flags keep the
/// environment/default value.
#[derive(Args, Clone, Debug, Default)]
pub struct LimitArgs {
    /// Target tokens per chunk (RAG_CHUNK_SIZE)
    #[arg(long)] pub tokens_target: Option<usize>,
    /// Minimum character offset for a sentence/line break to be used (RAG_MIN_CHUNK_SIZE_CHARS)
    #[arg(long)] pub min_boundary_chars: Option<usize>,
    /// Chunks of this many characters or fewer are dropped (RAG_MIN_CHUNK_LENGTH_TO_EMBED)
    #[arg(long)] pub min_chunk_chars: Option<usize>,
    /// Maximum chunks before the remainder becomes one tail chunk (RAG_MAX_NUM_CHUNKS)
    #[arg(long)] pub max_chunks: Option<usize>,
}

impl LimitArgs {
    pub fn resolve(&self) -> Result<ChunkConfig> {
        let cfg = self.apply_to(ChunkConfig::from_env()?);
        cfg.validate()?;
        Ok(cfg)
    }

    fn apply_to(&self, mut cfg: ChunkConfig) -> ChunkConfig {
        cfg = cfg.with_chunk_token_size(self.tokens_target);
        if let Some(n) = self.min_boundary_chars { cfg = cfg.with_min_boundary_offset_chars(n); }
        if let Some(n) = self.min_chunk_chars { cfg = cfg.with_min_accept_length_chars(n); }
        if let Some(n) = self.max_chunks { cfg = cfg.with_max_chunk_count(n); }
        cfg
    }
}
