use thiserror::Error;

/// Failures surfaced by the chunker. Codec errors pass through untouched.
#[derive(Debug, Error)]
pub enum ChunkError {
    #[error("invalid chunk configuration: {0}")]
    InvalidConfiguration(String),

    #[error(transparent)]
    Tokenization(#[from] anyhow::Error),

    // re-encoding a non-blank window produced zero tokens
    #[error("chunker made no progress at token {cursor} ({remaining} remaining, window of {window} tokens)")]
    ProgressStalled {
        cursor: usize,
        remaining: usize,
        window: usize,
    },
}

impl ChunkError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        ChunkError::InvalidConfiguration(msg.into())
    }
}
