use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Serialize;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::chunker::{Chunk, ChunkConfig, Chunker};
use crate::pipeline::chunk::select::format_hint;
use crate::tokenizer::TokenCodec;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus { Chunked, Failed, Cancelled }

#[derive(Debug, Clone, Serialize)]
pub struct InputOutcome {
    pub path: PathBuf,
    pub format: String,
    pub status: OutcomeStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub chunks: Vec<Chunk>,
}

impl InputOutcome {
    fn cancelled(path: PathBuf) -> Self {
        let format = format_hint(&path);
        Self { path, format, status: OutcomeStatus::Cancelled, error: None, chunks: Vec::new() }
    }

    pub fn tokens(&self) -> usize { self.chunks.iter().map(|c| c.token_count).sum() }
}

// Read and chunk one file. Failures are recorded on the outcome, not raised.
pub fn chunk_file(codec: &dyn TokenCodec, config: ChunkConfig, path: &Path) -> InputOutcome {
    let format = format_hint(path);
    let res = std::fs::read_to_string(path)
        .with_context(|| format!("read {}", path.display()))
        .and_then(|text| Chunker::new(codec, config).chunk_records(&text, &format).map_err(anyhow::Error::from));

    match res {
        Ok(chunks) => InputOutcome { path: path.to_path_buf(), format, status: OutcomeStatus::Chunked, error: None, chunks },
        Err(e) => InputOutcome {
            path: path.to_path_buf(),
            format,
            status: OutcomeStatus::Failed,
            error: Some(format!("{:#}", e)),
            chunks: Vec::new(),
        },
    }
}

/// Chunk every input on the blocking pool with at most `max_concurrency`
/// files in flight. The token is checked before each input starts; inputs not
/// started by then come back as `Cancelled`. Outcomes keep input order.
pub async fn chunk_inputs(
    codec: Arc<dyn TokenCodec>,
    config: ChunkConfig,
    inputs: Vec<PathBuf>,
    max_concurrency: usize,
    ct: CancellationToken,
) -> Result<Vec<InputOutcome>> {
    let semaphore = Arc::new(Semaphore::new(max_concurrency.max(1)));
    let mut slots: Vec<Option<InputOutcome>> = vec![None; inputs.len()];
    let mut pending: Vec<(usize, PathBuf)> = Vec::new();
    let mut set = JoinSet::new();

    let mut queue = inputs.into_iter().enumerate();
    for (idx, path) in queue.by_ref() {
        let permit = tokio::select! {
            biased;
            _ = ct.cancelled() => { pending.push((idx, path)); break; }
            p = semaphore.clone().acquire_owned() => p.context("batch semaphore closed")?,
        };
        let codec = codec.clone();
        let ct = ct.clone();
        set.spawn_blocking(move || {
            let _permit = permit;
            let outcome = if ct.is_cancelled() {
                InputOutcome::cancelled(path)
            } else {
                chunk_file(codec.as_ref(), config, &path)
            };
            (idx, outcome)
        });
    }
    pending.extend(queue);

    while let Some(joined) = set.join_next().await {
        let (idx, outcome) = joined.context("chunk task panicked")?;
        slots[idx] = Some(outcome);
    }
    for (idx, path) in pending {
        slots[idx] = Some(InputOutcome::cancelled(path));
    }

    Ok(slots.into_iter().flatten().collect())
}
