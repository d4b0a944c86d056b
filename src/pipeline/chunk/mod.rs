pub mod select;

use std::io::Write;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use crate::chunker::{Chunk, ChunkConfig, Chunker};
use crate::telemetry::{self};
use crate::telemetry::ops::chunk::Phase as ChunkPhase;
use crate::tokenizer::{CodecArgs, TokenCodec};

use super::LimitArgs;

#[derive(Args)]
pub struct ChunkCmd {
    /// File to chunk; stdin when omitted or "-"
    #[arg(long)] input: Option<PathBuf>,
    /// Format hint (e.g. "py"); defaults to the input's extension
    #[arg(long)] format: Option<String>,
    #[command(flatten)] limits: LimitArgs,
    #[command(flatten)] codec: CodecArgs,
}

#[derive(Debug, Serialize)]
pub struct ChunkResult {
    pub source: String,
    pub format: String,
    pub tokenizer: String,
    pub config: ChunkConfig,
    pub count: usize,
    pub tokens: usize,
    pub chunks: Vec<Chunk>,
}

pub async fn run(args: ChunkCmd) -> Result<()> {
    let started = Instant::now();
    let log = telemetry::chunk();
    let codec_args = args.codec.clone().with_env()?;
    let config = args.limits.resolve()?;
    let _g = log.root_span_kv([
        ("input", format!("{:?}", args.input)),
        ("format", format!("{:?}", args.format)),
        ("tokenizer", codec_args.describe()),
        ("tokens_target", config.chunk_token_size.to_string()),
        ("min_boundary_chars", config.min_boundary_offset_chars.to_string()),
        ("min_chunk_chars", config.min_accept_length_chars.to_string()),
        ("max_chunks", config.max_chunk_count.to_string()),
    ]).entered();

    let (source, text) = {
        let _s = log.span(&ChunkPhase::ReadInput).entered();
        select::read_input(args.input.as_deref())?
    };
    let format = args.format.clone()
        .unwrap_or_else(|| args.input.as_deref().map(select::format_hint).unwrap_or_default());

    let chunks = if text.trim().is_empty() {
        // nothing to tokenize, so skip loading the tokenizer altogether
        log.info(format!("ℹ️  {} is empty; nothing to chunk", source));
        Vec::new()
    } else {
        let codec = {
            let _s = log.span(&ChunkPhase::LoadTokenizer).entered();
            codec_args.load().context("init tokenizer")?
        };
        warn_if_over_context(&log, codec.as_ref(), &config);

        let _s = log.span(&ChunkPhase::Split).entered();
        Chunker::new(codec.as_ref(), config)
            .chunk_records(&text, &format)
            .with_context(|| format!("chunk {}", source))?
    };

    let tokens = chunks.iter().map(|c| c.token_count).sum();
    let tail = chunks.last().is_some_and(|c| c.tail);
    log.source_summary(&source, chunks.len(), tokens, tail);

    let _e = log.span(&ChunkPhase::Emit).entered();
    if telemetry::config::json_mode() {
        let res = ChunkResult {
            source,
            format,
            tokenizer: codec_args.describe(),
            config,
            count: chunks.len(),
            tokens,
            chunks,
        };
        log.result_timed(&res, started)?;
    } else {
        write_lines(&mut std::io::stdout().lock(), &chunks)?;
    }
    Ok(())
}

pub(crate) fn warn_if_over_context<O>(log: &telemetry::ctx::LogCtx<O>, codec: &dyn TokenCodec, config: &ChunkConfig)
where
    O: telemetry::ctx::OpMarker,
{
    if let Some(max) = codec.model_max_len() {
        if config.chunk_token_size > max {
            log.warn_kv(
                "⚠️  tokens_target exceeds the tokenizer's model_max_length; downstream embedding may truncate",
                [("tokens_target", config.chunk_token_size.to_string()), ("model_max_length", max.to_string())],
            );
        }
    }
}

// Normalized chunks never contain newlines, so one chunk per line is unambiguous.
fn write_lines(w: &mut dyn Write, chunks: &[Chunk]) -> Result<()> {
    for c in chunks {
        writeln!(w, "{}", c.text)?;
    }
    w.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::CharTokenizer;

    #[test]
    fn writes_one_chunk_per_line() {
        let config = ChunkConfig::default()
            .with_chunk_token_size(Some(20))
            .with_min_boundary_offset_chars(5)
            .with_min_accept_length_chars(1)
            .with_max_chunk_count(10);
        let chunks = Chunker::new(&CharTokenizer, config)
            .chunk_records("Hello world.\nThis is a test sentence.", "txt")
            .unwrap();
        let mut buf = Vec::new();
        write_lines(&mut buf, &chunks).unwrap();
        let out = String::from_utf8(buf).unwrap();
        assert_eq!(out.lines().count(), chunks.len());
        assert!(out.starts_with("Hello world.\n"));
    }

    #[test]
    fn result_serializes_config_and_chunks() {
        let res = ChunkResult {
            source: "a.txt".into(),
            format: "txt".into(),
            tokenizer: "chars".into(),
            config: ChunkConfig::default(),
            count: 1,
            tokens: 3,
            chunks: vec![Chunk { text: "abc".into(), token_count: 3, tail: false }],
        };
        let v = serde_json::to_value(&res).unwrap();
        assert_eq!(v["config"]["chunk_token_size"], 200);
        assert_eq!(v["chunks"][0]["text"], "abc");
        assert_eq!(v["chunks"][0]["tail"], false);
    }
}
