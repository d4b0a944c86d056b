pub mod logic;
pub mod select;

use std::io::Write;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::Args;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::chunker::ChunkConfig;
use crate::telemetry::{self};
use crate::telemetry::ops::batch::Phase as BatchPhase;
use crate::tokenizer::CodecArgs;

use super::chunk::warn_if_over_context;
use super::LimitArgs;
pub use logic::{chunk_inputs, chunk_file, InputOutcome, OutcomeStatus};

pub const ENV_MAX_CONCURRENCY: &str = "RAG_MAX_CONCURRENCY";

#[derive(Args)]
pub struct BatchCmd {
    /// Files or directories (walked recursively) to chunk
    #[arg(required = true)] paths: Vec<PathBuf>,
    /// Only pick up files with these extensions inside directories (repeatable)
    #[arg(long = "ext")] exts: Vec<String>,
    #[command(flatten)] limits: LimitArgs,
    #[command(flatten)] codec: CodecArgs,
    /// Files chunked in parallel (RAG_MAX_CONCURRENCY, default: available cores)
    #[arg(long)] max_concurrency: Option<usize>,
    #[arg(long, default_value_t = false)] apply: bool,
    #[arg(long, default_value_t = 10)] plan_limit: usize,
    /// In text mode, print every chunk as `path:index<TAB>chunk`
    #[arg(long, default_value_t = false)] print: bool,
}

#[derive(Debug, Serialize)]
struct BatchPlan {
    inputs: usize,
    tokenizer: String,
    config: ChunkConfig,
    max_concurrency: usize,
    sample_inputs: Vec<PathBuf>,
}

#[derive(Debug, Serialize)]
struct BatchResult {
    tokenizer: String,
    config: ChunkConfig,
    inputs: usize,
    chunked: usize,
    failed: usize,
    cancelled: usize,
    chunks: usize,
    outcomes: Vec<InputOutcome>,
}

pub async fn run(args: BatchCmd) -> Result<()> {
    let started = Instant::now();
    let log = telemetry::batch();
    let codec_args = args.codec.clone().with_env()?;
    let config = args.limits.resolve()?;
    let max_concurrency = resolve_concurrency(args.max_concurrency, std::env::var(ENV_MAX_CONCURRENCY).ok().as_deref())?;
    let _g = log.root_span_kv([
        ("paths", format!("{:?}", args.paths)),
        ("exts", format!("{:?}", args.exts)),
        ("tokenizer", codec_args.describe()),
        ("tokens_target", config.chunk_token_size.to_string()),
        ("max_chunks", config.max_chunk_count.to_string()),
        ("max_concurrency", max_concurrency.to_string()),
        ("apply", args.apply.to_string()),
        ("plan_limit", args.plan_limit.to_string()),
    ]).entered();

    let inputs = {
        let _s = log.span(&BatchPhase::CollectInputs).entered();
        select::collect_inputs(&args.paths, &args.exts)?
    };

    // Plan-only
    if !args.apply {
        let _sp = log.span(&BatchPhase::Plan).entered();
        let sample: Vec<PathBuf> = inputs.iter().take(args.plan_limit).cloned().collect();
        if telemetry::config::json_mode() {
            let plan = BatchPlan {
                inputs: inputs.len(),
                tokenizer: codec_args.describe(),
                config,
                max_concurrency,
                sample_inputs: sample,
            };
            log.plan(&plan)?;
        } else {
            log.info(format!(
                "📝 Batch plan — inputs={} tokenizer={} tokens_target={} max_concurrency={}",
                inputs.len(), codec_args.describe(), config.chunk_token_size, max_concurrency
            ));
            for p in &sample { log.info(format!("  {}", p.display())); }
            if args.plan_limit < inputs.len() { log.info("  ... (more inputs)"); }
            log.info("   Use --apply to chunk.");
        }
        return Ok(());
    }

    if inputs.is_empty() {
        log.info("ℹ️  No inputs matched; nothing to chunk");
    }

    let codec = {
        let _s = log.span(&BatchPhase::LoadTokenizer).entered();
        codec_args.load().context("init tokenizer")?
    };
    warn_if_over_context(&log, codec.as_ref(), &config);

    let ct = CancellationToken::new();
    let watcher = {
        let ct = ct.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                ct.cancel();
            }
        })
    };

    let outcomes = {
        let _s = log.span(&BatchPhase::Split).entered();
        chunk_inputs(codec, config, inputs, max_concurrency, ct.clone()).await
    };
    watcher.abort();
    let outcomes = outcomes?;
    if ct.is_cancelled() {
        log.warn("⚠️  Interrupted; inputs not yet started were skipped");
    }

    let mut chunked = 0usize;
    let mut failed = 0usize;
    let mut cancelled = 0usize;
    for o in &outcomes {
        match o.status {
            OutcomeStatus::Chunked => {
                chunked += 1;
                log.info_kv(
                    &format!("✅ {} → {} chunk(s)", o.path.display(), o.chunks.len()),
                    [("path", o.path.display().to_string()), ("chunks", o.chunks.len().to_string()), ("tokens", o.tokens().to_string())],
                );
            }
            OutcomeStatus::Failed => {
                failed += 1;
                log.warn_kv(
                    &format!("❌ {} failed", o.path.display()),
                    [("path", o.path.display().to_string()), ("error", o.error.clone().unwrap_or_default())],
                );
            }
            OutcomeStatus::Cancelled => cancelled += 1,
        }
    }
    let total_chunks: usize = outcomes.iter().map(|o| o.chunks.len()).sum();
    log.totals(outcomes.len(), chunked, failed, cancelled, total_chunks);

    let _e = log.span(&BatchPhase::Emit).entered();
    if telemetry::config::json_mode() {
        let res = BatchResult {
            tokenizer: codec_args.describe(),
            config,
            inputs: outcomes.len(),
            chunked,
            failed,
            cancelled,
            chunks: total_chunks,
            outcomes,
        };
        log.result_timed(&res, started)?;
    } else if args.print {
        write_tagged(&mut std::io::stdout().lock(), &outcomes)?;
    }
    Ok(())
}

fn resolve_concurrency(arg: Option<usize>, env: Option<&str>) -> Result<usize> {
    let n = match (arg, env) {
        (Some(n), _) => n,
        (None, Some(raw)) => match raw.trim().parse::<usize>() {
            Ok(n) => n,
            Err(_) => bail!("{} must be a positive integer, got {:?}", ENV_MAX_CONCURRENCY, raw),
        },
        (None, None) => std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1),
    };
    Ok(n.max(1))
}

fn write_tagged(w: &mut dyn Write, outcomes: &[InputOutcome]) -> Result<()> {
    for o in outcomes {
        for (i, c) in o.chunks.iter().enumerate() {
            writeln!(w, "{}:{}\t{}", o.path.display(), i, c.text)?;
        }
    }
    w.flush()?;
    Ok(())
}
