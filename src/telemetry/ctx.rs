use std::marker::PhantomData;
use std::time::Instant;

use anyhow::Result;
use serde::Serialize;
use tracing::{info, debug, warn, Span};

use super::emit;
use crate::output::types::Meta;

pub trait PhaseSpan {
    fn name(&self) -> &'static str;
    fn span(&self) -> Span;
}

pub trait OpMarker {
    const NAME: &'static str;
    type Phase: PhaseSpan;
    fn root_span() -> Span;
}

pub struct LogCtx<O: OpMarker> {
    pub(crate) json: bool,
    pub(crate) _marker: PhantomData<O>,
}

impl<O: OpMarker> LogCtx<O> {
    fn op_name(&self) -> &'static str { O::NAME }

    pub fn root_span(&self) -> Span { O::root_span() }

    pub fn root_span_kv<'a, T>(&self, fields: T) -> Span
    where
        T: IntoIterator<Item = (&'a str, String)>,
    {
        let span = self.root_span();
        let details = kv_to_string(fields);
        if details.is_empty() {
            info!(op = %self.op_name(), "start");
        } else {
            info!(op = %self.op_name(), details = %details, "start");
        }
        span
    }

    pub fn span(&self, ph: &O::Phase) -> Span {
        debug!(op = %self.op_name(), phase = ph.name(), "phase");
        ph.span()
    }

    pub fn info(&self, msg: impl AsRef<str>) { if self.json { info!(op = %self.op_name(), "{}", msg.as_ref()); } else { info!("{}", msg.as_ref()); } }
    pub fn debug(&self, msg: impl AsRef<str>) { if self.json { debug!(op = %self.op_name(), "{}", msg.as_ref()); } else { debug!("{}", msg.as_ref()); } }
    pub fn warn(&self, msg: impl AsRef<str>) { if self.json { warn!(op = %self.op_name(), "{}", msg.as_ref()); } else { warn!("{}", msg.as_ref()); } }

    pub fn info_kv<'a, D>(&self, msg: &str, kv: D)
    where
        D: IntoIterator<Item = (&'a str, String)>,
    {
        if self.json { let details = kv_to_string(kv); info!(op = %self.op_name(), details = %details, "{}", msg); }
        else { info!("{}", msg); }
    }

    pub fn warn_kv<'a, D>(&self, msg: &str, kv: D)
    where
        D: IntoIterator<Item = (&'a str, String)>,
    {
        if self.json { let details = kv_to_string(kv); warn!(op = %self.op_name(), details = %details, "{}", msg); }
        else { warn!("{} ({})", msg, kv_to_string(kv)); }
    }

    pub fn plan<T: Serialize>(&self, plan: &T) -> Result<()> { emit::print_plan(self.op_name(), plan, None) }
    pub fn result<T: Serialize>(&self, result: &T) -> Result<()> { emit::print_result(self.op_name(), result, None) }

    /// Result envelope stamped with the elapsed time since `started`.
    pub fn result_timed<T: Serialize>(&self, result: &T, started: Instant) -> Result<()> {
        let meta = Meta { duration_ms: Some(started.elapsed().as_millis()), run_id: None };
        emit::print_result(self.op_name(), result, Some(meta))
    }
}

impl LogCtx<crate::telemetry::ops::chunk::Chunk> {
    pub fn source_summary(&self, source: &str, chunks: usize, tokens: usize, tail: bool) {
        if self.json { info!(op = %self.op_name(), source, chunks, tokens, tail, "source_summary"); }
        else { info!("✅ {} → {} chunk(s), {} token(s){}", source, chunks, tokens, if tail { " (cap reached, tail kept)" } else { "" }); }
    }
}

impl LogCtx<crate::telemetry::ops::batch::Batch> {
    pub fn totals(&self, inputs: usize, chunked: usize, failed: usize, cancelled: usize, chunks: usize) {
        if self.json { info!(op = %self.op_name(), inputs, chunked, failed, cancelled, chunks, "batch_totals"); }
        else { info!("📊 Batch totals — inputs={} chunked={} failed={} cancelled={} chunks={}", inputs, chunked, failed, cancelled, chunks); }
    }
}

fn kv_to_string<'a, T>(kv: T) -> String
where
    T: IntoIterator<Item = (&'a str, String)>,
{
    let parts: Vec<String> = kv.into_iter().map(|(k, v)| format!("{}={}", k, v)).collect();
    parts.join(" ")
}
