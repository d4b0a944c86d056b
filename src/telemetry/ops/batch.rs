use tracing::Span;
use tracing::info_span;

use crate::telemetry::ctx::{OpMarker, PhaseSpan};

#[derive(Copy, Clone, Debug)]
pub struct Batch;

#[derive(Copy, Clone, Debug)]
pub enum Phase { CollectInputs, Plan, LoadTokenizer, Split, Emit }

impl PhaseSpan for Phase {
    fn name(&self) -> &'static str { match self {
        Phase::CollectInputs => "collect_inputs",
        Phase::Plan => "plan",
        Phase::LoadTokenizer => "load_tokenizer",
        Phase::Split => "split",
        Phase::Emit => "emit",
    }}
    fn span(&self) -> Span { match self {
        Phase::CollectInputs => info_span!("collect_inputs"),
        Phase::Plan => info_span!("plan"),
        Phase::LoadTokenizer => info_span!("load_tokenizer"),
        Phase::Split => info_span!("split"),
        Phase::Emit => info_span!("emit"),
    }}
}

impl OpMarker for Batch {
    const NAME: &'static str = "batch";
    type Phase = Phase;
    fn root_span() -> Span { info_span!("batch") }
}
