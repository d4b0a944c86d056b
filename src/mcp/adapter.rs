#![cfg(feature = "mcp-server")]

use std::sync::Mutex;

use anyhow::Result;
use serde_json::{json, Value};

use rmcp::model::{LoggingLevel, LoggingMessageNotificationParam};

use crate::output::types::Envelope;
use crate::telemetry::OutputSink;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage { Plan, Result }

impl Stage {
    fn label(self) -> &'static str {
        match self { Stage::Plan => "plan", Stage::Result => "result" }
    }
}

/// Envelope emitted while a tool call ran, replayed to the peer afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedEnvelope {
    pub stage: Stage,
    pub op: String,
    pub payload: Value,
}

impl CapturedEnvelope {
    fn from_envelope(stage: Stage, env: &Envelope) -> Self {
        let body = match stage { Stage::Plan => &env.plan, Stage::Result => &env.result };
        let mut payload = json!({
            "schema_version": env.schema_version,
            "request_id": env.request_id,
            "op": env.op,
            "message_kind": stage.label(),
        });
        payload[stage.label()] = body.clone().unwrap_or(Value::Null);
        if let Some(ms) = env.duration_ms() {
            payload["duration_ms"] = json!(ms);
        }
        Self { stage, op: env.op.clone(), payload }
    }

    pub fn into_logging_notification(self) -> LoggingMessageNotificationParam {
        let level = match self.stage { Stage::Plan => LoggingLevel::Info, Stage::Result => LoggingLevel::Notice };
        LoggingMessageNotificationParam {
            level,
            logger: Some(format!("rag_chunker::{}", self.op)),
            data: self.payload,
        }
    }
}

/// Collects the envelopes of a single tool call. The server creates one per
/// call and scopes it with `telemetry::with_scoped_sink`.
#[derive(Default, Debug)]
pub struct CallSink {
    captured: Mutex<Vec<CapturedEnvelope>>,
}

impl CallSink {
    pub fn new() -> Self { Self::default() }

    pub fn drain(&self) -> Vec<CapturedEnvelope> {
        let mut guard = self.captured.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        std::mem::take(&mut *guard)
    }

    fn push(&self, stage: Stage, env: &Envelope) {
        let mut guard = self.captured.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        guard.push(CapturedEnvelope::from_envelope(stage, env));
    }
}

impl OutputSink for CallSink {
    fn on_plan(&self, env: &Envelope) -> Result<()> {
        self.push(Stage::Plan, env);
        Ok(())
    }

    fn on_result(&self, env: &Envelope) -> Result<()> {
        self.push(Stage::Result, env);
        Ok(())
    }
}
