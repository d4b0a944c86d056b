use std::io::{self, Write};
use serde::Serialize;
use serde_json::{json, Value};

use super::config::{OutputConfig, OutputFormat};
use super::types::Envelope;

pub trait Presenter: Send + Sync {
    fn emit(&self, env: &Envelope, w: &mut dyn Write) -> io::Result<()>;
}

fn write_json<T: Serialize>(w: &mut dyn Write, value: &T, pretty: bool) -> io::Result<()> {
    if pretty { serde_json::to_writer_pretty(&mut *w, value).map_err(to_io)? } else { serde_json::to_writer(&mut *w, value).map_err(to_io)? }
    writeln!(w)
}

pub struct JsonPresenter { pub pretty: bool }
impl Presenter for JsonPresenter {
    fn emit(&self, env: &Envelope, w: &mut dyn Write) -> io::Result<()> {
        write_json(w, env, self.pretty)
    }
}

/// Short human summary; the full payload only with `RAG_OUTPUT_PRETTY`.
pub struct TextPresenter { pub pretty: bool }
impl Presenter for TextPresenter {
    fn emit(&self, env: &Envelope, w: &mut dyn Write) -> io::Result<()> {
        let (label, body) = if env.apply { ("Result", &env.result) } else { ("Plan", &env.plan) };
        match body.as_ref().and_then(|b| b.get("count")).and_then(Value::as_u64) {
            Some(n) => writeln!(w, "{}: {} ({} chunk(s))", label, env.op, n)?,
            None => writeln!(w, "{}: {}", label, env.op)?,
        }
        if self.pretty {
            if let Some(b) = body { write_json(w, b, true)?; }
        }
        Ok(())
    }
}

pub struct McpPresenter { pub pretty: bool }
impl Presenter for McpPresenter {
    fn emit(&self, env: &Envelope, w: &mut dyn Write) -> io::Result<()> {
        let (method, key, body) = if env.apply {
            ("notifications/result", "result", &env.result)
        } else {
            ("notifications/plan", "plan", &env.plan)
        };
        let mut params = json!({
            "schema_version": env.schema_version,
            "request_id": env.request_id,
            "op": env.op,
        });
        params[key] = body.clone().unwrap_or(Value::Null);
        let payload = json!({ "jsonrpc": "2.0", "method": method, "params": params });
        write_json(w, &payload, self.pretty)
    }
}

pub struct Emitter {
    presenter: Box<dyn Presenter>,
}

impl Emitter {
    pub fn from_env(cfg: OutputConfig) -> Self {
        let presenter: Box<dyn Presenter> = match cfg.format {
            OutputFormat::Json => Box::new(JsonPresenter { pretty: cfg.pretty }),
            OutputFormat::Mcp => Box::new(McpPresenter { pretty: cfg.pretty }),
            OutputFormat::Text => Box::new(TextPresenter { pretty: cfg.pretty }),
        };
        Emitter { presenter }
    }

    pub fn emit(&self, env: &Envelope) -> io::Result<()> {
        let mut out = io::stdout().lock();
        self.presenter.emit(env, &mut out)?;
        out.flush()
    }
}

fn to_io(e: serde_json::Error) -> io::Error { io::Error::new(io::ErrorKind::Other, e) }
