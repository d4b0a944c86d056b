use std::future::Future;
use std::sync::Arc;

use anyhow::Result;

use crate::output::config::OutputConfig;
use crate::output::Emitter;
use crate::output::types::Envelope;

pub trait OutputSink: Send + Sync {
    fn on_plan(&self, env: &Envelope) -> Result<()>;
    fn on_result(&self, env: &Envelope) -> Result<()>;
}

#[derive(Default)]
pub struct StdoutSink;

impl OutputSink for StdoutSink {
    fn on_plan(&self, env: &Envelope) -> Result<()> { emit_to_stdout(env) }
    fn on_result(&self, env: &Envelope) -> Result<()> { emit_to_stdout(env) }
}

fn emit_to_stdout(env: &Envelope) -> Result<()> {
    let emitter = Emitter::from_env(OutputConfig::from_env());
    emitter.emit(env).map_err(anyhow::Error::from)
}

type DynSink = Arc<dyn OutputSink>;

tokio::task_local! {
    static SCOPED_SINK: DynSink;
}

/// Run `fut` with the envelopes it emits routed to `sink` instead of stdout.
/// Scopes are per task, so concurrent scopes never see each other's envelopes.
pub async fn with_scoped_sink<F: Future>(sink: DynSink, fut: F) -> F::Output {
    SCOPED_SINK.scope(sink, fut).await
}

/// The sink of the enclosing scope, else stdout.
pub fn current_sink() -> DynSink {
    SCOPED_SINK
        .try_with(|s| s.clone())
        .unwrap_or_else(|_| Arc::new(StdoutSink))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Capture {
        ops: Mutex<Vec<(bool, String)>>,
    }

    impl Capture {
        fn ops(&self) -> Vec<(bool, String)> { self.ops.lock().unwrap().clone() }
    }

    impl OutputSink for Capture {
        fn on_plan(&self, env: &Envelope) -> Result<()> {
            self.ops.lock().unwrap().push((false, env.op.clone()));
            Ok(())
        }
        fn on_result(&self, env: &Envelope) -> Result<()> {
            self.ops.lock().unwrap().push((true, env.op.clone()));
            Ok(())
        }
    }

    #[tokio::test]
    async fn scoped_sink_receives_envelopes_only_inside_scope() {
        let capture = Arc::new(Capture::default());
        with_scoped_sink(capture.clone(), async {
            crate::telemetry::emit::print_plan("sink-test", &json!({"inputs": 2}), None).unwrap();
            crate::telemetry::emit::print_result("sink-test", &json!({"chunks": 5}), None).unwrap();
        })
        .await;
        assert_eq!(capture.ops(), vec![(false, "sink-test".to_string()), (true, "sink-test".to_string())]);
        assert!(!Arc::ptr_eq(&current_sink(), &(capture as DynSink)));
    }

    #[tokio::test]
    async fn concurrent_scopes_stay_separate() {
        let a = Arc::new(Capture::default());
        let b = Arc::new(Capture::default());
        let emit = |op: &'static str| async move {
            for _ in 0..3 {
                crate::telemetry::emit::print_result(op, &json!({}), None).unwrap();
                tokio::task::yield_now().await;
            }
        };
        tokio::join!(
            with_scoped_sink(a.clone(), emit("scope-a")),
            with_scoped_sink(b.clone(), emit("scope-b")),
        );
        let ops = |c: &Capture| c.ops().into_iter().map(|(_, op)| op).collect::<Vec<_>>();
        assert_eq!(ops(&a), vec!["scope-a"; 3]);
        assert_eq!(ops(&b), vec!["scope-b"; 3]);
    }
}
