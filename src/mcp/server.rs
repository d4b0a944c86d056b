#![cfg(feature = "mcp-server")]

use std::sync::Arc;

use anyhow::{Context, Result};
use serde_json::json;
use rmcp::{
    ErrorData as McpError,
    ServiceExt,
    handler::server::ServerHandler,
    model::{
        CallToolRequestParam,
        CallToolResult,
        Implementation,
        ListToolsResult,
        PaginatedRequestParam,
        ProtocolVersion,
        ServerCapabilities,
        ServerInfo,
    },
    service::{QuitReason, RequestContext, RoleServer},
};
use tokio::io::{stdin, stdout};
use tokio::sync::Semaphore;

use crate::chunker::ChunkConfig;
use crate::mcp::adapter::{CallSink, CapturedEnvelope};
use crate::mcp::tools;
use crate::telemetry::with_scoped_sink;
use crate::tokenizer::TokenCodec;

use super::McpCmd;

const ENV_MCP_MAX_CONCURRENCY: &str = "MCP_MAX_CONCURRENCY";

/// Codec and limits shared by every tool call.
#[derive(Clone)]
pub struct ToolState {
    pub codec: Arc<dyn TokenCodec>,
    pub config: ChunkConfig,
}

#[derive(Clone)]
struct RagChunkServer {
    state: ToolState,
    info: ServerInfo,
    semaphore: Arc<Semaphore>,
}

impl RagChunkServer {
    fn new(state: ToolState, semaphore: Arc<Semaphore>) -> Self {
        let capabilities = ServerCapabilities::builder().enable_tools().build();
        let info = ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities,
            server_info: Implementation {
                name: "rag-chunk".to_string(),
                title: Some("rag-chunk MCP server".to_string()),
                version: env!("CARGO_PKG_VERSION").to_string(),
                icons: None,
                website_url: None,
            },
            instructions: Some(format!(
                "Splits text into chunks of at most {} tokens. Tools are read-only.",
                state.config.chunk_token_size
            )),
        };

        Self { state, info, semaphore }
    }
}

impl ServerHandler for RagChunkServer {
    fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> impl std::future::Future<Output = Result<ListToolsResult, McpError>> + Send + '_ {
        async move { Ok(ListToolsResult::with_all_items(tools::tool_catalog())) }
    }

    fn get_info(&self) -> ServerInfo { self.info.clone() }

    fn call_tool(
        &self,
        request: CallToolRequestParam,
        context: RequestContext<RoleServer>,
    ) -> impl std::future::Future<Output = Result<CallToolResult, McpError>> + Send + '_ {
        let state = self.state.clone();
        let ct = context.ct.clone();
        let peer = context.peer.clone();
        let permits = self.semaphore.clone();
        async move {
            let permit = permits
                .acquire_owned()
                .await
                .map_err(|err| rmcp::ErrorData::internal_error(
                    "failed to acquire concurrency permit",
                    Some(json!({ "reason": err.to_string() })),
                ))?;
            let (result, captured) = capture_call(&state, &ct, request).await;
            for message in captured {
                let param = message.into_logging_notification();
                if let Err(err) = peer.notify_logging_message(param).await {
                    tracing::warn!(target = "rag_chunker::mcp", error = %err, "failed to send logging notification");
                }
            }
            drop(permit);
            result
        }
    }
}

// Envelopes emitted by one call land in that call's own sink, so concurrent
// calls never forward each other's notifications. Stdout stays protocol-only.
pub(crate) async fn capture_call(
    state: &ToolState,
    ct: &tokio_util::sync::CancellationToken,
    request: CallToolRequestParam,
) -> (Result<CallToolResult, McpError>, Vec<CapturedEnvelope>) {
    let sink = Arc::new(CallSink::new());
    let result = with_scoped_sink(sink.clone(), tools::handle_call(state, ct, request)).await;
    (result, sink.drain())
}

fn resolve_concurrency(arg: Option<usize>, env: Option<&str>) -> usize {
    arg.or_else(|| env.and_then(|s| s.trim().parse().ok()))
        .unwrap_or(2)
        .max(1)
}

pub async fn run_server(cmd: McpCmd) -> Result<()> {
    let config = cmd.limits.resolve()?;
    let codec_args = cmd.codec.clone().with_env()?;
    let codec = codec_args.load().context("init tokenizer")?;
    if let Some(max) = codec.model_max_len() {
        if config.chunk_token_size > max {
            tracing::warn!(
                target = "rag_chunker::mcp",
                tokens_target = config.chunk_token_size,
                model_max_length = max,
                "tokens_target exceeds the tokenizer's model_max_length"
            );
        }
    }

    let max_concurrency = resolve_concurrency(
        cmd.max_concurrency,
        std::env::var(ENV_MCP_MAX_CONCURRENCY).ok().as_deref(),
    );
    let semaphore = Arc::new(Semaphore::new(max_concurrency));
    let server = RagChunkServer::new(ToolState { codec, config }, semaphore);

    tracing::info!(
        target = "rag_chunker::mcp",
        tokenizer = %codec_args.describe(),
        max_concurrency,
        "Starting rmcp server over stdio"
    );
    let transport = (stdin(), stdout());
    let running = server
        .serve(transport)
        .await
        .context("failed to initialize MCP server")?;

    match running.waiting().await {
        Ok(QuitReason::Closed) => {
            tracing::info!(target = "rag_chunker::mcp", "MCP transport closed by peer");
            Ok(())
        }
        Ok(QuitReason::Cancelled) => {
            tracing::info!(target = "rag_chunker::mcp", "MCP server cancelled by request");
            Ok(())
        }
        Ok(QuitReason::JoinError(err)) => {
            tracing::error!(target = "rag_chunker::mcp", error = %err, "MCP server task aborted");
            Err(err.into())
        }
        Err(err) => {
            tracing::error!(target = "rag_chunker::mcp", error = %err, "MCP server join failure");
            Err(err.into())
        }
    }
}
