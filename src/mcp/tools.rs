#![cfg(feature = "mcp-server")]

use rmcp::model::{CallToolRequestParam, CallToolResult, Tool, ToolAnnotations};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Map, Value};
use tokio_util::sync::CancellationToken;

use crate::chunker::{Chunk, ChunkConfig, ChunkError, Chunker};
use crate::mcp::server::ToolState;
use crate::mcp::types::{ChunkTextParams, TokenCountParams};

const CHUNK_TEXT_TOOL: &str = "chunk.text";
const TOKENS_COUNT_TOOL: &str = "tokens.count";

pub fn tool_catalog() -> Vec<Tool> {
    vec![chunk_text_tool(), tokens_count_tool()]
}

fn chunk_text_tool() -> Tool {
    Tool::new(
        CHUNK_TEXT_TOOL,
        "Split text into token-budgeted chunks cut at sentence or line breaks",
        rmcp::object!({"type": "object"}),
    )
    .with_input_schema::<ChunkTextParams>()
    .annotate(ToolAnnotations::new().read_only(true).idempotent(true).open_world(false))
}

fn tokens_count_tool() -> Tool {
    Tool::new(
        TOKENS_COUNT_TOOL,
        "Count the tokens the configured tokenizer produces for a text",
        rmcp::object!({"type": "object"}),
    )
    .with_input_schema::<TokenCountParams>()
    .annotate(ToolAnnotations::new().read_only(true).idempotent(true).open_world(false))
}

pub async fn handle_call(
    state: &ToolState,
    ct: &CancellationToken,
    request: CallToolRequestParam,
) -> Result<CallToolResult, rmcp::ErrorData> {
    let CallToolRequestParam { name, arguments } = request;
    match name.as_ref() {
        CHUNK_TEXT_TOOL => chunk_text(state, ct, arguments).await,
        TOKENS_COUNT_TOOL => tokens_count(state, ct, arguments).await,
        _ => Err(rmcp::ErrorData::invalid_params(
            format!("unknown tool: {}", name),
            None,
        )),
    }
}

fn parse_params<T: DeserializeOwned>(tool: &str, arguments: Option<rmcp::model::JsonObject>) -> Result<T, rmcp::ErrorData> {
    let args_map = arguments.unwrap_or_else(Map::new);
    serde_json::from_value(Value::Object(args_map)).map_err(|err| {
        rmcp::ErrorData::invalid_params(
            format!("invalid {} parameters: {}", tool, err),
            None,
        )
    })
}

#[derive(Debug, Serialize)]
struct ChunkTextResult {
    format: String,
    config: ChunkConfig,
    count: usize,
    tokens: usize,
    chunks: Vec<Chunk>,
}

async fn chunk_text(
    state: &ToolState,
    ct: &CancellationToken,
    arguments: Option<rmcp::model::JsonObject>,
) -> Result<CallToolResult, rmcp::ErrorData> {
    let params: ChunkTextParams = parse_params(CHUNK_TEXT_TOOL, arguments)?;
    let config = state.config.with_chunk_token_size(params.chunk_token_size);
    let format = params.format.unwrap_or_default();

    let codec = state.codec.clone();
    let task_format = format.clone();
    let task = tokio::task::spawn_blocking(move || {
        Chunker::new(codec.as_ref(), config).chunk_records(&params.text, &task_format)
    });

    let chunks = tokio::select! {
        _ = ct.cancelled() => {
            return Err(rmcp::ErrorData::internal_error("chunk.text cancelled", None));
        }
        joined = task => {
            let res = joined.map_err(|err| rmcp::ErrorData::internal_error(
                "chunk task failed",
                Some(json!({ "reason": err.to_string() })),
            ))?;
            res.map_err(chunk_error)?
        }
    };

    let result = ChunkTextResult {
        format,
        config,
        count: chunks.len(),
        tokens: chunks.iter().map(|c| c.token_count).sum(),
        chunks,
    };
    if let Err(err) = crate::telemetry::chunk().result(&result) {
        tracing::warn!(target = "rag_chunker::mcp", error = %err, "failed to emit chunk result telemetry");
    }

    let response = json!({
        "op": CHUNK_TEXT_TOOL,
        "count": result.count,
        "chunks": result.chunks.iter().map(|c| c.text.as_str()).collect::<Vec<_>>(),
        "config": result.config,
    });

    Ok(CallToolResult::structured(response))
}

async fn tokens_count(
    state: &ToolState,
    ct: &CancellationToken,
    arguments: Option<rmcp::model::JsonObject>,
) -> Result<CallToolResult, rmcp::ErrorData> {
    let params: TokenCountParams = parse_params(TOKENS_COUNT_TOOL, arguments)?;
    let codec = state.codec.clone();
    let task = tokio::task::spawn_blocking(move || codec.count(&params.text));

    let tokens = tokio::select! {
        _ = ct.cancelled() => {
            return Err(rmcp::ErrorData::internal_error("tokens.count cancelled", None));
        }
        joined = task => {
            let res = joined.map_err(|err| rmcp::ErrorData::internal_error(
                "count task failed",
                Some(json!({ "reason": err.to_string() })),
            ))?;
            res.map_err(|err| rmcp::ErrorData::internal_error(
                "tokenization failed",
                Some(json!({ "reason": format!("{:#}", err) })),
            ))?
        }
    };

    Ok(CallToolResult::structured(json!({ "op": TOKENS_COUNT_TOOL, "tokens": tokens })))
}

fn chunk_error(err: ChunkError) -> rmcp::ErrorData {
    match err {
        ChunkError::InvalidConfiguration(msg) => rmcp::ErrorData::invalid_params(
            format!("invalid configuration: {}", msg),
            None,
        ),
        other => rmcp::ErrorData::internal_error(
            "chunking failed",
            Some(json!({ "reason": other.to_string() })),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use crate::tokenizer::CharTokenizer;

    fn state() -> ToolState {
        let config = ChunkConfig::default()
            .with_chunk_token_size(Some(20))
            .with_min_boundary_offset_chars(5)
            .with_min_accept_length_chars(1)
            .with_max_chunk_count(10);
        ToolState { codec: Arc::new(CharTokenizer), config }
    }

    fn args(v: Value) -> Option<rmcp::model::JsonObject> {
        match v { Value::Object(m) => Some(m), _ => None }
    }

    #[test]
    fn catalog_lists_both_tools() {
        let names: Vec<String> = tool_catalog().iter().map(|t| t.name.to_string()).collect();
        assert_eq!(names, vec![CHUNK_TEXT_TOOL, TOKENS_COUNT_TOOL]);
    }

    #[tokio::test]
    async fn chunk_text_returns_chunks() {
        let res = chunk_text(&state(), &CancellationToken::new(), args(json!({"text": "Hello world.\nThis is a test sentence."})))
            .await
            .unwrap();
        let v = res.structured_content.unwrap();
        assert_eq!(v["op"], CHUNK_TEXT_TOOL);
        assert_eq!(v["chunks"][0], "Hello world.");
        assert_eq!(v["count"], v["chunks"].as_array().unwrap().len());
        assert_eq!(v["config"]["chunk_token_size"], 20);
    }

    #[tokio::test]
    async fn zero_chunk_size_is_invalid_params() {
        let err = chunk_text(&state(), &CancellationToken::new(), args(json!({"text": "abc", "chunkTokenSize": 0})))
            .await
            .unwrap_err();
        assert!(err.message.contains("invalid configuration"));
    }

    #[tokio::test]
    async fn tokens_count_uses_codec() {
        let res = tokens_count(&state(), &CancellationToken::new(), args(json!({"text": "héllo"})))
            .await
            .unwrap();
        assert_eq!(res.structured_content.unwrap()["tokens"], 5);
    }

    #[tokio::test]
    async fn missing_text_is_rejected() {
        assert!(tokens_count(&state(), &CancellationToken::new(), args(json!({}))).await.is_err());
    }
}
