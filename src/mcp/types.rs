#![cfg(feature = "mcp-server")]

use serde::{Deserialize, Serialize};
use schemars::JsonSchema;

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChunkTextParams {
    pub text: String,
    /// Target tokens per chunk; the server's configured size when omitted
    #[serde(default)]
    pub chunk_token_size: Option<usize>,
    /// Format hint such as a file extension; does not change splitting
    #[serde(default)]
    pub format: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TokenCountParams {
    pub text: String,
}
