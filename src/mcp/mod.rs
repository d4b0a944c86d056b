#![cfg(feature = "mcp-server")]

pub mod server;
pub mod adapter;
pub mod types;
pub mod tools;

pub use cli::{run, McpCmd};

mod cli {
    use anyhow::Result;
    use clap::Parser;

    use crate::pipeline::LimitArgs;
    use crate::tokenizer::CodecArgs;

    #[derive(Debug, Parser, Default)]
    #[command(name = "mcp", about = "Serve chunking tools over MCP stdio (experimental)")]
    pub struct McpCmd {
        #[arg(long, help = "Maximum concurrent MCP tool calls (overrides MCP_MAX_CONCURRENCY)")]
        pub max_concurrency: Option<usize>,
        #[command(flatten)]
        pub limits: LimitArgs,
        #[command(flatten)]
        pub codec: CodecArgs,
    }

    pub async fn run(cmd: McpCmd) -> Result<()> {
        super::server::run_server(cmd).await
    }
}
