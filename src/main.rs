use anyhow::Result;
use clap::{Parser, Subcommand};
use dotenvy::dotenv;

use rag_chunker::{pipeline, telemetry};

#[derive(Parser)]
#[command(name = "rag-chunk", about = "Token-budgeted text chunker")]
struct Cli {
    /// Emit a single JSON envelope to stdout; logs go to stderr
    #[arg(global = true, long, default_value_t = false)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Chunk one file or stdin
    Chunk(pipeline::chunk::ChunkCmd),
    /// Chunk many files concurrently (plan-only unless --apply)
    Batch(pipeline::batch::BatchCmd),
    #[cfg(feature = "mcp-server")]
    Mcp(rag_chunker::mcp::McpCmd),
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let cli = Cli::parse();
    telemetry::config::set_json_mode(cli.json);

    // initialize logging/tracing (stderr). Respect RUST_LOG and RAG_LOG_FORMAT
    telemetry::config::init_tracing();

    match cli.command {
        Commands::Chunk(args) => pipeline::chunk::run(args).await?,
        Commands::Batch(args) => pipeline::batch::run(args).await?,
        #[cfg(feature = "mcp-server")]
        Commands::Mcp(args) => rag_chunker::mcp::run(args).await?,
    }

    Ok(())
}
