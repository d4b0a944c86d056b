//! Token-budgeted text chunking for retrieval pipelines.
//!
//! The core lives in [`chunker`]; [`tokenizer`] provides the codecs it runs
//! on. The remaining modules back the `rag-chunk` binary.

pub mod chunker;
#[cfg(feature = "mcp-server")]
pub mod mcp;
pub mod output;
pub mod pipeline;
pub mod telemetry;
pub mod tokenizer;

pub use chunker::{chunk, Chunk, ChunkConfig, ChunkError, Chunker, Chunks};
pub use tokenizer::{CharTokenizer, Cl100kTokenizer, HfTokenizer, TokenCodec};
