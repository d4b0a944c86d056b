pub mod chars;
pub mod hf;
pub mod tiktoken;

pub use chars::CharTokenizer;
pub use hf::HfTokenizer;
pub use tiktoken::Cl100kTokenizer;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use serde::Serialize;

/// Text <-> token id codec shared across chunking calls.
///
/// Implementations must be deterministic and safe to call from many threads
/// at once; nothing per-call may leak between invocations.
pub trait TokenCodec: Send + Sync {
    fn encode(&self, text: &str) -> Result<Vec<u32>>;
    fn decode(&self, ids: &[u32]) -> Result<String>;

    fn count(&self, text: &str) -> Result<usize> {
        Ok(self.encode(text)?.len())
    }

    /// Context length advertised by the underlying model, if any.
    fn model_max_len(&self) -> Option<usize> { None }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, clap::ValueEnum)]
pub enum CodecKind {
    #[value(name = "cl100k")] Cl100k,
    #[value(name = "hf")] Hf,
    #[value(name = "chars")] Chars,
}

impl CodecKind {
    pub fn parse(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cl100k" | "cl100k_base" => Ok(CodecKind::Cl100k),
            "hf" | "huggingface" => Ok(CodecKind::Hf),
            "chars" | "char" => Ok(CodecKind::Chars),
            other => Err(anyhow!("unknown tokenizer kind {other:?} (expected cl100k, hf or chars)")),
        }
    }
}

/// Tokenizer selection. Unset flags fall back to `RAG_TOKENIZER`,
/// `RAG_TOKENIZER_MODEL` and `RAG_TOKENIZER_FILE`.
#[derive(clap::Args, Clone, Debug, Default)]
pub struct CodecArgs {
    /// Tokenizer backend (default: cl100k)
    #[arg(long, value_enum)]
    pub tokenizer: Option<CodecKind>,
    /// Hugging Face Hub model id whose tokenizer.json is used (hf backend)
    #[arg(long)]
    pub tokenizer_model: Option<String>,
    /// Local tokenizer.json (hf backend); takes precedence over --tokenizer-model
    #[arg(long)]
    pub tokenizer_file: Option<PathBuf>,
}

impl CodecArgs {
    pub fn with_env(mut self) -> Result<Self> {
        if self.tokenizer.is_none() {
            if let Ok(v) = std::env::var("RAG_TOKENIZER") {
                self.tokenizer = Some(CodecKind::parse(&v).context("RAG_TOKENIZER")?);
            }
        }
        if self.tokenizer_model.is_none() {
            self.tokenizer_model = std::env::var("RAG_TOKENIZER_MODEL").ok().filter(|s| !s.is_empty());
        }
        if self.tokenizer_file.is_none() {
            self.tokenizer_file = std::env::var("RAG_TOKENIZER_FILE").ok().filter(|s| !s.is_empty()).map(PathBuf::from);
        }
        Ok(self)
    }

    pub fn kind(&self) -> CodecKind { self.tokenizer.unwrap_or(CodecKind::Cl100k) }

    // human-readable label for logs and result envelopes
    pub fn describe(&self) -> String {
        match self.kind() {
            CodecKind::Cl100k => tiktoken::ENCODING.to_string(),
            CodecKind::Chars => "chars".to_string(),
            CodecKind::Hf => match (&self.tokenizer_file, &self.tokenizer_model) {
                (Some(p), _) => format!("hf:{}", p.display()),
                (None, Some(m)) => format!("hf:{m}"),
                (None, None) => format!("hf:{}", hf::DEFAULT_MODEL),
            },
        }
    }

    /// Build the codec once; callers share it behind the returned `Arc`.
    pub fn load(&self) -> Result<Arc<dyn TokenCodec>> {
        let codec: Arc<dyn TokenCodec> = match self.kind() {
            CodecKind::Cl100k => Arc::new(Cl100kTokenizer::new()?),
            CodecKind::Chars => Arc::new(CharTokenizer),
            CodecKind::Hf => {
                let tok = match (&self.tokenizer_file, &self.tokenizer_model) {
                    (Some(path), _) => HfTokenizer::from_file(path)?,
                    (None, model) => HfTokenizer::from_pretrained(model.as_deref().unwrap_or(hf::DEFAULT_MODEL))?,
                };
                Arc::new(tok)
            }
        };
        Ok(codec)
    }
}
