use std::path::Path;

use anyhow::{anyhow, Context, Result};
use hf_hub::api::sync::Api;
use tokenizers::Tokenizer;

use super::TokenCodec;

// byte-level BPE; decode(encode(text)) == text
pub const DEFAULT_MODEL: &str = "gpt2";

// some configs advertise 1e30 as "unbounded"
const MAX_SANE_CONTEXT: u64 = 1 << 24;

/// `tokenizers` pipeline used as a plain codec: no truncation, no padding,
/// no special tokens added on encode and none skipped on decode.
#[derive(Debug, Clone)]
pub struct HfTokenizer {
    inner: Tokenizer,
    model_max_len: Option<usize>,
}

impl HfTokenizer {
    /// Fetch `tokenizer.json` (and `tokenizer_config.json` when present) for a
    /// Hub model id through the local hf-hub cache.
    pub fn from_pretrained(model_id: &str) -> Result<Self> {
        let api = Api::new()?;
        let repo = api.model(model_id.to_string());
        let tok_path = repo
            .get("tokenizer.json")
            .with_context(|| format!("fetch tokenizer.json for {model_id}"))?;
        let cfg = repo.get("tokenizer_config.json").ok()
            .and_then(|p| std::fs::read_to_string(p).ok());

        let tok = Tokenizer::from_file(&tok_path).map_err(|e| anyhow!("{}", e))?;
        Self::build(tok, cfg.as_deref())
    }

    /// Load a local `tokenizer.json`; a sibling `tokenizer_config.json` is read if present.
    pub fn from_file(path: &Path) -> Result<Self> {
        let tok = Tokenizer::from_file(path)
            .map_err(|e| anyhow!("{}", e))
            .with_context(|| format!("load tokenizer from {}", path.display()))?;
        let cfg = path
            .parent()
            .map(|dir| dir.join("tokenizer_config.json"))
            .and_then(|p| std::fs::read_to_string(p).ok());
        Self::build(tok, cfg.as_deref())
    }

    fn build(mut tok: Tokenizer, cfg: Option<&str>) -> Result<Self> {
        tok.with_truncation(None).map_err(|e| anyhow!("{}", e))?;
        tok.with_padding(None);
        Ok(Self { inner: tok, model_max_len: cfg.and_then(model_max_length) })
    }
}

impl TokenCodec for HfTokenizer {
    fn encode(&self, text: &str) -> Result<Vec<u32>> {
        let enc = self.inner.encode(text, false).map_err(|e| anyhow!("{}", e))?;
        Ok(enc.get_ids().to_vec())
    }

    fn decode(&self, ids: &[u32]) -> Result<String> {
        self.inner.decode(ids, false).map_err(|e| anyhow!("{}", e))
    }

    fn model_max_len(&self) -> Option<usize> { self.model_max_len }
}

fn model_max_length(raw: &str) -> Option<usize> {
    let cfg: serde_json::Value = serde_json::from_str(raw).ok()?;
    cfg.get("model_max_length")
        .and_then(|v| v.as_u64())
        .filter(|&n| n > 0 && n <= MAX_SANE_CONTEXT)
        .map(|n| n as usize)
}
