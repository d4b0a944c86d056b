use anyhow::{anyhow, Result};
use tiktoken_rs::CoreBPE;

use super::TokenCodec;

pub const ENCODING: &str = "cl100k_base";

/// OpenAI `cl100k_base` byte-level BPE. The ranks ship inside `tiktoken-rs`,
/// so loading needs no network.
///
/// Special-token text (e.g. `<|endoftext|>`) is encoded as ordinary text.
pub struct Cl100kTokenizer {
    bpe: CoreBPE,
}

impl Cl100kTokenizer {
    pub fn new() -> Result<Self> {
        let bpe = tiktoken_rs::cl100k_base().map_err(|e| anyhow!("load {}: {}", ENCODING, e))?;
        Ok(Self { bpe })
    }
}

impl TokenCodec for Cl100kTokenizer {
    fn encode(&self, text: &str) -> Result<Vec<u32>> {
        Ok(self.bpe.encode_ordinary(text))
    }

    // a window may end inside a multi-byte character; those bytes decode to U+FFFD
    fn decode(&self, ids: &[u32]) -> Result<String> {
        let bytes = self.bpe.decode_bytes(ids).map_err(|e| anyhow!("{}", e))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    // input limit of the OpenAI embedding models that use this encoding
    fn model_max_len(&self) -> Option<usize> { Some(8191) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_known_ids() {
        let tok = Cl100kTokenizer::new().unwrap();
        assert_eq!(tok.encode("hello world").unwrap(), vec![15339, 1917]);
        assert_eq!(tok.decode(&[15339, 1917]).unwrap(), "hello world");
    }

    #[test]
    fn special_token_text_is_ordinary() {
        let tok = Cl100kTokenizer::new().unwrap();
        let ids = tok.encode("<|endoftext|>").unwrap();
        assert!(ids.len() > 1);
        assert_eq!(tok.decode(&ids).unwrap(), "<|endoftext|>");
    }

    #[test]
    fn partial_character_never_errors() {
        let tok = Cl100kTokenizer::new().unwrap();
        let ids = tok.encode("🤖🤖🤖").unwrap();
        assert_eq!(tok.decode(&ids).unwrap(), "🤖🤖🤖");
        for end in 1..ids.len() {
            assert!(tok.decode(&ids[..end]).is_ok());
        }
    }
}
