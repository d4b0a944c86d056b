use anyhow::{anyhow, Result};

use super::TokenCodec;

/// One token per Unicode scalar value; the token id is the code point.
#[derive(Debug, Clone, Copy, Default)]
pub struct CharTokenizer;

impl TokenCodec for CharTokenizer {
    fn encode(&self, text: &str) -> Result<Vec<u32>> {
        Ok(text.chars().map(u32::from).collect())
    }

    fn decode(&self, ids: &[u32]) -> Result<String> {
        ids.iter()
            .map(|&id| char::from_u32(id).ok_or_else(|| anyhow!("Token id {} is not a unicode scalar value", id)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_token_per_char() {
        let ids = CharTokenizer.encode("añ🤖").unwrap();
        assert_eq!(ids, vec![0x61, 0xF1, 0x1F916]);
        assert_eq!(CharTokenizer.decode(&ids).unwrap(), "añ🤖");
    }

    #[test]
    fn surrogate_ids_fail_to_decode() {
        let err = CharTokenizer.decode(&[0x61, 0xD800]).unwrap_err();
        assert!(err.to_string().contains("55296"));
    }
}
