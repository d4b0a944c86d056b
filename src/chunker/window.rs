use anyhow::Result;

use crate::tokenizer::TokenCodec;

/// Candidate slice of unconsumed tokens together with its decoded text.
#[derive(Debug)]
pub(crate) struct Window<'a> {
    pub ids: &'a [u32],
    pub text: String,
}

impl Window<'_> {
    pub fn len(&self) -> usize { self.ids.len() }

    // blank windows are skipped without trimming or counting
    pub fn is_blank(&self) -> bool { self.text.trim().is_empty() }
}

/// Take at most `size` tokens from the front of `remaining` and decode them.
pub(crate) fn next_window<'a, C>(codec: &C, remaining: &'a [u32], size: usize) -> Result<Window<'a>>
where
    C: TokenCodec + ?Sized,
{
    let end = size.min(remaining.len());
    let ids = &remaining[..end];
    let text = codec.decode(ids)?;
    Ok(Window { ids, text })
}
