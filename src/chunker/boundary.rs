/// Characters treated as sentence or line endings.
pub const BOUNDARY_CHARS: [char; 4] = ['.', '?', '!', '\n'];

/// Cut `text` after its rightmost boundary character, provided that character
/// sits at a character offset strictly greater than `min_offset_chars`.
/// Otherwise the whole window is kept, even if it ends mid-sentence.
pub fn trim_at_boundary(text: &str, min_offset_chars: usize) -> &str {
    match text.rfind(|c: char| BOUNDARY_CHARS.contains(&c)) {
        // all boundary chars are single-byte, so idx + 1 is a char boundary
        Some(idx) if char_offset(text, idx) > min_offset_chars => &text[..=idx],
        _ => text,
    }
}

fn char_offset(text: &str, byte_idx: usize) -> usize {
    text[..byte_idx].chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_at_rightmost_boundary() {
        assert_eq!(trim_at_boundary("Hello world. This is", 5), "Hello world.");
        assert_eq!(trim_at_boundary("One. Two? Three! four", 2), "One. Two? Three!");
        assert_eq!(trim_at_boundary("line one\nline two", 3), "line one\n");
    }

    #[test]
    fn early_boundary_is_ignored() {
        // '.' at offset 4 is not past the floor of 5
        assert_eq!(trim_at_boundary("ence.", 5), "ence.");
        assert_eq!(trim_at_boundary("Dr. Smith went home", 5), "Dr. Smith went home");
    }

    #[test]
    fn floor_is_strict() {
        // '.' at offset 5
        assert_eq!(trim_at_boundary("abcde. rest", 5), "abcde. rest");
        assert_eq!(trim_at_boundary("abcde. rest", 4), "abcde.");
    }

    #[test]
    fn no_boundary_keeps_window() {
        assert_eq!(trim_at_boundary(" This is a test sent", 5), " This is a test sent");
        assert_eq!(trim_at_boundary("", 0), "");
    }

    #[test]
    fn offsets_count_characters_not_bytes() {
        // "ééééé" is 5 chars but 10 bytes; '.' sits at char offset 5
        assert_eq!(trim_at_boundary("ééééé. tail", 5), "ééééé. tail");
        assert_eq!(trim_at_boundary("ééééé. tail", 4), "ééééé.");
    }
}
