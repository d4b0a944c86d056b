// Newlines become spaces, then surrounding whitespace is stripped.
pub fn normalize(text: &str) -> String {
    text.replace('\n', " ").trim().to_string()
}

/// Length gate applied to normalized text, measured in characters.
pub fn accepts(candidate: &str, min_accept_length_chars: usize) -> bool {
    candidate.chars().count() > min_accept_length_chars
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replaces_newlines_and_strips() {
        assert_eq!(normalize("  a\nb\n\nc \n"), "a b  c");
        assert_eq!(normalize("\n\n"), "");
        assert_eq!(normalize(" This is a test sent"), "This is a test sent");
    }

    #[test]
    fn gate_is_strict() {
        assert!(!accepts("abcde", 5));
        assert!(accepts("abcdef", 5));
        assert!(!accepts("", 0));
        assert!(accepts("x", 0));
        // counted in characters
        assert!(!accepts("ééé", 3));
    }
}
