use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};

pub const STDIN_LABEL: &str = "<stdin>";

// Read the text to chunk from a file, or stdin when no path (or "-") is given.
// Returns (source label, text).
pub fn read_input(path: Option<&Path>) -> Result<(String, String)> {
    match path {
        Some(p) if p != Path::new("-") => {
            let text = std::fs::read_to_string(p)
                .with_context(|| format!("read input {}", p.display()))?;
            Ok((p.display().to_string(), text))
        }
        _ => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("read stdin")?;
            Ok((STDIN_LABEL.to_string(), text))
        }
    }
}

/// Format hint derived from a file extension ("py", "md", ...); empty when unknown.
pub fn format_hint(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_hint_uses_lowercase_extension() {
        assert_eq!(format_hint(Path::new("src/main.PY")), "py");
        assert_eq!(format_hint(Path::new("notes.md")), "md");
        assert_eq!(format_hint(Path::new("Makefile")), "");
        assert_eq!(format_hint(Path::new("-")), "");
    }

    #[test]
    fn reads_file_input() {
        let path = std::env::temp_dir().join(format!("rag-chunker-{}.txt", uuid::Uuid::new_v4()));
        std::fs::write(&path, "Some text.\n").unwrap();
        let (source, text) = read_input(Some(&path)).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(source, path.display().to_string());
        assert_eq!(text, "Some text.\n");
    }

    #[test]
    fn missing_file_has_context() {
        let err = read_input(Some(Path::new("/definitely/not/here.txt"))).unwrap_err();
        assert!(err.to_string().contains("read input"));
    }
}
