use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use walkdir::WalkDir;

// Expand files and directories (recursively, sorted) into the list of inputs to
// chunk. `exts` filters files found inside directories; explicit file arguments
// are always kept.
pub fn collect_inputs(paths: &[PathBuf], exts: &[String]) -> Result<Vec<PathBuf>> {
    let exts: Vec<String> = exts
        .iter()
        .map(|e| e.trim_start_matches('.').to_ascii_lowercase())
        .filter(|e| !e.is_empty())
        .collect();

    let mut out = Vec::new();
    for p in paths {
        let meta = std::fs::metadata(p).with_context(|| format!("stat {}", p.display()))?;
        if meta.is_dir() {
            walk_dir(p, &exts, &mut out)?;
        } else if meta.is_file() {
            out.push(p.clone());
        } else {
            bail!("{} is neither a file nor a directory", p.display());
        }
    }
    Ok(out)
}

// Symlinks are not followed, so a link back to an ancestor cannot loop.
fn walk_dir(dir: &Path, exts: &[String], out: &mut Vec<PathBuf>) -> Result<()> {
    for entry in WalkDir::new(dir).follow_links(false).sort_by_file_name() {
        let entry = entry.with_context(|| format!("walk {}", dir.display()))?;
        if entry.file_type().is_file() && matches_ext(entry.path(), exts) {
            out.push(entry.into_path());
        }
    }
    Ok(())
}

fn matches_ext(path: &Path, exts: &[String]) -> bool {
    if exts.is_empty() {
        return true;
    }
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| exts.iter().any(|x| x.eq_ignore_ascii_case(e)))
        .unwrap_or(false)
}
