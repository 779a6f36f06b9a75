//! Locating and removing the capture tool's output file.

use anyhow::{Context, Result, anyhow};
use std::path::{Path, PathBuf};

/// The most recently modified file directly inside `dir`.
pub fn newest_file(dir: &Path) -> Result<PathBuf> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read output directory {}", dir.display()))?;

    let mut files: Vec<(PathBuf, std::time::SystemTime)> = entries
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| {
            let meta = entry.metadata().ok()?;
            if !meta.is_file() {
                return None;
            }
            Some((entry.path(), meta.modified().ok()?))
        })
        .collect();

    files.sort_by(|a, b| b.1.cmp(&a.1));
    files
        .into_iter()
        .next()
        .map(|(path, _)| path)
        .ok_or_else(|| anyhow!("No files in output directory {}", dir.display()))
}

/// Delete a partial artifact. Returns `false` if it was already gone.
pub fn remove(path: &Path) -> Result<bool> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e).with_context(|| format!("Failed to remove {}", path.display())),
    }
}
