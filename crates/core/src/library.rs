use crate::model::Playlist;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Every `*.json` file directly inside `dir`, sorted by file name.
pub fn playlist_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("failed to list playlist directory {}", dir.display()))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|e| e == "json") {
            files.push(path);
        }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

pub fn read_playlist(path: &Path) -> Result<Playlist> {
    let data = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&data).with_context(|| format!("failed to parse {}", path.display()))
}

/// Writes the playlist as JSON indented with two spaces.
pub fn write_playlist(path: &Path, playlist: &Playlist) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(playlist)?;
    std::fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))
}
