//! Static HTML page listing every exported playlist.

mod html;
mod style;

pub use html::render_page;

use anyhow::Result;
use std::path::Path;
use tidal_shelf_core::library::{playlist_files, read_playlist};
use tidal_shelf_core::Playlist;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct LibraryEntry {
    pub file_name: String,
    pub playlist: Playlist,
}

/// Loads every playlist file in `dir`, in file-name order. Files that fail
/// to parse are logged and left out.
pub fn load_library(dir: &Path) -> Result<Vec<LibraryEntry>> {
    let files = playlist_files(dir)?;
    info!(count = files.len(), "found playlists");

    let mut entries = Vec::with_capacity(files.len());
    for path in files {
        match read_playlist(&path) {
            Ok(playlist) => entries.push(LibraryEntry {
                file_name: path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default(),
                playlist,
            }),
            Err(err) => warn!(error = %err, "skipping playlist file"),
        }
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::load_library;

    #[test]
    fn broken_files_are_left_out() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("a.json"),
            r#"{"name": "Good", "totalTracks": 0, "tracks": []}"#,
        )
        .unwrap();
        std::fs::write(dir.path().join("b.json"), "{ not json").unwrap();

        let entries = load_library(dir.path()).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].file_name, "a.json");
        assert_eq!(entries[0].playlist.name, "Good");
    }
}
