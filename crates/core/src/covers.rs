use crate::model::Track;
use std::collections::HashMap;

/// Albums are identified by artist and album name; tracks from the same
/// album share one downloaded cover.
pub fn album_key(track: &Track) -> String {
    format!("{}|||{}", track.artist, track.album)
}

pub fn cover_file_name(artist: &str, album: &str) -> String {
    format!("{}_{}.jpg", sanitize(artist), sanitize(album))
}

fn sanitize(part: &str) -> String {
    part.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

/// Album key -> cover file name inside the covers directory.
#[derive(Debug, Clone, Default)]
pub struct CoverIndex {
    files: HashMap<String, String>,
}

impl CoverIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: String, file_name: String) {
        self.files.insert(key, file_name);
    }

    pub fn contains(&self, key: &str) -> bool {
        self.files.contains_key(key)
    }

    pub fn for_track(&self, track: &Track) -> Option<&str> {
        self.files.get(&album_key(track)).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}
