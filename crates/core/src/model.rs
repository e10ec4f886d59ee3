use serde::{Deserialize, Serialize};
use std::fmt;

/// Track identifier as reported by the service. Catalogue ids are numeric but
/// some responses carry them as strings, so both shapes are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TrackId {
    Numeric(u64),
    Text(String),
}

impl Default for TrackId {
    fn default() -> Self {
        TrackId::Text(String::new())
    }
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackId::Numeric(n) => write!(f, "{n}"),
            TrackId::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    pub position: usize,
    #[serde(default)]
    pub id: TrackId,
    pub title: String,
    pub artist: String,
    pub album: String,
    #[serde(default)]
    pub duration: u64,
    #[serde(default)]
    pub isrc: String,
    #[serde(default)]
    pub explicit: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bpm: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub album_cover: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Playlist {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub created: String,
    #[serde(default)]
    pub last_modified: String,
    #[serde(default)]
    pub total_tracks: usize,
    #[serde(default)]
    pub public: bool,
    #[serde(default)]
    pub tracks: Vec<Track>,
}

impl Playlist {
    /// Sum of all track durations, in seconds.
    pub fn total_duration(&self) -> u64 {
        self.tracks.iter().map(|t| t.duration).sum()
    }

    /// File stem used when the playlist is written to disk: the name
    /// lowercased with every run of non-alphanumerics collapsed to `-`.
    pub fn file_stem(&self) -> String {
        let mut slug = String::with_capacity(self.name.len());
        for ch in self.name.chars() {
            if ch.is_ascii_alphanumeric() {
                slug.push(ch.to_ascii_lowercase());
            } else if !slug.ends_with('-') {
                slug.push('-');
            }
        }
        let slug = slug.trim_matches('-');
        if slug.is_empty() {
            "playlist".to_string()
        } else {
            slug.to_string()
        }
    }
}
