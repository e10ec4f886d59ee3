use crate::shape::{self, RawItem};
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;
use tidal_shelf_core::{urls, Playlist, Track, TrackId};
use tracing::{info, warn};

const UNKNOWN_PLAYLIST: &str = "Unknown Playlist";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingMetadataReason {
    NotCaptured,
    Unnamed,
}

impl fmt::Display for MissingMetadataReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissingMetadataReason::NotCaptured => f.write_str("no playlist metadata captured yet"),
            MissingMetadataReason::Unnamed => {
                f.write_str("playlist metadata did not load properly (no playlist name)")
            }
        }
    }
}

/// The session has not seen a usable playlist descriptor. Nothing is lost:
/// reopen the playlist so the web app fetches it again, then retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{reason}")]
pub struct MissingMetadataError {
    pub reason: MissingMetadataReason,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconstructStats {
    /// Playlist entries across all pages, duplicates included.
    pub flattened: usize,
    /// Entries dropped for lacking a membership marker.
    pub excluded: usize,
    pub unique: usize,
    pub duplicates: usize,
    /// Pages without an entry array.
    pub skipped_pages: usize,
}

#[derive(Debug, Clone)]
pub struct Reconstruction {
    pub playlist: Playlist,
    pub stats: ReconstructStats,
}

pub(crate) fn reconstruct(
    metadata: Option<&Value>,
    fallback_id: Option<&str>,
    pages: &[Value],
    now: DateTime<Utc>,
) -> Result<Reconstruction, MissingMetadataError> {
    let metadata = metadata.ok_or(MissingMetadataError {
        reason: MissingMetadataReason::NotCaptured,
    })?;
    let info = shape::descriptor(metadata);

    let name = shape::text(info.get("title"))
        .or_else(|| shape::text(info.get("name")))
        .unwrap_or_else(|| UNKNOWN_PLAYLIST.to_string());
    if name == UNKNOWN_PLAYLIST {
        return Err(MissingMetadataError {
            reason: MissingMetadataReason::Unnamed,
        });
    }

    let mut stats = ReconstructStats::default();
    let mut entries: Vec<RawItem<'_>> = Vec::new();
    for page in pages {
        let Some(items) = shape::page_items(page) else {
            warn!("items page has no entry array; skipping it");
            stats.skipped_pages += 1;
            continue;
        };
        for value in items {
            match RawItem::from_value(value) {
                Some(item) if item.is_playlist_entry() => entries.push(item),
                _ => stats.excluded += 1,
            }
        }
    }
    stats.flattened = entries.len();

    let mut seen = HashSet::new();
    let mut unique: Vec<RawItem<'_>> = entries
        .into_iter()
        .filter(|item| match item.dedup_key() {
            Some(key) => seen.insert(key),
            None => false,
        })
        .collect();
    stats.unique = unique.len();
    stats.duplicates = stats.flattened - stats.unique;

    // Pages arrive in whatever order the user scrolled; the index is the
    // only reliable ordering. `sort_by` is stable.
    unique.sort_by(|a, b| a.index().total_cmp(&b.index()));

    let tracks: Vec<Track> = unique
        .iter()
        .enumerate()
        .map(|(i, item)| to_track(item, i + 1))
        .collect();

    let now_text = now.to_rfc3339_opts(SecondsFormat::Millis, true);
    let playlist = Playlist {
        id: shape::text(info.get("uuid"))
            .or_else(|| shape::text(info.get("id")))
            .or_else(|| fallback_id.map(str::to_string)),
        description: shape::text(info.get("description")).unwrap_or_default(),
        created: shape::text(info.get("created"))
            .or_else(|| shape::text(info.get("createdAt")))
            .unwrap_or_else(|| now_text.clone()),
        last_modified: shape::text(info.get("lastModified"))
            .or_else(|| shape::text(info.get("lastUpdatedAt")))
            .unwrap_or(now_text),
        total_tracks: tracks.len(),
        public: shape::flag(info.get("publicPlaylist"))
            .filter(|p| *p)
            .or_else(|| shape::flag(info.get("public")))
            .unwrap_or(false),
        name,
        tracks,
    };

    info!(
        playlist = %playlist.name,
        id = ?playlist.id,
        captured = stats.flattened,
        unique = stats.unique,
        duplicates = stats.duplicates,
        excluded = stats.excluded,
        "playlist reconstructed"
    );

    Ok(Reconstruction { playlist, stats })
}

fn to_track(item: &RawItem<'_>, position: usize) -> Track {
    let track = item.track();
    let album = shape::object(track.get("album"));

    Track {
        position,
        id: track_id(track.get("id")),
        title: shape::text(track.get("title")).unwrap_or_else(|| "Unknown".to_string()),
        artist: artist_name(track).unwrap_or_else(|| "Unknown Artist".to_string()),
        album: album
            .and_then(|a| shape::text(a.get("title")).or_else(|| shape::text(a.get("name"))))
            .unwrap_or_else(|| "Unknown Album".to_string()),
        duration: shape::number(track.get("duration"))
            .filter(|d| *d > 0.0)
            .map(|d| d.round() as u64)
            .unwrap_or(0),
        isrc: shape::text(track.get("isrc")).unwrap_or_default(),
        explicit: shape::flag(track.get("explicit")).unwrap_or(false),
        version: shape::text(track.get("version")),
        release_date: album.and_then(|a| shape::text(a.get("releaseDate"))),
        bpm: shape::number(track.get("bpm"))
            .filter(|b| *b > 0.0)
            .map(|b| b.round() as u32),
        album_cover: album
            .and_then(|a| shape::text(a.get("cover")))
            .map(|cover| urls::tidal_cover_url(&cover)),
    }
}

fn track_id(value: Option<&Value>) -> TrackId {
    match value.and_then(Value::as_u64) {
        Some(n) if n > 0 => TrackId::Numeric(n),
        _ => TrackId::Text(shape::text(value).unwrap_or_default()),
    }
}

fn artist_name(track: &serde_json::Map<String, Value>) -> Option<String> {
    if let Some(name) = shape::object(track.get("artist")).and_then(|a| shape::text(a.get("name"))) {
        return Some(name);
    }
    let names: Vec<String> = track
        .get("artists")?
        .as_array()?
        .iter()
        .filter_map(|a| shape::text(a.get("name")))
        .collect();
    if names.is_empty() {
        None
    } else {
        Some(names.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::{reconstruct, MissingMetadataReason};
    use chrono::{TimeZone, Utc};
    use serde_json::{json, Value};
    use tidal_shelf_core::TrackId;

    fn now() -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 4, 5, 6, 7).unwrap()
    }

    fn entry(uuid: &str, id: u64, index: i64) -> Value {
        json!({
            "itemUuid": uuid,
            "item": {
                "id": id,
                "index": index,
                "title": format!("Track {id}"),
                "artist": {"name": "Artist"},
                "album": {"title": "Album", "cover": "aa-bb-cc", "releaseDate": "2020-02-02"},
                "duration": 180,
                "isrc": format!("ISRC{id}"),
                "explicit": false
            }
        })
    }

    #[test]
    fn road_trip_pages_merge_in_index_order() {
        let metadata = json!({"title": "Road Trip", "created": "2024-01-01"});
        let pages = vec![
            json!({"data": [entry("u2", 12, 2), entry("u3", 13, 3)]}),
            json!({"items": [entry("u0", 10, 0), entry("u1", 11, 1)]}),
        ];

        let out = reconstruct(Some(&metadata), None, &pages, now()).unwrap();
        let playlist = out.playlist;

        assert_eq!(playlist.name, "Road Trip");
        assert_eq!(playlist.created, "2024-01-01");
        assert_eq!(playlist.total_tracks, 4);
        let ids: Vec<TrackId> = playlist.tracks.iter().map(|t| t.id.clone()).collect();
        assert_eq!(
            ids,
            vec![
                TrackId::Numeric(10),
                TrackId::Numeric(11),
                TrackId::Numeric(12),
                TrackId::Numeric(13)
            ]
        );
        let positions: Vec<usize> = playlist.tracks.iter().map(|t| t.position).collect();
        assert_eq!(positions, vec![1, 2, 3, 4]);
    }

    #[test]
    fn duplicates_keep_first_occurrence_and_are_counted() {
        let metadata = json!({"data": {"title": "Dupes"}});
        let mut first = entry("u1", 1, 0);
        first["item"]["title"] = json!("First copy");
        let mut second = entry("u1", 1, 0);
        second["item"]["title"] = json!("Second copy");
        let pages = vec![
            json!({"data": [first, entry("u2", 2, 1)]}),
            json!({"data": [second]}),
        ];

        let out = reconstruct(Some(&metadata), None, &pages, now()).unwrap();

        assert_eq!(out.stats.flattened, 3);
        assert_eq!(out.stats.unique, 2);
        assert_eq!(out.stats.duplicates, 1);
        assert_eq!(out.playlist.tracks[0].title, "First copy");
    }

    #[test]
    fn entries_without_membership_marker_are_excluded() {
        let metadata = json!({"title": "Mixed"});
        let recommendation = json!({"item": {"id": 99, "index": 0, "title": "Suggested"}});
        let pages = vec![json!({"data": [recommendation, entry("u1", 1, 5)]})];

        let out = reconstruct(Some(&metadata), None, &pages, now()).unwrap();

        assert_eq!(out.playlist.tracks.len(), 1);
        assert_eq!(out.playlist.tracks[0].id, TrackId::Numeric(1));
        assert_eq!(out.stats.excluded, 1);
    }

    #[test]
    fn equal_or_missing_index_keeps_flatten_order() {
        let metadata = json!({"title": "Stable"});
        let a = json!({"itemUuid": "a", "item": {"id": 1, "title": "A"}});
        let b = json!({"itemUuid": "b", "item": {"id": 2, "title": "B", "index": 0}});
        let c = json!({"itemUuid": "c", "item": {"id": 3, "title": "C"}});
        let pages = vec![json!({"data": [a, b, c]})];

        let out = reconstruct(Some(&metadata), None, &pages, now()).unwrap();
        let titles: Vec<&str> = out.playlist.tracks.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["A", "B", "C"]);
    }

    #[test]
    fn missing_or_unnamed_metadata_is_rejected() {
        let err = reconstruct(None, None, &[], now()).unwrap_err();
        assert_eq!(err.reason, MissingMetadataReason::NotCaptured);

        let unnamed = json!({"data": {"uuid": "abc", "title": ""}});
        let err = reconstruct(Some(&unnamed), None, &[], now()).unwrap_err();
        assert_eq!(err.reason, MissingMetadataReason::Unnamed);

        let sentinel = json!({"name": "Unknown Playlist"});
        assert!(reconstruct(Some(&sentinel), None, &[], now()).is_err());
    }

    #[test]
    fn empty_capture_yields_empty_playlist_with_default_fields() {
        let metadata = json!({"data": {"name": "Quiet", "publicPlaylist": true}});

        let out = reconstruct(Some(&metadata), Some("feed-beef"), &[], now()).unwrap();
        let playlist = out.playlist;

        assert!(playlist.tracks.is_empty());
        assert_eq!(playlist.id.as_deref(), Some("feed-beef"));
        assert_eq!(playlist.description, "");
        assert_eq!(playlist.created, "2025-03-04T05:06:07.000Z");
        assert_eq!(playlist.last_modified, "2025-03-04T05:06:07.000Z");
        assert!(playlist.public);
    }

    #[test]
    fn metadata_field_fallbacks() {
        let metadata = json!({
            "uuid": "pl-uuid",
            "id": "pl-id",
            "name": "Fallbacks",
            "createdAt": "2023-05-05T00:00:00Z",
            "lastUpdatedAt": "2023-06-06T00:00:00Z",
            "public": true
        });

        let playlist = reconstruct(Some(&metadata), None, &[], now()).unwrap().playlist;

        assert_eq!(playlist.id.as_deref(), Some("pl-uuid"));
        assert_eq!(playlist.created, "2023-05-05T00:00:00Z");
        assert_eq!(playlist.last_modified, "2023-06-06T00:00:00Z");
        assert!(playlist.public);
    }

    #[test]
    fn track_fields_are_normalized_across_shapes() {
        let metadata = json!({"title": "Shapes"});
        let resource = json!({
            "itemUuid": "r1",
            "resource": {
                "id": "tidal:5",
                "index": 1,
                "title": "Collab",
                "artists": [{"name": "One"}, {"name": "Two"}],
                "album": {"name": "Joint Album"},
                "version": "Remastered",
                "bpm": 128,
                "explicit": true
            }
        });
        let bare = json!({
            "itemUuid": "b1",
            "index": 0,
            "id": 77
        });
        let pages = vec![json!({"data": [resource, bare]})];

        let tracks = reconstruct(Some(&metadata), None, &pages, now()).unwrap().playlist.tracks;

        assert_eq!(tracks[0].id, TrackId::Numeric(77));
        assert_eq!(tracks[0].title, "Unknown");
        assert_eq!(tracks[0].artist, "Unknown Artist");
        assert_eq!(tracks[0].album, "Unknown Album");
        assert_eq!(tracks[0].duration, 0);
        assert!(tracks[0].album_cover.is_none());

        assert_eq!(tracks[1].id, TrackId::Text("tidal:5".to_string()));
        assert_eq!(tracks[1].artist, "One, Two");
        assert_eq!(tracks[1].album, "Joint Album");
        assert_eq!(tracks[1].version.as_deref(), Some("Remastered"));
        assert_eq!(tracks[1].bpm, Some(128));
        assert!(tracks[1].explicit);
    }

    #[test]
    fn cover_id_becomes_cdn_url() {
        let metadata = json!({"title": "Covers"});
        let pages = vec![json!({"data": [entry("u1", 1, 0)]})];

        let track = &reconstruct(Some(&metadata), None, &pages, now()).unwrap().playlist.tracks[0];
        assert_eq!(
            track.album_cover.as_deref(),
            Some("https://resources.tidal.com/images/aa/bb/cc/1280x1280.jpg")
        );
        assert_eq!(track.release_date.as_deref(), Some("2020-02-02"));
    }

    #[test]
    fn page_without_entry_array_is_skipped_not_fatal() {
        let metadata = json!({"title": "Partial"});
        let pages = vec![
            json!({"error": "rate limited"}),
            json!({"data": [entry("u1", 1, 0)]}),
        ];

        let out = reconstruct(Some(&metadata), None, &pages, now()).unwrap();
        assert_eq!(out.stats.skipped_pages, 1);
        assert_eq!(out.playlist.tracks.len(), 1);
    }
}
