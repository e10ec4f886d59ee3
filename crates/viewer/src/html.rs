use crate::style::{PAGE_CSS, TOGGLE_SCRIPT};
use crate::LibraryEntry;
use std::fmt::Write;
use tidal_shelf_core::{CoverIndex, Track};

/// Renders the whole page. `covers_href` is the covers directory as seen
/// from the page's location, e.g. `covers`.
pub fn render_page(title: &str, entries: &[LibraryEntry], covers: &CoverIndex, covers_href: &str) -> String {
    let total_tracks: usize = entries.iter().map(|e| e.playlist.total_tracks).sum();
    let title = escape(title);

    let mut body = String::new();
    for (idx, entry) in entries.iter().enumerate() {
        render_playlist(&mut body, idx, entry, covers, covers_href);
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>{title}</title>
  <style>{PAGE_CSS}  </style>
</head>
<body>
  <div class="container">
    <h1>{title}</h1>
    <div class="stats">{playlists} playlists • {total_tracks} tracks</div>
    <div class="playlists">{body}
    </div>
  </div>
  <script>{TOGGLE_SCRIPT}  </script>
</body>
</html>
"#,
        playlists = entries.len(),
    )
}

fn render_playlist(out: &mut String, idx: usize, entry: &LibraryEntry, covers: &CoverIndex, covers_href: &str) {
    let playlist = &entry.playlist;
    let name = escape(&playlist.name);
    let minutes = playlist.total_duration() / 60;
    let cover = playlist
        .tracks
        .first()
        .and_then(|t| covers.for_track(t))
        .map(|file| {
            format!(
                r#"<img src="{}" alt="{name}" class="playlist-cover">"#,
                escape(&cover_src(covers_href, file))
            )
        })
        .unwrap_or_else(|| r#"<div class="playlist-cover"></div>"#.to_string());
    let description = if playlist.description.is_empty() {
        String::new()
    } else {
        format!(
            r#"<div class="playlist-description">{}</div>"#,
            escape(&playlist.description)
        )
    };

    let _ = write!(
        out,
        r#"
      <div class="playlist" data-file="{file}">
        <div class="playlist-header" onclick="togglePlaylist({idx})">
          {cover}
          <div class="playlist-info">
            <div class="playlist-name">{name}</div>
            <div class="playlist-meta">{tracks} tracks • {minutes} minutes</div>
            {description}
          </div>
        </div>
        <div class="tracks" id="tracks-{idx}">"#,
        tracks = playlist.total_tracks,
        file = escape(&entry.file_name),
    );
    for track in &playlist.tracks {
        render_track(out, track, covers, covers_href);
    }
    out.push_str("\n        </div>\n      </div>");
}

fn render_track(out: &mut String, track: &Track, covers: &CoverIndex, covers_href: &str) {
    let album = escape(&track.album);
    let cover = covers
        .for_track(track)
        .map(|file| {
            format!(
                r#"<img src="{}" alt="{album}" class="track-cover">"#,
                escape(&cover_src(covers_href, file))
            )
        })
        .unwrap_or_else(|| r#"<div class="track-cover"></div>"#.to_string());
    let badge = if track.explicit {
        r#"<span class="explicit">E</span>"#
    } else {
        ""
    };

    let _ = write!(
        out,
        r#"
          <div class="track">
            <div class="track-pos">{position}</div>
            {cover}
            <div class="track-title">{title}{badge}</div>
            <div class="track-artist">{artist}</div>
            <div class="track-album">{album}</div>
            <div class="track-duration">{duration}</div>
          </div>"#,
        position = track.position,
        title = escape(&track.title),
        artist = escape(&track.artist),
        duration = format_duration(track.duration),
    );
}

fn cover_src(covers_href: &str, file: &str) -> String {
    let dir = covers_href.trim_end_matches('/');
    if dir.is_empty() {
        file.to_string()
    } else {
        format!("{dir}/{file}")
    }
}

/// `m:ss`
pub(crate) fn format_duration(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

pub(crate) fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}
