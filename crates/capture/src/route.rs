use url::Url;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PlaylistRoute {
    pub playlist_id: String,
    pub items: bool,
}

/// Classifies a request URL. Only `/playlists/<uuid>` paths are of
/// interest: the bare path is the playlist's metadata, and anything below
/// the id containing an `items` segment is a page of playlist entries.
/// Other sub-resources of a playlist are not routed.
pub(crate) fn playlist_route(raw: &str) -> Option<PlaylistRoute> {
    let url = parse_lenient(raw)?;
    let segments: Vec<&str> = url.path_segments()?.collect();

    let at = segments
        .windows(2)
        .position(|pair| pair[0] == "playlists" && is_playlist_id(pair[1]))?;

    let rest: Vec<&str> = segments[at + 2..].iter().copied().filter(|s| !s.is_empty()).collect();
    let items = rest.iter().any(|s| *s == "items");
    if !items && !rest.is_empty() {
        return None;
    }

    Some(PlaylistRoute {
        playlist_id: segments[at + 1].to_string(),
        items,
    })
}

fn parse_lenient(raw: &str) -> Option<Url> {
    match Url::parse(raw) {
        Ok(url) => Some(url),
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            Url::parse("http://localhost/").ok()?.join(raw).ok()
        }
        Err(_) => None,
    }
}

/// 8-4-4-4-12 hex groups.
fn is_playlist_id(segment: &str) -> bool {
    const GROUPS: [usize; 5] = [8, 4, 4, 4, 12];
    let parts: Vec<&str> = segment.split('-').collect();
    parts.len() == GROUPS.len()
        && parts
            .iter()
            .zip(GROUPS)
            .all(|(part, len)| part.len() == len && part.chars().all(|c| c.is_ascii_hexdigit()))
}
