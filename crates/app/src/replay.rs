use tidal_shelf_capture::{
    CaptureStatus, CapturedResponse, MissingMetadataError, Observation, PlaylistSession,
    ResponseObserver,
};
use tidal_shelf_core::Playlist;
use tracing::{debug, warn};

pub(crate) struct ReplayOutcome {
    pub exported: Vec<Playlist>,
    /// Set when the last playlist on screen could not be exported.
    pub pending: Option<PendingCapture>,
}

pub(crate) struct PendingCapture {
    pub error: MissingMetadataError,
    pub responses: usize,
}

/// Feeds a recorded browsing session through a capture session, keeping
/// each playlist as the user navigates away from it and the last one at the
/// end. A playlist visited more than once is merged into a single export.
/// Playlists that were only glanced at (no item pages) are not exported;
/// an empty playlist still produces one empty page.
pub(crate) fn replay(responses: &[CapturedResponse]) -> ReplayOutcome {
    let mut session = PlaylistSession::new();
    let mut visits = Vec::new();

    for response in responses {
        if let Observation::Metadata {
            abandoned: Some(previous),
            ..
        } = session.observe(response)
        {
            if previous.responses() == 0 {
                debug!(id = ?previous.current_playlist_id(), "left playlist without item pages");
                continue;
            }
            keep_visit(&mut visits, *previous);
        }
    }

    let last = if session.responses() == 0 {
        debug!(id = ?session.current_playlist_id(), "last playlist has no item pages");
        None
    } else {
        Some(keep_visit(&mut visits, session))
    };

    let mut exported = Vec::with_capacity(visits.len());
    let mut pending = None;
    for (idx, mut visit) in visits.into_iter().enumerate() {
        match visit.export() {
            Ok(out) => exported.push(out.playlist),
            Err(error) if Some(idx) == last => {
                pending = Some(PendingCapture {
                    error,
                    responses: visit.responses(),
                })
            }
            Err(err) => warn!(error = %err, "could not export playlist left behind"),
        }
    }

    ReplayOutcome { exported, pending }
}

/// Returns the slot the visit ended up in, merging it into an earlier visit
/// of the same playlist when there is one.
fn keep_visit(visits: &mut Vec<PlaylistSession>, visit: PlaylistSession) -> usize {
    let earlier = visit
        .current_playlist_id()
        .and_then(|id| visits.iter().position(|v| v.current_playlist_id() == Some(id)));

    if let Some(idx) = earlier {
        match visits[idx].absorb(visit) {
            Ok(()) => return idx,
            Err(visit) => visits.push(visit),
        }
    } else {
        visits.push(visit);
    }
    visits.len() - 1
}

/// Status of the session as it stands after the whole log, i.e. of the
/// playlist that was on screen last.
pub(crate) fn replay_status(responses: &[CapturedResponse]) -> CaptureStatus {
    let mut session = PlaylistSession::new();
    for response in responses {
        session.observe(response);
    }
    session.status()
}

#[cfg(test)]
mod tests {
    use super::{replay, replay_status};
    use serde_json::json;
    use tidal_shelf_capture::CapturedResponse;

    const A: &str = "aaaaaaaa-0000-4000-8000-00000000000a";
    const B: &str = "bbbbbbbb-0000-4000-8000-00000000000b";
    const C: &str = "cccccccc-0000-4000-8000-00000000000c";

    fn metadata(id: &str, title: &str) -> CapturedResponse {
        CapturedResponse::new(
            format!("https://listen.tidal.com/v1/playlists/{id}"),
            json!({"uuid": id, "title": title}).to_string(),
        )
    }

    fn page(id: &str, uuid: &str) -> CapturedResponse {
        CapturedResponse::new(
            format!("https://listen.tidal.com/v1/playlists/{id}/items?offset=0"),
            json!({"items": [{"itemUuid": uuid, "item": {"id": 5, "title": "Song"}}]}).to_string(),
        )
    }

    #[test]
    fn every_browsed_playlist_with_items_is_exported() {
        let log = vec![
            metadata(A, "Alpha"),
            page(A, "a1"),
            metadata(B, "Glance"),
            metadata(C, "Gamma"),
            page(C, "c1"),
            page(C, "c2"),
        ];

        let outcome = replay(&log);

        let names: Vec<&str> = outcome.exported.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Alpha", "Gamma"]);
        assert_eq!(outcome.exported[1].total_tracks, 2);
        assert!(outcome.pending.is_none());
    }

    #[test]
    fn revisited_playlist_keeps_tracks_from_every_visit() {
        let log = vec![
            metadata(A, "Alpha"),
            page(A, "a0"),
            page(A, "a1"),
            page(A, "a2"),
            metadata(B, "Beta"),
            page(B, "b0"),
            metadata(A, "Alpha"),
            page(A, "a3"),
        ];

        let outcome = replay(&log);

        let names: Vec<&str> = outcome.exported.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Alpha", "Beta"]);
        assert_eq!(outcome.exported[0].total_tracks, 4);
        assert_eq!(outcome.exported[1].total_tracks, 1);
        assert!(outcome.pending.is_none());
    }

    #[test]
    fn items_without_metadata_are_reported_as_pending() {
        let outcome = replay(&[page(A, "a1")]);

        assert!(outcome.exported.is_empty());
        let pending = outcome.pending.expect("pending capture");
        assert_eq!(pending.responses, 1);
    }

    #[test]
    fn empty_log_is_neither_exported_nor_pending() {
        let outcome = replay(&[]);
        assert!(outcome.exported.is_empty());
        assert!(outcome.pending.is_none());
    }

    #[test]
    fn status_reflects_last_playlist() {
        let status = replay_status(&[metadata(A, "Alpha"), page(A, "a1"), metadata(B, "Beta")]);
        assert_eq!(status.playlist_name.as_deref(), Some("Beta"));
        assert_eq!(status.responses, 0);
        assert!(status.capturing);
    }
}
