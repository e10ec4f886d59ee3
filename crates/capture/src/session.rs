use crate::reconstruct::{self, MissingMetadataError, Reconstruction};
use crate::route::playlist_route;
use crate::shape;
use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{debug, info, warn};

/// One completed request as seen by the host's networking layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedResponse {
    pub url: String,
    pub body: String,
}

impl CapturedResponse {
    pub fn new(url: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            body: body.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// Not a playlist request.
    Unrelated,
    NotCapturing,
    /// An items page belonging to a playlist other than the tracked one.
    OtherPlaylist,
}

#[derive(Debug)]
pub enum Observation {
    Metadata {
        playlist_id: Option<String>,
        name: Option<String>,
        /// Set when this response moved the session to a different
        /// playlist; holds everything captured for the previous one.
        abandoned: Option<Box<PlaylistSession>>,
    },
    Items {
        count: usize,
        total: usize,
    },
    Ignored(IgnoreReason),
    Malformed {
        error: String,
    },
}

/// Implemented by anything that wants to see completed requests. The host
/// calls it once per response, in arrival order.
pub trait ResponseObserver {
    fn observe(&mut self, response: &CapturedResponse) -> Observation;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureStatus {
    pub capturing: bool,
    pub playlist_name: Option<String>,
    pub total_captured: usize,
    pub responses: usize,
    /// Entry count of each captured page, in arrival order.
    pub pages: Vec<usize>,
}

#[derive(Debug, Clone)]
pub struct PlaylistSession {
    current_playlist_id: Option<String>,
    metadata: Option<Value>,
    metadata_route_id: Option<String>,
    items_responses: Vec<Value>,
    is_capturing: bool,
}

impl Default for PlaylistSession {
    fn default() -> Self {
        Self::new()
    }
}

impl PlaylistSession {
    /// A fresh session that accepts observations straight away.
    pub fn new() -> Self {
        Self {
            current_playlist_id: None,
            metadata: None,
            metadata_route_id: None,
            items_responses: Vec::new(),
            is_capturing: true,
        }
    }

    /// A fresh session that ignores everything until [`start_capture`](Self::start_capture).
    pub fn inactive() -> Self {
        Self {
            is_capturing: false,
            ..Self::new()
        }
    }

    /// Returns whether capturing was already active.
    pub fn start_capture(&mut self) -> bool {
        let was_capturing = self.is_capturing;
        self.is_capturing = true;
        if was_capturing {
            debug!("already capturing");
        } else {
            info!("started capturing");
        }
        was_capturing
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn is_capturing(&self) -> bool {
        self.is_capturing
    }

    pub fn current_playlist_id(&self) -> Option<&str> {
        self.current_playlist_id.as_deref()
    }

    pub fn has_metadata(&self) -> bool {
        self.metadata.is_some()
    }

    pub fn responses(&self) -> usize {
        self.items_responses.len()
    }

    pub fn total_captured(&self) -> usize {
        self.page_counts().iter().sum()
    }

    pub fn status(&self) -> CaptureStatus {
        CaptureStatus {
            capturing: self.is_capturing,
            playlist_name: self.metadata.as_ref().and_then(playlist_name),
            total_captured: self.total_captured(),
            responses: self.items_responses.len(),
            pages: self.page_counts(),
        }
    }

    /// Builds the playlist from everything captured so far. Leaves the
    /// session as it is, so it can be called repeatedly while scrolling.
    pub fn reconstruct(&self) -> Result<Reconstruction, MissingMetadataError> {
        self.reconstruct_at(Utc::now())
    }

    pub fn reconstruct_at(&self, now: DateTime<Utc>) -> Result<Reconstruction, MissingMetadataError> {
        reconstruct::reconstruct(
            self.metadata.as_ref(),
            self.current_playlist_id
                .as_deref()
                .or(self.metadata_route_id.as_deref()),
            &self.items_responses,
            now,
        )
    }

    /// Reconstructs and, on success, resets the session for the next
    /// playlist. On error the session is left untouched.
    pub fn export(&mut self) -> Result<Reconstruction, MissingMetadataError> {
        self.export_at(Utc::now())
    }

    pub fn export_at(&mut self, now: DateTime<Utc>) -> Result<Reconstruction, MissingMetadataError> {
        let out = self.reconstruct_at(now)?;
        self.reset();
        info!("session cleared, ready for the next playlist");
        Ok(out)
    }

    /// Folds a later visit to the same playlist into this session. Pages stay
    /// in arrival order, so an entry seen on the earlier visit wins on
    /// dedup; the most recent metadata is kept. A session tracking a
    /// different playlist is handed back untouched.
    pub fn absorb(&mut self, later: PlaylistSession) -> Result<(), PlaylistSession> {
        if later.current_playlist_id != self.current_playlist_id {
            return Err(later);
        }

        debug!(
            id = ?self.current_playlist_id,
            pages = later.items_responses.len(),
            "merging revisited playlist"
        );
        if later.metadata.is_some() {
            self.metadata = later.metadata;
            self.metadata_route_id = later.metadata_route_id;
        }
        self.items_responses.extend(later.items_responses);
        Ok(())
    }

    fn page_counts(&self) -> Vec<usize> {
        self.items_responses
            .iter()
            .map(|page| shape::page_items(page).map_or(0, Vec::len))
            .collect()
    }

    fn observe_metadata(&mut self, route_id: String, body: Value) -> Observation {
        let info = shape::descriptor(&body);
        let new_id = shape::text(info.get("uuid")).or_else(|| shape::text(info.get("id")));
        let name = playlist_name(&body);

        let mut abandoned = None;
        if self.current_playlist_id.is_some() && new_id != self.current_playlist_id {
            info!(
                previous = ?self.current_playlist_id,
                next = ?new_id,
                "new playlist detected, resetting session"
            );
            abandoned = Some(Box::new(std::mem::take(self)));
        }

        if !self.is_capturing {
            return Observation::Ignored(IgnoreReason::NotCapturing);
        }

        info!(playlist = ?name, id = ?new_id, "captured playlist metadata");
        self.current_playlist_id = new_id.clone();
        self.metadata = Some(body);
        self.metadata_route_id = Some(route_id);

        Observation::Metadata {
            playlist_id: new_id,
            name,
            abandoned,
        }
    }

    fn observe_items(&mut self, route_id: &str, body: Value) -> Observation {
        if !self.is_capturing {
            return Observation::Ignored(IgnoreReason::NotCapturing);
        }
        if let Some(current) = &self.current_playlist_id {
            if current != route_id {
                debug!(current = %current, page = %route_id, "items page for another playlist");
                return Observation::Ignored(IgnoreReason::OtherPlaylist);
            }
        }

        let count = shape::page_items(&body).map_or(0, Vec::len);
        self.items_responses.push(body);
        let total = self.total_captured();
        info!(count, total, "captured items page");

        Observation::Items { count, total }
    }
}

impl ResponseObserver for PlaylistSession {
    fn observe(&mut self, response: &CapturedResponse) -> Observation {
        let Some(route) = playlist_route(&response.url) else {
            return Observation::Ignored(IgnoreReason::Unrelated);
        };

        let body: Value = match serde_json::from_str(&response.body) {
            Ok(body) => body,
            Err(err) => {
                warn!(url = %response.url, error = %err, "unparseable playlist response");
                return Observation::Malformed {
                    error: err.to_string(),
                };
            }
        };

        if route.items {
            self.observe_items(&route.playlist_id, body)
        } else {
            self.observe_metadata(route.playlist_id, body)
        }
    }
}

fn playlist_name(metadata: &Value) -> Option<String> {
    let info = shape::descriptor(metadata);
    shape::text(info.get("title")).or_else(|| shape::text(info.get("name")))
}
