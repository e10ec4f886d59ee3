//! Rebuilds a playlist from the network responses a streaming web app makes
//! while the user browses it.
//!
//! The host feeds every completed request into a [`PlaylistSession`] through
//! the [`ResponseObserver`] trait. Metadata responses pin the session to one
//! playlist; paginated item responses accumulate until [`PlaylistSession::export`]
//! merges them into a single ordered, deduplicated [`Playlist`].
//!
//! [`Playlist`]: tidal_shelf_core::Playlist

pub mod log;
pub mod reconstruct;
mod route;
pub mod session;
mod shape;

pub use log::{read_capture_log, CaptureLogFormat};
pub use reconstruct::{MissingMetadataError, MissingMetadataReason, Reconstruction, ReconstructStats};
pub use session::{
    CaptureStatus, CapturedResponse, IgnoreReason, Observation, PlaylistSession, ResponseObserver,
};
