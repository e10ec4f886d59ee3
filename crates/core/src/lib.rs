pub mod config;
pub mod covers;
pub mod library;
pub mod model;
pub mod urls;

pub use config::{AppConfig, ArtworkConfig, LibraryConfig};
pub use covers::{album_key, cover_file_name, CoverIndex};
pub use model::{Playlist, Track, TrackId};
