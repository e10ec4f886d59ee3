use crate::{ArtworkChain, ArtworkQuery};
use anyhow::Result;
use std::path::Path;
use std::time::Duration;
use tidal_shelf_core::library::{playlist_files, read_playlist, write_playlist};
use tidal_shelf_core::Playlist;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnrichReport {
    pub files: usize,
    pub files_updated: usize,
    pub tracks_updated: usize,
    /// Tracks that already had a cover before the run.
    pub already_covered: usize,
}

/// Adds `albumCover` URLs to exported playlists that lack them.
pub struct CoverEnricher<'a> {
    chain: &'a ArtworkChain,
    delay: Duration,
}

impl<'a> CoverEnricher<'a> {
    /// `delay` is slept after every remote lookup to stay under the
    /// catalogue's rate limit.
    pub fn new(chain: &'a ArtworkChain, delay: Duration) -> Self {
        Self { chain, delay }
    }

    /// Returns `(updated, already_covered)` for the playlist.
    pub async fn enrich_playlist(&self, playlist: &mut Playlist) -> (usize, usize) {
        let mut updated = 0;
        let mut skipped = 0;
        let wanted = playlist
            .tracks
            .iter()
            .filter(|t| t.album_cover.is_none())
            .count();

        for track in playlist.tracks.iter_mut() {
            if track.album_cover.is_some() {
                skipped += 1;
                continue;
            }

            if let Some(url) = self.chain.resolve(&ArtworkQuery::for_track(track)).await {
                track.album_cover = Some(url);
                updated += 1;
                info!(updated, wanted, "added album cover");
            }

            tokio::time::sleep(self.delay).await;
        }

        (updated, skipped)
    }

    /// Enriches every playlist file in `dir`, rewriting only the files where
    /// at least one cover was added. Unreadable files are skipped.
    pub async fn enrich_dir(&self, dir: &Path) -> Result<EnrichReport> {
        let files = playlist_files(dir)?;
        info!(count = files.len(), dir = %dir.display(), "found playlists");

        let mut report = EnrichReport {
            files: files.len(),
            ..EnrichReport::default()
        };

        for path in files {
            info!(file = %path.display(), "processing playlist");
            let mut playlist = match read_playlist(&path) {
                Ok(p) => p,
                Err(err) => {
                    warn!(error = %err, "skipping unreadable playlist");
                    continue;
                }
            };

            let (updated, skipped) = self.enrich_playlist(&mut playlist).await;
            report.already_covered += skipped;

            if updated > 0 {
                write_playlist(&path, &playlist)?;
                report.files_updated += 1;
                report.tracks_updated += updated;
                info!(updated, skipped, "playlist updated");
            } else {
                info!("no updates needed");
            }
        }

        info!(total = report.tracks_updated, "cover enrichment finished");
        Ok(report)
    }
}
