use crate::http::download_image;
use crate::{ArtworkChain, ArtworkQuery};
use anyhow::{Context, Result};
use reqwest::Client;
use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;
use tidal_shelf_core::{album_key, cover_file_name, CoverIndex, Playlist};
use tracing::{debug, info};

#[derive(Debug, Default)]
pub struct GalleryReport {
    pub index: CoverIndex,
    pub downloaded: usize,
}

/// Downloads one cover image per album into a local directory so the
/// viewer page works offline.
pub struct CoverGallery<'a> {
    client: &'a Client,
    fallback: &'a ArtworkChain,
    covers_dir: PathBuf,
    delay: Duration,
}

impl<'a> CoverGallery<'a> {
    /// `fallback` is asked for tracks without a cover URL of their own;
    /// `delay` is slept after each such search.
    pub fn new(client: &'a Client, fallback: &'a ArtworkChain, covers_dir: PathBuf, delay: Duration) -> Self {
        Self {
            client,
            fallback,
            covers_dir,
            delay,
        }
    }

    /// Covers already on disk are reused. Albums whose download fails are
    /// left out of the index and retried for the next playlist that has them.
    pub async fn collect<'p>(
        &self,
        playlists: impl IntoIterator<Item = &'p Playlist>,
    ) -> Result<GalleryReport> {
        tokio::fs::create_dir_all(&self.covers_dir)
            .await
            .with_context(|| format!("failed to create {}", self.covers_dir.display()))?;

        let mut report = GalleryReport::default();

        for playlist in playlists {
            let mut queued = HashSet::new();
            let albums: Vec<_> = playlist
                .tracks
                .iter()
                .filter(|t| {
                    let key = album_key(t);
                    !report.index.contains(&key) && queued.insert(key)
                })
                .collect();

            let mut fetched = 0;
            for track in albums {
                let key = album_key(track);
                let file_name = cover_file_name(&track.artist, &track.album);
                let path = self.covers_dir.join(&file_name);

                if path.exists() {
                    report.index.insert(key, file_name);
                    continue;
                }

                let art_url = match &track.album_cover {
                    Some(url) => Some(url.clone()),
                    None => self.fallback.resolve(&ArtworkQuery::for_track(track)).await,
                };

                if let Some(url) = art_url {
                    match download_image(self.client, &url, &path).await {
                        Ok(()) => {
                            report.index.insert(key, file_name);
                            fetched += 1;
                        }
                        Err(err) => debug!(error = %err, "cover download failed; skipping"),
                    }
                }

                if track.album_cover.is_none() {
                    tokio::time::sleep(self.delay).await;
                }
            }

            if fetched > 0 {
                info!(playlist = %playlist.name, fetched, "downloaded covers");
            }
            report.downloaded += fetched;
        }

        info!(total = report.index.len(), "covers available");
        Ok(report)
    }
}
