use crate::{ArtworkQuery, ArtworkSource};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tidal_shelf_core::urls;

#[derive(Debug, Deserialize)]
struct SearchResults {
    #[serde(default)]
    results: Vec<AlbumResult>,
}

#[derive(Debug, Deserialize)]
struct AlbumResult {
    #[serde(rename = "artworkUrl100")]
    artwork_url_100: Option<String>,
}

/// Album search on the public iTunes API. Used when a track carries no
/// cover URL of its own.
pub struct ItunesSearch {
    client: Client,
    api_base: String,
}

impl ItunesSearch {
    pub fn new(client: Client, api_base: String) -> Self {
        Self { client, api_base }
    }
}

#[async_trait]
impl ArtworkSource for ItunesSearch {
    fn name(&self) -> &'static str {
        "itunes"
    }

    async fn lookup(&self, query: &ArtworkQuery) -> Result<Option<String>> {
        let url = urls::itunes_album_search_url(&self.api_base, &query.artist, &query.album);

        let found: SearchResults = self
            .client
            .get(&url)
            .send()
            .await
            .context("itunes search request failed")?
            .error_for_status()?
            .json()
            .await
            .context("failed to parse itunes search response")?;

        Ok(found
            .results
            .into_iter()
            .next()
            .and_then(|r| r.artwork_url_100)
            .map(|art| urls::upscale_itunes_artwork(&art)))
    }
}
