use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use tidal_shelf_core::{ArtworkConfig, Track};
use tracing::{debug, warn};

pub mod enrich;
pub mod gallery;
pub mod http;
pub mod itunes;
pub mod tidal;

pub use enrich::{CoverEnricher, EnrichReport};
pub use gallery::{CoverGallery, GalleryReport};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtworkQuery {
    pub artist: String,
    pub title: String,
    pub album: String,
}

impl ArtworkQuery {
    pub fn for_track(track: &Track) -> Self {
        Self {
            artist: track.artist.clone(),
            title: track.title.clone(),
            album: track.album.clone(),
        }
    }
}

/// A remote catalogue that can answer "what does this album cover look
/// like". `Ok(None)` means the catalogue had no answer.
#[async_trait]
pub trait ArtworkSource: Send + Sync {
    fn name(&self) -> &'static str;
    async fn lookup(&self, query: &ArtworkQuery) -> Result<Option<String>>;
}

pub struct ArtworkChain {
    sources: Vec<Box<dyn ArtworkSource>>,
}

impl ArtworkChain {
    pub fn new(sources: Vec<Box<dyn ArtworkSource>>) -> Self {
        Self { sources }
    }

    /// First cover URL any source returns. Source failures are not
    /// propagated; a track without artwork is not worth aborting a batch.
    pub async fn resolve(&self, query: &ArtworkQuery) -> Option<String> {
        for source in &self.sources {
            match source.lookup(query).await {
                Ok(Some(url)) => return Some(url),
                Ok(None) => {
                    debug!(source = source.name(), artist = %query.artist, album = %query.album, "no artwork found");
                }
                Err(err) => {
                    debug!(source = source.name(), error = %err, "artwork lookup failed");
                }
            }
        }
        None
    }

    pub fn source_names(&self) -> Vec<&'static str> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

pub fn build_artwork_chain(priority: &[String], cfg: &ArtworkConfig, client: &Client) -> ArtworkChain {
    let mut sources: Vec<Box<dyn ArtworkSource>> = Vec::new();

    for item in priority {
        match item.as_str() {
            "tidal" => sources.push(Box::new(tidal::TidalSearch::from_config(client.clone(), cfg))),
            "itunes" => sources.push(Box::new(itunes::ItunesSearch::new(
                client.clone(),
                cfg.itunes_api_base.clone(),
            ))),
            other => warn!(source = other, "unknown artwork source in config; ignoring"),
        }
    }

    ArtworkChain::new(sources)
}

#[cfg(test)]
mod tests {
    use super::{build_artwork_chain, ArtworkChain, ArtworkQuery, ArtworkSource};
    use anyhow::{anyhow, Result};
    use async_trait::async_trait;
    use tidal_shelf_core::ArtworkConfig;

    struct Fixed(Option<&'static str>);

    #[async_trait]
    impl ArtworkSource for Fixed {
        fn name(&self) -> &'static str {
            "fixed"
        }

        async fn lookup(&self, _query: &ArtworkQuery) -> Result<Option<String>> {
            Ok(self.0.map(str::to_string))
        }
    }

    struct Broken;

    #[async_trait]
    impl ArtworkSource for Broken {
        fn name(&self) -> &'static str {
            "broken"
        }

        async fn lookup(&self, _query: &ArtworkQuery) -> Result<Option<String>> {
            Err(anyhow!("connection reset"))
        }
    }

    fn query() -> ArtworkQuery {
        ArtworkQuery {
            artist: "Artist".to_string(),
            title: "Title".to_string(),
            album: "Album".to_string(),
        }
    }

    #[tokio::test]
    async fn chain_skips_failures_and_misses() {
        let chain = ArtworkChain::new(vec![
            Box::new(Broken),
            Box::new(Fixed(None)),
            Box::new(Fixed(Some("https://img/cover.jpg"))),
        ]);

        assert_eq!(chain.resolve(&query()).await.as_deref(), Some("https://img/cover.jpg"));
    }

    #[tokio::test]
    async fn chain_of_failures_resolves_to_nothing() {
        let chain = ArtworkChain::new(vec![Box::new(Broken)]);
        assert!(chain.resolve(&query()).await.is_none());
    }

    #[test]
    fn builder_follows_priority_and_drops_unknown_names() {
        let priority = vec!["itunes".to_string(), "lastfm".to_string(), "tidal".to_string()];
        let chain = build_artwork_chain(&priority, &ArtworkConfig::default(), &reqwest::Client::new());
        assert_eq!(chain.source_names(), vec!["itunes", "tidal"]);
    }
}
