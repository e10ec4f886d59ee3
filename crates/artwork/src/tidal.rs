use crate::{ArtworkQuery, ArtworkSource};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tidal_shelf_core::{urls, ArtworkConfig};

#[derive(Debug, Deserialize)]
struct SearchPage {
    #[serde(default)]
    items: Vec<SearchTrack>,
}

#[derive(Debug, Deserialize)]
struct SearchTrack {
    album: Option<SearchAlbum>,
}

#[derive(Debug, Deserialize)]
struct SearchAlbum {
    title: Option<String>,
    cover: Option<String>,
}

/// Track search on the Tidal catalogue API, matched back to the wanted
/// album by name.
pub struct TidalSearch {
    client: Client,
    api_base: String,
    token: Option<String>,
    limit: u32,
    country_code: String,
}

impl TidalSearch {
    pub fn from_config(client: Client, cfg: &ArtworkConfig) -> Self {
        Self {
            client,
            api_base: cfg.tidal_api_base.clone(),
            token: cfg.tidal_token.clone(),
            limit: cfg.search_limit,
            country_code: cfg.country_code.clone(),
        }
    }
}

#[async_trait]
impl ArtworkSource for TidalSearch {
    fn name(&self) -> &'static str {
        "tidal"
    }

    async fn lookup(&self, query: &ArtworkQuery) -> Result<Option<String>> {
        let url = urls::tidal_track_search_url(
            &self.api_base,
            &query.artist,
            &query.title,
            self.limit,
            &self.country_code,
        );

        let mut request = self.client.get(&url);
        if let Some(token) = &self.token {
            request = request.header("x-tidal-token", token);
        }

        let page: SearchPage = request
            .send()
            .await
            .context("tidal search request failed")?
            .error_for_status()?
            .json()
            .await
            .context("failed to parse tidal search response")?;

        Ok(best_match(&page.items, &query.album)
            .and_then(|track| track.album.as_ref())
            .and_then(|album| album.cover.as_deref())
            .filter(|cover| !cover.is_empty())
            .map(urls::tidal_cover_url))
    }
}

/// The first result whose album title contains the wanted album, or is
/// contained in it; otherwise the first result.
fn best_match<'a>(items: &'a [SearchTrack], album: &str) -> Option<&'a SearchTrack> {
    let wanted = album.to_lowercase();
    items
        .iter()
        .find(|item| {
            item.album
                .as_ref()
                .and_then(|a| a.title.as_deref())
                .map(str::to_lowercase)
                .is_some_and(|title| title.contains(&wanted) || wanted.contains(&title))
        })
        .or_else(|| items.first())
}

#[cfg(test)]
mod tests {
    use super::{best_match, SearchPage};
    use serde_json::json;

    fn page() -> SearchPage {
        serde_json::from_value(json!({
            "items": [
                {"album": {"title": "Greatest Hits", "cover": "g-h"}},
                {"album": {"title": "Random Access Memories (Deluxe)", "cover": "r-a-m"}},
                {"album": null}
            ]
        }))
        .unwrap()
    }

    #[test]
    fn prefers_album_containment_either_way() {
        let page = page();
        let hit = best_match(&page.items, "random access memories").unwrap();
        assert_eq!(hit.album.as_ref().unwrap().cover.as_deref(), Some("r-a-m"));

        let hit = best_match(&page.items, "Greatest Hits Vol. 2").unwrap();
        assert_eq!(hit.album.as_ref().unwrap().cover.as_deref(), Some("g-h"));
    }

    #[test]
    fn falls_back_to_first_result() {
        let page = page();
        let hit = best_match(&page.items, "Something Else").unwrap();
        assert_eq!(hit.album.as_ref().unwrap().cover.as_deref(), Some("g-h"));
        assert!(best_match(&[], "x").is_none());
    }
}
