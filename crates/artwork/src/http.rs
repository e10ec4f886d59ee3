use anyhow::{Context, Result};
use reqwest::Client;
use std::path::Path;
use std::time::Duration;
use tidal_shelf_core::ArtworkConfig;
use tracing::debug;

pub fn build_client(cfg: &ArtworkConfig) -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_millis(cfg.request_timeout_ms))
        .connect_timeout(Duration::from_secs(10))
        .user_agent(format!("tidal-shelf/{}", env!("CARGO_PKG_VERSION")))
        .build()
        .context("failed to build HTTP client")
}

/// Fetches `url` into `dest`. The file is only created once the whole body
/// has arrived, and removed again if writing it fails.
pub async fn download_image(client: &Client, url: &str, dest: &Path) -> Result<()> {
    let bytes = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("image request failed: {url}"))?
        .error_for_status()?
        .bytes()
        .await
        .with_context(|| format!("image download interrupted: {url}"))?;

    if let Err(err) = tokio::fs::write(dest, &bytes).await {
        let _ = tokio::fs::remove_file(dest).await;
        return Err(err).with_context(|| format!("failed to write {}", dest.display()));
    }

    debug!(url, dest = %dest.display(), size = bytes.len(), "image downloaded");
    Ok(())
}
