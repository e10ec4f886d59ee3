use serde::{Deserialize, Serialize};
use std::path::PathBuf;

fn default_schema_version() -> u32 {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LibraryConfig {
    pub playlist_dir: PathBuf,
    pub covers_dir: PathBuf,
    pub output_html: PathBuf,
    pub page_title: String,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            playlist_dir: PathBuf::from("playlist"),
            covers_dir: PathBuf::from("covers"),
            output_html: PathBuf::from("playlists.html"),
            page_title: "My Tidal Playlists".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtworkConfig {
    pub tidal_api_base: String,
    pub tidal_token: Option<String>,
    pub itunes_api_base: String,
    pub country_code: String,
    pub search_limit: u32,
    pub enrich_delay_ms: u64,
    pub viewer_delay_ms: u64,
    pub request_timeout_ms: u64,
    pub enrich_sources: Vec<String>,
    pub viewer_sources: Vec<String>,
}

impl Default for ArtworkConfig {
    fn default() -> Self {
        Self {
            tidal_api_base: "https://api.tidal.com/v1".to_string(),
            tidal_token: None,
            itunes_api_base: "https://itunes.apple.com".to_string(),
            country_code: "US".to_string(),
            search_limit: 5,
            enrich_delay_ms: 300,
            viewer_delay_ms: 200,
            request_timeout_ms: 15_000,
            enrich_sources: vec!["tidal".to_string()],
            viewer_sources: vec!["itunes".to_string()],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub log_level: String,
    pub library: LibraryConfig,
    pub artwork: ArtworkConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            log_level: "info".to_string(),
            library: LibraryConfig::default(),
            artwork: ArtworkConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::AppConfig;

    #[test]
    fn partial_file_keeps_defaults_for_missing_keys() {
        let cfg: AppConfig = toml::from_str(
            r#"
            log_level = "debug"

            [artwork]
            country_code = "DE"
            "#,
        )
        .unwrap();

        assert_eq!(cfg.schema_version, 1);
        assert_eq!(cfg.log_level, "debug");
        assert_eq!(cfg.artwork.country_code, "DE");
        assert_eq!(cfg.artwork.enrich_delay_ms, 300);
        assert_eq!(cfg.library.page_title, "My Tidal Playlists");
    }

    #[test]
    fn default_config_survives_toml_round_trip() {
        let text = toml::to_string_pretty(&AppConfig::default()).unwrap();
        let back: AppConfig = toml::from_str(&text).unwrap();
        assert_eq!(back.artwork.viewer_sources, vec!["itunes".to_string()]);
        assert!(back.artwork.tidal_token.is_none());
    }
}
