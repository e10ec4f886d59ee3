use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tidal_shelf_artwork::http::build_client;
use tidal_shelf_artwork::{build_artwork_chain, CoverEnricher, CoverGallery};
use tidal_shelf_capture::{read_capture_log, CaptureLogFormat};
use tidal_shelf_core::library::write_playlist;
use tidal_shelf_core::AppConfig;
use tidal_shelf_viewer::{load_library, render_page};
use tracing::{info, warn};

mod replay;

#[derive(Parser, Debug)]
#[command(
    name = "tidal-shelf",
    about = "Captured playlist traffic -> playlist files -> offline HTML viewer"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Rebuild playlists from a recorded browsing session and save them.
    Capture {
        input: PathBuf,
        #[arg(long, value_enum, default_value_t = LogFormat::Auto)]
        format: LogFormat,
        /// Defaults to the configured playlist directory.
        #[arg(long)]
        out_dir: Option<PathBuf>,
        /// Print the playlists as JSON instead of writing files.
        #[arg(long)]
        stdout: bool,
    },
    /// Show what a recorded session captured for the last playlist.
    Status {
        input: PathBuf,
        #[arg(long, value_enum, default_value_t = LogFormat::Auto)]
        format: LogFormat,
    },
    /// Add album cover URLs to saved playlists.
    Covers,
    /// Download covers and generate the HTML viewer.
    Viewer,
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    Init,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogFormat {
    Auto,
    Har,
    Ndjson,
}

impl From<LogFormat> for CaptureLogFormat {
    fn from(f: LogFormat) -> Self {
        match f {
            LogFormat::Auto => CaptureLogFormat::Auto,
            LogFormat::Har => CaptureLogFormat::Har,
            LogFormat::Ndjson => CaptureLogFormat::Ndjson,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let cfg_path = cli.config.unwrap_or_else(default_config_path);

    if let Commands::Config {
        action: ConfigAction::Init,
    } = cli.command
    {
        init_config(&cfg_path)?;
        println!("Initialized config at {}", cfg_path.display());
        return Ok(());
    }

    let cfg = load_or_default(&cfg_path)?;
    init_logging(&cfg.log_level);

    match cli.command {
        Commands::Capture {
            input,
            format,
            out_dir,
            stdout,
        } => {
            let out_dir = out_dir.unwrap_or_else(|| cfg.library.playlist_dir.clone());
            capture(&input, format.into(), &out_dir, stdout)
        }
        Commands::Status { input, format } => status(&input, format.into()),
        Commands::Covers => covers(&cfg).await,
        Commands::Viewer => viewer(&cfg).await,
        Commands::Config { .. } => Ok(()),
    }
}

fn capture(input: &Path, format: CaptureLogFormat, out_dir: &Path, stdout: bool) -> Result<()> {
    let responses = read_capture_log(input, format)?;
    info!(responses = responses.len(), input = %input.display(), "replaying capture log");

    let outcome = replay::replay(&responses);

    let mut stems = HashSet::new();
    for playlist in &outcome.exported {
        if stdout {
            println!("{}", serde_json::to_string_pretty(playlist)?);
        } else {
            let stem = unique_stem(&mut stems, playlist.file_stem());
            let path = out_dir.join(format!("{stem}.json"));
            write_playlist(&path, playlist)?;
            println!(
                "Saved {} ({} tracks) to {}",
                playlist.name,
                playlist.total_tracks,
                path.display()
            );
        }
    }

    if let Some(pending) = outcome.pending {
        let hint = "open the playlist again and wait until it has loaded before recording";
        if outcome.exported.is_empty() {
            return Err(anyhow!("{} ({} item pages captured); {hint}", pending.error, pending.responses));
        }
        warn!(
            error = %pending.error,
            pages = pending.responses,
            "last playlist was not exported; {hint}"
        );
    } else if outcome.exported.is_empty() {
        println!("No playlists found in {}", input.display());
    }

    Ok(())
}

/// Playlists sharing a name within one capture get numbered files.
fn unique_stem(taken: &mut HashSet<String>, stem: String) -> String {
    if taken.insert(stem.clone()) {
        return stem;
    }
    let mut n = 2;
    loop {
        let candidate = format!("{stem}-{n}");
        if taken.insert(candidate.clone()) {
            warn!(name = %stem, file = %candidate, "playlist name already used in this capture");
            return candidate;
        }
        n += 1;
    }
}

fn status(input: &Path, format: CaptureLogFormat) -> Result<()> {
    let responses = read_capture_log(input, format)?;
    let status = replay::replay_status(&responses);

    println!("capturing: {}", if status.capturing { "active" } else { "inactive" });
    println!(
        "playlist: {}",
        status.playlist_name.as_deref().unwrap_or("<not yet>")
    );
    println!("tracks captured: {}", status.total_captured);
    println!("api responses: {}", status.responses);
    for (idx, count) in status.pages.iter().enumerate() {
        println!("  response {}: {} tracks", idx + 1, count);
    }

    Ok(())
}

async fn covers(cfg: &AppConfig) -> Result<()> {
    let client = build_client(&cfg.artwork)?;
    let chain = build_artwork_chain(&cfg.artwork.enrich_sources, &cfg.artwork, &client);
    if chain.is_empty() {
        return Err(anyhow!("no usable artwork source in artwork.enrich_sources"));
    }
    info!(sources = ?chain.source_names(), "looking up album covers");

    let enricher = CoverEnricher::new(&chain, Duration::from_millis(cfg.artwork.enrich_delay_ms));
    let report = enricher.enrich_dir(&cfg.library.playlist_dir).await?;

    println!(
        "Updated {} tracks in {} of {} playlists ({} already had covers)",
        report.tracks_updated, report.files_updated, report.files, report.already_covered
    );
    Ok(())
}

async fn viewer(cfg: &AppConfig) -> Result<()> {
    let entries = load_library(&cfg.library.playlist_dir)?;

    let client = build_client(&cfg.artwork)?;
    let chain = build_artwork_chain(&cfg.artwork.viewer_sources, &cfg.artwork, &client);
    let gallery = CoverGallery::new(
        &client,
        &chain,
        cfg.library.covers_dir.clone(),
        Duration::from_millis(cfg.artwork.viewer_delay_ms),
    );
    let report = gallery.collect(entries.iter().map(|e| &e.playlist)).await?;

    let href = covers_href(&cfg.library.covers_dir, &cfg.library.output_html);
    let html = render_page(&cfg.library.page_title, &entries, &report.index, &href);
    std::fs::write(&cfg.library.output_html, html)
        .with_context(|| format!("failed to write {}", cfg.library.output_html.display()))?;

    println!("Generated {}", cfg.library.output_html.display());
    println!("Album covers: {} ({} new)", cfg.library.covers_dir.display(), report.downloaded);
    Ok(())
}

/// The covers directory relative to the page, as used in `<img src>`.
fn covers_href(covers_dir: &Path, output_html: &Path) -> String {
    let page_dir = output_html.parent().unwrap_or_else(|| Path::new(""));
    let relative = covers_dir.strip_prefix(page_dir).unwrap_or(covers_dir);
    relative.to_string_lossy().replace('\\', "/")
}

fn default_config_path() -> PathBuf {
    let base = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    base.join("tidal-shelf").join("config.toml")
}

fn init_config(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create config directory {}", parent.display()))?;
    }
    let cfg = AppConfig::default();
    let toml = toml::to_string_pretty(&cfg)?;
    std::fs::write(path, toml)
        .with_context(|| format!("failed to write config file {}", path.display()))?;
    Ok(())
}

fn load_or_default(path: &Path) -> Result<AppConfig> {
    let mut cfg = if !path.exists() {
        AppConfig::default()
    } else {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        toml::from_str(&data).with_context(|| format!("failed to parse {}", path.display()))?
    };
    apply_env_overrides(&mut cfg);
    Ok(cfg)
}

fn init_logging(log_level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_new(log_level)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init();
}

fn apply_env_overrides(cfg: &mut AppConfig) {
    if let Ok(v) = std::env::var("TIDAL_SHELF_LOG_LEVEL") {
        if !v.trim().is_empty() {
            cfg.log_level = v;
        }
    }
    if let Ok(v) = std::env::var("TIDAL_SHELF_PLAYLIST_DIR") {
        if !v.trim().is_empty() {
            cfg.library.playlist_dir = PathBuf::from(v);
        }
    }
    if let Ok(v) = std::env::var("TIDAL_SHELF_TIDAL_API_BASE") {
        if !v.trim().is_empty() {
            cfg.artwork.tidal_api_base = v;
        }
    }
    if let Ok(v) = std::env::var("TIDAL_SHELF_ITUNES_API_BASE") {
        if !v.trim().is_empty() {
            cfg.artwork.itunes_api_base = v;
        }
    }
    if let Ok(v) = std::env::var("TIDAL_SHELF_TIDAL_TOKEN") {
        if !v.trim().is_empty() {
            cfg.artwork.tidal_token = Some(v);
        }
    }
}
