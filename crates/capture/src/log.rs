//! Readers for recorded browser traffic. Each yields the completed requests
//! in recording order, ready to be fed to a [`ResponseObserver`].
//!
//! [`ResponseObserver`]: crate::ResponseObserver

use crate::session::CapturedResponse;
use anyhow::{Context, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaptureLogFormat {
    /// Pick by file extension, trying HAR first for anything unknown.
    #[default]
    Auto,
    /// HTTP Archive as exported from browser devtools.
    Har,
    /// One `{"url": ..., "body": ...}` object per line.
    Ndjson,
}

#[derive(Deserialize)]
struct Har {
    log: HarLog,
}

#[derive(Deserialize)]
struct HarLog {
    #[serde(default)]
    entries: Vec<HarEntry>,
}

#[derive(Deserialize)]
struct HarEntry {
    request: HarRequest,
    response: HarResponse,
}

#[derive(Deserialize)]
struct HarRequest {
    url: String,
}

#[derive(Deserialize)]
struct HarResponse {
    #[serde(default)]
    status: i64,
    #[serde(default)]
    content: HarContent,
}

#[derive(Deserialize, Default)]
struct HarContent {
    text: Option<String>,
    encoding: Option<String>,
}

#[derive(Deserialize)]
struct NdjsonLine {
    url: String,
    body: Value,
}

pub fn read_capture_log(path: &Path, format: CaptureLogFormat) -> Result<Vec<CapturedResponse>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read capture log {}", path.display()))?;

    let format = match format {
        CaptureLogFormat::Auto => detect_format(path),
        explicit => explicit,
    };

    match format {
        CaptureLogFormat::Har => {
            parse_har(&text).with_context(|| format!("failed to parse HAR {}", path.display()))
        }
        CaptureLogFormat::Ndjson => Ok(parse_ndjson(&text)),
        CaptureLogFormat::Auto => match parse_har(&text) {
            Ok(responses) => Ok(responses),
            Err(err) => {
                debug!(error = %err, "not a HAR file, reading as NDJSON");
                Ok(parse_ndjson(&text))
            }
        },
    }
}

fn detect_format(path: &Path) -> CaptureLogFormat {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("har") => CaptureLogFormat::Har,
        Some("ndjson") | Some("jsonl") => CaptureLogFormat::Ndjson,
        _ => CaptureLogFormat::Auto,
    }
}

/// Entries with an error status or without a recorded body are skipped.
pub fn parse_har(text: &str) -> Result<Vec<CapturedResponse>> {
    let har: Har = serde_json::from_str(text)?;
    let mut out = Vec::with_capacity(har.log.entries.len());

    for entry in har.log.entries {
        if entry.response.status >= 400 {
            debug!(url = %entry.request.url, status = entry.response.status, "skipping error response");
            continue;
        }
        let Some(raw) = entry.response.content.text else {
            continue;
        };
        let body = match entry.response.content.encoding.as_deref() {
            Some("base64") => match decode_base64(&raw) {
                Some(body) => body,
                None => {
                    warn!(url = %entry.request.url, "undecodable base64 response body");
                    continue;
                }
            },
            _ => raw,
        };
        out.push(CapturedResponse::new(entry.request.url, body));
    }

    Ok(out)
}

fn decode_base64(raw: &str) -> Option<String> {
    let bytes = STANDARD.decode(raw.trim()).ok()?;
    String::from_utf8(bytes).ok()
}

/// A `body` given as a JSON string is taken as the raw response text; any
/// other JSON value is the already-parsed response.
pub fn parse_ndjson(text: &str) -> Vec<CapturedResponse> {
    let mut out = Vec::new();
    for (lineno, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<NdjsonLine>(line) {
            Ok(NdjsonLine {
                url,
                body: Value::String(raw),
            }) => out.push(CapturedResponse::new(url, raw)),
            Ok(NdjsonLine { url, body }) => out.push(CapturedResponse::new(url, body.to_string())),
            Err(err) => warn!(line = lineno + 1, error = %err, "skipping bad observation line"),
        }
    }
    out
}
