//! Content fetching from URLs, files, and stdin.
//!
//! Fetch failures are reported as [`ReferentError::FetchFailed`] or
//! [`ReferentError::Timeout`] before any extraction runs, so a missing page is
//! never mistaken for an extraction problem.

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use reqwest::Client;
use tracing::debug;
use url::Url;

use crate::{ReferentError, Result};

/// Browser-like identification sent with page requests.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// HTTP client configuration for fetching web pages.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Request timeout in seconds.
    pub timeout: u64,
    /// User-Agent string.
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self { timeout: 30, user_agent: BROWSER_USER_AGENT.to_string() }
    }
}

/// Parses `url` and checks that it is an absolute http(s) URL.
pub fn validate_url(url: &str) -> Result<Url> {
    let url = url.trim();
    if url.is_empty() {
        return Err(ReferentError::InvalidInput("URL is required".to_string()));
    }

    let parsed = Url::parse(url).map_err(|e| ReferentError::InvalidUrl(format!("{url}: {e}")))?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(ReferentError::InvalidUrl(format!("unsupported scheme {other:?}, expected http or https"))),
    }
}

/// Fetches HTML content from a URL.
///
/// Performs a GET request, follows redirects and respects the configured
/// timeout. Network failures and non-2xx responses become
/// [`ReferentError::FetchFailed`] carrying the upstream status.
pub async fn fetch_url(url: &str, config: &FetchConfig) -> Result<String> {
    let parsed_url = validate_url(url)?;
    let fetch_failed = |status: Option<u16>, reason: String| ReferentError::FetchFailed {
        url: parsed_url.to_string(),
        status,
        reason,
    };

    let client = Client::builder()
        .timeout(Duration::from_secs(config.timeout))
        .build()
        .map_err(|e| fetch_failed(None, e.to_string()))?;

    debug!(url = %parsed_url, "fetching article");

    let response = client
        .get(parsed_url.clone())
        .header("User-Agent", &config.user_agent)
        .header(
            "Accept",
            "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
        )
        .header("Accept-Language", "en-US,en;q=0.9")
        .send()
        .await
        .map_err(|e| {
            if e.is_timeout() {
                ReferentError::Timeout { timeout: config.timeout }
            } else {
                fetch_failed(None, e.to_string())
            }
        })?;

    let status = response.status();
    if !status.is_success() {
        let reason = status.canonical_reason().unwrap_or("unexpected status").to_string();
        return Err(fetch_failed(Some(status.as_u16()), reason));
    }

    response.text().await.map_err(|e| {
        if e.is_timeout() {
            ReferentError::Timeout { timeout: config.timeout }
        } else {
            fetch_failed(Some(status.as_u16()), e.to_string())
        }
    })
}

/// Reads HTML content from a local file.
///
/// Callers should validate and sanitize the path when accepting user input.
pub fn fetch_file(path: &str) -> Result<String> {
    let path_buf = PathBuf::from(path);

    if !path_buf.exists() {
        Err(ReferentError::FileNotFound(path_buf))
    } else {
        fs::read_to_string(&path_buf).map_err(ReferentError::from)
    }
}

/// Reads HTML content from standard input until EOF.
pub fn fetch_stdin() -> Result<String> {
    use std::io::{self, Read};

    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer).map_err(ReferentError::from)?;

    Ok(buffer)
}
