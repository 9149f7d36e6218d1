//! HTTP client for fetching a plain-text rendition of a remote terms page.

use thiserror::Error;
use tracing::info;

use crate::clean::{MIN_TEXT_CHARS, clean_text};

/// Default page-to-text proxy. Returns a markdown rendition of any public
/// page via `GET {base}/{url}`.
pub const DEFAULT_PROXY_BASE: &str = "https://r.jina.ai";

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("content proxy returned {status}: {body}")]
    Fetch { status: u16, body: String },
    #[error("extracted text too short ({len} chars, need at least {MIN_TEXT_CHARS})")]
    Extraction { len: usize },
}

/// Fetches and cleans terms-of-service text from a URL.
///
/// Single attempt, no retry: on failure the caller is expected to ask the
/// user to paste the text instead.
pub struct PageFetcher {
    client: reqwest::Client,
    proxy_base: String,
}

impl Default for PageFetcher {
    fn default() -> Self {
        Self::new(DEFAULT_PROXY_BASE.to_string())
    }
}

impl PageFetcher {
    /// Create a fetcher using the given proxy base URL (no trailing slash).
    pub fn new(proxy_base: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            proxy_base: proxy_base.trim_end_matches('/').to_string(),
        }
    }

    /// Fetch the page at `url` and return its cleaned plain text.
    ///
    /// The text is whitespace-collapsed and truncated to
    /// [`crate::clean::MAX_TEXT_CHARS`] chars to bound downstream token
    /// cost. Fails with [`FetchError::Extraction`] if fewer than
    /// [`MIN_TEXT_CHARS`] chars survive cleaning.
    pub async fn fetch_terms(&self, url: &str) -> Result<String, FetchError> {
        let target = normalize_url(url);
        let proxy_url = format!("{}/{}", self.proxy_base, target);

        info!(url = %proxy_url, "fetching terms text");
        let resp = self.client.get(&proxy_url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(FetchError::Fetch {
                status: status.as_u16(),
                body,
            });
        }

        let raw = resp.text().await?;
        let text = clean_text(&raw);
        if text.chars().count() < MIN_TEXT_CHARS {
            return Err(FetchError::Extraction {
                len: text.chars().count(),
            });
        }

        info!(chars = text.len(), "extracted terms text");
        Ok(text)
    }
}

/// Prepend a scheme when the URL has none.
pub fn normalize_url(url: &str) -> String {
    let url = url.trim();
    if url.contains("://") {
        url.to_string()
    } else {
        format!("https://{url}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_url_prepends_scheme() {
        assert_eq!(normalize_url("example.com/terms"), "https://example.com/terms");
        assert_eq!(normalize_url("  example.com  "), "https://example.com");
    }

    #[test]
    fn normalize_url_keeps_existing_scheme() {
        assert_eq!(normalize_url("http://example.com"), "http://example.com");
        assert_eq!(normalize_url("https://example.com"), "https://example.com");
    }

    #[test]
    fn fetcher_trims_trailing_slash() {
        let fetcher = PageFetcher::new("https://proxy.example/".into());
        assert_eq!(fetcher.proxy_base, "https://proxy.example");
    }
}
