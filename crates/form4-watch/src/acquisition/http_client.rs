//! Async HTTP client wrapping reqwest.
//!
//! One request per call: no retry and no backoff. A failed fetch ends the
//! caller's pipeline stage, which is the only failure policy the scraper has.

use super::Fetcher;
use crate::error::{ScrapeError, ScrapeResult};
use async_trait::async_trait;
use std::time::Duration;

/// Response from an HTTP GET request.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// Original requested URL.
    pub url: String,
    /// Final URL after redirects.
    pub final_url: String,
    /// HTTP status code.
    pub status: u16,
    /// Content-Type header.
    pub content_type: Option<String>,
    /// Response body as text.
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// HTTP client for feed, index-page and document fetches.
#[derive(Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpClient {
    /// Create a client sending `user_agent` on every request.
    pub fn new(user_agent: &str, timeout_ms: u64) -> ScrapeResult<Self> {
        let timeout = Duration::from_millis(timeout_ms);
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(5))
            .user_agent(user_agent)
            .build()
            .map_err(|e| ScrapeError::Transport {
                url: String::new(),
                message: format!("failed to build HTTP client: {e}"),
            })?;
        Ok(Self { client, timeout })
    }

    /// Perform a single GET request.
    pub async fn get(&self, url: &str) -> ScrapeResult<HttpResponse> {
        let r = self
            .client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| transport(url, e))?;

        let status = r.status().as_u16();
        let final_url = r.url().to_string();
        let content_type = r
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        let body = r.text().await.map_err(|e| transport(url, e))?;

        Ok(HttpResponse {
            url: url.to_string(),
            final_url,
            status,
            content_type,
            body,
        })
    }
}

#[async_trait]
impl Fetcher for HttpClient {
    async fn fetch(&self, url: &str) -> ScrapeResult<String> {
        let resp = self.get(url).await?;
        if !resp.is_success() {
            return Err(ScrapeError::HttpStatus {
                url: url.to_string(),
                status: resp.status,
            });
        }
        tracing::trace!(
            "fetched {} ({} bytes, {})",
            resp.final_url,
            resp.body.len(),
            resp.content_type.as_deref().unwrap_or("unknown type")
        );
        Ok(resp.body)
    }
}

fn transport(url: &str, e: reqwest::Error) -> ScrapeError {
    ScrapeError::Transport {
        url: url.to_string(),
        message: e.to_string(),
    }
}
