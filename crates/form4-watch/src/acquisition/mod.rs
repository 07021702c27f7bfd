//! Network acquisition boundary.
//!
//! The pipeline only ever sees the [`Fetcher`] trait: one URL in, one
//! decoded body out. [`HttpClient`] is the reqwest-backed implementation.

pub mod http_client;

pub use http_client::{HttpClient, HttpResponse};

use crate::error::ScrapeResult;
use async_trait::async_trait;

/// Fetches the body of a URL as text.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Issue exactly one request for `url`.
    ///
    /// Connection failures, timeouts and non-2xx statuses are errors.
    async fn fetch(&self, url: &str) -> ScrapeResult<String>;
}
