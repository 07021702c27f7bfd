//! Error taxonomy for the scrape pipeline.
//!
//! Every variant is local to one stage of one entry: the orchestrator logs
//! it and ends that entry's pipeline, never the whole scrape.

/// All errors raised while fetching, parsing and resolving filings.
#[derive(thiserror::Error, Debug)]
pub enum ScrapeError {
    #[error("transport error for {url}: {message}")]
    Transport { url: String, message: String },

    #[error("HTTP {status} from {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("malformed document at {url}: {reason}")]
    MalformedDocument { url: String, reason: String },

    #[error("no ownershipDocument in {url}")]
    MissingOwnershipDocument { url: String },

    #[error("invalid query: {0}")]
    InvalidQuery(String),
}

impl ScrapeError {
    /// Build a malformed-document error for `url`.
    pub fn malformed(url: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        ScrapeError::MalformedDocument {
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    /// True for network-level failures (connection, timeout, non-2xx).
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            ScrapeError::Transport { .. } | ScrapeError::HttpStatus { .. }
        )
    }

    /// The URL the failure is attributed to, when there is one.
    pub fn url(&self) -> Option<&str> {
        match self {
            ScrapeError::Transport { url, .. }
            | ScrapeError::HttpStatus { url, .. }
            | ScrapeError::MalformedDocument { url, .. }
            | ScrapeError::MissingOwnershipDocument { url } => Some(url),
            ScrapeError::InvalidQuery(_) => None,
        }
    }
}

pub type ScrapeResult<T> = Result<T, ScrapeError>;
