//! Two-hop resolution: filing index page, then the ownership document.
//!
//! Stage A fetches the index page and takes the text of the first link in
//! the filing table as the document filename. Stage B fetches that document
//! from the same directory and parses it. Any failure ends resolution for
//! the entry; there is no alternative filename strategy.

use crate::acquisition::Fetcher;
use crate::error::{ScrapeError, ScrapeResult};
use crate::types::{FeedEntry, ResolvedFiling};
use crate::xml::XmlNode;
use scraper::{Html, Selector};
use std::sync::Arc;
use url::Url;

/// First anchor inside a filing-table row.
const DOCUMENT_LINK_SELECTOR: &str = ".blueRow a";

/// Root element every ownership document carries.
pub const OWNERSHIP_ROOT: &str = "ownershipDocument";

/// Resolves feed entries into parsed ownership documents.
#[derive(Clone)]
pub struct FilingResolver {
    fetcher: Arc<dyn Fetcher>,
}

impl FilingResolver {
    pub fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        Self { fetcher }
    }

    /// Run both stages for `entry`.
    pub async fn resolve(&self, entry: FeedEntry) -> ScrapeResult<ResolvedFiling> {
        let document_url = self.locate_document(&entry.filing_url).await?;
        let document = self.fetch_document(&document_url).await?;
        Ok(ResolvedFiling {
            document,
            document_url,
            source: entry,
        })
    }

    /// Stage A: index page to document address.
    pub async fn locate_document(&self, index_url: &str) -> ScrapeResult<String> {
        let html = self.fetcher.fetch(index_url).await?;
        let filename = locate_document_filename(&html)
            .ok_or_else(|| ScrapeError::malformed(index_url, "no document link in filing table"))?;
        derive_document_url(index_url, &filename)
    }

    /// Stage B: fetch and parse the ownership document.
    pub async fn fetch_document(&self, document_url: &str) -> ScrapeResult<XmlNode> {
        let body = self.fetcher.fetch(document_url).await?;
        let root = XmlNode::parse(&body, document_url)?;
        if root.name != OWNERSHIP_ROOT {
            return Err(ScrapeError::MissingOwnershipDocument {
                url: document_url.to_string(),
            });
        }
        Ok(root)
    }
}

/// Text of the first filing-table link, trimmed.
pub fn locate_document_filename(html: &str) -> Option<String> {
    let selector = Selector::parse(DOCUMENT_LINK_SELECTOR).ok()?;
    let document = Html::parse_document(html);
    let text = document
        .select(&selector)
        .next()?
        .text()
        .collect::<String>();
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

/// Replace the last path segment of `index_url` with `filename`.
///
/// Query string and fragment of the index URL are dropped.
pub fn derive_document_url(index_url: &str, filename: &str) -> ScrapeResult<String> {
    if filename.contains('/') || filename == "." || filename == ".." {
        return Err(ScrapeError::malformed(
            index_url,
            format!("unexpected document filename {filename:?}"),
        ));
    }
    let mut url = Url::parse(index_url).map_err(|e| ScrapeError::malformed(index_url, e))?;
    url.path_segments_mut()
        .map_err(|_| ScrapeError::malformed(index_url, "index URL has no path"))?
        .pop()
        .push(filename);
    url.set_query(None);
    url.set_fragment(None);
    Ok(url.to_string())
}
