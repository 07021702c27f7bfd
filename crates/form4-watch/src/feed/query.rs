//! Build the feed request URL from scrape options.

use crate::error::{ScrapeError, ScrapeResult};
use std::collections::BTreeMap;
use url::Url;

/// Caller-supplied feed filters, keyed by option name.
pub type ScrapeOptions = BTreeMap<String, String>;

/// Default query parameters, in the order they are emitted.
const DEFAULT_PARAMS: &[(&str, &str)] = &[
    ("action", "getcurrent"),
    ("type", "4"),
    ("company", ""),
    ("dateb", ""),
    ("owner", "include"),
    ("start", "0"),
    ("count", "40"),
    ("output", "atom"),
];

/// Option keys callers may override, mapped to their query parameter.
const RECOGNIZED: &[(&str, &str)] = &[
    ("type", "type"),
    ("company", "company"),
    ("dateb", "dateb"),
    ("owner", "owner"),
    ("start", "start"),
    ("count", "count"),
    ("cik", "CIK"),
];

/// Build the full feed URL for `options` against `base_url`.
///
/// Unknown option keys are ignored. Parameters already present on the base
/// URL are kept ahead of the generated ones.
pub fn build_query(options: &ScrapeOptions, base_url: &str) -> ScrapeResult<String> {
    let mut url = Url::parse(base_url)
        .map_err(|e| ScrapeError::InvalidQuery(format!("{base_url}: {e}")))?;
    if url.cannot_be_a_base() {
        return Err(ScrapeError::InvalidQuery(format!(
            "{base_url}: not a hierarchical URL"
        )));
    }

    let mut params: Vec<(String, String)> = DEFAULT_PARAMS
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

    for (key, value) in options {
        let Some((_, param)) = RECOGNIZED
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(key))
        else {
            tracing::debug!("ignoring unknown scrape option {key}={value}");
            continue;
        };
        match params.iter_mut().find(|(k, _)| k == param) {
            Some(existing) => existing.1 = value.clone(),
            None => params.push((param.to_string(), value.clone())),
        }
    }

    url.query_pairs_mut().extend_pairs(params.iter());
    Ok(url.to_string())
}
