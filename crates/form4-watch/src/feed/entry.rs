//! Turn a raw feed entry into a typed [`FeedEntry`].

use super::atom::RawEntry;
use crate::types::FeedEntry;
use regex::Regex;
use std::sync::OnceLock;

/// `"<form> - <name> (<cik>) (<role>)"`
fn title_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*(?P<form>\S+)\s+-\s+(?P<name>.+?)\s+\((?P<cik>\d{1,10})\)\s+\((?P<role>[^()]+)\)\s*$")
            .expect("title regex is valid")
    })
}

fn accession_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d{10}-\d{2}-\d{6}").expect("accession regex is valid"))
}

/// Parse one raw entry.
///
/// Returns `None` when the title does not carry a name, CIK and role, or
/// when no accession number or filing link can be found.
pub fn parse_entry(raw: &RawEntry) -> Option<FeedEntry> {
    let caps = title_regex().captures(&raw.title)?;

    let form_type = raw
        .category
        .as_deref()
        .filter(|c| !c.is_empty())
        .unwrap_or(&caps["form"])
        .to_string();

    let filing_url = raw.link.trim();
    if filing_url.is_empty() {
        return None;
    }

    let accession_number = raw
        .id
        .split_once("accession-number=")
        .map(|(_, acc)| acc.trim().to_string())
        .filter(|acc| !acc.is_empty())
        .or_else(|| {
            let filename = filing_url.rsplit('/').next().unwrap_or_default();
            accession_regex()
                .find(filename)
                .map(|m| m.as_str().to_string())
        })?;

    Some(FeedEntry {
        reporter_name: caps["name"].trim().to_string(),
        form_type,
        role: caps["role"].trim().to_string(),
        cik: caps["cik"].to_string(),
        filing_url: filing_url.to_string(),
        accession_number,
    })
}
