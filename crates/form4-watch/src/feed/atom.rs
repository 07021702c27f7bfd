//! Parse the atom feed into raw entries.

use crate::error::{ScrapeError, ScrapeResult};
use crate::xml::XmlNode;

/// One `<entry>` of the feed, before any interpretation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawEntry {
    pub title: String,
    /// `href` of the alternate link (or the first link with an href).
    pub link: String,
    /// `term` of the category element (the form type).
    pub category: Option<String>,
    pub id: String,
    pub updated: Option<String>,
    pub summary: Option<String>,
}

/// Parse a feed body into its entries.
///
/// A body whose root is not `<feed>` is malformed; a feed without entries
/// yields an empty list.
pub fn parse_feed(body: &str, source: &str) -> ScrapeResult<Vec<RawEntry>> {
    let root = XmlNode::parse(body, source)?;
    if root.name != "feed" {
        return Err(ScrapeError::malformed(
            source,
            format!("expected <feed> root, found <{}>", root.name),
        ));
    }
    Ok(root.children("entry").map(raw_entry).collect())
}

fn raw_entry(node: &XmlNode) -> RawEntry {
    let link = node
        .children("link")
        .find(|l| matches!(l.attr("rel"), None | Some("alternate")) && l.attr("href").is_some())
        .or_else(|| node.children("link").find(|l| l.attr("href").is_some()))
        .and_then(|l| l.attr("href"))
        .unwrap_or_default()
        .to_string();

    RawEntry {
        title: node.text_at(&["title"]).unwrap_or_default().to_string(),
        link,
        category: node
            .child("category")
            .and_then(|c| c.attr("term"))
            .map(|t| t.trim().to_string()),
        id: node.text_at(&["id"]).unwrap_or_default().to_string(),
        updated: node.text_at(&["updated"]).map(str::to_string),
        summary: node.text_at(&["summary"]).map(str::to_string),
    }
}
