//! Generic XML document tree.
//!
//! Both the atom feed and the ownership document are parsed into this
//! shape first; typed readers then walk it by element name. Namespace
//! prefixes are dropped, so `<atom:entry>` and `<entry>` look the same.

use crate::error::{ScrapeError, ScrapeResult};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// One element of a parsed XML document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct XmlNode {
    /// Local element name.
    pub name: String,
    /// Attributes as (local name, unescaped value).
    pub attributes: Vec<(String, String)>,
    /// Concatenated text content directly inside this element.
    pub text: String,
    /// Child elements in document order.
    pub children: Vec<XmlNode>,
}

impl XmlNode {
    /// Parse an XML string into its root element.
    ///
    /// `source` is only used to label errors.
    pub fn parse(xml: &str, source: &str) -> ScrapeResult<XmlNode> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);
        let mut buf = Vec::new();

        let mut stack: Vec<XmlNode> = Vec::new();
        let mut root: Option<XmlNode> = None;

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => {
                    stack.push(open_node(&e));
                }
                Ok(Event::Empty(e)) => {
                    let node = open_node(&e);
                    attach(&mut stack, &mut root, node, source)?;
                }
                Ok(Event::End(_)) => {
                    let node = stack
                        .pop()
                        .ok_or_else(|| ScrapeError::malformed(source, "unbalanced end tag"))?;
                    attach(&mut stack, &mut root, node, source)?;
                }
                Ok(Event::Text(e)) => {
                    let text = e
                        .unescape()
                        .map_err(|err| ScrapeError::malformed(source, err))?;
                    if let Some(top) = stack.last_mut() {
                        top.text.push_str(text.trim());
                    }
                }
                Ok(Event::CData(e)) => {
                    if let Some(top) = stack.last_mut() {
                        top.text.push_str(String::from_utf8_lossy(&e).trim());
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(ScrapeError::malformed(
                        source,
                        format!("XML parse error at {}: {e}", reader.buffer_position()),
                    ));
                }
                _ => {}
            }
            buf.clear();
        }

        if let Some(open) = stack.last() {
            return Err(ScrapeError::malformed(
                source,
                format!("unclosed element <{}>", open.name),
            ));
        }
        root.ok_or_else(|| ScrapeError::malformed(source, "no root element"))
    }

    /// First direct child with the given name.
    pub fn child(&self, name: &str) -> Option<&XmlNode> {
        self.children.iter().find(|c| c.name == name)
    }

    /// All direct children with the given name.
    pub fn children<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlNode> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Follow a chain of first-child lookups.
    pub fn path(&self, path: &[&str]) -> Option<&XmlNode> {
        path.iter().try_fold(self, |node, name| node.child(name))
    }

    /// Text at the end of `path`, trimmed; `None` when missing or empty.
    pub fn text_at(&self, path: &[&str]) -> Option<&str> {
        self.path(path)
            .map(|n| n.text.trim())
            .filter(|t| !t.is_empty())
    }

    /// Attribute value by local name.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

fn open_node(e: &BytesStart<'_>) -> XmlNode {
    let name = String::from_utf8_lossy(e.local_name().as_ref()).to_string();
    let attributes = e
        .attributes()
        .flatten()
        .map(|a| {
            let key = String::from_utf8_lossy(a.key.local_name().as_ref()).to_string();
            let value = a
                .unescape_value()
                .map(|v| v.to_string())
                .unwrap_or_else(|_| String::from_utf8_lossy(&a.value).to_string());
            (key, value)
        })
        .collect();
    XmlNode {
        name,
        attributes,
        ..XmlNode::default()
    }
}

fn attach(
    stack: &mut [XmlNode],
    root: &mut Option<XmlNode>,
    node: XmlNode,
    source: &str,
) -> ScrapeResult<()> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(node);
        return Ok(());
    }
    if root.is_some() {
        return Err(ScrapeError::malformed(source, "multiple root elements"));
    }
    *root = Some(node);
    Ok(())
}
