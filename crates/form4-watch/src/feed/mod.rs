//! Ownership feed: query construction, atom parsing and entry typing.

pub mod atom;
pub mod entry;
pub mod query;

pub use atom::{parse_feed, RawEntry};
pub use entry::parse_entry;
pub use query::{build_query, ScrapeOptions};
