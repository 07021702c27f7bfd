//! Filing resolution and transaction extraction.

pub mod ownership;
pub mod resolver;

pub use ownership::{extract_filing, records_for, ExtractedFiling};
pub use resolver::{derive_document_url, locate_document_filename, FilingResolver};
