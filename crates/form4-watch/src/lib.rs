// Copyright 2026 Form4 Watch Contributors
// SPDX-License-Identifier: Apache-2.0

//! Form4 Watch library — insider-ownership feed watcher.
//!
//! Pulls the current ownership-disclosure feed, resolves each Form 4 entry
//! through its filing index page to the structured ownership document,
//! keeps the material transactions and forwards them to a [`Persister`],
//! suppressing filings already seen in a bounded recent window.

pub mod acquisition;
pub mod classify;
pub mod config;
pub mod dedup;
pub mod error;
pub mod feed;
pub mod filing;
pub mod persist;
pub mod pipeline;
pub mod types;
pub mod xml;

pub use acquisition::{Fetcher, HttpClient};
pub use classify::SignificancePolicy;
pub use config::ScrapeConfig;
pub use dedup::{DedupCache, SharedDedupCache};
pub use error::{ScrapeError, ScrapeResult};
pub use persist::{JsonlPersister, LogPersister, Persister};
pub use pipeline::{EntryOutcome, ScrapeReport, Scraper};
pub use types::{
    FeedEntry, FilingIdentity, ResolvedFiling, TickerUpdate, TransactionKind, TransactionRecord,
};
