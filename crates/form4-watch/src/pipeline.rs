//! Scrape orchestrator.
//!
//! One scrape fetches the feed once and fans its entries out, each through
//! its own pipeline:
//!
//! ```text
//! parse -> filter -> locate document -> fetch document -> extract
//!       -> classify -> dedup -> persist
//! ```
//!
//! Every entry ends in exactly one [`EntryOutcome`]. Failures stay local to
//! the entry that hit them. The dedup cache is the only state shared between
//! entries, and its check-and-record step runs under one lock.

use crate::acquisition::Fetcher;
use crate::classify::SignificancePolicy;
use crate::config::ScrapeConfig;
use crate::dedup::{DedupCache, SharedDedupCache};
use crate::feed::{build_query, parse_entry, parse_feed, RawEntry, ScrapeOptions};
use crate::filing::{extract_filing, records_for, FilingResolver};
use crate::persist::Persister;
use crate::types::TransactionRecord;
use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

/// Terminal state of one entry's pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryOutcome {
    /// Not a Form 4 reporting-owner entry, or unparsable.
    Dropped,
    /// Resolution or extraction failed.
    Failed,
    /// Resolved, but no transaction crossed the materiality threshold.
    NotMaterial,
    /// Material, but the filing was already processed recently.
    Suppressed,
    /// Material records forwarded to the persister.
    Persisted(usize),
}

/// Outcome counts for one scrape.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScrapeReport {
    pub entries: usize,
    pub dropped: usize,
    pub failed: usize,
    pub not_material: usize,
    pub suppressed: usize,
    pub persisted_filings: usize,
    pub persisted_records: usize,
}

impl ScrapeReport {
    fn tally(&mut self, outcome: EntryOutcome) {
        self.entries += 1;
        match outcome {
            EntryOutcome::Dropped => self.dropped += 1,
            EntryOutcome::Failed => self.failed += 1,
            EntryOutcome::NotMaterial => self.not_material += 1,
            EntryOutcome::Suppressed => self.suppressed += 1,
            EntryOutcome::Persisted(n) => {
                self.persisted_filings += 1;
                self.persisted_records += n;
            }
        }
    }

    /// Entries that made it past the form/role filter.
    pub fn past_filter(&self) -> usize {
        self.entries - self.dropped
    }
}

/// Wires fetcher, resolver, classifier, dedup cache and persister together.
pub struct Scraper {
    fetcher: Arc<dyn Fetcher>,
    resolver: FilingResolver,
    persister: Arc<dyn Persister>,
    cache: SharedDedupCache,
    policy: SignificancePolicy,
    max_in_flight: usize,
}

impl Scraper {
    /// Build a scraper with a fresh dedup cache sized from `config`.
    pub fn new(
        fetcher: Arc<dyn Fetcher>,
        persister: Arc<dyn Persister>,
        config: &ScrapeConfig,
    ) -> Self {
        Self {
            resolver: FilingResolver::new(fetcher.clone()),
            fetcher,
            persister,
            cache: DedupCache::new(config.dedup_capacity).shared(),
            policy: config.significance_policy(),
            max_in_flight: config.max_in_flight.max(1),
        }
    }

    /// Use an externally owned cache, e.g. one shared with another scraper.
    pub fn with_cache(mut self, cache: SharedDedupCache) -> Self {
        self.cache = cache;
        self
    }

    pub fn cache(&self) -> SharedDedupCache {
        self.cache.clone()
    }

    /// Fetch the feed once and run every entry to a terminal state.
    ///
    /// Never fails: feed and entry errors are logged and counted.
    pub async fn scrape(&self, options: &ScrapeOptions, base_url: &str) -> ScrapeReport {
        let mut report = ScrapeReport::default();

        let query = match build_query(options, base_url) {
            Ok(q) => q,
            Err(e) => {
                tracing::warn!("feed query rejected: {e}");
                return report;
            }
        };

        let entries = self.fetch_feed(&query).await;
        tracing::debug!("feed returned {} entries", entries.len());

        let outcomes: Vec<EntryOutcome> = stream::iter(entries)
            .map(|raw| self.process_entry(raw))
            .buffer_unordered(self.max_in_flight)
            .collect()
            .await;

        for outcome in outcomes {
            report.tally(outcome);
        }

        tracing::info!(
            "scrape complete: entries={} dropped={} failed={} not_material={} suppressed={} persisted={} ({} records)",
            report.entries,
            report.dropped,
            report.failed,
            report.not_material,
            report.suppressed,
            report.persisted_filings,
            report.persisted_records
        );
        report
    }

    /// Scrape every `interval` with the same cache until Ctrl-C.
    pub async fn watch(&self, options: &ScrapeOptions, base_url: &str, interval: Duration) {
        let interval = interval.max(Duration::from_secs(1));
        tracing::info!("watching {base_url} every {}s", interval.as_secs());
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        let shutdown = tokio::signal::ctrl_c();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    tracing::info!("watch stopping");
                    break;
                }
                _ = ticker.tick() => {
                    self.scrape(options, base_url).await;
                }
            }
        }
    }

    async fn fetch_feed(&self, query: &str) -> Vec<RawEntry> {
        let body = match self.fetcher.fetch(query).await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!("feed request failed: {e} (query {query})");
                return Vec::new();
            }
        };
        match parse_feed(&body, query) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!("feed body unusable: {e} (query {query})");
                Vec::new()
            }
        }
    }

    /// Run one raw entry through the whole pipeline.
    pub async fn process_entry(&self, raw: RawEntry) -> EntryOutcome {
        let Some(entry) = parse_entry(&raw) else {
            return EntryOutcome::Dropped;
        };
        if !entry.is_reporting_form4() {
            return EntryOutcome::Dropped;
        }

        let identity = entry.identity();
        let filing_url = entry.filing_url.clone();
        let resolved = match self.resolver.resolve(entry).await {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!("resolve failed for {identity}: {e} (filing {filing_url})");
                return EntryOutcome::Failed;
            }
        };

        let extracted = match extract_filing(&resolved) {
            Ok(x) => x,
            Err(e) => {
                tracing::warn!("extract failed for {identity}: {e}");
                return EntryOutcome::Failed;
            }
        };

        let material: Vec<TransactionRecord> = records_for(&resolved, &extracted)
            .into_iter()
            .filter(|r| self.policy.classify(r))
            .collect();
        if material.is_empty() {
            tracing::debug!("{identity}: no material transaction");
            return EntryOutcome::NotMaterial;
        }

        {
            let mut cache = self.cache.lock().await;
            if cache.seen(&identity) {
                tracing::debug!("{identity}: already processed, suppressing");
                return EntryOutcome::Suppressed;
            }
            cache.record(identity.clone());
        }

        for record in &material {
            self.persist(record).await;
        }
        EntryOutcome::Persisted(material.len())
    }

    async fn persist(&self, record: &TransactionRecord) {
        tracing::info!(
            "material {} {} by {}: {} {} ({})",
            record.kind.as_str(),
            record.ticker,
            record.reporter,
            record.transaction_code,
            record.formatted_amount(),
            record.identity()
        );
        if let Err(e) = self.persister.save_transaction(record).await {
            tracing::warn!("save failed for {}: {e:#}", record.identity());
        }
        if let Err(e) = self.persister.update_ticker(&record.ticker_update()).await {
            tracing::warn!("ticker update failed for {}: {e:#}", record.ticker);
        }
    }
}
