//! Persistence boundary for accepted transactions.
//!
//! Both calls are fire-and-forget for the pipeline: a returned error is
//! logged and nothing else happens.

use crate::types::{TickerUpdate, TransactionRecord};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

/// Destination for material transactions.
#[async_trait]
pub trait Persister: Send + Sync {
    /// Store one material transaction.
    async fn save_transaction(&self, record: &TransactionRecord) -> Result<()>;
    /// Mark the record's ticker as recently active.
    async fn update_ticker(&self, update: &TickerUpdate) -> Result<()>;
}

/// Persister that only emits log lines.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogPersister;

#[async_trait]
impl Persister for LogPersister {
    async fn save_transaction(&self, record: &TransactionRecord) -> Result<()> {
        tracing::info!(
            "transaction {} {} by {} ({}): code={} amount={} price={} kind={} accession={} url={}",
            record.ticker,
            record.company,
            record.reporter,
            record.reporter_title,
            record.transaction_code,
            record.formatted_amount(),
            record.formatted_price(),
            record.kind.as_str(),
            record.accession_number,
            record.url
        );
        Ok(())
    }

    async fn update_ticker(&self, update: &TickerUpdate) -> Result<()> {
        tracing::debug!(
            "ticker {} ({}) updated {}",
            update.ticker,
            update.company,
            update
                .last_update
                .map(|d| d.to_string())
                .unwrap_or_else(|| "-".to_string())
        );
        Ok(())
    }
}

#[derive(Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
enum SinkLine<'a> {
    Transaction {
        recorded_at: DateTime<Utc>,
        #[serde(flatten)]
        record: &'a TransactionRecord,
    },
    Ticker {
        recorded_at: DateTime<Utc>,
        #[serde(flatten)]
        update: &'a TickerUpdate,
    },
}

/// Appends one JSON object per call to a file.
pub struct JsonlPersister {
    path: PathBuf,
    file: Mutex<tokio::fs::File>,
}

impl JsonlPersister {
    /// Open `path` for appending, creating it and its parent directory.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .with_context(|| format!("failed to open {}", path.display()))?;
        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn append(&self, line: &SinkLine<'_>) -> Result<()> {
        let mut json = serde_json::to_vec(line)?;
        json.push(b'\n');
        let mut file = self.file.lock().await;
        file.write_all(&json)
            .await
            .with_context(|| format!("failed to write {}", self.path.display()))?;
        file.flush().await?;
        Ok(())
    }
}

#[async_trait]
impl Persister for JsonlPersister {
    async fn save_transaction(&self, record: &TransactionRecord) -> Result<()> {
        self.append(&SinkLine::Transaction {
            recorded_at: Utc::now(),
            record,
        })
        .await
    }

    async fn update_ticker(&self, update: &TickerUpdate) -> Result<()> {
        self.append(&SinkLine::Ticker {
            recorded_at: Utc::now(),
            update,
        })
        .await
    }
}
