//! Shared fixtures: an in-memory fetcher, a recording persister and
//! builders for feed, index-page and ownership-document bodies.

#![allow(dead_code)]

use async_trait::async_trait;
use form4_watch::{
    Fetcher, Persister, ScrapeError, ScrapeResult, TickerUpdate, TransactionRecord,
};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::Mutex;

pub const BASE_URL: &str = "https://feed.test/cgi-bin/browse-edgar";

// ── Fetcher ──

/// Serves canned bodies by exact URL; the feed is matched by prefix.
#[derive(Default)]
pub struct FakeFetcher {
    feed: Option<String>,
    pages: HashMap<String, String>,
    failing: Vec<String>,
    delay: Option<Duration>,
    requests: Mutex<Vec<String>>,
}

impl FakeFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_feed(mut self, body: String) -> Self {
        self.feed = Some(body);
        self
    }

    pub fn with_page(mut self, url: &str, body: String) -> Self {
        self.pages.insert(url.to_string(), body);
        self
    }

    pub fn failing(mut self, url: &str) -> Self {
        self.failing.push(url.to_string());
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub async fn requests(&self) -> Vec<String> {
        self.requests.lock().await.clone()
    }

    pub async fn request_count(&self, url: &str) -> usize {
        self.requests
            .lock()
            .await
            .iter()
            .filter(|u| u.as_str() == url)
            .count()
    }
}

#[async_trait]
impl Fetcher for FakeFetcher {
    async fn fetch(&self, url: &str) -> ScrapeResult<String> {
        self.requests.lock().await.push(url.to_string());
        if let Some(d) = self.delay {
            tokio::time::sleep(d).await;
        }
        let transport = || ScrapeError::Transport {
            url: url.to_string(),
            message: "connection refused".to_string(),
        };
        if self.failing.iter().any(|f| f == url) {
            return Err(transport());
        }
        if url.starts_with(BASE_URL) {
            return self.feed.clone().ok_or_else(transport);
        }
        self.pages.get(url).cloned().ok_or_else(transport)
    }
}

// ── Persister ──

#[derive(Default)]
pub struct RecordingPersister {
    pub records: Mutex<Vec<TransactionRecord>>,
    pub tickers: Mutex<Vec<TickerUpdate>>,
}

impl RecordingPersister {
    pub async fn records(&self) -> Vec<TransactionRecord> {
        self.records.lock().await.clone()
    }

    pub async fn tickers(&self) -> Vec<TickerUpdate> {
        self.tickers.lock().await.clone()
    }
}

#[async_trait]
impl Persister for RecordingPersister {
    async fn save_transaction(&self, record: &TransactionRecord) -> anyhow::Result<()> {
        self.records.lock().await.push(record.clone());
        Ok(())
    }

    async fn update_ticker(&self, update: &TickerUpdate) -> anyhow::Result<()> {
        self.tickers.lock().await.push(update.clone());
        Ok(())
    }
}

// ── Body builders ──

/// One feed entry referencing a filing.
pub struct EntrySpec {
    pub form: &'static str,
    pub name: String,
    pub cik: String,
    pub role: &'static str,
    pub accession: String,
    pub index_url: String,
}

impl EntrySpec {
    /// A form 4 reporting-owner entry under `host`.
    pub fn reporting(host: &str, n: u32) -> Self {
        let cik = format!("{:010}", 1_000_000 + n);
        let accession = format!("0001209191-24-{n:06}");
        let index_url = format!(
            "{host}/Archives/edgar/data/{}/{}/{accession}-index.htm",
            1_000_000 + n,
            accession.replace('-', "")
        );
        Self {
            form: "4",
            name: format!("Insider Number{n}"),
            cik,
            role: "Reporting",
            accession,
            index_url,
        }
    }

    pub fn issuer_of(other: &EntrySpec) -> Self {
        Self {
            form: "4",
            name: "Acme Corp".to_string(),
            cik: "0000999999".to_string(),
            role: "Issuer",
            accession: other.accession.clone(),
            index_url: other.index_url.clone(),
        }
    }

    /// Address the resolver derives for `filename`.
    pub fn document_url(&self, filename: &str) -> String {
        let (dir, _) = self.index_url.rsplit_once('/').unwrap();
        format!("{dir}/{filename}")
    }
}

pub fn feed(entries: &[&EntrySpec]) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="ISO-8859-1" ?>
<feed xmlns="http://www.w3.org/2005/Atom">
<title>Latest Filings</title>
<updated>2024-01-18T12:00:00-05:00</updated>
"#,
    );
    for e in entries {
        xml.push_str(&format!(
            r#"<entry>
<title>{form} - {name} ({cik}) ({role})</title>
<link rel="alternate" type="text/html" href="{url}"/>
<summary type="html"> &lt;b&gt;Filed:&lt;/b&gt; 2024-01-18 &lt;b&gt;AccNo:&lt;/b&gt; {acc}</summary>
<updated>2024-01-18T11:59:48-05:00</updated>
<category scheme="https://www.sec.gov/" label="form type" term="{form}"/>
<id>urn:tag:sec.gov,2008:accession-number={acc}</id>
</entry>
"#,
            form = e.form,
            name = e.name,
            cik = e.cik,
            role = e.role,
            url = e.index_url,
            acc = e.accession,
        ));
    }
    xml.push_str("</feed>\n");
    xml
}

pub fn index_page(filename: &str) -> String {
    format!(
        r#"<html><body><div id="formDiv">
<table class="tableFile" summary="Document Format Files">
<tr><th scope="col">Seq</th><th scope="col">Description</th><th scope="col">Document</th></tr>
<tr class="blueRow"><td>1</td><td>FORM 4</td><td><a href="/x/xslF345X05/{filename}">{filename}</a></td></tr>
<tr><td>&nbsp;</td><td>Complete submission text file</td><td><a href="/x/full.txt">full.txt</a></td></tr>
</table></div></body></html>"#
    )
}

/// `(code, shares, price, acquired_or_disposed)`
pub type Row = (&'static str, f64, f64, &'static str);

pub fn ownership_document(non_derivative: &[Row], derivative: &[Row]) -> String {
    fn rows(tag: &str, rows: &[Row]) -> String {
        rows.iter()
            .map(|(code, shares, price, ad)| {
                format!(
                    "<{tag}>\
                     <securityTitle><value>Common Stock</value></securityTitle>\
                     <transactionDate><value>2024-01-16</value></transactionDate>\
                     <transactionCoding><transactionFormType>4</transactionFormType>\
                     <transactionCode>{code}</transactionCode>\
                     <equitySwapInvolved>0</equitySwapInvolved></transactionCoding>\
                     <transactionAmounts>\
                     <transactionShares><value>{shares}</value></transactionShares>\
                     <transactionPricePerShare><value>{price}</value></transactionPricePerShare>\
                     <transactionAcquiredDisposedCode><value>{ad}</value></transactionAcquiredDisposedCode>\
                     </transactionAmounts></{tag}>"
                )
            })
            .collect()
    }

    format!(
        r#"<?xml version="1.0"?>
<ownershipDocument>
<schemaVersion>X0508</schemaVersion>
<documentType>4</documentType>
<periodOfReport>2024-01-16</periodOfReport>
<issuer>
<issuerCik>0000999999</issuerCik>
<issuerName>Acme Corp</issuerName>
<issuerTradingSymbol>ACME</issuerTradingSymbol>
</issuer>
<reportingOwner>
<reportingOwnerRelationship>
<isDirector>0</isDirector>
<isOfficer>1</isOfficer>
<officerTitle>Chief Financial Officer</officerTitle>
</reportingOwnerRelationship>
</reportingOwner>
<nonDerivativeTable>{}</nonDerivativeTable>
<derivativeTable>{}</derivativeTable>
</ownershipDocument>"#,
        rows("nonDerivativeTransaction", non_derivative),
        rows("derivativeTransaction", derivative)
    )
}
