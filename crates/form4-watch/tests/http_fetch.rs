//! The reqwest-backed client against a local mock server.

mod common;

use common::*;
use form4_watch::feed::ScrapeOptions;
use form4_watch::{Fetcher, HttpClient, JsonlPersister, ScrapeConfig, ScrapeError, Scraper};
use std::sync::Arc;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const UA: &str = "form4-watch-test/0.1 (test@example.com)";
const DOC: &str = "wk-form4_1.xml";

fn client() -> Arc<HttpClient> {
    Arc::new(HttpClient::new(UA, 5_000).unwrap())
}

fn url_path(url: &str) -> String {
    url::Url::parse(url).unwrap().path().to_string()
}

/// Mount feed, index page and document for `entry` on `server`.
async fn mount_filing(server: &MockServer, entry: &EntrySpec, doc: String) {
    Mock::given(method("GET"))
        .and(path(url_path(&entry.index_url)))
        .respond_with(ResponseTemplate::new(200).set_body_string(index_page(DOC)))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(url_path(&entry.document_url(DOC))))
        .respond_with(ResponseTemplate::new(200).set_body_string(doc))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_fetch_sends_user_agent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ping"))
        .and(header("user-agent", UA))
        .respond_with(ResponseTemplate::new(200).set_body_string("pong"))
        .expect(1)
        .mount(&server)
        .await;

    let body = client().fetch(&format!("{}/ping", server.uri())).await.unwrap();
    assert_eq!(body, "pong");
}

#[tokio::test]
async fn test_error_status_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/busy"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let err = client()
        .fetch(&format!("{}/busy", server.uri()))
        .await
        .unwrap_err();
    assert!(matches!(err, ScrapeError::HttpStatus { status: 503, .. }));
}

#[tokio::test]
async fn test_scrape_over_http() {
    let server = MockServer::start().await;
    let entry = EntrySpec::reporting(&server.uri(), 1);
    let issuer = EntrySpec::issuer_of(&entry);

    Mock::given(method("GET"))
        .and(path("/cgi-bin/browse-edgar"))
        .and(query_param("action", "getcurrent"))
        .and(query_param("type", "4"))
        .and(query_param("output", "atom"))
        .respond_with(ResponseTemplate::new(200).set_body_string(feed(&[&entry, &issuer])))
        .expect(1)
        .mount(&server)
        .await;
    mount_filing(
        &server,
        &entry,
        ownership_document(&[("S", 20_000.0, 100.0, "D")], &[("P", 1_000.0, 10.0, "A")]),
    )
    .await;

    let persister = Arc::new(RecordingPersister::default());
    let scraper = Scraper::new(client(), persister.clone(), &ScrapeConfig::default());
    let base_url = format!("{}/cgi-bin/browse-edgar", server.uri());
    let report = scraper.scrape(&ScrapeOptions::new(), &base_url).await;

    assert_eq!(report.entries, 2);
    assert_eq!(report.dropped, 1);
    assert_eq!(report.persisted_records, 1);
    let records = persister.records().await;
    assert_eq!(records[0].formatted_amount(), "-2000000.00");
    assert_eq!(records[0].ticker, "ACME");
}

#[tokio::test]
async fn test_index_page_error_fails_only_that_entry() {
    let server = MockServer::start().await;
    let broken = EntrySpec::reporting(&server.uri(), 2);
    let healthy = EntrySpec::reporting(&server.uri(), 3);

    Mock::given(method("GET"))
        .and(path("/cgi-bin/browse-edgar"))
        .respond_with(ResponseTemplate::new(200).set_body_string(feed(&[&broken, &healthy])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(url_path(&broken.index_url)))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;
    mount_filing(
        &server,
        &healthy,
        ownership_document(&[("P", 10_000.0, 25.0, "A")], &[]),
    )
    .await;

    let persister = Arc::new(RecordingPersister::default());
    let scraper = Scraper::new(client(), persister.clone(), &ScrapeConfig::default());
    let base_url = format!("{}/cgi-bin/browse-edgar", server.uri());
    let report = scraper.scrape(&ScrapeOptions::new(), &base_url).await;

    assert_eq!(report.failed, 1);
    assert_eq!(report.persisted_filings, 1);
    let records = persister.records().await;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].accession_number, healthy.accession);
}

#[tokio::test]
async fn test_scrape_into_jsonl_file() {
    let server = MockServer::start().await;
    let entry = EntrySpec::reporting(&server.uri(), 4);

    Mock::given(method("GET"))
        .and(path("/cgi-bin/browse-edgar"))
        .respond_with(ResponseTemplate::new(200).set_body_string(feed(&[&entry])))
        .mount(&server)
        .await;
    mount_filing(
        &server,
        &entry,
        ownership_document(&[("P", 4_000.0, 25.0, "A")], &[]),
    )
    .await;

    let dir = tempfile::TempDir::new().unwrap();
    let out = dir.path().join("form4.jsonl");
    let persister = Arc::new(JsonlPersister::open(&out).await.unwrap());
    let scraper = Scraper::new(client(), persister, &ScrapeConfig::default());
    let base_url = format!("{}/cgi-bin/browse-edgar", server.uri());
    scraper.scrape(&ScrapeOptions::new(), &base_url).await;

    let text = std::fs::read_to_string(&out).unwrap();
    let lines: Vec<serde_json::Value> = text
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["event"], "transaction");
    assert_eq!(lines[0]["transaction_amount"], "100000.00");
    assert_eq!(lines[0]["transaction_price"], "25.00");
    assert_eq!(lines[1]["event"], "ticker");
}
