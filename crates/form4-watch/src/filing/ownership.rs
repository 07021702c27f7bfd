//! Read issuer, reporter and transaction fields from an ownership document.
//!
//! Each transaction table collapses into at most one [`Transaction`]: the
//! first sale or purchase code (else the first code at all) selects the
//! rows that are summed. Shares and amounts
//! are signed (disposals negative); the price is value-weighted.

use crate::classify::{CODE_PURCHASE, CODE_SALE};
use crate::error::{ScrapeError, ScrapeResult};
use crate::types::{ResolvedFiling, Transaction, TransactionKind, TransactionRecord};
use crate::xml::XmlNode;
use chrono::NaiveDate;

/// Typed view of one ownership document.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedFiling {
    pub company: String,
    pub ticker: String,
    pub reporter_title: String,
    pub period_of_report: Option<NaiveDate>,
    pub non_derivative: Option<Transaction>,
    pub derivative: Option<Transaction>,
}

impl ExtractedFiling {
    /// Present transactions, non-derivative first.
    pub fn transactions(&self) -> impl Iterator<Item = &Transaction> {
        self.non_derivative.iter().chain(self.derivative.iter())
    }
}

/// Extract the typed fields of a resolved filing.
///
/// A document without an issuer name is malformed. Empty tables are not an
/// error; they simply yield no transaction.
pub fn extract_filing(filing: &ResolvedFiling) -> ScrapeResult<ExtractedFiling> {
    let doc = &filing.document;
    let company = doc
        .text_at(&["issuer", "issuerName"])
        .ok_or_else(|| ScrapeError::malformed(&filing.document_url, "missing issuer name"))?
        .to_string();
    let ticker = doc
        .text_at(&["issuer", "issuerTradingSymbol"])
        .unwrap_or_default()
        .to_ascii_uppercase();

    Ok(ExtractedFiling {
        company,
        ticker,
        reporter_title: reporter_title(doc),
        period_of_report: doc.text_at(&["periodOfReport"]).and_then(parse_date),
        non_derivative: consolidate(
            doc.child("nonDerivativeTable"),
            "nonDerivativeTransaction",
            TransactionKind::NonDerivative,
        ),
        derivative: consolidate(
            doc.child("derivativeTable"),
            "derivativeTransaction",
            TransactionKind::Derivative,
        ),
    })
}

/// One independent record per extracted transaction.
pub fn records_for(filing: &ResolvedFiling, extracted: &ExtractedFiling) -> Vec<TransactionRecord> {
    let entry = &filing.source;
    extracted
        .transactions()
        .map(|t| TransactionRecord {
            ticker: extracted.ticker.clone(),
            company: extracted.company.clone(),
            reporter: entry.reporter_name.clone(),
            reporter_title: extracted.reporter_title.clone(),
            cik: entry.cik.clone(),
            accession_number: entry.accession_number.clone(),
            url: entry.filing_url.clone(),
            transaction_code: t.code.clone(),
            transaction_amount: t.amount,
            transaction_price: t.price,
            kind: t.kind,
            date: t.date,
            period_of_report: extracted.period_of_report,
        })
        .collect()
}

fn reporter_title(doc: &XmlNode) -> String {
    let Some(rel) = doc.path(&["reportingOwner", "reportingOwnerRelationship"]) else {
        return String::new();
    };
    let flag = |name: &str| {
        rel.text_at(&[name])
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    };

    let mut parts: Vec<String> = Vec::new();
    if flag("isOfficer") {
        parts.push(rel.text_at(&["officerTitle"]).unwrap_or("Officer").to_string());
    }
    if flag("isDirector") {
        parts.push("Director".to_string());
    }
    if flag("isTenPercentOwner") {
        parts.push("10% Owner".to_string());
    }
    if flag("isOther") {
        parts.push(rel.text_at(&["otherText"]).unwrap_or("Other").to_string());
    }
    parts.join(", ")
}

fn consolidate(table: Option<&XmlNode>, row_name: &str, kind: TransactionKind) -> Option<Transaction> {
    let rows: Vec<&XmlNode> = table?.children(row_name).collect();
    let codes: Vec<&str> = rows
        .iter()
        .filter_map(|r| value(r, &["transactionCoding", "transactionCode"]))
        .collect();
    // Sales and purchases win over exercises, gifts and the like listed before them.
    let code = codes
        .iter()
        .find(|c| matches!(**c, CODE_SALE | CODE_PURCHASE))
        .or_else(|| codes.first())?
        .to_string();

    let mut shares = 0.0;
    let mut amount = 0.0;
    let mut date = None;
    for row in rows
        .iter()
        .filter(|r| value(r, &["transactionCoding", "transactionCode"]) == Some(code.as_str()))
    {
        let row_shares = number(row, &["transactionAmounts", "transactionShares"]);
        let row_price = number(row, &["transactionAmounts", "transactionPricePerShare"]);
        let sign = match value(row, &["transactionAmounts", "transactionAcquiredDisposedCode"]) {
            Some("D") => -1.0,
            _ => 1.0,
        };
        shares += sign * row_shares;
        amount += sign * row_shares * row_price;
        if date.is_none() {
            date = value(row, &["transactionDate"]).and_then(parse_date);
        }
    }

    let price = if shares == 0.0 {
        0.0
    } else {
        (amount / shares).abs()
    };

    Some(Transaction {
        kind,
        code,
        shares,
        amount,
        price,
        date,
    })
}

/// Field text, looking through a `<value>` wrapper when present.
fn value<'a>(node: &'a XmlNode, path: &[&str]) -> Option<&'a str> {
    let field = node.path(path)?;
    match field.child("value") {
        Some(v) => v.text_at(&[]),
        None => field.text_at(&[]),
    }
}

fn number(node: &XmlNode, path: &[&str]) -> f64 {
    value(node, path)
        .and_then(|v| v.replace(',', "").parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    // Dates sometimes carry a timezone suffix, e.g. "2024-01-16-05:00".
    let head = s.trim().get(..10)?;
    NaiveDate::parse_from_str(head, "%Y-%m-%d").ok()
}
