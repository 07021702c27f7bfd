//! Core data model: feed entries, resolved filings and transaction records.

use crate::xml::XmlNode;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Form type that proceeds to resolution.
pub const FORM_TYPE_4: &str = "4";

/// Feed role that proceeds to resolution.
pub const ROLE_REPORTING: &str = "Reporting";

/// One typed entry of the ownership feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedEntry {
    /// Name of the reporting person or entity.
    pub reporter_name: String,
    /// Form type (e.g. "4", "4/A").
    pub form_type: String,
    /// Role of the listed party ("Reporting" or "Issuer").
    pub role: String,
    /// Central index key of the listed party.
    pub cik: String,
    /// Address of the filing index page.
    pub filing_url: String,
    /// Accession number of the filing.
    pub accession_number: String,
}

impl FeedEntry {
    /// Whether this entry passes the form/role filter.
    pub fn is_reporting_form4(&self) -> bool {
        self.form_type == FORM_TYPE_4 && self.role == ROLE_REPORTING
    }

    /// Dedup identity of the filing this entry references.
    pub fn identity(&self) -> FilingIdentity {
        FilingIdentity::new(&self.accession_number, &self.cik)
    }
}

/// Composite identity (accession number, CIK) of a processed filing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FilingIdentity {
    pub accession_number: String,
    pub cik: String,
}

impl FilingIdentity {
    pub fn new(accession_number: &str, cik: &str) -> Self {
        Self {
            accession_number: accession_number.to_string(),
            cik: cik.to_string(),
        }
    }
}

impl fmt::Display for FilingIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.accession_number, self.cik)
    }
}

/// A feed entry whose ownership document was fetched and parsed.
#[derive(Debug, Clone)]
pub struct ResolvedFiling {
    /// The `ownershipDocument` element.
    pub document: XmlNode,
    /// Address the document was fetched from.
    pub document_url: String,
    /// The entry this filing was resolved from.
    pub source: FeedEntry,
}

/// The two transaction tables of an ownership document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    NonDerivative,
    Derivative,
}

impl TransactionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NonDerivative => "non_derivative",
            Self::Derivative => "derivative",
        }
    }
}

/// One consolidated transaction read from a single table.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub kind: TransactionKind,
    /// Transaction code ("S" sale, "P" purchase, ...).
    pub code: String,
    /// Net shares, negative when disposed.
    pub shares: f64,
    /// Net value, negative when disposed.
    pub amount: f64,
    /// Value-weighted price per share.
    pub price: f64,
    /// Date of the first consolidated row.
    pub date: Option<NaiveDate>,
}

/// A transaction enriched with issuer and reporter context.
///
/// Amount and price serialize as strings with two decimal places.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionRecord {
    pub ticker: String,
    pub company: String,
    pub reporter: String,
    pub reporter_title: String,
    pub cik: String,
    pub accession_number: String,
    pub url: String,
    pub transaction_code: String,
    #[serde(serialize_with = "two_decimals")]
    pub transaction_amount: f64,
    #[serde(serialize_with = "two_decimals")]
    pub transaction_price: f64,
    pub kind: TransactionKind,
    /// Transaction date when the document carries one.
    pub date: Option<NaiveDate>,
    /// Period of report of the filing.
    pub period_of_report: Option<NaiveDate>,
}

impl TransactionRecord {
    pub fn identity(&self) -> FilingIdentity {
        FilingIdentity::new(&self.accession_number, &self.cik)
    }

    /// Amount formatted to two decimal places.
    pub fn formatted_amount(&self) -> String {
        format!("{:.2}", self.transaction_amount)
    }

    /// Price formatted to two decimal places.
    pub fn formatted_price(&self) -> String {
        format!("{:.2}", self.transaction_price)
    }

    /// Ticker refresh emitted alongside this record.
    pub fn ticker_update(&self) -> TickerUpdate {
        TickerUpdate {
            ticker: self.ticker.clone(),
            company: self.company.clone(),
            last_update: self.period_of_report.or(self.date),
        }
    }
}

/// Marks a ticker as having fresh ownership activity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TickerUpdate {
    pub ticker: String,
    pub company: String,
    pub last_update: Option<NaiveDate>,
}

fn two_decimals<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format!("{value:.2}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(form: &str, role: &str) -> FeedEntry {
        FeedEntry {
            reporter_name: "Doe Jane".to_string(),
            form_type: form.to_string(),
            role: role.to_string(),
            cik: "0001234567".to_string(),
            filing_url: "https://example.com/x-index.htm".to_string(),
            accession_number: "0001234567-24-000001".to_string(),
        }
    }

    #[test]
    fn test_filter_requires_form4_and_reporting() {
        assert!(entry("4", "Reporting").is_reporting_form4());
        assert!(!entry("4", "Issuer").is_reporting_form4());
        assert!(!entry("4/A", "Reporting").is_reporting_form4());
        assert!(!entry("3", "Reporting").is_reporting_form4());
    }

    #[test]
    fn test_identity_display() {
        let id = entry("4", "Reporting").identity();
        assert_eq!(id.to_string(), "0001234567-24-000001/0001234567");
    }

    #[test]
    fn test_record_serializes_two_decimals() {
        let record = TransactionRecord {
            ticker: "ACME".to_string(),
            company: "Acme Corp".to_string(),
            reporter: "Doe Jane".to_string(),
            reporter_title: "CEO".to_string(),
            cik: "1".to_string(),
            accession_number: "a".to_string(),
            url: "u".to_string(),
            transaction_code: "S".to_string(),
            transaction_amount: -2_000_000.0,
            transaction_price: 12.5,
            kind: TransactionKind::NonDerivative,
            date: None,
            period_of_report: NaiveDate::from_ymd_opt(2024, 3, 1),
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["transaction_amount"], "-2000000.00");
        assert_eq!(json["transaction_price"], "12.50");
        assert_eq!(json["kind"], "non_derivative");
        assert_eq!(record.formatted_amount(), "-2000000.00");
        assert_eq!(
            record.ticker_update().last_update,
            NaiveDate::from_ymd_opt(2024, 3, 1)
        );
    }
}
