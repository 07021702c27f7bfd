//! Materiality test for transaction records.

use crate::config::{DEFAULT_PURCHASE_THRESHOLD, DEFAULT_SALE_THRESHOLD};
use crate::types::TransactionRecord;

/// Transaction code for an open-market sale.
pub const CODE_SALE: &str = "S";
/// Transaction code for an open-market purchase.
pub const CODE_PURCHASE: &str = "P";

/// Threshold pair deciding which transactions are worth persisting.
///
/// Comparisons are strict and use the absolute amount, so a sale of exactly
/// the threshold is not material. Codes other than sale and purchase are
/// never material.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignificancePolicy {
    pub sale_threshold: f64,
    pub purchase_threshold: f64,
}

impl Default for SignificancePolicy {
    fn default() -> Self {
        Self {
            sale_threshold: DEFAULT_SALE_THRESHOLD,
            purchase_threshold: DEFAULT_PURCHASE_THRESHOLD,
        }
    }
}

impl SignificancePolicy {
    /// Whether a transaction with `code` and signed `amount` is material.
    pub fn is_material(&self, code: &str, amount: f64) -> bool {
        let magnitude = amount.abs();
        match code {
            CODE_SALE => magnitude > self.sale_threshold,
            CODE_PURCHASE => magnitude > self.purchase_threshold,
            _ => false,
        }
    }

    pub fn classify(&self, record: &TransactionRecord) -> bool {
        self.is_material(&record.transaction_code, record.transaction_amount)
    }
}
