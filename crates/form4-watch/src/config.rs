//! Runtime configuration.
//!
//! Every policy constant lives here: materiality thresholds, dedup window,
//! in-flight cap and HTTP settings. Values resolve as explicit override >
//! `FORM4_WATCH_*` environment variable > built-in default.

use crate::classify::SignificancePolicy;
use std::time::Duration;

/// Sales above this absolute value are material.
pub const DEFAULT_SALE_THRESHOLD: f64 = 1_000_000.0;
/// Purchases above this absolute value are material.
pub const DEFAULT_PURCHASE_THRESHOLD: f64 = 50_000.0;
/// Number of recently processed filings remembered for dedup.
pub const DEFAULT_DEDUP_CAPACITY: usize = 100;
/// Maximum entry pipelines in flight at once.
pub const DEFAULT_MAX_IN_FLIGHT: usize = 8;
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_POLL_SECS: u64 = 60;
pub const DEFAULT_BASE_URL: &str = "https://www.sec.gov/cgi-bin/browse-edgar";
/// The feed host rejects anonymous clients; operators should set a contact.
pub const DEFAULT_USER_AGENT: &str = "form4-watch/0.1 (admin@example.com)";

/// Settings for one scraper instance.
#[derive(Debug, Clone, PartialEq)]
pub struct ScrapeConfig {
    pub sale_threshold: f64,
    pub purchase_threshold: f64,
    pub dedup_capacity: usize,
    pub max_in_flight: usize,
    pub timeout_ms: u64,
    pub poll_interval: Duration,
    pub base_url: String,
    pub user_agent: String,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            sale_threshold: DEFAULT_SALE_THRESHOLD,
            purchase_threshold: DEFAULT_PURCHASE_THRESHOLD,
            dedup_capacity: DEFAULT_DEDUP_CAPACITY,
            max_in_flight: DEFAULT_MAX_IN_FLIGHT,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            poll_interval: Duration::from_secs(DEFAULT_POLL_SECS),
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl ScrapeConfig {
    /// Defaults overlaid with any `FORM4_WATCH_*` environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            sale_threshold: read_env_f64("FORM4_WATCH_SALE_THRESHOLD", defaults.sale_threshold),
            purchase_threshold: read_env_f64(
                "FORM4_WATCH_PURCHASE_THRESHOLD",
                defaults.purchase_threshold,
            ),
            dedup_capacity: read_env_usize("FORM4_WATCH_DEDUP_CAPACITY", defaults.dedup_capacity)
                .max(1),
            max_in_flight: read_env_usize("FORM4_WATCH_MAX_IN_FLIGHT", defaults.max_in_flight)
                .max(1),
            timeout_ms: read_env_u64("FORM4_WATCH_TIMEOUT_MS", defaults.timeout_ms).max(100),
            poll_interval: Duration::from_secs(
                read_env_u64("FORM4_WATCH_POLL_SECS", DEFAULT_POLL_SECS).max(1),
            ),
            base_url: read_env_string("FORM4_WATCH_BASE_URL").unwrap_or(defaults.base_url),
            user_agent: read_env_string("FORM4_WATCH_USER_AGENT").unwrap_or(defaults.user_agent),
        }
    }

    /// Materiality thresholds as a classifier policy.
    pub fn significance_policy(&self) -> SignificancePolicy {
        SignificancePolicy {
            sale_threshold: self.sale_threshold,
            purchase_threshold: self.purchase_threshold,
        }
    }
}

fn read_env_string(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn read_env_u64(name: &str, default: u64) -> u64 {
    read_env_string(name)
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(default)
}

fn read_env_usize(name: &str, default: usize) -> usize {
    read_env_string(name)
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(default)
}

fn read_env_f64(name: &str, default: f64) -> f64 {
    read_env_string(name)
        .and_then(|v| v.parse::<f64>().ok())
        .filter(|v| v.is_finite() && *v >= 0.0)
        .unwrap_or(default)
}
