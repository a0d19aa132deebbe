//! Data models for price samples and appraisal results.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lowest amount treated as a plausible used-vehicle price.
pub const MIN_PLAUSIBLE_PRICE: u64 = 50_000;

/// Highest amount treated as a plausible used-vehicle price.
pub const MAX_PLAUSIBLE_PRICE: u64 = 10_000_000;

/// Error messages are cut to this many characters before they reach a report.
pub const MAX_MESSAGE_CHARS: usize = 60;

/// A listing price inside the plausible range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PriceSample(u64);

impl PriceSample {
    /// Accepts the amount only if it lies within the plausible range.
    pub fn new(amount: u64) -> Option<Self> {
        (MIN_PLAUSIBLE_PRICE..=MAX_PLAUSIBLE_PRICE).contains(&amount).then_some(Self(amount))
    }

    /// Parses a scraped price token such as `"245,000"` or `"1.250.000"`.
    ///
    /// Thousands and decimal separators are stripped before parsing; anything
    /// that still fails to parse or falls outside the range is rejected.
    pub fn from_token(token: &str) -> Option<Self> {
        let digits: String = token.chars().filter(|c| *c != ',' && *c != '.').collect();
        digits.trim().parse::<u64>().ok().and_then(Self::new)
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

/// Terminal state of a single appraisal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EstimationStatus {
    Success,
    NoResults,
    IncompleteInput,
    YearError,
    ScrapeError,
}

impl EstimationStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, EstimationStatus::Success)
    }
}

impl fmt::Display for EstimationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EstimationStatus::Success => write!(f, "success"),
            EstimationStatus::NoResults => write!(f, "no results"),
            EstimationStatus::IncompleteInput => write!(f, "incomplete input"),
            EstimationStatus::YearError => write!(f, "year error"),
            EstimationStatus::ScrapeError => write!(f, "scrape error"),
        }
    }
}

/// Outcome of appraising one vehicle against the marketplace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EstimationResult {
    /// Recommended sale price (5% under the market median), zero unless successful
    pub suggested_price: u64,
    /// Comparables that survived outlier filtering
    pub comparable_count: usize,
    pub status: EstimationStatus,
    /// Listing URL that was (or would have been) visited
    pub search_url: String,
    pub market_min: u64,
    pub market_max: u64,
    /// Price elements found on the page before range filtering
    pub raw_matches: usize,
    /// The outlier band rejected every sample and the unfiltered set was used
    #[serde(default)]
    pub used_fallback: bool,
    /// Truncated failure detail for scrape errors
    pub message: Option<String>,
}

impl EstimationResult {
    /// A result carrying no market data.
    pub fn empty(status: EstimationStatus, search_url: impl Into<String>) -> Self {
        Self {
            suggested_price: 0,
            comparable_count: 0,
            status,
            search_url: search_url.into(),
            market_min: 0,
            market_max: 0,
            raw_matches: 0,
            used_fallback: false,
            message: None,
        }
    }

    /// A scrape failure with its message truncated for reporting.
    pub fn scrape_error(search_url: impl Into<String>, error: &str) -> Self {
        Self {
            message: Some(truncate_message(error, MAX_MESSAGE_CHARS)),
            ..Self::empty(EstimationStatus::ScrapeError, search_url)
        }
    }

    /// Maximum recommended acquisition cost (88% of the suggested price).
    pub fn buy_price(&self) -> u64 {
        buy_price(self.suggested_price)
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

/// Maximum acquisition cost that still preserves a 12% margin.
pub fn buy_price(suggested_price: u64) -> u64 {
    suggested_price * 88 / 100
}

/// Cuts a message to at most `max_chars` characters on a char boundary.
pub fn truncate_message(message: &str, max_chars: usize) -> String {
    match message.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &message[..idx]),
        None => message.to_string(),
    }
}
