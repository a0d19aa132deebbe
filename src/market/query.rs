//! Vehicle descriptors, URL slug normalization and search URL assembly.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Suffix the marketplace uses for its non-indexed list view.
const LIST_VIEW_SUFFIX: &str = "_NoIndex_True?VIEW=list";

/// Brand, model and year of the vehicle being appraised.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleDescriptor {
    pub brand: String,
    pub model: String,
    pub year: String,
}

impl VehicleDescriptor {
    pub fn new(brand: impl Into<String>, model: impl Into<String>, year: impl Into<String>) -> Self {
        Self { brand: brand.into(), model: model.into(), year: year.into() }
    }

    /// Display label used in reports ("Toyota Corolla").
    pub fn label(&self) -> String {
        format!("{} {}", self.brand.trim(), self.model.trim())
    }

    /// Returns the year as it should appear in reports, if it parses.
    pub fn normalized_year(&self) -> Option<i64> {
        parse_year(&self.year).ok()
    }

    /// True when the year is positive and has exactly four digits.
    ///
    /// Reports refuse to appraise vehicles that fail this check, while the
    /// estimation engine itself only needs a numeric year.
    pub fn has_report_year(&self) -> bool {
        matches!(self.normalized_year(), Some(year) if (1000..=9999).contains(&year))
    }
}

/// Why a descriptor could not be turned into a search query.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("incomplete vehicle descriptor: missing {0}")]
    Incomplete(&'static str),

    #[error("year is not numeric: {0:?}")]
    Year(String),
}

/// A validated, normalized marketplace search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub brand_slug: String,
    pub model_slug: String,
    pub year: i64,
}

impl SearchQuery {
    /// Validates the descriptor and normalizes its parts.
    pub fn from_descriptor(vehicle: &VehicleDescriptor) -> Result<Self, QueryError> {
        if vehicle.brand.trim().is_empty() {
            return Err(QueryError::Incomplete("brand"));
        }
        if vehicle.model.trim().is_empty() {
            return Err(QueryError::Incomplete("model"));
        }
        if vehicle.year.trim().is_empty() {
            return Err(QueryError::Incomplete("year"));
        }

        let year = parse_year(&vehicle.year)?;

        Ok(Self {
            brand_slug: normalize_for_url(&vehicle.brand),
            model_slug: normalize_for_url(&vehicle.model),
            year,
        })
    }

    /// Builds the listing URL against the given marketplace base URL.
    pub fn url(&self, base_url: &str) -> String {
        format!(
            "{}/{}/{}/{}{}",
            base_url.trim_end_matches('/'),
            self.brand_slug,
            self.model_slug,
            self.year,
            LIST_VIEW_SUFFIX
        )
    }
}

/// Validates a descriptor and returns the listing URL for it.
pub fn build_search_url(base_url: &str, vehicle: &VehicleDescriptor) -> Result<String, QueryError> {
    SearchQuery::from_descriptor(vehicle).map(|query| query.url(base_url))
}

/// Parses a year, accepting float-formatted integers such as `"2020.0"`.
pub fn parse_year(raw: &str) -> Result<i64, QueryError> {
    let trimmed = raw.trim();

    if let Ok(year) = trimmed.parse::<i64>() {
        return Ok(year);
    }

    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() && value.abs() < i64::MAX as f64 => Ok(value.trunc() as i64),
        _ => Err(QueryError::Year(raw.to_string())),
    }
}

/// Turns free text into a URL path slug.
///
/// Diacritics are stripped through canonical decomposition, the text is
/// lowercased and trimmed, and every run of characters outside `[a-z0-9]`
/// becomes a single hyphen.
pub fn normalize_for_url(text: &str) -> String {
    let stripped: String = text.nfd().filter(|c| !is_combining_mark(*c)).collect();
    let lowered = stripped.to_lowercase();

    let mut slug = String::with_capacity(lowered.len());
    let mut in_separator = false;

    for c in lowered.trim().chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            slug.push(c);
            in_separator = false;
        } else if !in_separator {
            slug.push('-');
            in_separator = true;
        }
    }

    slug
}
