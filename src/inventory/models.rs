//! Inventory records, report rows and summaries.

use crate::market::models::{EstimationResult, EstimationStatus};
use crate::market::query::VehicleDescriptor;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// A vehicle from the dealer inventory, with columns already resolved.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryItem {
    #[serde(default)]
    pub id: String,
    /// Branch or lot the vehicle sits in
    #[serde(default)]
    pub branch: String,
    pub brand: String,
    pub model: String,
    #[serde(default)]
    pub version: String,
    /// Model year; spreadsheets often hand it over as a float
    #[serde(default, deserialize_with = "lenient_text")]
    pub year: String,
    /// Current asking price
    #[serde(default)]
    pub list_price: u64,
    /// Book cost of the unit
    #[serde(default)]
    pub book_cost: u64,
    /// Days on the lot; accepts numbers or text such as "45 dias"
    #[serde(default, deserialize_with = "lenient_days")]
    pub days_in_stock: Option<u32>,
}

impl InventoryItem {
    pub fn descriptor(&self) -> VehicleDescriptor {
        VehicleDescriptor::new(&self.brand, &self.model, &self.year)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Lenient {
    Text(String),
    Integer(i64),
    Float(f64),
}

fn lenient_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Option::<Lenient>::deserialize(deserializer)? {
        Some(Lenient::Text(text)) => text,
        Some(Lenient::Integer(n)) => n.to_string(),
        Some(Lenient::Float(f)) => f.to_string(),
        None => String::new(),
    })
}

fn lenient_days<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u32>, D::Error> {
    Ok(match Option::<Lenient>::deserialize(deserializer)? {
        Some(Lenient::Text(text)) => first_number(&text),
        Some(Lenient::Integer(n)) => u32::try_from(n).ok(),
        Some(Lenient::Float(f)) if f >= 0.0 && f <= u32::MAX as f64 => Some(f as u32),
        _ => None,
    })
}

/// First run of ASCII digits in `text`.
fn first_number(text: &str) -> Option<u32> {
    let digits: String = text
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

/// Traffic light for time on the lot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StockLight {
    /// Up to 30 days
    Green,
    /// 31 to 89 days
    Yellow,
    /// 90 days or more
    Red,
}

impl fmt::Display for StockLight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StockLight::Green => write!(f, "green"),
            StockLight::Yellow => write!(f, "yellow"),
            StockLight::Red => write!(f, "red"),
        }
    }
}

/// Recommendation for an inventory unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Diagnosis {
    Ok,
    /// More than 90 days on the lot
    Frozen,
    /// Market value below book cost
    Loss,
    /// Market value above the asking price on fresh stock
    Opportunity,
    /// Year unusable; the unit was not appraised
    YearError,
}

impl fmt::Display for Diagnosis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnosis::Ok => write!(f, "OK"),
            Diagnosis::Frozen => write!(f, "FROZEN"),
            Diagnosis::Loss => write!(f, "LOSS"),
            Diagnosis::Opportunity => write!(f, "OPPORTUNITY"),
            Diagnosis::YearError => write!(f, "YEAR ERROR"),
        }
    }
}

/// One line of the inventory report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryRow {
    pub id: String,
    pub branch: String,
    pub light: Option<StockLight>,
    pub diagnosis: Diagnosis,
    pub days_in_stock: u32,
    pub vehicle: String,
    pub version: String,
    pub year: String,
    pub status: EstimationStatus,
    pub comparables: usize,
    pub book_cost: u64,
    pub buy_price: u64,
    pub list_price: u64,
    pub suggested_price: u64,
    /// Cheapest comparable; the floor for negotiations
    pub market_min: u64,
    pub expected_profit: i64,
    pub search_url: String,
    pub date: String,
}

/// Executive summary over a whole report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub vehicles: usize,
    pub appraised: usize,
    /// Sum of book costs
    pub inventory_value: u64,
    /// Sum of expected profits
    pub potential_profit: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryReport {
    pub name: String,
    pub rows: Vec<InventoryRow>,
    pub summary: ReportSummary,
}

/// Market estimate for a single configuration set against its catalog price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub vehicle: VehicleDescriptor,
    pub estimation: EstimationResult,
    pub buy_price: u64,
    /// Catalog purchase price, when known
    pub catalog_buy: Option<u64>,
    /// Suggested sale price minus the catalog purchase price
    pub margin_vs_catalog: Option<i64>,
}
