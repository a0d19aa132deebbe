//! Buy/sell recommendations derived from market estimates.

use crate::inventory::models::{
    Diagnosis, InventoryItem, InventoryRow, Quote, ReportSummary, StockLight,
};
use crate::market::models::{buy_price, EstimationResult, EstimationStatus};
use crate::market::query::VehicleDescriptor;

/// Days after which a unit counts as frozen stock.
pub const FROZEN_AFTER_DAYS: u32 = 90;

/// Classifies time on the lot.
pub fn stock_light(days: u32) -> StockLight {
    match days {
        0..=30 => StockLight::Green,
        31..=89 => StockLight::Yellow,
        _ => StockLight::Red,
    }
}

/// Suggested price minus book cost, or zero when either is unknown.
pub fn expected_profit(suggested_price: u64, book_cost: u64) -> i64 {
    if suggested_price == 0 || book_cost == 0 {
        return 0;
    }
    suggested_price as i64 - book_cost as i64
}

/// Picks the recommendation for an appraised unit.
///
/// Frozen stock wins over everything, then a loss against book cost, then an
/// opportunity to raise the price on fresh stock.
pub fn diagnose(days: u32, book_cost: u64, suggested_price: u64, list_price: u64) -> Diagnosis {
    if days > FROZEN_AFTER_DAYS {
        Diagnosis::Frozen
    } else if book_cost > 0 && suggested_price > 0 && suggested_price < book_cost {
        Diagnosis::Loss
    } else if suggested_price > list_price && days < 30 {
        Diagnosis::Opportunity
    } else {
        Diagnosis::Ok
    }
}

/// Builds the report row for an item that went through the appraisal engine.
pub fn appraised_row(item: &InventoryItem, result: &EstimationResult, date: &str) -> InventoryRow {
    let days = item.days_in_stock.unwrap_or(0);
    let suggested = result.suggested_price;

    InventoryRow {
        diagnosis: diagnose(days, item.book_cost, suggested, item.list_price),
        status: result.status,
        comparables: result.comparable_count,
        buy_price: buy_price(suggested),
        suggested_price: suggested,
        market_min: result.market_min,
        expected_profit: expected_profit(suggested, item.book_cost),
        search_url: result.search_url.clone(),
        ..base_row(item, date)
    }
}

/// Builds the report row for an item whose year cannot be appraised.
pub fn year_error_row(item: &InventoryItem, date: &str) -> InventoryRow {
    base_row(item, date)
}

fn base_row(item: &InventoryItem, date: &str) -> InventoryRow {
    let descriptor = item.descriptor();

    InventoryRow {
        id: item.id.clone(),
        branch: item.branch.clone(),
        light: item.days_in_stock.map(stock_light),
        diagnosis: Diagnosis::YearError,
        days_in_stock: item.days_in_stock.unwrap_or(0),
        vehicle: descriptor.label(),
        version: item.version.clone(),
        year: descriptor.normalized_year().map(|y| y.to_string()).unwrap_or_default(),
        status: EstimationStatus::YearError,
        comparables: 0,
        book_cost: item.book_cost,
        buy_price: 0,
        list_price: item.list_price,
        suggested_price: 0,
        market_min: 0,
        expected_profit: 0,
        search_url: String::new(),
        date: date.to_string(),
    }
}

/// Totals for the executive summary.
pub fn summarize(rows: &[InventoryRow]) -> ReportSummary {
    ReportSummary {
        vehicles: rows.len(),
        appraised: rows.iter().filter(|r| r.status.is_success()).count(),
        inventory_value: rows.iter().map(|r| r.book_cost).sum(),
        potential_profit: rows.iter().map(|r| r.expected_profit).sum(),
    }
}

/// Compares a market estimate with the catalog purchase price.
pub fn quote(vehicle: VehicleDescriptor, estimation: EstimationResult, catalog_buy: Option<u64>) -> Quote {
    let suggested = estimation.suggested_price;
    let margin_vs_catalog = catalog_buy
        .filter(|&buy| buy > 0 && suggested > 0)
        .map(|buy| suggested as i64 - buy as i64);

    Quote {
        vehicle,
        buy_price: buy_price(suggested),
        estimation,
        catalog_buy,
        margin_vs_catalog,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(days: Option<u32>, book_cost: u64, list_price: u64) -> InventoryItem {
        InventoryItem {
            id: "A-1".to_string(),
            branch: "Centro".to_string(),
            brand: "Toyota".to_string(),
            model: "Corolla".to_string(),
            version: "LE".to_string(),
            year: "2020".to_string(),
            list_price,
            book_cost,
            days_in_stock: days,
        }
    }

    fn success(suggested: u64) -> EstimationResult {
        EstimationResult {
            suggested_price: suggested,
            comparable_count: 4,
            status: EstimationStatus::Success,
            search_url: "https://autos.example.com/toyota/corolla/2020_NoIndex_True?VIEW=list".to_string(),
            market_min: suggested - 10_000,
            market_max: suggested + 30_000,
            raw_matches: 6,
            used_fallback: false,
            message: None,
        }
    }

    #[test]
    fn test_stock_light_boundaries() {
        assert_eq!(stock_light(0), StockLight::Green);
        assert_eq!(stock_light(30), StockLight::Green);
        assert_eq!(stock_light(31), StockLight::Yellow);
        assert_eq!(stock_light(89), StockLight::Yellow);
        assert_eq!(stock_light(90), StockLight::Red);
        assert_eq!(stock_light(400), StockLight::Red);
    }

    #[test]
    fn test_expected_profit() {
        assert_eq!(expected_profit(300_000, 250_000), 50_000);
        assert_eq!(expected_profit(200_000, 250_000), -50_000);
        assert_eq!(expected_profit(0, 250_000), 0);
        assert_eq!(expected_profit(300_000, 0), 0);
    }

    #[test]
    fn test_diagnose_precedence() {
        // Frozen beats loss
        assert_eq!(diagnose(91, 300_000, 200_000, 0), Diagnosis::Frozen);
        assert_eq!(diagnose(90, 300_000, 200_000, 0), Diagnosis::Loss);
        // Loss beats opportunity
        assert_eq!(diagnose(5, 300_000, 280_000, 250_000), Diagnosis::Loss);
        assert_eq!(diagnose(5, 200_000, 280_000, 250_000), Diagnosis::Opportunity);
        assert_eq!(diagnose(30, 200_000, 280_000, 250_000), Diagnosis::Ok);
        assert_eq!(diagnose(5, 200_000, 240_000, 250_000), Diagnosis::Ok);
    }

    #[test]
    fn test_diagnose_without_market_price() {
        assert_eq!(diagnose(10, 200_000, 0, 250_000), Diagnosis::Ok);
        assert_eq!(diagnose(120, 200_000, 0, 250_000), Diagnosis::Frozen);
    }

    #[test]
    fn test_appraised_row() {
        let row = appraised_row(&item(Some(12), 250_000, 280_000), &success(299_250), "2026-10-19");

        assert_eq!(row.diagnosis, Diagnosis::Opportunity);
        assert_eq!(row.light, Some(StockLight::Green));
        assert_eq!(row.vehicle, "Toyota Corolla");
        assert_eq!(row.year, "2020");
        assert_eq!(row.buy_price, 263_340);
        assert_eq!(row.expected_profit, 49_250);
        assert_eq!(row.market_min, 289_250);
        assert_eq!(row.comparables, 4);
        assert_eq!(row.status, EstimationStatus::Success);
        assert_eq!(row.date, "2026-10-19");
    }

    #[test]
    fn test_appraised_row_failed_estimation() {
        let result = EstimationResult::scrape_error("u", "timeout");
        let row = appraised_row(&item(None, 250_000, 280_000), &result, "2026-10-19");

        assert_eq!(row.status, EstimationStatus::ScrapeError);
        assert_eq!(row.diagnosis, Diagnosis::Ok);
        assert_eq!(row.light, None);
        assert_eq!(row.buy_price, 0);
        assert_eq!(row.expected_profit, 0);
    }

    #[test]
    fn test_year_error_row() {
        let mut bad = item(Some(45), 250_000, 280_000);
        bad.year = "95".to_string();
        let row = year_error_row(&bad, "2026-10-19");

        assert_eq!(row.diagnosis, Diagnosis::YearError);
        assert_eq!(row.status, EstimationStatus::YearError);
        assert_eq!(row.light, Some(StockLight::Yellow));
        assert_eq!(row.year, "95");
        assert_eq!(row.suggested_price, 0);
        assert_eq!(row.book_cost, 250_000);
    }

    #[test]
    fn test_summarize() {
        let rows = vec![
            appraised_row(&item(Some(10), 250_000, 280_000), &success(299_250), "d"),
            appraised_row(&item(Some(100), 300_000, 320_000), &success(280_000), "d"),
            year_error_row(&item(None, 150_000, 0), "d"),
        ];

        let summary = summarize(&rows);
        assert_eq!(summary.vehicles, 3);
        assert_eq!(summary.appraised, 2);
        assert_eq!(summary.inventory_value, 700_000);
        assert_eq!(summary.potential_profit, 49_250 - 20_000);
    }

    #[test]
    fn test_quote_with_catalog() {
        let vehicle = VehicleDescriptor::new("Toyota", "Corolla", "2020");
        let quote = quote(vehicle, success(299_250), Some(240_000));

        assert_eq!(quote.buy_price, 263_340);
        assert_eq!(quote.margin_vs_catalog, Some(59_250));
    }

    #[test]
    fn test_quote_without_market_data() {
        let vehicle = VehicleDescriptor::new("Toyota", "Corolla", "2020");
        let estimation = EstimationResult::empty(EstimationStatus::NoResults, "u");
        let quote = quote(vehicle, estimation, Some(240_000));

        assert_eq!(quote.buy_price, 0);
        assert_eq!(quote.margin_vs_catalog, None);
    }
}
