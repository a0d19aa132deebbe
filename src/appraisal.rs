//! The appraisal engine: one vehicle in, one structured result out.
//!
//! Every failure is folded into [`EstimationResult::status`], so a batch can
//! keep going whatever happens to a single vehicle.

use crate::market::client::MarketSource;
use crate::market::models::{EstimationResult, EstimationStatus};
use crate::market::parser::parse_listing;
use crate::market::query::{QueryError, SearchQuery, VehicleDescriptor};
use crate::pricing::estimate;
use tracing::{debug, info, warn};

/// Appraises a vehicle against the marketplace behind `source`.
///
/// Input is validated before any navigation happens; scrape failures come
/// back as [`EstimationStatus::ScrapeError`] and are never retried here.
pub async fn appraise(source: &impl MarketSource, vehicle: &VehicleDescriptor) -> EstimationResult {
    let query = match SearchQuery::from_descriptor(vehicle) {
        Ok(query) => query,
        Err(QueryError::Incomplete(field)) => {
            debug!("Skipping appraisal, missing {}", field);
            return EstimationResult::empty(EstimationStatus::IncompleteInput, "");
        }
        Err(QueryError::Year(year)) => {
            debug!("Skipping appraisal, bad year {:?}", year);
            return EstimationResult::empty(EstimationStatus::YearError, "");
        }
    };

    let url = query.url(&source.base_url());
    info!("Appraising {} {}", vehicle.label(), query.year);

    let snapshot = match source.fetch_listing(&url).await.and_then(|html| parse_listing(&html)) {
        Ok(snapshot) => snapshot,
        Err(e) => {
            warn!("Scrape failed for {}: {:#}", url, e);
            return EstimationResult::scrape_error(url, &format!("{:#}", e));
        }
    };

    let Some(estimate) = estimate(&snapshot.samples) else {
        info!("No plausible prices ({} price elements on page)", snapshot.raw_matches);
        return EstimationResult {
            raw_matches: snapshot.raw_matches,
            ..EstimationResult::empty(EstimationStatus::NoResults, url)
        };
    };

    info!(
        "Suggested {} from {} comparables (range {} - {})",
        estimate.suggested_price, estimate.comparable_count, estimate.market_min, estimate.market_max
    );

    EstimationResult {
        suggested_price: estimate.suggested_price,
        comparable_count: estimate.comparable_count,
        status: EstimationStatus::Success,
        search_url: url,
        market_min: estimate.market_min,
        market_max: estimate.market_max,
        raw_matches: snapshot.raw_matches,
        used_fallback: estimate.used_fallback,
        message: None,
    }
}
