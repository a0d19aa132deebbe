//! Suggested-price estimation from comparable listings.

use crate::market::models::PriceSample;
use crate::pricing::stats::doubled_median;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Suggested sale price as a percentage of the market median.
pub const SUGGESTED_PRICE_PERCENT: u64 = 95;

/// Aggregate view of the comparables that survived outlier filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceEstimate {
    /// Median of the cleaned comparables, truncated
    pub median: u64,
    /// Median minus the competitive-pricing margin
    pub suggested_price: u64,
    pub comparable_count: usize,
    pub market_min: u64,
    pub market_max: u64,
    /// True when the band filter removed everything and the raw set was used
    pub used_fallback: bool,
}

/// Estimates a suggested price from plausible market samples.
///
/// Samples outside `[0.6, 1.6]` times the initial median are discarded. If
/// that leaves nothing, every sample is kept instead. Returns `None` only for
/// an empty input.
pub fn estimate(samples: &[PriceSample]) -> Option<PriceEstimate> {
    let mut prices: Vec<u64> = samples.iter().map(|s| s.value()).collect();
    prices.sort_unstable();

    let initial = doubled_median(&prices)?;

    // 0.6m <= p <= 1.6m, with m = initial / 2
    let mut cleaned: Vec<u64> =
        prices.iter().copied().filter(|&p| 3 * initial <= 10 * p && 10 * p <= 8 * initial).collect();

    let used_fallback = cleaned.is_empty();
    if used_fallback {
        warn!("Outlier band rejected all {} samples, using them unfiltered", prices.len());
        cleaned = prices;
    } else if cleaned.len() < prices.len() {
        debug!("Outlier band dropped {} of {} samples", prices.len() - cleaned.len(), prices.len());
    }

    let median = doubled_median(&cleaned)? / 2;

    Some(PriceEstimate {
        median,
        suggested_price: median * SUGGESTED_PRICE_PERCENT / 100,
        comparable_count: cleaned.len(),
        market_min: cleaned[0],
        market_max: cleaned[cleaned.len() - 1],
        used_fallback,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn samples(values: &[u64]) -> Vec<PriceSample> {
        values.iter().map(|&v| PriceSample::new(v).unwrap()).collect()
    }

    #[test]
    fn test_estimate_drops_gross_outlier() {
        let estimate = estimate(&samples(&[100_000, 105_000, 110_000, 990_000])).unwrap();

        assert_eq!(estimate.comparable_count, 3);
        assert_eq!(estimate.median, 105_000);
        assert_eq!(estimate.suggested_price, 99_750);
        assert_eq!(estimate.market_min, 100_000);
        assert_eq!(estimate.market_max, 110_000);
        assert!(!estimate.used_fallback);
    }

    #[test]
    fn test_estimate_empty() {
        assert!(estimate(&[]).is_none());
    }

    #[test]
    fn test_estimate_single_sample() {
        let estimate = estimate(&samples(&[200_000])).unwrap();
        assert_eq!(estimate.comparable_count, 1);
        assert_eq!(estimate.suggested_price, 190_000);
        assert_eq!(estimate.market_min, 200_000);
        assert_eq!(estimate.market_max, 200_000);
    }

    #[test]
    fn test_estimate_fallback_keeps_original_set() {
        // Median 5,025,000 puts both samples outside the band
        let input = samples(&[50_000, 10_000_000]);
        let estimate = estimate(&input).unwrap();

        assert!(estimate.used_fallback);
        assert_eq!(estimate.comparable_count, input.len());
        assert_eq!(estimate.median, 5_025_000);
        assert_eq!(estimate.suggested_price, 4_773_750);
        assert_eq!(estimate.market_min, 50_000);
        assert_eq!(estimate.market_max, 10_000_000);
    }

    #[test]
    fn test_estimate_band_is_inclusive() {
        // Median 100,000: 60,000 and 160,000 sit exactly on the band edges
        let estimate = estimate(&samples(&[60_000, 100_000, 100_000, 160_000, 160_001])).unwrap();
        assert_eq!(estimate.comparable_count, 4);
        assert_eq!(estimate.market_min, 60_000);
        assert_eq!(estimate.market_max, 160_000);
    }

    #[test]
    fn test_estimate_fractional_median_truncates() {
        // Median 150,000.5 truncates to 150,000
        let estimate = estimate(&samples(&[150_000, 150_001])).unwrap();
        assert_eq!(estimate.median, 150_000);
        assert_eq!(estimate.suggested_price, 142_500);
    }

    #[test]
    fn test_estimate_order_independent() {
        let a = estimate(&samples(&[310_000, 250_000, 990_000, 280_000, 90_000])).unwrap();
        let b = estimate(&samples(&[90_000, 990_000, 280_000, 310_000, 250_000])).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_estimate_range_brackets_median() {
        let inputs: [&[u64]; 5] = [
            &[100_000, 105_000, 110_000, 990_000],
            &[50_000, 10_000_000],
            &[245_000, 250_000, 255_000, 260_000, 600_000, 120_000],
            &[75_000, 75_000, 75_000],
            &[400_000, 410_000, 900_000, 905_000],
        ];

        for input in inputs {
            let estimate = estimate(&samples(input)).unwrap();
            assert!(estimate.market_min <= estimate.median, "{:?}", input);
            assert!(estimate.median <= estimate.market_max, "{:?}", input);
            assert!(estimate.suggested_price > 0);
            assert!(estimate.comparable_count >= 1);
        }
    }
}
