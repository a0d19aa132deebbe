//! HTML parser that turns a rendered listing page into price samples.

use crate::market::models::PriceSample;
use crate::market::selectors::{errors, listing};
use anyhow::Result;
use scraper::Html;
use tracing::{debug, trace, warn};

/// Price samples scraped from a single listing page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarketSnapshot {
    /// Price elements matched on the page, plausible or not
    pub raw_matches: usize,
    /// Prices inside the plausible range, in page order
    pub samples: Vec<PriceSample>,
}

/// Parses a listing page into plausible price samples.
///
/// Tokens that do not parse or fall outside the plausible range are dropped
/// silently. Block pages are reported as errors so they are not mistaken for
/// an empty market.
pub fn parse_listing(html: &str) -> Result<MarketSnapshot> {
    let document = Html::parse_document(html);

    if document.select(&errors::CAPTCHA).next().is_some() {
        anyhow::bail!("Verification page detected; the marketplace is blocking requests");
    }

    let mut snapshot = MarketSnapshot::default();

    for element in document.select(&listing::PRICE_FRACTION) {
        snapshot.raw_matches += 1;
        let token = element.text().collect::<String>();

        match PriceSample::from_token(&token) {
            Some(sample) => snapshot.samples.push(sample),
            None => trace!("Dropping price token {:?}", token.trim()),
        }
    }

    if snapshot.raw_matches == 0 {
        warn!("No price elements on the page; the listing markup may have changed");
    }

    debug!(
        "Parsed {} plausible prices from {} price elements",
        snapshot.samples.len(),
        snapshot.raw_matches
    );

    Ok(snapshot)
}
