//! Single-vehicle estimate and catalog quote commands.

use crate::appraisal::appraise;
use crate::commands::{finish, until_interrupted};
use crate::config::Config;
use crate::format::Formatter;
use crate::inventory::quote;
use crate::market::{Market, MarketSource, VehicleDescriptor};
use anyhow::{Context, Result};

/// Appraises one vehicle.
pub struct EstimateCommand {
    config: Config,
}

impl EstimateCommand {
    /// Creates a new estimate command.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Opens the market, appraises the vehicle and returns formatted output.
    pub async fn execute(&self, vehicle: &VehicleDescriptor) -> Result<String> {
        let market = Market::open(&self.config).await.context("Failed to open market source")?;
        let outcome = until_interrupted(self.execute_with_source(&market, vehicle)).await;
        finish(market, outcome).await
    }

    /// Appraises with a provided source (for testing).
    pub async fn execute_with_source(
        &self,
        source: &impl MarketSource,
        vehicle: &VehicleDescriptor,
    ) -> String {
        let result = appraise(source, vehicle).await;
        Formatter::new(self.config.format).format_estimation(vehicle, &result)
    }
}

/// Quotes a catalog configuration against the market.
pub struct QuoteCommand {
    config: Config,
}

impl QuoteCommand {
    /// Creates a new quote command.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Opens the market, quotes the vehicle and returns formatted output.
    pub async fn execute(&self, vehicle: VehicleDescriptor, catalog_buy: Option<u64>) -> Result<String> {
        let market = Market::open(&self.config).await.context("Failed to open market source")?;
        let outcome =
            until_interrupted(self.execute_with_source(&market, vehicle, catalog_buy)).await;
        finish(market, outcome).await
    }

    /// Quotes with a provided source (for testing).
    pub async fn execute_with_source(
        &self,
        source: &impl MarketSource,
        vehicle: VehicleDescriptor,
        catalog_buy: Option<u64>,
    ) -> String {
        let estimation = appraise(source, &vehicle).await;
        let quote = quote(vehicle, estimation, catalog_buy);
        Formatter::new(self.config.format).format_quote(&quote)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::appraisal::testing::MockMarket;
    use crate::config::OutputFormat;

    fn make_test_config(format: OutputFormat) -> Config {
        Config { delay_ms: 0, format, ..Config::default() }
    }

    #[tokio::test]
    async fn test_estimate_command_table() {
        let market = MockMarket::with_prices(&["100,000", "105,000", "110,000", "990,000"]);
        let cmd = EstimateCommand::new(make_test_config(OutputFormat::Table));

        let output =
            cmd.execute_with_source(&market, &VehicleDescriptor::new("Toyota", "Corolla", "2020")).await;

        assert!(output.contains("$99,750"));
        assert!(output.contains("success"));
        assert_eq!(market.call_count(), 1);
    }

    #[tokio::test]
    async fn test_estimate_command_json_incomplete() {
        let market = MockMarket::with_prices(&["100,000"]);
        let cmd = EstimateCommand::new(make_test_config(OutputFormat::Json));

        let output =
            cmd.execute_with_source(&market, &VehicleDescriptor::new("", "Corolla", "2020")).await;

        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["status"], "incomplete_input");
        assert_eq!(value["suggested_price"], 0);
        assert_eq!(market.call_count(), 0);
    }

    #[tokio::test]
    async fn test_quote_command_margin() {
        let market = MockMarket::with_prices(&["100,000", "105,000", "110,000"]);
        let cmd = QuoteCommand::new(make_test_config(OutputFormat::Json));

        let output = cmd
            .execute_with_source(&market, VehicleDescriptor::new("Toyota", "Corolla", "2020"), Some(80_000))
            .await;

        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["estimation"]["suggested_price"], 99_750);
        assert_eq!(value["buy_price"], 87_780);
        assert_eq!(value["margin_vs_catalog"], 19_750);
    }

    #[tokio::test]
    async fn test_quote_command_no_results() {
        let market = MockMarket::with_prices(&[]);
        let cmd = QuoteCommand::new(make_test_config(OutputFormat::Table));

        let output = cmd
            .execute_with_source(&market, VehicleDescriptor::new("Toyota", "Corolla", "2020"), Some(80_000))
            .await;

        assert!(output.contains("no results"));
        assert!(output.contains("Catalog buy: $80,000"));
        assert!(!output.contains("Margin"));
    }
}
