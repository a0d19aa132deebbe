//! Inventory batch analysis command.

use crate::appraisal::appraise;
use crate::commands::{finish, until_interrupted};
use crate::config::Config;
use crate::format::Formatter;
use crate::inventory::analysis::{appraised_row, summarize, year_error_row};
use crate::inventory::{InventoryItem, InventoryReport};
use crate::market::{Market, MarketSource, Throttle};
use anyhow::{Context, Result};
use std::path::Path;
use tracing::{debug, info, warn};

/// Which part of the inventory to analyze.
#[derive(Debug, Clone, Default)]
pub struct BatchOptions {
    /// Only analyze vehicles in this branch
    pub branch: Option<String>,
    /// Only analyze the first N vehicles (trial runs)
    pub limit: Option<usize>,
}

/// Appraises a whole inventory, one vehicle at a time.
pub struct BatchCommand {
    config: Config,
    options: BatchOptions,
}

impl BatchCommand {
    /// Creates a new batch command.
    pub fn new(config: Config, options: BatchOptions) -> Self {
        Self { config, options }
    }

    /// Loads the inventory file, appraises it and returns formatted output.
    pub async fn execute(&self, inventory: &Path) -> Result<String> {
        let items = load_inventory(inventory)?;

        let market = Market::open(&self.config).await.context("Failed to open market source")?;
        let outcome = until_interrupted(self.run(&market, items)).await;
        let report = finish(market, outcome).await?;

        Ok(Formatter::new(self.config.format).format_report(&report))
    }

    /// Appraises the items with a provided source (for testing).
    ///
    /// Calls to the marketplace are strictly sequential and paced by the
    /// configured throttle. Items with an unusable year never reach it.
    pub async fn run(&self, source: &impl MarketSource, items: Vec<InventoryItem>) -> InventoryReport {
        let selected = self.select(items);
        let date = chrono::Local::now().format("%Y-%m-%d").to_string();
        let mut throttle = Throttle::from_config(&self.config);
        let mut rows = Vec::with_capacity(selected.len());

        for (idx, item) in selected.iter().enumerate() {
            debug!("Vehicle {}/{}: {} {}", idx + 1, selected.len(), item.brand, item.model);

            if !item.descriptor().has_report_year() {
                warn!("Skipping {} {} ({}): unusable year {:?}", item.brand, item.model, item.id, item.year);
                rows.push(year_error_row(item, &date));
                continue;
            }

            throttle.wait().await;
            let result = appraise(source, &item.descriptor()).await;
            rows.push(appraised_row(item, &result, &date));
        }

        let summary = summarize(&rows);
        info!(
            "Analyzed {} vehicles ({} appraised)",
            summary.vehicles, summary.appraised
        );

        InventoryReport { name: self.report_name(), rows, summary }
    }

    fn select(&self, items: Vec<InventoryItem>) -> Vec<InventoryItem> {
        let filtered = items.into_iter().filter(|item| match &self.options.branch {
            Some(branch) => item.branch.trim() == branch.trim(),
            None => true,
        });

        match self.options.limit {
            Some(limit) => filtered.take(limit).collect(),
            None => filtered.collect(),
        }
    }

    fn report_name(&self) -> String {
        self.options.branch.clone().unwrap_or_else(|| "General".to_string())
    }
}

/// Reads inventory records from a JSON array.
pub fn load_inventory(path: &Path) -> Result<Vec<InventoryItem>> {
    debug!("Loading inventory from: {}", path.display());

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read inventory file: {}", path.display()))?;

    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse inventory file: {}", path.display()))
}
