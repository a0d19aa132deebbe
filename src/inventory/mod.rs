//! Inventory analysis: buy/sell recommendations over appraised vehicles.

pub mod analysis;
pub mod models;

pub use analysis::{diagnose, quote, stock_light, summarize};
pub use models::{
    Diagnosis, InventoryItem, InventoryReport, InventoryRow, Quote, ReportSummary, StockLight,
};
