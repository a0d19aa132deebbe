//! auto-appraiser - Used-vehicle market appraiser
//!
//! Scrapes comparable listings from a classifieds marketplace, filters
//! outliers around the median and suggests sale and buy prices.

pub mod appraisal;
pub mod commands;
pub mod config;
pub mod format;
pub mod inventory;
pub mod market;
pub mod pricing;

pub use appraisal::appraise;
pub use config::Config;
pub use market::{EstimationResult, EstimationStatus, PriceSample, VehicleDescriptor};
