//! Outlier filtering and price aggregation over market samples.

pub mod estimator;
pub mod stats;

pub use estimator::{estimate, PriceEstimate};
