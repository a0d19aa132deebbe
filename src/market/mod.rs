//! Marketplace access: query building, page sampling and price extraction.

pub mod browser;
pub mod client;
pub mod models;
pub mod parser;
pub mod query;
pub mod selectors;
pub mod throttle;

pub use browser::BrowserSession;
pub use client::{HttpMarket, MarketSource};
pub use models::{EstimationResult, EstimationStatus, PriceSample};
pub use query::{build_search_url, normalize_for_url, VehicleDescriptor};
pub use throttle::Throttle;

use crate::config::{Backend, Config};
use anyhow::Result;
use async_trait::async_trait;

/// The configured market source, opened once per process.
pub enum Market {
    Browser(BrowserSession),
    Http(HttpMarket),
}

impl Market {
    /// Opens the backend selected in the configuration.
    pub async fn open(config: &Config) -> Result<Self> {
        match config.backend {
            Backend::Browser => Ok(Market::Browser(BrowserSession::launch(config).await?)),
            Backend::Http => Ok(Market::Http(HttpMarket::new(config).await?)),
        }
    }

    /// Releases the backend. The browser profile is unlocked afterwards.
    pub async fn close(self) -> Result<()> {
        match self {
            Market::Browser(session) => session.close().await,
            Market::Http(_) => Ok(()),
        }
    }
}

#[async_trait]
impl MarketSource for Market {
    async fn fetch_listing(&self, url: &str) -> Result<String> {
        match self {
            Market::Browser(session) => session.fetch_listing(url).await,
            Market::Http(http) => http.fetch_listing(url).await,
        }
    }

    fn base_url(&self) -> String {
        match self {
            Market::Browser(session) => session.base_url(),
            Market::Http(http) => http.base_url(),
        }
    }
}
