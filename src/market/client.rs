//! Market sources: the seam between the appraisal engine and the marketplace.

use crate::config::Config;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, info, warn};
use wreq::Client;
use wreq_util::Emulation;

/// Something that can load a rendered listing page - enables mocking for tests.
#[async_trait]
pub trait MarketSource: Send + Sync {
    /// Loads the listing page at `url` and returns its HTML once prices are present.
    async fn fetch_listing(&self, url: &str) -> Result<String>;

    /// Returns the marketplace base URL search paths are appended to.
    fn base_url(&self) -> String;
}

/// Fetches listing pages over HTTP with browser impersonation.
///
/// Works when the marketplace server-renders its list view; the browser
/// backend is the fallback for pages that need client-side rendering.
pub struct HttpMarket {
    client: Client,
    host: String,
    base_url: Option<String>,
}

impl HttpMarket {
    /// Creates a new HTTP market source with the given configuration.
    pub async fn new(config: &Config) -> Result<Self> {
        Self::with_base_url(config, None).await
    }

    /// Creates a new HTTP market source with an optional custom base URL (for testing).
    pub async fn with_base_url(config: &Config, base_url: Option<String>) -> Result<Self> {
        let mut builder = Client::builder()
            .cookie_store(true)
            .gzip(true)
            .brotli(true)
            .timeout(Duration::from_secs(config.navigation_timeout_secs))
            .connect_timeout(Duration::from_secs(10));

        if let Some(proxy_url) = &config.proxy {
            debug!("Configuring proxy: {}", proxy_url);
            let proxy = wreq::Proxy::all(proxy_url).context("Failed to configure proxy")?;
            builder = builder.proxy(proxy);
        }

        let client = builder.build()?;

        Ok(Self { client, host: config.host.clone(), base_url })
    }
}

#[async_trait]
impl MarketSource for HttpMarket {
    async fn fetch_listing(&self, url: &str) -> Result<String> {
        info!("Fetching listing: {}", url);

        let response = self
            .client
            .get(url)
            .emulation(Emulation::Chrome131)
            .header("Accept", "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8")
            .header("Accept-Language", "es-MX,es;q=0.9,en;q=0.8")
            .header("Accept-Encoding", "gzip, deflate, br")
            .header("Cache-Control", "no-cache")
            .header("Sec-Fetch-Dest", "document")
            .header("Sec-Fetch-Mode", "navigate")
            .header("Sec-Fetch-Site", "none")
            .header("Upgrade-Insecure-Requests", "1")
            .send()
            .await
            .context("Failed to send request")?;

        let status = response.status();
        debug!("Response status: {}", status);

        if status == 429 || status == 403 {
            warn!("Blocked by the marketplace ({}). Increase --delay or use a proxy.", status);
            anyhow::bail!("Blocked by the marketplace with status: {}", status);
        }

        if !status.is_success() {
            anyhow::bail!("Request failed with status: {}", status);
        }

        response.text().await.context("Failed to read response body")
    }

    fn base_url(&self) -> String {
        self.base_url.clone().unwrap_or_else(|| format!("https://{}", self.host))
    }
}
