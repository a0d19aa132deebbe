//! Headless Chromium backend with a persistent, single-writer profile.

use crate::config::Config;
use crate::market::client::MarketSource;
use crate::market::selectors::listing;
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::Page;
use futures::StreamExt;
use std::fs::{self, File, OpenOptions, TryLockError};
use std::io::Write;
use std::path::Path;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, trace, warn};

const LOCK_FILE: &str = "appraiser.lock";

/// How often the render wait re-checks the DOM for price elements.
const RENDER_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Exclusive claim on a browser profile directory.
///
/// Chromium corrupts profiles shared between processes, so only one
/// appraiser may hold a given directory at a time. The claim is an OS file
/// lock: it ends when this value is dropped or the process dies, so a lock
/// file left behind by a crash never blocks the next run.
#[derive(Debug)]
pub struct ProfileLock {
    _file: File,
}

impl ProfileLock {
    /// Claims the profile directory, failing if another process holds it.
    pub fn acquire(profile_dir: &Path) -> Result<Self> {
        let path = profile_dir.join(LOCK_FILE);

        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .with_context(|| format!("Failed to open lock file: {}", path.display()))?;

        match file.try_lock() {
            Ok(()) => {}
            Err(TryLockError::WouldBlock) => {
                let holder = fs::read_to_string(&path).unwrap_or_default();
                anyhow::bail!(
                    "Browser profile {} is in use by another process (pid {})",
                    profile_dir.display(),
                    holder.trim()
                );
            }
            Err(TryLockError::Error(e)) => {
                return Err(e).with_context(|| format!("Failed to lock {}", path.display()));
            }
        }

        // Whatever a previous holder left is stale once the lock is ours
        file.set_len(0)
            .and_then(|_| writeln!(file, "{}", std::process::id()))
            .with_context(|| format!("Failed to write lock file: {}", path.display()))?;

        debug!("Locked browser profile: {}", profile_dir.display());
        Ok(Self { _file: file })
    }
}

/// Navigation and render-wait limits for one listing.
#[derive(Debug, Clone, Copy)]
pub struct RenderLimits {
    pub navigation: Duration,
    pub render: Duration,
}

impl RenderLimits {
    pub fn from_config(config: &Config) -> Self {
        Self {
            navigation: Duration::from_secs(config.navigation_timeout_secs),
            render: Duration::from_millis(config.render_timeout_ms),
        }
    }
}

/// The operations a listing render needs from a browser tab.
#[async_trait]
pub trait ListingTab: Send + Sync {
    /// Loads `url` in the tab.
    async fn navigate(&self, url: &str) -> Result<()>;

    /// Whether a price element is present in the current DOM.
    async fn has_prices(&self) -> bool;

    /// Serialized DOM of the current page.
    async fn html(&self) -> Result<String>;

    /// Closes the tab.
    async fn release(&self) -> Result<()>;
}

#[async_trait]
impl ListingTab for Page {
    async fn navigate(&self, url: &str) -> Result<()> {
        self.goto(url).await.context("Navigation failed")?;
        Ok(())
    }

    async fn has_prices(&self) -> bool {
        self.find_element(listing::PRICE_FRACTION_CSS).await.is_ok()
    }

    async fn html(&self) -> Result<String> {
        self.content().await.context("Failed to read page content")
    }

    async fn release(&self) -> Result<()> {
        self.clone().close().await.context("Failed to close tab")
    }
}

/// Renders `url` in `tab` and returns its HTML, closing the tab on every path.
pub async fn render_in_tab(tab: &impl ListingTab, url: &str, limits: RenderLimits) -> Result<String> {
    let result = render(tab, url, limits).await;

    if let Err(e) = tab.release().await {
        warn!("{:#}", e);
    }

    result
}

async fn render(tab: &impl ListingTab, url: &str, limits: RenderLimits) -> Result<String> {
    tokio::time::timeout(limits.navigation, tab.navigate(url))
        .await
        .map_err(|_| anyhow!("Navigation timed out after {}s", limits.navigation.as_secs()))??;

    if !wait_for_prices(tab, limits.render).await {
        debug!("No price element after {}ms, extracting anyway", limits.render.as_millis());
    }

    tab.html().await
}

/// Polls until a price element exists or `timeout` passes.
async fn wait_for_prices(tab: &impl ListingTab, timeout: Duration) -> bool {
    let deadline = Instant::now() + timeout;

    loop {
        if tab.has_prices().await {
            return true;
        }
        if Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(RENDER_POLL_INTERVAL).await;
    }
}

/// A running browser bound to the persistent profile.
///
/// Open once per process and hand it to every appraisal; call
/// [`BrowserSession::close`] on shutdown. Each listing is rendered in its own
/// tab, which is closed whether or not the render succeeded.
pub struct BrowserSession {
    browser: Browser,
    handler: JoinHandle<()>,
    host: String,
    limits: RenderLimits,
    _lock: ProfileLock,
}

impl BrowserSession {
    /// Launches Chromium against the configured profile directory.
    pub async fn launch(config: &Config) -> Result<Self> {
        let profile_dir = config.resolved_profile_dir();
        fs::create_dir_all(&profile_dir).with_context(|| {
            format!("Failed to create profile directory: {}", profile_dir.display())
        })?;

        let lock = ProfileLock::acquire(&profile_dir)?;
        let limits = RenderLimits::from_config(config);

        let mut builder = BrowserConfig::builder()
            .user_data_dir(&profile_dir)
            .window_size(1280, 800)
            .request_timeout(limits.navigation)
            .arg("--disable-blink-features=AutomationControlled");

        if config.visible {
            builder = builder.with_head();
        }

        if let Some(proxy) = &config.proxy {
            debug!("Configuring proxy: {}", proxy);
            builder = builder.arg(format!("--proxy-server={}", proxy));
        }

        let browser_config =
            builder.build().map_err(|e| anyhow!("Invalid browser configuration: {}", e))?;

        info!(
            "Launching browser (profile: {}, visible: {})",
            profile_dir.display(),
            config.visible
        );

        let (browser, mut events) =
            Browser::launch(browser_config).await.context("Failed to launch browser")?;

        let handler = tokio::spawn(async move {
            while let Some(event) = events.next().await {
                if let Err(e) = event {
                    trace!("Browser event error: {}", e);
                }
            }
        });

        Ok(Self { browser, handler, host: config.host.clone(), limits, _lock: lock })
    }

    /// Shuts the browser down and releases the profile.
    pub async fn close(mut self) -> Result<()> {
        debug!("Closing browser");
        self.browser.close().await.context("Failed to close browser")?;

        if let Err(e) = self.browser.wait().await {
            warn!("Browser process did not exit cleanly: {}", e);
        }
        if let Err(e) = self.handler.await {
            warn!("Browser event loop ended abnormally: {}", e);
        }

        Ok(())
    }
}

#[async_trait]
impl MarketSource for BrowserSession {
    async fn fetch_listing(&self, url: &str) -> Result<String> {
        info!("Navigating: {}", url);

        let page = self.browser.new_page("about:blank").await.context("Failed to open tab")?;
        render_in_tab(&page, url, self.limits).await
    }

    fn base_url(&self) -> String {
        format!("https://{}", self.host)
    }
}
