//! Configuration management with TOML, environment variables, and CLI overrides.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Application configuration with layered loading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Marketplace host that listing searches run against
    #[serde(default = "default_host")]
    pub host: String,

    /// How listing pages are loaded
    #[serde(default)]
    pub backend: Backend,

    /// Show the browser window instead of running headless
    #[serde(default)]
    pub visible: bool,

    /// Persistent browser profile directory (cookies survive between runs)
    #[serde(default)]
    pub profile_dir: Option<PathBuf>,

    /// Proxy URL (e.g., socks5://host:port)
    #[serde(default)]
    pub proxy: Option<String>,

    /// Upper bound for a single page navigation, in seconds
    #[serde(default = "default_navigation_timeout_secs")]
    pub navigation_timeout_secs: u64,

    /// How long to wait for prices to render before extracting, in milliseconds
    #[serde(default = "default_render_timeout_ms")]
    pub render_timeout_ms: u64,

    /// Pause between marketplace calls in a batch, in milliseconds
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,

    /// Random jitter added to the pause (0 to this value)
    #[serde(default)]
    pub delay_jitter_ms: u64,

    /// Output format
    #[serde(default)]
    pub format: OutputFormat,
}

fn default_host() -> String {
    "autos.mercadolibre.com.mx".to_string()
}

fn default_navigation_timeout_secs() -> u64 {
    30
}

fn default_render_timeout_ms() -> u64 {
    3500
}

fn default_delay_ms() -> u64 {
    1500
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            backend: Backend::Browser,
            visible: false,
            profile_dir: None,
            proxy: None,
            navigation_timeout_secs: default_navigation_timeout_secs(),
            render_timeout_ms: default_render_timeout_ms(),
            delay_ms: default_delay_ms(),
            delay_jitter_ms: 0,
            format: OutputFormat::Table,
        }
    }
}

impl Config {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading config from: {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Loads configuration with fallback to default locations.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit_path {
            return Self::from_file(path);
        }

        let local_config = Path::new("appraiser.toml");
        if local_config.exists() {
            debug!("Found appraiser.toml in current directory");
            return Self::from_file(local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let xdg_config = config_dir.join("auto-appraiser").join("config.toml");
            if xdg_config.exists() {
                debug!("Found config in XDG config directory");
                return Self::from_file(xdg_config);
            }
        }

        debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Applies environment variable overrides.
    pub fn with_env(mut self) -> Self {
        if let Ok(host) = std::env::var("APPRAISER_HOST") {
            if !host.is_empty() {
                self.host = host;
            }
        }

        if let Ok(backend) = std::env::var("APPRAISER_BACKEND") {
            if let Ok(b) = backend.parse() {
                self.backend = b;
            }
        }

        if let Ok(proxy) = std::env::var("APPRAISER_PROXY") {
            self.proxy = Some(proxy);
        }

        if let Ok(delay) = std::env::var("APPRAISER_DELAY") {
            if let Ok(d) = delay.parse() {
                self.delay_ms = d;
            }
        }

        if let Ok(dir) = std::env::var("APPRAISER_PROFILE_DIR") {
            self.profile_dir = Some(PathBuf::from(dir));
        }

        self
    }

    /// Profile directory to use: configured, else under the user data dir.
    pub fn resolved_profile_dir(&self) -> PathBuf {
        if let Some(dir) = &self.profile_dir {
            return dir.clone();
        }

        dirs::data_local_dir()
            .map(|dir| dir.join("auto-appraiser").join("browser-profile"))
            .unwrap_or_else(|| PathBuf::from("browser-profile"))
    }
}

/// How listing pages are fetched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Chromium with a persistent profile; renders client-side content
    #[default]
    Browser,
    /// Plain HTTP with TLS fingerprint emulation
    Http,
}

impl std::str::FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "browser" | "chromium" => Ok(Backend::Browser),
            "http" => Ok(Backend::Http),
            _ => Err(format!("Unknown backend: {}. Use: browser, http", s)),
        }
    }
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Backend::Browser => write!(f, "browser"),
            Backend::Http => write!(f, "http"),
        }
    }
}

/// Output format for results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Markdown,
    Csv,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            "csv" => Ok(OutputFormat::Csv),
            _ => Err(format!("Unknown format: {}. Use: table, json, markdown, csv", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Markdown => write!(f, "markdown"),
            OutputFormat::Csv => write!(f, "csv"),
        }
    }
}
