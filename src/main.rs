//! auto-appraiser - Used-vehicle market appraiser
//!
//! Suggests sale and buy prices from comparable marketplace listings.

use auto_appraiser::commands::{BatchCommand, BatchOptions, EstimateCommand, QuoteCommand};
use auto_appraiser::config::{Backend, Config, OutputFormat};
use auto_appraiser::market::{build_search_url, VehicleDescriptor};
use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "auto-appraiser",
    version,
    about = "Used-vehicle market appraiser",
    long_about = "Scrapes comparable marketplace listings and suggests sale and buy prices for used vehicles."
)]
struct Cli {
    /// Marketplace host to search
    #[arg(long, global = true, env = "APPRAISER_HOST")]
    host: Option<String>,

    /// How listing pages are loaded (browser, http)
    #[arg(short, long, global = true, env = "APPRAISER_BACKEND")]
    backend: Option<Backend>,

    /// Show the browser window (helps with bot checks)
    #[arg(long, global = true)]
    visible: bool,

    /// Persistent browser profile directory
    #[arg(long, global = true, env = "APPRAISER_PROFILE_DIR")]
    profile_dir: Option<PathBuf>,

    /// Proxy URL (e.g., socks5://host:port)
    #[arg(long, global = true, env = "APPRAISER_PROXY")]
    proxy: Option<String>,

    /// Delay between marketplace calls in milliseconds
    #[arg(long, global = true, env = "APPRAISER_DELAY")]
    delay: Option<u64>,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true)]
    format: Option<OutputFormat>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct VehicleArgs {
    /// Brand, e.g. "Toyota"
    brand: String,

    /// Model, e.g. "Corolla"
    model: String,

    /// Model year, e.g. 2020
    year: String,
}

impl VehicleArgs {
    fn descriptor(&self) -> VehicleDescriptor {
        VehicleDescriptor::new(&self.brand, &self.model, &self.year)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Estimate the market price of a vehicle
    #[command(alias = "e")]
    Estimate {
        #[command(flatten)]
        vehicle: VehicleArgs,
    },

    /// Quote a catalog configuration against the market
    #[command(alias = "q")]
    Quote {
        #[command(flatten)]
        vehicle: VehicleArgs,

        /// Catalog purchase price to compare against
        #[arg(long)]
        catalog_buy: Option<u64>,
    },

    /// Analyze an inventory file (JSON array of vehicles)
    #[command(alias = "b")]
    Batch {
        /// Inventory file
        file: PathBuf,

        /// Only analyze vehicles in this branch
        #[arg(long)]
        branch: Option<String>,

        /// Only analyze the first N vehicles
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Print the search URL for a vehicle without visiting it
    Url {
        #[command(flatten)]
        vehicle: VehicleArgs,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new(Level::DEBUG.to_string())
    } else {
        EnvFilter::from_default_env().add_directive(Level::WARN.into())
    };

    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();

    // Load config with layered overrides
    let mut config = Config::load(cli.config.as_deref())?.with_env();

    // Apply CLI overrides
    if let Some(host) = cli.host {
        config.host = host;
    }
    if let Some(backend) = cli.backend {
        config.backend = backend;
    }
    if cli.visible {
        config.visible = true;
    }
    if let Some(dir) = cli.profile_dir {
        config.profile_dir = Some(dir);
    }
    if let Some(proxy) = cli.proxy {
        config.proxy = Some(proxy);
    }
    if let Some(delay) = cli.delay {
        config.delay_ms = delay;
    }
    if let Some(format) = cli.format {
        config.format = format;
    }

    match cli.command {
        Commands::Estimate { vehicle } => {
            let cmd = EstimateCommand::new(config);
            let output = cmd.execute(&vehicle.descriptor()).await?;
            println!("{}", output);
        }

        Commands::Quote { vehicle, catalog_buy } => {
            let cmd = QuoteCommand::new(config);
            let output = cmd.execute(vehicle.descriptor(), catalog_buy).await?;
            println!("{}", output);
        }

        Commands::Batch { file, branch, limit } => {
            let cmd = BatchCommand::new(config, BatchOptions { branch, limit });
            let output = cmd.execute(&file).await?;
            println!("{}", output);
        }

        Commands::Url { vehicle } => {
            let base_url = format!("https://{}", config.host);
            let url = build_search_url(&base_url, &vehicle.descriptor())?;
            println!("{}", url);
        }
    }

    Ok(())
}
