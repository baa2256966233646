use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use trademark_harvester::config::{get_config, load_config};
use trademark_harvester::{Harvester, TrademarkApi};

/// Trademark Harvester - fetch the full trademark register and report duplicates
#[derive(Parser, Debug)]
#[command(name = "trademark-harvester")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Harvest the Patentstyret trademark register page by page, detecting duplicate records", long_about = None)]
struct Cli {
    /// Enable verbose logging (can be used multiple times for more verbosity: -v, -vv)
    #[arg(long, short, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(long, short)]
    quiet: bool,

    /// Configuration file path
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing based on verbosity
    let log_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let env_filter = if cli.quiet { "error" } else { log_level };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| format!("trademark_harvester={env_filter}")),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => get_config(),
    };

    // Configuration precondition: checked once, before any network activity.
    let Some(api_key) = config.api.key.clone() else {
        tracing::warn!("API_KEY environment variable required");
        return Ok(());
    };

    let api = TrademarkApi::new(&config.api.base_url, api_key);
    let verbose = config.api.verbose || cli.verbose > 0;
    let mut harvester = Harvester::new(
        api,
        config.retry.clone().into(),
        config.limits.clone().into(),
        verbose,
    );

    let summary = harvester.run().await?;
    tracing::info!(
        total_hits = summary.total_hits,
        pages = summary.pages_processed,
        records = summary.records_seen,
        duplicates = summary.duplicates,
        reason = %summary.reason,
        "harvest finished"
    );

    Ok(())
}
