pub mod config;
pub mod fetch;
pub mod log;
pub mod providers;
pub mod statement;
pub mod statement_provider;
pub mod store;
pub mod ticker;
pub mod ui;

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};

/// Effective options for one run, after the CLI layer has parsed flags.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub tickers: Option<Vec<String>>,
    pub data_dir: Option<PathBuf>,
    pub force: bool,
    pub sleep: f64,
    pub config_path: Option<String>,
}

pub async fn run(options: RunOptions) -> Result<()> {
    info!("Statement fetcher starting...");

    let config = match options.config_path.as_deref() {
        Some(path) => config::AppConfig::load_from_path(path)?,
        None => config::AppConfig::load_or_default()?,
    };
    debug!("Loaded config: {config:#?}");

    let base_url = config
        .providers
        .yahoo
        .as_ref()
        .map_or(providers::yahoo_finance::DEFAULT_BASE_URL, |p| &p.base_url);
    let provider = providers::yahoo_finance::YahooStatementProvider::new(base_url);

    let tickers: Vec<String> = options
        .tickers
        .or(config.tickers)
        .unwrap_or_else(|| ticker::DEFAULT_TICKERS.iter().map(|t| t.to_string()).collect());

    let data_dir = match options.data_dir.or(config.data_dir) {
        Some(dir) => dir,
        None => config::default_data_dir()?,
    };
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;

    let fetch_options = fetch::FetchOptions {
        data_dir,
        force: options.force,
        // Negative sleep values clamp to no delay
        sleep: Duration::from_secs_f64(options.sleep.max(0.0)),
    };

    let summary = fetch::run_fetch(&tickers, &provider, &fetch_options).await?;

    println!("\n{}", summary.display_as_table());
    println!(
        "{}",
        ui::style_text(&summary.summary_line(), ui::StyleType::TotalLabel)
    );

    Ok(())
}
