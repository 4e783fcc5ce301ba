use anyhow::Result;
use clap::Parser;
use finstmt::log::init_logging;
use std::path::PathBuf;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Tickers to fetch (defaults to the built-in project list)
    #[arg(long, num_args = 1..)]
    tickers: Option<Vec<String>>,

    /// Output data directory (yearly/quarterly subfolders are created inside)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Refetch even if cached files exist
    #[arg(long)]
    force: bool,

    /// Sleep seconds between tickers
    #[arg(long, default_value_t = 0.5)]
    sleep: f64,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long)]
    config_path: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = finstmt::run(finstmt::RunOptions {
        tickers: cli.tickers,
        data_dir: cli.data_dir,
        force: cli.force,
        sleep: cli.sleep,
        config_path: cli.config_path,
    })
    .await;

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
