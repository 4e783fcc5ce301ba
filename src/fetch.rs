//! The per-ticker fetch workflow: cache check, fetch, persist, report.

use anyhow::Result;
use comfy_table::{Cell, Color};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

use crate::statement::{Frequency, Statements};
use crate::statement_provider::StatementProvider;
use crate::store;
use crate::ticker;
use crate::ui;

/// Whether a ticker/frequency pair must be fetched or can be served from the
/// on-disk cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchDecision {
    Needed,
    NotNeeded,
}

impl FetchDecision {
    /// Applies the force flag and the cache check for one frequency.
    pub fn evaluate(force: bool, root: &Path, slug: &str, frequency: Frequency) -> Self {
        if force || store::needs_fetch(root, slug, frequency) {
            FetchDecision::Needed
        } else {
            FetchDecision::NotNeeded
        }
    }

    pub fn is_needed(self) -> bool {
        matches!(self, FetchDecision::Needed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickerStatus {
    Ok,
    Cached,
    Failed,
}

impl TickerStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            TickerStatus::Ok => "ok",
            TickerStatus::Cached => "cached",
            TickerStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for TickerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of processing one ticker. Row counts are taken from the balance
/// sheet tables and stay 0 for frequencies that were not fetched.
#[derive(Debug, Clone)]
pub struct TickerOutcome {
    pub ticker: String,
    pub status: TickerStatus,
    pub yearly_rows: usize,
    pub quarterly_rows: usize,
    pub error: Option<String>,
}

#[derive(Debug, Default)]
pub struct FetchSummary {
    pub outcomes: Vec<TickerOutcome>,
}

impl FetchSummary {
    pub fn ok_count(&self) -> usize {
        self.count(TickerStatus::Ok)
    }

    pub fn cached_count(&self) -> usize {
        self.count(TickerStatus::Cached)
    }

    pub fn failed_count(&self) -> usize {
        self.count(TickerStatus::Failed)
    }

    fn count(&self, status: TickerStatus) -> usize {
        self.outcomes.iter().filter(|o| o.status == status).count()
    }

    pub fn display_as_table(&self) -> String {
        let mut table = ui::new_styled_table();
        table.set_header(vec![
            ui::header_cell("Ticker"),
            ui::header_cell("Status"),
            ui::header_cell("Yearly Rows"),
            ui::header_cell("Quarterly Rows"),
        ]);

        for outcome in &self.outcomes {
            let color = match outcome.status {
                TickerStatus::Ok => Color::Green,
                TickerStatus::Cached => Color::DarkGrey,
                TickerStatus::Failed => Color::Red,
            };
            table.add_row(vec![
                Cell::new(&outcome.ticker),
                ui::status_cell(outcome.status.as_str(), color),
                ui::count_cell(outcome.yearly_rows),
                ui::count_cell(outcome.quarterly_rows),
            ]);
        }

        table.to_string()
    }

    pub fn summary_line(&self) -> String {
        format!(
            "Done. ok={}, cached={}, failed={}",
            self.ok_count(),
            self.cached_count(),
            self.failed_count()
        )
    }
}

#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub data_dir: PathBuf,
    pub force: bool,
    /// Inter-ticker throttle applied after every ticker, cached ones included.
    pub sleep: Duration,
}

/// Runs the fetch workflow over all raw tickers, strictly sequentially.
///
/// Provider failures are isolated per ticker; filesystem errors abort the
/// whole run.
pub async fn run_fetch(
    raw_tickers: &[String],
    provider: &(dyn StatementProvider + Send + Sync),
    options: &FetchOptions,
) -> Result<FetchSummary> {
    let symbols: Vec<String> = raw_tickers.iter().map(|t| ticker::normalize(t)).collect();
    let mut summary = FetchSummary::default();

    for symbol in &symbols {
        let outcome = process_ticker(symbol, provider, options).await?;

        match outcome.status {
            TickerStatus::Cached => {
                println!("{symbol}: {}", ui::style_text("cached", ui::StyleType::Subtle));
            }
            TickerStatus::Ok => {
                println!(
                    "{symbol}: yearly={} rows, quarterly={} rows",
                    outcome.yearly_rows, outcome.quarterly_rows
                );
            }
            TickerStatus::Failed => {
                println!(
                    "{symbol}: {} ({})",
                    ui::style_text("failed", ui::StyleType::Error),
                    outcome.error.as_deref().unwrap_or("unknown error")
                );
            }
        }
        summary.outcomes.push(outcome);

        // Gentle throttle to respect data source rate limits.
        tokio::time::sleep(options.sleep).await;
    }

    Ok(summary)
}

async fn process_ticker(
    symbol: &str,
    provider: &(dyn StatementProvider + Send + Sync),
    options: &FetchOptions,
) -> Result<TickerOutcome> {
    let slug = ticker::slugify(symbol);
    let yearly = FetchDecision::evaluate(options.force, &options.data_dir, &slug, Frequency::Yearly);
    let quarterly =
        FetchDecision::evaluate(options.force, &options.data_dir, &slug, Frequency::Quarterly);

    if !yearly.is_needed() && !quarterly.is_needed() {
        debug!("Both frequencies cached for {symbol}");
        return Ok(TickerOutcome {
            ticker: symbol.to_string(),
            status: TickerStatus::Cached,
            yearly_rows: 0,
            quarterly_rows: 0,
            error: None,
        });
    }

    let (stmts_yearly, stmts_quarterly) =
        match fetch_needed(symbol, provider, yearly, quarterly).await {
            Ok(pair) => pair,
            Err(e) => {
                warn!(error = %e, "Statement fetch failed for {symbol}");
                return Ok(TickerOutcome {
                    ticker: symbol.to_string(),
                    status: TickerStatus::Failed,
                    yearly_rows: 0,
                    quarterly_rows: 0,
                    error: Some(e.to_string()),
                });
            }
        };

    if yearly.is_needed() && stmts_yearly.is_complete() {
        store::save_statements(&stmts_yearly, &options.data_dir, &slug, Frequency::Yearly)?;
    }
    if quarterly.is_needed() && stmts_quarterly.is_complete() {
        store::save_statements(
            &stmts_quarterly,
            &options.data_dir,
            &slug,
            Frequency::Quarterly,
        )?;
    }

    Ok(TickerOutcome {
        ticker: symbol.to_string(),
        status: TickerStatus::Ok,
        yearly_rows: stmts_yearly.balance_sheet.row_count(),
        quarterly_rows: stmts_quarterly.balance_sheet.row_count(),
        error: None,
    })
}

/// Fetches only the frequencies that need it; the rest get an empty
/// placeholder so no redundant provider calls are made.
async fn fetch_needed(
    symbol: &str,
    provider: &(dyn StatementProvider + Send + Sync),
    yearly: FetchDecision,
    quarterly: FetchDecision,
) -> Result<(Statements, Statements)> {
    let stmts_yearly = if yearly.is_needed() {
        provider.fetch_statements(symbol, Frequency::Yearly).await?
    } else {
        Statements::empty()
    };

    let stmts_quarterly = if quarterly.is_needed() {
        provider
            .fetch_statements(symbol, Frequency::Quarterly)
            .await?
    } else {
        Statements::empty()
    };

    Ok((stmts_yearly, stmts_quarterly))
}
