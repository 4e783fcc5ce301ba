use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, instrument};

use crate::statement::{Frequency, StatementRow, StatementTable, Statements};
use crate::statement_provider::StatementProvider;

pub const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";

/// quoteSummary modules requested per frequency. The quarterly module names
/// differ but the payload shape is identical.
fn modules(frequency: Frequency) -> &'static str {
    match frequency {
        Frequency::Yearly => "balanceSheetHistory,incomeStatementHistory",
        Frequency::Quarterly => "balanceSheetHistoryQuarterly,incomeStatementHistoryQuarterly",
    }
}

// YahooStatementProvider implementation for StatementProvider
pub struct YahooStatementProvider {
    base_url: String,
}

impl YahooStatementProvider {
    pub fn new(base_url: &str) -> Self {
        YahooStatementProvider {
            base_url: base_url.to_string(),
        }
    }
}

#[derive(Deserialize, Debug)]
struct YahooSummaryResponse {
    #[serde(rename = "quoteSummary")]
    quote_summary: QuoteSummary,
}

#[derive(Deserialize, Debug)]
struct QuoteSummary {
    result: Option<Vec<SummaryItem>>,
}

#[derive(Deserialize, Debug)]
struct SummaryItem {
    #[serde(
        rename = "balanceSheetHistory",
        alias = "balanceSheetHistoryQuarterly"
    )]
    balance_sheet: Option<BalanceSheetModule>,
    #[serde(
        rename = "incomeStatementHistory",
        alias = "incomeStatementHistoryQuarterly"
    )]
    income_statement: Option<IncomeStatementModule>,
}

#[derive(Deserialize, Debug)]
struct BalanceSheetModule {
    #[serde(rename = "balanceSheetStatements", default)]
    statements: Vec<RawStatement>,
}

#[derive(Deserialize, Debug)]
struct IncomeStatementModule {
    #[serde(rename = "incomeStatementHistory", default)]
    statements: Vec<RawStatement>,
}

#[derive(Deserialize, Debug)]
struct RawStatement {
    #[serde(rename = "endDate")]
    end_date: PeriodEnd,
    // Line items are dynamic: each is an object with a "raw" figure. Scalars
    // like maxAge also flatten in here and are filtered out later.
    #[serde(flatten)]
    line_items: BTreeMap<String, serde_json::Value>,
}

#[derive(Deserialize, Debug)]
struct PeriodEnd {
    raw: i64,
}

fn figure(value: &serde_json::Value) -> Option<f64> {
    value.get("raw")?.as_f64()
}

/// Pivots raw statements into a period-by-line-item table. Columns are the
/// union of line items over all periods (sorted for a deterministic header);
/// rows end up sorted by period ascending.
fn build_table(statements: &[RawStatement]) -> StatementTable {
    let mut columns = BTreeSet::new();
    for statement in statements {
        for (name, value) in &statement.line_items {
            if figure(value).is_some() {
                columns.insert(name.clone());
            }
        }
    }
    let columns: Vec<String> = columns.into_iter().collect();

    let rows = statements
        .iter()
        .filter_map(|statement| {
            let period = Utc
                .timestamp_opt(statement.end_date.raw, 0)
                .single()?
                .date_naive();
            let values = columns
                .iter()
                .map(|column| statement.line_items.get(column).and_then(figure))
                .collect();
            Some(StatementRow { period, values })
        })
        .collect();

    StatementTable::new(columns, rows)
}

#[async_trait]
impl StatementProvider for YahooStatementProvider {
    #[instrument(
        name = "YahooStatementFetch",
        skip(self),
        fields(symbol = %symbol, frequency = %frequency)
    )]
    async fn fetch_statements(&self, symbol: &str, frequency: Frequency) -> Result<Statements> {
        let url = format!(
            "{}/v10/finance/quoteSummary/{}?modules={}",
            self.base_url,
            symbol,
            modules(frequency)
        );
        debug!("Requesting statement data from {}", url);

        let client = reqwest::Client::builder().user_agent("finstmt/1.0").build()?;
        let response = client
            .get(&url)
            .send()
            .await
            .map_err(|e| anyhow!("Request error: {} for symbol: {} URL: {}", e, symbol, url))?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "HTTP error: {} for symbol: {}",
                response.status(),
                symbol
            ));
        }

        let text = response.text().await?;
        let data: YahooSummaryResponse = serde_json::from_str(&text)
            .map_err(|e| anyhow!("Failed to parse JSON response for {}: {}", symbol, e))?;

        let item = data
            .quote_summary
            .result
            .unwrap_or_default()
            .into_iter()
            .next();

        // Either statement missing means "no data", not an error.
        let (balance_sheet, income_statement) = match item {
            Some(SummaryItem {
                balance_sheet: Some(bs),
                income_statement: Some(is),
            }) => (bs.statements, is.statements),
            _ => {
                debug!("No statement data for symbol: {}", symbol);
                return Ok(Statements::empty());
            }
        };

        Ok(Statements {
            balance_sheet: build_table(&balance_sheet),
            income_statement: build_table(&income_statement),
        })
    }
}
