//! On-disk statement cache: CSV files partitioned by frequency.
//!
//! The files themselves are the cache. A ticker/frequency pair is considered
//! cached only when both the balance-sheet and income-statement files exist.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::statement::{Frequency, StatementTable, Statements};

/// Expected (balance sheet, income statement) file paths for a slug and
/// frequency under the data root.
pub fn statement_paths(root: &Path, slug: &str, frequency: Frequency) -> (PathBuf, PathBuf) {
    let freq_dir = root.join(frequency.as_str());
    let bs_path = freq_dir.join(format!("{slug}_balance_sheet_{frequency}.csv"));
    let is_path = freq_dir.join(format!("{slug}_income_statement_{frequency}.csv"));
    (bs_path, is_path)
}

/// Returns true when cached files are missing for a ticker/frequency.
/// Partial presence counts as a miss.
pub fn needs_fetch(root: &Path, slug: &str, frequency: Frequency) -> bool {
    let (bs_path, is_path) = statement_paths(root, slug, frequency);
    let cached = bs_path.exists() && is_path.exists();
    if cached {
        debug!("Cache HIT for {slug} ({frequency})");
    } else {
        debug!("Cache MISS for {slug} ({frequency})");
    }
    !cached
}

/// Persists both statement tables under the frequency subdirectory, creating
/// it if absent. Callers must not pass empty tables; an empty fetch result is
/// skipped upstream.
pub fn save_statements(
    statements: &Statements,
    root: &Path,
    slug: &str,
    frequency: Frequency,
) -> Result<()> {
    let freq_dir = root.join(frequency.as_str());
    std::fs::create_dir_all(&freq_dir)
        .with_context(|| format!("Failed to create directory: {}", freq_dir.display()))?;

    let (bs_path, is_path) = statement_paths(root, slug, frequency);
    write_table(&statements.balance_sheet, &bs_path)?;
    write_table(&statements.income_statement, &is_path)?;

    debug!("Saved {frequency} statements for {slug}");
    Ok(())
}

/// Writes one table as CSV: header row is an empty period cell followed by
/// the line items, data rows start with the ISO period date. Missing values
/// become empty cells.
fn write_table(table: &StatementTable, path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create file: {}", path.display()))?;

    let mut header = Vec::with_capacity(table.columns.len() + 1);
    header.push(String::new());
    header.extend(table.columns.iter().cloned());
    writer.write_record(&header)?;

    for row in &table.rows {
        let mut record = Vec::with_capacity(table.columns.len() + 1);
        record.push(row.period.to_string());
        record.extend(
            row.values
                .iter()
                .map(|value| value.map(|v| v.to_string()).unwrap_or_default()),
        );
        writer.write_record(&record)?;
    }

    writer
        .flush()
        .with_context(|| format!("Failed to write file: {}", path.display()))?;
    Ok(())
}
