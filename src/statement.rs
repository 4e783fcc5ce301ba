//! Core data model for fetched financial statements.

use chrono::NaiveDate;
use std::fmt;

/// Reporting cadence for a statement. Selects the output subdirectory and is
/// embedded in output filenames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Frequency {
    Yearly,
    Quarterly,
}

impl Frequency {
    pub const ALL: [Frequency; 2] = [Frequency::Yearly, Frequency::Quarterly];

    pub fn as_str(self) -> &'static str {
        match self {
            Frequency::Yearly => "yearly",
            Frequency::Quarterly => "quarterly",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single reporting period: the period end date plus one value per column.
/// A missing value means the provider did not report that line item for the
/// period.
#[derive(Debug, Clone, PartialEq)]
pub struct StatementRow {
    pub period: NaiveDate,
    pub values: Vec<Option<f64>>,
}

/// A statement table: rows are reporting periods (ascending), columns are
/// financial line items. An empty table signals "no data available", not an
/// error.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StatementTable {
    pub columns: Vec<String>,
    pub rows: Vec<StatementRow>,
}

impl StatementTable {
    /// Builds a table, sorting rows by period ascending.
    pub fn new(columns: Vec<String>, mut rows: Vec<StatementRow>) -> Self {
        rows.sort_by_key(|row| row.period);
        StatementTable { columns, rows }
    }

    pub fn empty() -> Self {
        StatementTable::default()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// The balance sheet / income statement pair returned by one provider call.
#[derive(Debug, Clone, Default)]
pub struct Statements {
    pub balance_sheet: StatementTable,
    pub income_statement: StatementTable,
}

impl Statements {
    pub fn empty() -> Self {
        Statements::default()
    }

    /// True when both tables carry data and are worth persisting.
    pub fn is_complete(&self) -> bool {
        !self.balance_sheet.is_empty() && !self.income_statement.is_empty()
    }
}
