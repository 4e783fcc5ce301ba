use anyhow::Result;
use async_trait::async_trait;

use crate::statement::{Frequency, Statements};

#[async_trait]
pub trait StatementProvider: Send + Sync {
    /// Fetches the balance sheet and income statement for a symbol at the
    /// given reporting frequency. Absent data comes back as empty tables;
    /// transport and parse failures are errors.
    async fn fetch_statements(&self, symbol: &str, frequency: Frequency) -> Result<Statements>;
}
