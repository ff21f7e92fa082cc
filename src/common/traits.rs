//! Trait definitions for the collaborators a trading pass depends on

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::path::Path;

use super::errors::Result;
use super::types::{OrderReceipt, OrderTicket};
use crate::batch::BatchRow;

/// Source of last-trade prices and fractionability flags
///
/// Every call may fail independently per ticker. Callers treat a failure
/// as "drop this ticker", never as a reason to stop the pass.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PriceOracle: Send + Sync {
    /// Last trade price for a ticker
    async fn last_price(&self, ticker: &str) -> Result<Decimal>;

    /// Whether the broker accepts fractional quantities for a ticker
    async fn is_fractionable(&self, ticker: &str) -> Result<bool>;
}

/// Order-submission side of a brokerage account
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Brokerage: Send + Sync {
    /// Submit one order
    async fn submit_order(&self, ticket: &OrderTicket) -> Result<OrderReceipt>;

    /// Buying power currently reported for the account
    async fn buying_power(&self) -> Result<Decimal>;

    /// Human-readable broker name for logs
    fn name(&self) -> &'static str;
}

/// Market calendar used to tell trading days from holidays
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MarketCalendar: Send + Sync {
    /// Whether the exchange is open at all on the given date
    async fn is_calendar_trading_day(&self, date: NaiveDate) -> Result<bool>;
}

/// Persistent storage for pending order batches
#[cfg_attr(test, mockall::automock)]
pub trait BatchStore: Send + Sync {
    /// Read every row of a batch
    fn read_batch(&self, path: &Path) -> Result<Vec<BatchRow>>;

    /// Replace a batch with the given rows
    fn write_batch(&self, path: &Path, rows: &[BatchRow]) -> Result<()>;

    /// Truncate a batch to its header line
    fn clear_batch(&self, path: &Path) -> Result<()> {
        self.write_batch(path, &[])
    }

    /// Add rows to the end of a batch
    fn append_batch(&self, path: &Path, rows: &[BatchRow]) -> Result<()> {
        let mut existing = self.read_batch(path)?;
        existing.extend_from_slice(rows);
        self.write_batch(path, &existing)
    }
}
