//! Pending-order batches
//!
//! A batch is a table of `ticker,side` rows queued for one session window.
//! It is read once per pass and cleared after dispatch.

mod ingest;
mod store;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::common::types::Side;

pub use ingest::load_batch;
pub use store::CsvBatchStore;

/// Column header written to every batch file
pub const BATCH_COLUMNS: [&str; 2] = ["ticker", "side"];

/// Optional trailing column, only written when some row carries it
pub const AMOUNT_COLUMN: &str = "amount";

/// One raw row of a batch file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchRow {
    pub ticker: String,
    pub side: Side,
    /// Dollar amount column written by older tooling
    #[serde(default, deserialize_with = "empty_as_none")]
    pub amount: Option<Decimal>,
}

impl BatchRow {
    pub fn new(ticker: impl Into<String>, side: Side) -> Self {
        Self {
            ticker: ticker.into(),
            side,
            amount: None,
        }
    }
}

fn empty_as_none<'de, D>(deserializer: D) -> std::result::Result<Option<Decimal>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse().map(Some).map_err(serde::de::Error::custom),
    }
}
