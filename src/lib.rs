//! HeadlineTrader Library
//!
//! Sizes sentiment-driven buy/sell recommendations against a fixed capital
//! pool and dispatches them to an Alpaca brokerage account, one session
//! batch at a time.

pub mod allocation;
pub mod alpaca;
pub mod batch;
pub mod common;
pub mod config;
pub mod execution;
pub mod pipeline;
pub mod session;
pub mod signals;

// Re-export commonly used types
pub use common::errors::{EngineError, Result};
pub use common::retry::{RetryDecision, RetryPolicy};
pub use common::traits::{BatchStore, Brokerage, MarketCalendar, PriceOracle};
pub use common::types::{
    AssetInfo, OrderBook, OrderOutcome, OrderReceipt, OrderRequest, OrderTicket, Side, SizedOrder,
};
pub use config::types::AppConfig;

pub use allocation::{AllocationEngine, AllocationReport, CapitalLedger, InMemoryPriceOracle};
pub use alpaca::AlpacaClient;
pub use batch::{load_batch, BatchRow, CsvBatchStore};
pub use execution::{DispatchSummary, OrderDispatcher, PaperBroker};
pub use pipeline::{PassOutcome, PassSummary, TradingPass};
pub use session::{SessionClassifier, SessionState, StaticCalendar};
