//! Trade sizing against a fixed capital pool
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  OrderBook (unique tickers)                                 │
//! │       │                                                     │
//! │       ▼  PriceOracle::is_fractionable (buys only)           │
//! │  ┌──────────────────────┐   ┌─────────────────────────┐     │
//! │  │ whole-share group    │   │ fractional group        │     │
//! │  │ sells + whole buys   │   │ fractionable buys       │     │
//! │  └──────────┬───────────┘   └────────────┬────────────┘     │
//! │             ▼                            │                  │
//! │  budget = capital / n                    │                  │
//! │  price <= budget → 1 share               │                  │
//! │  withdraw Σ prices once                  │                  │
//! │             │                            ▼                  │
//! │             └──────────────► budget = remaining / m         │
//! │                              qty = budget / price           │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Components
//!
//! - [`AllocationEngine`]: runs one allocation over an order book
//! - [`CapitalLedger`]: the pass-scoped capital balance
//! - [`AllocationReport`]: sized, rejected and dropped orders
//! - [`InMemoryPriceOracle`]: fixed quotes for dry runs and tests

mod engine;
mod ledger;
mod oracle;
mod types;

pub use engine::{AllocationEngine, QUANTITY_SCALE};
pub use ledger::CapitalLedger;
pub use oracle::InMemoryPriceOracle;
pub use types::{AllocationReport, DroppedOrder, RejectedOrder};
