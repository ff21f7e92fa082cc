//! One trading pass: calendar check, session window, batch, allocation, dispatch
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌────────────┐   ┌─────────────┐
//! │ trading day? │──►│ session      │──►│ load_batch │──►│ allocate    │
//! │ (calendar)   │   │ window       │   │ (dedup)    │   │ (ledger)    │
//! └──────────────┘   └──────────────┘   └────────────┘   └──────┬──────┘
//!                                                                │
//!                                                         ┌──────▼──────┐
//!                                                         │ dispatch +  │
//!                                                         │ clear batch │
//!                                                         └─────────────┘
//! ```

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::path::PathBuf;
use tracing::{info, instrument, warn};

use crate::allocation::{AllocationEngine, AllocationReport, CapitalLedger};
use crate::batch::load_batch;
use crate::common::errors::Result;
use crate::common::traits::{BatchStore, Brokerage, MarketCalendar, PriceOracle};
use crate::execution::{DispatchSummary, OrderDispatcher};
use crate::session::{SessionClassifier, SessionState};

/// Everything a completed pass did
#[derive(Debug, Clone)]
pub struct PassSummary {
    pub state: SessionState,
    pub window: String,
    pub batch: PathBuf,
    pub allocation: AllocationReport,
    pub dispatch: DispatchSummary,
}

/// Result of asking for a pass
#[derive(Debug, Clone)]
pub enum PassOutcome {
    /// The batch was read, sized, dispatched and cleared
    Completed(PassSummary),
    /// Nothing was read or sent
    Skipped { state: SessionState, reason: String },
}

impl PassOutcome {
    pub fn summary(&self) -> Option<&PassSummary> {
        match self {
            PassOutcome::Completed(summary) => Some(summary),
            PassOutcome::Skipped { .. } => None,
        }
    }
}

/// Wires the collaborators of one pass together
pub struct TradingPass<'a> {
    classifier: &'a SessionClassifier,
    calendar: &'a dyn MarketCalendar,
    oracle: &'a dyn PriceOracle,
    broker: &'a dyn Brokerage,
    store: &'a dyn BatchStore,
    engine: AllocationEngine,
    batch_override: Option<PathBuf>,
}

impl<'a> TradingPass<'a> {
    pub fn new(
        classifier: &'a SessionClassifier,
        calendar: &'a dyn MarketCalendar,
        oracle: &'a dyn PriceOracle,
        broker: &'a dyn Brokerage,
        store: &'a dyn BatchStore,
    ) -> Self {
        Self {
            classifier,
            calendar,
            oracle,
            broker,
            store,
            engine: AllocationEngine::default(),
            batch_override: None,
        }
    }

    /// Read this batch instead of the one owned by the active window
    pub fn with_batch(mut self, batch: impl Into<PathBuf>) -> Self {
        self.batch_override = Some(batch.into());
        self
    }

    /// Run one pass at `now`
    ///
    /// `capital` falls back to the broker's buying power when absent.
    /// A non-trading day or an unreadable batch is an error and leaves the
    /// batch untouched. Outside a dispatching window the pass is skipped.
    #[instrument(skip(self, capital), fields(broker = self.broker.name()))]
    pub async fn run(&self, now: DateTime<Utc>, capital: Option<Decimal>) -> Result<PassOutcome> {
        self.classifier
            .ensure_trading_day(now, self.calendar)
            .await?;

        let Some(window) = self.classifier.window_for(now) else {
            info!("Outside every session window, skipping pass");
            return Ok(PassOutcome::Skipped {
                state: SessionState::Closed,
                reason: "outside every session window".to_string(),
            });
        };

        let state = window.state;
        if !self.classifier.permits_dispatch(state) {
            info!(window = %window.name, %state, "Dispatch disabled for session, skipping pass");
            return Ok(PassOutcome::Skipped {
                state,
                reason: format!("dispatch disabled during {}", state),
            });
        }

        let batch = self
            .batch_override
            .clone()
            .unwrap_or_else(|| window.batch.clone());
        let book = load_batch(self.store, &batch)?;

        let mut ledger = CapitalLedger::new(self.resolve_capital(capital).await?)?;
        let allocation = self
            .engine
            .allocate(&book, &mut ledger, self.oracle)
            .await?;

        let dispatch = OrderDispatcher::new(self.broker, self.store)
            .dispatch(&allocation.orders, &batch)
            .await?;

        info!(
            window = %window.name,
            %state,
            accepted = allocation.orders.len(),
            rejected = allocation.rejected.len(),
            dropped = allocation.dropped.len(),
            submitted = dispatch.submitted(),
            failed = dispatch.failed(),
            capital_after = %allocation.capital_after,
            "Pass complete"
        );

        Ok(PassOutcome::Completed(PassSummary {
            state,
            window: window.name.clone(),
            batch,
            allocation,
            dispatch,
        }))
    }

    async fn resolve_capital(&self, capital: Option<Decimal>) -> Result<Decimal> {
        match capital {
            Some(capital) => Ok(capital),
            None => {
                let buying_power = self.broker.buying_power().await?;
                if buying_power < Decimal::ZERO {
                    warn!(%buying_power, "Broker reported negative buying power, using zero");
                    return Ok(Decimal::ZERO);
                }
                info!(%buying_power, "Using broker buying power as capital");
                Ok(buying_power)
            }
        }
    }
}
