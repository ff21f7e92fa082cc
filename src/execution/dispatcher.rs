use std::path::Path;
use tracing::{error, info, instrument, warn};

use crate::common::errors::Result;
use crate::common::traits::{BatchStore, Brokerage};
use crate::common::types::{OrderOutcome, OrderTicket, SizedOrder};

/// Per-order results of one dispatch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchSummary {
    pub outcomes: Vec<OrderOutcome>,
}

impl DispatchSummary {
    pub fn submitted(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_submitted()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.submitted()
    }

    pub fn outcome(&self, ticker: &str) -> Option<&OrderOutcome> {
        self.outcomes.iter().find(|o| o.ticker() == ticker)
    }
}

/// Submits sized orders one at a time, then clears the consumed batch
///
/// Every order is attempted regardless of earlier failures. The batch is
/// cleared exactly once, after the last attempt, whatever the outcomes.
pub struct OrderDispatcher<'a> {
    broker: &'a dyn Brokerage,
    store: &'a dyn BatchStore,
}

impl<'a> OrderDispatcher<'a> {
    pub fn new(broker: &'a dyn Brokerage, store: &'a dyn BatchStore) -> Self {
        Self { broker, store }
    }

    /// Attempt every order and clear `batch`
    ///
    /// Only a failure to clear the batch is returned as an error.
    #[instrument(skip(self, orders), fields(orders = orders.len(), broker = self.broker.name()))]
    pub async fn dispatch(&self, orders: &[SizedOrder], batch: &Path) -> Result<DispatchSummary> {
        let mut summary = DispatchSummary::default();

        for order in orders {
            let ticket = OrderTicket::from(order);
            let outcome = match self.broker.submit_order(&ticket).await {
                Ok(receipt) => {
                    info!(
                        ticker = %order.ticker,
                        side = %order.side,
                        quantity = %order.quantity,
                        order_id = %receipt.order_id,
                        "Order submitted"
                    );
                    OrderOutcome::Submitted {
                        order: order.clone(),
                        receipt,
                    }
                }
                Err(err) => {
                    warn!(ticker = %order.ticker, error = %err, "Order failed");
                    OrderOutcome::Failed {
                        order: order.clone(),
                        reason: err.to_string(),
                    }
                }
            };
            summary.outcomes.push(outcome);
        }

        if let Err(err) = self.store.clear_batch(batch) {
            error!(batch = %batch.display(), error = %err, "Failed to clear dispatched batch");
            return Err(err);
        }

        info!(
            submitted = summary.submitted(),
            failed = summary.failed(),
            batch = %batch.display(),
            "Dispatch complete, batch cleared"
        );
        Ok(summary)
    }
}
