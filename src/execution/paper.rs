//! In-process broker for dry runs

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use std::collections::HashSet;
use tokio::sync::Mutex;
use tracing::info;

use crate::common::errors::{EngineError, Result};
use crate::common::traits::Brokerage;
use crate::common::types::{OrderReceipt, OrderTicket};

#[derive(Debug, Default)]
struct PaperState {
    buying_power: Decimal,
    tickets: Vec<OrderTicket>,
    next_id: u64,
}

/// Accepts orders without contacting any exchange
///
/// Every well-formed ticket is accepted and recorded. Symbols registered
/// with [`PaperBroker::reject_symbol`] are always refused.
#[derive(Debug, Default)]
pub struct PaperBroker {
    state: Mutex<PaperState>,
    rejected_symbols: HashSet<String>,
}

impl PaperBroker {
    pub fn new(buying_power: Decimal) -> Self {
        Self {
            state: Mutex::new(PaperState {
                buying_power,
                ..PaperState::default()
            }),
            rejected_symbols: HashSet::new(),
        }
    }

    pub fn reject_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.rejected_symbols.insert(symbol.into());
        self
    }

    /// Tickets accepted so far, in submission order
    pub async fn tickets(&self) -> Vec<OrderTicket> {
        self.state.lock().await.tickets.clone()
    }
}

#[async_trait]
impl Brokerage for PaperBroker {
    async fn submit_order(&self, ticket: &OrderTicket) -> Result<OrderReceipt> {
        if self.rejected_symbols.contains(&ticket.symbol) {
            return Err(EngineError::order(&ticket.symbol, "symbol rejected"));
        }
        if ticket.qty <= Decimal::ZERO {
            return Err(EngineError::order(&ticket.symbol, "quantity must be positive"));
        }

        let mut state = self.state.lock().await;
        state.next_id += 1;
        let order_id = format!("paper-{}", state.next_id);
        state.tickets.push(ticket.clone());
        info!(
            symbol = %ticket.symbol,
            side = %ticket.side,
            qty = %ticket.qty,
            %order_id,
            "Paper order accepted"
        );

        Ok(OrderReceipt {
            order_id,
            symbol: ticket.symbol.clone(),
            status: "accepted".to_string(),
            submitted_at: Utc::now(),
        })
    }

    async fn buying_power(&self) -> Result<Decimal> {
        Ok(self.state.lock().await.buying_power)
    }

    fn name(&self) -> &'static str {
        "paper"
    }
}
