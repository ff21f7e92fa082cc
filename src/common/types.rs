//! Unified types shared by ingest, allocation and execution

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Order side (buy or sell)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Buy,
    Sell,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Buy => write!(f, "buy"),
            Side::Sell => write!(f, "sell"),
        }
    }
}

/// Order type sent to the broker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderType {
    Market,
}

/// How long an order stays working at the broker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeInForce {
    Day,
}

/// A single buy/sell recommendation read from a batch
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OrderRequest {
    /// Upper-cased ticker symbol
    pub ticker: String,
    pub side: Side,
    /// Dollar amount carried by older batch layouts; informational only
    pub raw_amount: Option<Decimal>,
}

impl OrderRequest {
    pub fn new(ticker: impl Into<String>, side: Side) -> Self {
        Self {
            ticker: ticker.into(),
            side,
            raw_amount: None,
        }
    }
}

/// Ordered set of order requests for one pass, unique by ticker
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderBook {
    requests: Vec<OrderRequest>,
}

impl OrderBook {
    /// Build a book from requests, keeping the last request seen per ticker
    ///
    /// Retained requests stay in the order of their final occurrence.
    pub fn from_requests(requests: Vec<OrderRequest>) -> Self {
        let mut seen = std::collections::HashSet::new();
        let mut kept: Vec<OrderRequest> = requests
            .into_iter()
            .rev()
            .filter(|req| seen.insert(req.ticker.clone()))
            .collect();
        kept.reverse();
        Self { requests: kept }
    }

    pub fn requests(&self) -> &[OrderRequest] {
        &self.requests
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    pub fn get(&self, ticker: &str) -> Option<&OrderRequest> {
        self.requests.iter().find(|req| req.ticker == ticker)
    }
}

/// Price and tradability facts for one ticker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetInfo {
    pub ticker: String,
    /// Last trade price, always positive
    pub last_price: Decimal,
    pub fractionable: bool,
}

/// An order with a concrete executable quantity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizedOrder {
    pub ticker: String,
    pub side: Side,
    /// Exactly 1 for whole-share orders, a positive decimal otherwise
    pub quantity: Decimal,
    /// Last price the quantity was sized against
    pub reference_price: Decimal,
    pub fractional: bool,
}

impl SizedOrder {
    /// Capital this order was sized to consume
    pub fn notional(&self) -> Decimal {
        self.quantity * self.reference_price
    }
}

/// Order ticket handed to the brokerage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderTicket {
    pub symbol: String,
    pub qty: Decimal,
    pub side: Side,
    #[serde(rename = "type")]
    pub order_type: OrderType,
    pub time_in_force: TimeInForce,
}

impl From<&SizedOrder> for OrderTicket {
    fn from(order: &SizedOrder) -> Self {
        Self {
            symbol: order.ticker.clone(),
            qty: order.quantity,
            side: order.side,
            order_type: OrderType::Market,
            time_in_force: TimeInForce::Day,
        }
    }
}

/// Broker acknowledgement for a submitted order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderReceipt {
    pub order_id: String,
    pub symbol: String,
    pub status: String,
    pub submitted_at: DateTime<Utc>,
}

/// Result of attempting one sized order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderOutcome {
    Submitted {
        order: SizedOrder,
        receipt: OrderReceipt,
    },
    Failed {
        order: SizedOrder,
        reason: String,
    },
}

impl OrderOutcome {
    pub fn ticker(&self) -> &str {
        match self {
            OrderOutcome::Submitted { order, .. } => &order.ticker,
            OrderOutcome::Failed { order, .. } => &order.ticker,
        }
    }

    pub fn is_submitted(&self) -> bool {
        matches!(self, OrderOutcome::Submitted { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    #[test]
    fn test_order_book_keeps_last_occurrence() {
        let book = OrderBook::from_requests(vec![
            OrderRequest::new("AAPL", Side::Buy),
            OrderRequest::new("MSFT", Side::Sell),
            OrderRequest::new("AAPL", Side::Sell),
        ]);

        let tickers: Vec<_> = book.requests().iter().map(|r| r.ticker.as_str()).collect();
        assert_eq!(tickers, vec!["MSFT", "AAPL"]);
        assert_eq!(book.get("AAPL").map(|r| r.side), Some(Side::Sell));
    }

    #[test]
    fn test_ticket_from_sized_order() {
        let order = SizedOrder {
            ticker: "TSLA".to_string(),
            side: Side::Buy,
            quantity: dec!(0.25),
            reference_price: dec!(200),
            fractional: true,
        };

        let ticket = OrderTicket::from(&order);
        assert_eq!(ticket.symbol, "TSLA");
        assert_eq!(ticket.qty, dec!(0.25));
        assert_eq!(ticket.order_type, OrderType::Market);
        assert_eq!(order.notional(), dec!(50));
    }

    #[test]
    fn test_ticket_serializes_broker_fields() {
        let ticket = OrderTicket {
            symbol: "F".to_string(),
            qty: dec!(1),
            side: Side::Sell,
            order_type: OrderType::Market,
            time_in_force: TimeInForce::Day,
        };

        let value = serde_json::to_value(&ticket).unwrap();
        assert_eq!(value["side"], "sell");
        assert_eq!(value["type"], "market");
        assert_eq!(value["time_in_force"], "day");
    }
}
