use rust_decimal::Decimal;

use crate::common::types::{Side, SizedOrder};

/// Order whose price exceeded its per-share budget
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedOrder {
    pub ticker: String,
    pub side: Side,
    pub price: Decimal,
    pub budget: Decimal,
}

/// Order removed from sizing because a lookup failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedOrder {
    pub ticker: String,
    pub side: Side,
    pub reason: String,
}

/// Everything one allocation pass decided
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllocationReport {
    /// Whole-share orders first, then fractional orders, each in input order
    pub orders: Vec<SizedOrder>,
    pub rejected: Vec<RejectedOrder>,
    pub dropped: Vec<DroppedOrder>,
    /// Per-share budget used for the whole-share group, if it was non-empty
    pub whole_share_budget: Option<Decimal>,
    /// Per-order budget used for the fractional group, if it was non-empty
    pub fractional_budget: Option<Decimal>,
    pub capital_before: Decimal,
    pub capital_after: Decimal,
}

impl AllocationReport {
    pub fn whole_share_orders(&self) -> impl Iterator<Item = &SizedOrder> {
        self.orders.iter().filter(|order| !order.fractional)
    }

    pub fn find(&self, ticker: &str) -> Option<&SizedOrder> {
        self.orders.iter().find(|order| order.ticker == ticker)
    }

    pub fn is_rejected(&self, ticker: &str) -> bool {
        self.rejected.iter().any(|order| order.ticker == ticker)
    }

    pub fn is_dropped(&self, ticker: &str) -> bool {
        self.dropped.iter().any(|order| order.ticker == ticker)
    }
}
