use rust_decimal::{Decimal, RoundingStrategy};
use tracing::{debug, info, instrument, warn};

use super::ledger::CapitalLedger;
use super::types::{AllocationReport, DroppedOrder, RejectedOrder};
use crate::common::errors::Result;
use crate::common::traits::PriceOracle;
use crate::common::types::{OrderBook, OrderRequest, Side, SizedOrder};

/// Decimal places kept on fractional share quantities
pub const QUANTITY_SCALE: u32 = 9;

/// Splits capital between whole-share and fractional orders
///
/// Whole-share orders (every sell, plus buys of non-fractionable assets)
/// are checked against an even split of the capital and always trade
/// exactly one share. Their combined price is withdrawn once, after the
/// whole group has been evaluated. Whatever remains is split evenly
/// across the fractional buys; only their share quantities are truncated.
#[derive(Debug, Clone, Copy)]
pub struct AllocationEngine {
    quantity_scale: u32,
}

impl Default for AllocationEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl AllocationEngine {
    pub fn new() -> Self {
        Self {
            quantity_scale: QUANTITY_SCALE,
        }
    }

    /// Size every order in `book` against `ledger`
    ///
    /// Lookup failures drop the affected ticker and are reported, never
    /// returned. An error means the ledger invariant itself was violated.
    #[instrument(skip_all, fields(orders = book.len(), capital = %ledger.remaining()))]
    pub async fn allocate(
        &self,
        book: &OrderBook,
        ledger: &mut CapitalLedger,
        oracle: &dyn PriceOracle,
    ) -> Result<AllocationReport> {
        let mut report = AllocationReport {
            capital_before: ledger.remaining(),
            ..AllocationReport::default()
        };

        let (whole, fractional) = self.partition(book, oracle, &mut report).await;

        if !whole.is_empty() {
            self.size_whole_shares(&whole, ledger, oracle, &mut report)
                .await?;
        }

        if !fractional.is_empty() {
            self.size_fractional(&fractional, ledger, oracle, &mut report)
                .await?;
        }

        report.capital_after = ledger.remaining();
        info!(
            accepted = report.orders.len(),
            rejected = report.rejected.len(),
            dropped = report.dropped.len(),
            capital_after = %report.capital_after,
            "Allocation complete"
        );
        Ok(report)
    }

    async fn partition<'a>(
        &self,
        book: &'a OrderBook,
        oracle: &dyn PriceOracle,
        report: &mut AllocationReport,
    ) -> (Vec<&'a OrderRequest>, Vec<&'a OrderRequest>) {
        let mut whole = Vec::new();
        let mut fractional = Vec::new();

        // Sells are always whole-share, but an unknown asset still drops them.
        for request in book.requests() {
            match oracle.is_fractionable(&request.ticker).await {
                Ok(_) if request.side == Side::Sell => whole.push(request),
                Ok(true) => fractional.push(request),
                Ok(false) => whole.push(request),
                Err(err) => {
                    warn!(ticker = %request.ticker, error = %err, "Fractionability lookup failed, dropping");
                    report.dropped.push(dropped(request, err.to_string()));
                }
            }
        }

        debug!(
            whole = whole.len(),
            fractional = fractional.len(),
            "Partitioned order book"
        );
        (whole, fractional)
    }

    async fn size_whole_shares(
        &self,
        group: &[&OrderRequest],
        ledger: &mut CapitalLedger,
        oracle: &dyn PriceOracle,
        report: &mut AllocationReport,
    ) -> Result<()> {
        let budget = ledger.remaining() / Decimal::from(group.len());
        report.whole_share_budget = Some(budget);

        let mut accepted = Vec::new();
        for request in group {
            let Some(price) = fetch_price(oracle, request, report).await else {
                continue;
            };

            if price <= budget {
                accepted.push(SizedOrder {
                    ticker: request.ticker.clone(),
                    side: request.side,
                    quantity: Decimal::ONE,
                    reference_price: price,
                    fractional: false,
                });
            } else {
                warn!(ticker = %request.ticker, %price, %budget, "Price above per-share budget, rejecting");
                report.rejected.push(RejectedOrder {
                    ticker: request.ticker.clone(),
                    side: request.side,
                    price,
                    budget,
                });
            }
        }

        let committed: Decimal = accepted.iter().map(|order| order.reference_price).sum();
        if !accepted.is_empty() {
            ledger.withdraw(committed)?;
        }
        debug!(%budget, %committed, accepted = accepted.len(), "Sized whole-share group");

        report.orders.extend(accepted);
        Ok(())
    }

    async fn size_fractional(
        &self,
        group: &[&OrderRequest],
        ledger: &mut CapitalLedger,
        oracle: &dyn PriceOracle,
        report: &mut AllocationReport,
    ) -> Result<()> {
        let budget = ledger.remaining() / Decimal::from(group.len());
        report.fractional_budget = Some(budget);

        let mut accepted = Vec::new();
        for request in group {
            let Some(price) = fetch_price(oracle, request, report).await else {
                continue;
            };

            let quantity = budget
                .checked_div(price)
                .map(|q| q.round_dp_with_strategy(self.quantity_scale, RoundingStrategy::ToZero))
                .unwrap_or(Decimal::ZERO);

            if quantity <= Decimal::ZERO {
                warn!(ticker = %request.ticker, %price, %budget, "Budget buys no measurable quantity, rejecting");
                report.rejected.push(RejectedOrder {
                    ticker: request.ticker.clone(),
                    side: request.side,
                    price,
                    budget,
                });
                continue;
            }

            accepted.push(SizedOrder {
                ticker: request.ticker.clone(),
                side: request.side,
                quantity,
                reference_price: price,
                fractional: true,
            });
        }

        // The exact quotient can exceed the balance by one unit in the last
        // decimal place once multiplied back out.
        let committed = (budget * Decimal::from(accepted.len())).min(ledger.remaining());
        if !accepted.is_empty() {
            ledger.withdraw(committed)?;
        }
        debug!(%budget, %committed, remaining = %ledger.remaining(), "Sized fractional group");

        report.orders.extend(accepted);
        Ok(())
    }
}

async fn fetch_price(
    oracle: &dyn PriceOracle,
    request: &OrderRequest,
    report: &mut AllocationReport,
) -> Option<Decimal> {
    match oracle.last_price(&request.ticker).await {
        Ok(price) if price > Decimal::ZERO => Some(price),
        Ok(price) => {
            warn!(ticker = %request.ticker, %price, "Non-positive last price, dropping");
            report
                .dropped
                .push(dropped(request, format!("non-positive last price {}", price)));
            None
        }
        Err(err) => {
            warn!(ticker = %request.ticker, error = %err, "Price lookup failed, dropping");
            report.dropped.push(dropped(request, err.to_string()));
            None
        }
    }
}

fn dropped(request: &OrderRequest, reason: String) -> DroppedOrder {
    DroppedOrder {
        ticker: request.ticker.clone(),
        side: request.side,
        reason,
    }
}
