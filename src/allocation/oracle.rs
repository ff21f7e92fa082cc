use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};

use crate::common::errors::{EngineError, Result};
use crate::common::traits::PriceOracle;
use crate::common::types::AssetInfo;

/// Simple in-memory price oracle
///
/// Serves fixed quotes from a HashMap. Used for dry runs and tests;
/// unknown tickers fail the same way a live lookup would.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPriceOracle {
    assets: HashMap<String, AssetInfo>,
    failing: HashSet<String>,
}

impl InMemoryPriceOracle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_asset(mut self, ticker: impl Into<String>, price: Decimal, fractionable: bool) -> Self {
        self.set_asset(ticker, price, fractionable);
        self
    }

    /// Update or insert a quote
    pub fn set_asset(&mut self, ticker: impl Into<String>, price: Decimal, fractionable: bool) {
        let ticker = ticker.into();
        self.assets.insert(
            ticker.clone(),
            AssetInfo {
                ticker,
                last_price: price,
                fractionable,
            },
        );
    }

    /// Make every lookup for `ticker` fail
    pub fn fail_ticker(mut self, ticker: impl Into<String>) -> Self {
        self.failing.insert(ticker.into());
        self
    }

    fn asset(&self, ticker: &str) -> Result<&AssetInfo> {
        if self.failing.contains(ticker) {
            return Err(EngineError::lookup(ticker, "lookup unavailable"));
        }
        self.assets
            .get(ticker)
            .ok_or_else(|| EngineError::lookup(ticker, "unknown ticker"))
    }
}

#[async_trait]
impl PriceOracle for InMemoryPriceOracle {
    async fn last_price(&self, ticker: &str) -> Result<Decimal> {
        self.asset(ticker).map(|asset| asset.last_price)
    }

    async fn is_fractionable(&self, ticker: &str) -> Result<bool> {
        self.asset(ticker).map(|asset| asset.fractionable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_known_and_unknown_tickers() {
        let oracle = InMemoryPriceOracle::new().with_asset("AAPL", dec!(190.5), true);

        assert_eq!(oracle.last_price("AAPL").await.unwrap(), dec!(190.5));
        assert!(oracle.is_fractionable("AAPL").await.unwrap());
        assert!(matches!(
            oracle.last_price("NOPE").await,
            Err(EngineError::Lookup { .. })
        ));
    }

    #[tokio::test]
    async fn test_failing_ticker() {
        let oracle = InMemoryPriceOracle::new()
            .with_asset("AAPL", dec!(190.5), true)
            .fail_ticker("AAPL");
        assert!(oracle.is_fractionable("AAPL").await.is_err());
    }
}
