//! Alpaca client exposing the collaborator traits used by a trading pass

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use std::time::Duration;
use tracing::{info, instrument};

use super::rest::AlpacaRestClient;
use crate::common::errors::{EngineError, Result};
use crate::common::traits::{Brokerage, MarketCalendar, PriceOracle};
use crate::common::types::{OrderReceipt, OrderTicket};
use crate::config::types::{AlpacaConfig, AppSettings};

/// Combined Alpaca client: price oracle, brokerage and market calendar
#[derive(Debug, Clone)]
pub struct AlpacaClient {
    rest_client: AlpacaRestClient,
}

impl AlpacaClient {
    /// Create a new Alpaca client from configuration
    pub fn new(config: &AlpacaConfig, settings: &AppSettings) -> Result<Self> {
        if config.credentials.is_empty() {
            return Err(EngineError::Configuration(
                "no Alpaca credentials configured (set ALPACA_API_KEY / ALPACA_SECRET_KEY)"
                    .to_string(),
            ));
        }
        let timeout = Duration::from_secs(settings.request_timeout_seconds);
        let rest_client = AlpacaRestClient::from_config(config, timeout)?;
        info!(
            trading_url = %config.trading_url,
            credentials = rest_client.credential_count(),
            "Created Alpaca client"
        );
        Ok(Self { rest_client })
    }

    /// Wrap an already configured REST client
    pub fn from_rest(rest_client: AlpacaRestClient) -> Self {
        Self { rest_client }
    }

    /// Get a reference to the REST client
    pub fn rest(&self) -> &AlpacaRestClient {
        &self.rest_client
    }
}

#[async_trait]
impl PriceOracle for AlpacaClient {
    #[instrument(skip(self))]
    async fn last_price(&self, ticker: &str) -> Result<Decimal> {
        let response = self
            .rest_client
            .get_latest_trade(ticker)
            .await
            .map_err(|e| EngineError::lookup(ticker, e))?;
        Ok(response.trade.price)
    }

    #[instrument(skip(self))]
    async fn is_fractionable(&self, ticker: &str) -> Result<bool> {
        let asset = self
            .rest_client
            .get_asset(ticker)
            .await
            .map_err(|e| EngineError::lookup(ticker, e))?;
        Ok(asset.fractionable)
    }
}

#[async_trait]
impl Brokerage for AlpacaClient {
    async fn submit_order(&self, ticket: &OrderTicket) -> Result<OrderReceipt> {
        let response = self
            .rest_client
            .submit_order(ticket)
            .await
            .map_err(|e| EngineError::order(&ticket.symbol, e))?;

        Ok(OrderReceipt {
            order_id: response.id,
            symbol: response.symbol,
            status: response.status,
            submitted_at: response.submitted_at.unwrap_or_else(Utc::now),
        })
    }

    async fn buying_power(&self) -> Result<Decimal> {
        Ok(self.rest_client.get_account().await?.buying_power)
    }

    fn name(&self) -> &'static str {
        "alpaca"
    }
}

#[async_trait]
impl MarketCalendar for AlpacaClient {
    async fn is_calendar_trading_day(&self, date: NaiveDate) -> Result<bool> {
        let days = self.rest_client.get_calendar(date, date).await?;
        Ok(days.iter().any(|day| day.date == date))
    }
}
