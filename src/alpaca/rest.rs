//! REST API client for Alpaca trading and market data

use chrono::NaiveDate;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, instrument};

use super::auth::AuthHeaders;
use super::messages::*;
use crate::common::errors::{EngineError, Result};
use crate::common::retry::{RetryDecision, RetryPolicy};
use crate::common::types::OrderTicket;
use crate::config::types::{AlpacaConfig, ApiCredentials};

/// REST API client for Alpaca
#[derive(Debug, Clone)]
pub struct AlpacaRestClient {
    /// HTTP client
    client: Client,
    /// Base URL for the trading API
    trading_url: String,
    /// Base URL for the market data API
    data_url: String,
    /// Market data feed name
    data_feed: String,
    /// Credentials tried in order
    credentials: Vec<ApiCredentials>,
    /// Retry budget per credential
    retry: RetryPolicy,
}

impl AlpacaRestClient {
    /// Create a new REST client (no credentials yet)
    pub fn new(trading_url: &str, data_url: &str) -> Result<Self> {
        Self::with_timeout(trading_url, data_url, Duration::from_secs(30))
    }

    /// Create a new REST client with custom timeout
    pub fn with_timeout(trading_url: &str, data_url: &str, timeout: Duration) -> Result<Self> {
        for base in [trading_url, data_url] {
            url::Url::parse(base)
                .map_err(|e| EngineError::Configuration(format!("invalid URL '{}': {}", base, e)))?;
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| EngineError::Internal(e.to_string()))?;

        Ok(Self {
            client,
            trading_url: trading_url.trim_end_matches('/').to_string(),
            data_url: data_url.trim_end_matches('/').to_string(),
            data_feed: "iex".to_string(),
            credentials: Vec::new(),
            retry: RetryPolicy::default(),
        })
    }

    /// Build a client from configuration
    pub fn from_config(config: &AlpacaConfig, timeout: Duration) -> Result<Self> {
        Ok(Self::with_timeout(&config.trading_url, &config.data_url, timeout)?
            .with_credentials(config.credentials.clone())
            .with_retry(config.retry)
            .with_data_feed(&config.data_feed))
    }

    /// Set the ordered list of credentials
    pub fn with_credentials(mut self, credentials: Vec<ApiCredentials>) -> Self {
        self.credentials = credentials;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_data_feed(mut self, feed: &str) -> Self {
        self.data_feed = feed.to_string();
        self
    }

    pub fn credential_count(&self) -> usize {
        self.credentials.len()
    }

    // ========================================================================
    // Trading API
    // ========================================================================

    /// Get asset metadata (tradability, fractionability)
    #[instrument(skip(self))]
    pub async fn get_asset(&self, symbol: &str) -> Result<AssetResponse> {
        let url = format!("{}/v2/assets/{}", self.trading_url, symbol);
        debug!("Fetching asset from: {}", url);
        self.execute(|client| client.get(&url), classify_idempotent)
            .await
    }

    /// Get account details
    #[instrument(skip(self))]
    pub async fn get_account(&self) -> Result<AccountResponse> {
        let url = format!("{}/v2/account", self.trading_url);
        debug!("Fetching account from: {}", url);
        self.execute(|client| client.get(&url), classify_idempotent)
            .await
    }

    /// Get market calendar entries between two dates, inclusive
    #[instrument(skip(self))]
    pub async fn get_calendar(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<CalendarDay>> {
        let url = format!("{}/v2/calendar", self.trading_url);
        let query = [("start", start.to_string()), ("end", end.to_string())];
        debug!("Fetching calendar from: {} ({} to {})", url, start, end);
        self.execute(|client| client.get(&url).query(&query), classify_idempotent)
            .await
    }

    /// Submit an order
    ///
    /// Retried only when the request provably never reached the broker.
    #[instrument(skip(self), fields(symbol = %ticket.symbol))]
    pub async fn submit_order(&self, ticket: &OrderTicket) -> Result<OrderResponse> {
        let url = format!("{}/v2/orders", self.trading_url);
        debug!("Submitting order to: {}", url);
        self.execute(|client| client.post(&url).json(ticket), classify_submit)
            .await
    }

    // ========================================================================
    // Market Data API
    // ========================================================================

    /// Get the latest trade for a symbol
    #[instrument(skip(self))]
    pub async fn get_latest_trade(&self, symbol: &str) -> Result<LatestTradeResponse> {
        let url = format!("{}/v2/stocks/{}/trades/latest", self.data_url, symbol);
        let query = [("feed", self.data_feed.as_str())];
        debug!("Fetching latest trade from: {}", url);
        self.execute(|client| client.get(&url).query(&query), classify_idempotent)
            .await
    }

    // ========================================================================
    // Helper Methods
    // ========================================================================

    /// Send a request with each credential in turn and decode the body
    async fn execute<T, B>(&self, build: B, classify: fn(&EngineError) -> RetryDecision) -> Result<T>
    where
        T: DeserializeOwned,
        B: Fn(&Client) -> RequestBuilder,
    {
        self.retry
            .run(
                &self.credentials,
                |credentials| {
                    let request = AuthHeaders::new(credentials).apply_to_request(build(&self.client));
                    async move {
                        let response = check_status(request.send().await?).await?;
                        Ok(response.json::<T>().await?)
                    }
                },
                classify,
            )
            .await
    }
}

/// Map non-success statuses onto error variants
async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let retry_after_seconds = response
        .headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse().ok());
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorResponse>(&body)
        .map(|err| err.message)
        .unwrap_or(body);

    Err(match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            EngineError::Authentication(format!("{}: {}", status, message))
        }
        StatusCode::TOO_MANY_REQUESTS => EngineError::RateLimit {
            message,
            retry_after_seconds,
        },
        _ => EngineError::ServerStatus {
            status: status.as_u16(),
            message,
        },
    })
}

fn is_transient_transport(err: &EngineError) -> bool {
    matches!(err, EngineError::HttpRequest(e) if e.is_connect() || e.is_timeout())
}

/// Retry rules for reads, which are safe to repeat
fn classify_idempotent(err: &EngineError) -> RetryDecision {
    match err {
        EngineError::Authentication(_) => RetryDecision::NextCredential,
        EngineError::RateLimit { .. } => RetryDecision::Retry,
        EngineError::ServerStatus { status, .. } if *status >= 500 => RetryDecision::Retry,
        err if is_transient_transport(err) => RetryDecision::Retry,
        _ => RetryDecision::Abort,
    }
}

/// Retry rules for order submission
///
/// A timeout may mean the order was accepted, so only connection failures
/// and rate limiting are retried. A rejected credential is not replayed
/// under another key.
fn classify_submit(err: &EngineError) -> RetryDecision {
    match err {
        EngineError::RateLimit { .. } => RetryDecision::Retry,
        EngineError::HttpRequest(e) if e.is_connect() => RetryDecision::Retry,
        _ => RetryDecision::Abort,
    }
}
