//! Error types for the application

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

/// Result type alias using our EngineError
pub type Result<T> = std::result::Result<T, EngineError>;

/// Main error type for trading pass operations
#[derive(Error, Debug)]
pub enum EngineError {
    /// Batch source unreadable or malformed
    #[error("Batch read error ({path}): {reason}")]
    BatchRead { path: String, reason: String },

    /// Batch could not be written or cleared
    #[error("Batch write error ({path}): {reason}")]
    BatchWrite { path: String, reason: String },

    /// Pass attempted on a weekend or market holiday
    #[error("Not a trading day: {0}")]
    NonTradingDay(NaiveDate),

    /// Price or fractionability lookup failed for one ticker
    #[error("Lookup failed for {ticker}: {reason}")]
    Lookup { ticker: String, reason: String },

    /// Broker refused or failed to accept one order
    #[error("Order for {ticker} failed: {reason}")]
    Order { ticker: String, reason: String },

    /// Ledger withdrawal larger than the remaining capital
    #[error("Insufficient capital: requested {requested}, available {available}")]
    InsufficientCapital {
        requested: Decimal,
        available: Decimal,
    },

    /// HTTP request errors
    #[error("HTTP request error: {0}")]
    HttpRequest(#[from] reqwest::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON parsing error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Authentication errors
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// Rate limiting errors
    #[error("Rate limit exceeded: {message}, retry after {retry_after_seconds:?} seconds")]
    RateLimit {
        message: String,
        retry_after_seconds: Option<u64>,
    },

    /// Non-success HTTP status not covered by a more specific variant
    #[error("Server returned status {status}: {message}")]
    ServerStatus { status: u16, message: String },

    /// Invalid API response
    #[error("Invalid API response: {0}")]
    InvalidResponse(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Timeout errors
    #[error("Operation timed out: {0}")]
    Timeout(String),

    /// Generic internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl EngineError {
    /// Build a lookup error for a ticker from any displayable cause
    pub fn lookup(ticker: &str, reason: impl std::fmt::Display) -> Self {
        EngineError::Lookup {
            ticker: ticker.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Build an order error for a ticker from any displayable cause
    pub fn order(ticker: &str, reason: impl std::fmt::Display) -> Self {
        EngineError::Order {
            ticker: ticker.to_string(),
            reason: reason.to_string(),
        }
    }
}
