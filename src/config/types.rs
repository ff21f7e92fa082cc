//! Configuration types

use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::common::retry::RetryPolicy;
use crate::session::SessionState;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Alpaca brokerage and market data configuration
    #[serde(default)]
    pub alpaca: AlpacaConfig,
    /// Session windows and calendar settings
    #[serde(default)]
    pub sessions: SessionConfig,
    /// General application settings
    #[serde(default)]
    pub settings: AppSettings,
}

/// Alpaca platform configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlpacaConfig {
    /// Credentials tried in order when a request is rejected
    #[serde(default)]
    pub credentials: Vec<ApiCredentials>,
    /// Base URL for the trading API (orders, assets, account, calendar)
    #[serde(default = "default_alpaca_trading_url")]
    pub trading_url: String,
    /// Base URL for the market data API
    #[serde(default = "default_alpaca_data_url")]
    pub data_url: String,
    /// Market data feed (`iex` works on free plans, `sip` needs a subscription)
    #[serde(default = "default_alpaca_data_feed")]
    pub data_feed: String,
    /// Retry budget per credential
    #[serde(default)]
    pub retry: RetryPolicy,
}

impl Default for AlpacaConfig {
    fn default() -> Self {
        Self {
            credentials: Vec::new(),
            trading_url: default_alpaca_trading_url(),
            data_url: default_alpaca_data_url(),
            data_feed: default_alpaca_data_feed(),
            retry: RetryPolicy::default(),
        }
    }
}

fn default_alpaca_trading_url() -> String {
    "https://paper-api.alpaca.markets".to_string()
}

fn default_alpaca_data_url() -> String {
    "https://data.alpaca.markets".to_string()
}

fn default_alpaca_data_feed() -> String {
    "iex".to_string()
}

/// One named trading window and the batch it reads and writes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionWindow {
    pub name: String,
    pub state: SessionState,
    /// Inclusive start, market-local time
    pub start: NaiveTime,
    /// Inclusive end, market-local time
    pub end: NaiveTime,
    /// Batch file holding pending orders for this window
    pub batch: PathBuf,
}

impl SessionWindow {
    pub fn contains(&self, time: NaiveTime) -> bool {
        time >= self.start && time <= self.end
    }
}

/// Session classification settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// IANA timezone the windows are expressed in
    #[serde(default = "default_timezone")]
    pub timezone: String,
    /// Whether orders may be dispatched from a pre-market window
    #[serde(default = "default_allow_pre_market")]
    pub allow_pre_market: bool,
    /// Windows checked in order; the first match wins
    #[serde(default = "default_windows")]
    pub windows: Vec<SessionWindow>,
    /// Market holidays used when no broker calendar is available
    #[serde(default)]
    pub holidays: Vec<NaiveDate>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            allow_pre_market: default_allow_pre_market(),
            windows: default_windows(),
            holidays: Vec::new(),
        }
    }
}

fn default_timezone() -> String {
    "America/New_York".to_string()
}

fn default_allow_pre_market() -> bool {
    true
}

fn default_windows() -> Vec<SessionWindow> {
    vec![
        SessionWindow {
            name: "morning".to_string(),
            state: SessionState::PreMarket,
            start: NaiveTime::from_hms_opt(9, 10, 0).unwrap_or_default(),
            end: NaiveTime::from_hms_opt(9, 40, 0).unwrap_or_default(),
            batch: PathBuf::from("data/trades_morning.csv"),
        },
        SessionWindow {
            name: "afternoon".to_string(),
            state: SessionState::Regular,
            start: NaiveTime::from_hms_opt(15, 40, 0).unwrap_or_default(),
            end: NaiveTime::from_hms_opt(16, 0, 0).unwrap_or_default(),
            batch: PathBuf::from("data/trades_afternoon.csv"),
        },
    ]
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
    /// Capital for one pass; account buying power is used when absent
    #[serde(default)]
    pub capital: Option<Decimal>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            request_timeout_seconds: default_request_timeout(),
            capital: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

/// API credentials for authenticated requests
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiCredentials {
    pub api_key: String,
    pub api_secret: String,
}

impl ApiCredentials {
    pub fn new(api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_secret: api_secret.into(),
        }
    }
}

impl std::fmt::Debug for ApiCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiCredentials")
            .field("api_key", &"<REDACTED>")
            .field("api_secret", &"<REDACTED>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_windows() {
        let config = SessionConfig::default();
        assert_eq!(config.windows.len(), 2);
        assert_eq!(config.windows[0].name, "morning");
        assert!(config.windows[1].contains(NaiveTime::from_hms_opt(16, 0, 0).unwrap()));
        assert!(!config.windows[1].contains(NaiveTime::from_hms_opt(16, 0, 1).unwrap()));
    }

    #[test]
    fn test_credentials_are_redacted() {
        let creds = ApiCredentials::new("PKTEST", "very-secret");
        let printed = format!("{:?}", creds);
        assert!(!printed.contains("PKTEST"));
        assert!(!printed.contains("very-secret"));
    }
}
