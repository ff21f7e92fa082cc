//! Alpaca-specific message types

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Asset metadata from `GET /v2/assets/{symbol}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetResponse {
    #[serde(default)]
    pub id: String,
    pub symbol: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub tradable: bool,
    #[serde(default)]
    pub fractionable: bool,
}

/// Latest trade from `GET /v2/stocks/{symbol}/trades/latest`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LatestTradeResponse {
    pub symbol: String,
    pub trade: TradeData,
}

/// A single trade print
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeData {
    /// Trade price
    #[serde(rename = "p")]
    pub price: Decimal,
    /// Trade size
    #[serde(rename = "s", default)]
    pub size: Decimal,
    /// Trade timestamp
    #[serde(rename = "t", default)]
    pub timestamp: Option<DateTime<Utc>>,
}

/// Order acknowledgement from `POST /v2/orders`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderResponse {
    pub id: String,
    #[serde(default)]
    pub client_order_id: String,
    pub symbol: String,
    pub status: String,
    #[serde(default)]
    pub qty: Option<Decimal>,
    #[serde(default)]
    pub submitted_at: Option<DateTime<Utc>>,
}

/// Account snapshot from `GET /v2/account`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountResponse {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub status: String,
    pub buying_power: Decimal,
    #[serde(default)]
    pub cash: Option<Decimal>,
}

/// One row of `GET /v2/calendar`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarDay {
    pub date: NaiveDate,
    #[serde(default)]
    pub open: String,
    #[serde(default)]
    pub close: String,
}

/// Error body returned on non-success statuses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub code: Option<i64>,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_latest_trade() {
        let json = r#"{
            "symbol": "AAPL",
            "trade": {"t": "2024-03-12T14:30:00.123Z", "x": "V", "p": 172.62, "s": 100, "c": ["@"], "i": 1, "z": "C"}
        }"#;
        let parsed: LatestTradeResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.trade.price, dec!(172.62));
        assert!(parsed.trade.timestamp.is_some());
    }

    #[test]
    fn test_parse_account_strings() {
        let json = r#"{"id": "acc", "status": "ACTIVE", "buying_power": "2500.50", "cash": "1250.25"}"#;
        let parsed: AccountResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.buying_power, dec!(2500.50));
        assert_eq!(parsed.cash, Some(dec!(1250.25)));
    }

    #[test]
    fn test_parse_calendar() {
        let json = r#"[{"date": "2024-03-12", "open": "09:30", "close": "16:00"}]"#;
        let parsed: Vec<CalendarDay> = serde_json::from_str(json).unwrap();
        assert_eq!(parsed[0].date, NaiveDate::from_ymd_opt(2024, 3, 12).unwrap());
    }
}
