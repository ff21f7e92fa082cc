use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc, Weekday};
use chrono_tz::Tz;
use tracing::debug;

use super::SessionState;
use crate::common::errors::{EngineError, Result};
use crate::common::traits::MarketCalendar;
use crate::config::types::{SessionConfig, SessionWindow};

/// Maps wall-clock instants onto configured trading windows
#[derive(Debug, Clone)]
pub struct SessionClassifier {
    timezone: Tz,
    windows: Vec<SessionWindow>,
    allow_pre_market: bool,
}

impl SessionClassifier {
    pub fn new(timezone: Tz, windows: Vec<SessionWindow>, allow_pre_market: bool) -> Self {
        Self {
            timezone,
            windows,
            allow_pre_market,
        }
    }

    /// Build a classifier from session configuration
    pub fn from_config(config: &SessionConfig) -> Result<Self> {
        let timezone = config
            .timezone
            .parse::<Tz>()
            .map_err(|e| EngineError::Configuration(format!("invalid timezone: {}", e)))?;
        Ok(Self::new(
            timezone,
            config.windows.clone(),
            config.allow_pre_market,
        ))
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    /// Convert an instant to market-local time
    pub fn local(&self, now: DateTime<Utc>) -> DateTime<Tz> {
        self.timezone.from_utc_datetime(&now.naive_utc())
    }

    /// First configured window containing `now`, if any
    pub fn window_for(&self, now: DateTime<Utc>) -> Option<&SessionWindow> {
        let time = self.local(now).time();
        self.windows.iter().find(|window| window.contains(time))
    }

    /// Session state at `now`; `Closed` outside every window
    pub fn classify(&self, now: DateTime<Utc>) -> SessionState {
        let state = self
            .window_for(now)
            .map(|window| window.state)
            .unwrap_or(SessionState::Closed);
        debug!(%now, ?state, "Classified session");
        state
    }

    /// Whether a pass in `state` may send orders to the broker
    pub fn permits_dispatch(&self, state: SessionState) -> bool {
        match state {
            SessionState::Closed => false,
            SessionState::PreMarket => self.allow_pre_market,
            SessionState::Regular | SessionState::AfterHours => true,
        }
    }

    /// Market-local calendar date of `now`
    pub fn local_date(&self, now: DateTime<Utc>) -> NaiveDate {
        self.local(now).date_naive()
    }

    /// Weekend days are never trading days; otherwise the calendar decides
    pub async fn is_trading_day(
        &self,
        now: DateTime<Utc>,
        calendar: &dyn MarketCalendar,
    ) -> Result<bool> {
        let date = self.local_date(now);
        if matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
            return Ok(false);
        }
        calendar.is_calendar_trading_day(date).await
    }

    /// Fail with `NonTradingDay` unless `now` falls on a trading day
    pub async fn ensure_trading_day(
        &self,
        now: DateTime<Utc>,
        calendar: &dyn MarketCalendar,
    ) -> Result<()> {
        if self.is_trading_day(now, calendar).await? {
            Ok(())
        } else {
            Err(EngineError::NonTradingDay(self.local_date(now)))
        }
    }
}
