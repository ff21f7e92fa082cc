use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashSet;

use crate::common::errors::Result;
use crate::common::traits::MarketCalendar;

/// Calendar backed by a fixed list of market holidays
///
/// Weekends are handled by the classifier, so every date not listed here
/// counts as a trading day.
#[derive(Debug, Clone, Default)]
pub struct StaticCalendar {
    holidays: HashSet<NaiveDate>,
}

impl StaticCalendar {
    pub fn new(holidays: impl IntoIterator<Item = NaiveDate>) -> Self {
        Self {
            holidays: holidays.into_iter().collect(),
        }
    }

    pub fn add_holiday(&mut self, date: NaiveDate) {
        self.holidays.insert(date);
    }
}

#[async_trait]
impl MarketCalendar for StaticCalendar {
    async fn is_calendar_trading_day(&self, date: NaiveDate) -> Result<bool> {
        Ok(!self.holidays.contains(&date))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_holidays_are_closed() {
        let christmas = NaiveDate::from_ymd_opt(2024, 12, 25).unwrap();
        let calendar = StaticCalendar::new([christmas]);

        assert!(!calendar.is_calendar_trading_day(christmas).await.unwrap());
        assert!(calendar
            .is_calendar_trading_day(NaiveDate::from_ymd_opt(2024, 12, 26).unwrap())
            .await
            .unwrap());
    }
}
