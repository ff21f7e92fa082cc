use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info};

use crate::batch::BatchRow;
use crate::common::errors::{EngineError, Result};
use crate::common::traits::BatchStore;
use crate::common::types::Side;
use crate::config::types::SessionWindow;

/// A language-model judgement on one headline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Positive,
    Negative,
    Unknown,
}

impl Verdict {
    /// Interpret a one-word model answer: `YES`, `NO`, anything else
    pub fn parse(answer: &str) -> Self {
        match answer.trim().trim_end_matches('.').to_ascii_uppercase().as_str() {
            "YES" => Verdict::Positive,
            "NO" => Verdict::Negative,
            _ => Verdict::Unknown,
        }
    }

    pub fn score(self) -> i32 {
        match self {
            Verdict::Positive => 1,
            Verdict::Negative => -1,
            Verdict::Unknown => 0,
        }
    }
}

/// A headline already scored for its impact on one ticker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoredHeadline {
    pub ticker: String,
    pub headline: String,
    pub published_at: DateTime<Utc>,
    /// +1 good news, -1 bad news, 0 unknown
    pub score: i32,
}

/// Mean headline score for one ticker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recommendation {
    pub ticker: String,
    pub score: Decimal,
    pub headlines: usize,
}

impl Recommendation {
    /// Buy on positive sentiment, sell on negative, nothing when neutral
    pub fn side(&self) -> Option<Side> {
        if self.score > Decimal::ZERO {
            Some(Side::Buy)
        } else if self.score < Decimal::ZERO {
            Some(Side::Sell)
        } else {
            None
        }
    }
}

/// Keep headlines published today (market-local) inside `window`
pub fn filter_window(
    headlines: Vec<ScoredHeadline>,
    timezone: Tz,
    window: &SessionWindow,
    now: DateTime<Utc>,
) -> Vec<ScoredHeadline> {
    let today = now.with_timezone(&timezone).date_naive();
    let before = headlines.len();
    let kept: Vec<_> = headlines
        .into_iter()
        .filter(|headline| {
            let local = headline.published_at.with_timezone(&timezone);
            local.date_naive() == today && window.contains(local.time())
        })
        .collect();
    debug!(window = %window.name, before, after = kept.len(), "Filtered headlines");
    kept
}

/// Average scores per ticker, in first-seen ticker order
pub fn aggregate(scored: &[ScoredHeadline]) -> Vec<Recommendation> {
    let mut order: Vec<String> = Vec::new();
    let mut totals: HashMap<String, (i64, usize)> = HashMap::new();

    for headline in scored {
        let ticker = headline.ticker.trim().to_uppercase();
        let entry = totals.entry(ticker.clone()).or_insert_with(|| {
            order.push(ticker);
            (0, 0)
        });
        entry.0 += i64::from(headline.score);
        entry.1 += 1;
    }

    order
        .into_iter()
        .filter_map(|ticker| {
            let (sum, count) = totals.remove(&ticker)?;
            Some(Recommendation {
                score: Decimal::from(sum) / Decimal::from(count),
                headlines: count,
                ticker,
            })
        })
        .collect()
}

/// Batch rows for every non-neutral recommendation
pub fn to_rows(recommendations: &[Recommendation]) -> Vec<BatchRow> {
    recommendations
        .iter()
        .filter_map(|rec| rec.side().map(|side| BatchRow::new(rec.ticker.clone(), side)))
        .collect()
}

/// Append recommendations to a batch; returns the number of rows queued
pub fn enqueue(
    store: &dyn BatchStore,
    batch: &Path,
    recommendations: &[Recommendation],
) -> Result<usize> {
    let rows = to_rows(recommendations);
    if rows.is_empty() {
        info!(batch = %batch.display(), "No actionable recommendations");
        return Ok(0);
    }
    store.append_batch(batch, &rows)?;
    info!(batch = %batch.display(), rows = rows.len(), "Queued recommendations");
    Ok(rows.len())
}

/// Read scored headlines from a CSV file
///
/// Expected columns: `ticker,headline,published_at,score`.
pub fn read_scores(path: &Path) -> Result<Vec<ScoredHeadline>> {
    let read_error = |reason: String| EngineError::BatchRead {
        path: path.display().to_string(),
        reason,
    };

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| read_error(e.to_string()))?;

    reader
        .deserialize::<ScoredHeadline>()
        .enumerate()
        .map(|(index, record)| record.map_err(|e| read_error(format!("row {}: {}", index + 2, e))))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::traits::MockBatchStore;
    use crate::session::SessionState;
    use chrono::{NaiveTime, TimeZone};
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;
    use std::path::PathBuf;

    fn scored(ticker: &str, score: i32, published_at: DateTime<Utc>) -> ScoredHeadline {
        ScoredHeadline {
            ticker: ticker.to_string(),
            headline: format!("{} headline", ticker),
            published_at,
            score,
        }
    }

    fn at(day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, day, hour, minute, 0).unwrap()
    }

    #[test]
    fn test_verdict_parse() {
        assert_eq!(Verdict::parse("YES"), Verdict::Positive);
        assert_eq!(Verdict::parse(" no. "), Verdict::Negative);
        assert_eq!(Verdict::parse("UNKNOWN"), Verdict::Unknown);
        assert_eq!(Verdict::parse("Maybe, it depends"), Verdict::Unknown);
        assert_eq!(Verdict::Negative.score(), -1);
    }

    #[test]
    fn test_aggregate_means_per_ticker() {
        let now = at(12, 14, 0);
        let recs = aggregate(&[
            scored("AAPL", 1, now),
            scored("MSFT", -1, now),
            scored("aapl", 0, now),
            scored("AAPL", 1, now),
            scored("TSLA", 0, now),
            scored("MSFT", 1, now),
        ]);

        let summary: Vec<_> = recs.iter().map(|r| (r.ticker.as_str(), r.side())).collect();
        assert_eq!(
            summary,
            vec![("AAPL", Some(Side::Buy)), ("MSFT", None), ("TSLA", None)]
        );
        assert_eq!(recs[0].headlines, 3);
        assert_eq!(recs[0].score.round_dp(4), dec!(0.6667));
    }

    #[test]
    fn test_filter_window_uses_local_date_and_time() {
        let window = SessionWindow {
            name: "pre".to_string(),
            state: SessionState::PreMarket,
            start: NaiveTime::from_hms_opt(0, 0, 0).unwrap(),
            end: NaiveTime::from_hms_opt(9, 30, 0).unwrap(),
            batch: PathBuf::from("morning.csv"),
        };
        let now = at(12, 13, 0); // 09:00 New York
        let kept = filter_window(
            vec![
                scored("IN", 1, at(12, 12, 0)),   // 08:00 local, today
                scored("LATE", 1, at(12, 15, 0)), // 11:00 local
                scored("OLD", 1, at(11, 12, 0)),  // yesterday
            ],
            chrono_tz::America::New_York,
            &window,
            now,
        );

        let tickers: Vec<_> = kept.iter().map(|h| h.ticker.as_str()).collect();
        assert_eq!(tickers, vec!["IN"]);
    }

    #[test]
    fn test_enqueue_appends_actionable_rows() {
        let mut store = MockBatchStore::new();
        store
            .expect_append_batch()
            .withf(|_, rows| {
                rows.to_vec()
                    == vec![BatchRow::new("AAPL", Side::Buy), BatchRow::new("F", Side::Sell)]
            })
            .times(1)
            .returning(|_, _| Ok(()));

        let recs = vec![
            Recommendation { ticker: "AAPL".into(), score: dec!(1), headlines: 1 },
            Recommendation { ticker: "GE".into(), score: Decimal::ZERO, headlines: 2 },
            Recommendation { ticker: "F".into(), score: dec!(-0.5), headlines: 2 },
        ];

        let queued = enqueue(&store, Path::new("morning.csv"), &recs).unwrap();
        assert_eq!(queued, 2);
    }

    #[test]
    fn test_enqueue_nothing_actionable_skips_store() {
        let mut store = MockBatchStore::new();
        store.expect_append_batch().never();

        let recs = vec![Recommendation { ticker: "GE".into(), score: Decimal::ZERO, headlines: 1 }];
        assert_eq!(enqueue(&store, Path::new("morning.csv"), &recs).unwrap(), 0);
    }

    #[test]
    fn test_read_scores() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scores.csv");
        std::fs::write(
            &path,
            "ticker,headline,published_at,score\nAAPL,\"Apple beats, raises\",2024-03-12T12:00:00Z,1\n",
        )
        .unwrap();

        let scores = read_scores(&path).unwrap();
        assert_eq!(scores.len(), 1);
        assert_eq!(scores[0].headline, "Apple beats, raises");
        assert_eq!(scores[0].published_at, at(12, 12, 0));
    }
}
