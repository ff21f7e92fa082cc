//! Shared fixtures for trading-pass tests

use chrono::{DateTime, NaiveTime, TimeZone, Utc};
use headline_trader::config::types::{SessionConfig, SessionWindow};
use headline_trader::SessionState;
use std::path::Path;

/// 2024-03-12 is a Tuesday; New York is UTC-4 that day
pub fn tuesday(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 12, hour, minute, 0).unwrap()
}

/// 09:20 New York, inside the morning window
pub fn morning() -> DateTime<Utc> {
    tuesday(13, 20)
}

/// 15:45 New York, inside the afternoon window
pub fn afternoon() -> DateTime<Utc> {
    tuesday(19, 45)
}

/// 12:00 New York, outside every window
pub fn midday() -> DateTime<Utc> {
    tuesday(16, 0)
}

/// Default windows with their batches placed under `dir`
pub fn session_config(dir: &Path) -> SessionConfig {
    let time = |h, m| NaiveTime::from_hms_opt(h, m, 0).unwrap();
    SessionConfig {
        windows: vec![
            SessionWindow {
                name: "morning".to_string(),
                state: SessionState::PreMarket,
                start: time(9, 10),
                end: time(9, 40),
                batch: dir.join("trades_morning.csv"),
            },
            SessionWindow {
                name: "afternoon".to_string(),
                state: SessionState::Regular,
                start: time(15, 40),
                end: time(16, 0),
                batch: dir.join("trades_afternoon.csv"),
            },
        ],
        ..SessionConfig::default()
    }
}

/// Write a raw batch file
pub fn write_batch(path: &Path, contents: &str) {
    std::fs::write(path, contents).expect("Failed to write batch");
}

pub fn read_batch(path: &Path) -> String {
    std::fs::read_to_string(path).expect("Failed to read batch")
}
