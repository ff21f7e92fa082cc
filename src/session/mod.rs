//! Session classification
//!
//! A pass only runs inside a configured window. Each window names the
//! session state it represents and the batch file whose orders it owns.

mod calendar;
mod classifier;

use serde::{Deserialize, Serialize};

pub use calendar::StaticCalendar;
pub use classifier::SessionClassifier;

/// Trading session at a given instant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    PreMarket,
    Regular,
    AfterHours,
    Closed,
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionState::PreMarket => write!(f, "pre_market"),
            SessionState::Regular => write!(f, "regular"),
            SessionState::AfterHours => write!(f, "after_hours"),
            SessionState::Closed => write!(f, "closed"),
        }
    }
}
