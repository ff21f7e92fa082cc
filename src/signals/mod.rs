//! Headline sentiment → batch recommendations
//!
//! Scraping and the model call live outside this crate. What arrives here
//! is a list of headlines already scored +1 / 0 / -1 per ticker; they are
//! averaged per ticker and queued as buy/sell rows in a session batch.

mod aggregate;

pub use aggregate::{
    aggregate, enqueue, filter_window, read_scores, to_rows, Recommendation, ScoredHeadline,
    Verdict,
};
