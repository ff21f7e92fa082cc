//! Bounded retry with credential fallback

use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

use super::errors::{EngineError, Result};

/// How a failed attempt should be handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Try the same credential again after backing off
    Retry,
    /// Give up on this credential and move to the next one
    NextCredential,
    /// Stop immediately and surface the error
    Abort,
}

/// Retry budget applied to each credential in turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Attempts per credential, including the first one
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Base delay between attempts; grows linearly with the attempt number
    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            backoff_ms: default_backoff_ms(),
        }
    }
}

/// Longest server-requested wait before a retry
pub const MAX_RETRY_AFTER_SECS: u64 = 60;

fn default_max_attempts() -> u32 {
    3
}

fn default_backoff_ms() -> u64 {
    500
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff_ms: u64) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff_ms,
        }
    }

    /// Back-off before the next attempt
    ///
    /// A rate limit that names its own wait (`Retry-After`) is honoured,
    /// capped at [`MAX_RETRY_AFTER_SECS`].
    fn delay_for(&self, attempt: u32, err: &EngineError) -> Duration {
        match err {
            EngineError::RateLimit {
                retry_after_seconds: Some(seconds),
                ..
            } => Duration::from_secs((*seconds).min(MAX_RETRY_AFTER_SECS)),
            _ => Duration::from_millis(self.backoff_ms.saturating_mul(u64::from(attempt))),
        }
    }

    /// Run `op` against each credential in order
    ///
    /// `classify` decides, per error, whether to retry the same credential,
    /// fall through to the next one, or abort. The last error seen is
    /// returned when every credential is exhausted.
    pub async fn run<C, T, F, Fut, K>(&self, credentials: &[C], mut op: F, classify: K) -> Result<T>
    where
        F: FnMut(&C) -> Fut,
        Fut: Future<Output = Result<T>>,
        K: Fn(&EngineError) -> RetryDecision,
    {
        let mut last_error = None;

        for (index, credential) in credentials.iter().enumerate() {
            let mut attempt = 1;
            loop {
                match op(credential).await {
                    Ok(value) => return Ok(value),
                    Err(err) => match classify(&err) {
                        RetryDecision::Abort => return Err(err),
                        RetryDecision::NextCredential => {
                            warn!(credential = index, error = %err, "Credential rejected, trying next");
                            last_error = Some(err);
                            break;
                        }
                        RetryDecision::Retry if attempt < self.max_attempts => {
                            let delay = self.delay_for(attempt, &err);
                            debug!(credential = index, attempt, ?delay, error = %err, "Retrying request");
                            tokio::time::sleep(delay).await;
                            attempt += 1;
                        }
                        RetryDecision::Retry => {
                            warn!(credential = index, attempt, error = %err, "Retries exhausted");
                            last_error = Some(err);
                            break;
                        }
                    },
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| EngineError::Configuration("no API credentials configured".to_string())))
    }
}
