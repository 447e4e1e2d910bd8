use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// A single failed attempt, kept so the error queue sees the full history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryAttempt {
    /// 1-based attempt number.
    pub attempt: u8,
    pub error: String,
    pub timestamp: DateTime<Utc>,
}

impl RetryAttempt {
    pub fn new(attempt: u8, error: impl Into<String>) -> Self {
        Self {
            attempt,
            error: error.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Retry budget for writing one ingested item.
#[derive(Debug, Clone, Deserialize)]
pub struct RetryPolicy {
    /// Retries after the first attempt. Default: 3.
    #[serde(default = "default_max_retries")]
    pub max_retries: u8,
    /// Base delay for exponential backoff. Default: 500 ms.
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
    /// Upper bound on a single delay. Default: 10 s.
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
}

fn default_max_retries() -> u8 {
    3
}
fn default_base_delay_ms() -> u64 {
    500
}
fn default_max_delay_ms() -> u64 {
    10_000
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            base_delay_ms: default_base_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
        }
    }
}

impl RetryPolicy {
    /// Whether another attempt is allowed after `failed_attempts` failures.
    pub fn should_retry(&self, failed_attempts: u8) -> bool {
        failed_attempts <= self.max_retries
    }

    /// Delay before the attempt following failure number `attempt`.
    pub fn backoff(&self, attempt: u8) -> Duration {
        calculate_backoff(attempt, self.base_delay_ms, self.max_delay_ms)
    }
}

/// Exponential backoff with 0-25% jitter.
///
/// Formula: `min(base_ms * 2^(attempt-1) + jitter, max_ms)`
pub fn calculate_backoff(attempt: u8, base_ms: u64, max_ms: u64) -> Duration {
    if attempt == 0 {
        return Duration::ZERO;
    }

    let delay_ms = base_ms.saturating_mul(2u64.saturating_pow((attempt - 1) as u32));
    let jitter = if delay_ms > 0 {
        rand::rng().random_range(0..=delay_ms / 4)
    } else {
        0
    };

    Duration::from_millis(delay_ms.saturating_add(jitter).min(max_ms))
}
