use serde::{Deserialize, Serialize};

use crate::retry::RetryAttempt;

/// Why an ingested item ended up on the error queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DlqErrorCode {
    /// The store write kept failing after every retry.
    MaxRetriesExceeded,
    /// The item could not be decoded as telemetry.
    DeserializationError,
    /// The broker timestamp is so old that the message would expire on arrival.
    StaleTimestamp,
}

impl DlqErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MaxRetriesExceeded => "MAX_RETRIES_EXCEEDED",
            Self::DeserializationError => "DESERIALIZATION_ERROR",
            Self::StaleTimestamp => "STALE_TIMESTAMP",
        }
    }
}

impl std::fmt::Display for DlqErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Envelope published to the ingestion error queue.
///
/// This is the only channel through which ingestion failures leave the
/// process; callers of the query and acknowledge API never see them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DlqEnvelope {
    /// Message id the item would have been stored under, when known.
    pub message_id: Option<String>,
    /// Source topic, when known.
    pub topic: Option<String>,
    /// The item as received.
    pub payload: serde_json::Value,
    pub error_code: DlqErrorCode,
    pub error_message: String,
    #[serde(default)]
    pub retry_history: Vec<RetryAttempt>,
}
