use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::message_status::MessageStatus;

/// Lifetime of a freshly ingested message: 30 days.
pub const PENDING_TTL_SECS: i64 = 30 * 24 * 60 * 60;

/// Lifetime of a message after it has been acknowledged: 24 hours.
pub const PROCESSED_TTL_SECS: i64 = 24 * 60 * 60;

/// Field names synthesized by ingestion. Payload keys with these names are
/// shadowed by the synthesized values.
pub const RESERVED_FIELDS: &[&str] = &["id", "status", "timestamp", "topic", "expirationTime"];

/// A persisted telemetry message.
///
/// On the wire the payload is flattened next to the reserved fields, so a
/// message serializes as a single JSON object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub status: MessageStatus,
    /// Ingestion time, epoch seconds.
    pub timestamp: i64,
    pub topic: String,
    /// Absolute expiry, epoch seconds. Past this instant the record is treated as absent.
    pub expiration_time: i64,
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

impl Message {
    /// Build a pending message ingested at `timestamp`.
    ///
    /// Reserved keys are stripped from `payload` so they cannot shadow the
    /// synthesized fields when the message is serialized.
    pub fn pending(
        id: impl Into<String>,
        topic: impl Into<String>,
        timestamp: i64,
        ttl_secs: i64,
        mut payload: Map<String, Value>,
    ) -> Self {
        for field in RESERVED_FIELDS {
            payload.remove(*field);
        }

        Self {
            id: id.into(),
            status: MessageStatus::Pending,
            timestamp,
            topic: topic.into(),
            expiration_time: timestamp.saturating_add(ttl_secs),
            payload,
        }
    }

    /// Whether the record has outlived its expiry at `now`.
    pub fn is_expired(&self, now: i64) -> bool {
        self.expiration_time <= now
    }
}
