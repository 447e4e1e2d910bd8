use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::message::Message;

/// A telemetry item as delivered by the broker bridge.
///
/// The bridge augments each MQTT publish with its topic and, when it can, a
/// trace id and receive timestamp. Everything else the device sent is kept
/// verbatim in `payload`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InboundTelemetry {
    /// Broker trace id. Generated at ingestion when absent.
    #[serde(default)]
    pub trace_id: Option<String>,
    pub topic: String,
    /// Broker receive time, epoch seconds. Ingestion time is used when absent.
    #[serde(default)]
    pub timestamp: Option<i64>,
    #[serde(default)]
    pub payload: Map<String, Value>,
}

impl InboundTelemetry {
    /// Turn the item into a pending message ingested at `now` (unless the broker stamped it).
    pub fn into_message(self, now: i64, ttl_secs: i64) -> Message {
        let id = self
            .trace_id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        let timestamp = self.timestamp.unwrap_or(now);

        Message::pending(id, self.topic, timestamp, ttl_secs, self.payload)
    }
}

/// An MQTT topic filter supporting the `+` (one level) and `#` (remaining levels) wildcards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicFilter {
    levels: Vec<String>,
}

impl TopicFilter {
    /// Parse a filter, rejecting misplaced wildcards.
    pub fn parse(filter: &str) -> Result<Self, String> {
        if filter.is_empty() {
            return Err("Topic filter must not be empty".into());
        }

        let levels: Vec<String> = filter.split('/').map(str::to_string).collect();
        for (i, level) in levels.iter().enumerate() {
            let is_last = i + 1 == levels.len();
            if level == "#" && !is_last {
                return Err(format!("'#' must be the last level in '{filter}'"));
            }
            if level.len() > 1 && (level.contains('+') || level.contains('#')) {
                return Err(format!(
                    "Wildcards must occupy a whole level in '{filter}'"
                ));
            }
        }

        Ok(Self { levels })
    }

    /// Whether `topic` matches this filter.
    pub fn matches(&self, topic: &str) -> bool {
        let mut topic_levels = topic.split('/');

        for level in &self.levels {
            match level.as_str() {
                "#" => return true,
                "+" => {
                    if topic_levels.next().is_none() {
                        return false;
                    }
                }
                exact => {
                    if topic_levels.next() != Some(exact) {
                        return false;
                    }
                }
            }
        }

        topic_levels.next().is_none()
    }
}
