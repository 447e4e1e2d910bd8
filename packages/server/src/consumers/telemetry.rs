use std::sync::Arc;

use common::retry::{RetryAttempt, RetryPolicy};
use common::{
    Clock, DlqEnvelope, DlqErrorCode, InboundTelemetry, Message, MessageStore, TopicFilter,
};
use mq::{BroccoliError, BrokerMessage, Mq};
use serde_json::Value;
use tracing::{debug, error, info, warn};

/// What happened to one inbound item.
#[derive(Debug)]
pub enum IngestOutcome {
    /// Persisted as a pending message with this id.
    Stored(String),
    /// Topic outside the configured filter.
    Skipped,
    /// Could not be stored; the envelope belongs on the error queue.
    DeadLetter(Box<DlqEnvelope>),
}

/// Turns broker telemetry into pending messages.
pub struct Ingestor {
    store: Arc<dyn MessageStore>,
    clock: Arc<dyn Clock>,
    filter: TopicFilter,
    pending_ttl_secs: i64,
    retry: RetryPolicy,
}

impl Ingestor {
    pub fn new(
        store: Arc<dyn MessageStore>,
        clock: Arc<dyn Clock>,
        filter: TopicFilter,
        pending_ttl_secs: i64,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            store,
            clock,
            filter,
            pending_ttl_secs,
            retry,
        }
    }

    pub async fn ingest(&self, raw: Value) -> IngestOutcome {
        let item: InboundTelemetry = match serde_json::from_value(raw.clone()) {
            Ok(item) => item,
            Err(e) => {
                warn!(error = %e, "Failed to parse inbound telemetry");
                return IngestOutcome::DeadLetter(Box::new(DlqEnvelope {
                    message_id: string_field(&raw, "trace_id"),
                    topic: string_field(&raw, "topic"),
                    payload: raw,
                    error_code: DlqErrorCode::DeserializationError,
                    error_message: format!("Failed to parse telemetry: {e}"),
                    retry_history: vec![],
                }));
            }
        };

        if !self.filter.matches(&item.topic) {
            debug!(topic = %item.topic, "Topic outside filter, skipping");
            return IngestOutcome::Skipped;
        }

        let now = self.clock.now();
        let message = item.into_message(now, self.pending_ttl_secs);
        if message.is_expired(now) {
            warn!(
                id = %message.id,
                timestamp = message.timestamp,
                expiration_time = message.expiration_time,
                "Telemetry expired before it could be stored"
            );
            return IngestOutcome::DeadLetter(Box::new(DlqEnvelope {
                message_id: Some(message.id),
                topic: Some(message.topic),
                payload: raw,
                error_code: DlqErrorCode::StaleTimestamp,
                error_message: format!(
                    "Timestamp {} is older than the pending TTL of {}s",
                    message.timestamp, self.pending_ttl_secs
                ),
                retry_history: vec![],
            }));
        }

        self.store_with_retry(message, raw).await
    }

    async fn store_with_retry(&self, message: Message, raw: Value) -> IngestOutcome {
        let mut history: Vec<RetryAttempt> = Vec::new();

        loop {
            let err = match self.store.put(message.clone()).await {
                Ok(()) => {
                    debug!(id = %message.id, topic = %message.topic, "Stored telemetry message");
                    return IngestOutcome::Stored(message.id);
                }
                Err(e) => e,
            };

            let attempt = u8::try_from(history.len() + 1).unwrap_or(u8::MAX);
            history.push(RetryAttempt::new(attempt, err.to_string()));

            if self.retry.should_retry(attempt) {
                let delay = self.retry.backoff(attempt);
                warn!(
                    id = %message.id,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "Retrying telemetry write"
                );
                tokio::time::sleep(delay).await;
                continue;
            }

            error!(
                id = %message.id,
                retry_count = history.len(),
                error = %err,
                "Max retries exhausted, sending telemetry to error queue"
            );
            return IngestOutcome::DeadLetter(Box::new(DlqEnvelope {
                message_id: Some(message.id.clone()),
                topic: Some(message.topic.clone()),
                payload: raw,
                error_code: DlqErrorCode::MaxRetriesExceeded,
                error_message: err.to_string(),
                retry_history: history,
            }));
        }
    }
}

fn string_field(raw: &Value, key: &str) -> Option<String> {
    raw.get(key).and_then(Value::as_str).map(str::to_string)
}

/// Consume telemetry from the broker until the connection drops.
pub async fn consume_telemetry(
    ingestor: Arc<Ingestor>,
    mq: Arc<Mq>,
    queue_name: String,
    error_queue: String,
    concurrency: usize,
) {
    info!(queue = %queue_name, concurrency, "Starting telemetry consumer");

    let mq_for_handler = Arc::clone(&mq);
    let result = mq
        .process_messages(
            &queue_name,
            Some(concurrency),
            None,
            move |message: BrokerMessage<Value>| {
                let ingestor = Arc::clone(&ingestor);
                let mq = Arc::clone(&mq_for_handler);
                let error_queue = error_queue.clone();
                async move {
                    match ingestor.ingest(message.payload).await {
                        IngestOutcome::Stored(_) | IngestOutcome::Skipped => Ok(()),
                        IngestOutcome::DeadLetter(envelope) => {
                            mq.publish(&error_queue, None, envelope.as_ref(), None)
                                .await
                                .map(|_| ())
                                .map_err(|e| {
                                    error!(error = %e, "Failed to publish to error queue");
                                    BroccoliError::Publish(format!(
                                        "Failed to publish to error queue: {e}"
                                    ))
                                })
                        }
                    }
                }
            },
        )
        .await;

    if let Err(e) = result {
        error!(error = %e, "Telemetry consumer stopped unexpectedly");
    }
}
