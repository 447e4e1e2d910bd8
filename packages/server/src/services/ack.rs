use std::sync::Arc;

use common::{Clock, MessageStatus, MessageStore};
use futures::future::join_all;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AckError {
    #[error("{0}")]
    InvalidRequest(String),
}

/// Why a single id could not be acknowledged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AckFailureKind {
    NotFound,
    StoreUnavailable,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct AckFailure {
    pub id: String,
    pub kind: AckFailureKind,
    pub error: String,
}

/// Overall result of a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AckOutcome {
    Success,
    Partial,
    Failed,
}

#[derive(Debug, Clone)]
pub struct AckReport {
    /// Ids whose transition was applied, in request order.
    pub processed_ids: Vec<String>,
    pub failures: Vec<AckFailure>,
    /// Expiry written to every processed message. `None` when nothing was processed.
    pub expiration_time: Option<i64>,
    pub outcome: AckOutcome,
}

impl AckReport {
    /// True when nothing succeeded and every failure was a missing id.
    pub fn all_not_found(&self) -> bool {
        self.outcome == AckOutcome::Failed
            && self
                .failures
                .iter()
                .all(|f| f.kind == AckFailureKind::NotFound)
    }
}

/// Marks batches of messages as processed.
#[derive(Clone)]
pub struct AckService {
    store: Arc<dyn MessageStore>,
    clock: Arc<dyn Clock>,
    max_batch: usize,
    processed_ttl_secs: i64,
}

impl AckService {
    pub fn new(
        store: Arc<dyn MessageStore>,
        clock: Arc<dyn Clock>,
        max_batch: usize,
        processed_ttl_secs: i64,
    ) -> Self {
        Self {
            store,
            clock,
            max_batch,
            processed_ttl_secs,
        }
    }

    /// Check the raw `messageIds` value before touching the store.
    pub fn validate(&self, raw: Option<&Value>) -> Result<Vec<String>, AckError> {
        let items = match raw {
            Some(Value::Array(items)) if !items.is_empty() => items,
            _ => {
                return Err(AckError::InvalidRequest(
                    "messageIds é obrigatório e deve ser um array não vazio".into(),
                ));
            }
        };

        if items.len() > self.max_batch {
            return Err(AckError::InvalidRequest(format!(
                "Máximo de {} messageIds por requisição",
                self.max_batch
            )));
        }

        items
            .iter()
            .map(|item| match item {
                Value::String(id) if !id.is_empty() => Ok(id.clone()),
                _ => Err(AckError::InvalidRequest(
                    "messageIds deve conter apenas strings não vazias".into(),
                )),
            })
            .collect()
    }

    /// Transition every id to processed with a fresh expiry.
    ///
    /// Updates run concurrently; a failing id never stops the others.
    #[instrument(skip(self, ids), fields(count = ids.len()))]
    pub async fn acknowledge(&self, ids: Vec<String>) -> AckReport {
        let expiration_time = self.clock.now().saturating_add(self.processed_ttl_secs);

        let results = join_all(ids.iter().map(|id| {
            self.store
                .update(id, MessageStatus::Processed, expiration_time)
        }))
        .await;

        let mut processed_ids = Vec::with_capacity(ids.len());
        let mut failures = Vec::new();

        for (id, result) in ids.into_iter().zip(results) {
            match result {
                Ok(()) => processed_ids.push(id),
                Err(err) => {
                    let kind = if err.is_not_found() {
                        AckFailureKind::NotFound
                    } else {
                        AckFailureKind::StoreUnavailable
                    };
                    warn!(id = %id, error = %err, "Failed to acknowledge message");
                    failures.push(AckFailure {
                        id,
                        kind,
                        error: err.to_string(),
                    });
                }
            }
        }

        let outcome = match (processed_ids.is_empty(), failures.is_empty()) {
            (_, true) => AckOutcome::Success,
            (false, false) => AckOutcome::Partial,
            (true, false) => AckOutcome::Failed,
        };

        let expiration_time = (!processed_ids.is_empty()).then_some(expiration_time);

        info!(
            processed = processed_ids.len(),
            failed = failures.len(),
            "Acknowledged message batch"
        );

        AckReport {
            processed_ids,
            failures,
            expiration_time,
            outcome,
        }
    }
}
