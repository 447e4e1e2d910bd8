use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::error::StoreError;
use crate::message::Message;
use crate::message_status::MessageStatus;

/// Position in the (status, timestamp, id) ordering after which a query resumes.
///
/// Carries the full primary and index key of the last item returned, so a
/// resumed query can continue strictly after it even when several messages
/// share a timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResumeKey {
    pub id: String,
    pub status: MessageStatus,
    pub timestamp: i64,
}

impl ResumeKey {
    pub fn of(message: &Message) -> Self {
        Self {
            id: message.id.clone(),
            status: message.status,
            timestamp: message.timestamp,
        }
    }
}

/// One page of a status query.
#[derive(Debug, Clone, Default)]
pub struct Page {
    pub items: Vec<Message>,
    /// Set only when more matching messages exist beyond `items`.
    pub last_key: Option<ResumeKey>,
}

/// Durable keyed storage of messages with a secondary (status, timestamp) ordering.
///
/// Expired records are invisible: every read and update behaves as if they
/// had already been purged.
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Insert or overwrite a message keyed by its id.
    async fn put(&self, message: Message) -> Result<(), StoreError>;

    /// Set `status` and `expiration_time` on an existing message.
    ///
    /// Fails with [`StoreError::NotFound`] if the id is absent or expired.
    /// There is no concurrency check: the last writer wins.
    async fn update(
        &self,
        id: &str,
        status: MessageStatus,
        expiration_time: i64,
    ) -> Result<(), StoreError>;

    /// Up to `limit` messages with `status`, newest first, strictly after `resume`.
    async fn query_by_status(
        &self,
        status: MessageStatus,
        limit: usize,
        resume: Option<&ResumeKey>,
    ) -> Result<Page, StoreError>;

    /// Look up a single message.
    async fn get(&self, id: &str) -> Result<Option<Message>, StoreError>;

    /// Remove every record whose expiry has passed. Returns the number removed.
    async fn purge_expired(&self) -> Result<u64, StoreError>;

    /// Check that the store is reachable.
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
