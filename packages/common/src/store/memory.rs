use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::error::StoreError;
use super::traits::{MessageStore, Page, ResumeKey};
use crate::clock::Clock;
use crate::message::Message;
use crate::message_status::MessageStatus;

#[derive(Default)]
struct Inner {
    records: HashMap<String, Message>,
    /// Per-status ordering on (timestamp, id). Iterated in reverse for newest-first.
    index: HashMap<MessageStatus, BTreeSet<(i64, String)>>,
}

impl Inner {
    fn unindex(&mut self, message: &Message) {
        if let Some(set) = self.index.get_mut(&message.status) {
            set.remove(&(message.timestamp, message.id.clone()));
        }
    }

    fn index(&mut self, message: &Message) {
        self.index
            .entry(message.status)
            .or_default()
            .insert((message.timestamp, message.id.clone()));
    }

    fn remove(&mut self, id: &str) -> Option<Message> {
        let removed = self.records.remove(id)?;
        self.unindex(&removed);
        Some(removed)
    }
}

/// In-process message store.
///
/// Keeps the secondary ordering as a sorted set per status. Expiry is judged
/// against the injected clock; expired entries stay in memory until
/// [`MessageStore::purge_expired`] runs, but are never returned.
pub struct MemoryMessageStore {
    inner: RwLock<Inner>,
    clock: Arc<dyn Clock>,
}

impl MemoryMessageStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
            clock,
        }
    }

    /// Number of records held, including expired ones not yet purged.
    pub async fn len(&self) -> usize {
        self.inner.read().await.records.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl MessageStore for MemoryMessageStore {
    async fn put(&self, message: Message) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        inner.remove(&message.id);
        inner.index(&message);
        inner.records.insert(message.id.clone(), message);
        Ok(())
    }

    async fn update(
        &self,
        id: &str,
        status: MessageStatus,
        expiration_time: i64,
    ) -> Result<(), StoreError> {
        let now = self.clock.now();
        let mut inner = self.inner.write().await;

        let mut message = match inner.records.get(id) {
            Some(m) if !m.is_expired(now) => m.clone(),
            _ => return Err(StoreError::NotFound(id.to_string())),
        };

        inner.unindex(&message);
        message.status = status;
        message.expiration_time = expiration_time;
        inner.index(&message);
        inner.records.insert(message.id.clone(), message);
        Ok(())
    }

    async fn query_by_status(
        &self,
        status: MessageStatus,
        limit: usize,
        resume: Option<&ResumeKey>,
    ) -> Result<Page, StoreError> {
        let now = self.clock.now();
        let inner = self.inner.read().await;

        let Some(set) = inner.index.get(&status) else {
            return Ok(Page::default());
        };

        let keys: Box<dyn Iterator<Item = &(i64, String)> + '_> = match resume {
            Some(key) => Box::new(set.range(..(key.timestamp, key.id.clone())).rev()),
            None => Box::new(set.iter().rev()),
        };

        // One extra item tells us whether another page exists.
        let mut items: Vec<Message> = keys
            .filter_map(|(_, id)| inner.records.get(id))
            .filter(|m| !m.is_expired(now))
            .take(limit.saturating_add(1))
            .cloned()
            .collect();

        let last_key = if items.len() > limit {
            items.truncate(limit);
            items.last().map(ResumeKey::of)
        } else {
            None
        };

        Ok(Page { items, last_key })
    }

    async fn get(&self, id: &str) -> Result<Option<Message>, StoreError> {
        let now = self.clock.now();
        let inner = self.inner.read().await;
        Ok(inner
            .records
            .get(id)
            .filter(|m| !m.is_expired(now))
            .cloned())
    }

    async fn purge_expired(&self) -> Result<u64, StoreError> {
        let now = self.clock.now();
        let mut inner = self.inner.write().await;

        let expired: Vec<String> = inner
            .records
            .values()
            .filter(|m| m.is_expired(now))
            .map(|m| m.id.clone())
            .collect();

        for id in &expired {
            inner.remove(id);
        }

        Ok(expired.len() as u64)
    }
}
