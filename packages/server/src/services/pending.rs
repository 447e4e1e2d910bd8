use std::num::IntErrorKind;
use std::sync::Arc;

use common::{Message, MessageStatus, MessageStore, StoreError};
use thiserror::Error;
use tracing::{debug, instrument};

use super::token::{TokenError, decode_token, encode_token};

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("invalid continuation token: {0}")]
    InvalidToken(#[from] TokenError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// One page of pending messages.
#[derive(Debug, Clone)]
pub struct PendingPage {
    pub messages: Vec<Message>,
    /// Present only when more pending messages follow this page.
    pub next_token: Option<String>,
}

/// Paginated, newest-first reader of pending messages.
#[derive(Clone)]
pub struct PendingQueryService {
    store: Arc<dyn MessageStore>,
    default_limit: usize,
    max_limit: usize,
}

impl PendingQueryService {
    pub fn new(store: Arc<dyn MessageStore>, default_limit: usize, max_limit: usize) -> Self {
        let max_limit = max_limit.max(1);
        Self {
            store,
            default_limit: default_limit.clamp(1, max_limit),
            max_limit,
        }
    }

    /// Interpret the raw `limit` query value.
    ///
    /// Absent, non-numeric and zero fall back to the default; anything else,
    /// including values too large for an `i64`, is clamped to `[1, max_limit]`.
    pub fn resolve_limit(&self, raw: Option<&str>) -> usize {
        match raw.map(str::trim).map(str::parse::<i64>) {
            Some(Ok(n)) if n > 0 => (n as u64).min(self.max_limit as u64) as usize,
            Some(Ok(n)) if n < 0 => 1,
            Some(Err(e)) if *e.kind() == IntErrorKind::PosOverflow => self.max_limit,
            Some(Err(e)) if *e.kind() == IntErrorKind::NegOverflow => 1,
            _ => self.default_limit,
        }
    }

    #[instrument(skip(self, token), fields(has_token = token.is_some()))]
    pub async fn list_pending(
        &self,
        limit: Option<&str>,
        token: Option<&str>,
    ) -> Result<PendingPage, QueryError> {
        let limit = self.resolve_limit(limit);

        let resume = token
            .filter(|t| !t.is_empty())
            .map(|t| decode_token(t, MessageStatus::Pending))
            .transpose()?;

        let page = self
            .store
            .query_by_status(MessageStatus::Pending, limit, resume.as_ref())
            .await?;

        debug!(
            count = page.items.len(),
            has_more = page.last_key.is_some(),
            "Listed pending messages"
        );

        Ok(PendingPage {
            messages: page.items,
            next_token: page.last_key.as_ref().map(encode_token),
        })
    }
}
