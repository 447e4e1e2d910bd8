use std::sync::Arc;

use common::{Clock, MessageStore};

use crate::config::AppConfig;
use crate::services::{AckService, PendingQueryService};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn MessageStore>,
    pub pending: PendingQueryService,
    pub ack: AckService,
    pub config: AppConfig,
}

impl AppState {
    /// Wire the query and acknowledge services around a shared store.
    pub fn new(store: Arc<dyn MessageStore>, clock: Arc<dyn Clock>, config: AppConfig) -> Self {
        let pending = PendingQueryService::new(
            store.clone(),
            config.query.default_limit,
            config.query.max_limit,
        );
        let ack = AckService::new(
            store.clone(),
            clock,
            config.ack.max_batch,
            config.ack.processed_ttl_secs,
        );

        Self {
            store,
            pending,
            ack,
            config,
        }
    }
}
