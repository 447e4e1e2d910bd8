use std::sync::Arc;
use std::time::Duration;

use common::{MessageStore, StoreError};
use tracing::{debug, error, info};

/// Purge expired messages every `interval` until the task is dropped.
pub async fn run_expiry_sweeper(store: Arc<dyn MessageStore>, interval: Duration) {
    info!(
        interval_secs = interval.as_secs(),
        "Starting expiry sweeper"
    );

    let mut ticker = tokio::time::interval(interval);

    loop {
        ticker.tick().await;

        if let Err(e) = sweep_once(store.as_ref()).await {
            error!(error = %e, "Expiry sweep failed");
        }
    }
}

/// Run a single purge pass. Returns the number of records removed.
pub async fn sweep_once(store: &dyn MessageStore) -> Result<u64, StoreError> {
    let purged = store.purge_expired().await?;
    if purged > 0 {
        info!(purged, "Purged expired messages");
    } else {
        debug!("No expired messages to purge");
    }
    Ok(purged)
}
