pub use broccoli_queue::{
    brokers::broker::BrokerMessage,
    error::BroccoliError,
    queue::BroccoliQueue,
};
use tracing::info;

use crate::error::MqError;

pub type MqQueue = BroccoliQueue;

pub struct MqConfig {
    pub url: String,
    pub pool_size: u8,
}

/// Connect to the broker backing the telemetry and error queues.
pub async fn init_mq(config: MqConfig) -> Result<MqQueue, MqError> {
    let queue = BroccoliQueue::builder(&config.url)
        .pool_connections(config.pool_size)
        .build()
        .await?;

    info!(pool_size = config.pool_size, "Connected to message broker");
    Ok(queue)
}
