use serde::Deserialize;

use crate::retry::RetryPolicy;

/// App-level MQ configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct MqAppConfig {
    /// Whether the ingestion consumer runs. Default: true.
    #[serde(default = "default_mq_enabled")]
    pub enabled: bool,
    /// Redis connection URL. Default: "redis://localhost:6379".
    #[serde(default = "default_mq_url")]
    pub url: String,
    /// Connection pool size. Default: 5.
    #[serde(default = "default_mq_pool_size")]
    pub pool_size: u8,
    /// Queue the broker bridge publishes telemetry to. Default: "telemetry".
    #[serde(default = "default_mq_telemetry_queue")]
    pub telemetry_queue: String,
    /// Queue that receives items ingestion could not store. Default: "telemetry_errors".
    #[serde(default = "default_mq_error_queue")]
    pub error_queue: String,
    /// Concurrent consumers on the telemetry queue. Default: 4.
    #[serde(default = "default_mq_concurrency")]
    pub concurrency: usize,
    /// Retry budget for store writes before an item goes to the error queue.
    #[serde(default)]
    pub retry: RetryPolicy,
}

fn default_mq_enabled() -> bool {
    true
}
fn default_mq_url() -> String {
    "redis://localhost:6379".into()
}
fn default_mq_pool_size() -> u8 {
    5
}
fn default_mq_telemetry_queue() -> String {
    "telemetry".into()
}
fn default_mq_error_queue() -> String {
    "telemetry_errors".into()
}
fn default_mq_concurrency() -> usize {
    4
}

impl Default for MqAppConfig {
    fn default() -> Self {
        Self {
            enabled: default_mq_enabled(),
            url: default_mq_url(),
            pool_size: default_mq_pool_size(),
            telemetry_queue: default_mq_telemetry_queue(),
            error_queue: default_mq_error_queue(),
            concurrency: default_mq_concurrency(),
            retry: RetryPolicy::default(),
        }
    }
}
