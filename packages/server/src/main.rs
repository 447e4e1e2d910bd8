use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use common::{Clock, MessageStore, SystemClock, TopicFilter};
use inbox_server::config::AppConfig;
use inbox_server::consumers::{Ingestor, consume_telemetry};
use inbox_server::database::{ensure_indexes, init_db};
use inbox_server::expiry::run_expiry_sweeper;
use inbox_server::state::AppState;
use inbox_server::store::SeaOrmMessageStore;
use mq::{MqConfig, init_mq};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::load().context("Failed to load config")?;

    let db = init_db(&config.database.url)
        .await
        .context("Failed to connect to database")?;
    ensure_indexes(&db)
        .await
        .context("Failed to create indexes")?;

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let store: Arc<dyn MessageStore> = Arc::new(SeaOrmMessageStore::new(db, clock.clone()));

    // TODO: Keep the handles for graceful shutdown. Background tasks currently run until process exit.
    tokio::spawn(run_expiry_sweeper(
        store.clone(),
        Duration::from_secs(config.expiry.sweep_interval_secs.max(1)),
    ));

    if config.mq.enabled {
        let filter = TopicFilter::parse(&config.ingest.topic_filter)
            .map_err(anyhow::Error::msg)
            .context("Invalid ingest.topic_filter")?;

        let mq = Arc::new(
            init_mq(MqConfig {
                url: config.mq.url.clone(),
                pool_size: config.mq.pool_size,
            })
            .await
            .context("Failed to initialize MQ")?,
        );

        let ingestor = Arc::new(Ingestor::new(
            store.clone(),
            clock.clone(),
            filter,
            config.ingest.pending_ttl_secs,
            config.mq.retry.clone(),
        ));

        tokio::spawn(consume_telemetry(
            ingestor,
            mq,
            config.mq.telemetry_queue.clone(),
            config.mq.error_queue.clone(),
            config.mq.concurrency.max(1),
        ));
    } else {
        info!("MQ disabled, telemetry ingestion is off");
    }

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;

    let app = inbox_server::build_router(AppState::new(store, clock, config));

    info!("Server running at http://{}", addr);
    info!("Swagger UI available at http://{}/swagger-ui", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
