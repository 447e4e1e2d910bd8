use std::time::Duration;

use sea_orm::sea_query::{Index, PostgresQueryBuilder};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr};
use tracing::{info, warn};

use crate::entity::message;

pub async fn init_db(db_url: &str) -> Result<DatabaseConnection, DbErr> {
    let mut opt = ConnectOptions::new(db_url.to_owned());

    opt.max_connections(50)
        .min_connections(2)
        .connect_timeout(Duration::from_secs(8))
        .acquire_timeout(Duration::from_secs(8))
        .idle_timeout(Duration::from_secs(60))
        .sqlx_logging(false);

    let db = Database::connect(opt).await?;
    db.get_schema_registry("inbox_server::entity::*")
        .sync(&db)
        .await?;

    Ok(db)
}

/// Ensure the status/recency index exists.
///
/// SeaORM's schema-sync doesn't create composite non-unique indexes, so the
/// ordering index backing newest-first listing is created here on startup.
pub async fn ensure_indexes(db: &DatabaseConnection) -> Result<(), DbErr> {
    // SELECT ... WHERE status = ? AND (timestamp, id) < (?, ?)
    // ORDER BY timestamp DESC, id DESC LIMIT ?
    let stmt = Index::create()
        .if_not_exists()
        .name("idx_message_status_timestamp")
        .table(message::Entity)
        .col(message::Column::Status)
        .col(message::Column::Timestamp)
        .col(message::Column::Id)
        .to_string(PostgresQueryBuilder);

    match db.execute_unprepared(&stmt).await {
        Ok(_) => info!("Ensured index idx_message_status_timestamp exists"),
        Err(e) => warn!("Failed to create index idx_message_status_timestamp: {}", e),
    }

    Ok(())
}
