use common::MessageStatus;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One ingested telemetry message.
///
/// `(status, timestamp, id)` carries the composite index used for newest-first
/// listing; see `database::ensure_indexes`.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "message")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub status: MessageStatus,

    /// Ingestion time, epoch seconds.
    pub timestamp: i64,

    #[sea_orm(column_type = "Text")]
    pub topic: String,

    /// Absolute expiry, epoch seconds.
    #[sea_orm(indexed)]
    pub expiration_time: i64,

    /// Device fields other than the reserved ones, as a JSON object.
    #[sea_orm(column_type = "JsonBinary")]
    pub payload: serde_json::Value,
}

impl ActiveModelBehavior for ActiveModel {}
