use std::sync::Arc;

use async_trait::async_trait;
use common::{Clock, Message, MessageStatus, MessageStore, Page, ResumeKey, StoreError};
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use serde_json::{Map, Value};

use crate::entity::message;

/// Postgres-backed message store.
///
/// Postgres has no native TTL, so expiry is enforced on every read and
/// update by filtering on `expiration_time > now`; the expiry sweeper
/// reclaims the rows later.
#[derive(Clone)]
pub struct SeaOrmMessageStore {
    db: DatabaseConnection,
    clock: Arc<dyn Clock>,
}

impl SeaOrmMessageStore {
    pub fn new(db: DatabaseConnection, clock: Arc<dyn Clock>) -> Self {
        Self { db, clock }
    }
}

fn unavailable(err: DbErr) -> StoreError {
    StoreError::Unavailable(err.to_string())
}

fn into_message(model: message::Model) -> Message {
    let payload = match model.payload {
        Value::Object(map) => map,
        _ => Map::new(),
    };

    Message {
        id: model.id,
        status: model.status,
        timestamp: model.timestamp,
        topic: model.topic,
        expiration_time: model.expiration_time,
        payload,
    }
}

fn into_active_model(message: Message) -> message::ActiveModel {
    message::ActiveModel {
        id: Set(message.id),
        status: Set(message.status),
        timestamp: Set(message.timestamp),
        topic: Set(message.topic),
        expiration_time: Set(message.expiration_time),
        payload: Set(Value::Object(message.payload)),
    }
}

#[async_trait]
impl MessageStore for SeaOrmMessageStore {
    async fn put(&self, message: Message) -> Result<(), StoreError> {
        message::Entity::insert(into_active_model(message))
            .on_conflict(
                OnConflict::column(message::Column::Id)
                    .update_columns([
                        message::Column::Status,
                        message::Column::Timestamp,
                        message::Column::Topic,
                        message::Column::ExpirationTime,
                        message::Column::Payload,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await
            .map_err(unavailable)?;

        Ok(())
    }

    async fn update(
        &self,
        id: &str,
        status: MessageStatus,
        expiration_time: i64,
    ) -> Result<(), StoreError> {
        let now = self.clock.now();

        // Single statement: the expiry check and the write cannot interleave
        // with another writer on the same row.
        let result = message::Entity::update_many()
            .set(message::ActiveModel {
                status: Set(status),
                expiration_time: Set(expiration_time),
                ..Default::default()
            })
            .filter(message::Column::Id.eq(id))
            .filter(message::Column::ExpirationTime.gt(now))
            .exec(&self.db)
            .await
            .map_err(unavailable)?;

        if result.rows_affected == 0 {
            return Err(StoreError::NotFound(id.to_string()));
        }

        Ok(())
    }

    async fn query_by_status(
        &self,
        status: MessageStatus,
        limit: usize,
        resume: Option<&ResumeKey>,
    ) -> Result<Page, StoreError> {
        let now = self.clock.now();

        let mut query = message::Entity::find()
            .filter(message::Column::Status.eq(status))
            .filter(message::Column::ExpirationTime.gt(now));

        if let Some(key) = resume {
            query = query.filter(
                Condition::any()
                    .add(message::Column::Timestamp.lt(key.timestamp))
                    .add(
                        Condition::all()
                            .add(message::Column::Timestamp.eq(key.timestamp))
                            .add(message::Column::Id.lt(key.id.as_str())),
                    ),
            );
        }

        let rows = query
            .order_by_desc(message::Column::Timestamp)
            .order_by_desc(message::Column::Id)
            .limit(limit.saturating_add(1) as u64)
            .all(&self.db)
            .await
            .map_err(unavailable)?;

        let mut items: Vec<Message> = rows.into_iter().map(into_message).collect();
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

        let row = message::Entity::find_by_id(id.to_string())
            .filter(message::Column::ExpirationTime.gt(now))
            .one(&self.db)
            .await
            .map_err(unavailable)?;

        Ok(row.map(into_message))
    }

    async fn purge_expired(&self) -> Result<u64, StoreError> {
        let now = self.clock.now();

        let result = message::Entity::delete_many()
            .filter(message::Column::ExpirationTime.lte(now))
            .exec(&self.db)
            .await
            .map_err(unavailable)?;

        Ok(result.rows_affected)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.db.ping().await.map_err(unavailable)
    }
}
