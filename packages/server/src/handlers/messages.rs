use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::extractors::json::AppJson;
use crate::models::message::*;
use crate::services::AckOutcome;
use crate::state::AppState;

/// List pending messages, newest first.
#[utoipa::path(
    get,
    path = "/messages",
    tag = "Messages",
    operation_id = "listPendingMessages",
    summary = "List pending messages",
    description = "Returns pending messages ordered by timestamp descending. Pass the returned `nextToken` back to fetch the following page; it is absent on the last page.",
    params(ListMessagesParams),
    responses(
        (status = 200, description = "Page of pending messages", body = ListMessagesResponse),
        (status = 400, description = "Malformed continuation token (INVALID_TOKEN)", body = ErrorBody),
        (status = 500, description = "Store failure (INTERNAL_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn list_messages(
    State(state): State<AppState>,
    Query(params): Query<ListMessagesParams>,
) -> Result<Json<ListMessagesResponse>, AppError> {
    let page = state
        .pending
        .list_pending(params.limit.as_deref(), params.next_token.as_deref())
        .await?;

    Ok(Json(page.into()))
}

/// Mark a batch of messages as processed.
#[utoipa::path(
    post,
    path = "/messages/ack",
    tag = "Messages",
    operation_id = "acknowledgeMessages",
    summary = "Acknowledge messages",
    description = "Sets each message to `processed` and refreshes its expiry to 24 hours from now. \
        Ids are updated independently; failures are reported per id.",
    request_body = AckRequest,
    responses(
        (status = 200, description = "Every id was processed", body = AckResponse),
        (status = 207, description = "Some ids failed", body = AckResponse),
        (status = 400, description = "Invalid messageIds (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "No id exists", body = AckResponse),
        (status = 500, description = "Store failure", body = AckResponse),
    ),
)]
#[instrument(skip(state, payload))]
pub async fn ack_messages(
    State(state): State<AppState>,
    AppJson(payload): AppJson<AckRequest>,
) -> Result<(StatusCode, Json<AckResponse>), AppError> {
    let ids = state.ack.validate(payload.message_ids.as_ref())?;
    let report = state.ack.acknowledge(ids).await;

    let status = match report.outcome {
        AckOutcome::Success => StatusCode::OK,
        AckOutcome::Partial => StatusCode::MULTI_STATUS,
        AckOutcome::Failed if report.all_not_found() => StatusCode::NOT_FOUND,
        AckOutcome::Failed => StatusCode::INTERNAL_SERVER_ERROR,
    };

    Ok((status, Json(report.into())))
}

/// Look up a single message by id.
#[utoipa::path(
    get,
    path = "/messages/{id}",
    tag = "Messages",
    operation_id = "getMessage",
    summary = "Get a message",
    description = "Returns the message in any status, unless it has expired.",
    params(("id" = String, Path, description = "Message id")),
    responses(
        (status = 200, description = "The message", body = serde_json::Value),
        (status = 404, description = "Message absent or expired (NOT_FOUND)", body = ErrorBody),
        (status = 500, description = "Store failure (INTERNAL_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn get_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<common::Message>, AppError> {
    let message = state
        .store
        .get(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Mensagem '{id}' não encontrada")))?;

    Ok(Json(message))
}
