use axum::{Json, extract::State};
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::models::health::HealthResponse;
use crate::state::AppState;

/// Liveness probe.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    operation_id = "health",
    responses((status = 200, description = "Process is up", body = HealthResponse)),
)]
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "healthy" })
}

/// Readiness probe: succeeds only when the message store answers.
#[utoipa::path(
    get,
    path = "/ready",
    tag = "Health",
    operation_id = "ready",
    responses(
        (status = 200, description = "Store reachable", body = HealthResponse),
        (status = 503, description = "Store unreachable (SERVICE_UNAVAILABLE)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn ready(State(state): State<AppState>) -> Result<Json<HealthResponse>, AppError> {
    state
        .store
        .ping()
        .await
        .map_err(|e| AppError::Unavailable(e.to_string()))?;

    Ok(Json(HealthResponse { status: "ready" }))
}
