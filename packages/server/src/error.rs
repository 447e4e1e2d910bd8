use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use common::StoreError;
use serde::Serialize;

use crate::services::{AckError, QueryError};

/// Structured error response returned by all endpoints on failure.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    /// Machine-readable error code. One of: `VALIDATION_ERROR`, `INVALID_TOKEN`,
    /// `NOT_FOUND`, `SERVICE_UNAVAILABLE`, `INTERNAL_ERROR`.
    #[schema(example = "VALIDATION_ERROR")]
    pub code: &'static str,
    /// Human-readable error description.
    #[schema(example = "messageIds é obrigatório e deve ser um array não vazio")]
    pub message: String,
    /// Underlying failure detail. Only set on server errors; not a stable contract.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Application-level error type.
#[derive(Debug)]
pub enum AppError {
    Validation(String),
    InvalidToken(String),
    NotFound(String),
    /// A dependency did not answer a readiness probe.
    Unavailable(String),
    Internal(String),
}

impl AppError {
    fn status_and_body(self) -> (StatusCode, ErrorBody) {
        match self {
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    code: "VALIDATION_ERROR",
                    message: msg,
                    error: None,
                },
            ),
            AppError::InvalidToken(detail) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    code: "INVALID_TOKEN",
                    message: format!("nextToken inválido: {detail}"),
                    error: None,
                },
            ),
            AppError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                ErrorBody {
                    code: "NOT_FOUND",
                    message: msg,
                    error: None,
                },
            ),
            AppError::Unavailable(detail) => {
                tracing::warn!("Service unavailable: {}", detail);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    ErrorBody {
                        code: "SERVICE_UNAVAILABLE",
                        message: "Serviço indisponível".into(),
                        error: Some(detail),
                    },
                )
            }
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        code: "INTERNAL_ERROR",
                        message: "Erro ao processar a solicitação".into(),
                        error: Some(detail),
                    },
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = self.status_and_body();
        (status, Json(body)).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => AppError::NotFound(format!("Mensagem '{id}' não encontrada")),
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl From<QueryError> for AppError {
    fn from(err: QueryError) -> Self {
        match err {
            QueryError::InvalidToken(e) => AppError::InvalidToken(e.to_string()),
            QueryError::Store(e) => e.into(),
        }
    }
}

impl From<AckError> for AppError {
    fn from(err: AckError) -> Self {
        match err {
            AckError::InvalidRequest(msg) => AppError::Validation(msg),
        }
    }
}
