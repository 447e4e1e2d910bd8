use common::Message;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::services::{AckFailure, AckOutcome, AckReport, PendingPage};

/// Query parameters for listing pending messages.
#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListMessagesParams {
    /// Page size (default 100, max 1000). Non-numeric or zero means default.
    #[param(example = "50")]
    pub limit: Option<String>,
    /// Continuation token from a previous page.
    #[serde(rename = "nextToken")]
    pub next_token: Option<String>,
}

/// A page of pending messages, newest first.
#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListMessagesResponse {
    /// Stored messages; device payload fields sit next to the reserved ones.
    #[schema(value_type = Vec<Object>)]
    pub messages: Vec<Message>,
    /// Present when more pending messages follow; pass back as `nextToken`.
    pub next_token: Option<String>,
}

impl From<PendingPage> for ListMessagesResponse {
    fn from(page: PendingPage) -> Self {
        Self {
            messages: page.messages,
            next_token: page.next_token,
        }
    }
}

/// Body of an acknowledgement request.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AckRequest {
    /// Ids to mark as processed (1-25 non-empty strings).
    #[serde(default)]
    #[schema(value_type = Vec<String>, example = json!(["a8f0c2d4", "b91e33aa"]))]
    pub message_ids: Option<Value>,
}

/// Result of an acknowledgement batch.
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AckResponse {
    #[schema(example = "2 mensagens marcadas como processadas")]
    pub message: String,
    pub processed_ids: Vec<String>,
    /// `success`, `partial` or `failed`.
    pub status: AckOutcome,
    pub failures: Vec<AckFailure>,
    /// Expiry written to the processed messages, epoch seconds. Omitted when
    /// no message was processed.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = 1700086400)]
    pub expiration_time: Option<i64>,
}

impl From<AckReport> for AckResponse {
    fn from(report: AckReport) -> Self {
        Self {
            message: format!(
                "{} mensagens marcadas como processadas",
                report.processed_ids.len()
            ),
            processed_ids: report.processed_ids,
            status: report.outcome,
            failures: report.failures,
            expiration_time: report.expiration_time,
        }
    }
}
