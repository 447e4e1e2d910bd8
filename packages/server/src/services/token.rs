use base64::{
    Engine as _,
    engine::general_purpose::{STANDARD, STANDARD_NO_PAD},
};
use common::{MessageStatus, ResumeKey};
use serde_json::json;
use thiserror::Error;

/// Why a continuation token was rejected.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("token is not valid base64")]
    Encoding,
    #[error("token does not contain a resume key: {0}")]
    Malformed(String),
    #[error("token belongs to a '{actual}' listing, expected '{expected}'")]
    WrongStatus {
        expected: MessageStatus,
        actual: MessageStatus,
    },
}

/// Encode a resume key as an opaque token.
pub fn encode_token(key: &ResumeKey) -> String {
    let body = json!({
        "id": key.id,
        "status": key.status,
        "timestamp": key.timestamp,
    });
    STANDARD.encode(body.to_string())
}

/// Decode a token produced by [`encode_token`] for a listing of `expected` messages.
///
/// The URL-safe alphabet and unpadded tokens are accepted too, as is a `+`
/// that query-string decoding turned into a space.
pub fn decode_token(token: &str, expected: MessageStatus) -> Result<ResumeKey, TokenError> {
    let normalized: String = token
        .trim_end_matches('=')
        .chars()
        .map(|c| match c {
            ' ' | '-' => '+',
            '_' => '/',
            other => other,
        })
        .collect();

    let bytes = STANDARD_NO_PAD
        .decode(normalized.as_bytes())
        .map_err(|_| TokenError::Encoding)?;

    let key: ResumeKey =
        serde_json::from_slice(&bytes).map_err(|e| TokenError::Malformed(e.to_string()))?;

    if key.id.is_empty() {
        return Err(TokenError::Malformed("empty id".into()));
    }
    if key.status != expected {
        return Err(TokenError::WrongStatus {
            expected,
            actual: key.status,
        });
    }

    Ok(key)
}
