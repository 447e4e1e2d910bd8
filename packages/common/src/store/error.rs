use thiserror::Error;

/// Errors that can occur during message store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The message does not exist, or has expired.
    #[error("message not found: {0}")]
    NotFound(String),

    /// The backing store could not be reached or rejected the operation.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
