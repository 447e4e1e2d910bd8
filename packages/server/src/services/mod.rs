pub mod ack;
pub mod pending;
pub mod token;

pub use ack::{AckError, AckFailure, AckFailureKind, AckOutcome, AckReport, AckService};
pub use pending::{PendingPage, PendingQueryService, QueryError};
pub use token::{TokenError, decode_token, encode_token};
