pub mod clock;
pub mod config;
pub mod dlq;
pub mod message;
pub mod message_status;
pub mod retry;
pub mod store;
pub mod telemetry;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::MqAppConfig;
pub use dlq::{DlqEnvelope, DlqErrorCode};
pub use message::{Message, PENDING_TTL_SECS, PROCESSED_TTL_SECS};
pub use message_status::MessageStatus;
pub use store::{MemoryMessageStore, MessageStore, Page, ResumeKey, StoreError};
pub use telemetry::{InboundTelemetry, TopicFilter};
