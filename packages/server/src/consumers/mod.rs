pub mod telemetry;

pub use telemetry::{IngestOutcome, Ingestor, consume_telemetry};
