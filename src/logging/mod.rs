//! Structured logging setup and ndjson prediction records.

mod format;

pub use format::{LogEvent, StructuredLogger};
