//! Structured logging for Broadsheet.
//!
//! Console and rolling-file subscriber setup, plus redaction of API keys before
//! request URLs or service error bodies reach the logs.

pub mod logger;
pub mod redact;

pub use logger::{init_logger, LoggerOptions};
pub use redact::redact_sensitive_data;
