//! Observability for the exchange layer
//!
//! Structured, synchronous JSON-line logging. One log line is one event;
//! key order is deterministic so output is diffable across runs.

mod logger;

pub use logger::{Logger, Severity};
