//! # Crate Error Types
//!
//! Unified error handling for the exchange layer. Every fallible operation
//! in the crate returns `LoreResult<T>` and the boundary renders the error
//! into the empty-string-success channel.
//!
//! The categories carried here are only the ones this library can itself
//! produce. Library-resolution failures (`NotFound`, `Platform`) belong to
//! the host-side loader and never originate on this side of the boundary.

use thiserror::Error;

/// Result type for all store and exchange operations
pub type LoreResult<T> = Result<T, LoreError>;

/// Errors produced by the store and the exchange boundary
#[derive(Debug, Clone, Error)]
pub enum LoreError {
    // ==================
    // Input Errors
    // ==================
    /// Malformed or constraint-violating input (embedded NUL bytes, null
    /// pointers, non-UTF-8 text, negative batch sizes)
    #[error("validation failed: {0}")]
    Validation(String),

    // ==================
    // Storage Errors
    // ==================
    /// Underlying filesystem access failure
    #[error("io failure: {0}")]
    Io(String),

    /// Stored bytes that cannot be decoded (checksum mismatch, truncated
    /// record, unsupported manifest version)
    #[error("serialization failure: {0}")]
    Serialization(String),

    // ==================
    // Protocol Errors
    // ==================
    /// Lock timeout, or a count/read pairing broken by an intervening write
    #[error("concurrency violation: {0}")]
    Concurrency(String),
}

impl LoreError {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create an io error from a message and its OS-level source
    pub fn io(msg: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io(format!("{}: {}", msg.into(), source))
    }

    /// Create a serialization error
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization(msg.into())
    }

    /// Create a concurrency error
    pub fn concurrency(msg: impl Into<String>) -> Self {
        Self::Concurrency(msg.into())
    }
}
