//! Storage error types.
//!
//! These errors stay internal to the store implementations: the
//! [`PersistentStore`](crate::PersistentStore) contract absorbs faults and
//! logs them instead of propagating.

use thiserror::Error;

/// Errors that can occur inside a store implementation.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying medium could not be read or written.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Persisted document could not be parsed.
    #[error("Corrupt store document: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Result type for store internals.
pub type StoreResult<T> = Result<T, StoreError>;
