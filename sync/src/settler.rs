//! Settlement collaborator seam.

use async_trait::async_trait;
use thiserror::Error;

use pesaflow_common::Transaction;

/// Why a settlement attempt failed.
#[derive(Debug, Error)]
pub enum SettlementError {
    /// The backend refused the transaction.
    #[error("Settlement rejected: {0}")]
    Rejected(String),

    /// The backend could not be reached or timed out.
    #[error("Settlement backend unavailable: {0}")]
    Unavailable(String),
}

/// Executes a transaction against a backend.
///
/// Supplied by feature code; the coordinator invokes it once per queued
/// transaction, sequentially, and awaits each call before moving on. An
/// implementation must resolve to success or failure rather than hang, and
/// is responsible for its own timeout.
#[async_trait]
pub trait Settler: Send + Sync {
    /// Attempt to settle a single transaction.
    async fn settle(&self, tx: &Transaction) -> Result<(), SettlementError>;
}
