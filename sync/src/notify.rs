//! Outbound notification seam.

use tracing::{info, warn};

use pesaflow_common::Transaction;

/// Receives settlement outcomes for user-facing display.
///
/// The core makes no assumption about rendering; implementations may toast,
/// badge, or ignore.
pub trait NotificationEmitter: Send + Sync {
    /// A queued transaction settled successfully.
    fn on_transaction_settled(&self, tx: &Transaction);
    /// A queued transaction could not be settled.
    fn on_transaction_failed(&self, tx: &Transaction, reason: &str);
}

/// Emitter that writes outcomes to the log. Default for headless use.
#[derive(Debug, Default)]
pub struct LogEmitter;

impl NotificationEmitter for LogEmitter {
    fn on_transaction_settled(&self, tx: &Transaction) {
        info!(id = %tx.id, kind = ?tx.kind, amount = %tx.amount, "Transaction settled");
    }

    fn on_transaction_failed(&self, tx: &Transaction, reason: &str) {
        warn!(id = %tx.id, kind = ?tx.kind, reason, "Transaction failed");
    }
}
